use thiserror::Error;

/// Main error type for kgqa
#[derive(Error, Debug)]
pub enum KgqaError {
    /// Malformed graph document (missing identifier, dangling edge, duplicate node)
    #[error("Graph load error: {0}")]
    GraphLoad(String),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Description table errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Page fetch / transport errors
    #[error("Network error: {0}")]
    Network(String),

    /// Web search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Completion API errors
    #[error("Completion API error: {0}")]
    Completion(String),

    /// Tokenizer initialisation errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Node identifier not present in the graph
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Too many consecutive failures through one external client
    #[error("Circuit breaker open for {client} after {strikes} consecutive failures")]
    CircuitOpen { client: String, strikes: u32 },
}

impl KgqaError {
    /// Errors that must stop the pipeline instead of degrading to "no result"
    pub fn is_fatal(&self) -> bool {
        matches!(self, KgqaError::CircuitOpen { .. } | KgqaError::GraphLoad(_))
    }
}

/// Convenient Result type using KgqaError
pub type Result<T> = std::result::Result<T, KgqaError>;
