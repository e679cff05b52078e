//! Path rendering, prompt assembly and the final completion call

use crate::graph::{GraphPath, GraphStore};
use crate::services::Services;
use crate::Result;

/// Relation text when two consecutive path nodes share no edge
pub const UNKNOWN_RELATION: &str = "related to";

/// Name used for path nodes missing from the graph
pub const UNKNOWN_NAME: &str = "Unknown";

const ROLE_INSTRUCTION: &str =
    "You are a biomedical expert system. You have access to the following knowledge graph paths:";

fn display_name<'a>(store: &'a GraphStore, id: &str) -> &'a str {
    store
        .node(id)
        .map(|n| n.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(UNKNOWN_NAME)
}

/// `'<source>' <relation> '<target>'` segments joined with ` -> `
///
/// Parallel edges resolve to the first one inserted.
pub fn render_path(store: &GraphStore, path: &GraphPath) -> String {
    path.segments()
        .map(|(a, b)| {
            let relation = store
                .edges_between(a, b)
                .first()
                .map(|r| r.kind.replace('_', " "))
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_RELATION.to_string());
            format!("'{}' {} '{}'", display_name(store, a), relation, display_name(store, b))
        })
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Final prompt; `descriptions` are `(name, description)` pairs and the
/// block is omitted when empty
pub fn build_prompt(rendered: &[String], query: &str, descriptions: &[(String, String)]) -> String {
    let mut prompt = format!("{}\n\n", ROLE_INSTRUCTION);
    for (i, text) in rendered.iter().enumerate() {
        prompt.push_str(&format!("Path {}: {}\n", i + 1, text));
    }

    if !descriptions.is_empty() {
        prompt.push_str("\nEntity descriptions:\n");
        for (name, description) in descriptions {
            prompt.push_str(&format!("- {}: {}\n", name, description));
        }
    }

    prompt.push_str("\nUser's original query:\n");
    prompt.push_str(query);
    prompt
}

/// Text returned when the synthesis call fails softly
pub fn fallback_answer(rendered: &[String]) -> String {
    let mut text = String::from("Unable to synthesize an answer. Relevant knowledge graph paths:\n");
    for (i, path) in rendered.iter().enumerate() {
        text.push_str(&format!("Path {}: {}\n", i + 1, path));
    }
    text.trim_end().to_string()
}

pub struct AnswerSynthesizer {
    services: Services,
}

impl AnswerSynthesizer {
    pub fn new(services: Services) -> Self {
        Self { services }
    }

    /// One completion over the rendered paths; returns the trimmed answer
    pub async fn synthesize(
        &self,
        paths: &[GraphPath],
        store: &GraphStore,
        query: &str,
        descriptions: &[(String, String)],
    ) -> Result<String> {
        let rendered: Vec<String> = paths.iter().map(|p| render_path(store, p)).collect();
        let prompt = build_prompt(&rendered, query, descriptions);
        log::debug!("Synthesis prompt:\n{}", prompt);

        self.services
            .completion_client
            .complete(self.services.completion.as_ref(), &prompt)
            .await
    }
}
