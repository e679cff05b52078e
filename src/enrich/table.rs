//! Pre-computed description tables produced by the offline seeding and
//! refinement jobs, loaded as identifier → description lookups

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{KgqaError, Result};

/// Marker the seeding job writes when its fallback chain found nothing
pub const SEEDED_NOT_FOUND: &str = "Not Found";

/// Which job produced the table; decides the description column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// `identifier, kind, name, description, url`
    Seeded,
    /// `identifier, kind, name, refined_description, url`
    Refined,
}

impl TableKind {
    fn column(self) -> &'static str {
        match self {
            TableKind::Seeded => "description",
            TableKind::Refined => "refined_description",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Row {
    identifier: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    refined_description: Option<String>,
}

/// Description-by-identifier lookup
#[derive(Debug, Default, Clone)]
pub struct DescriptionTable {
    entries: HashMap<String, String>,
}

impl DescriptionTable {
    pub fn from_path(path: &Path, kind: TableKind) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let table = Self::from_reader(file, kind)?;
        log::info!(
            "Loaded {} {} descriptions from {}",
            table.len(),
            kind.column(),
            path.display()
        );
        Ok(table)
    }

    /// Parse a CSV with a header row. Blank descriptions (and the seeding
    /// job's not-found marker) are skipped.
    pub fn from_reader<R: Read>(reader: R, kind: TableKind) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        if !headers.iter().any(|h| h == kind.column()) {
            return Err(KgqaError::InvalidInput(format!(
                "description table is missing the {} column",
                kind.column()
            )));
        }

        let mut entries = HashMap::new();
        for row in csv_reader.deserialize::<Row>() {
            let row = row?;
            let text = match kind {
                TableKind::Seeded => row.description,
                TableKind::Refined => row.refined_description,
            };
            let Some(text) = text else { continue };
            let text = text.trim();
            if text.is_empty() || (kind == TableKind::Seeded && text == SEEDED_NOT_FOUND) {
                continue;
            }
            entries.insert(row.identifier, text.to_string());
        }

        Ok(Self { entries })
    }

    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
