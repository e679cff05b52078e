//! Query → candidate node retrieval by noun-phrase overlap with node names

mod chunker;

pub use chunker::{LexiconChunker, TextChunker};

use std::sync::Arc;

use crate::graph::GraphStore;

/// Scores every node by how many query phrases occur in its name
pub struct NodeRetriever {
    chunker: Arc<dyn TextChunker>,
}

impl Default for NodeRetriever {
    fn default() -> Self {
        Self::new(Arc::new(LexiconChunker))
    }
}

impl NodeRetriever {
    pub fn new(chunker: Arc<dyn TextChunker>) -> Self {
        Self { chunker }
    }

    /// Candidate node ids, best first
    ///
    /// Phrases are not deduplicated, so a phrase repeated in the query counts
    /// twice. Equal scores keep graph enumeration order.
    pub fn retrieve(&self, store: &GraphStore, query: &str) -> Vec<String> {
        let phrases: Vec<String> = self
            .chunker
            .noun_phrases(query)
            .into_iter()
            .map(|p| p.to_lowercase())
            .collect();
        log::debug!("Extracted phrases {:?} from query", phrases);
        if phrases.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(&str, usize)> = store
            .nodes()
            .filter_map(|node| {
                let name = node.name.to_lowercase();
                let score = phrases.iter().filter(|p| name.contains(p.as_str())).count();
                (score > 0).then_some((node.identifier.as_str(), score))
            })
            .collect();

        // sort_by is stable: ties stay in enumeration order
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        log::info!("Retrieved {} candidate nodes", scored.len());
        scored.into_iter().map(|(id, _)| id.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphDocument;
    use crate::test_support::FixedChunker;

    fn store() -> GraphStore {
        let doc = GraphDocument::from_json(
            r#"{"nodes":[
                {"identifier":"c1","kind":"Compound","name":"Metformin"},
                {"identifier":"d1","kind":"Disease","name":"Parkinson's disease"},
                {"identifier":"d2","kind":"Disease","name":"Alzheimer's disease"},
                {"identifier":"g1","kind":"Gene","name":"PPARG"}
            ],"edges":[]}"#,
        )
        .unwrap();
        GraphStore::load(doc).unwrap()
    }

    #[test]
    fn test_retrieve_end_to_end_query() {
        let retriever = NodeRetriever::default();
        let ids = retriever.retrieve(&store(), "How does metformin affect Parkinson's disease?");
        assert_eq!(ids, vec!["c1", "d1"]);
    }

    #[test]
    fn test_ties_keep_enumeration_order() {
        let retriever = NodeRetriever::new(Arc::new(FixedChunker::new(&["disease"])));
        let ids = retriever.retrieve(&store(), "ignored");
        assert_eq!(ids, vec!["d1", "d2"]);
    }

    #[test]
    fn test_higher_score_first_and_duplicates_count() {
        let retriever = NodeRetriever::new(Arc::new(FixedChunker::new(&[
            "disease",
            "alzheimer",
            "metformin",
            "metformin",
        ])));
        let ids = retriever.retrieve(&store(), "ignored");
        // d2: 2, c1: 2 (repeated phrase), d1: 1
        assert_eq!(ids, vec!["c1", "d2", "d1"]);
    }

    #[test]
    fn test_no_match_is_empty() {
        let retriever = NodeRetriever::default();
        assert!(retriever.retrieve(&store(), "What is quantum chromodynamics?").is_empty());
        assert!(retriever.retrieve(&store(), "").is_empty());
    }

    #[test]
    fn test_phrases_are_lowercased() {
        let retriever = NodeRetriever::new(Arc::new(FixedChunker::new(&["PPARG"])));
        assert_eq!(retriever.retrieve(&store(), "ignored"), vec!["g1"]);
    }
}
