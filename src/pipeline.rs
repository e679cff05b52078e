//! Query → retrieval → paths → descriptions → answer

use std::collections::HashSet;
use std::fmt;

use crate::enrich::DescriptionEnricher;
use crate::graph::{GraphPath, GraphStore};
use crate::paths::PathFinder;
use crate::retrieval::NodeRetriever;
use crate::services::Services;
use crate::synth::{fallback_answer, render_path, AnswerSynthesizer};
use crate::Result;

pub const NO_RELEVANT_NODES: &str = "No relevant nodes found.";
pub const NO_CONNECTING_PATHS: &str = "No connecting paths found.";

/// How a query ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NoRelevantNodes,
    NoConnectingPaths,
    Answered { answer: String, paths: Vec<GraphPath> },
}

impl Outcome {
    pub fn answer(&self) -> &str {
        match self {
            Outcome::NoRelevantNodes => NO_RELEVANT_NODES,
            Outcome::NoConnectingPaths => NO_CONNECTING_PATHS,
            Outcome::Answered { answer, .. } => answer,
        }
    }

    pub fn paths(&self) -> &[GraphPath] {
        match self {
            Outcome::Answered { paths, .. } => paths,
            _ => &[],
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.answer())
    }
}

/// Candidate retrieval and path discovery for `query`
///
/// `Err` carries the terminal outcome when no node matches or no candidate
/// pair is connected.
pub fn discover_paths(
    store: &GraphStore,
    retriever: &NodeRetriever,
    path_finder: &PathFinder,
    query: &str,
) -> std::result::Result<Vec<GraphPath>, Outcome> {
    let candidates = retriever.retrieve(store, query);
    if candidates.is_empty() {
        return Err(Outcome::NoRelevantNodes);
    }
    let paths = path_finder.find_paths(store, &candidates, &candidates);
    if paths.is_empty() {
        return Err(Outcome::NoConnectingPaths);
    }
    Ok(paths)
}

/// Everything one run needs, built once
pub struct Pipeline {
    store: GraphStore,
    retriever: NodeRetriever,
    path_finder: PathFinder,
    enricher: DescriptionEnricher,
    synthesizer: AnswerSynthesizer,
    include_descriptions: bool,
}

impl Pipeline {
    pub fn new(store: GraphStore, services: Services) -> Self {
        Self {
            store,
            retriever: NodeRetriever::default(),
            path_finder: PathFinder::default(),
            enricher: DescriptionEnricher::new(services.clone()),
            synthesizer: AnswerSynthesizer::new(services),
            include_descriptions: false,
        }
    }

    pub fn with_retriever(mut self, retriever: NodeRetriever) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn with_path_finder(mut self, path_finder: PathFinder) -> Self {
        self.path_finder = path_finder;
        self
    }

    /// Replace the enricher, e.g. one carrying description tables
    pub fn with_enricher(mut self, enricher: DescriptionEnricher) -> Self {
        self.enricher = enricher;
        self
    }

    pub fn with_descriptions_in_prompt(mut self, include: bool) -> Self {
        self.include_descriptions = include;
        self
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn enricher(&self) -> &DescriptionEnricher {
        &self.enricher
    }

    /// Retrieval and path discovery only; no external calls
    pub fn find(&self, query: &str) -> std::result::Result<Vec<GraphPath>, Outcome> {
        discover_paths(&self.store, &self.retriever, &self.path_finder, query)
    }

    /// Run the whole pipeline for `query`
    ///
    /// Only fatal errors escape; a soft synthesis failure answers with the
    /// rendered paths instead.
    pub async fn answer(&self, query: &str) -> Result<Outcome> {
        let paths = match self.find(query) {
            Ok(paths) => paths,
            Err(outcome) => {
                log::info!("{}", outcome);
                return Ok(outcome);
            }
        };

        for (i, path) in paths.iter().enumerate() {
            log::info!("Path {}: {}", i + 1, path);
        }

        let mut seen = HashSet::new();
        let ordered: Vec<&str> = paths
            .iter()
            .flat_map(|p| p.nodes().iter().map(String::as_str))
            .filter(|id| seen.insert(*id))
            .collect();
        self.enricher.describe_all(&self.store, ordered.iter().copied()).await?;

        let descriptions = if self.include_descriptions {
            ordered
                .iter()
                .filter_map(|id| {
                    let node = self.store.node(id)?;
                    Some((node.name.clone(), self.enricher.cached(id)?))
                })
                .collect()
        } else {
            Vec::new()
        };

        let answer = match self
            .synthesizer
            .synthesize(&paths, &self.store, query, &descriptions)
            .await
        {
            Ok(answer) => answer,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::error!("Synthesis failed: {}", e);
                let rendered: Vec<String> = paths.iter().map(|p| render_path(&self.store, p)).collect();
                fallback_answer(&rendered)
            }
        };

        Ok(Outcome::Answered { answer, paths })
    }
}
