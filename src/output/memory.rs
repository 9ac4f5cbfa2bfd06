use crate::output::traits::{EdgeSink, OutputResult};
use std::sync::Mutex;
use url::Url;

/// Edge sink that keeps every edge in memory, in emission order
#[derive(Debug, Default)]
pub struct MemorySink {
    edges: Mutex<Vec<(Url, Url)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the edges emitted so far
    pub fn edges(&self) -> Vec<(Url, Url)> {
        self.edges
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Edges whose source is `source`
    pub fn edges_from(&self, source: &str) -> Vec<Url> {
        self.edges()
            .into_iter()
            .filter(|(from, _)| from.as_str() == source)
            .map(|(_, to)| to)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.edges
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EdgeSink for MemorySink {
    fn emit(&self, source: &Url, dest: &Url) -> OutputResult<()> {
        self.edges
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((source.clone(), dest.clone()));
        Ok(())
    }
}
