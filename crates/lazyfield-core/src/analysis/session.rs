use super::cfg::ControlFlowGraph;
use crate::class::{Class, MethodId};
use crate::config::AnalysisConfig;
use crate::findings::{ClassReport, Finding};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// State scoped to the analysis of a single class.
///
/// Graphs are built on first request and reused by every later stage. A session is never shared
/// between classes; [`AnalysisSession::finish`] consumes it.
pub struct AnalysisSession {
    class_name: String,
    config: AnalysisConfig,
    graphs: HashMap<MethodId, Arc<ControlFlowGraph>>,
    findings: Vec<Finding>,
    stats: SessionStatistics,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStatistics {
    pub graphs_built: usize,
    pub cache_hits: usize,
}

impl AnalysisSession {
    pub fn new(class: &Class, config: AnalysisConfig) -> Self {
        Self {
            class_name: class.name.clone(),
            config,
            graphs: HashMap::new(),
            findings: Vec::new(),
            stats: SessionStatistics::default(),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn graph(&mut self, class: &Class, id: MethodId) -> Result<Arc<ControlFlowGraph>> {
        if let Some(graph) = self.graphs.get(&id) {
            self.stats.cache_hits += 1;
            return Ok(Arc::clone(graph));
        }

        let method = class.method(id)?;
        let graph = Arc::new(ControlFlowGraph::build(&class.name, method));
        self.stats.graphs_built += 1;
        trace!(class = %class.name, method = %method.signature(), "cached control flow graph");
        self.graphs.insert(id, Arc::clone(&graph));
        Ok(graph)
    }

    pub fn record(&mut self, finding: Finding) {
        trace!(%finding, "recorded finding");
        self.findings.push(finding);
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn statistics(&self) -> SessionStatistics {
        self.stats
    }

    pub fn finish(self) -> ClassReport {
        ClassReport {
            class_name: self.class_name,
            findings: self.findings,
        }
    }
}
