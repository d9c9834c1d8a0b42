use super::lazy_init::LazyInitializationCheck;
use super::session::AnalysisSession;
use crate::class::Class;
use crate::config::AnalysisConfig;
use crate::findings::ClassReport;
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::debug;

/// A check that inspects one class and records findings in the session.
pub trait ClassCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str {
        "No description provided"
    }

    fn run(&mut self, class: &Class, session: &mut AnalysisSession) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct CheckStatistics {
    pub name: String,
    pub class_name: String,
    pub duration: Duration,
    pub findings: usize,
}

/// Runs registered checks over classes, one fresh [`AnalysisSession`] per class.
pub struct CheckRunner {
    checks: Vec<Box<dyn ClassCheck>>,
    config: AnalysisConfig,
    statistics: Vec<CheckStatistics>,
    collect_stats: bool,
}

impl CheckRunner {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            checks: Vec::new(),
            config,
            statistics: Vec::new(),
            collect_stats: false,
        }
    }

    /// A runner with the lazy initialization check registered.
    pub fn with_default_checks(config: AnalysisConfig) -> Self {
        let mut runner = Self::new(config);
        runner.register_check(LazyInitializationCheck::new());
        runner
    }

    pub fn enable_statistics(&mut self) {
        self.collect_stats = true;
    }

    pub fn register_check<C: ClassCheck + 'static>(&mut self, check: C) {
        self.checks.push(Box::new(check));
    }

    pub fn check_names(&self) -> Vec<&'static str> {
        self.checks.iter().map(|check| check.name()).collect()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn run(&mut self, class: &Class) -> Result<ClassReport> {
        let mut session = AnalysisSession::new(class, self.config.clone());

        for check in &mut self.checks {
            let start = self.collect_stats.then(Instant::now);
            let before = session.findings().len();

            check
                .run(class, &mut session)
                .with_context(|| format!("check `{}` failed on class {}", check.name(), class.name))?;

            if let Some(start) = start {
                self.statistics.push(CheckStatistics {
                    name: check.name().to_string(),
                    class_name: class.name.clone(),
                    duration: start.elapsed(),
                    findings: session.findings().len() - before,
                });
            }
        }

        let report = session.finish();
        debug!(
            class = %report.class_name,
            findings = report.findings.len(),
            "finished class"
        );
        Ok(report)
    }

    pub fn run_all(&mut self, classes: &[Class]) -> Result<Vec<ClassReport>> {
        classes.iter().map(|class| self.run(class)).collect()
    }

    pub fn statistics(&self) -> &[CheckStatistics] {
        &self.statistics
    }
}

impl Default for CheckRunner {
    fn default() -> Self {
        Self::with_default_checks(AnalysisConfig::default())
    }
}
