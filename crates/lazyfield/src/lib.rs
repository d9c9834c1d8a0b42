/*! Static verification of lazily initialized fields in JVM classes.
 *
 * A private, non-final field is accepted as effectively immutable when one method writes it,
 * behind a guard that only lets the write through while the field still holds its initial value,
 * and the written value is deterministic. Everything else becomes a [`Finding`].
 *
 * ```no_run
 * let source = std::fs::read_to_string("Lazy.jasm")?;
 * for report in lazyfield::analyze_source(&source)? {
 *     for finding in &report.findings {
 *         println!("{}", finding);
 *     }
 * }
 * # Ok::<(), anyhow::Error>(())
 * ```
 */

pub use lazyfield_core as core;
pub use lazyfield_parser as parser;

pub use lazyfield_core::{
    AccessFlags, AnalysisConfig, AnalysisSession, CheckRunner, Class, ClassBuilder, ClassCheck,
    ClassReport, ControlFlowGraph, Defect, Finding, LazyInitializationCheck, MethodBuilder,
    MutabilityReason,
};
pub use lazyfield_parser::{parse_class, parse_classes, ParseError};

use anyhow::{Context, Result};

pub fn analyze(class: &Class) -> Result<ClassReport> {
    analyze_with(class, AnalysisConfig::default())
}

pub fn analyze_with(class: &Class, config: AnalysisConfig) -> Result<ClassReport> {
    CheckRunner::with_default_checks(config).run(class)
}

/// Parses text assembly and analyzes every class in it.
pub fn analyze_source(source: &str) -> Result<Vec<ClassReport>> {
    analyze_source_with(source, AnalysisConfig::default())
}

pub fn analyze_source_with(source: &str, config: AnalysisConfig) -> Result<Vec<ClassReport>> {
    let classes = parse_classes(source).context("failed to parse class assembly")?;
    CheckRunner::with_default_checks(config).run_all(&classes)
}

pub fn reports_to_json(reports: &[ClassReport]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reports)?)
}
