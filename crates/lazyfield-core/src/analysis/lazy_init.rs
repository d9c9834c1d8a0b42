use super::alias::AliasResolver;
use super::candidates::{Candidate, CandidateMap};
use super::check::ClassCheck;
use super::effective_write::{effective_write, WriteVerifier};
use super::guard::{verify_guard, GuardResolver};
use super::initial_values::possible_initial_values;
use super::session::AnalysisSession;
use crate::class::Class;
use crate::findings::{Defect, Finding};
use anyhow::Result;
use tracing::{debug, trace};

/// Accepts a private non-final field only when it follows the lazy initialization idiom: a single
/// ordinary method writes it, behind a guard that matches the field's initial value, and the
/// written value is deterministic.
#[derive(Debug, Default)]
pub struct LazyInitializationCheck {
    verified: usize,
}

impl LazyInitializationCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidates fully verified across every class this check has run on.
    pub fn verified(&self) -> usize {
        self.verified
    }

    fn verify_candidate(
        &mut self,
        class: &Class,
        candidate: &Candidate,
        session: &mut AnalysisSession,
    ) -> Result<()> {
        let name = candidate.name();
        let Some(method_id) = candidate.initializing_method() else {
            trace!(class = %class.name, field = name, "written only during construction");
            return Ok(());
        };
        let method = class.method(method_id)?;
        let cfg = session.graph(class, method_id)?;
        let Some(write) = effective_write(name, &cfg) else {
            return Ok(());
        };
        let finding = |defect: Defect, index: usize| {
            Finding::new(&class.name, name, defect)
                .in_method(&method.name)
                .at(index)
        };

        let values = possible_initial_values(class, candidate, session)?;
        let alias = AliasResolver::new(&cfg).find_alias(name, write.block);
        trace!(
            class = %class.name,
            field = name,
            write = write.index,
            alias = ?alias.map(|alias| alias.slot),
            "located effective write"
        );

        let nondeterministic = if candidate.field_type.is_primitive() {
            Defect::NonDeterministicPrimitive
        } else {
            Defect::NonDeterministicReference
        };
        for index in WriteVerifier::new(&cfg, &class.name).verify(&write, alias.as_ref()) {
            session.record(finding(nondeterministic.clone(), index));
        }

        let config = session.config().clone();
        match GuardResolver::new(&cfg, &config).find_guard(name, alias.as_ref(), &write) {
            Err(conflict) => {
                debug!(class = %class.name, field = name, %conflict, "ambiguous guard");
                let index = conflict.indices.get(1).copied().unwrap_or(write.index);
                session.record(finding(Defect::MultipleGuards, index));
            }
            Ok(None) => session.record(finding(Defect::MissingGuard, write.index)),
            Ok(Some(guard)) => {
                if let Some(defect) = verify_guard(&guard, &cfg, &candidate.field_type, &values) {
                    session.record(finding(defect, guard.index));
                }
            }
        }

        self.verified += 1;
        Ok(())
    }
}

impl ClassCheck for LazyInitializationCheck {
    fn name(&self) -> &'static str {
        "lazy-initialization"
    }

    fn description(&self) -> &'static str {
        "Private non-final fields must be written once, behind a guard, with a deterministic value"
    }

    fn run(&mut self, class: &Class, session: &mut AnalysisSession) -> Result<()> {
        let mut candidates = CandidateMap::build(class, session.config())?;
        for finding in candidates.disqualify(class) {
            session.record(finding);
        }

        for candidate in candidates.iter() {
            self.verify_candidate(class, candidate, session)?;
        }

        debug!(
            class = %class.name,
            candidates = candidates.len(),
            findings = session.findings().len(),
            "lazy initialization check finished"
        );
        Ok(())
    }
}
