use super::candidates::{is_constructor_like, Candidate};
use super::effective_write::effective_write;
use super::session::AnalysisSession;
use crate::class::{Class, Method, MethodId};
use crate::opcodes::Opcode;
use crate::values::InitialValue;
use crate::Result;
use indexmap::IndexSet;
use tracing::trace;

/// Values `candidate` may hold before its lazy initializer has run.
///
/// Without a relevant constructor the field keeps the JVM default for its type. Otherwise every
/// constructor contributes the value it stores last, or the default when it leaves the field
/// alone. Constructors that delegate to another constructor of the same class contribute
/// nothing of their own.
pub fn possible_initial_values(
    class: &Class,
    candidate: &Candidate,
    session: &mut AnalysisSession,
) -> Result<IndexSet<InitialValue>> {
    let ty = &candidate.field_type;
    let default = InitialValue::default_for(ty);

    let constructors: Vec<MethodId> = class
        .methods_with_ids()
        .filter(|(_, method)| constructs(method, candidate, session))
        .map(|(id, _)| id)
        .collect();

    let mut values = IndexSet::new();
    for id in constructors {
        let method = class.method(id)?;
        let cfg = session.graph(class, id)?;
        match effective_write(candidate.name(), &cfg) {
            Some(write) => {
                let value = cfg
                    .previous_real(write.index)
                    .and_then(|index| cfg.instruction(index))
                    .and_then(|inst| inst.pushed_constant())
                    .map(|value| value.coerce_to(ty))
                    .unwrap_or_else(|| InitialValue::unknown_for(ty));
                values.insert(value);
            }
            None if delegates_to_sibling(class, method) => {}
            None => {
                values.insert(default.clone());
            }
        }
    }

    if values.is_empty() {
        values.insert(default);
    }

    trace!(
        class = %class.name,
        field = candidate.name(),
        values = ?values,
        "resolved initial values"
    );
    Ok(values)
}

/// Instance fields are set up by `<init>`, static fields by `<clinit>`.
fn constructs(method: &Method, candidate: &Candidate, session: &AnalysisSession) -> bool {
    if !is_constructor_like(method, session.config()) {
        return false;
    }
    if candidate.is_static() {
        method.is_static_initializer()
    } else {
        method.is_constructor()
    }
}

fn delegates_to_sibling(class: &Class, method: &Method) -> bool {
    method.is_constructor()
        && method.instructions.iter().any(|inst| {
            inst.invoked().is_some_and(|(opcode, target)| {
                opcode == Opcode::INVOKESPECIAL && target.owner == class.name && target.name == "<init>"
            })
        })
}
