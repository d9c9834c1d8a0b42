use crate::class::{Class, Field, Method, MethodId};
use crate::config::AnalysisConfig;
use crate::descriptor::FieldType;
use crate::findings::{Defect, Finding};
use crate::Result;
use indexmap::IndexMap;
use tracing::debug;

/// Methods that contain at least one write to a candidate field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Initializers {
    pub constructors: Vec<MethodId>,
    pub methods: Vec<MethodId>,
}

impl Initializers {
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty() && self.methods.is_empty()
    }

    fn add(&mut self, id: MethodId, is_constructor: bool) {
        let list = if is_constructor {
            &mut self.constructors
        } else {
            &mut self.methods
        };
        if !list.contains(&id) {
            list.push(id);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub field: Field,
    pub field_type: FieldType,
    pub initializers: Initializers,
}

impl Candidate {
    pub fn name(&self) -> &str {
        &self.field.name
    }

    pub fn is_static(&self) -> bool {
        self.field.access.is_static()
    }

    /// The single ordinary method that writes the field, once the map has been pruned.
    pub fn initializing_method(&self) -> Option<MethodId> {
        match self.initializers.methods.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }
}

pub fn is_constructor_like(method: &Method, config: &AnalysisConfig) -> bool {
    method.is_constructor()
        || (config.static_initializer_is_constructor && method.is_static_initializer())
}

/// Candidate fields of one class keyed by name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct CandidateMap {
    entries: IndexMap<String, Candidate>,
}

impl CandidateMap {
    pub fn build(class: &Class, config: &AnalysisConfig) -> Result<Self> {
        let mut entries = IndexMap::new();
        for field in class.candidate_fields() {
            entries.insert(
                field.name.clone(),
                Candidate {
                    field: field.clone(),
                    field_type: field.field_type()?,
                    initializers: Initializers::default(),
                },
            );
        }

        for (id, method) in class.methods_with_ids() {
            let constructor = is_constructor_like(method, config);
            for inst in &method.instructions {
                let Some(write) = inst.field_write() else {
                    continue;
                };
                if let Some(candidate) = entries.get_mut(&write.name) {
                    candidate.initializers.add(id, constructor);
                }
            }
        }

        debug!(class = %class.name, candidates = entries.len(), "collected candidate fields");
        Ok(Self { entries })
    }

    /// Removes fields that cannot follow the lazy pattern and reports why.
    ///
    /// A field nobody writes is not provably write-once. A field written by more than one
    /// ordinary method is reported once per writing method.
    pub fn disqualify(&mut self, class: &Class) -> Vec<Finding> {
        let mut findings = Vec::new();

        self.entries.retain(|name, candidate| {
            if candidate.initializers.is_empty() {
                findings.push(Finding::new(&class.name, name, Defect::NotProvablyWriteOnce));
                return false;
            }
            if candidate.initializers.methods.len() > 1 {
                for id in &candidate.initializers.methods {
                    let method = method_name(class, *id);
                    findings.push(
                        Finding::new(
                            &class.name,
                            name,
                            Defect::ReassignedInMethod {
                                method: method.clone(),
                            },
                        )
                        .in_method(method),
                    );
                }
                return false;
            }
            true
        });

        findings
    }

    pub fn get(&self, name: &str) -> Option<&Candidate> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn method_name(class: &Class, id: MethodId) -> String {
    class
        .method(id)
        .map(|m| m.name.clone())
        .unwrap_or_else(|_| id.to_string())
}
