/*! Control flow and the lazy initialization check built on it.
 *
 * Deciding whether a field write can run more than once needs the method's control flow graph:
 * which branch guards the write, where the field was copied into a local, and which value reaches
 * the write. The modules here build that graph from a flat instruction stream and layer the
 * candidate, initial value, write and guard analyses on top of it.
 */

pub mod alias;
pub mod candidates;
pub mod cfg;
pub mod check;
pub mod effective_write;
pub mod flow;
pub mod guard;
pub mod initial_values;
pub mod lazy_init;
pub mod session;

pub use alias::{Alias, AliasResolver};
pub use candidates::{Candidate, CandidateMap, Initializers};
pub use cfg::{BasicBlock, BlockId, BlockLabel, ControlFlowGraph};
pub use check::{CheckRunner, CheckStatistics, ClassCheck};
pub use effective_write::{effective_write, EffectiveWrite, WriteVerifier};
pub use flow::{Edge, EdgeKind, FlowError};
pub use guard::{verify_guard, Guard, GuardConflict, GuardResolver, GuardShape};
pub use initial_values::possible_initial_values;
pub use lazy_init::LazyInitializationCheck;
pub use session::{AnalysisSession, SessionStatistics};
