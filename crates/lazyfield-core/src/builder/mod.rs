/*! Fluent API for constructing classes and method bodies programmatically.
 *
 * Writing instruction vectors by hand means tracking label numbers, short-form local opcodes and
 * owner names for every field access. The builders handle that bookkeeping and report the first
 * misuse (wrong operand shape, label placed twice, jump to a label that never appears) when
 * `build` is called.
 */

pub mod class_builder;
pub mod method_builder;

pub use class_builder::ClassBuilder;
pub use method_builder::MethodBuilder;
