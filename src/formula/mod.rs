//! Formula sessions.
//!
//! A `FormulaParser` owns the built-in environment and turns formula sources
//! into `FormulaTree`s, applying the `(self, simulation_context, period)`
//! calling convention to formula methods.

pub mod builtins;
pub mod formula;

#[cfg(test)]
mod tests;
