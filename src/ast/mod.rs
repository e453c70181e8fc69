/// AST module
/// Contains the concrete syntax tree consumed by the converter
///
/// Submodules:
/// - ast: Node kinds, grammar symbols and the tree node itself
pub mod ast;
