use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::ast::{Node, Symbol},
    converter::converter::{Converter, FunctionRule},
    entity::{
        entity::{Entity, EntityKind},
        scope::{bind, ModuleReflection},
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    parser::parser::parse_source,
};

use super::builtins::Builtins;

/// The calling convention of every formula.
pub const FORMULA_PARAMETERS: [&str; 3] = ["self", "simulation_context", "period"];

/// Removes the indentation shared by every non-blank line.
pub fn dedent(source: &str) -> String {
    let is_indent = |c: char| c == ' ' || c == '\t';

    let indent = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(is_indent).len())
        .min()
        .unwrap_or(0);

    if indent == 0 {
        return source.to_string();
    }

    source
        .split_inclusive('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.trim_start_matches(is_indent)
            } else {
                &line[indent..]
            }
        })
        .collect()
}

/// Checks that a parameter list is exactly `(self, simulation_context, period)`.
///
/// Runs on the syntax tree, before any default value is converted.
pub fn check_formula_signature(parameters: &Rc<Node>) -> Result<(), Error> {
    let items: &[Rc<Node>] = match parameters.children.as_slice() {
        [_, list, _] if list.is_symbol(Symbol::TypedArgsList) => list.children.as_slice(),
        [_, list, _] => std::slice::from_ref(list),
        _ => &[],
    };

    let mut declared = vec![];
    let mut plain = true;
    let mut index = 0;
    while index < items.len() {
        let item = &items[index];
        if item.is_token(TokenKind::Star) || item.is_token(TokenKind::DoubleStar) {
            let name = items.get(index + 1).map(|name| name.value.as_str()).unwrap_or_default();
            declared.push(format!("{}{}", item.value, name));
            plain = false;
            index += 2;
        } else if item.is_token(TokenKind::Equal) {
            // Skip the default value.
            plain = false;
            index += 2;
        } else {
            if !item.is_token(TokenKind::Comma) {
                declared.push(item.value.clone());
            }
            index += 1;
        }
    }

    if plain && declared.iter().map(String::as_str).eq(FORMULA_PARAMETERS) {
        return Ok(());
    }

    Err(Error::at_node(
        ErrorImpl::UnsupportedFormulaSignature {
            parameters: declared.join(", "),
        },
        parameters,
    ))
}

/// Binds the types of the `simulation_context` and `period` parameters of a
/// formula whose signature passed `check_formula_signature`.
///
/// Must run before the body is converted.
pub fn specialize_formula(function: &Rc<Entity>) {
    let tags = [
        ("simulation_context", EntityKind::Simulation),
        ("period", EntityKind::Period),
    ];
    for (parameter, tag) in tags {
        if let Some(variable) = function.member(parameter) {
            variable.bind_value(Entity::new(tag, Some(function), None));
        }
    }

    debug!(formula = ?function.name(), "specialized formula signature");
}

/// A converted formula: the syntax tree, the module built for it and the
/// converted class or function.
pub struct FormulaTree {
    tree: Rc<Node>,
    module: Rc<Entity>,
    root: Rc<Entity>,
    source: String,
}

impl FormulaTree {
    pub fn tree(&self) -> &Rc<Node> {
        &self.tree
    }

    pub fn module(&self) -> &Rc<Entity> {
        &self.module
    }

    pub fn root(&self) -> &Rc<Entity> {
        &self.root
    }

    /// The dedented source the tree was built from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Formula functions of the root, in definition order. Decorated methods
    /// are listed by the function they decorate.
    pub fn formulas(&self) -> Vec<Rc<Entity>> {
        match &self.root.kind {
            EntityKind::Function { .. } => vec![Rc::clone(&self.root)],
            EntityKind::Class { symbols, .. } => symbols
                .borrow()
                .values()
                .filter_map(|member| match &member.kind {
                    EntityKind::Function { .. } => Some(Rc::clone(member)),
                    EntityKind::Decorator { decorated, .. } => Some(Rc::clone(decorated)),
                    _ => None,
                })
                .collect(),
            _ => vec![],
        }
    }
}

/// A conversion session sharing one built-in environment.
pub struct FormulaParser {
    converter: Converter,
}

impl Default for FormulaParser {
    fn default() -> Self {
        FormulaParser::new(Builtins::formula_environment())
    }
}

impl FormulaParser {
    pub fn new(builtins: Builtins) -> Self {
        FormulaParser {
            converter: Converter::new(Rc::new(builtins)),
        }
    }

    pub fn builtins(&self) -> &Builtins {
        self.converter.builtins()
    }

    /// Converts a source holding exactly one formula class.
    pub fn parse_formula_class(
        &self,
        source: &str,
        file: Option<String>,
        reflection: Option<Rc<dyn ModuleReflection>>,
    ) -> Result<FormulaTree, Error> {
        self.parse_definition(source, file, reflection, Symbol::ClassDef)
    }

    /// Converts a source holding exactly one formula function.
    pub fn parse_formula_function(
        &self,
        source: &str,
        file: Option<String>,
        reflection: Option<Rc<dyn ModuleReflection>>,
    ) -> Result<FormulaTree, Error> {
        self.parse_definition(source, file, reflection, Symbol::FuncDef)
    }

    /// Converts each source on its own; one failure does not affect the others.
    pub fn parse_formula_classes(
        &self,
        sources: &[&str],
        reflection: Option<Rc<dyn ModuleReflection>>,
    ) -> Vec<Result<FormulaTree, Error>> {
        sources
            .iter()
            .enumerate()
            .map(|(index, source)| {
                self.parse_formula_class(source, Some(format!("<formula {}>", index)), reflection.clone())
            })
            .collect()
    }

    fn parse_definition(
        &self,
        source: &str,
        file: Option<String>,
        reflection: Option<Rc<dyn ModuleReflection>>,
        symbol: Symbol,
    ) -> Result<FormulaTree, Error> {
        let source = dedent(source);
        let tree = parse_source(&source, file)?;

        let definition = match tree.children.as_slice() {
            [definition, end] if definition.is_symbol(symbol) && end.is_token(TokenKind::EndMarker) => {
                Rc::clone(definition)
            }
            _ => {
                return Err(Error::at_node(
                    ErrorImpl::unsupported(&tree.kind, format!("source must hold exactly one {}", symbol)),
                    &tree,
                ))
            }
        };

        let module = self.converter.create_module(&tree, reflection);
        let root = match symbol {
            Symbol::ClassDef => self.converter.convert_class(&definition, &module, FunctionRule::Formula)?,
            _ => self.converter.convert_function(&definition, &module, FunctionRule::Formula)?,
        };
        if let Some(name) = root.name() {
            bind(&module, name, Rc::clone(&root));
        }

        debug!(root = %root, kind = root.kind_name(), "converted formula source");
        Ok(FormulaTree {
            tree,
            module,
            root,
            source,
        })
    }
}

/// Module reflection over a fixed table of function sources.
#[derive(Debug, Clone, Default)]
pub struct StaticModule {
    functions: IndexMap<String, String>,
}

impl StaticModule {
    pub fn new() -> Self {
        StaticModule::default()
    }

    pub fn with_function(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) {
        self.functions.insert(name.into(), source.into());
    }
}

impl ModuleReflection for StaticModule {
    fn lookup_function(&self, name: &str) -> Option<String> {
        self.functions.get(name).cloned()
    }
}
