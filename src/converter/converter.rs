//! Tree-to-entity conversion of definitions.
//!
//! The `Converter` turns class, function and decorated definitions into
//! entities and resolves module-level names it cannot find elsewhere through
//! the module's reflection collaborator. Statements and values are handled in
//! the sibling `stmt` and `expr` modules.

use std::{cell::RefCell, collections::HashSet, rc::Rc};

use indexmap::IndexMap;
use tracing::debug;

use crate::{
    ast::ast::{Node, Symbol},
    entity::{
        entity::{Entity, EntityKind},
        scope::{bind, ExternalResolver, ModuleReflection},
    },
    errors::errors::{Error, ErrorImpl},
    formula::{
        builtins::Builtins,
        formula::{check_formula_signature, dedent, specialize_formula},
    },
    lexer::tokens::TokenKind,
    parser::parser::parse_source,
    Position, ENSURE_SHAPE,
};

use super::{
    expr::{convert_arguments, convert_value, is_docstring},
    stmt::convert_suite,
};

/// How a function definition is checked.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FunctionRule {
    /// Any parameter list.
    Plain,
    /// Exactly `(self, simulation_context, period)`.
    Formula,
}

pub struct Converter {
    builtins: Rc<Builtins>,
}

impl Converter {
    pub fn new(builtins: Rc<Builtins>) -> Self {
        Converter { builtins }
    }

    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Creates the root scope for `node`, seeded with the built-in environment.
    pub fn create_module(
        &self,
        node: &Rc<Node>,
        reflection: Option<Rc<dyn ModuleReflection>>,
    ) -> Rc<Entity> {
        Entity::new_cyclic(Some(node), |module| EntityKind::Module {
            symbols: RefCell::new(IndexMap::new()),
            builtins: self.builtins.seed(module),
            reflection,
            pending: RefCell::new(HashSet::new()),
            trees: RefCell::new(vec![]),
        })
    }

    /// classdef: 'class' NAME '(' NAME ')' ':' suite
    pub fn convert_class(
        &self,
        node: &Rc<Node>,
        container: &Rc<Entity>,
        method_rule: FunctionRule,
    ) -> Result<Rc<Entity>, Error> {
        ENSURE_SHAPE!(node.is_symbol(Symbol::ClassDef), node, "a class definition");

        if node.children.len() != 7 {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&node.kind, "a class must derive from exactly one base class"),
                node,
            ));
        }

        let children = &node.children;
        ENSURE_SHAPE!(children[0].is_keyword("class"), node, "`class` keyword");
        ENSURE_SHAPE!(children[1].is_token(TokenKind::Name), node, "a class name");
        ENSURE_SHAPE!(children[2].is_token(TokenKind::LPar), node, "`(` after the class name");
        ENSURE_SHAPE!(children[4].is_token(TokenKind::RPar), node, "`)` after the base class");
        ENSURE_SHAPE!(children[5].is_token(TokenKind::Colon), node, "`:` before the class body");

        let base = &children[3];
        if base.is_symbol(Symbol::ArgList) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&base.kind, "multiple inheritance"),
                base,
            ));
        }
        if !base.is_token(TokenKind::Name) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&base.kind, "base class must be a plain name"),
                base,
            ));
        }

        let name = children[1].value.clone();
        let class = Entity::new(
            EntityKind::Class {
                name: name.clone(),
                base_class_name: base.value.clone(),
                symbols: RefCell::new(IndexMap::new()),
            },
            Some(container),
            Some(node),
        );

        let suite = &children[6];
        if !suite.is_symbol(Symbol::Suite) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&suite.kind, "class body must be an indented block"),
                suite,
            ));
        }

        for member in suite_statements(suite)? {
            self.convert_class_member(member, &class, method_rule)?;
        }

        debug!(class = %name, base = %base.value, "converted class");
        Ok(class)
    }

    fn convert_class_member(
        &self,
        node: &Rc<Node>,
        class: &Rc<Entity>,
        method_rule: FunctionRule,
    ) -> Result<(), Error> {
        match node.symbol() {
            Some(Symbol::FuncDef) => {
                let function = self.convert_function(node, class, method_rule)?;
                if let Some(name) = function.name() {
                    bind(class, name, Rc::clone(&function));
                }
                Ok(())
            }
            Some(Symbol::Decorated) => {
                let decorator = self.convert_decorated(node, class, method_rule)?;
                if let EntityKind::Decorator { decorated, .. } = &decorator.kind {
                    if let Some(name) = decorated.name() {
                        bind(class, name, Rc::clone(&decorator));
                    }
                }
                Ok(())
            }
            Some(Symbol::SimpleStmt) => {
                ENSURE_SHAPE!(node.children.len() == 2, node, "a statement followed by a newline");
                let statement = &node.children[0];

                if is_docstring(statement) || statement.is_keyword("pass") {
                    return Ok(());
                }

                // Attributes name host objects outside the model: check the shape only.
                if statement.is_symbol(Symbol::ExprStmt) {
                    ENSURE_SHAPE!(statement.children.len() == 3, statement, "`name = value`");
                    ENSURE_SHAPE!(
                        statement.children[0].is_token(TokenKind::Name),
                        statement,
                        "a plain name on the left of a class attribute"
                    );
                    ENSURE_SHAPE!(
                        statement.children[1].is_token(TokenKind::Equal),
                        statement,
                        "`=` in a class attribute"
                    );
                    return Ok(());
                }

                Err(Error::at_node(
                    ErrorImpl::unsupported(&statement.kind, "statement in class body"),
                    statement,
                ))
            }
            _ => Err(Error::at_node(
                ErrorImpl::unsupported(&node.kind, "statement in class body"),
                node,
            )),
        }
    }

    /// funcdef: 'def' NAME parameters ':' suite
    pub fn convert_function(
        &self,
        node: &Rc<Node>,
        container: &Rc<Entity>,
        rule: FunctionRule,
    ) -> Result<Rc<Entity>, Error> {
        ENSURE_SHAPE!(node.is_symbol(Symbol::FuncDef), node, "a function definition");
        ENSURE_SHAPE!(node.children.len() == 5, node, "5 children");

        let children = &node.children;
        ENSURE_SHAPE!(children[0].is_keyword("def"), node, "`def` keyword");
        ENSURE_SHAPE!(children[1].is_token(TokenKind::Name), node, "a function name");
        ENSURE_SHAPE!(children[3].is_token(TokenKind::Colon), node, "`:` before the function body");

        let name = children[1].value.clone();
        if rule == FunctionRule::Formula {
            check_formula_signature(&children[2])?;
        }
        let parameters = self.convert_parameters(&children[2], container)?;

        let function = Entity::new(
            EntityKind::function(
                name.as_str(),
                parameters.positional.clone(),
                parameters.named.clone(),
            ),
            Some(container),
            Some(node),
        );

        for parameter in &parameters.positional {
            let variable = Entity::new(EntityKind::variable(parameter.as_str(), None), Some(&function), None);
            bind(&function, parameter, variable);
        }
        for (parameter, default) in &parameters.named {
            let variable = Entity::new(
                EntityKind::variable(parameter.as_str(), Some(Rc::clone(default))),
                Some(&function),
                None,
            );
            bind(&function, parameter, variable);
        }

        if rule == FunctionRule::Formula {
            specialize_formula(&function);
        }

        let body = convert_suite(self, &children[4], &function)?;
        if let EntityKind::Function { body: slot, .. } = &function.kind {
            *slot.borrow_mut() = body;
        }

        debug!(function = %name, ?rule, statements = function.body().len(), "converted function");
        Ok(function)
    }

    /// parameters: '(' [NAME | typedargslist] ')'
    fn convert_parameters(&self, node: &Rc<Node>, container: &Rc<Entity>) -> Result<Parameters, Error> {
        ENSURE_SHAPE!(node.is_symbol(Symbol::Parameters), node, "a parameter list");
        ENSURE_SHAPE!(
            node.children.len() == 2 || node.children.len() == 3,
            node,
            "parentheses around the parameters"
        );
        ENSURE_SHAPE!(node.children[0].is_token(TokenKind::LPar), node, "`(`");
        ENSURE_SHAPE!(
            node.children[node.children.len() - 1].is_token(TokenKind::RPar),
            node,
            "`)`"
        );

        let mut parameters = Parameters {
            positional: vec![],
            named: IndexMap::new(),
        };

        if node.children.len() == 2 {
            return Ok(parameters);
        }

        let list = &node.children[1];
        let items: Vec<Rc<Node>> = if list.is_symbol(Symbol::TypedArgsList) {
            list.children.clone()
        } else {
            vec![Rc::clone(list)]
        };

        let mut index = 0;
        while index < items.len() {
            let item = &items[index];
            if item.is_token(TokenKind::Star) || item.is_token(TokenKind::DoubleStar) {
                return Err(Error::at_node(
                    ErrorImpl::unsupported(&item.kind, "variadic parameters"),
                    list,
                ));
            }
            ENSURE_SHAPE!(item.is_token(TokenKind::Name), list, "a parameter name");
            let name = item.value.clone();
            index += 1;

            if index < items.len() && items[index].is_token(TokenKind::Equal) {
                let default = items.get(index + 1).ok_or_else(|| {
                    Error::at_node(ErrorImpl::malformed(&list.kind, "a default value after `=`"), list)
                })?;
                // Defaults are evaluated where the function is defined.
                let value = convert_value(self, default, container)?;
                parameters.named.insert(name, value);
                index += 2;
            } else {
                if !parameters.named.is_empty() {
                    return Err(Error::at_node(
                        ErrorImpl::malformed(&list.kind, "positional parameters before named ones"),
                        list,
                    ));
                }
                parameters.positional.push(name);
            }

            if index < items.len() {
                ENSURE_SHAPE!(items[index].is_token(TokenKind::Comma), list, "`,` between parameters");
                index += 1;
            }
        }

        Ok(parameters)
    }

    /// decorated: decorator funcdef
    pub fn convert_decorated(
        &self,
        node: &Rc<Node>,
        container: &Rc<Entity>,
        rule: FunctionRule,
    ) -> Result<Rc<Entity>, Error> {
        ENSURE_SHAPE!(node.is_symbol(Symbol::Decorated), node, "a decorated definition");
        ENSURE_SHAPE!(node.children.len() == 2, node, "a decorator and a definition");

        let decorator = &node.children[0];
        if decorator.is_symbol(Symbol::Decorators) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&decorator.kind, "stacked decorators"),
                decorator,
            ));
        }
        ENSURE_SHAPE!(decorator.is_symbol(Symbol::Decorator), decorator, "a decorator");

        let parts = &decorator.children;
        ENSURE_SHAPE!(
            matches!(parts.len(), 3 | 5 | 6),
            decorator,
            "`@name`, `@name()` or `@name(arguments)`"
        );
        ENSURE_SHAPE!(parts[0].is_token(TokenKind::At), decorator, "`@`");
        ENSURE_SHAPE!(
            parts[parts.len() - 1].is_token(TokenKind::Newline),
            decorator,
            "a newline after the decorator"
        );

        let name_node = &parts[1];
        if !name_node.is_token(TokenKind::Name) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&name_node.kind, "dotted decorator name"),
                name_node,
            ));
        }
        let name = name_node.value.clone();

        // Decorators are host objects and stay unresolved.
        let mut subject = Entity::new(
            EntityKind::variable(name.as_str(), None),
            Some(container),
            Some(name_node),
        );

        if parts.len() > 3 {
            ENSURE_SHAPE!(parts[2].is_token(TokenKind::LPar), decorator, "`(` after the decorator name");
            ENSURE_SHAPE!(
                parts[parts.len() - 2].is_token(TokenKind::RPar),
                decorator,
                "`)` closing the decorator arguments"
            );
            let (positional, named) = match parts.len() {
                6 => convert_arguments(self, &parts[3], container)?,
                _ => (vec![], IndexMap::new()),
            };
            subject = Entity::new(
                EntityKind::Call {
                    subject,
                    positional,
                    named,
                },
                Some(container),
                Some(decorator),
            );
        }

        let definition = &node.children[1];
        if !definition.is_symbol(Symbol::FuncDef) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&definition.kind, "only functions can be decorated"),
                definition,
            ));
        }
        let decorated = self.convert_function(definition, container, rule)?;

        debug!(decorator = %name, "converted decorated function");
        Ok(Entity::new(
            EntityKind::Decorator {
                name,
                subject,
                decorated,
            },
            Some(container),
            Some(node),
        ))
    }

    /// Converts the module-level function `name` found through reflection.
    fn convert_helper(&self, module: &Rc<Entity>, name: &str) -> Result<Option<Rc<Entity>>, Error> {
        let EntityKind::Module {
            reflection,
            pending,
            trees,
            ..
        } = &module.kind
        else {
            return Ok(None);
        };

        let Some(source) = reflection.as_ref().and_then(|reflection| reflection.lookup_function(name)) else {
            return Ok(None);
        };

        if pending.borrow().contains(name) {
            return Err(Error::new(
                ErrorImpl::unsupported(name, "recursive helper reference"),
                Position::null(),
            ));
        }

        let tree = parse_source(&dedent(&source), Some(format!("<helper {}>", name)))?;
        let definition = match tree.children.as_slice() {
            [definition, end] if definition.is_symbol(Symbol::FuncDef) && end.is_token(TokenKind::EndMarker) => {
                Rc::clone(definition)
            }
            _ => {
                return Err(Error::at_node(
                    ErrorImpl::unsupported(
                        &tree.kind,
                        format!("helper `{}` must be exactly one function definition", name),
                    ),
                    &tree,
                ))
            }
        };

        pending.borrow_mut().insert(name.to_string());
        let converted = self.convert_function(&definition, module, FunctionRule::Plain);
        pending.borrow_mut().remove(name);
        let function = converted?;

        trees.borrow_mut().push(tree);
        bind(module, name, Rc::clone(&function));

        debug!(helper = %name, "converted helper function");
        Ok(Some(function))
    }
}

impl ExternalResolver for Converter {
    fn resolve_external(&self, module: &Rc<Entity>, name: &str) -> Result<Option<Rc<Entity>>, Error> {
        self.convert_helper(module, name)
    }
}

struct Parameters {
    positional: Vec<String>,
    named: IndexMap<String, Rc<Entity>>,
}

/// Statements of an indented block, without its NEWLINE, INDENT and DEDENT.
pub fn suite_statements(suite: &Rc<Node>) -> Result<&[Rc<Node>], Error> {
    let children = &suite.children;
    ENSURE_SHAPE!(children.len() > 3, suite, "an indented block");
    ENSURE_SHAPE!(children[0].is_token(TokenKind::Newline), suite, "a newline before the block");
    ENSURE_SHAPE!(children[1].is_token(TokenKind::Indent), suite, "an indent");
    ENSURE_SHAPE!(
        children[children.len() - 1].is_token(TokenKind::Dedent),
        suite,
        "a dedent closing the block"
    );

    Ok(&children[2..children.len() - 1])
}
