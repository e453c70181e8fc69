use std::rc::Rc;

use tracing::trace;

use crate::{
    ast::ast::{Node, Symbol},
    entity::{
        entity::{AssignOperator, Branch, Entity, EntityKind},
        scope::bind,
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    ENSURE_SHAPE,
};

use super::{
    converter::{suite_statements, Converter, FunctionRule},
    expr::{convert_value, is_docstring, list_items},
};

/// Converts the statements of a block, in order.
///
/// `scope` is the function the block belongs to: conditionals and loops do not
/// open scopes of their own.
pub fn convert_suite(converter: &Converter, suite: &Rc<Node>, scope: &Rc<Entity>) -> Result<Vec<Rc<Entity>>, Error> {
    let statements: &[Rc<Node>] = if suite.is_symbol(Symbol::Suite) {
        suite_statements(suite)?
    } else {
        std::slice::from_ref(suite)
    };

    let mut body = vec![];
    for statement in statements {
        if let Some(entity) = convert_statement(converter, statement, scope)? {
            body.push(entity);
        }
    }

    Ok(body)
}

/// Converts one statement. Docstrings and `pass` produce nothing.
pub fn convert_statement(
    converter: &Converter,
    node: &Rc<Node>,
    scope: &Rc<Entity>,
) -> Result<Option<Rc<Entity>>, Error> {
    trace!(statement = %node.kind, "converting statement");

    match node.symbol() {
        Some(Symbol::SimpleStmt) => {
            ENSURE_SHAPE!(node.children.len() == 2, node, "a statement followed by a newline");
            ENSURE_SHAPE!(node.children[1].is_token(TokenKind::Newline), node, "a newline");
            convert_small_statement(converter, &node.children[0], scope)
        }
        Some(Symbol::IfStmt) => convert_conditional(converter, node, scope).map(Some),
        Some(Symbol::ForStmt) => convert_loop(converter, node, scope).map(Some),
        Some(Symbol::WhileStmt) => Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "while loop"),
            node,
        )),
        Some(Symbol::FuncDef) => {
            let function = converter.convert_function(node, scope, FunctionRule::Plain)?;
            bind(scope, &node.children[1].value, Rc::clone(&function));
            Ok(Some(function))
        }
        Some(Symbol::ClassDef) => {
            let class = converter.convert_class(node, scope, FunctionRule::Plain)?;
            bind(scope, &node.children[1].value, Rc::clone(&class));
            Ok(Some(class))
        }
        Some(Symbol::Decorated) => {
            let decorator = converter.convert_decorated(node, scope, FunctionRule::Plain)?;
            if let EntityKind::Decorator { decorated, .. } = &decorator.kind {
                if let Some(name) = decorated.name() {
                    bind(scope, name, Rc::clone(&decorator));
                }
            }
            Ok(Some(decorator))
        }
        _ => Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "statement"),
            node,
        )),
    }
}

fn convert_small_statement(
    converter: &Converter,
    node: &Rc<Node>,
    scope: &Rc<Entity>,
) -> Result<Option<Rc<Entity>>, Error> {
    if is_docstring(node) || node.is_keyword("pass") {
        return Ok(None);
    }

    if node.is_keyword("return") {
        return Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "return without a value"),
            node,
        ));
    }

    if node.is_keyword("break") || node.is_keyword("continue") {
        return Err(Error::at_node(
            ErrorImpl::unsupported(&node.value, "loop control statement"),
            node,
        ));
    }

    if node.is_keyword("raise") {
        return Err(Error::at_node(ErrorImpl::unsupported(&node.value, "statement"), node));
    }

    match node.symbol() {
        Some(Symbol::ExprStmt) => convert_assignment(converter, node, scope).map(Some),
        Some(Symbol::DelStmt | Symbol::GlobalStmt | Symbol::AssertStmt | Symbol::RaiseStmt) => Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "statement"),
            node,
        )),
        Some(Symbol::ReturnStmt) => {
            ENSURE_SHAPE!(node.children.len() == 2, node, "`return value`");
            let value = convert_value(converter, &node.children[1], scope)?;
            let statement = Entity::new(EntityKind::Return { value }, Some(scope), Some(node));

            if let Some(function) = scope.containing_function() {
                if let EntityKind::Function { returns, .. } = &function.kind {
                    returns.borrow_mut().push(Rc::clone(&statement));
                }
            }

            Ok(Some(statement))
        }
        _ => convert_value(converter, node, scope).map(Some),
    }
}

/// expr_stmt: target ('=' | '+=' | '-=' | '*=') value
fn convert_assignment(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    let children = &node.children;
    if children.len() > 3 {
        return Err(Error::at_node(
            ErrorImpl::unsupported(&node.kind, "chained assignment"),
            node,
        ));
    }
    ENSURE_SHAPE!(children.len() == 3, node, "`target = value`");

    let (target, operator_node, value) = (&children[0], &children[1], &children[2]);
    let operator = AssignOperator::from_token(&operator_node.value).ok_or_else(|| {
        Error::at_node(
            ErrorImpl::unsupported(&operator_node.value, "assignment operator"),
            operator_node,
        )
    })?;

    let pairs = if target.is_symbol(Symbol::TestListStarExpr) {
        if operator != AssignOperator::Assign {
            return Err(Error::at_node(
                ErrorImpl::unsupported(operator.as_str(), "augmented assignment to several targets"),
                node,
            ));
        }
        if !value.is_symbol(Symbol::TestListStarExpr) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&value.kind, "unpacking requires a tuple of values"),
                value,
            ));
        }

        let targets: Vec<&Rc<Node>> = list_items(target).collect();
        let values: Vec<&Rc<Node>> = list_items(value).collect();
        ENSURE_SHAPE!(targets.len() == values.len(), node, "as many values as targets");

        // Every value is converted before any target is bound.
        let values = values
            .into_iter()
            .map(|value| convert_value(converter, value, scope))
            .collect::<Result<Vec<_>, Error>>()?;

        targets.into_iter().zip(values).collect::<Vec<_>>()
    } else {
        vec![(target, convert_value(converter, value, scope)?)]
    };

    let mut variables = vec![];
    for (target, value) in pairs {
        if !target.is_token(TokenKind::Name) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&target.kind, "assignment target must be a plain name"),
                target,
            ));
        }

        let variable = Entity::new(
            EntityKind::variable(target.value.as_str(), Some(value)),
            Some(scope),
            Some(target),
        );
        bind(scope, &target.value, Rc::clone(&variable));
        variables.push(variable);
    }

    Ok(Entity::new(
        EntityKind::Assignment { operator, variables },
        Some(scope),
        Some(node),
    ))
}

/// if_stmt: 'if' test ':' suite ('elif' test ':' suite)* ['else' ':' suite]
fn convert_conditional(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    let children = &node.children;
    let mut branches = vec![];
    let mut index = 0;

    while index < children.len() {
        let keyword = &children[index];
        if keyword.is_keyword("if") || keyword.is_keyword("elif") {
            ENSURE_SHAPE!(index + 3 < children.len(), node, "`test: block` after `if`");
            ENSURE_SHAPE!(children[index + 2].is_token(TokenKind::Colon), node, "`:` after the test");
            let test = convert_value(converter, &children[index + 1], scope)?;
            let body = convert_suite(converter, &children[index + 3], scope)?;
            branches.push(Branch { test: Some(test), body });
            index += 4;
        } else if keyword.is_keyword("else") {
            ENSURE_SHAPE!(index + 3 == children.len(), node, "`else: block` closing the conditional");
            ENSURE_SHAPE!(children[index + 1].is_token(TokenKind::Colon), node, "`:` after `else`");
            let body = convert_suite(converter, &children[index + 2], scope)?;
            branches.push(Branch { test: None, body });
            index += 3;
        } else {
            return Err(Error::at_node(
                ErrorImpl::malformed(&node.kind, "`if`, `elif` or `else`"),
                node,
            ));
        }
    }

    ENSURE_SHAPE!(!branches.is_empty(), node, "at least one branch");
    Ok(Entity::new(EntityKind::Conditional { branches }, Some(scope), Some(node)))
}

/// for_stmt: 'for' exprlist 'in' testlist ':' suite ['else' ':' suite]
fn convert_loop(converter: &Converter, node: &Rc<Node>, scope: &Rc<Entity>) -> Result<Rc<Entity>, Error> {
    let children = &node.children;
    ENSURE_SHAPE!(children.len() == 6 || children.len() == 9, node, "6 or 9 children");
    ENSURE_SHAPE!(children[2].is_keyword("in"), node, "`in` after the loop targets");
    ENSURE_SHAPE!(children[4].is_token(TokenKind::Colon), node, "`:` before the loop body");

    let iterable = convert_value(converter, &children[3], scope)?;

    let mut targets = vec![];
    for target in list_items(&children[1]) {
        if !target.is_token(TokenKind::Name) {
            return Err(Error::at_node(
                ErrorImpl::unsupported(&target.kind, "loop target must be a plain name"),
                target,
            ));
        }
        // Loop targets have no single value to bind.
        let variable = Entity::new(
            EntityKind::variable(target.value.as_str(), None),
            Some(scope),
            Some(target),
        );
        bind(scope, &target.value, Rc::clone(&variable));
        targets.push(variable);
    }

    let body = convert_suite(converter, &children[5], scope)?;
    let orelse = match children.len() {
        9 => {
            ENSURE_SHAPE!(children[6].is_keyword("else"), node, "`else` after the loop body");
            convert_suite(converter, &children[8], scope)?
        }
        _ => vec![],
    };

    Ok(Entity::new(
        EntityKind::Loop {
            targets,
            iterable,
            body,
            orelse,
        },
        Some(scope),
        Some(node),
    ))
}
