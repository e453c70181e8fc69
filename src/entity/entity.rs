use std::{
    cell::{OnceCell, RefCell},
    collections::HashSet,
    fmt::{Debug, Display},
    rc::{Rc, Weak},
};

use indexmap::IndexMap;

use crate::ast::ast::{Node, Symbol};

use super::scope::{ModuleReflection, SymbolTable};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AssignOperator {
    Assign,
    Add,
    Subtract,
    Multiply,
}

impl AssignOperator {
    pub fn from_token(text: &str) -> Option<AssignOperator> {
        match text {
            "=" => Some(AssignOperator::Assign),
            "+=" => Some(AssignOperator::Add),
            "-=" => Some(AssignOperator::Subtract),
            "*=" => Some(AssignOperator::Multiply),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AssignOperator::Assign => "=",
            AssignOperator::Add => "+=",
            AssignOperator::Subtract => "-=",
            AssignOperator::Multiply => "*=",
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum KeyValue {
    String(String),
    Integer(i64),
}

impl Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::String(value) => write!(f, "'{}'", value),
            KeyValue::Integer(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PrimitiveType {
    Int16,
    Int32,
}

impl PrimitiveType {
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Int32 => "int32",
        }
    }
}

/// One arm of a conditional. `test` is `None` for the `else` arm.
pub struct Branch {
    pub test: Option<Rc<Entity>>,
    pub body: Vec<Rc<Entity>>,
}

pub enum EntityKind {
    Assignment {
        operator: AssignOperator,
        variables: Vec<Rc<Entity>>,
    },
    Attribute {
        subject: Rc<Entity>,
        name: String,
    },
    Call {
        subject: Rc<Entity>,
        positional: Vec<Rc<Entity>>,
        named: IndexMap<String, Rc<Entity>>,
    },
    Class {
        name: String,
        base_class_name: String,
        symbols: SymbolTable,
    },
    Conditional {
        branches: Vec<Branch>,
    },
    Date,
    Decorator {
        name: String,
        subject: Rc<Entity>,
        decorated: Rc<Entity>,
    },
    Enum {
        value: Option<String>,
    },
    Function {
        name: String,
        positional_parameters: Vec<String>,
        named_parameters: IndexMap<String, Rc<Entity>>,
        body: RefCell<Vec<Rc<Entity>>>,
        returns: RefCell<Vec<Rc<Entity>>>,
        symbols: SymbolTable,
    },
    Instant,
    Key {
        subject: Rc<Entity>,
        key: KeyValue,
    },
    /// A node of the parameter schedule tree. The root has neither name nor parent.
    LawNode {
        name: Option<String>,
        parent: Option<Rc<Entity>>,
        is_reference: bool,
    },
    Logger,
    Loop {
        targets: Vec<Rc<Entity>>,
        iterable: Rc<Entity>,
        body: Vec<Rc<Entity>>,
        orelse: Vec<Rc<Entity>>,
    },
    Module {
        symbols: SymbolTable,
        builtins: IndexMap<String, Rc<Entity>>,
        reflection: Option<Rc<dyn ModuleReflection>>,
        /// Helper functions currently being converted.
        pending: RefCell<HashSet<String>>,
        /// Syntax trees of converted helpers, kept alive for their entities.
        trees: RefCell<Vec<Rc<Node>>>,
    },
    Number {
        value: String,
    },
    Period,
    Return {
        value: Rc<Entity>,
    },
    Simulation,
    String {
        value: String,
    },
    Tuple {
        items: Vec<Rc<Entity>>,
    },
    Type {
        primitive: PrimitiveType,
    },
    Unimplemented {
        construct: Symbol,
    },
    Variable {
        name: String,
        value: OnceCell<Rc<Entity>>,
    },
}

impl EntityKind {
    /// A function with parameters and an empty body, filled in afterwards.
    pub fn function(
        name: impl Into<String>,
        positional_parameters: Vec<String>,
        named_parameters: IndexMap<String, Rc<Entity>>,
    ) -> EntityKind {
        EntityKind::Function {
            name: name.into(),
            positional_parameters,
            named_parameters,
            body: RefCell::new(vec![]),
            returns: RefCell::new(vec![]),
            symbols: RefCell::new(IndexMap::new()),
        }
    }

    pub fn variable(name: impl Into<String>, value: Option<Rc<Entity>>) -> EntityKind {
        let cell = OnceCell::new();
        if let Some(value) = value {
            let _ = cell.set(value);
        }
        EntityKind::Variable {
            name: name.into(),
            value: cell,
        }
    }
}

/// Memoized guess of an entity.
pub enum GuessSlot {
    Itself,
    Entity(Rc<Entity>),
    Unknown,
}

impl GuessSlot {
    pub fn resolve(&self, entity: &Rc<Entity>) -> Option<Rc<Entity>> {
        match self {
            GuessSlot::Itself => Some(Rc::clone(entity)),
            GuessSlot::Entity(guess) => Some(Rc::clone(guess)),
            GuessSlot::Unknown => None,
        }
    }
}

/// A semantic node of the formula model.
pub struct Entity {
    pub kind: EntityKind,
    container: Option<Weak<Entity>>,
    node: Option<Weak<Node>>,
    guess: OnceCell<GuessSlot>,
}

impl Entity {
    pub fn new(kind: EntityKind, container: Option<&Rc<Entity>>, node: Option<&Rc<Node>>) -> Rc<Entity> {
        Rc::new(Entity {
            kind,
            container: container.map(Rc::downgrade),
            node: node.map(Rc::downgrade),
            guess: OnceCell::new(),
        })
    }

    /// Creates an entity whose container is still under construction.
    pub fn new_in(kind: EntityKind, container: &Weak<Entity>) -> Rc<Entity> {
        Rc::new(Entity {
            kind,
            container: Some(Weak::clone(container)),
            node: None,
            guess: OnceCell::new(),
        })
    }

    /// Creates an entity that hands a weak reference to itself to its own parts.
    pub fn new_cyclic(
        node: Option<&Rc<Node>>,
        build: impl FnOnce(&Weak<Entity>) -> EntityKind,
    ) -> Rc<Entity> {
        Rc::new_cyclic(|weak| Entity {
            kind: build(weak),
            container: None,
            node: node.map(Rc::downgrade),
            guess: OnceCell::new(),
        })
    }

    pub fn container(&self) -> Option<Rc<Entity>> {
        self.container.as_ref().and_then(Weak::upgrade)
    }

    /// The source node, if the tree it belongs to is still alive.
    pub fn node(&self) -> Option<Rc<Node>> {
        self.node.as_ref().and_then(Weak::upgrade)
    }

    pub fn guess_slot(&self) -> &OnceCell<GuessSlot> {
        &self.guess
    }

    pub fn symbols(&self) -> Option<&SymbolTable> {
        match &self.kind {
            EntityKind::Class { symbols, .. }
            | EntityKind::Function { symbols, .. }
            | EntityKind::Module { symbols, .. } => Some(symbols),
            _ => None,
        }
    }

    pub fn is_scope(&self) -> bool {
        self.symbols().is_some()
    }

    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            EntityKind::Class { name, .. }
            | EntityKind::Function { name, .. }
            | EntityKind::Variable { name, .. }
            | EntityKind::Decorator { name, .. } => Some(name),
            EntityKind::LawNode { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    /// Bound value of a variable.
    pub fn value(&self) -> Option<Rc<Entity>> {
        match &self.kind {
            EntityKind::Variable { value, .. } => value.get().cloned(),
            EntityKind::Return { value } => Some(Rc::clone(value)),
            _ => None,
        }
    }

    /// Binds a variable that has no value yet. Returns false if it is not an unbound variable.
    pub fn bind_value(&self, entity: Rc<Entity>) -> bool {
        match &self.kind {
            EntityKind::Variable { value, .. } => value.set(entity).is_ok(),
            _ => false,
        }
    }

    pub fn body(&self) -> Vec<Rc<Entity>> {
        match &self.kind {
            EntityKind::Function { body, .. } => body.borrow().clone(),
            _ => vec![],
        }
    }

    pub fn returns(&self) -> Vec<Rc<Entity>> {
        match &self.kind {
            EntityKind::Function { returns, .. } => returns.borrow().clone(),
            _ => vec![],
        }
    }

    /// Looks a name up in this entity's own symbol table only.
    pub fn member(&self, name: &str) -> Option<Rc<Entity>> {
        self.symbols().and_then(|symbols| symbols.borrow().get(name).cloned())
    }

    pub fn containing_function(self: &Rc<Self>) -> Option<Rc<Entity>> {
        self.ancestor(|entity| matches!(entity.kind, EntityKind::Function { .. }))
    }

    pub fn containing_class(self: &Rc<Self>) -> Option<Rc<Entity>> {
        self.ancestor(|entity| matches!(entity.kind, EntityKind::Class { .. }))
    }

    pub fn containing_module(self: &Rc<Self>) -> Option<Rc<Entity>> {
        self.ancestor(|entity| matches!(entity.kind, EntityKind::Module { .. }))
    }

    /// Self or the closest container satisfying `predicate`.
    fn ancestor(self: &Rc<Self>, predicate: impl Fn(&Entity) -> bool) -> Option<Rc<Entity>> {
        let mut current = Some(Rc::clone(self));
        while let Some(entity) = current {
            if predicate(&entity) {
                return Some(entity);
            }
            current = entity.container();
        }
        None
    }

    /// Dot-joined names from the law root, the root itself being empty.
    pub fn law_path(&self) -> Option<String> {
        match &self.kind {
            EntityKind::LawNode { name, parent, .. } => {
                let mut path = parent.as_ref().and_then(|parent| parent.law_path()).unwrap_or_default();
                if let Some(name) = name {
                    if !path.is_empty() {
                        path.push('.');
                    }
                    path.push_str(name);
                }
                Some(path)
            }
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            EntityKind::Assignment { .. } => "Assignment",
            EntityKind::Attribute { .. } => "Attribute",
            EntityKind::Call { .. } => "Call",
            EntityKind::Class { .. } => "Class",
            EntityKind::Conditional { .. } => "Conditional",
            EntityKind::Date => "Date",
            EntityKind::Decorator { .. } => "Decorator",
            EntityKind::Enum { .. } => "Enum",
            EntityKind::Function { .. } => "Function",
            EntityKind::Instant => "Instant",
            EntityKind::Key { .. } => "Key",
            EntityKind::LawNode { .. } => "LawNode",
            EntityKind::Logger => "Logger",
            EntityKind::Loop { .. } => "Loop",
            EntityKind::Module { .. } => "Module",
            EntityKind::Number { .. } => "Number",
            EntityKind::Period => "Period",
            EntityKind::Return { .. } => "Return",
            EntityKind::Simulation => "Simulation",
            EntityKind::String { .. } => "String",
            EntityKind::Tuple { .. } => "Tuple",
            EntityKind::Type { .. } => "Type",
            EntityKind::Unimplemented { .. } => "Unimplemented",
            EntityKind::Variable { .. } => "Variable",
        }
    }
}

fn write_list(f: &mut std::fmt::Formatter<'_>, items: &[Rc<Entity>]) -> std::fmt::Result {
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            EntityKind::Assignment { operator, variables } => {
                let names: Vec<&str> = variables.iter().filter_map(|variable| variable.name()).collect();
                let values: Vec<Rc<Entity>> = variables.iter().filter_map(|variable| variable.value()).collect();
                write!(f, "{} {} ", names.join(", "), operator.as_str())?;
                write_list(f, &values)
            }
            EntityKind::Attribute { subject, name } => write!(f, "{}.{}", subject, name),
            EntityKind::Call { subject, positional, named } => {
                write!(f, "{}(", subject)?;
                write_list(f, positional)?;
                for (index, (name, value)) in named.iter().enumerate() {
                    if index > 0 || !positional.is_empty() {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", name, value)?;
                }
                write!(f, ")")
            }
            EntityKind::Class { name, .. } | EntityKind::Function { name, .. } => write!(f, "{}", name),
            EntityKind::Conditional { branches } => write!(f, "if ({} branches)", branches.len()),
            EntityKind::Decorator { name, decorated, .. } => write!(f, "@{} {}", name, decorated),
            EntityKind::Enum { value } => match value {
                Some(value) => write!(f, "<Enum {}>", value),
                None => write!(f, "<Enum>"),
            },
            EntityKind::Key { subject, key } => write!(f, "{}[{}]", subject, key),
            EntityKind::LawNode { .. } => match self.law_path() {
                Some(path) if !path.is_empty() => write!(f, "law.{}", path),
                _ => write!(f, "law"),
            },
            EntityKind::Loop { targets, iterable, .. } => {
                write!(f, "for ")?;
                write_list(f, targets)?;
                write!(f, " in {}", iterable)
            }
            EntityKind::Module { .. } => write!(f, "<module>"),
            EntityKind::Number { value } => write!(f, "{}", value),
            EntityKind::Return { value } => write!(f, "return {}", value),
            EntityKind::String { value } => write!(f, "'{}'", value),
            EntityKind::Tuple { items } => {
                write!(f, "(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
            EntityKind::Type { primitive } => write!(f, "<{}>", primitive.name()),
            EntityKind::Unimplemented { construct } => write!(f, "<unimplemented {}>", construct),
            EntityKind::Variable { name, .. } => write!(f, "{}", name),
            EntityKind::Date
            | EntityKind::Instant
            | EntityKind::Logger
            | EntityKind::Period
            | EntityKind::Simulation => write!(f, "<{}>", self.kind_name()),
        }
    }
}

impl Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.kind_name(), self)
    }
}
