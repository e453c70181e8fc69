use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::entity::entity::{Entity, EntityKind, PrimitiveType};

/// Role codes of household members.
const ROLE_CODES: [(&str, &str); 9] = [
    ("CHEF", "0"),
    ("CONJ", "1"),
    ("CREF", "1"),
    ("PAC1", "2"),
    ("PAC2", "3"),
    ("PAC3", "4"),
    ("PART", "1"),
    ("PREF", "0"),
    ("VOUS", "0"),
];

const HELPER_FUNCTIONS: [&str; 3] = ["date", "max_", "min_"];

/// What a built-in name stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinValue {
    /// Numeric constant, kept as literal text.
    Number(String),
    Enum(Option<String>),
    Type(PrimitiveType),
    /// Root of the parameter schedule tree.
    LawRoot,
    Logger,
    /// Opaque helper function.
    Function,
}

/// The built-in environment seeded into every module of a session.
#[derive(Debug, Clone, Default)]
pub struct Builtins {
    entries: IndexMap<String, BuiltinValue>,
}

impl Builtins {
    pub fn empty() -> Self {
        Builtins::default()
    }

    /// Role codes, `TAUX_DE_PRIME`, `CAT`, `int16`/`int32`, `law`, `log`, `date`, `min_` and `max_`.
    pub fn formula_environment() -> Self {
        let mut builtins = Builtins::empty();

        for (name, value) in ROLE_CODES {
            builtins.insert(name, BuiltinValue::Number(value.to_string()));
        }
        builtins.insert("TAUX_DE_PRIME", BuiltinValue::Number(String::from("0.25")));
        builtins.insert("CAT", BuiltinValue::Enum(None));
        builtins.insert("int16", BuiltinValue::Type(PrimitiveType::Int16));
        builtins.insert("int32", BuiltinValue::Type(PrimitiveType::Int32));
        builtins.insert("law", BuiltinValue::LawRoot);
        builtins.insert("log", BuiltinValue::Logger);
        for name in HELPER_FUNCTIONS {
            builtins.insert(name, BuiltinValue::Function);
        }

        builtins
    }

    /// Adds or replaces an entry, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: BuiltinValue) -> Option<BuiltinValue> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinValue> {
        self.entries.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Creates the entities of the environment for one module.
    ///
    /// Functions are bound directly; every other value is wrapped in a variable
    /// of the same name.
    pub fn seed(&self, module: &Weak<Entity>) -> IndexMap<String, Rc<Entity>> {
        self.entries
            .iter()
            .map(|(name, value)| {
                let entity = match value {
                    BuiltinValue::Number(value) => constant(
                        name,
                        EntityKind::Number {
                            value: value.clone(),
                        },
                        module,
                    ),
                    BuiltinValue::Enum(value) => constant(
                        name,
                        EntityKind::Enum {
                            value: value.clone(),
                        },
                        module,
                    ),
                    BuiltinValue::Type(primitive) => constant(
                        name,
                        EntityKind::Type {
                            primitive: *primitive,
                        },
                        module,
                    ),
                    BuiltinValue::LawRoot => constant(
                        name,
                        EntityKind::LawNode {
                            name: None,
                            parent: None,
                            is_reference: false,
                        },
                        module,
                    ),
                    BuiltinValue::Logger => constant(name, EntityKind::Logger, module),
                    BuiltinValue::Function => Entity::new_in(
                        EntityKind::function(name.as_str(), vec![], IndexMap::new()),
                        module,
                    ),
                };
                (name.clone(), entity)
            })
            .collect()
    }
}

fn constant(name: &str, kind: EntityKind, module: &Weak<Entity>) -> Rc<Entity> {
    let value = Entity::new_in(kind, module);
    Entity::new_in(EntityKind::variable(name, Some(value)), module)
}
