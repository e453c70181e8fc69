use std::{cell::RefCell, rc::Rc};

use indexmap::IndexMap;
use tracing::trace;

use crate::errors::errors::Error;

use super::entity::{Entity, EntityKind};

/// Names bound in a module, class or function, in binding order.
pub type SymbolTable = RefCell<IndexMap<String, Rc<Entity>>>;

/// Access to the host module a formula was extracted from.
pub trait ModuleReflection {
    /// Source text of the module-level function `name`, if there is one.
    fn lookup_function(&self, name: &str) -> Option<String>;
}

/// Last resort for names the module scope does not know.
pub trait ExternalResolver {
    fn resolve_external(&self, module: &Rc<Entity>, name: &str) -> Result<Option<Rc<Entity>>, Error>;
}

/// Resolver that never finds anything.
pub struct NoExternalNames;

impl ExternalResolver for NoExternalNames {
    fn resolve_external(&self, _module: &Rc<Entity>, _name: &str) -> Result<Option<Rc<Entity>>, Error> {
        Ok(None)
    }
}

/// Resolves `name` from `scope` outward.
///
/// Each scope's own table is checked before its container's. At the module the
/// built-in environment is consulted, then `external`. `Ok(None)` means the
/// name is undefined.
pub fn resolve(
    scope: &Rc<Entity>,
    name: &str,
    external: &dyn ExternalResolver,
) -> Result<Option<Rc<Entity>>, Error> {
    let mut current = Some(Rc::clone(scope));

    while let Some(entity) = current {
        if let Some(found) = entity.member(name) {
            trace!(name, scope = entity.kind_name(), "name resolved");
            return Ok(Some(found));
        }

        if let EntityKind::Module { builtins, .. } = &entity.kind {
            if let Some(found) = builtins.get(name) {
                trace!(name, "built-in name resolved");
                return Ok(Some(Rc::clone(found)));
            }
            return external.resolve_external(&entity, name);
        }

        current = entity.container();
    }

    Ok(None)
}

/// The closest scope-bearing entity, starting with `entity` itself.
pub fn nearest_scope(entity: &Rc<Entity>) -> Option<Rc<Entity>> {
    let mut current = Some(Rc::clone(entity));
    while let Some(candidate) = current {
        if candidate.is_scope() {
            return Some(candidate);
        }
        current = candidate.container();
    }
    None
}

/// Binds `name` in the closest scope, replacing any previous binding.
pub fn bind(scope: &Rc<Entity>, name: &str, entity: Rc<Entity>) {
    if let Some(scope) = nearest_scope(scope) {
        if let Some(symbols) = scope.symbols() {
            trace!(name, scope = scope.kind_name(), "name bound");
            symbols.borrow_mut().insert(name.to_string(), entity);
        }
    }
}
