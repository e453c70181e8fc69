use std::rc::Rc;

use tracing::trace;

use crate::entity::entity::{Entity, EntityKind, GuessSlot};

use super::rules::GUESS_RULES;

/// Best known semantic type of `entity`, `None` when unknown.
///
/// The result is computed once and memoized in the entity, except for
/// variables that have no value yet, which stay unresolved until bound.
pub fn guess(entity: &Rc<Entity>) -> Option<Rc<Entity>> {
    if let Some(slot) = entity.guess_slot().get() {
        return slot.resolve(entity);
    }

    if let EntityKind::Variable { value, .. } = &entity.kind {
        if value.get().is_none() {
            return None;
        }
    }

    let slot = compute(entity);
    let result = slot.resolve(entity);
    let _ = entity.guess_slot().set(slot);

    trace!(entity = ?entity, guess = ?result, "guessed");
    result
}

fn compute(entity: &Rc<Entity>) -> GuessSlot {
    for rule in GUESS_RULES.iter() {
        if let Some(found) = (rule.apply)(entity) {
            trace!(rule = rule.name, entity = %entity, "guess rule matched");
            return GuessSlot::Entity(found);
        }
    }

    match &entity.kind {
        EntityKind::Variable { .. } | EntityKind::Return { .. } => {
            match entity.value().and_then(|value| guess(&value)) {
                Some(found) => GuessSlot::Entity(found),
                None => GuessSlot::Unknown,
            }
        }
        EntityKind::Assignment { .. }
        | EntityKind::Attribute { .. }
        | EntityKind::Call { .. }
        | EntityKind::Conditional { .. }
        | EntityKind::Decorator { .. }
        | EntityKind::Key { .. }
        | EntityKind::Loop { .. }
        | EntityKind::Unimplemented { .. } => GuessSlot::Unknown,
        _ => GuessSlot::Itself,
    }
}
