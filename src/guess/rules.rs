use std::rc::Rc;

use lazy_static::lazy_static;

use crate::entity::entity::{Entity, EntityKind};

use super::guess::guess;

/// A named guess override. `apply` returns the guess when the rule matches.
pub struct GuessRule {
    pub name: &'static str,
    pub apply: fn(&Rc<Entity>) -> Option<Rc<Entity>>,
}

lazy_static! {
    /// Override rules, tried in order before the per-kind defaults.
    pub static ref GUESS_RULES: Vec<GuessRule> = vec![
        GuessRule {
            name: "period-start",
            apply: period_start,
        },
        GuessRule {
            name: "temporal-offset",
            apply: temporal_offset,
        },
        GuessRule {
            name: "date-constructor",
            apply: date_constructor,
        },
        GuessRule {
            name: "law-projection",
            apply: law_projection,
        },
    ];
}

/// `x.start` where `x` is a period.
fn period_start(entity: &Rc<Entity>) -> Option<Rc<Entity>> {
    let EntityKind::Attribute { subject, name } = &entity.kind else {
        return None;
    };
    if name != "start" {
        return None;
    }

    match guess(subject)?.kind {
        EntityKind::Period => Some(Entity::new(EntityKind::Instant, Some(entity), None)),
        _ => None,
    }
}

/// `x.offset(...)` keeps the temporal kind of `x`.
fn temporal_offset(entity: &Rc<Entity>) -> Option<Rc<Entity>> {
    let EntityKind::Call { subject, .. } = &entity.kind else {
        return None;
    };
    let EntityKind::Attribute { subject, name } = &subject.kind else {
        return None;
    };
    if name != "offset" {
        return None;
    }

    match guess(subject)?.kind {
        EntityKind::Instant => Some(Entity::new(EntityKind::Instant, Some(entity), None)),
        EntityKind::Period => Some(Entity::new(EntityKind::Period, Some(entity), None)),
        _ => None,
    }
}

/// A call to the `date` helper, possibly through variables.
fn date_constructor(entity: &Rc<Entity>) -> Option<Rc<Entity>> {
    let EntityKind::Call { subject, .. } = &entity.kind else {
        return None;
    };

    let mut callee = Rc::clone(subject);
    while matches!(callee.kind, EntityKind::Variable { .. }) {
        callee = callee.value()?;
    }

    match &callee.kind {
        EntityKind::Function { name, .. } if name == "date" => {
            Some(Entity::new(EntityKind::Date, Some(entity), None))
        }
        _ => None,
    }
}

/// `x.name` where `x` is a law node yields the child node `name`.
fn law_projection(entity: &Rc<Entity>) -> Option<Rc<Entity>> {
    let EntityKind::Attribute { subject, name } = &entity.kind else {
        return None;
    };

    let parent = guess(subject)?;
    match parent.kind {
        EntityKind::LawNode { .. } => Some(Entity::new(
            EntityKind::LawNode {
                name: Some(name.clone()),
                parent: Some(Rc::clone(&parent)),
                is_reference: true,
            },
            Some(entity),
            None,
        )),
        _ => None,
    }
}
