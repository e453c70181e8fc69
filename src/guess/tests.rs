//! Unit tests for type guessing.

use std::rc::Rc;

use crate::{
    entity::entity::{Entity, EntityKind},
    formula::formula::{FormulaParser, FormulaTree},
};

use super::{guess::guess, rules::GUESS_RULES};

fn formula(body: &str) -> FormulaTree {
    let source = format!("def formula(self, simulation_context, period):\n{}", body);
    FormulaParser::default()
        .parse_formula_function(&source, Some("guess.py".to_string()), None)
        .unwrap()
}

fn returned_guess(tree: &FormulaTree) -> Option<Rc<Entity>> {
    let returns = tree.root().returns();
    assert_eq!(returns.len(), 1);
    guess(&returns[0])
}

fn returned_kind(body: &str) -> Option<&'static str> {
    let tree = formula(body);
    returned_guess(&tree).map(|found| found.kind_name())
}

#[test]
fn test_rule_table_order() {
    let names: Vec<&str> = GUESS_RULES.iter().map(|rule| rule.name).collect();
    assert_eq!(
        names,
        vec!["period-start", "temporal-offset", "date-constructor", "law-projection"]
    );
}

#[test]
fn test_formula_parameters() {
    let tree = formula("    return period\n");
    let function = tree.root();

    let period = guess(&function.member("period").unwrap()).unwrap();
    assert_eq!(period.kind_name(), "Period");
    let simulation = guess(&function.member("simulation_context").unwrap()).unwrap();
    assert_eq!(simulation.kind_name(), "Simulation");
    assert!(guess(&function.member("self").unwrap()).is_none());
}

#[test]
fn test_period_start() {
    assert_eq!(returned_kind("    return period.start\n"), Some("Instant"));
    assert_eq!(returned_kind("    p = period\n    return p.start\n"), Some("Instant"));
    assert_eq!(returned_kind("    return simulation_context.start\n"), None);
}

#[test]
fn test_temporal_offset() {
    assert_eq!(
        returned_kind("    return period.start.offset('first-of', 'month')\n"),
        Some("Instant")
    );
    assert_eq!(returned_kind("    return period.offset(-1)\n"), Some("Period"));
    assert_eq!(returned_kind("    return simulation_context.offset(1)\n"), None);
}

#[test]
fn test_date_constructor() {
    assert_eq!(returned_kind("    return date(2010, 1, 1)\n"), Some("Date"));
    assert_eq!(returned_kind("    d = date\n    return d(2010, 1, 1)\n"), Some("Date"));
    assert_eq!(returned_kind("    return min_(1, 2)\n"), None);
}

#[test]
fn test_law_projection() {
    let tree = formula("    return law.ir.bareme\n");
    let found = returned_guess(&tree).unwrap();

    assert_eq!(found.law_path().unwrap(), "ir.bareme");
    match &found.kind {
        EntityKind::LawNode { is_reference, .. } => assert!(*is_reference),
        _ => panic!("expected a law node"),
    }

    let tree = formula("    x = law.ir\n    return x.bareme\n");
    assert_eq!(returned_guess(&tree).unwrap().law_path().unwrap(), "ir.bareme");
}

#[test]
fn test_builtin_constants() {
    let tree = formula("    return CHEF\n");
    assert_eq!(returned_guess(&tree).unwrap().to_string(), "0");

    let tree = formula("    return TAUX_DE_PRIME\n");
    assert_eq!(returned_guess(&tree).unwrap().to_string(), "0.25");

    assert_eq!(returned_kind("    return int16\n"), Some("Type"));
    assert_eq!(returned_kind("    return CAT\n"), Some("Enum"));
    assert_eq!(returned_kind("    return log\n"), Some("Logger"));
    assert_eq!(returned_kind("    return min_\n"), Some("Function"));
}

#[test]
fn test_unknown_guesses() {
    assert_eq!(returned_kind("    return simulation_context and period\n"), None);
    assert_eq!(returned_kind("    return simulation_context.calculate('x', period)\n"), None);
    assert_eq!(returned_kind("    return simulation_context['x']\n"), None);

    let tree = formula("    x = 1\n    if x:\n        y = 2\n    return x\n");
    let body = tree.root().body();
    assert!(guess(&body[0]).is_none());
    assert!(guess(&body[1]).is_none());
    assert_eq!(returned_guess(&tree).unwrap().to_string(), "1");
}

#[test]
fn test_loop_target_unknown() {
    let tree = formula("    for i in simulation_context:\n        x = i\n    return x\n");
    let body = tree.root().body();

    assert!(guess(&body[0]).is_none());
    assert!(guess(&tree.root().member("i").unwrap()).is_none());
    assert!(returned_guess(&tree).is_none());
}

#[test]
fn test_literal_guesses_itself() {
    let tree = formula("    return 'label'\n");
    let value = tree.root().returns()[0].value().unwrap();

    assert!(Rc::ptr_eq(&guess(&value).unwrap(), &value));
}

#[test]
fn test_guess_is_memoized() {
    let tree = formula("    return period.start\n");
    let value = tree.root().returns()[0].value().unwrap();

    let first = guess(&value).unwrap();
    let second = guess(&value).unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert!(value.guess_slot().get().is_some());
}

#[test]
fn test_unbound_variable_is_not_memoized() {
    let variable = Entity::new(EntityKind::variable("period", None), None, None);

    assert!(guess(&variable).is_none());
    assert!(variable.guess_slot().get().is_none());

    variable.bind_value(Entity::new(EntityKind::Period, Some(&variable), None));
    assert_eq!(guess(&variable).unwrap().kind_name(), "Period");
}
