//! Unit tests for formula sessions and the built-in environment.

use std::rc::Rc;

use crate::{
    entity::{entity::EntityKind, scope::ModuleReflection},
    errors::errors::ErrorImpl,
    guess::guess::guess,
};

use super::{
    builtins::{BuiltinValue, Builtins},
    formula::{dedent, FormulaParser, StaticModule},
};

const REVENU: &str = "    class revenu(SimpleFormulaColumn):
        label = u\"Revenu\"

        def function(self, simulation_context, period):
            period = period.start
            return period
";

#[test]
fn test_dedent() {
    assert_eq!(dedent("    a\n\n      b\n"), "a\n\n  b\n");
    assert_eq!(dedent("    a\n  \n    b"), "a\n\nb");
    assert_eq!(dedent("a\n    b\n"), "a\n    b\n");
    assert_eq!(dedent(""), "");
}

#[test]
fn test_formula_environment() {
    let builtins = Builtins::formula_environment();

    assert_eq!(builtins.len(), 18);
    assert_eq!(builtins.get("PAC3"), Some(&BuiltinValue::Number("4".to_string())));
    assert_eq!(
        builtins.get("TAUX_DE_PRIME"),
        Some(&BuiltinValue::Number("0.25".to_string()))
    );
    assert_eq!(builtins.get("law"), Some(&BuiltinValue::LawRoot));
    assert_eq!(builtins.get("date"), Some(&BuiltinValue::Function));
    assert!(builtins.get("period").is_none());
    assert_eq!(builtins.names().next(), Some("CHEF"));
}

#[test]
fn test_custom_builtins() {
    let mut builtins = Builtins::empty();
    assert!(builtins.is_empty());
    builtins.insert("RATE", BuiltinValue::Number("0.5".to_string()));

    let parser = FormulaParser::new(builtins);
    assert_eq!(parser.builtins().len(), 1);

    let tree = parser
        .parse_formula_function("def f(self, simulation_context, period):\n    return RATE\n", None, None)
        .unwrap();
    let returned = tree.root().returns()[0].value().unwrap();
    assert_eq!(guess(&returned).unwrap().to_string(), "0.5");

    let error = match parser.parse_formula_function(
        "def f(self, simulation_context, period):\n    return CHEF\n",
        None,
        None,
    ) {
        Ok(_) => panic!("CHEF is not part of this environment"),
        Err(error) => error,
    };
    assert_eq!(error.get_error_name(), "UndefinedName");
}

#[test]
fn test_override_builtin() {
    let mut builtins = Builtins::formula_environment();
    let previous = builtins.insert("CHEF", BuiltinValue::Number("9".to_string()));

    assert_eq!(previous, Some(BuiltinValue::Number("0".to_string())));
    assert_eq!(builtins.len(), 18);
}

#[test]
fn test_parse_formula_class() {
    let tree = FormulaParser::default()
        .parse_formula_class(REVENU, Some("revenu.py".to_string()), None)
        .unwrap();

    assert_eq!(tree.root().name(), Some("revenu"));
    match &tree.root().kind {
        EntityKind::Class { base_class_name, .. } => assert_eq!(base_class_name, "SimpleFormulaColumn"),
        _ => panic!("expected a class"),
    }
    assert!(Rc::ptr_eq(&tree.module().member("revenu").unwrap(), tree.root()));

    let formulas = tree.formulas();
    assert_eq!(formulas.len(), 1);
    assert_eq!(formulas[0].name(), Some("function"));

    let returned = formulas[0].returns()[0].value().unwrap();
    assert_eq!(guess(&returned).unwrap().kind_name(), "Instant");

    assert!(!tree.source().starts_with(' '));
    assert_eq!(tree.tree().to_string(), tree.source());
}

#[test]
fn test_wrong_signature() {
    let error = match FormulaParser::default().parse_formula_function(
        "def function(self, period):\n    return period\n",
        None,
        None,
    ) {
        Ok(_) => panic!("signature should be rejected"),
        Err(error) => error,
    };

    match error.get_error_impl() {
        ErrorImpl::UnsupportedFormulaSignature { parameters } => assert_eq!(parameters, "self, period"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(error.get_node_kind(), Some("parameters"));
    assert_eq!(error.get_source_text(), Some("(self, period)"));
}

#[test]
fn test_named_parameter_signature() {
    let error = match FormulaParser::default().parse_formula_function(
        "def function(self, simulation_context, period, x=1):\n    return x\n",
        None,
        None,
    ) {
        Ok(_) => panic!("signature should be rejected"),
        Err(error) => error,
    };

    match error.get_error_impl() {
        ErrorImpl::UnsupportedFormulaSignature { parameters } => {
            assert_eq!(parameters, "self, simulation_context, period, x")
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn test_source_must_hold_one_definition() {
    let parser = FormulaParser::default();

    for source in [
        "x = 1\n",
        "",
        "class A(B):\n    pass\nclass C(B):\n    pass\n",
        "def f(self, simulation_context, period):\n    return period\n",
    ] {
        match parser.parse_formula_class(source, None, None) {
            Ok(_) => panic!("{:?} should be rejected", source),
            Err(error) => assert_eq!(error.get_error_name(), "UnsupportedConstruct"),
        }
    }
}

#[test]
fn test_syntax_error_propagates() {
    let error = match FormulaParser::default().parse_formula_class("class A(B)\n    pass\n", None, None) {
        Ok(_) => panic!("syntax error expected"),
        Err(error) => error,
    };

    assert!(error.get_error_name().starts_with("UnexpectedToken"));
}

#[test]
fn test_batch_isolation() {
    let valid = "class A(B):\n    def f(self, simulation_context, period):\n        return period\n";
    let invalid = "class A(B):\n    def f(self, period):\n        return period\n";

    let results = FormulaParser::default().parse_formula_classes(&[valid, invalid, valid], None);
    assert_eq!(results.len(), 3);

    let first = results[0].as_ref().unwrap();
    let third = results[2].as_ref().unwrap();
    assert!(!Rc::ptr_eq(first.module(), third.module()));

    let error = results[1].as_ref().err().unwrap();
    assert_eq!(error.get_error_name(), "UnsupportedFormulaSignature");
    assert_eq!(error.get_position().1.as_str(), "<formula 1>");
}

#[test]
fn test_static_module() {
    let mut module = StaticModule::new().with_function("a", "def a():\n    return 1\n");
    module.insert("b", "def b():\n    return 2\n");

    assert_eq!(module.lookup_function("a").unwrap(), "def a():\n    return 1\n");
    assert!(module.lookup_function("b").is_some());
    assert!(module.lookup_function("c").is_none());
}

#[test]
fn test_decorated_formula_method() {
    let source = "class A(B):\n    @dated_function(start = date(2010, 1, 1))\n    def function_2010(self, simulation_context, period):\n        return date(2010, 1, 1)\n";
    let tree = FormulaParser::default().parse_formula_class(source, None, None).unwrap();

    let formulas = tree.formulas();
    assert_eq!(formulas.len(), 1);
    assert_eq!(formulas[0].name(), Some("function_2010"));
    let returned = formulas[0].returns()[0].value().unwrap();
    assert_eq!(guess(&returned).unwrap().kind_name(), "Date");
}

#[test]
fn test_signature_checked_before_defaults() {
    let parser = FormulaParser::default();

    for (signature, expected) in [
        ("self, *args", "self, *args"),
        ("self, simulation_context, period, **kw", "self, simulation_context, period, **kw"),
        ("self, simulation_context, period, extra = missing", "self, simulation_context, period, extra"),
    ] {
        let source = format!("class A(B):\n    def function({}):\n        return period\n", signature);
        let error = match parser.parse_formula_class(&source, None, None) {
            Ok(_) => panic!("({}) should be rejected", signature),
            Err(error) => error,
        };

        match error.get_error_impl() {
            ErrorImpl::UnsupportedFormulaSignature { parameters } => assert_eq!(parameters, expected),
            other => panic!("unexpected error {:?} for ({})", other, signature),
        }
        assert_eq!(error.get_node_kind(), Some("parameters"));
    }
}

#[test]
fn test_trailing_comma_signature() {
    let tree = FormulaParser::default()
        .parse_formula_function("def f(self, simulation_context, period,):\n    return period\n", None, None)
        .unwrap();

    assert_eq!(guess(&tree.root().member("period").unwrap()).unwrap().kind_name(), "Period");
}
