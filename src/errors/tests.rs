//! Unit tests for error handling.
//!
//! This module contains tests for error types and error reporting.

use crate::errors::errors::{Error, ErrorImpl, ErrorTip};
use crate::parser::parser::parse_source;
use crate::{render_error, Position};
use std::rc::Rc;

#[test]
fn test_error_creation() {
    let error = Error::new(
        ErrorImpl::UnrecognisedToken {
            token: "$".to_string(),
        },
        Position(10, Rc::new("test.py".to_string())),
    );

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert!(matches!(error.get_tip(), ErrorTip::None));
    assert!(error.get_node_kind().is_none());
}

#[test]
fn test_error_position() {
    let pos = Position(42, Rc::new("test.py".to_string()));
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        pos.clone(),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_position(), &pos);
}

#[test]
fn test_error_at_node() {
    let tree = parse_source("x = a . b\n", Some("test.py".to_string())).unwrap();
    let statement = &tree.children[0].children[0];
    let value = &statement.children[2];

    let error = Error::at_node(ErrorImpl::unsupported(&value.kind, "attribute"), value);

    assert_eq!(error.get_position().0, 4);
    assert_eq!(error.get_node_kind(), Some("power"));
    assert_eq!(error.get_source_text(), Some("a . b"));
}

#[test]
fn test_locate_only_fills_missing_location() {
    let tree = parse_source("x = y\n", Some("test.py".to_string())).unwrap();
    let statement = &tree.children[0].children[0];
    let target = &statement.children[0];
    let value = &statement.children[2];

    let error = Error::new(
        ErrorImpl::UndefinedName {
            name: "y".to_string(),
        },
        Position::null(),
    )
    .locate(value);
    assert_eq!(error.get_position().0, 4);
    assert_eq!(error.get_source_text(), Some("y"));

    let error = error.locate(target);
    assert_eq!(error.get_source_text(), Some("y"));
}

#[test]
fn test_error_display() {
    let error = Error::new(
        ErrorImpl::UnsupportedConstruct {
            construct: "power".to_string(),
            message: "assignment target must be a plain name".to_string(),
        },
        Position::null(),
    );

    assert_eq!(
        error.to_string(),
        "unsupported construct power: assignment target must be a plain name"
    );
}

#[test]
fn test_error_tips() {
    let error = Error::new(
        ErrorImpl::UndefinedName {
            name: "revenu".to_string(),
        },
        Position::null(),
    );
    assert_eq!(error.get_tip().to_string(), "Name `revenu` is not defined");

    let error = Error::new(
        ErrorImpl::UnsupportedFormulaSignature {
            parameters: "self, period".to_string(),
        },
        Position::null(),
    );
    assert_eq!(
        error.get_tip().to_string(),
        "Formulas take exactly (self, simulation_context, period), found (self, period)"
    );

    let error = Error::new(ErrorImpl::malformed("trailer", "2 or 3 children"), Position::null());
    assert_eq!(error.get_error_name(), "MalformedShape");
    assert_eq!(
        error.get_tip().to_string(),
        "Unexpected shape for `trailer`, expected 2 or 3 children"
    );
}

#[test]
fn test_render_error() {
    let source = "def f():\n    a[0] = 1\n";
    let tree = parse_source(source, Some("formula.py".to_string())).unwrap();
    let suite = &tree.children[0].children[4];
    let target = &suite.children[2].children[0].children[0];

    let error = Error::at_node(ErrorImpl::unsupported(&target.kind, "assignment target"), target);
    let rendered = render_error(&error, source);

    assert!(rendered.starts_with("Error: UnsupportedConstruct (`power` is outside the supported formula subset: assignment target)\n"));
    assert!(rendered.contains("-> formula.py\n"));
    assert!(rendered.contains("2 | a[0] = 1\n"));
    assert!(rendered.contains("  | ^\n"));
    assert!(rendered.ends_with("in power:\na[0]\n"));
}
