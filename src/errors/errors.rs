use std::fmt::Display;

use thiserror::Error;

use crate::{ast::ast::Node, Position};

/// The syntax node an error was raised on, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct NodeContext {
    pub kind: String,
    pub text: String,
}

#[derive(Error, Debug, Clone)]
#[error("{internal_error}")]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    node: Option<NodeContext>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            node: None,
        }
    }

    /// Creates an error located on a syntax node, capturing its kind and exact source text.
    pub fn at_node(error_impl: ErrorImpl, node: &Node) -> Self {
        Error {
            internal_error: error_impl,
            position: node.span.start.clone(),
            node: Some(NodeContext {
                kind: node.kind.to_string(),
                text: node.text(),
            }),
        }
    }

    /// Attaches `node` as the location of an error raised without one.
    pub fn locate(mut self, node: &Node) -> Self {
        if self.node.is_none() && self.position.is_null() {
            self.position = node.span.start.clone();
            self.node = Some(NodeContext {
                kind: node.kind.to_string(),
                text: node.text(),
            });
        }
        self
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_error_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_node_kind(&self) -> Option<&str> {
        self.node.as_ref().map(|node| node.kind.as_str())
    }

    pub fn get_source_text(&self) -> Option<&str> {
        self.node.as_ref().map(|node| node.text.as_str())
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::UnsupportedConstruct { .. } => "UnsupportedConstruct",
            ErrorImpl::MalformedShape { .. } => "MalformedShape",
            ErrorImpl::UndefinedName { .. } => "UndefinedName",
            ErrorImpl::UnsupportedFormulaSignature { .. } => "UnsupportedFormulaSignature",
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::UnsupportedConstruct { construct, message } => ErrorTip::Suggestion(
                format!("`{}` is outside the supported formula subset: {}", construct, message),
            ),
            ErrorImpl::MalformedShape { construct, expected } => ErrorTip::Suggestion(format!(
                "Unexpected shape for `{}`, expected {}",
                construct, expected
            )),
            ErrorImpl::UndefinedName { name } => {
                ErrorTip::Suggestion(format!("Name `{}` is not defined", name))
            }
            ErrorImpl::UnsupportedFormulaSignature { parameters } => {
                ErrorTip::Suggestion(format!(
                    "Formulas take exactly (self, simulation_context, period), found ({})",
                    parameters
                ))
            }
        }
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message:?}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("unsupported construct {construct}: {message}")]
    UnsupportedConstruct { construct: String, message: String },
    #[error("malformed {construct}: expected {expected}")]
    MalformedShape { construct: String, expected: String },
    #[error("undefined name {name:?}")]
    UndefinedName { name: String },
    #[error("unsupported formula signature ({parameters})")]
    UnsupportedFormulaSignature { parameters: String },
}

impl ErrorImpl {
    pub fn unsupported(construct: impl Display, message: impl Into<String>) -> Self {
        ErrorImpl::UnsupportedConstruct {
            construct: construct.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(construct: impl Display, expected: impl Into<String>) -> Self {
        ErrorImpl::MalformedShape {
            construct: construct.to_string(),
            expected: expected.into(),
        }
    }
}
