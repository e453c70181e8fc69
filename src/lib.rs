#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::errors::errors::{Error, ErrorTip};

pub mod ast;
pub mod converter;
pub mod entity;
pub mod errors;
pub mod formula;
pub mod guess;
pub mod lexer;
pub mod macros;
pub mod parser;

extern crate regex;

/// A byte offset into a named source.
#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }

    pub fn is_null(&self) -> bool {
        self.0 == 0 && self.1.as_str() == "<null>"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Returns the 1-based line number, the line text and the offset within the line.
pub fn get_line_at_position(source: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    if pos > source.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in source.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    // End of input: point just past the last line.
    let last = source.split_inclusive('\n').last().unwrap_or("");
    Some((line_number.saturating_sub(1).max(1), last.to_string(), last.len()))
}

/// Formats an error against the source it was raised on.
pub fn render_error(error: &Error, source: &str) -> String {
    /*
        Error: message (tip)
        -> formula.py
           |
        20 | a[0] = 1
           | ^
    */

    let mut output = String::new();
    let position = error.get_position();

    if let ErrorTip::None = error.get_tip() {
        output.push_str(&format!("Error: {}\n", error.get_error_name()));
    } else {
        output.push_str(&format!(
            "Error: {} ({})\n",
            error.get_error_name(),
            error.get_tip()
        ));
    }
    output.push_str(&format!("-> {}\n", position.1));

    if let Some((line, line_text, line_pos)) = get_line_at_position(source, position.0) {
        let line_string = line.to_string();
        let padding = line_string.len() + 2;

        let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
        output.push_str(&format!("{:>padding$}\n", "|"));
        output.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

        let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
        output.push_str(&format!("{:>padding$} {:->arrows$}\n", "|", "^"));
    }

    if let (Some(kind), Some(text)) = (error.get_node_kind(), error.get_source_text()) {
        output.push_str(&format!("in {}:\n{}\n", kind, text));
    }

    output
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' || c == '\t' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let source = "Hello, world!\nsecond\n\nTesting { }\n";
        let (line_number, line, line_pos) = super::get_line_at_position(source, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(source, 30).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_get_line_past_end() {
        assert!(super::get_line_at_position("abc", 10).is_none());
        let (line_number, _, line_pos) = super::get_line_at_position("abc\n", 4).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line_pos, 4);
    }
}
