//! Strict XHTML well-formedness checking

use quick_xml::errors::{Error, IllFormedError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

/// A well-formedness violation with its position in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupViolation {
    /// 1-based line
    pub line: usize,
    /// 1-based column, in characters
    pub column: usize,
    /// Character at the violation, None at end of input
    pub character: Option<char>,
    pub reason: String,
}

impl MarkupViolation {
    fn at(document: &str, offset: usize, reason: impl Into<String>) -> Self {
        let mut offset = offset.min(document.len());
        while !document.is_char_boundary(offset) {
            offset -= 1;
        }

        let before = &document[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = document[line_start..offset].chars().count() + 1;

        Self {
            line,
            column,
            character: document[offset..].chars().next(),
            reason: reason.into(),
        }
    }

    /// Single-line issue text
    pub fn message(&self) -> String {
        let reason = self.reason.split_whitespace().collect::<Vec<_>>().join(" ");
        let character = match self.character {
            Some(c) if !c.is_control() => c.to_string(),
            Some(c) => c.escape_default().to_string(),
            None => "EOF".to_string(),
        };
        format!(
            "XHTML parse error ({}), Line: {}, Column: {}, Char: {}",
            reason, self.line, self.column, character
        )
    }
}

/// Parses a document as strict XML and reports well-formedness violations
///
/// Ill-formed markup (mismatched or unmatched end tags, bad attributes) is
/// reported and parsing continues; a syntax error ends the scan. Elements
/// still open at the end of the document are reported as well.
///
/// # Example
///
/// ```
/// use sumi_check::checker::validate_xhtml;
///
/// assert!(validate_xhtml("<html><body><p>ok</p></body></html>").is_empty());
///
/// let violations = validate_xhtml("<html>\n<body><p>open</body></html>");
/// assert_eq!(violations[0].line, 2);
/// ```
pub fn validate_xhtml(document: &str) -> Vec<MarkupViolation> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().check_end_names = true;

    let mut violations = Vec::new();
    let mut open: Vec<String> = Vec::new();

    loop {
        let event_start = position(reader.buffer_position());

        match reader.read_event() {
            Ok(Event::Start(element)) => {
                if let Some(reason) = attribute_error(&element) {
                    violations.push(MarkupViolation::at(document, event_start, reason));
                }
                open.push(String::from_utf8_lossy(element.name().as_ref()).into_owned());
            }
            Ok(Event::Empty(element)) => {
                if let Some(reason) = attribute_error(&element) {
                    violations.push(MarkupViolation::at(document, event_start, reason));
                }
            }
            Ok(Event::End(_)) => {
                open.pop();
            }
            Ok(Event::Eof) => {
                if let Some(root) = open.first() {
                    violations.push(MarkupViolation::at(
                        document,
                        document.len(),
                        format!("Unclosed root tag <{}>", root),
                    ));
                }
                break;
            }
            Ok(_) => {}
            Err(Error::IllFormed(kind)) => {
                let at_end = matches!(kind, IllFormedError::MissingEndTag(_));
                // The reader drops the innermost open element on a mismatch
                if matches!(kind, IllFormedError::MismatchedEndTag { .. }) {
                    open.pop();
                }
                violations.push(MarkupViolation::at(
                    document,
                    position(reader.error_position()),
                    Error::IllFormed(kind).to_string(),
                ));
                if at_end {
                    break;
                }
            }
            Err(e) => {
                violations.push(MarkupViolation::at(
                    document,
                    position(reader.error_position()),
                    e.to_string(),
                ));
                break;
            }
        }
    }

    violations
}

fn attribute_error(element: &BytesStart<'_>) -> Option<String> {
    element
        .attributes()
        .find_map(|attribute| attribute.err())
        .map(|e| e.to_string())
}

fn position(offset: u64) -> usize {
    usize::try_from(offset).unwrap_or(usize::MAX)
}
