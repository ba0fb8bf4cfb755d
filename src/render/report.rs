//! Plain-text report rendering.

use crate::model::{StructuredResult, Value};

/// Indentation and bullet in front of each list item.
const ITEM_PREFIX: &str = "  - ";

/// Render a result as `label: value` lines.
///
/// Lists render as `label:` followed by one `  - item` line per item.
/// Entries appear in insertion order; an error result renders as the single
/// line `error: <message>`.
pub fn to_report(result: &StructuredResult) -> String {
    let mut lines = Vec::with_capacity(result.len());

    for (label, value) in result.iter() {
        match value {
            Value::Scalar(text) => lines.push(format!("{}: {}", label, text)),
            Value::List(items) => {
                lines.push(format!("{}:", label));
                lines.extend(items.iter().map(|item| format!("{}{}", ITEM_PREFIX, item)));
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_and_lists() {
        let mut result = StructuredResult::new();
        result.insert_scalar("Pages", 3);
        result.insert_list("Fonts", ["Arial", "Times"]);
        result.insert_scalar("Font sizes", "no data");

        assert_eq!(
            to_report(&result),
            "Pages: 3\nFonts:\n  - Arial\n  - Times\nFont sizes: no data"
        );
    }

    #[test]
    fn test_error_result() {
        let result = StructuredResult::error("Cannot read file: missing.txt");
        assert_eq!(to_report(&result), "error: Cannot read file: missing.txt");
    }

    #[test]
    fn test_empty_list() {
        let mut result = StructuredResult::new();
        result.insert_list("Metadata", Vec::<String>::new());
        assert_eq!(to_report(&result), "Metadata:");
    }
}
