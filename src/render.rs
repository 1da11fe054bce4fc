use std::io::{self, Write};

use thiserror::Error;

use crate::shopping_list::ShoppingListLine;

pub const SHOPPING_LIST_FILENAME: &str = "shopping_list.txt";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to write document: {0}")]
    Io(#[from] io::Error),
}

/// A rendered, downloadable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
}

pub trait DocumentRenderer: Send + Sync {
    fn render(&self, lines: &[ShoppingListLine]) -> Result<Document, RenderError>;
}

/// UTF-8 text, one line per ingredient. No lines means an empty body.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextRenderer;

impl DocumentRenderer for PlainTextRenderer {
    fn render(&self, lines: &[ShoppingListLine]) -> Result<Document, RenderError> {
        let mut body = Vec::new();
        for line in lines {
            writeln!(body, "{}", line)?;
        }
        Ok(Document {
            body,
            content_type: "text/plain; charset=utf-8",
            filename: SHOPPING_LIST_FILENAME,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_entry() {
        let lines = vec![
            ShoppingListLine {
                name: "egg".to_string(),
                measurement_unit: "pcs".to_string(),
                amount: 2,
            },
            ShoppingListLine {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
                amount: 300,
            },
        ];

        let document = PlainTextRenderer.render(&lines).unwrap();

        assert_eq!(document.body, "Egg (pcs) — 2\nFlour (g) — 300\n".as_bytes());
        assert_eq!(document.filename, SHOPPING_LIST_FILENAME);
        assert!(document.content_type.starts_with("text/plain"));
    }

    #[test]
    fn no_lines_gives_empty_body() {
        let document = PlainTextRenderer.render(&[]).unwrap();

        assert!(document.body.is_empty());
    }
}
