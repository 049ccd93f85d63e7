//! Plain-text rendering of the catalog view for terminals.

use super::view::{DetailModal, HighlightCard, TableBody, TableView};

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, w: usize) -> String {
    let mut out = s.to_string();
    out.extend(std::iter::repeat(' ').take(w.saturating_sub(width(s))));
    out
}

/// Column-aligned table with a header rule. The empty placeholder spans the
/// full table width.
pub fn table_text(view: &TableView) -> String {
    let mut widths: Vec<usize> = view.header.iter().map(|h| width(h)).collect();
    if let TableBody::Rows(rows) = &view.body {
        for row in rows {
            for (w, cell) in widths.iter_mut().zip(row.cells.iter()) {
                *w = (*w).max(width(cell));
            }
        }
    }

    let join = |cells: Vec<String>| cells.join("  ").trim_end().to_string();
    let mut lines = Vec::new();
    lines.push(join(
        view.header
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect(),
    ));
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    lines.push("-".repeat(total));

    match &view.body {
        TableBody::Rows(rows) => {
            for row in rows {
                lines.push(join(
                    row.cells
                        .iter()
                        .zip(&widths)
                        .map(|(c, w)| pad(c, *w))
                        .collect(),
                ));
            }
        }
        TableBody::Empty { message, .. } => {
            let left = total.saturating_sub(width(message)) / 2;
            lines.push(format!("{}{}", " ".repeat(left), message));
        }
    }
    lines.join("\n")
}

pub fn highlights_text(cards: &[HighlightCard]) -> String {
    cards
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {} ({}) {}", i + 1, c.title, c.provider, c.one_year))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Empty when the modal is closed.
pub fn modal_text(modal: &DetailModal) -> String {
    if !modal.open {
        return String::new();
    }
    format!(
        "== {} ==\nProvider: {}\n{}",
        modal.title, modal.provider, modal.body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::view::{TableRow, EMPTY_MESSAGE, TABLE_HEADER};

    #[test]
    fn empty_table_has_one_body_line() {
        let view = TableView {
            header: TABLE_HEADER,
            body: TableBody::Empty {
                message: EMPTY_MESSAGE,
                colspan: 6,
            },
        };
        let text = table_text(&view);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2].trim(), EMPTY_MESSAGE);
    }

    #[test]
    fn columns_align_to_widest_cell() {
        let row = |name: &str| TableRow {
            index: 0,
            cells: [
                name.to_string(),
                "P".to_string(),
                "Equity".to_string(),
                "1%".to_string(),
                "—".to_string(),
                "—".to_string(),
            ],
        };
        let view = TableView {
            header: TABLE_HEADER,
            body: TableBody::Rows(vec![row("A very long scheme name"), row("B")]),
        };
        let text = table_text(&view);
        let lines: Vec<_> = text.lines().collect();
        let provider_col = lines[2].find("P ").unwrap();
        assert_eq!(lines[3].find("P ").unwrap(), provider_col);
        assert_eq!(lines[0].find("Provider").unwrap(), provider_col);
    }

    #[test]
    fn closed_modal_renders_nothing() {
        assert!(modal_text(&DetailModal::default()).is_empty());
    }
}
