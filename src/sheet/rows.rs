// src/sheet/rows.rs

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

use super::error::FormatError;
use super::workbook::{append_text, utf8, Nesting};

/// One worksheet row: column letters → trimmed, non-empty cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    cells: BTreeMap<String, String>,
}

impl Row {
    /// The cell text in `column`, or `""` when the cell is absent.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn has(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    /// Stores `value` trimmed; blank values are dropped.
    pub fn insert(&mut self, column: impl Into<String>, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.cells.insert(column.into(), value.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.cells.len()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::default();
        for (column, value) in iter {
            row.insert(column, value.as_ref());
        }
        row
    }
}

/// Column letters of a cell reference: `"AB12"` → `"AB"`.
pub fn column_of(reference: &str) -> String {
    reference.chars().filter(|c| c.is_alphabetic()).collect()
}

#[derive(Default)]
struct PendingCell {
    column: String,
    shared: bool,
    value: Option<String>,
}

impl PendingCell {
    fn from_start(part: &str, start: &BytesStart<'_>) -> Result<Self, FormatError> {
        let mut cell = PendingCell::default();
        for attr in start.attributes().flatten() {
            match attr.key.as_ref() {
                b"r" => cell.column = column_of(utf8(part, &attr.value)?),
                b"t" => cell.shared = attr.value.as_ref() == b"s",
                _ => {}
            }
        }
        Ok(cell)
    }

    /// Resolves the cell's text, `None` when it has no usable value.
    fn resolve(self, shared_strings: &[String]) -> Option<(String, String)> {
        if self.column.is_empty() {
            return None;
        }
        let raw = self.value?;
        let text = if self.shared && !raw.is_empty() && raw.chars().all(|c| c.is_ascii_digit()) {
            raw.parse::<usize>()
                .ok()
                .and_then(|idx| shared_strings.get(idx))
                .cloned()
                .unwrap_or(raw)
        } else {
            raw
        };
        Some((self.column, text))
    }
}

/// Parses worksheet XML into its non-empty rows, top to bottom.
pub fn parse_worksheet(
    part: &str,
    xml: &[u8],
    shared_strings: &[String],
) -> Result<Vec<Row>, FormatError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut nesting = Nesting::default();

    let mut rows = Vec::new();
    let mut row: Option<Row> = None;
    let mut cell: Option<PendingCell> = None;
    let mut in_value = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| FormatError::xml(part, e))?;
        if nesting.observe(part, &event)? {
            break;
        }
        match &event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => row = Some(Row::default()),
                b"c" if row.is_some() => cell = Some(PendingCell::from_start(part, e)?),
                b"v" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.value = Some(String::new());
                        in_value = true;
                    }
                }
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"v" => {
                if let Some(cell) = cell.as_mut() {
                    cell.value = Some(String::new());
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" => in_value = false,
                b"c" => {
                    let resolved = cell.take().and_then(|c| c.resolve(shared_strings));
                    if let (Some((column, text)), Some(row)) = (resolved, row.as_mut()) {
                        row.insert(column, &text);
                    }
                }
                b"row" => {
                    if let Some(done) = row.take() {
                        if !done.is_empty() {
                            rows.push(done);
                        }
                    }
                }
                _ => {}
            },
            other if in_value => {
                if let Some(value) = cell.as_mut().and_then(|c| c.value.as_mut()) {
                    append_text(part, other, value)?;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PART: &str = "xl/worksheets/sheet1.xml";

    fn sheet(rows: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{}</sheetData></worksheet>"#,
            rows
        )
        .into_bytes()
    }

    #[test]
    fn column_letters_drop_row_index() {
        assert_eq!(column_of("C12"), "C");
        assert_eq!(column_of("AB7"), "AB");
        assert_eq!(column_of("42"), "");
    }

    #[test]
    fn row_lookup_defaults_to_empty() {
        let row: Row = [("F", " Quiz Night "), ("G", "   ")].into_iter().collect();
        assert_eq!(row.get("F"), "Quiz Night");
        assert!(!row.has("G"));
        assert_eq!(row.get("Z"), "");
        assert_eq!(row.len(), 1);
    }

    #[test]
    fn resolves_shared_strings_and_keeps_numbers() {
        let shared = vec!["Technical".to_string(), "  Alice Roy 9999999999 ".to_string()];
        let xml = sheet(
            r#"<row r="2"><c r="C2"><v>1</v></c><c r="D2" t="s"><v>0</v></c><c r="E2" t="s"><v>1</v></c></row>"#,
        );
        let rows = parse_worksheet(PART, &xml, &shared).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("C"), "1");
        assert_eq!(rows[0].get("D"), "Technical");
        assert_eq!(rows[0].get("E"), "Alice Roy 9999999999");
    }

    #[test]
    fn out_of_range_shared_index_keeps_raw_value() {
        let xml = sheet(r#"<row r="1"><c r="F1" t="s"><v>9</v></c></row>"#);
        let rows = parse_worksheet(PART, &xml, &[]).unwrap();
        assert_eq!(rows[0].get("F"), "9");
    }

    #[test]
    fn skips_cells_without_value_and_blank_rows() {
        let xml = sheet(
            r#"<row r="1"><c r="A1" s="3"/><c r="B1"><f>SUM(A1)</f></c></row>
<row r="2"><c r="C2" t="str"><v>   </v></c></row>
<row r="3"/>
<row r="4"><c><v>orphan</v></c><c r="F4" t="str"><v> Dance &amp; Drama </v></c></row>"#,
        );
        let rows = parse_worksheet(PART, &xml, &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("F"), "Dance & Drama");
        assert_eq!(rows[0].len(), 1);
    }

    #[test]
    fn truncated_sheet_is_a_format_error() {
        let xml = br#"<worksheet><sheetData><row r="1"><c r="F1" t="str"><v>Quiz</v></c>"#;
        let err = parse_worksheet(PART, xml, &[]).unwrap_err();
        assert!(
            matches!(err, FormatError::Xml { ref part, .. } if part == PART),
            "got {err:?}"
        );
    }

    #[test]
    fn invalid_utf8_cell_text_is_an_encoding_error() {
        let mut xml = sheet(r#"<row r="1"><c r="F1" t="str"><v>Quiz</v></c></row>"#);
        let at = xml.windows(4).position(|w| w == b"Quiz").unwrap();
        xml[at + 1] = 0xFF;
        let err = parse_worksheet(PART, &xml, &[]).unwrap_err();
        assert!(
            matches!(err, FormatError::Encoding(ref part) if part == PART),
            "got {err:?}"
        );
    }

    #[test]
    fn invalid_utf8_cell_reference_is_an_encoding_error() {
        let mut xml = sheet(r#"<row r="1"><c r="F1"><v>1</v></c></row>"#);
        let at = xml.windows(4).position(|w| w == b"\"F1\"").unwrap();
        xml[at + 1] = 0xC3;
        let err = parse_worksheet(PART, &xml, &[]).unwrap_err();
        assert!(matches!(err, FormatError::Encoding(_)), "got {err:?}");
    }

    #[test]
    fn inline_strings_without_value_node_are_ignored() {
        let xml = sheet(r#"<row r="1"><c r="D1" t="inlineStr"><is><t>Hidden</t></is></c></row>"#);
        let rows = parse_worksheet(PART, &xml, &[]).unwrap();
        assert!(rows.is_empty());
    }
}
