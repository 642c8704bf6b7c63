// src/sheet/mod.rs

pub mod error;
pub mod rows;
pub mod workbook;

use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, info, instrument};

pub use error::FormatError;
pub use rows::Row;
pub use workbook::Workbook;

/// Reads the first sheet of the xlsx file at `path` as a sequence of rows.
#[instrument(level = "info", skip(path), fields(xlsx = %path.as_ref().display()))]
pub fn read_sheet_rows(path: impl AsRef<Path>) -> Result<Vec<Row>, FormatError> {
    let workbook = Workbook::open(path.as_ref())?;
    let rows = collect_rows(workbook)?;
    info!(rows = rows.len(), "read first sheet");
    Ok(rows)
}

/// Same as [`read_sheet_rows`] for an in-memory or already opened package.
pub fn read_rows_from<R: Read + Seek>(reader: R) -> Result<Vec<Row>, FormatError> {
    collect_rows(Workbook::new(reader)?)
}

fn collect_rows<R: Read + Seek>(mut workbook: Workbook<R>) -> Result<Vec<Row>, FormatError> {
    let shared_strings = workbook.shared_strings()?;
    let Some((part, xml)) = workbook.first_sheet_xml()? else {
        debug!("workbook declares no sheets");
        return Ok(Vec::new());
    };
    debug!(part = %part, bytes = xml.len(), "parsing worksheet");
    rows::parse_worksheet(&part, &xml, &shared_strings)
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn reads_rows_through_shared_strings() -> anyhow::Result<()> {
        let shared = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><si><t>Technical</t></si></sst>"#;
        let bytes = single_sheet(
            r#"<row r="1"><c r="C1"><v>1</v></c><c r="D1" t="s"><v>0</v></c></row>"#,
            Some(shared),
        );
        let rows = read_rows_from(Cursor::new(bytes))?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("D"), "Technical");
        Ok(())
    }

    #[test]
    fn reads_from_a_path() -> anyhow::Result<()> {
        let bytes = single_sheet(r#"<row r="1"><c r="F1" t="str"><v>Quiz Night</v></c></row>"#, None);
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&bytes)?;
        let rows = read_sheet_rows(tmp.path())?;
        assert_eq!(rows[0].get("F"), "Quiz Night");
        Ok(())
    }

    #[test]
    fn no_declared_sheets_is_empty_not_error() -> anyhow::Result<()> {
        let workbook = r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets/></workbook>"#;
        let bytes = package(&[("xl/workbook.xml", workbook), ("xl/_rels/workbook.xml.rels", RELS)]);
        assert!(read_rows_from(Cursor::new(bytes))?.is_empty());
        Ok(())
    }

    #[test]
    fn missing_workbook_part_is_a_format_error() {
        let bytes = package(&[("xl/_rels/workbook.xml.rels", RELS)]);
        let err = read_rows_from(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FormatError::MissingPart(ref p) if p == "xl/workbook.xml"));
    }

    #[test]
    fn missing_relationships_part_is_a_format_error() {
        let bytes = package(&[("xl/workbook.xml", WORKBOOK)]);
        let err = read_rows_from(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FormatError::MissingPart(ref p) if p == "xl/_rels/workbook.xml.rels"));
    }

    #[test]
    fn undeclared_relationship_is_a_format_error() {
        let rels = r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#;
        let bytes = package(&[("xl/workbook.xml", WORKBOOK), ("xl/_rels/workbook.xml.rels", rels)]);
        let err = read_rows_from(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, FormatError::UnresolvedSheet(ref id) if id == "rId1"));
    }

    #[test]
    fn not_a_zip_is_a_format_error() {
        let err = read_rows_from(Cursor::new(b"name,role\nAlice,Lead\n".to_vec())).unwrap_err();
        assert!(matches!(err, FormatError::Archive(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_sheet_rows("/definitely/not/here.xlsx").unwrap_err();
        assert!(matches!(err, FormatError::Io { .. }));
    }
}
