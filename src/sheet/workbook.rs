// src/sheet/workbook.rs

use quick_xml::errors::IllFormedError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::{debug, trace};
use zip::result::ZipError;
use zip::ZipArchive;

use super::error::FormatError;

pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// An opened xlsx package. The archive handle lives as long as this value.
pub struct Workbook<R: Read + Seek> {
    archive: ZipArchive<R>,
}

impl Workbook<File> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| FormatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(file)
    }
}

impl<R: Read + Seek> Workbook<R> {
    pub fn new(reader: R) -> Result<Self, FormatError> {
        let archive = ZipArchive::new(reader)?;
        debug!(entries = archive.len(), "opened workbook archive");
        Ok(Self { archive })
    }

    /// Raw bytes of a part, or `None` when the package has no such entry.
    fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>, FormatError> {
        let mut entry = match self.archive.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).map_err(ZipError::Io)?;
        Ok(Some(buf))
    }

    fn require_part(&mut self, name: &str) -> Result<Vec<u8>, FormatError> {
        self.read_part(name)?
            .ok_or_else(|| FormatError::MissingPart(name.to_string()))
    }

    /// The shared-string table, empty when the package has none.
    pub fn shared_strings(&mut self) -> Result<Vec<String>, FormatError> {
        match self.read_part(SHARED_STRINGS_PART)? {
            Some(xml) => parse_shared_strings(&xml),
            None => Ok(Vec::new()),
        }
    }

    /// Archive path of the first declared worksheet, or `None` when the
    /// workbook declares no sheets.
    pub fn first_sheet_path(&mut self) -> Result<Option<String>, FormatError> {
        let workbook = self.require_part(WORKBOOK_PART)?;
        let rels = self.require_part(WORKBOOK_RELS_PART)?;

        let Some(rid) = first_sheet_rid(&workbook)? else {
            return Ok(None);
        };
        let targets = relationship_targets(&rels)?;
        let target = targets
            .get(&rid)
            .ok_or_else(|| FormatError::UnresolvedSheet(rid.clone()))?;
        trace!(rid = %rid, target = %target, "resolved first sheet");

        Ok(Some(sheet_part_path(target)))
    }

    /// XML of the first worksheet, together with its archive path.
    pub fn first_sheet_xml(&mut self) -> Result<Option<(String, Vec<u8>)>, FormatError> {
        let Some(path) = self.first_sheet_path()? else {
            return Ok(None);
        };
        let xml = self.require_part(&path)?;
        Ok(Some((path, xml)))
    }
}

/// Relationship targets are relative to `xl/` unless they start at the package root.
fn sheet_part_path(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

pub(crate) fn utf8<'a>(part: &str, bytes: &'a [u8]) -> Result<&'a str, FormatError> {
    std::str::from_utf8(bytes).map_err(|_| FormatError::Encoding(part.to_string()))
}

/// Appends the character data carried by `event` to `out`.
/// Unknown named entities are kept verbatim.
pub(crate) fn append_text(
    part: &str,
    event: &Event<'_>,
    out: &mut String,
) -> Result<(), FormatError> {
    match event {
        Event::Text(text) => out.push_str(utf8(part, text.as_ref())?),
        Event::CData(text) => out.push_str(utf8(part, text.as_ref())?),
        Event::GeneralRef(entity) => {
            if let Some(ch) = entity
                .resolve_char_ref()
                .map_err(|e| FormatError::xml(part, e))?
            {
                out.push(ch);
            } else {
                let name = utf8(part, entity.as_ref())?;
                match quick_xml::escape::resolve_predefined_entity(name) {
                    Some(resolved) => out.push_str(resolved),
                    None => {
                        out.push('&');
                        out.push_str(name);
                        out.push(';');
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// Open elements of one XML part. Reaching the end of input with any
/// still open means the part was cut short.
#[derive(Debug, Default)]
pub(crate) struct Nesting {
    open: Vec<Vec<u8>>,
}

impl Nesting {
    /// Tracks `event`; `Ok(true)` once the part has ended cleanly.
    pub(crate) fn observe(
        &mut self,
        part: &str,
        event: &Event<'_>,
    ) -> Result<bool, FormatError> {
        match event {
            Event::Start(e) => self.open.push(e.name().as_ref().to_vec()),
            Event::End(_) => {
                self.open.pop();
            }
            Event::Eof => {
                if let Some(name) = self.open.pop() {
                    let name = String::from_utf8_lossy(&name).into_owned();
                    return Err(FormatError::xml(
                        part,
                        quick_xml::Error::IllFormed(IllFormedError::MissingEndTag(name)),
                    ));
                }
                return Ok(true);
            }
            _ => {}
        }
        Ok(false)
    }
}

fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, FormatError> {
    let part = SHARED_STRINGS_PART;
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut nesting = Nesting::default();

    let mut strings = Vec::new();
    let mut current: Option<String> = None;
    let mut text_depth = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| FormatError::xml(part, e))?;
        if nesting.observe(part, &event)? {
            break;
        }
        match &event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"t" => text_depth += 1,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => {
                    if let Some(text) = current.take() {
                        strings.push(text);
                    }
                }
                b"t" => text_depth = text_depth.saturating_sub(1),
                _ => {}
            },
            other if text_depth > 0 => {
                if let Some(text) = current.as_mut() {
                    append_text(part, other, text)?;
                }
            }
            _ => {}
        }
        buf.clear();
    }

    debug!(count = strings.len(), "loaded shared strings");
    Ok(strings)
}

fn first_sheet_rid(xml: &[u8]) -> Result<Option<String>, FormatError> {
    let part = WORKBOOK_PART;
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut nesting = Nesting::default();
    let mut in_sheets = false;
    // outer None: no sheet seen; inner None: first sheet has no `r:id`
    let mut first: Option<Option<String>> = None;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| FormatError::xml(part, e))?;
        if nesting.observe(part, &event)? {
            break;
        }
        match event {
            Event::Start(e) if e.local_name().as_ref() == b"sheets" => in_sheets = true,
            Event::End(e) if e.local_name().as_ref() == b"sheets" => in_sheets = false,
            Event::Start(e) | Event::Empty(e)
                if in_sheets && first.is_none() && e.local_name().as_ref() == b"sheet" =>
            {
                let mut rid = None;
                // `r:id`, not `sheetId`
                for attr in e.attributes().flatten() {
                    if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id" {
                        let value = attr
                            .unescape_value()
                            .map_err(|e| FormatError::xml(part, e))?;
                        rid = Some(value.to_string());
                        break;
                    }
                }
                first = Some(rid);
            }
            _ => {}
        }
        buf.clear();
    }

    match first {
        None => Ok(None),
        Some(Some(rid)) => Ok(Some(rid)),
        Some(None) => Err(FormatError::UnresolvedSheet("<missing r:id>".to_string())),
    }
}

fn relationship_targets(xml: &[u8]) -> Result<HashMap<String, String>, FormatError> {
    let part = WORKBOOK_RELS_PART;
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut nesting = Nesting::default();
    let mut targets = HashMap::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| FormatError::xml(part, e))?;
        if nesting.observe(part, &event)? {
            break;
        }
        match event {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Id" => {
                            id = Some(
                                attr.unescape_value()
                                    .map_err(|e| FormatError::xml(part, e))?
                                    .to_string(),
                            )
                        }
                        b"Target" => {
                            target = Some(
                                attr.unescape_value()
                                    .map_err(|e| FormatError::xml(part, e))?
                                    .to_string(),
                            )
                        }
                        _ => {}
                    }
                }
                if let (Some(id), Some(target)) = (id, target) {
                    targets.insert(id, target);
                }
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_strings_concatenate_rich_text_runs() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3">
  <si><t>Technical</t></si>
  <si><r><t>Alice </t></r><r><rPr><b/></rPr><t>Roy</t></r></si>
  <si/>
  <si><t>Food &amp; Court &#169;</t></si>
</sst>"#;
        let strings = parse_shared_strings(xml).unwrap();
        assert_eq!(
            strings,
            vec!["Technical", "Alice Roy", "", "Food & Court \u{a9}"]
        );
    }

    #[test]
    fn first_sheet_uses_relationship_id_not_sheet_id() {
        let xml = br#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
  xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Team" sheetId="7" r:id="rId3"/>
    <sheet name="Other" sheetId="1" r:id="rId1"/>
  </sheets>
</workbook>"#;
        assert_eq!(first_sheet_rid(xml).unwrap().as_deref(), Some("rId3"));
    }

    #[test]
    fn workbook_without_sheets_has_no_first_sheet() {
        let xml = br#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheets/></workbook>"#;
        assert_eq!(first_sheet_rid(xml).unwrap(), None);
    }

    #[test]
    fn relationship_targets_are_keyed_by_id() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;
        let targets = relationship_targets(xml).unwrap();
        assert_eq!(targets.get("rId1").map(String::as_str), Some("worksheets/sheet1.xml"));
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn sheet_targets_resolve_against_xl() {
        assert_eq!(sheet_part_path("worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(sheet_part_path("/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
    }

    #[test]
    fn malformed_xml_is_a_format_error() {
        let err = relationship_targets(b"<Relationships><Relationship Id=\"rId1\"></Oops>")
            .unwrap_err();
        assert!(matches!(err, FormatError::Xml { .. }), "got {err:?}");
    }

    #[test]
    fn truncated_parts_are_format_errors() {
        let rels = br#"<Relationships><Relationship Id="rId1" Target="worksheets/sheet1.xml"/>"#;
        let err = relationship_targets(rels).unwrap_err();
        assert!(
            matches!(err, FormatError::Xml { ref part, .. } if part == WORKBOOK_RELS_PART),
            "got {err:?}"
        );

        let workbook = br#"<workbook xmlns:r="r"><sheets><sheet name="Team" r:id="rId1"/>"#;
        assert!(matches!(first_sheet_rid(workbook), Err(FormatError::Xml { .. })));

        let shared = br#"<sst><si><t>Technical</t></si><si><t>Alice"#;
        assert!(matches!(parse_shared_strings(shared), Err(FormatError::Xml { .. })));
    }

    #[test]
    fn first_sheet_without_relationship_id_is_unresolved() {
        let xml = br#"<workbook><sheets><sheet name="Team" sheetId="1"/></sheets></workbook>"#;
        let err = first_sheet_rid(xml).unwrap_err();
        assert!(matches!(err, FormatError::UnresolvedSheet(_)), "got {err:?}");
    }
}
