//! Package loading

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tabula_core::{CellValue, Workbook, Worksheet};
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::escape;

const CONTENT_TYPES: &str = "[Content_Types].xml";
const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Loads cell values from an XLSX package
pub struct XlsxReader;

/// A `<sheet>` entry of the workbook part
struct SheetEntry {
    name: String,
    rel_id: String,
}

impl XlsxReader {
    pub fn read_file<P: AsRef<Path>>(path: P) -> XlsxResult<Workbook> {
        let file = File::open(path.as_ref())?;
        Self::read(BufReader::new(file))
    }

    /// Load every sheet of the package in tab order
    pub fn read<R: Read + Seek>(reader: R) -> XlsxResult<Workbook> {
        let mut zip = ZipArchive::new(reader)?;
        if !zip.file_names().any(|name| name == CONTENT_TYPES) {
            return Err(XlsxError::MissingPart(CONTENT_TYPES.into()));
        }

        let shared = match zip.by_name(SHARED_STRINGS) {
            Ok(part) => shared_strings(xml_reader(part), SHARED_STRINGS)?,
            Err(ZipError::FileNotFound) => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        let entries = sheet_entries(xml_reader(required(&mut zip, WORKBOOK)?))?;
        let targets = relationship_targets(xml_reader(required(&mut zip, WORKBOOK_RELS)?))?;

        let mut book = Workbook::new();
        for entry in entries {
            let Some(part) = targets
                .iter()
                .find(|(id, _)| *id == entry.rel_id)
                .map(|(_, target)| target.clone())
            else {
                log::warn!("sheet '{}' has no relationship {}, skipped", entry.name, entry.rel_id);
                continue;
            };

            let mut sheet = Worksheet::new(entry.name);
            match zip.by_name(&part) {
                Ok(file) => load_cells(xml_reader(file), &part, &shared, &mut sheet)?,
                Err(ZipError::FileNotFound) => {
                    log::warn!("sheet '{}' points at missing part {}, loaded empty", sheet.name(), part);
                }
                Err(e) => return Err(e.into()),
            }
            book.push_sheet(sheet)?;
        }
        Ok(book)
    }
}

fn required<'a, R: Read + Seek>(zip: &'a mut ZipArchive<R>, part: &str) -> XlsxResult<impl Read + 'a> {
    zip.by_name(part).map_err(|e| match e {
        ZipError::FileNotFound => XlsxError::MissingPart(part.to_string()),
        other => other.into(),
    })
}

fn xml_reader<R: Read>(part: R) -> Reader<BufReader<R>> {
    let mut xml = Reader::from_reader(BufReader::new(part));
    xml.trim_text(false);
    xml
}

/// Unescaped value of an attribute, matched on its local name
fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

fn shared_strings<B: BufRead>(mut xml: Reader<B>, part: &str) -> XlsxResult<Vec<String>> {
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    // Phonetic runs repeat the text in another script
    let mut in_phonetic = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf).map_err(|e| XlsxError::xml(part, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = !in_phonetic,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(t) if in_text => {
                current.push_str(&t.unescape().map_err(|e| XlsxError::xml(part, e))?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.push(escape::decode(&current).into_owned()),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

fn sheet_entries<B: BufRead>(mut xml: Reader<B>) -> XlsxResult<Vec<SheetEntry>> {
    let mut entries = Vec::new();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf).map_err(|e| XlsxError::xml(WORKBOOK, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(rel_id)) = (attr(&e, b"name"), attr(&e, b"id")) {
                    entries.push(SheetEntry { name, rel_id });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(entries)
}

/// Relationship id to package part name
fn relationship_targets<B: BufRead>(mut xml: Reader<B>) -> XlsxResult<Vec<(String, String)>> {
    let mut targets = Vec::new();
    let mut buf = Vec::new();
    loop {
        match xml.read_event_into(&mut buf).map_err(|e| XlsxError::xml(WORKBOOK_RELS, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target)) = (attr(&e, b"Id"), attr(&e, b"Target")) {
                    let part = match target.strip_prefix('/') {
                        Some(absolute) => absolute.to_string(),
                        None => format!("xl/{}", target),
                    };
                    targets.push((id, part));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

/// Which element's text is being collected inside a `<c>`
#[derive(Clone, Copy, PartialEq)]
enum Slot {
    None,
    Value,
    Formula,
    Inline,
}

/// A `<c>` element seen so far
#[derive(Default)]
struct PendingCell {
    row: u32,
    col: u16,
    kind: Option<String>,
    value: Option<String>,
    formula: Option<String>,
}

impl PendingCell {
    fn slot_mut(&mut self, slot: Slot) -> Option<&mut String> {
        match slot {
            Slot::Value | Slot::Inline => Some(self.value.get_or_insert_with(String::new)),
            Slot::Formula => Some(self.formula.get_or_insert_with(String::new)),
            Slot::None => None,
        }
    }

    fn into_value(self, shared: &[String]) -> Result<CellValue, String> {
        let raw = self.value.unwrap_or_default();
        let plain = match self.kind.as_deref() {
            _ if raw.is_empty() => CellValue::Empty,
            Some("s") => {
                let index: usize = raw
                    .trim()
                    .parse()
                    .map_err(|_| format!("shared string index '{}'", raw))?;
                let text = shared
                    .get(index)
                    .ok_or_else(|| format!("shared string {} of {}", index, shared.len()))?;
                CellValue::Text(text.clone())
            }
            Some("b") => CellValue::Bool(matches!(raw.trim(), "1" | "true")),
            Some("e") => CellValue::Error(raw.trim().to_string()),
            Some("str") | Some("inlineStr") => CellValue::Text(escape::decode(&raw).into_owned()),
            // Dates stored as ISO text stay text
            Some("d") => CellValue::Text(raw),
            _ => match raw.trim().parse::<f64>() {
                Ok(n) => CellValue::Number(n),
                Err(_) => CellValue::Text(raw),
            },
        };

        Ok(match self.formula {
            Some(formula) if !formula.is_empty() => {
                CellValue::formula(formula, Some(plain).filter(|v| !v.is_empty()))
            }
            _ => plain,
        })
    }
}

fn position(reference: Option<String>, row: u32, next_col: u16) -> (u32, u16) {
    match reference.as_deref().map(tabula_core::CellRef::parse) {
        Some(Ok(at)) => (at.row, at.col),
        _ => (row, next_col),
    }
}

fn load_cells<B: BufRead>(
    mut xml: Reader<B>,
    part: &str,
    shared: &[String],
    sheet: &mut Worksheet,
) -> XlsxResult<()> {
    let mut row: u32 = 0;
    let mut next_col: u16 = 0;
    let mut seen_row = false;
    let mut cell: Option<PendingCell> = None;
    let mut slot = Slot::None;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf).map_err(|e| XlsxError::xml(part, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = match attr(&e, b"r").and_then(|r| r.parse::<u32>().ok()) {
                        Some(r) if r > 0 => r - 1,
                        _ if seen_row => row + 1,
                        _ => 0,
                    };
                    seen_row = true;
                    next_col = 0;
                }
                b"c" => {
                    let (r, c) = position(attr(&e, b"r"), row, next_col);
                    cell = Some(PendingCell {
                        row: r,
                        col: c,
                        kind: attr(&e, b"t"),
                        ..PendingCell::default()
                    });
                }
                b"v" => slot = Slot::Value,
                b"f" => slot = Slot::Formula,
                b"t" if cell.is_some() => slot = Slot::Inline,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = if seen_row { row + 1 } else { 0 };
                    seen_row = true;
                }
                b"c" => {
                    let (_, c) = position(attr(&e, b"r"), row, next_col);
                    next_col = c.saturating_add(1);
                }
                _ => {}
            },
            Event::Text(t) => {
                if let Some(target) = cell.as_mut().and_then(|c| c.slot_mut(slot)) {
                    target.push_str(&t.unescape().map_err(|e| XlsxError::xml(part, e))?);
                }
            }
            Event::CData(t) => {
                if let Some(target) = cell.as_mut().and_then(|c| c.slot_mut(slot)) {
                    target.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"v" | b"f" | b"t" => slot = Slot::None,
                b"c" => {
                    if let Some(done) = cell.take() {
                        let (r, c) = (done.row, done.col);
                        next_col = c.saturating_add(1);
                        let value = done.into_value(shared).map_err(|detail| XlsxError::BadCell {
                            part: part.to_string(),
                            detail: format!("{}: {}", tabula_core::CellRef::new(r, c), detail),
                        })?;
                        sheet.put(r, c, value)?;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
    const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Zip up a package with the given sheets (name, sheetData body)
    fn package(sheets: &[(&str, &str)], shared: Option<&str>) -> Vec<u8> {
        let mut parts: Vec<(String, String)> = vec![(
            CONTENT_TYPES.into(),
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#.into(),
        )];

        let entries: String = (1..=sheets.len())
            .map(|i| format!(r#"<sheet name="{}" sheetId="{i}" r:id="rId{i}"/>"#, sheets[i - 1].0))
            .collect();
        parts.push((
            WORKBOOK.into(),
            format!(r#"<workbook xmlns="{MAIN_NS}" xmlns:r="{REL_NS}"><sheets>{entries}</sheets></workbook>"#),
        ));

        let rels: String = (1..=sheets.len())
            .map(|i| format!(r#"<Relationship Id="rId{i}" Type="{REL_NS}/worksheet" Target="worksheets/sheet{i}.xml"/>"#))
            .collect();
        parts.push((
            WORKBOOK_RELS.into(),
            format!(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#),
        ));

        if let Some(sst) = shared {
            parts.push((SHARED_STRINGS.into(), format!(r#"<sst xmlns="{MAIN_NS}">{sst}</sst>"#)));
        }
        for (i, (_, data)) in sheets.iter().enumerate() {
            parts.push((
                format!("xl/worksheets/sheet{}.xml", i + 1),
                format!(r#"<worksheet xmlns="{MAIN_NS}"><sheetData>{data}</sheetData></worksheet>"#),
            ));
        }

        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn load(sheets: &[(&str, &str)], shared: Option<&str>) -> Workbook {
        XlsxReader::read(Cursor::new(package(sheets, shared))).unwrap()
    }

    #[test]
    fn test_sheet_names_in_tab_order() {
        let book = load(&[("Orders", ""), ("Lines", ""), ("Notes", "")], None);
        assert_eq!(book.sheet_names(), vec!["Orders", "Lines", "Notes"]);
    }

    #[test]
    fn test_cell_kinds() {
        let sst = r#"<si><t>Order ID</t></si><si><r><t>Rich </t></r><r><t>text</t></r><rPh><t>ruby</t></rPh></si>"#;
        let data = concat!(
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>"#,
            r#"<row r="2"><c r="A2"><v>1001</v></c><c r="B2" t="b"><v>1</v></c>"#,
            r#"<c r="C2" t="inlineStr"><is><t>  padded  </t></is></c>"#,
            r#"<c r="D2" t="e"><v>#N/A</v></c><c r="E2"><f>A2*2</f><v>2002</v></c>"#,
            r#"<c r="F2" s="3"/><c r="G2" t="str"><f>"x"&amp;"y"</f><v>xy</v></c></row>"#,
        );
        let book = load(&[("Sheet1", data)], Some(sst));
        let ws = book.sheet_at(0).unwrap();

        assert_eq!(ws.value_a1("A1").unwrap().as_text(), Some("Order ID"));
        assert_eq!(ws.value_a1("B1").unwrap().as_text(), Some("Rich text"));
        assert_eq!(ws.value_a1("A2").unwrap().as_number(), Some(1001.0));
        assert_eq!(ws.value_a1("B2").unwrap().as_bool(), Some(true));
        assert_eq!(ws.value_a1("C2").unwrap().as_text(), Some("  padded  "));
        assert_eq!(ws.value_a1("D2").unwrap(), CellValue::Error("#N/A".into()));
        assert_eq!(
            ws.value_a1("E2").unwrap(),
            CellValue::formula("A2*2", Some(CellValue::Number(2002.0)))
        );
        assert_eq!(ws.value_a1("G2").unwrap().formula_source(), Some(r#""x"&"y""#));
        assert_eq!(ws.cell_text(1, 6).as_deref(), Some("xy"));
        assert!(ws.value_a1("F2").unwrap().is_empty());
        assert_eq!(ws.last_data_column(), Some(6));
    }

    #[test]
    fn test_cells_without_references() {
        let data = r#"<row><c><v>1</v></c><c><v>2</v></c></row><row><c t="inlineStr"><is><t>x</t></is></c></row>"#;
        let book = load(&[("S", data)], None);
        let ws = book.sheet_at(0).unwrap();
        assert_eq!(ws.cell_text(0, 1).as_deref(), Some("2"));
        assert_eq!(ws.cell_text(1, 0).as_deref(), Some("x"));
    }

    #[test]
    fn test_escaped_text_is_decoded() {
        let sst = r#"<si><t>line_x000D__x000A_two</t></si>"#;
        let data = r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="inlineStr"><is><t>REF_x005F_x0041_9</t></is></c></row>"#;
        let book = load(&[("S", data)], Some(sst));
        let ws = book.sheet_at(0).unwrap();
        assert_eq!(ws.cell_text(0, 0).as_deref(), Some("line\r\ntwo"));
        assert_eq!(ws.cell_text(0, 1).as_deref(), Some("REF_x0041_9"));
    }

    #[test]
    fn test_bad_shared_string_index() {
        let data = r#"<row r="1"><c r="A1" t="s"><v>4</v></c></row>"#;
        let err = XlsxReader::read(Cursor::new(package(&[("S", data)], Some("<si><t>a</t></si>")))).unwrap_err();
        assert!(matches!(err, XlsxError::BadCell { .. }));
    }

    #[test]
    fn test_package_without_sheets() {
        assert!(load(&[], None).is_empty());
    }

    #[test]
    fn test_missing_content_types() {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(WORKBOOK, SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<workbook/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = XlsxReader::read(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, XlsxError::MissingPart(part) if part == CONTENT_TYPES));
    }

    #[test]
    fn test_not_a_package() {
        let err = XlsxReader::read(Cursor::new(b"plain text".to_vec())).unwrap_err();
        assert!(matches!(err, XlsxError::Package(_)));
    }
}
