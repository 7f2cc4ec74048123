//! Package saving

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tabula_core::{CellRef, CellValue, Workbook, Worksheet};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{XlsxError, XlsxResult};
use crate::escape;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const DOC_REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const CONTENT_TYPES_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const SHEET_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// One font, fill, border and cell format: the least a consumer accepts
const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    r#"<fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts>"#,
    r#"<fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills>"#,
    r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
    r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    r#"<cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs>"#,
    r#"</styleSheet>"#,
);

/// Saves cell values as an XLSX package
pub struct XlsxWriter;

type Xml = Writer<Vec<u8>>;

impl XlsxWriter {
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> XlsxResult<()> {
        let mut file = BufWriter::new(File::create(path.as_ref())?);
        Self::write(workbook, &mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Write every sheet in tab order
    pub fn write<W: Write + Seek>(workbook: &Workbook, writer: W) -> XlsxResult<()> {
        let mut zip = ZipWriter::new(writer);
        let sheets = workbook.sheets();

        store(&mut zip, "[Content_Types].xml", &build("[Content_Types].xml", |x| content_types(x, sheets.len()))?)?;
        store(&mut zip, "_rels/.rels", &build("_rels/.rels", root_rels)?)?;
        store(&mut zip, "xl/workbook.xml", &build("xl/workbook.xml", |x| workbook_part(x, sheets))?)?;
        store(
            &mut zip,
            "xl/_rels/workbook.xml.rels",
            &build("xl/_rels/workbook.xml.rels", |x| workbook_rels(x, sheets.len()))?,
        )?;
        store(&mut zip, "xl/styles.xml", STYLES.as_bytes())?;

        for (i, sheet) in sheets.iter().enumerate() {
            let part = format!("xl/worksheets/sheet{}.xml", i + 1);
            store(&mut zip, &part, &build(&part, |x| sheet_part(x, sheet))?)?;
        }

        zip.finish()?;
        Ok(())
    }
}

fn store<W: Write + Seek>(zip: &mut ZipWriter<W>, part: &str, body: &[u8]) -> XlsxResult<()> {
    zip.start_file(part, SimpleFileOptions::default())?;
    zip.write_all(body)?;
    Ok(())
}

/// Render one XML part into memory
fn build(part: &str, body: impl FnOnce(&mut Xml) -> quick_xml::Result<()>) -> XlsxResult<Vec<u8>> {
    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .and_then(|_| body(&mut xml))
        .map_err(|e| XlsxError::xml(part, e))?;
    Ok(xml.into_inner())
}

fn open(xml: &mut Xml, name: &str, attrs: &[(&str, &str)]) -> quick_xml::Result<()> {
    xml.write_event(Event::Start(BytesStart::new(name).with_attributes(attrs.iter().copied())))
}

fn close(xml: &mut Xml, name: &str) -> quick_xml::Result<()> {
    xml.write_event(Event::End(BytesEnd::new(name)))
}

fn leaf(xml: &mut Xml, name: &str, attrs: &[(&str, &str)]) -> quick_xml::Result<()> {
    xml.write_event(Event::Empty(BytesStart::new(name).with_attributes(attrs.iter().copied())))
}

fn text_element(xml: &mut Xml, name: &str, attrs: &[(&str, &str)], text: &str) -> quick_xml::Result<()> {
    open(xml, name, attrs)?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    close(xml, name)
}

fn content_types(xml: &mut Xml, sheet_count: usize) -> quick_xml::Result<()> {
    open(xml, "Types", &[("xmlns", CONTENT_TYPES_NS)])?;
    leaf(
        xml,
        "Default",
        &[("Extension", "rels"), ("ContentType", "application/vnd.openxmlformats-package.relationships+xml")],
    )?;
    leaf(xml, "Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    leaf(
        xml,
        "Override",
        &[
            ("PartName", "/xl/workbook.xml"),
            ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
        ],
    )?;
    leaf(
        xml,
        "Override",
        &[
            ("PartName", "/xl/styles.xml"),
            ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"),
        ],
    )?;
    for i in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{}.xml", i);
        leaf(xml, "Override", &[("PartName", part.as_str()), ("ContentType", SHEET_TYPE)])?;
    }
    close(xml, "Types")
}

fn root_rels(xml: &mut Xml) -> quick_xml::Result<()> {
    open(xml, "Relationships", &[("xmlns", PKG_REL_NS)])?;
    let kind = format!("{}/officeDocument", DOC_REL_NS);
    leaf(xml, "Relationship", &[("Id", "rId1"), ("Type", kind.as_str()), ("Target", "xl/workbook.xml")])?;
    close(xml, "Relationships")
}

fn workbook_part(xml: &mut Xml, sheets: &[Worksheet]) -> quick_xml::Result<()> {
    open(xml, "workbook", &[("xmlns", MAIN_NS), ("xmlns:r", DOC_REL_NS)])?;
    open(xml, "sheets", &[])?;
    for (i, sheet) in sheets.iter().enumerate() {
        let (id, rel) = ((i + 1).to_string(), format!("rId{}", i + 1));
        leaf(xml, "sheet", &[("name", sheet.name()), ("sheetId", id.as_str()), ("r:id", rel.as_str())])?;
    }
    close(xml, "sheets")?;
    close(xml, "workbook")
}

fn workbook_rels(xml: &mut Xml, sheet_count: usize) -> quick_xml::Result<()> {
    open(xml, "Relationships", &[("xmlns", PKG_REL_NS)])?;
    let sheet_kind = format!("{}/worksheet", DOC_REL_NS);
    for i in 1..=sheet_count {
        let (id, target) = (format!("rId{}", i), format!("worksheets/sheet{}.xml", i));
        leaf(xml, "Relationship", &[("Id", id.as_str()), ("Type", sheet_kind.as_str()), ("Target", target.as_str())])?;
    }
    // Styles take the id after the last sheet
    let (id, styles_kind) = (format!("rId{}", sheet_count + 1), format!("{}/styles", DOC_REL_NS));
    leaf(xml, "Relationship", &[("Id", id.as_str()), ("Type", styles_kind.as_str()), ("Target", "styles.xml")])?;
    close(xml, "Relationships")
}

fn sheet_part(xml: &mut Xml, sheet: &Worksheet) -> quick_xml::Result<()> {
    open(xml, "worksheet", &[("xmlns", MAIN_NS)])?;
    if sheet.is_empty() {
        leaf(xml, "sheetData", &[])?;
    } else {
        open(xml, "sheetData", &[])?;
        for (row, cells) in sheet.rows() {
            let r = (u64::from(row) + 1).to_string();
            open(xml, "row", &[("r", r.as_str())])?;
            for (col, value) in cells {
                cell(xml, CellRef::new(row, *col), value)?;
            }
            close(xml, "row")?;
        }
        close(xml, "sheetData")?;
    }
    close(xml, "worksheet")
}

fn cell(xml: &mut Xml, at: CellRef, value: &CellValue) -> quick_xml::Result<()> {
    let r = at.to_string();
    match value {
        CellValue::Empty => Ok(()),
        CellValue::Text(s) => {
            open(xml, "c", &[("r", r.as_str()), ("t", "inlineStr")])?;
            open(xml, "is", &[])?;
            text_element(xml, "t", &[("xml:space", "preserve")], &escape::encode(s))?;
            close(xml, "is")?;
            close(xml, "c")
        }
        CellValue::Number(n) => {
            open(xml, "c", &[("r", r.as_str())])?;
            text_element(xml, "v", &[], &n.to_string())?;
            close(xml, "c")
        }
        CellValue::Bool(b) => {
            open(xml, "c", &[("r", r.as_str()), ("t", "b")])?;
            text_element(xml, "v", &[], if *b { "1" } else { "0" })?;
            close(xml, "c")
        }
        CellValue::Error(code) => {
            open(xml, "c", &[("r", r.as_str()), ("t", "e")])?;
            text_element(xml, "v", &[], code)?;
            close(xml, "c")
        }
        CellValue::Formula { formula, cached } => {
            let cached = cached.as_deref();
            let (kind, shown) = match cached {
                Some(CellValue::Text(s)) => (Some("str"), Some(escape::encode(s).into_owned())),
                Some(CellValue::Bool(b)) => (Some("b"), Some(if *b { "1" } else { "0" }.to_string())),
                Some(CellValue::Error(code)) => (Some("e"), Some(code.clone())),
                Some(CellValue::Number(n)) => (None, Some(n.to_string())),
                _ => (None, None),
            };
            match kind {
                Some(t) => open(xml, "c", &[("r", r.as_str()), ("t", t)])?,
                None => open(xml, "c", &[("r", r.as_str())])?,
            }
            text_element(xml, "f", &[], formula)?;
            if let Some(v) = shown {
                text_element(xml, "v", &[], &v)?;
            }
            close(xml, "c")
        }
    }
}
