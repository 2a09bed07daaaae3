use super::{open_package, parse_xml, read_optional_part, read_part, Package};
use crate::error::Failure;
use std::collections::{BTreeMap, HashMap};
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const SML_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

fn sml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(SML_NS))
}

fn sml_children<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &'a str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'a>> + 'a {
    node.children()
        .filter(move |n| n.tag_name().name() == name && n.tag_name().namespace() == Some(SML_NS))
}

/// All text below `node`, skipping phonetic runs
fn rich_text(node: roxmltree::Node) -> String {
    node.descendants()
        .filter(|n| n.tag_name().name() == "t" && !n.ancestors().any(|a| a.tag_name().name() == "rPh"))
        .filter_map(|n| n.text())
        .collect()
}

/// A worksheet as a grid of cell texts, rows and columns from A1
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    /// Comma-separated rows; fields with `,`, `"` or a newline are quoted
    pub(crate) fn to_csv(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(","))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Every sheet as `Sheet: <name>` followed by its CSV, separated by blank lines
pub(crate) fn workbook_text(bytes: &[u8]) -> Result<String, Failure> {
    let sheets = read_workbook(bytes)?;
    Ok(sheets
        .iter()
        .map(|sheet| format!("Sheet: {}\n{}", sheet.name, sheet.to_csv()))
        .collect::<Vec<_>>()
        .join("\n\n"))
}

/// Sheets in workbook order
pub(crate) fn read_workbook(bytes: &[u8]) -> Result<Vec<Sheet>, Failure> {
    let mut package = open_package(bytes, "Excel")?;

    let workbook_xml = read_part(&mut package, "xl/workbook.xml")?;
    let workbook = parse_xml(&workbook_xml, "xl/workbook.xml")?;
    let rels = relationships(&mut package)?;
    let shared = shared_strings(&mut package)?;

    let sheet_nodes = sml(workbook.root_element(), "sheets")
        .ok_or_else(|| Failure::InvalidInput("Workbook lists no sheets".into()))?;

    let mut sheets = Vec::new();
    for node in sml_children(sheet_nodes, "sheet") {
        let name = node.attribute("name").unwrap_or_default().to_string();
        let target = node
            .attribute((REL_NS, "id"))
            .and_then(|id| rels.get(id))
            .ok_or_else(|| Failure::InvalidInput(format!("Sheet {} has no part", name)))?;
        let part = resolve_target(target);
        let xml_content = read_part(&mut package, &part)?;
        let xml = parse_xml(&xml_content, &part)?;
        sheets.push(Sheet {
            rows: read_cells(&xml, &shared)?,
            name,
        });
    }

    tracing::debug!(sheets = sheets.len(), "read workbook");
    Ok(sheets)
}

/// Relationship id to target, from the workbook's relationship part
fn relationships(package: &mut Package<'_>) -> Result<HashMap<String, String>, Failure> {
    let part = "xl/_rels/workbook.xml.rels";
    let xml_content = read_part(package, part)?;
    let xml = parse_xml(&xml_content, part)?;
    Ok(xml
        .root_element()
        .children()
        .filter(|n| n.tag_name().name() == "Relationship" && n.tag_name().namespace() == Some(PKG_REL_NS))
        .filter_map(|n| Some((n.attribute("Id")?.to_string(), n.attribute("Target")?.to_string())))
        .collect())
}

/// Targets are relative to `xl/` unless absolute within the package
fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn shared_strings(package: &mut Package<'_>) -> Result<Vec<String>, Failure> {
    let part = "xl/sharedStrings.xml";
    let Some(xml_content) = read_optional_part(package, part)? else {
        return Ok(Vec::new());
    };
    let xml = parse_xml(&xml_content, part)?;
    Ok(sml_children(xml.root_element(), "si").map(rich_text).collect())
}

/// Excel's own sheet limits
const MAX_ROWS: u32 = 1_048_576;
const MAX_COLUMNS: u32 = 16_384;

/// Rows up to the last populated one; each row runs only to its own last
/// populated column.
fn read_cells(xml: &roxmltree::Document, shared: &[String]) -> Result<Vec<Vec<String>>, Failure> {
    let mut cells: BTreeMap<u32, BTreeMap<u32, String>> = BTreeMap::new();
    let Some(data) = sml(xml.root_element(), "sheetData") else {
        return Ok(Vec::new());
    };

    let mut next_row = 0;
    for row in sml_children(data, "row") {
        let row_index = row
            .attribute("r")
            .and_then(|r| r.parse::<u32>().ok())
            .map(|r| r.saturating_sub(1))
            .unwrap_or(next_row);
        if row_index >= MAX_ROWS {
            return Err(Failure::InvalidInput(format!(
                "Row {} is outside the sheet",
                u64::from(row_index) + 1
            )));
        }
        next_row = row_index + 1;

        let mut next_col = 0;
        for cell in sml_children(row, "c") {
            let col_index = cell
                .attribute("r")
                .and_then(column_index)
                .unwrap_or(next_col);
            if col_index >= MAX_COLUMNS {
                return Err(Failure::InvalidInput(format!(
                    "Cell {} is outside the sheet",
                    cell.attribute("r").unwrap_or_default()
                )));
            }
            next_col = col_index + 1;

            let value = cell_value(cell, shared);
            if !value.is_empty() {
                cells.entry(row_index).or_default().insert(col_index, value);
            }
        }
    }

    let Some(&last_row) = cells.keys().next_back() else {
        return Ok(Vec::new());
    };

    Ok((0..=last_row)
        .map(|r| {
            let Some(row) = cells.remove(&r) else {
                return Vec::new();
            };
            let width = row.keys().next_back().map_or(0, |&c| c + 1);
            let mut fields = vec![String::new(); width as usize];
            for (c, value) in row {
                fields[c as usize] = value;
            }
            fields
        })
        .collect())
}

fn cell_value(cell: roxmltree::Node, shared: &[String]) -> String {
    let raw = sml(cell, "v").and_then(|v| v.text()).unwrap_or_default();
    match cell.attribute("t") {
        Some("s") => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i))
            .cloned()
            .unwrap_or_default(),
        Some("inlineStr") => sml(cell, "is").map(rich_text).unwrap_or_default(),
        Some("b") => match raw.trim() {
            "1" => "TRUE".to_string(),
            "0" => "FALSE".to_string(),
            other => other.to_string(),
        },
        _ => raw.to_string(),
    }
}

/// `"BC12"` -> 54 (0-based column)
fn column_index(reference: &str) -> Option<u32> {
    let letters: Vec<char> = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    letters
        .iter()
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c.to_ascii_uppercase() as u32 - 'A' as u32 + 1)
        })
        .map(|n| n - 1)
}

fn column_name(mut index: u32) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// A single-sheet workbook whose cells are inline strings
pub(crate) fn write_workbook(sheet_name: &str, rows: &[Vec<String>]) -> Result<Vec<u8>, Failure> {
    let content_types = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;
    let root_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
    );
    let workbook = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{SML_NS}" xmlns:r="{REL_NS}"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
        escape_xml(sheet_name)
    );
    let workbook_rels = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{PKG_REL_NS}"><Relationship Id="rId1" Type="{REL_NS}/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#
    );

    let mut sheet_data = String::new();
    for (r, row) in rows.iter().enumerate() {
        sheet_data.push_str(&format!("<row r=\"{}\">", r + 1));
        for (c, value) in row.iter().enumerate() {
            sheet_data.push_str(&format!(
                "<c r=\"{}{}\" t=\"inlineStr\"><is><t xml:space=\"preserve\">{}</t></is></c>",
                column_name(c as u32),
                r + 1,
                escape_xml(value)
            ));
        }
        sheet_data.push_str("</row>");
    }
    let worksheet = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{SML_NS}"><sheetData>{sheet_data}</sheetData></worksheet>"#
    );

    let parts = [
        ("[Content_Types].xml", content_types.to_string()),
        ("_rels/.rels", root_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", worksheet),
    ];

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, content) in parts {
        writer
            .start_file(name, options)
            .map_err(|e| Failure::Internal(format!("Failed to start {}: {}", name, e)))?;
        writer
            .write_all(content.as_bytes())
            .map_err(|e| Failure::Internal(format!("Failed to write {}: {}", name, e)))?;
    }
    writer
        .finish()
        .map(Cursor::into_inner)
        .map_err(|e| Failure::Internal(format!("Failed to finish workbook: {}", e)))
}
