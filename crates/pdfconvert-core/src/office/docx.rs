use super::{open_package, parse_xml, read_part};
use crate::error::Failure;

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == name
        && node.tag_name().namespace() == Some(WML_NS)
}

/// Raw text of `word/document.xml`: one entry per paragraph, separated by a
/// blank line. Tabs become `\t`, breaks become newlines.
pub(crate) fn extract_text(bytes: &[u8]) -> Result<String, Failure> {
    let mut package = open_package(bytes, "Word")?;
    let xml_content = read_part(&mut package, "word/document.xml")?;
    let xml = parse_xml(&xml_content, "word/document.xml")?;

    let mut paragraphs = Vec::new();
    collect(xml.root(), &mut String::new(), &mut paragraphs);

    tracing::debug!(paragraphs = paragraphs.len(), "extracted Word text");
    Ok(paragraphs.join("\n\n"))
}

fn collect(node: roxmltree::Node, text: &mut String, paragraphs: &mut Vec<String>) {
    if is_wml(node, "p") {
        let mut own = String::new();
        for child in node.children() {
            collect(child, &mut own, paragraphs);
        }
        paragraphs.push(own);
        return;
    }

    if is_wml(node, "t") {
        text.extend(node.children().filter_map(|n| n.text()));
    } else if is_wml(node, "tab") {
        text.push('\t');
    } else if is_wml(node, "br") || is_wml(node, "cr") {
        text.push('\n');
    } else {
        for child in node.children() {
            collect(child, text, paragraphs);
        }
    }
}
