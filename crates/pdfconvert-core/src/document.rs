//! Shared lopdf plumbing: loading, saving, page geometry, resources and
//! a small builder for documents assembled from scratch.

use crate::config::PageSize;
use crate::error::Failure;
use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

/// Attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

pub(crate) fn load_pdf(bytes: &[u8]) -> Result<Document, Failure> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(Failure::InvalidInput(
            "Not a valid PDF file (missing %PDF- header)".into(),
        ));
    }
    Document::load_mem(bytes).map_err(|e| Failure::InvalidInput(format!("Failed to parse PDF: {}", e)))
}

/// Serialize with classic cross-reference tables (no object streams)
pub(crate) fn save_pdf(doc: &mut Document) -> Result<Vec<u8>, Failure> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| Failure::Internal(format!("Failed to save PDF: {}", e)))?;
    Ok(buffer)
}

pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Width and height of a page's MediaBox, inherited if necessary
pub(crate) fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    let media_box = inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|obj| resolve(doc, &obj).as_array().ok().and_then(|a| parse_box(doc, a)));

    match media_box {
        Some([x1, y1, x2, y2]) => PageSize {
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        },
        None => PageSize {
            width: 612.0,
            height: 792.0,
        },
    }
}

fn parse_box(doc: &Document, array: &[Object]) -> Option<[f32; 4]> {
    if array.len() != 4 {
        return None;
    }
    let mut result = [0.0; 4];
    for (slot, obj) in result.iter_mut().zip(array) {
        *slot = number(resolve(doc, obj))?;
    }
    Some(result)
}

pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(n) => Some(*n as f32),
        Object::Real(n) => Some(*n),
        _ => None,
    }
}

/// Follow a reference one level; non-references are returned unchanged
pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Look up `key` on the page, then on each ancestor `Pages` node
pub(crate) fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
    let mut current = Some(page_id);
    // Guards against cyclic Parent chains in malformed files
    let mut depth = 0;
    while let Some(node_id) = current {
        let dict = doc.get_dictionary(node_id).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(value.clone());
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
        if depth > 64 {
            return None;
        }
    }
    None
}

/// Copy inheritable attributes down onto the page itself, so the page keeps
/// its geometry and resources when re-parented.
pub(crate) fn flatten_inherited(doc: &mut Document, page_id: ObjectId) -> Result<(), Failure> {
    let mut found = Vec::new();
    for key in INHERITABLE {
        let present = doc
            .get_dictionary(page_id)
            .map(|d| d.has(key))
            .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?;
        if !present {
            if let Some(value) = inherited_attribute(doc, page_id, key) {
                found.push((key.to_vec(), value));
            }
        }
    }
    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?;
    for (key, value) in found {
        page.set(key, value);
    }
    Ok(())
}

/// Register `object_id` under `category`/`name` in the page's own Resources.
///
/// Inherited or referenced resource dictionaries are copied onto the page
/// first so the addition does not leak into sibling pages.
pub(crate) fn add_page_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &str,
    name: &str,
    object_id: ObjectId,
) -> Result<(), Failure> {
    let mut resources = inherited_attribute(doc, page_id, b"Resources")
        .and_then(|obj| resolve(doc, &obj).as_dict().ok().cloned())
        .unwrap_or_default();

    let mut entries = resources
        .get(category.as_bytes())
        .ok()
        .and_then(|obj| resolve(doc, obj).as_dict().ok().cloned())
        .unwrap_or_default();
    entries.set(name, Object::Reference(object_id));
    resources.set(category, Object::Dictionary(entries));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?;
    page.set("Resources", Object::Dictionary(resources));
    Ok(())
}

/// Draw `content` on top of the existing page content.
///
/// The existing streams are wrapped in `q ... Q` so whatever graphics state
/// they leave behind does not affect the overlay.
pub(crate) fn append_overlay(
    doc: &mut Document,
    page_id: ObjectId,
    content: Content,
) -> Result<(), Failure> {
    let encoded = content
        .encode()
        .map_err(|e| Failure::Internal(format!("Failed to encode content: {}", e)))?;

    let existing: Vec<Object> = match doc
        .get_dictionary(page_id)
        .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?
        .get(b"Contents")
    {
        Ok(Object::Array(items)) => items.clone(),
        Ok(single) => vec![single.clone()],
        Err(_) => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 3);
    if !existing.is_empty() {
        let push = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
        let pop = doc.add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));
        contents.push(Object::Reference(push));
        contents.extend(existing);
        contents.push(Object::Reference(pop));
    }
    let overlay = doc.add_object(Stream::new(Dictionary::new(), encoded));
    contents.push(Object::Reference(overlay));

    let page = doc
        .get_dictionary_mut(page_id)
        .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?;
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// Standard 14 Helvetica with WinAnsi encoding
pub(crate) fn helvetica() -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Encode text for a WinAnsi simple font; characters outside Latin-1 become `?`
pub(crate) fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7e | 0xa0..=0xff => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Assembles a new document page by page
pub(crate) struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
}

impl PdfBuilder {
    pub(crate) fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            kids: Vec::new(),
        }
    }

    pub(crate) fn add_object<T: Into<Object>>(&mut self, object: T) -> ObjectId {
        self.doc.add_object(object)
    }

    pub(crate) fn add_page(
        &mut self,
        size: PageSize,
        content: Content,
        resources: Dictionary,
    ) -> Result<ObjectId, Failure> {
        let encoded = content
            .encode()
            .map_err(|e| Failure::Internal(format!("Failed to encode content: {}", e)))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), encoded));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), size.width.into(), size.height.into()],
            "Resources" => resources,
            "Contents" => content_id,
        });
        self.kids.push(Object::Reference(page_id));
        Ok(page_id)
    }

    pub(crate) fn page_count(&self) -> usize {
        self.kids.len()
    }

    pub(crate) fn finish(mut self) -> Result<Vec<u8>, Failure> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();
        save_pdf(&mut self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::create_test_pdf;
    use lopdf::content::Operation;

    #[test]
    fn test_load_rejects_non_pdf() {
        let err = load_pdf(b"hello world").unwrap_err();
        assert!(matches!(err, Failure::InvalidInput(_)));
    }

    #[test]
    fn test_page_size_reads_media_box() {
        let doc = Document::load_mem(&create_test_pdf(1, "Size")).unwrap();
        let size = page_size(&doc, page_ids(&doc)[0]);
        assert_eq!(size.width, 612.0);
        assert_eq!(size.height, 792.0);
    }

    #[test]
    fn test_page_size_inherits_from_parent() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 300.into(), 400.into()],
            }),
        );
        let size = page_size(&doc, page_id);
        assert_eq!((size.width, size.height), (300.0, 400.0));

        flatten_inherited(&mut doc, page_id).unwrap();
        assert!(doc.get_dictionary(page_id).unwrap().has(b"MediaBox"));
    }

    #[test]
    fn test_win_ansi_replaces_unmappable() {
        assert_eq!(win_ansi("abc"), b"abc".to_vec());
        assert_eq!(win_ansi("café"), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_builder_produces_loadable_document() {
        let mut builder = PdfBuilder::new();
        for _ in 0..3 {
            builder
                .add_page(
                    PageSize::A4,
                    Content {
                        operations: vec![Operation::new("q", vec![]), Operation::new("Q", vec![])],
                    },
                    Dictionary::new(),
                )
                .unwrap();
        }
        assert_eq!(builder.page_count(), 3);
        let bytes = builder.finish().unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_append_overlay_wraps_existing_content() {
        let mut doc = Document::load_mem(&create_test_pdf(1, "Overlay")).unwrap();
        let page_id = page_ids(&doc)[0];
        append_overlay(
            &mut doc,
            page_id,
            Content {
                operations: vec![Operation::new("q", vec![]), Operation::new("Q", vec![])],
            },
        )
        .unwrap();
        let contents = doc
            .get_dictionary(page_id)
            .unwrap()
            .get(b"Contents")
            .unwrap()
            .as_array()
            .unwrap()
            .len();
        // push + original + pop + overlay
        assert_eq!(contents, 4);
        let text = doc.get_page_content(page_id).unwrap();
        assert!(String::from_utf8_lossy(&text).contains("Overlay-Page-1"));
    }
}
