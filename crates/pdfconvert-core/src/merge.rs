//! PDF Merge algorithm
//!
//! Combines multiple PDFs into a single document.

use crate::document::{flatten_inherited, load_pdf, page_ids, save_pdf};
use crate::error::Failure;
use lopdf::{Document, Object, ObjectId};

/// Merge multiple PDFs into one
///
/// The algorithm:
/// 1. If empty, return error
/// 2. If single document, return it as-is
/// 3. Use the first document as the destination
/// 4. For each remaining source document:
///    a. Calculate ID offset to avoid conflicts
///    b. Import all objects with remapped IDs
///    c. Append pages to the destination
/// 5. Re-parent every page under the destination page tree
/// 6. Drop orphaned objects, compress and return the merged result
pub(crate) fn merge_documents(documents: &[&[u8]]) -> Result<Vec<u8>, Failure> {
    let (first, rest) = documents
        .split_first()
        .ok_or_else(|| Failure::InvalidInput("No documents to merge".into()))?;

    let mut dest = load_pdf(first)
        .map_err(|e| Failure::InvalidInput(format!("Failed to load document 0: {}", e)))?;

    if rest.is_empty() {
        return Ok(first.to_vec());
    }

    let mut dest_page_refs = collect_pages(&mut dest)?;
    let mut dest_max_id = dest.max_id;

    for (i, bytes) in rest.iter().enumerate() {
        let mut source = load_pdf(bytes).map_err(|e| {
            Failure::InvalidInput(format!("Failed to load document {}: {}", i + 1, e))
        })?;

        // Get source pages before we start moving objects out
        let source_pages = collect_pages(&mut source)?;

        let id_offset = dest_max_id;

        for (old_id, object) in source.objects.into_iter() {
            let new_id = (old_id.0 + id_offset, old_id.1);
            dest.objects.insert(new_id, remap_object_refs(object, id_offset));
        }

        for old_page_ref in source_pages {
            dest_page_refs.push((old_page_ref.0 + id_offset, old_page_ref.1));
        }

        dest_max_id = (source.max_id + id_offset).max(dest_max_id);
    }

    dest.max_id = dest_max_id;
    update_page_tree(&mut dest, &dest_page_refs)?;

    dest.prune_objects();
    dest.compress();

    tracing::debug!(
        documents = documents.len(),
        pages = dest_page_refs.len(),
        "merged documents"
    );
    save_pdf(&mut dest)
}

/// Page references in page order, with inherited attributes copied onto each page
fn collect_pages(doc: &mut Document) -> Result<Vec<ObjectId>, Failure> {
    let pages = page_ids(doc);
    for &page_id in &pages {
        flatten_inherited(doc, page_id)?;
    }
    Ok(pages)
}

/// Recursively remap object references in an object
fn remap_object_refs(obj: Object, offset: u32) -> Object {
    match obj {
        Object::Reference(id) => Object::Reference((id.0 + offset, id.1)),
        Object::Array(arr) => Object::Array(
            arr.into_iter()
                .map(|o| remap_object_refs(o, offset))
                .collect(),
        ),
        Object::Dictionary(mut dict) => {
            for (_, value) in dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Dictionary(dict)
        }
        Object::Stream(mut stream) => {
            for (_, value) in stream.dict.iter_mut() {
                *value = remap_object_refs(std::mem::replace(value, Object::Null), offset);
            }
            Object::Stream(stream)
        }
        other => other,
    }
}

/// Point the destination's root page tree at exactly `page_refs`, in order
fn update_page_tree(doc: &mut Document, page_refs: &[ObjectId]) -> Result<(), Failure> {
    let catalog_id = doc
        .trailer
        .get(b"Root")
        .and_then(Object::as_reference)
        .map_err(|_| Failure::InvalidInput("No Root in trailer".into()))?;

    let pages_id = doc
        .get_dictionary(catalog_id)
        .and_then(|catalog| catalog.get(b"Pages"))
        .and_then(Object::as_reference)
        .map_err(|_| Failure::InvalidInput("No Pages in catalog".into()))?;

    for &page_id in page_refs {
        let page = doc
            .get_dictionary_mut(page_id)
            .map_err(|e| Failure::InvalidInput(format!("Page is not a dictionary: {}", e)))?;
        page.set("Parent", Object::Reference(pages_id));
    }

    let pages_dict = doc
        .get_dictionary_mut(pages_id)
        .map_err(|_| Failure::InvalidInput("Invalid pages dictionary".into()))?;
    let kids = page_refs
        .iter()
        .map(|&id| Object::Reference(id))
        .collect::<Vec<_>>();
    pages_dict.set("Kids", Object::Array(kids));
    pages_dict.set("Count", Object::Integer(page_refs.len() as i64));

    Ok(())
}
