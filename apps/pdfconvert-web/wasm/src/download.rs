//! Browser downloads through a temporary object URL and anchor element

use pdfconvert_core::{Blob, Failure, SaveTarget};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{BlobPropertyBag, HtmlAnchorElement, Url};

/// Save target that makes the browser download each blob
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserDownload;

impl SaveTarget for BrowserDownload {
    fn save(&self, blob: &Blob, filename: &str) -> Result<(), Failure> {
        trigger_download(&blob.bytes, &blob.mime, filename).map_err(|e| {
            Failure::ResourceUnavailable(format!("Browser download failed: {:?}", e))
        })
    }
}

fn trigger_download(bytes: &[u8], mime: &str, filename: &str) -> Result<(), JsValue> {
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document object available"))?;
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("Document has no body"))?;

    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let js_blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&js_blob)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Failed to create anchor element"))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.style().set_property("display", "none")?;

    body.append_child(&anchor)?;
    anchor.click();
    anchor.remove();

    Url::revoke_object_url(&url)
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use pdfconvert_core::DocumentFormat;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn body() -> web_sys::HtmlElement {
        web_sys::window().unwrap().document().unwrap().body().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_download_leaves_no_anchor_behind() {
        let before = body().child_element_count();
        let blob = Blob::new(b"%PDF-1.7".to_vec(), DocumentFormat::Pdf, "out.pdf");
        BrowserDownload.save(&blob, "out.pdf").unwrap();
        assert_eq!(body().child_element_count(), before);
    }
}
