//! HTML page capture with an off-screen iframe and html2canvas

use base64::Engine;
use pdfconvert_core::{Failure, PageCapture};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlCanvasElement, HtmlElement, HtmlIFrameElement};

#[wasm_bindgen]
extern "C" {
    /// Global from the html2canvas script; resolves to a canvas element
    #[wasm_bindgen(js_name = html2canvas, catch)]
    fn html2canvas(element: &HtmlElement) -> Result<js_sys::Promise, JsValue>;
}

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Viewport of the off-screen iframe, in CSS pixels
#[derive(Debug, Clone, Copy)]
pub struct IframeCapture {
    pub width: u32,
    pub height: u32,
}

impl Default for IframeCapture {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

/// Removes the iframe from the DOM when dropped, whichever way capture ends
struct Surface(HtmlIFrameElement);

impl Drop for Surface {
    fn drop(&mut self) {
        self.0.remove();
    }
}

fn unavailable(context: &str, err: JsValue) -> Failure {
    Failure::ResourceUnavailable(format!("{}: {:?}", context, err))
}

impl IframeCapture {
    fn mount(&self, url: &str) -> Result<Surface, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("No document object available"))?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("Document has no body"))?;

        let iframe: HtmlIFrameElement = document
            .create_element("iframe")?
            .dyn_into()
            .map_err(|_| JsValue::from_str("Failed to create iframe"))?;
        let style = iframe.style();
        style.set_property("position", "absolute")?;
        style.set_property("left", "-10000px")?;
        style.set_property("top", "0")?;
        style.set_property("width", &format!("{}px", self.width))?;
        style.set_property("height", &format!("{}px", self.height))?;

        let surface = Surface(iframe);
        body.append_child(&surface.0)?;
        surface.0.set_src(url);
        Ok(surface)
    }

    async fn snapshot(&self, url: &str) -> Result<Vec<u8>, Failure> {
        let surface = self
            .mount(url)
            .map_err(|e| unavailable("Cannot create capture frame", e))?;

        let loaded = js_sys::Promise::new(&mut |resolve, reject| {
            surface.0.set_onload(Some(&resolve));
            surface.0.set_onerror(Some(&reject));
        });
        JsFuture::from(loaded)
            .await
            .map_err(|e| unavailable(&format!("Failed to load {}", url), e))?;

        let body = surface
            .0
            .content_document()
            .and_then(|doc| doc.body())
            .ok_or_else(|| {
                Failure::ResourceUnavailable(format!(
                    "Cannot read {} (cross-origin pages cannot be captured)",
                    url
                ))
            })?;

        let promise = html2canvas(&body).map_err(|e| unavailable("html2canvas is not available", e))?;
        let canvas: HtmlCanvasElement = JsFuture::from(promise)
            .await
            .map_err(|e| unavailable("Page capture failed", e))?
            .dyn_into()
            .map_err(|_| Failure::Internal("html2canvas did not return a canvas".into()))?;

        let data_url = canvas
            .to_data_url_with_type("image/png")
            .map_err(|e| unavailable("Cannot read canvas", e))?;
        decode_png_data_url(&data_url)
    }
}

impl PageCapture for IframeCapture {
    async fn capture(&self, url: &str) -> Result<Vec<u8>, Failure> {
        self.snapshot(url).await
    }
}

pub(crate) fn decode_png_data_url(data_url: &str) -> Result<Vec<u8>, Failure> {
    let encoded = data_url.strip_prefix(PNG_DATA_URL_PREFIX).ok_or_else(|| {
        Failure::Internal("Canvas snapshot is not a PNG data URL".into())
    })?;
    base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| Failure::Internal(format!("Corrupt canvas snapshot: {}", e)))
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn body() -> HtmlElement {
        web_sys::window().unwrap().document().unwrap().body().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_surface_is_mounted_off_screen() {
        let capture = IframeCapture::default();
        let surface = capture.mount("about:blank").unwrap();
        let style = surface.0.style();
        assert_eq!(style.get_property_value("left").unwrap(), "-10000px");
        assert_eq!(style.get_property_value("width").unwrap(), "1024px");
        assert!(surface.0.parent_node().is_some());
    }

    #[wasm_bindgen_test]
    fn test_dropping_surface_removes_iframe() {
        let before = body().child_element_count();
        let surface = IframeCapture::default().mount("about:blank").unwrap();
        assert_eq!(body().child_element_count(), before + 1);
        drop(surface);
        assert_eq!(body().child_element_count(), before);
    }
}
