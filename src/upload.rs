use wasm_bindgen::prelude::*;
use image::{DynamicImage, ImageOutputFormat, RgbaImage};
use std::io::Cursor;
use crate::engine::GangsheetEngine;
use crate::error::EngineError;
use crate::types::DEFAULT_ITEM_SIZE;

// Accepted for upload but stored server-side only; never placed on the canvas.
const DOCUMENT_EXTENSIONS: &[&str] = &["svg", "pdf", "ai", "psd", "eps"];

#[wasm_bindgen]
impl GangsheetEngine {
    /// Entry point for a single dropped/picked file. Each file in a batch
    /// goes through here independently; one bad file never blocks the rest.
    pub fn import_file(&mut self, filename: &str, data: &[u8], x: Option<f64>, y: Option<f64>) -> String {
        let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
        if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            return serde_json::json!({ "stored": true, "filename": filename }).to_string();
        }

        let (rgba, png_bytes) = match decode_upload(filename, data) {
            Ok(decoded) => decoded,
            Err(e) => {
                web_sys::console::warn_1(&JsValue::from_str(&e.to_string()));
                return e.to_json();
            }
        };

        self.save_state("Add Item");
        let (w, h) = fitted_size(rgba.width(), rgba.height());
        let x = x.unwrap_or_else(|| js_sys::Math::random() * (self.sheet.display_width() - w).max(0.0));
        let y = y.unwrap_or_else(|| js_sys::Math::random() * (self.sheet.display_height() - h).max(0.0));
        let id = self.add_decoded_item(filename, rgba, png_bytes, x, y);

        let data_url = self.get_item_data_url(id).unwrap_or_default();
        serde_json::json!({ "success": true, "id": id, "image_data_url": data_url }).to_string()
    }

    /// Attach the browser-side image handle used by the screen renderer.
    pub fn set_image_element(&mut self, id: u32, image_val: JsValue) -> bool {
        if let Some(item) = self.find_item_mut(id) {
            item.image = Some(image_val);
            true
        } else {
            false
        }
    }
}

impl GangsheetEngine {
    pub(crate) fn add_decoded_item(
        &mut self,
        filename: &str,
        rgba: RgbaImage,
        png_bytes: Vec<u8>,
        x: f64,
        y: f64,
    ) -> u32 {
        let (w, h) = fitted_size(rgba.width(), rgba.height());
        let id = self.add_item(filename.to_string(), w, h, x, y);
        if let Some(item) = self.find_item_mut(id) {
            item.raw_rgba_width = rgba.width();
            item.raw_rgba_height = rgba.height();
            item.raw_rgba = Some(rgba.into_raw());
            item.raw_image = Some(png_bytes);
        }
        id
    }
}

/// Decode uploaded bytes into an RGBA buffer plus a PNG re-encode for
/// the preview data-URL. A failed decode creates no item.
pub(crate) fn decode_upload(filename: &str, data: &[u8]) -> Result<(RgbaImage, Vec<u8>), EngineError> {
    let img = image::load_from_memory(data).map_err(|_| EngineError::Decode {
        filename: filename.to_string(),
    })?;
    let rgba = img.to_rgba8();

    let mut png_bytes: Vec<u8> = Vec::new();
    DynamicImage::ImageRgba8(rgba.clone())
        .write_to(&mut Cursor::new(&mut png_bytes), ImageOutputFormat::Png)
        .map_err(|_| EngineError::Decode { filename: filename.to_string() })?;
    Ok((rgba, png_bytes))
}

/// Fit the decoded image into the default placement box, keeping aspect.
fn fitted_size(width: u32, height: u32) -> (f64, f64) {
    let (w, h) = (width.max(1) as f64, height.max(1) as f64);
    if w >= h {
        (DEFAULT_ITEM_SIZE, DEFAULT_ITEM_SIZE * h / w)
    } else {
        (DEFAULT_ITEM_SIZE * w / h, DEFAULT_ITEM_SIZE)
    }
}
