use wasm_bindgen::prelude::*;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use kurbo::Point;
use std::io::Cursor;
use crate::engine::GangsheetEngine;
use crate::error::EngineError;
use crate::types::EXPORT_SCALE;

#[wasm_bindgen]
impl GangsheetEngine {
    /// Print-ready PNG of the sheet: items composited in layer order at the
    /// export multiplier, grid and selection excluded, background transparent.
    pub fn export_png(&self) -> Result<Vec<u8>, JsValue> {
        Ok(self.render_print_file()?)
    }
}

impl GangsheetEngine {
    /// Best-effort composition: hidden items and items whose raster never
    /// arrived are skipped. Encoding failure aborts with no partial output.
    pub(crate) fn render_print_file(&self) -> Result<Vec<u8>, EngineError> {
        let canvas = self.compose_export()?;
        let mut png_bytes: Vec<u8> = Vec::new();
        DynamicImage::ImageRgba8(canvas)
            .write_to(&mut Cursor::new(&mut png_bytes), ImageOutputFormat::Png)
            .map_err(|e| EngineError::Export(e.to_string()))?;
        Ok(png_bytes)
    }

    pub(crate) fn compose_export(&self) -> Result<RgbaImage, EngineError> {
        let out_w = (self.sheet.display_width() * EXPORT_SCALE).round() as u32;
        let out_h = (self.sheet.display_height() * EXPORT_SCALE).round() as u32;
        if out_w == 0 || out_h == 0 {
            return Err(EngineError::Export("sheet has no printable area".to_string()));
        }

        let mut canvas = RgbaImage::new(out_w, out_h);
        for item in &self.items {
            if !item.visible {
                continue;
            }
            let Some(rgba) = &item.raw_rgba else { continue };
            let (src_w, src_h) = (item.raw_rgba_width, item.raw_rgba_height);
            if src_w == 0 || src_h == 0 {
                continue;
            }

            let inv = item.transform().inverse();
            let dest = item.world_bounds();
            let px0 = ((dest.x0 * EXPORT_SCALE).floor().max(0.0)) as u32;
            let py0 = ((dest.y0 * EXPORT_SCALE).floor().max(0.0)) as u32;
            let px1 = ((dest.x1 * EXPORT_SCALE).ceil()).min(out_w as f64) as u32;
            let py1 = ((dest.y1 * EXPORT_SCALE).ceil()).min(out_h as f64) as u32;

            let w = item.scaled_width();
            let h = item.scaled_height();
            for py in py0..py1 {
                for px in px0..px1 {
                    // Map the output pixel center back into the unrotated item box.
                    let display = Point::new(
                        (px as f64 + 0.5) / EXPORT_SCALE,
                        (py as f64 + 0.5) / EXPORT_SCALE,
                    );
                    let local = inv * display;
                    let u = (local.x - item.x) / w;
                    let v = (local.y - item.y) / h;
                    if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                        continue;
                    }
                    let sx = ((u * src_w as f64) as u32).min(src_w - 1);
                    let sy = ((v * src_h as f64) as u32).min(src_h - 1);
                    let idx = ((sy * src_w + sx) as usize) * 4;
                    let src = Rgba([rgba[idx], rgba[idx + 1], rgba[idx + 2], rgba[idx + 3]]);
                    blend_over(canvas.get_pixel_mut(px, py), src);
                }
            }
        }
        Ok(canvas)
    }
}

fn blend_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    let sa = src[3] as f64 / 255.0;
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f64 / 255.0;
    let oa = sa + da * (1.0 - sa);
    for c in 0..3 {
        let blended = (src[c] as f64 * sa + dst[c] as f64 * da * (1.0 - sa)) / oa;
        dst[c] = blended.round() as u8;
    }
    dst[3] = (oa * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    fn attach_raster(engine: &mut GangsheetEngine, id: u32, rgba: RgbaImage) {
        let item = engine.find_item_mut(id).unwrap();
        item.raw_rgba_width = rgba.width();
        item.raw_rgba_height = rgba.height();
        item.raw_rgba = Some(rgba.into_raw());
    }

    #[test]
    fn export_matches_sheet_size_at_output_multiplier() {
        let engine = GangsheetEngine::new();
        let canvas = engine.compose_export().unwrap();
        // 22in x 1ft at 10 display units/in, 2x export
        assert_eq!((canvas.width(), canvas.height()), (440, 240));
    }

    #[test]
    fn items_land_where_placed_and_background_stays_transparent() {
        let mut engine = GangsheetEngine::new();
        let id = engine.add_item("red.png".into(), 10.0, 10.0, 0.0, 0.0);
        attach_raster(&mut engine, id, solid(4, 4, [255, 0, 0, 255]));

        let canvas = engine.compose_export().unwrap();
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([255, 0, 0, 255]));
        assert_eq!(canvas.get_pixel(100, 100), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn later_items_composite_on_top() {
        let mut engine = GangsheetEngine::new();
        let below = engine.add_item("red.png".into(), 10.0, 10.0, 0.0, 0.0);
        attach_raster(&mut engine, below, solid(4, 4, [255, 0, 0, 255]));
        let above = engine.add_item("blue.png".into(), 10.0, 10.0, 0.0, 0.0);
        attach_raster(&mut engine, above, solid(4, 4, [0, 0, 255, 255]));

        let canvas = engine.compose_export().unwrap();
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn hidden_and_rasterless_items_are_skipped() {
        let mut engine = GangsheetEngine::new();
        let hidden = engine.add_item("hidden.png".into(), 10.0, 10.0, 0.0, 0.0);
        attach_raster(&mut engine, hidden, solid(4, 4, [255, 0, 0, 255]));
        engine.find_item_mut(hidden).unwrap().visible = false;
        // Never decoded; skipped rather than failing the export.
        engine.add_item("pending.png".into(), 10.0, 10.0, 0.0, 0.0);

        let canvas = engine.compose_export().unwrap();
        assert_eq!(canvas.get_pixel(5, 5), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn half_turn_flips_the_source_left_to_right() {
        let mut engine = GangsheetEngine::new();
        let mut src = solid(2, 1, [255, 0, 0, 255]);
        src.put_pixel(1, 0, Rgba([0, 0, 255, 255]));
        let id = engine.add_item("two.png".into(), 10.0, 10.0, 0.0, 0.0);
        attach_raster(&mut engine, id, src);

        let canvas = engine.compose_export().unwrap();
        assert_eq!(canvas.get_pixel(2, 10), &Rgba([255, 0, 0, 255]));

        engine.find_item_mut(id).unwrap().rotation = 180.0;
        let canvas = engine.compose_export().unwrap();
        assert_eq!(canvas.get_pixel(2, 10), &Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn exported_bytes_are_png() {
        let mut engine = GangsheetEngine::new();
        let id = engine.add_item("red.png".into(), 10.0, 10.0, 0.0, 0.0);
        attach_raster(&mut engine, id, solid(4, 4, [255, 0, 0, 255]));

        let bytes = engine.render_print_file().unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }
}
