use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::CanvasRenderingContext2d;
use crate::engine::GangsheetEngine;
use crate::items::GangsheetItem;

#[wasm_bindgen]
impl GangsheetEngine {
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        ctx.save();
        ctx.clear_rect(0.0, 0.0, 20000.0, 20000.0);

        ctx.translate(self.viewport_x, self.viewport_y).unwrap();
        ctx.scale(self.viewport_zoom, self.viewport_zoom).unwrap();

        let sheet_w = self.sheet.display_width();
        let sheet_h = self.sheet.display_height();

        ctx.save();
        ctx.set_fill_style_str(&self.sheet.background);
        ctx.set_shadow_color("rgba(0,0,0,0.5)");
        ctx.set_shadow_blur(20.0);
        ctx.fill_rect(0.0, 0.0, sheet_w, sheet_h);
        ctx.set_shadow_color("transparent");

        for item in &self.items {
            self.render_item(ctx, item);
        }

        if self.grid.visible {
            self.render_grid(ctx, sheet_w, sheet_h);
        }
        ctx.restore();

        if !self.hide_selection {
            self.render_selection_overlay(ctx);
        }

        ctx.restore();
    }

    fn render_item(&self, ctx: &CanvasRenderingContext2d, item: &GangsheetItem) {
        if !item.visible { return; }
        let w = item.scaled_width();
        let h = item.scaled_height();
        ctx.save();
        ctx.translate(item.x + w / 2.0, item.y + h / 2.0).unwrap();
        ctx.rotate(item.rotation.to_radians()).unwrap();
        ctx.translate(-w / 2.0, -h / 2.0).unwrap();

        if let Some(img_val) = &item.image {
            if let Some(img) = img_val.dyn_ref::<web_sys::HtmlImageElement>() {
                let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(img, 0.0, 0.0, w, h);
            } else if let Some(canvas) = img_val.dyn_ref::<web_sys::HtmlCanvasElement>() {
                let _ = ctx.draw_image_with_html_canvas_element_and_dw_and_dh(canvas, 0.0, 0.0, w, h);
            }
        } else {
            // Decode still in flight on the JS side; show a placeholder box.
            ctx.set_fill_style_str("#cccccc");
            ctx.fill_rect(0.0, 0.0, w, h);
        }
        ctx.restore();
    }

    fn render_grid(&self, ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
        let size = self.grid.size;
        if size <= 0.0 { return; }
        ctx.save();
        ctx.set_stroke_style_str("rgba(0,0,0,0.15)");
        ctx.set_line_width(1.0 / self.viewport_zoom);
        let cols = (width / size).ceil() as i32;
        let rows = (height / size).ceil() as i32;
        for c in 1..cols {
            ctx.begin_path();
            ctx.move_to(c as f64 * size, 0.0);
            ctx.line_to(c as f64 * size, height);
            ctx.stroke();
        }
        for r in 1..rows {
            ctx.begin_path();
            ctx.move_to(0.0, r as f64 * size);
            ctx.line_to(width, r as f64 * size);
            ctx.stroke();
        }
        ctx.restore();
    }

    fn render_selection_overlay(&self, ctx: &CanvasRenderingContext2d) {
        if self.selected_ids.is_empty() { return; }
        if self.selected_ids.len() == 1 {
            let id = self.selected_ids[0];
            if let Some(item) = self.find_item(id) {
                let w = item.scaled_width();
                let h = item.scaled_height();
                ctx.save();
                ctx.translate(item.x + w / 2.0, item.y + h / 2.0).unwrap();
                ctx.rotate(item.rotation.to_radians()).unwrap();
                ctx.translate(-w / 2.0, -h / 2.0).unwrap();
                ctx.set_stroke_style_str("#4facfe");
                ctx.set_line_width(1.5 / self.viewport_zoom);
                ctx.set_line_dash(&js_sys::Array::new()).unwrap();
                ctx.stroke_rect(0.0, 0.0, w, h);
                let handle_size = 8.0 / self.viewport_zoom;
                let rotate_offset = -30.0 / self.viewport_zoom;
                ctx.set_fill_style_str("#ffffff");
                ctx.set_stroke_style_str("#4facfe");
                ctx.set_line_width(1.0 / self.viewport_zoom);
                let handles = [
                    (0.0, 0.0), (w, 0.0), (0.0, h), (w, h),
                    (w / 2.0, 0.0), (w / 2.0, h),
                    (0.0, h / 2.0), (w, h / 2.0),
                ];
                for (hx, hy) in handles {
                    ctx.begin_path();
                    ctx.rect(hx - handle_size / 2.0, hy - handle_size / 2.0, handle_size, handle_size);
                    ctx.fill();
                    ctx.stroke();
                }
                ctx.begin_path();
                ctx.move_to(w / 2.0, 0.0);
                ctx.line_to(w / 2.0, rotate_offset);
                ctx.stroke();
                ctx.begin_path();
                ctx.arc(w / 2.0, rotate_offset, handle_size / 2.0, 0.0, std::f64::consts::PI * 2.0).unwrap();
                ctx.fill();
                ctx.stroke();
                ctx.restore();
            }
        } else {
            let mut g_min_x = f64::INFINITY;
            let mut g_min_y = f64::INFINITY;
            let mut g_max_x = f64::NEG_INFINITY;
            let mut g_max_y = f64::NEG_INFINITY;
            for id in &self.selected_ids {
                if let Some(item) = self.find_item(*id) {
                    let b = item.world_bounds();
                    if b.x0 < g_min_x { g_min_x = b.x0; }
                    if b.y0 < g_min_y { g_min_y = b.y0; }
                    if b.x1 > g_max_x { g_max_x = b.x1; }
                    if b.y1 > g_max_y { g_max_y = b.y1; }
                }
            }
            if g_min_x < g_max_x && g_min_y < g_max_y {
                ctx.save();
                ctx.set_stroke_style_str("#4facfe");
                ctx.set_line_width(1.5 / self.viewport_zoom);
                let dash = js_sys::Array::new();
                dash.push(&JsValue::from_f64(4.0 / self.viewport_zoom));
                dash.push(&JsValue::from_f64(4.0 / self.viewport_zoom));
                ctx.set_line_dash(&dash).unwrap();
                ctx.stroke_rect(g_min_x, g_min_y, g_max_x - g_min_x, g_max_y - g_min_y);
                ctx.restore();
            }
        }
    }
}
