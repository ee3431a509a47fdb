use wasm_bindgen::prelude::*;
use kurbo::Point;
use crate::engine::GangsheetEngine;
use crate::types::HandleType;

#[wasm_bindgen]
impl GangsheetEngine {
    pub fn select_point(&mut self, tx: f64, ty: f64, shift: bool, ignore_locked: bool) -> String {
        let p = Point::new(tx, ty);
        let mut hit_id = None;
        // Top-most first: later list positions draw above earlier ones.
        for item in self.items.iter().rev() {
            if item.locked && !ignore_locked { continue; }
            if !item.visible { continue; }
            if item.contains(p) {
                hit_id = Some(item.id);
                break;
            }
        }

        if !shift {
            self.selected_ids.clear();
        }

        if let Some(id) = hit_id {
            if shift {
                if let Some(pos) = self.selected_ids.iter().position(|&x| x == id) {
                    self.selected_ids.remove(pos);
                } else {
                    self.selected_ids.push(id);
                }
            } else {
                self.selected_ids.push(id);
            }
        }

        self.get_selected_ids()
    }

    pub fn select_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, shift: bool, ignore_locked: bool) -> String {
        let mut sx = x1;
        let mut sy = y1;
        let mut ex = x2;
        let mut ey = y2;
        if sx > ex { std::mem::swap(&mut sx, &mut ex); }
        if sy > ey { std::mem::swap(&mut sy, &mut ey); }

        if !shift {
            self.selected_ids.clear();
        }
        for item in &self.items {
            if item.locked && !ignore_locked { continue; }
            if !item.visible { continue; }
            let b = item.world_bounds();
            if b.x0 < ex && b.x1 > sx && b.y0 < ey && b.y1 > sy {
                if !self.selected_ids.contains(&item.id) {
                    self.selected_ids.push(item.id);
                }
            }
        }
        self.get_selected_ids()
    }

    pub fn hit_test_handles(&self, tx: f64, ty: f64) -> String {
        if let Some(&id) = self.selected_ids.last() {
            if let Some(item) = self.find_item(id) {
                let local = item.transform().inverse() * Point::new(tx, ty);
                let local_x = local.x - item.x;
                let local_y = local.y - item.y;
                let w = item.scaled_width();
                let h = item.scaled_height();
                let handle_radius = 6.0 / self.viewport_zoom;
                let rotate_offset = -30.0 / self.viewport_zoom;
                let handles = [
                    (0.0, 0.0, HandleType::TopLeft), (w, 0.0, HandleType::TopRight),
                    (0.0, h, HandleType::BottomLeft), (w, h, HandleType::BottomRight),
                    (w / 2.0, 0.0, HandleType::Top), (w / 2.0, h, HandleType::Bottom),
                    (0.0, h / 2.0, HandleType::Left), (w, h / 2.0, HandleType::Right),
                    (w / 2.0, rotate_offset, HandleType::Rotate),
                ];
                for (hx, hy, h_type) in handles.iter() {
                    let dist = ((local_x - hx).powi(2) + (local_y - hy).powi(2)).sqrt();
                    if dist <= handle_radius {
                        return serde_json::to_string(&(id, *h_type)).unwrap_or("null".to_string());
                    }
                }
            }
        }
        "null".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine_with_stack() -> (GangsheetEngine, u32, u32) {
        let mut engine = GangsheetEngine::new();
        let below = engine.add_item("below.png".into(), 100.0, 100.0, 0.0, 0.0);
        let above = engine.add_item("above.png".into(), 100.0, 100.0, 50.0, 50.0);
        (engine, below, above)
    }

    #[test]
    fn point_select_picks_the_top_most_item() {
        let (mut engine, _, above) = engine_with_stack();
        engine.select_point(75.0, 75.0, false, false);
        assert_eq!(engine.selected_ids, vec![above]);
    }

    #[test]
    fn locked_items_are_skipped_unless_overridden() {
        let (mut engine, below, above) = engine_with_stack();
        engine.find_item_mut(above).unwrap().locked = true;

        engine.select_point(75.0, 75.0, false, false);
        assert_eq!(engine.selected_ids, vec![below]);

        engine.select_point(75.0, 75.0, false, true);
        assert_eq!(engine.selected_ids, vec![above]);
    }

    #[test]
    fn shift_click_toggles_membership() {
        let (mut engine, below, _) = engine_with_stack();
        engine.select_point(10.0, 10.0, false, false);
        assert_eq!(engine.selected_ids, vec![below]);
        engine.select_point(10.0, 10.0, true, false);
        assert!(engine.selected_ids.is_empty());
    }

    #[test]
    fn rect_select_collects_intersecting_items() {
        let (mut engine, below, above) = engine_with_stack();
        engine.select_rect(140.0, 140.0, 0.0, 0.0, false, false);
        assert_eq!(engine.selected_ids, vec![below, above]);

        engine.select_rect(120.0, 120.0, 160.0, 160.0, false, false);
        assert_eq!(engine.selected_ids, vec![above]);
    }

    #[test]
    fn empty_click_clears_the_selection() {
        let (mut engine, below, _) = engine_with_stack();
        engine.select_point(10.0, 10.0, false, false);
        assert_eq!(engine.selected_ids, vec![below]);
        engine.select_point(500.0, 500.0, false, false);
        assert!(engine.selected_ids.is_empty());
    }
}
