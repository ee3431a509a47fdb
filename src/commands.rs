use wasm_bindgen::prelude::*;
use serde::Deserialize;
use crate::engine::GangsheetEngine;
use crate::error::EngineError;
use crate::items::{normalize_degrees, GangsheetItem};
use crate::types::{SetupType, DUPLICATE_OFFSET, MAX_HEIGHT_FT, MIN_HEIGHT_FT};

/// Partial update applied to an item in one step. Absent fields keep
/// their current value; present fields all land together.
#[derive(Deserialize, Default, Clone, Copy, Debug)]
pub struct ItemTransform {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
}

#[wasm_bindgen]
impl GangsheetEngine {
    pub fn execute_command(&mut self, cmd_json: &str) -> String {
        #[derive(Deserialize)]
        struct Command {
            action: String,
            params: serde_json::Value,
        }

        let cmd: Command = match serde_json::from_str(cmd_json) {
            Ok(c) => c,
            Err(e) => return EngineError::InvalidCommand(e.to_string()).to_json(),
        };

        match cmd.action.as_str() {
            "duplicate" => {
                self.save_state("Duplicate Item");
                let id = cmd.params["id"].as_u64().map(|v| v as u32).unwrap_or(0);
                match self.duplicate_item(id) {
                    Ok(new_id) => format!("{{\"success\": true, \"id\": {}}}", new_id),
                    Err(e) => e.to_json(),
                }
            }
            "delete" => {
                if cmd.params["save_undo"].as_bool().unwrap_or(true) { self.save_state("Delete Item"); }
                let ids: Vec<u32> = if let Some(arr) = cmd.params["ids"].as_array() {
                    arr.iter().filter_map(|v| v.as_u64().map(|id| id as u32)).collect()
                } else {
                    cmd.params["id"].as_u64().map(|v| v as u32).into_iter().collect()
                };
                // Stale ids are tolerated; a partially out-of-date selection still deletes the rest.
                let deleted = self.delete_items(&ids);
                format!("{{\"success\": true, \"deleted\": {}}}", deleted)
            }
            "transform" => {
                if cmd.params["save_undo"].as_bool().unwrap_or(false) { self.save_state("Transform Item"); }
                let id = cmd.params["id"].as_u64().map(|v| v as u32).unwrap_or(0);
                let patch: ItemTransform = match serde_json::from_value(cmd.params.clone()) {
                    Ok(p) => p,
                    Err(e) => return EngineError::InvalidCommand(e.to_string()).to_json(),
                };
                match self.transform_item(id, &patch) {
                    Ok(()) => "{ \"success\": true }".to_string(),
                    Err(e) => e.to_json(),
                }
            }
            "select" => {
                if let Some(ids) = cmd.params["ids"].as_array() {
                    self.selected_ids = ids.iter().filter_map(|v| v.as_u64().map(|id| id as u32)).collect();
                } else if let Some(id) = cmd.params["id"].as_u64() { self.selected_ids = vec![id as u32]; }
                else { self.selected_ids.clear(); }
                "{ \"success\": true }".to_string()
            }
            "set_grid" => {
                self.set_grid(cmd.params["visible"].as_bool(), cmd.params["size"].as_f64());
                "{ \"success\": true }".to_string()
            }
            "set_sheet" => {
                self.save_state("Set Sheet");
                let setup_type = match cmd.params["setup_type"].as_str() {
                    Some("FullSheet") => Some(SetupType::FullSheet),
                    Some("Elements") => Some(SetupType::Elements),
                    _ => None,
                };
                match self.set_sheet_config(
                    cmd.params["height_ft"].as_u64().map(|v| v as u32),
                    setup_type,
                    cmd.params["cost_per_square_inch"].as_f64(),
                    cmd.params["background"].as_str(),
                ) {
                    Ok(()) => "{ \"success\": true }".to_string(),
                    Err(e) => e.to_json(),
                }
            }
            "set_locked" => {
                self.save_state("Set Locked");
                let locked = cmd.params["locked"].as_bool().unwrap_or(true);
                self.apply_to_ids(&cmd.params, |item| item.locked = locked)
            }
            "set_visible" => {
                self.save_state("Set Visible");
                let visible = cmd.params["visible"].as_bool().unwrap_or(true);
                self.apply_to_ids(&cmd.params, |item| item.visible = visible)
            }
            "move_to_back" => {
                self.save_state("Move to Back");
                let id = cmd.params["id"].as_u64().map(|v| v as u32).unwrap_or(0);
                if let Some(pos) = self.items.iter().position(|i| i.id == id) {
                    let item = self.items.remove(pos); self.items.insert(0, item);
                    "{ \"success\": true }".to_string()
                } else { EngineError::NotFound(id).to_json() }
            }
            "move_to_front" => {
                self.save_state("Move to Front");
                let id = cmd.params["id"].as_u64().map(|v| v as u32).unwrap_or(0);
                if let Some(pos) = self.items.iter().position(|i| i.id == id) {
                    let item = self.items.remove(pos); self.items.push(item);
                    "{ \"success\": true }".to_string()
                } else { EngineError::NotFound(id).to_json() }
            }
            "move_forward" => {
                self.save_state("Move Forward");
                let id = cmd.params["id"].as_u64().map(|v| v as u32).unwrap_or(0);
                if let Some(pos) = self.items.iter().position(|i| i.id == id) {
                    if pos < self.items.len() - 1 { self.items.swap(pos, pos + 1); "{ \"success\": true }".to_string() }
                    else { "{ \"success\": true, \"message\": \"Already at front\" }".to_string() }
                } else { EngineError::NotFound(id).to_json() }
            }
            "move_backward" => {
                self.save_state("Move Backward");
                let id = cmd.params["id"].as_u64().map(|v| v as u32).unwrap_or(0);
                if let Some(pos) = self.items.iter().position(|i| i.id == id) {
                    if pos > 0 { self.items.swap(pos, pos - 1); "{ \"success\": true }".to_string() }
                    else { "{ \"success\": true, \"message\": \"Already at back\" }".to_string() }
                } else { EngineError::NotFound(id).to_json() }
            }
            "clear" => {
                self.save_state("Clear Sheet");
                self.clear_items();
                "{ \"success\": true }".to_string()
            }
            "price" => {
                format!("{{\"total\": {}}}", self.total_price())
            }
            "order_payload" => self.get_order_payload(),
            "get_history" => self.get_history(),
            _ => EngineError::InvalidCommand(format!("unknown action: {}", cmd.action)).to_json(),
        }
    }
}

impl GangsheetEngine {
    pub(crate) fn add_item(&mut self, name: String, width: f64, height: f64, x: f64, y: f64) -> u32 {
        let id = self.next_id;
        self.items.push(GangsheetItem::new(id, name, x, y, width, height));
        self.next_id += 1;
        id
    }

    pub(crate) fn duplicate_item(&mut self, id: u32) -> Result<u32, EngineError> {
        let pos = self.items.iter().position(|i| i.id == id).ok_or(EngineError::NotFound(id))?;
        let mut copy = self.items[pos].clone();
        copy.id = self.next_id;
        self.next_id += 1;
        copy.x += DUPLICATE_OFFSET;
        copy.y += DUPLICATE_OFFSET;
        copy.name = format!("{} copy", copy.name);
        let new_id = copy.id;
        self.items.push(copy);
        self.selected_ids = vec![new_id];
        Ok(new_id)
    }

    pub(crate) fn delete_item(&mut self, id: u32) -> bool {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != id);
        self.selected_ids.retain(|&sid| sid != id);
        self.items.len() < initial_len
    }

    pub(crate) fn delete_items(&mut self, ids: &[u32]) -> usize {
        ids.iter().filter(|&&id| self.delete_item(id)).count()
    }

    /// Locked items reject transforms outright; the sheet state is untouched
    /// on any error. Position lands on the grid when snapping is on.
    pub(crate) fn transform_item(&mut self, id: u32, patch: &ItemTransform) -> Result<(), EngineError> {
        let grid = self.grid;
        let item = self.find_item_mut(id).ok_or(EngineError::NotFound(id))?;
        if item.locked {
            return Err(EngineError::Locked(id));
        }
        if let Some(v) = patch.x { item.x = if grid.visible { (v / grid.size).round() * grid.size } else { v }; }
        if let Some(v) = patch.y { item.y = if grid.visible { (v / grid.size).round() * grid.size } else { v }; }
        if let Some(v) = patch.width { item.width = v; }
        if let Some(v) = patch.height { item.height = v; }
        if let Some(v) = patch.rotation { item.rotation = normalize_degrees(v); }
        if let Some(v) = patch.scale_x { item.scale_x = v; }
        if let Some(v) = patch.scale_y { item.scale_y = v; }
        Ok(())
    }

    pub(crate) fn set_grid(&mut self, visible: Option<bool>, size: Option<f64>) {
        if let Some(v) = visible { self.grid.visible = v; }
        if let Some(s) = size {
            if s > 0.0 { self.grid.size = s; }
        }
    }

    pub(crate) fn set_sheet_config(
        &mut self,
        height_ft: Option<u32>,
        setup_type: Option<SetupType>,
        cost_per_square_inch: Option<f64>,
        background: Option<&str>,
    ) -> Result<(), EngineError> {
        if let Some(h) = height_ft {
            if !(MIN_HEIGHT_FT..=MAX_HEIGHT_FT).contains(&h) {
                return Err(EngineError::InvalidCommand(format!(
                    "sheet height {}ft outside {}..={}ft", h, MIN_HEIGHT_FT, MAX_HEIGHT_FT
                )));
            }
            self.sheet.height_ft = h;
        }
        if let Some(st) = setup_type { self.sheet.setup_type = st; }
        if let Some(c) = cost_per_square_inch {
            if c < 0.0 {
                return Err(EngineError::InvalidCommand("negative cost per square inch".to_string()));
            }
            self.sheet.cost_per_square_inch = c;
        }
        if let Some(bg) = background { self.sheet.background = bg.to_string(); }
        Ok(())
    }

    pub(crate) fn clear_items(&mut self) {
        self.items.clear();
        self.next_id = 1;
        self.selected_ids.clear();
    }

    fn apply_to_ids(&mut self, params: &serde_json::Value, mut f: impl FnMut(&mut GangsheetItem)) -> String {
        let ids: Vec<u32> = if let Some(arr) = params["ids"].as_array() {
            arr.iter().filter_map(|v| v.as_u64().map(|id| id as u32)).collect()
        } else {
            params["id"].as_u64().map(|v| v as u32).into_iter().collect()
        };
        let mut touched = false;
        for id in ids {
            if let Some(item) = self.find_item_mut(id) {
                f(item);
                touched = true;
            }
        }
        if touched { "{ \"success\": true }".to_string() } else { "{ \"error\": \"item(s) not found\" }".to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn engine_with_item(x: f64, y: f64) -> (GangsheetEngine, u32) {
        let mut engine = GangsheetEngine::new();
        let id = engine.add_item("design.png".into(), 100.0, 100.0, x, y);
        (engine, id)
    }

    #[test]
    fn ids_stay_unique_across_adds_and_duplicates() {
        let mut engine = GangsheetEngine::new();
        let mut ids = vec![
            engine.add_item("a.png".into(), 100.0, 100.0, 0.0, 0.0),
            engine.add_item("b.png".into(), 100.0, 100.0, 0.0, 0.0),
        ];
        ids.push(engine.duplicate_item(ids[0]).unwrap());
        ids.push(engine.duplicate_item(ids[2]).unwrap());
        engine.delete_item(ids[1]);
        ids.push(engine.add_item("c.png".into(), 100.0, 100.0, 0.0, 0.0));

        let mut deduped = ids.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn duplicate_lands_offset_from_original() {
        let (mut engine, id) = engine_with_item(100.0, 150.0);
        let copy_id = engine.duplicate_item(id).unwrap();
        let copy = engine.find_item(copy_id).unwrap();
        assert_eq!((copy.x, copy.y), (120.0, 170.0));
        assert_eq!(copy.name, "design.png copy");
    }

    #[test]
    fn duplicate_is_independent_of_original() {
        let (mut engine, id) = engine_with_item(100.0, 150.0);
        let copy_id = engine.duplicate_item(id).unwrap();
        engine.transform_item(copy_id, &ItemTransform {
            x: Some(300.0), rotation: Some(45.0), scale_x: Some(2.0), ..Default::default()
        }).unwrap();

        let original = engine.find_item(id).unwrap();
        assert_eq!(original.x, 100.0);
        assert_eq!(original.rotation, 0.0);
        assert_eq!(original.scale_x, 1.0);
    }

    #[test]
    fn duplicate_of_missing_item_is_not_found() {
        let mut engine = GangsheetEngine::new();
        assert!(matches!(engine.duplicate_item(99), Err(EngineError::NotFound(99))));
    }

    #[test]
    fn delete_tolerates_stale_and_unknown_ids() {
        let (mut engine, id) = engine_with_item(0.0, 0.0);
        assert!(engine.delete_item(id));
        assert!(!engine.delete_item(id));
        assert!(!engine.delete_item(12345));
        assert_eq!(engine.item_count(), 0);

        // Multi-delete with a partially stale selection removes what remains.
        let a = engine.add_item("a.png".into(), 100.0, 100.0, 0.0, 0.0);
        let b = engine.add_item("b.png".into(), 100.0, 100.0, 0.0, 0.0);
        assert_eq!(engine.delete_items(&[a, 999, b, a]), 2);
        assert_eq!(engine.item_count(), 0);
    }

    #[test]
    fn snap_rounds_each_axis_to_nearest_grid_multiple() {
        let (mut engine, id) = engine_with_item(0.0, 0.0);
        engine.set_grid(Some(true), Some(20.0));
        engine.transform_item(id, &ItemTransform { x: Some(113.0), y: Some(247.0), ..Default::default() }).unwrap();
        let item = engine.find_item(id).unwrap();
        assert_eq!((item.x, item.y), (120.0, 240.0));
    }

    #[test]
    fn snap_is_idempotent() {
        let (mut engine, id) = engine_with_item(0.0, 0.0);
        engine.set_grid(Some(true), Some(20.0));
        let patch = ItemTransform { x: Some(113.0), y: Some(247.0), ..Default::default() };
        engine.transform_item(id, &patch).unwrap();
        let first = { let i = engine.find_item(id).unwrap(); (i.x, i.y) };
        // Re-applying the already-snapped position must not move the item.
        engine.transform_item(id, &ItemTransform { x: Some(first.0), y: Some(first.1), ..Default::default() }).unwrap();
        let second = { let i = engine.find_item(id).unwrap(); (i.x, i.y) };
        assert_eq!(first, second);
    }

    #[test]
    fn rotation_stays_normalized_under_deltas() {
        let (mut engine, id) = engine_with_item(0.0, 0.0);
        for delta in [350.0, 30.0, -120.0, 720.5, -0.25] {
            let current = engine.find_item(id).unwrap().rotation;
            engine.transform_item(id, &ItemTransform { rotation: Some(current + delta), ..Default::default() }).unwrap();
            let stored = engine.find_item(id).unwrap().rotation;
            assert!((0.0..360.0).contains(&stored), "rotation {} out of range", stored);
        }
    }

    #[test]
    fn locked_item_rejects_transform_but_allows_delete() {
        let (mut engine, id) = engine_with_item(0.0, 0.0);
        engine.find_item_mut(id).unwrap().locked = true;
        let err = engine.transform_item(id, &ItemTransform { x: Some(50.0), ..Default::default() });
        assert!(matches!(err, Err(EngineError::Locked(_))));
        assert_eq!(engine.find_item(id).unwrap().x, 0.0);

        // Lock guards accidental transforms, not explicit removal.
        assert!(engine.delete_item(id));
    }

    #[test]
    fn transform_applies_all_requested_fields_together() {
        let (mut engine, id) = engine_with_item(10.0, 10.0);
        engine.transform_item(id, &ItemTransform {
            x: Some(40.0), y: Some(60.0), width: Some(80.0), height: Some(90.0),
            rotation: Some(370.0), scale_x: Some(1.5), scale_y: Some(0.5),
        }).unwrap();
        let item = engine.find_item(id).unwrap();
        assert_eq!((item.x, item.y, item.width, item.height), (40.0, 60.0, 80.0, 90.0));
        assert_eq!(item.rotation, 10.0);
        assert_eq!((item.scale_x, item.scale_y), (1.5, 0.5));
    }

    #[test]
    fn sheet_height_outside_range_is_rejected() {
        let mut engine = GangsheetEngine::new();
        assert!(engine.set_sheet_config(Some(0), None, None, None).is_err());
        assert!(engine.set_sheet_config(Some(329), None, None, None).is_err());
        assert!(engine.set_sheet_config(Some(328), None, None, None).is_ok());
        assert_eq!(engine.sheet.height_ft, 328);
    }

    #[test]
    fn command_boundary_reports_errors_as_json() {
        let mut engine = GangsheetEngine::new();
        let resp = engine.execute_command(r#"{"action": "duplicate", "params": {"id": 7}}"#);
        assert_eq!(resp, r#"{"error":"item 7 not found"}"#);

        let resp = engine.execute_command("not json");
        assert!(resp.contains("invalid command"));

        // Deleting an id never issued is a success, not an error.
        let resp = engine.execute_command(r#"{"action": "delete", "params": {"id": 42}}"#);
        assert_eq!(resp, "{\"success\": true, \"deleted\": 0}");
    }

    #[test]
    fn restack_commands_reorder_items() {
        let mut engine = GangsheetEngine::new();
        let a = engine.add_item("a.png".into(), 100.0, 100.0, 0.0, 0.0);
        let b = engine.add_item("b.png".into(), 100.0, 100.0, 0.0, 0.0);
        let c = engine.add_item("c.png".into(), 100.0, 100.0, 0.0, 0.0);

        engine.execute_command(&format!(r#"{{"action": "move_to_front", "params": {{"id": {}}}}}"#, a));
        let order: Vec<u32> = engine.items.iter().map(|i| i.id).collect();
        assert_eq!(order, vec![b, c, a]);

        engine.execute_command(&format!(r#"{{"action": "move_backward", "params": {{"id": {}}}}}"#, c));
        let order: Vec<u32> = engine.items.iter().map(|i| i.id).collect();
        assert_eq!(order, vec![c, b, a]);
    }

    #[test]
    fn clear_resets_session() {
        let (mut engine, id) = engine_with_item(0.0, 0.0);
        engine.selected_ids = vec![id];
        engine.clear_items();
        assert_eq!(engine.item_count(), 0);
        assert!(engine.selected_ids.is_empty());
        assert_eq!(engine.next_id, 1);
    }
}
