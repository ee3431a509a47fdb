use wasm_bindgen::prelude::*;
use crate::types::{Grid, Sheet};
use crate::items::GangsheetItem;

#[derive(Clone)]
pub struct EngineState {
    pub items: Vec<GangsheetItem>,
    pub next_id: u32,
    pub selected_ids: Vec<u32>,
    pub sheet: Sheet,
    pub grid: Grid,
    pub action_name: String,
}

#[wasm_bindgen]
pub struct GangsheetEngine {
    pub(crate) items: Vec<GangsheetItem>,
    pub(crate) next_id: u32,
    pub(crate) selected_ids: Vec<u32>,
    pub(crate) sheet: Sheet,
    pub(crate) grid: Grid,
    pub viewport_x: f64,
    pub viewport_y: f64,
    pub viewport_zoom: f64,
    pub hide_selection: bool,
    pub(crate) undo_stack: Vec<EngineState>,
    pub(crate) redo_stack: Vec<EngineState>,
}

#[wasm_bindgen]
impl GangsheetEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GangsheetEngine {
        console_error_panic_hook::set_once();

        GangsheetEngine {
            items: Vec::new(),
            next_id: 1,
            selected_ids: Vec::new(),
            sheet: Sheet::default(),
            grid: Grid::default(),
            viewport_x: 0.0,
            viewport_y: 0.0,
            viewport_zoom: 1.0,
            hide_selection: false,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub(crate) fn save_state(&mut self, action_name: &str) {
        let state = EngineState {
            items: self.items.clone(),
            next_id: self.next_id,
            selected_ids: self.selected_ids.clone(),
            sheet: self.sheet.clone(),
            grid: self.grid,
            action_name: action_name.to_string(),
        };
        self.undo_stack.push(state);
        if self.undo_stack.len() > 100 {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) -> bool {
        if let Some(prev_state) = self.undo_stack.pop() {
            let current_state = EngineState {
                items: self.items.clone(),
                next_id: self.next_id,
                selected_ids: self.selected_ids.clone(),
                sheet: self.sheet.clone(),
                grid: self.grid,
                action_name: "Redo State".to_string(),
            };
            self.redo_stack.push(current_state);

            self.items = prev_state.items;
            self.next_id = prev_state.next_id;
            self.selected_ids = prev_state.selected_ids;
            self.sheet = prev_state.sheet;
            self.grid = prev_state.grid;
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if let Some(next_state) = self.redo_stack.pop() {
            let current_state = EngineState {
                items: self.items.clone(),
                next_id: self.next_id,
                selected_ids: self.selected_ids.clone(),
                sheet: self.sheet.clone(),
                grid: self.grid,
                action_name: "Undo State".to_string(),
            };
            self.undo_stack.push(current_state);

            self.items = next_state.items;
            self.next_id = next_state.next_id;
            self.selected_ids = next_state.selected_ids;
            self.sheet = next_state.sheet;
            self.grid = next_state.grid;
            true
        } else {
            false
        }
    }

    pub fn set_viewport(&mut self, x: f64, y: f64, zoom: f64) {
        self.viewport_x = x;
        self.viewport_y = y;
        self.viewport_zoom = zoom;
    }

    pub fn get_history(&self) -> String {
        let history: Vec<String> = self.undo_stack.iter().map(|s| s.action_name.clone()).collect();
        serde_json::to_string(&history).unwrap_or("[]".to_string())
    }

    pub fn get_sheet(&self) -> String {
        serde_json::to_string(&self.sheet).unwrap_or("{}".to_string())
    }

    pub fn get_grid(&self) -> String {
        serde_json::to_string(&self.grid).unwrap_or("{}".to_string())
    }

    pub fn get_items_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn get_items(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.items).unwrap_or(JsValue::NULL)
    }

    pub fn get_selected_ids(&self) -> String {
        serde_json::to_string(&self.selected_ids).unwrap_or("[]".to_string())
    }

    pub fn item_count(&self) -> u32 {
        self.items.len() as u32
    }

    pub fn get_item_data_url(&self, id: u32) -> Option<String> {
        self.items.iter().find(|i| i.id == id).and_then(|i| i.data_url())
    }
}

impl GangsheetEngine {
    pub(crate) fn find_item(&self, id: u32) -> Option<&GangsheetItem> {
        self.items.iter().find(|i| i.id == id)
    }

    pub(crate) fn find_item_mut(&mut self, id: u32) -> Option<&mut GangsheetItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }
}

impl Default for GangsheetEngine {
    fn default() -> Self {
        GangsheetEngine::new()
    }
}
