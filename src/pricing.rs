use wasm_bindgen::prelude::*;
use serde::Serialize;
use crate::engine::GangsheetEngine;
use crate::types::Sheet;

/// Per-element line in the quote breakdown. Informational only; the
/// charged total is always the flat sheet price.
#[derive(Serialize, Clone, Debug)]
pub struct ElementQuote {
    pub id: u32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64,
    pub printed_area_square_inches: f64,
    pub area_price: f64,
}

pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Flat whole-sheet rate: the full material area is charged regardless of
/// how much of it the placed elements cover.
pub fn sheet_total(sheet: &Sheet) -> f64 {
    round_cents(sheet.area_square_inches() * sheet.cost_per_square_inch)
}

#[wasm_bindgen]
impl GangsheetEngine {
    pub fn total_price(&self) -> f64 {
        sheet_total(&self.sheet)
    }

    pub fn get_order_payload(&self) -> String {
        #[derive(Serialize)]
        struct OrderPayload<'a> {
            sheet: &'a Sheet,
            total_price: f64,
            elements: Vec<ElementQuote>,
        }

        let payload = OrderPayload {
            sheet: &self.sheet,
            total_price: self.total_price(),
            elements: self.element_quotes(),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| "{}".to_string())
    }
}

impl GangsheetEngine {
    pub(crate) fn element_quotes(&self) -> Vec<ElementQuote> {
        self.items
            .iter()
            .map(|item| ElementQuote {
                id: item.id,
                name: item.name.clone(),
                x: item.x,
                y: item.y,
                width: item.scaled_width(),
                height: item.scaled_height(),
                rotation: item.rotation,
                printed_area_square_inches: item.printed_area_square_inches(),
                area_price: round_cents(item.printed_area_square_inches() * self.sheet.cost_per_square_inch),
            })
            .collect()
    }
}
