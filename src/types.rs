use serde::{Serialize, Deserialize};
use wasm_bindgen::prelude::*;

/// Fixed physical width of the gangsheet material, in inches.
pub const SHEET_WIDTH_IN: f64 = 22.0;

/// Display units per physical inch. Item coordinates are display units.
pub const PX_PER_IN: f64 = 10.0;

pub const MIN_HEIGHT_FT: u32 = 1;
pub const MAX_HEIGHT_FT: u32 = 328;

pub const DEFAULT_COST_PER_SQUARE_INCH: f64 = 0.5;

/// New items are fitted into a box of this many display units.
pub const DEFAULT_ITEM_SIZE: f64 = 100.0;

/// Offset applied to a duplicated item on both axes, display units.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Output multiplier for print export relative to display resolution.
pub const EXPORT_SCALE: f64 = 2.0;

#[wasm_bindgen]
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub enum SetupType {
    FullSheet,
    Elements,
}

#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Debug)]
pub enum HandleType {
    TopLeft, TopRight, BottomLeft, BottomRight,
    Top, Bottom, Left, Right,
    Rotate,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct Grid {
    pub visible: bool,
    pub size: f64,
}

impl Default for Grid {
    fn default() -> Self {
        Grid { visible: false, size: 20.0 }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Sheet {
    pub width_in: f64,
    pub height_ft: u32,
    pub cost_per_square_inch: f64,
    pub setup_type: SetupType,
    pub background: String,
}

impl Default for Sheet {
    fn default() -> Self {
        Sheet {
            width_in: SHEET_WIDTH_IN,
            height_ft: MIN_HEIGHT_FT,
            cost_per_square_inch: DEFAULT_COST_PER_SQUARE_INCH,
            setup_type: SetupType::Elements,
            background: "#ffffff".to_string(),
        }
    }
}

impl Sheet {
    pub fn height_in(&self) -> f64 {
        self.height_ft as f64 * 12.0
    }

    pub fn area_square_inches(&self) -> f64 {
        self.width_in * self.height_in()
    }

    /// Sheet size in display units.
    pub fn display_width(&self) -> f64 {
        self.width_in * PX_PER_IN
    }

    pub fn display_height(&self) -> f64 {
        self.height_in() * PX_PER_IN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sheet_height_converts_feet_to_inches() {
        let sheet = Sheet { height_ft: 2, ..Sheet::default() };
        assert_eq!(sheet.height_in(), 24.0);
        assert_eq!(sheet.area_square_inches(), 22.0 * 24.0);
    }

    #[test]
    fn display_size_tracks_physical_size() {
        let sheet = Sheet { height_ft: 3, ..Sheet::default() };
        assert_eq!(sheet.display_width(), 220.0);
        assert_eq!(sheet.display_height(), 360.0);
    }
}
