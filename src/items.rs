use serde::{Serialize, Deserialize};
use wasm_bindgen::prelude::*;
use kurbo::{Affine, Point, Rect};
use base64::{Engine as _, engine::general_purpose};
use crate::types::PX_PER_IN;

/// Wrap a rotation in degrees into [0, 360).
pub fn normalize_degrees(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

#[derive(Serialize, Deserialize, Clone)]
pub struct GangsheetItem {
    pub id: u32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotation: f64, // degrees, kept in [0, 360)
    pub scale_x: f64,
    pub scale_y: f64,
    pub visible: bool,
    pub locked: bool,
    #[serde(skip)]
    pub raw_image: Option<Vec<u8>>, // PNG-encoded, for data-URL previews
    #[serde(skip)]
    pub raw_rgba: Option<Vec<u8>>,
    pub raw_rgba_width: u32,
    pub raw_rgba_height: u32,
    #[serde(skip)]
    pub image: Option<JsValue>, // browser-side handle, screen drawing only
}

impl GangsheetItem {
    pub fn new(id: u32, name: String, x: f64, y: f64, width: f64, height: f64) -> GangsheetItem {
        GangsheetItem {
            id,
            name,
            x,
            y,
            width,
            height,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            visible: true,
            locked: false,
            raw_image: None,
            raw_rgba: None,
            raw_rgba_width: 0,
            raw_rgba_height: 0,
            image: None,
        }
    }

    /// Bounding box size with scale applied, display units.
    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x
    }

    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.scaled_width() / 2.0, self.y + self.scaled_height() / 2.0)
    }

    /// Rotation about the item center, display-space.
    pub fn transform(&self) -> Affine {
        let c = self.center().to_vec2();
        Affine::translate(c) * Affine::rotate(self.rotation.to_radians()) * Affine::translate(-c)
    }

    /// Axis-aligned bounds of the rotated item in sheet coordinates.
    pub fn world_bounds(&self) -> Rect {
        let w = self.scaled_width();
        let h = self.scaled_height();
        let xf = self.transform();
        let corners = [
            Point::new(self.x, self.y),
            Point::new(self.x + w, self.y),
            Point::new(self.x + w, self.y + h),
            Point::new(self.x, self.y + h),
        ];
        let mut bounds = Rect::from_points(xf * corners[0], xf * corners[1]);
        for c in &corners[2..] {
            let p = xf * *c;
            bounds = bounds.union(Rect::from_points(p, p));
        }
        bounds
    }

    /// Whether a sheet-space point falls inside the rotated bounding box.
    pub fn contains(&self, p: Point) -> bool {
        let local = self.transform().inverse() * p;
        let w = self.scaled_width();
        let h = self.scaled_height();
        local.x >= self.x && local.x <= self.x + w && local.y >= self.y && local.y <= self.y + h
    }

    /// Footprint in physical square inches. Rotation does not change it.
    pub fn printed_area_square_inches(&self) -> f64 {
        (self.scaled_width() / PX_PER_IN) * (self.scaled_height() / PX_PER_IN)
    }

    pub fn data_url(&self) -> Option<String> {
        self.raw_image.as_ref().map(|bytes| {
            format!("data:image/png;base64,{}", general_purpose::STANDARD.encode(bytes))
        })
    }
}
