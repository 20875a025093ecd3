use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltrb, Ltwh};

/// One detected object: its class and pixel-space left-top-width-height box
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    #[serde(rename = "c")]
    pub class: i32,
    pub bbox: BBox<Ltwh>,
}

impl Detection {
    #[inline]
    pub fn new(class: i32, bbox: BBox<Ltwh>) -> Self {
        Self { class, bbox }
    }

    #[inline]
    pub fn from_ltrb(class: i32, bbox: BBox<Ltrb>) -> Self {
        Self {
            class,
            bbox: bbox.as_ltwh(),
        }
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }

    /// A box can only be scored when it is finite and has a positive height,
    /// since the height is the scale every distance is measured against.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.bbox.is_finite() && self.bbox.height() > 0.0
    }
}
