use serde_derive::{Deserialize, Serialize};

use crate::detection::Detection;

/// One video frame as delivered by the frame source.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Frame {
    pub frame_num: i32,
    /// presentation timestamp, in nanoseconds
    pub pts: Option<u64>,
    /// decode timestamp, in nanoseconds
    pub dts: Option<u64>,
    pub source_id: u32,
    pub detections: Vec<Detection>,
}

impl Frame {
    #[inline]
    pub fn new(frame_num: i32, source_id: u32, detections: Vec<Detection>) -> Self {
        Self {
            frame_num,
            pts: None,
            dts: None,
            source_id,
            detections,
        }
    }

    #[inline]
    pub fn with_timestamps(mut self, pts: Option<u64>, dts: Option<u64>) -> Self {
        self.pts = pts;
        self.dts = dts;
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.detections.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
