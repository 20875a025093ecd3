use prost::Message;
use serde_derive::{Deserialize, Serialize};

use crate::bbox::{BBox, Ltwh};
use crate::error::Error;

/// Pixel-space bounding box of a scored person.
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, PartialEq, ::prost::Message)]
pub struct Rect {
    #[prost(float, tag = "1")]
    pub left: f32,
    #[prost(float, tag = "2")]
    pub top: f32,
    #[prost(float, tag = "3")]
    pub width: f32,
    #[prost(float, tag = "4")]
    pub height: f32,
}

impl From<&BBox<Ltwh>> for Rect {
    fn from(bbox: &BBox<Ltwh>) -> Self {
        Self {
            left: bbox.left(),
            top: bbox.top(),
            width: bbox.width(),
            height: bbox.height(),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, PartialEq, ::prost::Message)]
pub struct Person {
    #[prost(message, optional, tag = "1")]
    pub bbox: Option<Rect>,
    /// Accumulated proximity risk. Not capped, a crowded person goes past 1.0.
    #[prost(float, tag = "2")]
    pub danger_val: f32,
    #[prost(bool, tag = "3")]
    pub is_danger: bool,
}

#[derive(Serialize, Deserialize)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Frame {
    #[prost(int32, tag = "1")]
    pub frame_num: i32,
    /// presentation timestamp in ns, 0 when unknown
    #[prost(uint64, tag = "2")]
    pub pts: u64,
    /// decode timestamp in ns, 0 when unknown
    #[prost(uint64, tag = "3")]
    pub dts: u64,
    #[prost(float, tag = "4")]
    pub sum_danger: f32,
    #[prost(message, repeated, tag = "5")]
    #[serde(default)]
    pub people: Vec<Person>,
    #[prost(uint32, tag = "6")]
    pub source_id: u32,
}

impl Frame {
    /// Number of people flagged as dangerous.
    pub fn violating(&self) -> usize {
        self.people.iter().filter(|p| p.is_danger).count()
    }

    /// Mean danger per person, or 0 for an empty frame.
    pub fn environment_score(&self) -> f32 {
        if self.people.is_empty() {
            0.0
        } else {
            self.sum_danger / self.people.len() as f32
        }
    }
}

#[derive(Serialize, Deserialize)]
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Batch {
    #[prost(uint32, tag = "1")]
    pub max_frames: u32,
    #[prost(message, repeated, tag = "2")]
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Batch {
    /// Serialize into a standalone (not length-delimited) payload.
    pub fn to_payload(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode(&mut buf)?;

        Ok(buf)
    }

    pub fn from_payload(payload: &[u8]) -> Result<Self, Error> {
        Ok(Self::decode(payload)?)
    }
}
