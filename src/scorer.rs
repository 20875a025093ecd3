use nalgebra as na;
use std::ptr;

use crate::bbox::{BBox, Ltwh};
use crate::config::ScorerConfig;
use crate::detection::Detection;
use crate::frame::Frame;
use crate::meta;

pub const DEFAULT_CLASS_ID: i32 = 0;
pub const DEFAULT_HEIGHT_DIFF: f32 = 0.25;
pub const DEFAULT_DANGER_THRESHOLD: f32 = 1.0;

/// Distance between the bottom-center points of two boxes.
#[inline]
pub fn distance_between(a: &BBox<Ltwh>, b: &BBox<Ltwh>) -> f32 {
    na::distance(&a.bottom_center(), &b.bottom_center())
}

/// True when the height difference of the pair exceeds `how_much` of the
/// current detection's height.
#[inline]
pub fn too_far(current: &Detection, other: &Detection, how_much: f32) -> bool {
    (current.height() - other.height()).abs() > current.height() * how_much
}

/// Danger value of `current` against every other entry of `people`.
///
/// A neighbor closer than one body height of `current` adds
/// `(height - dist) / height`, so the result for a pair is not symmetric.
/// `current` itself is skipped when it is one of `people`.
pub fn how_dangerous(current: &Detection, people: &[&Detection], height_diff: f32) -> f32 {
    let danger_distance = current.height();

    people
        .iter()
        .filter(|&&other| !ptr::eq(other, current) && !too_far(current, other, height_diff))
        .map(|other| danger_distance - distance_between(&current.bbox, &other.bbox))
        .filter(|&d| d > 0.0)
        .map(|d| d / danger_distance)
        .sum()
}

/// Scores one frame with the default danger threshold.
pub fn score(frame: &Frame, class_id: i32, height_diff: f32) -> ScoredFrame {
    DistanceScorer::new(class_id, height_diff).score_frame(frame)
}

/// A scored frame plus, for every person, the index of the detection it came from.
#[derive(Debug, Clone)]
pub struct ScoredFrame {
    pub frame: meta::Frame,
    pub origins: Vec<usize>,
}

/// Scoring result of a whole batch.
///
/// The input frames are never touched, anything that wants to draw the
/// result looks it up here by (frame index, detection index).
#[derive(Debug, Clone, Default)]
pub struct Scored {
    pub batch: meta::Batch,
    origins: Vec<Vec<usize>>,
}

impl Scored {
    pub fn push(&mut self, scored: ScoredFrame) {
        self.batch.frames.push(scored.frame);
        self.origins.push(scored.origins);
    }

    #[inline]
    pub fn frames(&self) -> &[meta::Frame] {
        &self.batch.frames
    }

    /// Detection indices of the people of frame `frame`, in person order.
    #[inline]
    pub fn origins(&self, frame: usize) -> &[usize] {
        self.origins.get(frame).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn person(&self, frame: usize, detection: usize) -> Option<&meta::Person> {
        let pos = self.origins(frame).iter().position(|&d| d == detection)?;

        self.batch.frames.get(frame)?.people.get(pos)
    }

    #[inline]
    pub fn into_batch(self) -> meta::Batch {
        self.batch
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceScorer {
    pub class_id: i32,
    pub height_diff: f32,
    pub danger_threshold: f32,
}

impl DistanceScorer {
    pub fn new(class_id: i32, height_diff: f32) -> Self {
        Self {
            class_id,
            height_diff,
            danger_threshold: DEFAULT_DANGER_THRESHOLD,
        }
    }

    pub fn with_danger_threshold(mut self, threshold: f32) -> Self {
        self.danger_threshold = threshold;
        self
    }

    /// Detections of the target class that can be scored, with their index
    /// in the frame. Broken boxes are dropped with a warning.
    fn eligible<'a>(&self, frame: &'a Frame) -> (Vec<usize>, Vec<&'a Detection>) {
        frame
            .iter()
            .enumerate()
            .filter(|(_, det)| det.class == self.class_id)
            .filter(|&(idx, det)| {
                if det.is_valid() {
                    true
                } else {
                    log::warn!(
                        "frame {} (source {}): skipping malformed detection {}: {:?}",
                        frame.frame_num,
                        frame.source_id,
                        idx,
                        det.bbox.as_slice()
                    );
                    false
                }
            })
            .unzip()
    }

    pub fn score_frame(&self, frame: &Frame) -> ScoredFrame {
        let (origins, people) = self.eligible(frame);

        let mut sum_danger = 0.0f32;
        let people = people
            .iter()
            .map(|&det| {
                let danger_val = how_dangerous(det, &people, self.height_diff);
                sum_danger += danger_val;

                meta::Person {
                    bbox: Some(meta::Rect::from(&det.bbox)),
                    danger_val,
                    is_danger: danger_val >= self.danger_threshold,
                }
            })
            .collect();

        ScoredFrame {
            frame: meta::Frame {
                frame_num: frame.frame_num,
                pts: frame.pts.unwrap_or(0),
                dts: frame.dts.unwrap_or(0),
                sum_danger,
                people,
                source_id: frame.source_id,
            },
            origins,
        }
    }
}

impl Default for DistanceScorer {
    fn default() -> Self {
        Self::new(DEFAULT_CLASS_ID, DEFAULT_HEIGHT_DIFF)
    }
}

impl From<&ScorerConfig> for DistanceScorer {
    fn from(cfg: &ScorerConfig) -> Self {
        Self::new(cfg.class_id, cfg.height_diff).with_danger_threshold(cfg.danger_threshold)
    }
}

impl crate::Scorer for DistanceScorer {
    fn score(&self, frames: &[Frame]) -> Scored {
        let mut scored = Scored::default();
        scored.batch.max_frames = frames.len() as u32;

        for frame in frames {
            scored.push(self.score_frame(frame));
        }

        log::trace!("scored {} frames", frames.len());

        scored
    }
}
