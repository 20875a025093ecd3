pub mod annotate;
pub mod bbox;
pub mod broker;
pub mod clock;
pub mod config;
pub mod detection;
pub mod error;
pub mod format;
pub mod frame;
pub mod meta;
pub mod payload;
pub mod pipeline;
pub mod queue;
pub mod scorer;

pub use broker::FileBroker;
pub use detection::Detection;
pub use format::Format;
pub use frame::Frame;
pub use payload::PayloadSlot;
pub use pipeline::Pipeline;
pub use queue::BlockingQueue;
pub use scorer::{DistanceScorer, Scored, ScoredFrame};

/// Turns the frames of one processing cycle into a scored batch.
pub trait Scorer {
    fn score(&self, frames: &[Frame]) -> Scored;
}

/// Consumer of scored batches.
pub trait Sink {
    /// Returns `false` when the batch could not be accepted.
    fn on_batch(&self, batch: &meta::Batch) -> bool;
}
