use std::sync::Arc;

use crate::frame::Frame;
use crate::scorer::Scored;
use crate::{Scorer, Sink};

/// One scorer feeding any number of sinks.
pub struct Pipeline<S: Scorer> {
    scorer: S,
    sinks: Vec<Arc<dyn Sink + Send + Sync>>,
}

impl<S: Scorer> Pipeline<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn Sink + Send + Sync>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[inline]
    pub fn scorer(&self) -> &S {
        &self.scorer
    }

    /// Scores `frames` and hands the batch to every sink.
    ///
    /// Always returns the scoring result, a sink that refuses the batch is
    /// only logged.
    pub fn process(&self, frames: &[Frame]) -> Scored {
        let scored = self.scorer.score(frames);

        for (idx, sink) in self.sinks.iter().enumerate() {
            if !sink.on_batch(&scored.batch) {
                log::warn!("sink {} rejected batch of {} frames", idx, frames.len());
            }
        }

        scored
    }
}
