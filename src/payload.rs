use std::sync::{Mutex, PoisonError};

use crate::meta;

/// Holds the most recent serialized batch for a caller that polls.
///
/// Only the latest payload is kept, an unread payload is overwritten by the
/// next one.
#[derive(Debug, Default)]
pub struct PayloadSlot {
    data: Mutex<Vec<u8>>,
}

impl PayloadSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_batch_payload(&self, payload: &[u8]) -> bool {
        let mut data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        data.clear();
        data.extend_from_slice(payload);

        true
    }

    /// A fresh copy of the latest payload with a trailing NUL byte, or `None`
    /// if nothing has been stored yet.
    pub fn get_payload(&self) -> Option<Box<[u8]>> {
        let data = self.data.lock().unwrap_or_else(PoisonError::into_inner);
        if data.is_empty() {
            return None;
        }

        let mut ret = Vec::with_capacity(data.len() + 1);
        ret.extend_from_slice(&data);
        ret.push(0);

        Some(ret.into_boxed_slice())
    }
}

impl crate::Sink for PayloadSlot {
    fn on_batch(&self, batch: &meta::Batch) -> bool {
        match batch.to_payload() {
            Ok(payload) => self.on_batch_payload(&payload),
            Err(err) => {
                log::warn!("could not serialize batch: {}", err);
                false
            }
        }
    }
}
