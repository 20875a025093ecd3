use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Mutex, PoisonError};

use crate::meta;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Held around every calendar conversion in the process.
pub static TIME_LOCK: Mutex<()> = Mutex::new(());

fn ns_to_time(ns: u64) -> Option<DateTime<Utc>> {
    Utc.timestamp_opt((ns / NANOS_PER_SEC) as i64, 0).single()
}

/// Frame time, preferring the decode timestamp, then the presentation
/// timestamp, then the current time.
pub fn frame_time(frame: &meta::Frame) -> DateTime<Utc> {
    [frame.dts, frame.pts]
        .into_iter()
        .filter(|&ns| ns != 0)
        .find_map(ns_to_time)
        .unwrap_or_else(Utc::now)
}

/// `YYYY-MM-DD HH:MM:SS` in UTC for a frame.
pub fn format_frame_time(frame: &meta::Frame) -> String {
    let _guard = TIME_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

    frame_time(frame).format(TIMESTAMP_FORMAT).to_string()
}
