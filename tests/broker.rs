use std::fs;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use dsdistance::format::{ProtoReader, CSV_HEADER};
use dsdistance::meta::{Batch, Frame, Person, Rect};
use dsdistance::{FileBroker, Format, Sink};

const BATCH_SIZE: u32 = 8;
const NUM_BATCHES: u32 = 8;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn generate_frame(seed: u32) -> Frame {
    let num_people = seed % 10;
    let people: Vec<Person> = (0..num_people)
        .map(|i| {
            let danger_val = ((seed * 7 + i * 13) % 20) as f32 / 10.0;
            Person {
                bbox: Some(Rect {
                    left: i as f32 * 10.0,
                    top: 0.0,
                    width: 40.0,
                    height: 100.0,
                }),
                danger_val,
                is_danger: danger_val >= 1.0,
            }
        })
        .collect();

    Frame {
        frame_num: seed as i32,
        pts: u64::from(seed + 1) * 40_000_000,
        dts: 0,
        sum_danger: people.iter().map(|p| p.danger_val).sum(),
        people,
        source_id: seed % 3,
    }
}

fn generate_batch(n: u32) -> Batch {
    Batch {
        max_frames: BATCH_SIZE,
        frames: (0..BATCH_SIZE).map(|i| generate_frame(n * BATCH_SIZE + i)).collect(),
    }
}

#[test]
fn output_path_per_format() {
    let proto = FileBroker::new("/data/meta", Format::Proto);
    let csv = FileBroker::new("/data/meta", Format::Csv);

    assert_eq!(proto.output_path().to_str(), Some("/data/meta.coded"));
    assert_eq!(csv.output_path().to_str(), Some("/data/meta.csv"));
}

#[test]
fn create_and_drop_without_start() {
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("metadata"), Format::Proto);

    assert!(broker.on_batch(&generate_batch(0)));
    assert_eq!(broker.pending(), 1);
    drop(broker);

    assert!(!tmp.path().join("metadata.coded").exists());
}

#[test]
fn start_twice_fails() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("metadata"), Format::Proto);

    broker.start().unwrap();
    assert!(matches!(
        broker.start(),
        Err(dsdistance::error::Error::AlreadyStarted)
    ));
    broker.stop(true);
}

#[test]
fn restart_after_stop_fails() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("metadata"), Format::Proto);
    let batches: Vec<Batch> = (0..3).map(generate_batch).collect();

    broker.start().unwrap();
    for batch in &batches {
        broker.on_batch(batch);
    }
    broker.stop(true);

    assert!(matches!(
        broker.start(),
        Err(dsdistance::error::Error::AlreadyStarted)
    ));
    broker.stop(true);

    let read = ProtoReader::open(&broker.output_path())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(read, batches);
}

#[test]
fn concurrent_blocking_stops_both_wait() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = Arc::new(FileBroker::new(tmp.path().join("metadata"), Format::Proto));

    broker.start().unwrap();
    for n in 0..NUM_BATCHES {
        broker.on_batch(&generate_batch(n));
    }

    let stoppers: Vec<_> = (0..2)
        .map(|_| {
            let b = broker.clone();
            thread::spawn(move || {
                b.stop(true);
                ProtoReader::open(&b.output_path())
                    .unwrap()
                    .read_all()
                    .unwrap()
                    .len()
            })
        })
        .collect();

    for s in stoppers {
        assert_eq!(s.join().unwrap(), NUM_BATCHES as usize);
    }
}

#[test]
fn proto_round_trip() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("metadata"), Format::Proto);
    let batches: Vec<Batch> = (0..NUM_BATCHES).map(generate_batch).collect();

    broker.start().unwrap();
    for batch in &batches {
        assert!(broker.on_batch(batch));
    }
    broker.stop(true);

    let data = fs::read(broker.output_path()).unwrap();
    assert_eq!(
        u32::from_le_bytes([data[0], data[1], data[2], data[3]]),
        0x5640FD6E
    );

    let read = ProtoReader::open(&broker.output_path())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(read, batches);
}

#[test]
fn proto_overwrites_previous_run() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("metadata");

    {
        let broker = FileBroker::new(&base, Format::Proto);
        broker.start().unwrap();
        for n in 0..NUM_BATCHES {
            broker.on_batch(&generate_batch(n));
        }
        broker.stop(true);
    }

    let broker = FileBroker::new(&base, Format::Proto);
    broker.start().unwrap();
    broker.on_batch(&generate_batch(42));
    broker.stop(true);

    let read = ProtoReader::open(&broker.output_path())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(read, vec![generate_batch(42)]);
}

#[test]
fn csv_line_count_and_fields() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("metadata"), Format::Csv);

    broker.start().unwrap();
    for n in 0..NUM_BATCHES {
        broker.on_batch(&generate_batch(n));
    }
    broker.stop(true);

    let text = fs::read_to_string(broker.output_path()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 1 + (NUM_BATCHES * BATCH_SIZE) as usize);
    assert_eq!(lines[0], CSV_HEADER);

    for (idx, line) in lines[1..].iter().enumerate() {
        let fields: Vec<&str> = line.split(',').collect();
        assert_eq!(fields.len(), 5, "line {}: {}", idx, line);

        // timestamps come from pts, 25 fps from the epoch
        assert!(fields[0].starts_with("1970-01-01 00:00:"), "{}", fields[0]);

        let expected = generate_frame(idx as u32);
        let detected: usize = fields[1].parse().unwrap();
        let violating: usize = fields[2].parse().unwrap();
        assert_eq!(detected, expected.people.len());
        assert_eq!(violating, expected.violating());

        let (_, decimals) = fields[3].split_once('.').unwrap();
        assert_eq!(decimals.len(), 3, "{}", fields[3]);
        assert_eq!(fields[3], format!("{:.3}", expected.environment_score()));

        assert_eq!(fields[4], expected.source_id.to_string());
    }
}

#[test]
fn csv_appends_without_second_header() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let base = tmp.path().join("metadata");

    for n in 0..2 {
        let broker = FileBroker::new(&base, Format::Csv);
        broker.start().unwrap();
        broker.on_batch(&generate_batch(n));
        broker.stop(true);
    }

    let text = fs::read_to_string(tmp.path().join("metadata.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 1 + 2 * BATCH_SIZE as usize);
    assert_eq!(lines.iter().filter(|l| **l == CSV_HEADER).count(), 1);
}

#[test]
fn unopenable_output_is_logged_not_fatal() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("missing").join("metadata"), Format::Csv);

    broker.start().unwrap();
    assert!(broker.on_batch(&generate_batch(0)));
    broker.stop(true);

    assert!(!broker.output_path().exists());
}

#[test]
fn queued_before_start_is_written() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = FileBroker::new(tmp.path().join("metadata"), Format::Proto);

    broker.on_batch(&generate_batch(0));
    broker.on_batch(&generate_batch(1));
    broker.start().unwrap();
    broker.stop(true);

    let read = ProtoReader::open(&broker.output_path())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(read, vec![generate_batch(0), generate_batch(1)]);
}

#[test]
fn non_blocking_stop_then_drop_drains() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("metadata.coded");

    {
        let broker = FileBroker::new(tmp.path().join("metadata"), Format::Proto);
        broker.start().unwrap();
        for n in 0..NUM_BATCHES {
            broker.on_batch(&generate_batch(n));
        }
        broker.stop(false);
    }

    let read = ProtoReader::open(&path).unwrap().read_all().unwrap();
    assert_eq!(read.len(), NUM_BATCHES as usize);
}

#[test]
fn producers_on_many_threads() {
    init_logger();
    let tmp = TempDir::new().unwrap();
    let broker = Arc::new(FileBroker::new(tmp.path().join("metadata"), Format::Proto));
    broker.start().unwrap();

    let producers: Vec<_> = (0..4)
        .map(|p| {
            let b = broker.clone();
            thread::spawn(move || {
                for n in 0..NUM_BATCHES {
                    b.on_batch(&generate_batch(p * 100 + n));
                }
            })
        })
        .collect();

    for p in producers {
        p.join().unwrap();
    }
    broker.stop(true);

    let read = ProtoReader::open(&broker.output_path())
        .unwrap()
        .read_all()
        .unwrap();
    assert_eq!(read.len(), 4 * NUM_BATCHES as usize);

    // each producer's batches keep their order
    for p in 0..4 {
        let mine: Vec<i32> = read
            .iter()
            .map(|b| b.frames[0].frame_num)
            .filter(|&num| (num as u32 / BATCH_SIZE) / 100 == p)
            .collect();
        assert_eq!(mine.len(), NUM_BATCHES as usize);
        assert!(mine.windows(2).all(|w| w[0] < w[1]));
    }
}
