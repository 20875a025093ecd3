use std::mem;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::config::BrokerConfig;
use crate::error::Error;
use crate::format::{CsvWriter, Format, ProtoWriter};
use crate::meta;
use crate::queue::BlockingQueue;

/// Writes scored batches to a file from a background thread.
///
/// [`on_batch`](crate::Sink::on_batch) only clones the batch into a queue, so
/// it is safe to call from the real-time path. The worker started by
/// [`start`](FileBroker::start) is the only thing that touches the file.
pub struct FileBroker {
    basepath: PathBuf,
    format: Format,
    queue: Arc<BlockingQueue<meta::Batch>>,
    worker: Mutex<Worker>,
}

enum Worker {
    Idle,
    Running(JoinHandle<()>),
    Finished,
}

impl FileBroker {
    pub fn new(basepath: impl Into<PathBuf>, format: Format) -> Self {
        Self {
            basepath: basepath.into(),
            format,
            queue: Arc::new(BlockingQueue::new()),
            worker: Mutex::new(Worker::Idle),
        }
    }

    pub fn from_config(cfg: &BrokerConfig) -> Self {
        Self::new(cfg.basepath.clone(), cfg.format)
    }

    #[inline]
    pub fn format(&self) -> Format {
        self.format
    }

    /// `<basepath>.<ext>`, the extension depending on the format.
    pub fn output_path(&self) -> PathBuf {
        let mut path = self.basepath.clone().into_os_string();
        path.push(".");
        path.push(self.format.extension());
        path.into()
    }

    /// Number of batches waiting for the worker.
    #[inline]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Spawns the worker thread. A broker can only be started once, a stopped
    /// broker stays stopped.
    pub fn start(&self) -> Result<(), Error> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*worker, Worker::Idle) {
            return Err(Error::AlreadyStarted);
        }

        let queue = self.queue.clone();
        let path = self.output_path();
        let format = self.format;

        log::debug!("spawning {:?} worker for {}", format, path.display());

        let handle = thread::Builder::new()
            .name(format!("broker-{}", format.extension()))
            .spawn(move || {
                let res = match format {
                    Format::Proto => proto_worker(&queue, &path),
                    Format::Csv => csv_worker(&queue, &path),
                };

                if let Err(err) = res {
                    log::error!("writing {} failed: {}", path.display(), err);
                }
            })?;

        *worker = Worker::Running(handle);

        Ok(())
    }

    /// Tells the worker to drain the queue and exit.
    ///
    /// With `block` this returns only once every batch queued before the call
    /// is written (or the failure is logged) and the file is closed, also when
    /// another thread is already joining the worker.
    pub fn stop(&self, block: bool) {
        log::debug!("stopping broker for {}", self.output_path().display());
        self.queue.flush();

        if block {
            // held across the join so concurrent callers wait for it too
            let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

            match mem::replace(&mut *worker, Worker::Finished) {
                Worker::Running(handle) => {
                    log::debug!("joining worker");
                    if handle.join().is_err() {
                        log::error!("broker worker panicked");
                    }
                }
                idle_or_finished => *worker = idle_or_finished,
            }
        }
    }
}

impl crate::Sink for FileBroker {
    fn on_batch(&self, batch: &meta::Batch) -> bool {
        log::trace!("queueing batch of {} frames", batch.frames.len());
        self.queue.put(batch.clone());

        true
    }
}

impl Drop for FileBroker {
    fn drop(&mut self) {
        let running = matches!(
            self.worker.get_mut().unwrap_or_else(PoisonError::into_inner),
            Worker::Running(_)
        );

        if running {
            self.stop(true);
        }
    }
}

fn proto_worker(queue: &BlockingQueue<meta::Batch>, path: &Path) -> Result<(), Error> {
    log::debug!("opening {}", path.display());
    let mut writer = ProtoWriter::create(path)?;

    while let Some(batch) = queue.get() {
        writer.write(&batch)?;
    }

    writer.finish()?;

    Ok(())
}

fn csv_worker(queue: &BlockingQueue<meta::Batch>, path: &Path) -> Result<(), Error> {
    log::debug!("opening {}", path.display());
    let mut writer = CsvWriter::append(path)?;

    while let Some(batch) = queue.get() {
        writer.write(&batch)?;
    }

    writer.finish()?;

    Ok(())
}
