use std::collections::VecDeque;
use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct State<T> {
    deque: VecDeque<T>,
    flushing: bool,
}

/// Unbounded FIFO shared between producer and consumer threads.
///
/// `get` blocks until an item arrives or the queue is flushed. Once flushed
/// and drained, `get` returns `None` (the poison pill) and never blocks again.
/// There is no maximum size: `put` never blocks, so a slow consumer makes the
/// queue grow without limit.
pub struct BlockingQueue<T> {
    state: Mutex<State<T>>,
    cv: Condvar,
}

impl<T> fmt::Debug for BlockingQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();

        f.debug_struct("BlockingQueue")
            .field("len", &state.deque.len())
            .field("flushing", &state.flushing)
            .finish()
    }
}

impl<T> Default for BlockingQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlockingQueue<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                deque: VecDeque::new(),
                flushing: false,
            }),
            cv: Condvar::new(),
        }
    }

    // a panicking holder cannot leave the deque half-updated
    #[inline]
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn put(&self, item: T) {
        self.lock().deque.push_back(item);
        self.cv.notify_one();
    }

    pub fn get(&self) -> Option<T> {
        let mut state = self
            .cv
            .wait_while(self.lock(), |s| s.deque.is_empty() && !s.flushing)
            .unwrap_or_else(PoisonError::into_inner);

        state.deque.pop_front()
    }

    /// Stop blocking in `get`. Items already queued are still delivered.
    pub fn flush(&self) {
        self.lock().flushing = true;
        self.cv.notify_all();
    }

    #[inline]
    pub fn is_flushing(&self) -> bool {
        self.lock().flushing
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lock().deque.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock().deque.is_empty()
    }
}
