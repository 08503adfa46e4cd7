//! Background loader: one dedicated worker thread draining a FIFO of tasks.
//!
//! Tasks run to completion in submission order. There is no priority and no
//! cancellation; tasks that outlive their island's residency detect that
//! themselves when they run (see [`RegionTicket`]).

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::core::{Error, Result};
use crate::island::{IslandId, RegionTicket};
use crate::math::PixelRect;

/// Work offloaded from the main thread.
#[derive(Clone, Debug, PartialEq)]
pub enum LoadTask {
    /// Generate an island's cell grid
    InitIsland(IslandId),
    /// Synthesize a pixel rect of an island loaded during `ticket`'s residency
    SynthesizeRegion { ticket: RegionTicket, rect: PixelRect },
}

/// Interval between idle checks in [`AsyncLoader::wait_idle`].
const IDLE_POLL: Duration = Duration::from_millis(1);

/// Single-worker task queue.
pub struct AsyncLoader {
    /// Closed on shutdown so the worker drains and exits
    sender: Option<mpsc::UnboundedSender<LoadTask>>,
    worker: Option<JoinHandle<()>>,
    /// Submitted but not yet finished
    pending: Arc<AtomicUsize>,
    completed: Arc<AtomicU64>,
}

impl AsyncLoader {
    /// Spawn the worker thread. `handler` runs every task, in order, on that thread.
    pub fn spawn<F>(mut handler: F) -> Result<Self>
    where
        F: FnMut(LoadTask) + Send + 'static,
    {
        let (sender, mut receiver) = mpsc::unbounded_channel::<LoadTask>();
        let pending = Arc::new(AtomicUsize::new(0));
        let completed = Arc::new(AtomicU64::new(0));

        let worker_pending = Arc::clone(&pending);
        let worker_completed = Arc::clone(&completed);
        let worker = std::thread::Builder::new()
            .name("atoll-loader".to_string())
            .spawn(move || {
                // Blocks until a task arrives; returns None once every sender is gone
                while let Some(task) = receiver.blocking_recv() {
                    log::trace!("Loader running {:?}", task);
                    handler(task);
                    worker_completed.fetch_add(1, Ordering::Relaxed);
                    worker_pending.fetch_sub(1, Ordering::AcqRel);
                }
                log::debug!("Loader worker stopped");
            })
            .map_err(|e| Error::Loader(format!("failed to spawn worker: {}", e)))?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            pending,
            completed,
        })
    }

    /// Queue a task. Returns false if the worker has shut down.
    pub fn submit(&self, task: LoadTask) -> bool {
        let Some(sender) = &self.sender else {
            return false;
        };
        self.pending.fetch_add(1, Ordering::AcqRel);
        if sender.send(task).is_err() {
            self.pending.fetch_sub(1, Ordering::AcqRel);
            log::warn!("Loader worker is gone, task dropped");
            return false;
        }
        true
    }

    /// Tasks submitted but not yet finished.
    pub fn pending(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Tasks finished since the loader started.
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Block until every submitted task has finished or `timeout` elapses.
    /// Returns true if the queue drained.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        while self.pending() > 0 {
            if start.elapsed() >= timeout {
                return false;
            }
            std::thread::sleep(IDLE_POLL);
        }
        true
    }

    /// Close the queue, let the worker finish what was submitted, and join it.
    pub fn shutdown(&mut self) {
        self.sender = None;
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Loader worker panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }
}

impl Drop for AsyncLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn region(i: u32) -> LoadTask {
        LoadTask::SynthesizeRegion {
            ticket: RegionTicket { island: IslandId(i), epoch: 1 },
            rect: PixelRect::new(0, 0, 8, 8),
        }
    }

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let loader = AsyncLoader::spawn(move |task| sink.lock().unwrap().push(task)).unwrap();

        loader.submit(LoadTask::InitIsland(IslandId(0)));
        for i in 0..10 {
            assert!(loader.submit(region(i)));
        }
        assert!(loader.wait_idle(Duration::from_secs(5)));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 11);
        assert_eq!(seen[0], LoadTask::InitIsland(IslandId(0)));
        for i in 0..10 {
            assert_eq!(seen[i as usize + 1], region(i));
        }
        assert_eq!(loader.completed(), 11);
        assert_eq!(loader.pending(), 0);
    }

    #[test]
    fn test_runs_on_worker_thread() {
        let name = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&name);
        let loader = AsyncLoader::spawn(move |_| {
            *sink.lock().unwrap() = std::thread::current().name().map(str::to_string);
        })
        .unwrap();

        loader.submit(LoadTask::InitIsland(IslandId(1)));
        assert!(loader.wait_idle(Duration::from_secs(5)));
        assert_eq!(name.lock().unwrap().as_deref(), Some("atoll-loader"));
    }

    #[test]
    fn test_shutdown_drains_and_rejects() {
        let count = Arc::new(AtomicUsize::new(0));
        let sink = Arc::clone(&count);
        let mut loader = AsyncLoader::spawn(move |_| {
            std::thread::sleep(Duration::from_millis(2));
            sink.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

        for i in 0..5 {
            loader.submit(region(i));
        }
        loader.shutdown();
        assert_eq!(count.load(Ordering::SeqCst), 5);
        assert!(!loader.is_running());
        assert!(!loader.submit(region(9)));
    }

    #[test]
    fn test_wait_idle_times_out() {
        let loader = AsyncLoader::spawn(|_| std::thread::sleep(Duration::from_millis(200))).unwrap();
        loader.submit(LoadTask::InitIsland(IslandId(0)));
        assert!(!loader.wait_idle(Duration::from_millis(10)));
        assert!(loader.wait_idle(Duration::from_secs(5)));
    }
}
