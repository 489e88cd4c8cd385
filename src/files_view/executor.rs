use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use crate::remote::FilesBackend;

use super::{FilesView, LoadCompletion, LoadRequest};

/// Worker count for [`LoadExecutor::new`].
pub fn default_worker_threads() -> usize {
    thread::available_parallelism()
        .map(|n| n.get().clamp(1, 8))
        .unwrap_or(2)
}

/// Runs loads on a fixed pool of worker threads and hands completions back to
/// the thread that owns the view.
pub struct LoadExecutor {
    jobs: mpsc::Sender<LoadRequest>,
    rx: mpsc::Receiver<LoadCompletion>,

    // Highest generation queued so far; workers skip anything older.
    latest: Arc<AtomicU64>,
    workers: usize,
    _threads: Vec<thread::JoinHandle<()>>,
}

impl LoadExecutor {
    pub fn new(backend: Arc<dyn FilesBackend>) -> Self {
        Self::with_workers(backend, default_worker_threads())
    }

    pub fn with_workers(backend: Arc<dyn FilesBackend>, workers: usize) -> Self {
        let workers = workers.max(1);
        let (jobs, job_rx) = mpsc::channel::<LoadRequest>();
        let job_rx = Arc::new(Mutex::new(job_rx));
        let (tx, rx) = mpsc::channel();
        let latest = Arc::new(AtomicU64::new(0));

        let mut threads = Vec::with_capacity(workers);
        for _ in 0..workers {
            let job_rx = Arc::clone(&job_rx);
            let backend = Arc::clone(&backend);
            let tx = tx.clone();
            let latest = Arc::clone(&latest);
            threads.push(thread::spawn(move || {
                loop {
                    let request = {
                        let Ok(job_rx) = job_rx.lock() else {
                            break;
                        };
                        job_rx.recv()
                    };
                    let Ok(request) = request else {
                        break;
                    };
                    if request.generation() < latest.load(Ordering::Acquire) {
                        tracing::debug!(
                            generation = request.generation(),
                            "skipping superseded load"
                        );
                        continue;
                    }
                    if tx.send(request.run(backend.as_ref())).is_err() {
                        break;
                    }
                }
            }));
        }

        Self {
            jobs,
            rx,
            latest,
            workers,
            _threads: threads,
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Queues every request without waiting on any of them.
    pub fn spawn(&self, requests: Vec<LoadRequest>) {
        for request in requests {
            self.latest
                .fetch_max(request.generation(), Ordering::AcqRel);
            if self.jobs.send(request).is_err() {
                tracing::warn!("load workers are gone; dropping request");
            }
        }
    }

    pub fn try_next(&self) -> Option<LoadCompletion> {
        self.rx.try_recv().ok()
    }

    pub fn next_timeout(&self, timeout: Duration) -> Option<LoadCompletion> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Applies every completion that is already available. Returns how many
    /// changed the view.
    pub fn pump(&self, view: &mut FilesView) -> usize {
        let mut applied = 0;
        while let Some(completion) = self.try_next() {
            if view.apply(completion) {
                applied += 1;
            }
        }
        applied
    }
}

/// Spawns `requests` and blocks until each has completed and been applied.
pub fn run_to_completion(view: &mut FilesView, executor: &LoadExecutor, requests: Vec<LoadRequest>) {
    let Some(generation) = requests.first().map(LoadRequest::generation) else {
        return;
    };
    let mut pending = requests.len();
    executor.spawn(requests);
    while pending > 0 {
        // The backend applies its own request timeouts; this only bounds a stuck worker.
        if let Some(completion) = executor.next_timeout(Duration::from_secs(300)) {
            if completion.generation() == generation {
                pending -= 1;
            }
            view.apply(completion);
        } else {
            tracing::warn!(pending, "gave up waiting for loads");
            break;
        }
    }
}

#[cfg(test)]
#[path = "../tests/files_view/executor_tests.rs"]
mod tests;
