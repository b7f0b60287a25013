use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use indicatif::ProgressBar;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

/// Admission policy: at most `concurrency` tasks in flight and at most
/// `per_interval` task starts inside any rolling `interval`.
#[derive(Clone, Copy, Debug)]
pub struct QueueLimits {
    pub concurrency: usize,
    pub per_interval: usize,
    pub interval: Duration,
}

impl Default for QueueLimits {
    fn default() -> Self {
        QueueLimits {
            concurrency: 5,
            per_interval: 5,
            interval: Duration::from_secs(1),
        }
    }
}

/// FIFO task queue that defers execution behind a concurrency gate and a
/// sliding-window rate gate. `submit` never blocks the caller; `drain` is
/// the barrier that waits for every task and releases all outputs in
/// submission order. The progress bar advances exactly once per finished
/// task, whatever the task's outcome.
pub struct TaskQueue<T> {
    sender: Option<mpsc::UnboundedSender<BoxFuture<'static, T>>>,
    dispatcher: JoinHandle<Vec<(usize, T)>>,
}

impl<T: Send + 'static> TaskQueue<T> {
    pub fn new(limits: QueueLimits, progress: ProgressBar) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let dispatcher = tokio::spawn(dispatch(limits, receiver, progress));
        TaskQueue {
            sender: Some(sender),
            dispatcher,
        }
    }

    /// Queue a task. Execution starts once both gates admit it, in
    /// submission order.
    pub fn submit<F>(&mut self, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        if let Some(sender) = &self.sender {
            // The dispatcher outlives the sender, so this cannot fail.
            let _ = sender.send(Box::pin(task));
        }
    }

    /// Barrier: completes only when every submitted task has finished, then
    /// yields the outputs in submission order.
    pub async fn drain(mut self) -> Vec<T> {
        self.sender.take();
        match self.dispatcher.await {
            Ok(mut outputs) => {
                outputs.sort_by_key(|(sequence, _)| *sequence);
                outputs.into_iter().map(|(_, output)| output).collect()
            }
            Err(_) => Vec::new(),
        }
    }
}

async fn dispatch<T: Send + 'static>(
    limits: QueueLimits,
    mut receiver: mpsc::UnboundedReceiver<BoxFuture<'static, T>>,
    progress: ProgressBar,
) -> Vec<(usize, T)> {
    let concurrency = Arc::new(Semaphore::new(limits.concurrency));
    let mut window = AdmissionWindow::new(limits.per_interval, limits.interval);
    let mut workers: JoinSet<(usize, T)> = JoinSet::new();
    let mut outputs = Vec::new();
    let mut sequence = 0;

    while let Some(task) = receiver.recv().await {
        // Gating here, before the spawn, keeps admission strictly FIFO.
        let permit = match Arc::clone(&concurrency).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break, // the semaphore is never closed
        };
        window.admit().await;

        let bar = progress.clone();
        workers.spawn(async move {
            let output = task.await;
            drop(permit);
            bar.inc(1);
            (sequence, output)
        });
        sequence += 1;

        while let Some(finished) = workers.try_join_next() {
            if let Ok(output) = finished {
                outputs.push(output);
            }
        }
    }

    while let Some(finished) = workers.join_next().await {
        if let Ok(output) = finished {
            outputs.push(output);
        }
    }
    outputs
}

/// Rolling-window admission: remembers the start instant of the most recent
/// admissions and holds the next one back until starting it keeps the
/// window under its cap.
struct AdmissionWindow {
    cap: usize,
    interval: Duration,
    admitted: VecDeque<Instant>,
}

impl AdmissionWindow {
    fn new(cap: usize, interval: Duration) -> Self {
        AdmissionWindow {
            cap,
            interval,
            admitted: VecDeque::with_capacity(cap),
        }
    }

    async fn admit(&mut self) {
        loop {
            let now = Instant::now();
            while self
                .admitted
                .front()
                .is_some_and(|&start| now.duration_since(start) >= self.interval)
            {
                self.admitted.pop_front();
            }
            if self.admitted.len() < self.cap {
                self.admitted.push_back(now);
                return;
            }
            if let Some(&oldest) = self.admitted.front() {
                tokio::time::sleep_until(oldest + self.interval).await;
            }
        }
    }
}
