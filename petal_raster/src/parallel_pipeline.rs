use crate::core_modules::color::color::Color;
use crate::core_modules::frame_counter::FrameCounter;
use crate::core_modules::geometry::Coordinate;
use crate::pipeline::{FrameBuffer, RasterConfig, evaluate_pixel};
use futures::future::join_all;
use log::{debug, info, trace};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;

/// A horizontal strip of the visible area, rendered by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Band {
    pub first_row: Coordinate,
    pub rows: Coordinate,
    pub width: Coordinate,
}

impl Band {
    /// Splits `height` rows into at most `count` contiguous bands of near-equal size.
    pub fn split(width: Coordinate, height: Coordinate, count: usize) -> Vec<Band> {
        let count = count.clamp(1, height.max(1) as usize) as Coordinate;
        let rows_per_band = height.div_ceil(count);
        (0..height)
            .step_by(rows_per_band.max(1) as usize)
            .map(|first_row| Band {
                first_row,
                rows: rows_per_band.min(height - first_row),
                width,
            })
            .collect()
    }
}

pub struct BandTask {
    pub band: Band,
    pub counter: u8,
    pub result_sender: oneshot::Sender<Vec<Color>>,
}

pub struct WorkerPool {
    task_sender: mpsc::UnboundedSender<BandTask>,
    workers: Vec<tokio::task::JoinHandle<()>>,
}

impl WorkerPool {
    pub fn new(worker_count: usize) -> Self {
        let worker_count = worker_count.max(1);
        let (task_sender, mut task_receiver) = mpsc::unbounded_channel::<BandTask>();
        let mut workers = Vec::with_capacity(worker_count + 1);

        // Create a single dispatcher that distributes bands to workers
        let (worker_senders, worker_receivers): (Vec<_>, Vec<_>) = (0..worker_count)
            .map(|_| mpsc::unbounded_channel::<BandTask>())
            .unzip();

        let dispatcher_senders = worker_senders;
        workers.push(tokio::spawn(async move {
            let mut worker_idx = 0;
            while let Some(task) = task_receiver.recv().await {
                let _ = dispatcher_senders[worker_idx].send(task);
                worker_idx = (worker_idx + 1) % worker_count;
            }
        }));

        for (worker_id, mut worker_receiver) in worker_receivers.into_iter().enumerate() {
            workers.push(tokio::spawn(async move {
                while let Some(task) = worker_receiver.recv().await {
                    trace!(
                        "Worker {} rendering rows {}..{} with counter {}",
                        worker_id,
                        task.band.first_row,
                        task.band.first_row + task.band.rows,
                        task.counter
                    );
                    let pixels = Self::render_band_worker(task.band, task.counter);
                    let _ = task.result_sender.send(pixels);
                }
            }));
        }

        info!("Started worker pool with {} band workers", worker_count);

        Self {
            task_sender,
            workers,
        }
    }

    fn render_band_worker(band: Band, counter: u8) -> Vec<Color> {
        let mut pixels = Vec::with_capacity((band.rows * band.width) as usize);
        for y in band.first_row..band.first_row + band.rows {
            for x in 0..band.width {
                pixels.push(evaluate_pixel(x, y, counter, true));
            }
        }
        pixels
    }

    pub async fn render_band(&self, band: Band, counter: u8) -> Result<Vec<Color>, &'static str> {
        let (result_sender, result_receiver) = oneshot::channel();

        let task = BandTask {
            band,
            counter,
            result_sender,
        };

        self.task_sender
            .send(task)
            .map_err(|_| "Failed to send band to worker pool")?;

        result_receiver
            .await
            .map_err(|_| "Failed to receive band from worker")
    }

    /// Closes the task queue and waits for the dispatcher and every worker to drain.
    pub async fn shutdown(self) {
        drop(self.task_sender);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Renders frames across a worker pool while a separate frame clock task
/// advances the shared counter.
pub struct ParallelPipeline {
    config: RasterConfig,
    worker_pool: WorkerPool,
    counter: Arc<RwLock<FrameCounter>>,
    counter_sender: Arc<watch::Sender<u8>>,
    next_frame_id: AtomicU64,
    shutdown_sender: watch::Sender<bool>,
}

impl ParallelPipeline {
    /// Must be called from within a tokio runtime. The worker count is clamped
    /// to one worker per visible row at most.
    pub fn new(mut config: RasterConfig) -> Result<Self, &'static str> {
        config.timing.validate()?;
        if config.frames_per_second == 0 {
            return Err("Frame clock rate must be non-zero");
        }
        config.worker_count = config.worker_count.clamp(1, config.timing.v_active as usize);

        let worker_pool = WorkerPool::new(config.worker_count);
        let (shutdown_sender, _) = watch::channel(false);
        let (counter_sender, _) = watch::channel(0u8);

        Ok(Self {
            config,
            worker_pool,
            counter: Arc::new(RwLock::new(FrameCounter::new())),
            counter_sender: Arc::new(counter_sender),
            next_frame_id: AtomicU64::new(0),
            shutdown_sender,
        })
    }

    /// Frame boundary: the vsync edge of the software model.
    pub async fn advance_frame(&self) {
        let mut counter = self.counter.write().await;
        counter.advance();
        self.counter_sender.send_replace(counter.value());
    }

    pub async fn reset(&self) {
        let mut counter = self.counter.write().await;
        counter.reset();
        self.counter_sender.send_replace(counter.value());
        self.next_frame_id.store(0, Ordering::SeqCst);
    }

    /// Receiver that is notified with the new value every time the counter
    /// changes, from `advance_frame`, `reset` or the frame clock.
    pub fn subscribe_counter(&self) -> watch::Receiver<u8> {
        self.counter_sender.subscribe()
    }

    pub async fn counter_value(&self) -> u8 {
        self.counter.read().await.value()
    }

    /// Renders the visible area. The counter is read once, and that one value is
    /// handed to every band, so a concurrent frame clock can never split a frame.
    pub async fn render_frame(&self) -> Result<FrameBuffer, &'static str> {
        let counter = self.counter.read().await.value();
        let frame_id = self.next_frame_id.fetch_add(1, Ordering::SeqCst);
        let width = self.config.timing.h_active;
        let height = self.config.timing.v_active;

        let bands = Band::split(width, height, self.config.worker_count);
        let results = join_all(
            bands
                .iter()
                .map(|band| self.worker_pool.render_band(*band, counter)),
        )
        .await;

        let mut pixels = Vec::with_capacity((width * height) as usize);
        for band_pixels in results {
            pixels.extend(band_pixels?);
        }

        debug!("Rendered frame {} with counter {} across {} bands", frame_id, counter, bands.len());

        Ok(FrameBuffer {
            frame_id,
            counter,
            width,
            height,
            pixels,
        })
    }

    /// Spawns a task that advances the counter at `frames_per_second` until
    /// `stop_frame_clock` is called.
    pub fn spawn_frame_clock(&self) -> tokio::task::JoinHandle<()> {
        let counter = Arc::clone(&self.counter);
        let counter_sender = Arc::clone(&self.counter_sender);
        let mut shutdown_receiver = self.shutdown_sender.subscribe();
        let period = Duration::from_secs_f64(1.0 / self.config.frames_per_second as f64);

        info!("Starting frame clock at {} fps", self.config.frames_per_second);

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately; the first edge is one period out.
            interval.tick().await;

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        let mut counter = counter.write().await;
                        counter.advance();
                        counter_sender.send_replace(counter.value());
                    }
                    changed = shutdown_receiver.changed() => {
                        if changed.is_err() || *shutdown_receiver.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Frame clock stopped");
        })
    }

    pub fn stop_frame_clock(&self) {
        let _ = self.shutdown_sender.send(true);
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub async fn shutdown(self) {
        self.stop_frame_clock();
        self.worker_pool.shutdown().await;
    }
}
