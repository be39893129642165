use anyhow::{Context, anyhow, bail};
use log::{info, warn};
use petal_raster::parallel_pipeline::ParallelPipeline;
use petal_raster::pipeline::{FrameBuffer, RasterConfig, RasterPipeline};
use std::env;
use std::path::{Path, PathBuf};

const DEFAULT_FRAME_COUNT: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Parallel renderer, counter advanced after each saved frame.
    Stepped,
    /// Clock-accurate sequential model.
    Sequential,
    /// Parallel renderer racing a free-running frame clock.
    Live,
}

fn env_override<T: std::str::FromStr>(name: &str) -> anyhow::Result<Option<T>> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("{} is not a valid number: {:?}", name, value)),
        Err(_) => Ok(None),
    }
}

fn frame_path(output_dir: &Path, index: u32) -> PathBuf {
    output_dir.join(format!("frame_{:03}.png", index))
}

fn save_frame(frame: &FrameBuffer, output_dir: &Path, index: u32) -> anyhow::Result<()> {
    let path = frame_path(output_dir, index);
    frame
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} (counter {})", path.display(), frame.counter);
    Ok(())
}

/// Renders `frame_count` frames while the frame clock runs freely. Each frame
/// after the first waits for the counter to change, so no frame is rendered
/// twice for the same counter step.
async fn render_live(pipeline: &ParallelPipeline, frame_count: u32) -> anyhow::Result<Vec<FrameBuffer>> {
    let mut counter_changes = pipeline.subscribe_counter();
    let mut frames = Vec::with_capacity(frame_count as usize);

    while frames.len() < frame_count as usize {
        if !frames.is_empty() {
            counter_changes
                .changed()
                .await
                .context("Frame counter publisher closed")?;
        }
        let _ = counter_changes.borrow_and_update();
        let frame = pipeline.render_frame().await.map_err(|e| anyhow!(e))?;
        frames.push(frame);
    }

    Ok(frames)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    // --- 1. Argument Parsing & Setup ---
    let args: Vec<String> = env::args().skip(1).collect();
    let mut mode = Mode::Stepped;
    let mut positional = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--live" => mode = Mode::Live,
            "--sequential" => mode = Mode::Sequential,
            _ => positional.push(arg),
        }
    }

    let Some(output_dir) = positional.first().map(PathBuf::from) else {
        println!("Usage: frame_dumper <output_dir> [frame_count] [--live | --sequential]");
        return Ok(());
    };
    let frame_count = match positional.get(1) {
        Some(count) => count
            .parse::<u32>()
            .with_context(|| format!("Invalid frame count: {:?}", count))?,
        None => env_override("PR_FRAMES")?.unwrap_or(DEFAULT_FRAME_COUNT),
    };

    if frame_count == 0 {
        bail!("Nothing to render: frame count is zero");
    }

    let mut config = RasterConfig::default();
    if let Some(workers) = env_override::<usize>("PR_WORKERS")? {
        config.worker_count = workers;
    }
    if let Some(fps) = env_override::<u32>("PR_FPS")? {
        config.frames_per_second = fps;
    }
    if mode != Mode::Live && env::var("PR_FPS").is_ok() {
        warn!("PR_FPS only affects --live mode");
    }

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory {}", output_dir.display()))?;

    info!("Rendering {} frames into {} ({:?} mode)", frame_count, output_dir.display(), mode);

    // --- 2. Main Rendering Loop ---
    match mode {
        Mode::Sequential => {
            let mut pipeline = RasterPipeline::new(config).map_err(|e| anyhow!(e))?;
            for index in 0..frame_count {
                let frame = pipeline.render_frame();
                save_frame(&frame, &output_dir, index)?;
            }
        }
        Mode::Stepped => {
            let pipeline = ParallelPipeline::new(config).map_err(|e| anyhow!(e))?;
            for index in 0..frame_count {
                let frame = pipeline.render_frame().await.map_err(|e| anyhow!(e))?;
                save_frame(&frame, &output_dir, index)?;
                pipeline.advance_frame().await;
            }
            pipeline.shutdown().await;
        }
        Mode::Live => {
            let pipeline = ParallelPipeline::new(config).map_err(|e| anyhow!(e))?;
            info!(
                "Frame clock at {} fps, {} band workers",
                pipeline.config().frames_per_second,
                pipeline.config().worker_count
            );
            let clock = pipeline.spawn_frame_clock();
            let frames = render_live(&pipeline, frame_count).await;
            pipeline.stop_frame_clock();
            clock.await.context("Frame clock task failed")?;
            for (index, frame) in frames?.iter().enumerate() {
                save_frame(frame, &output_dir, index as u32)?;
            }
            pipeline.shutdown().await;
        }
    }

    info!("Rendering complete. Output saved to {}", output_dir.display());
    Ok(())
}
