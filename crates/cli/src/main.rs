mod replay;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use multicam_core::pipeline::fusion_engine::FusionEngine;
use multicam_core::pipeline::infrastructure::threaded_fusion_executor::{
    FusionError, ThreadedFusionExecutor,
};
use multicam_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use multicam_core::shared::config::FusionConfig;
use multicam_core::shared::ids::CameraId;
use multicam_core::shared::track::ResolvedTrack;

use replay::{FrameOutput, IndexedFrame};

/// Cross-camera identity fusion over recorded tracker output.
#[derive(Parser)]
#[command(name = "multicam-fuse")]
struct Cli {
    /// JSON Lines file with one camera frame per line ("-" for stdin).
    input: PathBuf,

    /// Write the analytics summary here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write resolved tracks per frame (JSON Lines) to this file.
    #[arg(long)]
    tracks: Option<PathBuf>,

    /// Fusion config file (JSON). Defaults to the per-user config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cosine similarity needed to fuse a new track into a known identity.
    #[arg(long)]
    threshold: Option<f64>,

    /// Embeddings kept per identity.
    #[arg(long)]
    gallery_capacity: Option<usize>,

    /// Do not feed embeddings of already-bound tracks back into the gallery.
    #[arg(long)]
    no_reinforce: bool,

    /// Process every Nth frame of each camera (1 = every frame).
    #[arg(long, default_value = "1")]
    skip_frames: usize,

    /// Feed each camera from its own worker thread through the fusion actor.
    #[arg(long)]
    threaded: bool,

    /// Pretty-print the summary.
    #[arg(long)]
    pretty: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    if cli.skip_frames == 0 {
        return Err("--skip-frames must be at least 1".into());
    }

    let frames = replay::read_frames(replay::open_input(&cli.input)?)?;
    let total = frames.len();
    let frames = replay::thin_frames(frames, cli.skip_frames);
    log::info!("Replaying {} of {total} camera frames", frames.len());

    let engine =
        FusionEngine::new(&config).with_logger(Box::new(StdoutPipelineLogger::default()));
    let (engine, outputs) = if cli.threaded {
        run_threaded(engine, frames, config.channel_capacity)?
    } else {
        run_sequential(engine, frames)
    };

    if let Some(path) = &cli.tracks {
        write_tracks(path, &outputs)?;
        log::info!("Resolved tracks written to {}", path.display());
    }

    let summary = engine.summary();
    match &cli.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            replay::write_json(&mut out, &summary, cli.pretty)?;
            out.flush()?;
            log::info!("Summary written to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            replay::write_json(&mut out, &summary, cli.pretty)?;
        }
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<FusionConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => FusionConfig::from_file(path)?,
        None => FusionConfig::load(),
    };
    if let Some(threshold) = cli.threshold {
        config.similarity_threshold = threshold;
    }
    if let Some(capacity) = cli.gallery_capacity {
        config.gallery_capacity = capacity;
    }
    if cli.no_reinforce {
        config.reinforce_bound_tracks = false;
    }
    config.validate()?;
    Ok(config)
}

type FrameResult = (usize, CameraId, Vec<ResolvedTrack>);

fn run_sequential(
    mut engine: FusionEngine,
    frames: Vec<IndexedFrame>,
) -> (FusionEngine, Vec<FrameResult>) {
    let outputs = frames
        .into_iter()
        .map(|f| {
            let resolved = engine.process(&f.frame);
            (f.index, f.frame.camera_id, resolved)
        })
        .collect();
    engine.finish();
    (engine, outputs)
}

fn run_threaded(
    engine: FusionEngine,
    frames: Vec<IndexedFrame>,
    channel_capacity: usize,
) -> Result<(FusionEngine, Vec<FrameResult>), Box<dyn std::error::Error>> {
    let actor = ThreadedFusionExecutor::with_capacity(channel_capacity).spawn(engine);

    let workers: Vec<_> = replay::split_by_camera(frames)
        .into_iter()
        .map(|(camera, stream)| {
            let handle = actor.handle();
            std::thread::spawn(move || {
                log::debug!("Worker for camera {camera}: {} frames", stream.len());
                stream
                    .into_iter()
                    .map(|f| -> Result<FrameResult, FusionError> {
                        let resolved = handle.resolve(f.frame)?;
                        Ok((f.index, camera.clone(), resolved))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
        })
        .collect();

    let mut outputs = Vec::new();
    for worker in workers {
        let results = worker
            .join()
            .map_err(|_| "camera worker thread panicked")??;
        outputs.extend(results);
    }
    outputs.sort_by_key(|(index, _, _)| *index);

    let engine = actor.shutdown()?;
    Ok((engine, outputs))
}

fn write_tracks(path: &Path, outputs: &[FrameResult]) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = BufWriter::new(File::create(path)?);
    for (frame_index, camera_id, tracks) in outputs {
        let record = FrameOutput {
            frame_index: *frame_index,
            camera_id,
            tracks,
        };
        replay::write_json(&mut out, &record, false)?;
    }
    out.flush()?;
    Ok(())
}
