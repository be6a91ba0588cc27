use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::analytics::domain::analytics_summary::AnalyticsSummary;
use crate::pipeline::fusion_engine::FusionEngine;
use crate::shared::constants::DEFAULT_CHANNEL_CAPACITY;
use crate::shared::track::{CameraFrame, ResolvedTrack};

#[derive(Debug, Error)]
pub enum FusionError {
    #[error("fusion actor is no longer running")]
    Disconnected,
    #[error("fusion actor thread panicked")]
    ActorPanicked,
}

enum Command {
    Submit(CameraFrame),
    Resolve(CameraFrame, Sender<Vec<ResolvedTrack>>),
    Summary(Sender<AnalyticsSummary>),
    Shutdown,
}

/// Runs a [`FusionEngine`] on a dedicated thread that owns it exclusively.
///
/// Layout: `camera workers → bounded channel → actor [resolve/ingest]`
///
/// Every camera's frames pass through one queue, so each frame is resolved
/// and ingested atomically with respect to all others. Frames from one
/// sender keep their order; frames from different senders interleave in
/// arrival order.
pub struct ThreadedFusionExecutor {
    channel_capacity: usize,
}

impl ThreadedFusionExecutor {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(channel_capacity: usize) -> Self {
        Self {
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn spawn(&self, engine: FusionEngine) -> FusionActor {
        let (tx, rx) = crossbeam_channel::bounded::<Command>(self.channel_capacity);
        let join = std::thread::spawn(move || run_actor(engine, rx));
        FusionActor {
            handle: FusionHandle { tx },
            join,
        }
    }
}

impl Default for ThreadedFusionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

fn run_actor(mut engine: FusionEngine, rx: Receiver<Command>) -> FusionEngine {
    for command in rx {
        match command {
            Command::Submit(frame) => {
                engine.process(&frame);
            }
            Command::Resolve(frame, reply) => {
                let resolved = engine.process(&frame);
                // The requester may have given up waiting; the frame still counts.
                let _ = reply.send(resolved);
            }
            Command::Summary(reply) => {
                let _ = reply.send(engine.summary());
            }
            Command::Shutdown => break,
        }
    }
    engine.finish();
    engine
}

/// Owner of the running actor. Dropping it without [`shutdown`](Self::shutdown)
/// leaves the thread running until every handle is gone.
pub struct FusionActor {
    handle: FusionHandle,
    join: JoinHandle<FusionEngine>,
}

impl FusionActor {
    /// A cloneable sender for camera workers.
    pub fn handle(&self) -> FusionHandle {
        self.handle.clone()
    }

    /// Stops the actor after everything already queued has been processed
    /// and returns the engine, whose state stays queryable.
    pub fn shutdown(self) -> Result<FusionEngine, FusionError> {
        // A send failure means the actor already exited; join reports why.
        let _ = self.handle.tx.send(Command::Shutdown);
        self.join.join().map_err(|_| FusionError::ActorPanicked)
    }
}

/// Cheap, cloneable entry point into the actor.
#[derive(Clone)]
pub struct FusionHandle {
    tx: Sender<Command>,
}

impl FusionHandle {
    /// Queues a frame without waiting for its result.
    pub fn submit(&self, frame: CameraFrame) -> Result<(), FusionError> {
        self.tx
            .send(Command::Submit(frame))
            .map_err(|_| FusionError::Disconnected)
    }

    /// Queues a frame and waits for its resolved tracks.
    pub fn resolve(&self, frame: CameraFrame) -> Result<Vec<ResolvedTrack>, FusionError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(Command::Resolve(frame, reply_tx))
            .map_err(|_| FusionError::Disconnected)?;
        reply_rx.recv().map_err(|_| FusionError::Disconnected)
    }

    /// Snapshot taken after every frame queued before this call.
    pub fn summary(&self) -> Result<AnalyticsSummary, FusionError> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(Command::Summary(reply_tx))
            .map_err(|_| FusionError::Disconnected)?;
        reply_rx.recv().map_err(|_| FusionError::Disconnected)
    }
}
