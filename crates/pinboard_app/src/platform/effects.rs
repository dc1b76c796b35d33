use std::num::NonZeroUsize;

use engine_logging::{engine_info, engine_warn};
use pinboard_core::{Effect, Mode, Msg, RunRequest, RunResultKind};
use pinboard_engine::{BoardTarget, EngineEvent, EngineHandle, RunOutcome, ScanMode};

/// Applies core effects to the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle) -> Self {
        Self { engine }
    }

    /// Runs effects, returning any messages that must be fed back immediately.
    pub fn apply(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut feedback = Vec::new();
        for effect in effects {
            match effect {
                Effect::StartRun(request) => match to_target(request) {
                    Ok(target) => {
                        engine_info!("StartRun url={} max={}", target.url, target.max_items);
                        self.engine.start(target);
                    }
                    Err(detail) => {
                        engine_warn!("Run rejected before start: {}", detail);
                        feedback.push(Msg::StatusReported(format!("Error: {detail}")));
                        feedback.push(Msg::RunFinished(RunResultKind::Failed(detail)));
                    }
                },
                Effect::PauseRun => self.engine.pause(),
                Effect::ResumeRun => self.engine.resume(),
                Effect::StopRun => self.engine.stop(),
            }
        }
        feedback
    }

    /// Drains every engine event queued so far.
    pub fn drain_events(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(map_event)
            .collect()
    }
}

fn to_target(request: RunRequest) -> Result<BoardTarget, String> {
    let max_items = NonZeroUsize::new(request.max_items)
        .ok_or_else(|| "pin count must be at least 1".to_string())?;
    let target = BoardTarget {
        url: request.url,
        max_items,
        destination: request.destination,
        mode: map_mode(request.mode),
    };
    target.validate().map_err(|err| err.to_string())?;
    Ok(target)
}

fn map_mode(mode: Mode) -> ScanMode {
    match mode {
        Mode::FastLimit => ScanMode::FastLimit,
        Mode::StrictBoardOnly => ScanMode::StrictBoardOnly,
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::Status(status) => Msg::StatusReported(status),
        EngineEvent::ItemAdded(item) => Msg::ItemDownloaded {
            source_url: item.source_url,
            file_name: item.file_name,
        },
        EngineEvent::Paused => Msg::EnginePaused,
        EngineEvent::Resumed => Msg::EngineResumed,
        EngineEvent::RunFinished(outcome) => Msg::RunFinished(map_outcome(outcome)),
    }
}

fn map_outcome(outcome: RunOutcome) -> RunResultKind {
    match outcome {
        RunOutcome::Completed { saved, .. } => RunResultKind::Completed { saved },
        RunOutcome::NoImages => RunResultKind::NoImages,
        RunOutcome::Cancelled => RunResultKind::Cancelled,
        RunOutcome::Failed(detail) => RunResultKind::Failed(detail),
    }
}
