use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use engine_logging::{engine_debug, engine_info};
use log::LevelFilter;
use pinboard_core::{update, AppState, Msg, RunResultKind, SessionState};
use pinboard_engine::EngineHandle;

use super::cli::{parse_command, Args};
use super::config::load_engine_config;
use super::effects::EffectRunner;
use super::render::{summary, Renderer};

const TICK_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app(args: Args) -> Result<ExitCode> {
    engine_logging::initialize(args.log.into(), LevelFilter::Info);

    let config = load_engine_config(args.config.as_deref())?;
    let engine = EngineHandle::new(config).context("failed to start the engine")?;
    let mut shell = Shell::new(EffectRunner::new(engine), io::stdout());

    for msg in args.form_messages() {
        shell.dispatch(msg)?;
    }
    shell.dispatch(Msg::StartClicked)?;
    if shell.state.session() == SessionState::Idle {
        // Start was refused; the status line says why.
        return Ok(ExitCode::FAILURE);
    }

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    spawn_ticker(msg_tx.clone());
    spawn_stdin_reader(msg_tx);

    while let Ok(msg) = msg_rx.recv() {
        if matches!(msg, Msg::Tick) {
            for event in shell.runner.drain_events() {
                shell.dispatch(event)?;
            }
        } else {
            shell.dispatch(msg)?;
        }
        if let Some(result) = shell.finished() {
            return shell.finish(&result);
        }
    }
    Ok(ExitCode::FAILURE)
}

struct Shell<W: Write> {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer<W>,
}

impl<W: Write> Shell<W> {
    fn new(runner: EffectRunner, out: W) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(out),
        }
    }

    fn dispatch(&mut self, msg: Msg) -> Result<()> {
        let mut pending = vec![msg];
        while let Some(msg) = pending.pop() {
            let state = std::mem::take(&mut self.state);
            let (state, effects) = update(state, msg);
            self.state = state;
            let mut feedback = self.runner.apply(effects);
            feedback.reverse();
            pending.extend(feedback);
            if self.state.consume_dirty() {
                self.renderer
                    .render(&self.state.view())
                    .context("failed to write to stdout")?;
            }
        }
        Ok(())
    }

    fn finished(&self) -> Option<RunResultKind> {
        if self.state.session() != SessionState::Idle {
            return None;
        }
        self.state.view().last_result
    }

    fn finish(self, result: &RunResultKind) -> Result<ExitCode> {
        let items = self.state.view().items.len();
        let mut out = self.renderer.into_inner();
        writeln!(out, "{}", summary(result, items)).context("failed to write to stdout")?;
        engine_info!("Run finished: {:?}", result);
        Ok(match result {
            RunResultKind::Failed(_) => ExitCode::FAILURE,
            _ => ExitCode::SUCCESS,
        })
    }
}

fn spawn_ticker(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while msg_tx.send(Msg::Tick).is_ok() {
            thread::sleep(TICK_INTERVAL);
        }
    });
}

fn spawn_stdin_reader(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(|line| line.ok()) {
            match parse_command(&line) {
                Some(msg) => {
                    if msg_tx.send(msg).is_err() {
                        break;
                    }
                }
                None => engine_debug!("Ignoring console input {:?}", line),
            }
        }
    });
}
