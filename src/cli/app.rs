//! Interactive session runner

use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::fs;
use tokio::time::timeout;
use tracing::info;

use crate::application::ports::{ArtifactStore, CaptureDevice, ConfigStore, Player, WaveformSink};
use crate::application::{SessionController, SessionSettings};
use crate::domain::config::AppConfig;
use crate::domain::session::RecordingPhase;
use crate::infrastructure::{
    create_capture_device, MemoryArtifactStore, NoOpWaveformSink, RodioPlayer, SparklineSink,
    XdgConfigStore,
};

use super::args::SessionOptions;
use super::commands::{SessionCommand, HELP_LINES};
use super::presenter::Presenter;
use super::signals::{InputEvent, InputHandler};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// How often the status line is redrawn while a recording is active
const STATUS_REFRESH: StdDuration = StdDuration::from_millis(100);

/// What the loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Everything a command needs besides the session itself
pub struct CommandContext<'a, P: Player> {
    pub presenter: &'a mut Presenter,
    pub player: &'a P,
    pub output_dir: &'a Path,
    pub max_ms: u64,
    pub waveform: Option<&'a SparklineSink>,
}

/// Run the interactive recorder until the user quits
pub async fn run_session(options: SessionOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mut input = match InputHandler::new() {
        Ok(input) => input,
        Err(e) => {
            presenter.error(&format!("Failed to setup signal handler: {}", e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let sparkline = Arc::new(SparklineSink::new(options.waveform_columns));
    let sink: Arc<dyn WaveformSink> = if options.waveform {
        sparkline.clone()
    } else {
        Arc::new(NoOpWaveformSink)
    };
    let settings = SessionSettings {
        format: options.format,
        frame_interval: options.frame_interval,
        ..Default::default()
    };
    let mut session = SessionController::new(
        create_capture_device(options.block_size),
        MemoryArtifactStore::new(),
        sink,
        settings,
    );
    let player = RodioPlayer::new();

    let mut ctx = CommandContext {
        presenter: &mut presenter,
        player: &player,
        output_dir: &options.output_dir,
        max_ms: options.max_duration.as_millis(),
        waveform: options.waveform.then_some(&*sparkline),
    };

    ctx.presenter.info(&format!(
        "Format: {} | Output: {} | Type 'help' for commands",
        options.format,
        options.output_dir.display()
    ));
    info!(format = %options.format, max_ms = ctx.max_ms, "session ready");

    if options.start_immediately {
        execute(&mut session, SessionCommand::Start, &mut ctx).await;
    }

    let ok = session_loop(&mut session, &mut input, &mut ctx).await;
    ctx.presenter.stop_spinner();

    if ok {
        ExitCode::from(EXIT_SUCCESS)
    } else {
        ExitCode::from(EXIT_ERROR)
    }
}

async fn session_loop<D, A, P>(
    session: &mut SessionController<D, A>,
    input: &mut InputHandler,
    ctx: &mut CommandContext<'_, P>,
) -> bool
where
    D: CaptureDevice,
    A: ArtifactStore,
    P: Player,
{
    loop {
        session.pump();
        let phase = session.phase();

        if phase == RecordingPhase::Recording && session.elapsed_ms() >= ctx.max_ms {
            ctx.presenter.warn("Max duration reached, auto-stopping");
            execute(session, SessionCommand::Stop, ctx).await;
            continue;
        }

        let event = if phase == RecordingPhase::Idle {
            input.recv().await
        } else {
            refresh_status(session, ctx);
            match timeout(STATUS_REFRESH, input.recv()).await {
                Ok(event) => event,
                Err(_) => continue,
            }
        };

        match event {
            Some(InputEvent::Line(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(command) => {
                        if execute(session, command, ctx).await == Flow::Quit {
                            return finish(session, ctx).await;
                        }
                    }
                    Err(e) => ctx.presenter.error(&e.to_string()),
                }
            }
            Some(InputEvent::Interrupt) => {
                ctx.presenter.warn("Interrupted");
                return finish(session, ctx).await;
            }
            Some(InputEvent::Closed) | None => return finish(session, ctx).await,
        }
    }
}

fn refresh_status<D, A, P>(session: &SessionController<D, A>, ctx: &mut CommandContext<'_, P>)
where
    D: CaptureDevice,
    A: ArtifactStore,
    P: Player,
{
    let waveform = ctx.waveform.map(SparklineSink::line);
    let line =
        ctx.presenter
            .format_status_line(&session.snapshot(), ctx.max_ms, waveform.as_deref());
    ctx.presenter.show_recording(&line);
}

/// Stop and keep an in-progress recording before exiting
async fn finish<D, A, P>(
    session: &mut SessionController<D, A>,
    ctx: &mut CommandContext<'_, P>,
) -> bool
where
    D: CaptureDevice,
    A: ArtifactStore,
    P: Player,
{
    if session.phase() == RecordingPhase::Idle {
        return true;
    }
    execute(session, SessionCommand::Stop, ctx).await;
    save(session, None, ctx).await.is_some()
}

/// Run one command against the session
pub async fn execute<D, A, P>(
    session: &mut SessionController<D, A>,
    command: SessionCommand,
    ctx: &mut CommandContext<'_, P>,
) -> Flow
where
    D: CaptureDevice,
    A: ArtifactStore,
    P: Player,
{
    match command {
        SessionCommand::Start => match session.start().await {
            Ok(()) => refresh_status(session, ctx),
            Err(e) => ctx.presenter.error(&format!("Failed to start recording: {}", e)),
        },
        SessionCommand::Pause => match session.pause() {
            Ok(()) => refresh_status(session, ctx),
            Err(e) => ctx.presenter.error(&e.to_string()),
        },
        SessionCommand::Resume => match session.resume() {
            Ok(()) => refresh_status(session, ctx),
            Err(e) => ctx.presenter.error(&e.to_string()),
        },
        SessionCommand::Stop => match session.stop().await {
            Ok(handle) => {
                let snapshot = session.snapshot();
                ctx.presenter.spinner_success(&format!(
                    "Recorded {} ({} bytes, {})",
                    snapshot.elapsed_label,
                    handle.size_bytes(),
                    handle.mime_type()
                ));
                ctx.presenter
                    .info("Type 'save' to keep it, 'play' to listen, 'rerecord' to start over");
            }
            Err(e) if session.phase() == RecordingPhase::Idle => {
                ctx.presenter.spinner_fail(&e.to_string());
            }
            Err(e) => ctx.presenter.error(&e.to_string()),
        },
        SessionCommand::Clear => match session.clear() {
            Ok(()) => ctx.presenter.success("Recording discarded"),
            Err(e) => ctx.presenter.error(&e.to_string()),
        },
        SessionCommand::ReRecord => match session.re_record().await {
            Ok(()) => refresh_status(session, ctx),
            Err(e) => ctx.presenter.error(&e.to_string()),
        },
        SessionCommand::Format(format) => {
            if session.set_format(format) {
                ctx.presenter.success(&format!("Format set to {}", format));
            } else {
                ctx.presenter
                    .warn("The format can only be changed while no recording is active");
            }
        }
        SessionCommand::Save(path) => {
            let _ = save(session, path, ctx).await;
        }
        SessionCommand::Play => match session.artifact_data() {
            Some(audio) => {
                ctx.presenter.info("Playing...");
                if let Err(e) = ctx.player.play(audio).await {
                    ctx.presenter.error(&e.to_string());
                }
            }
            None => ctx.presenter.error("No recording to play"),
        },
        SessionCommand::Status => ctx.presenter.session_status(&session.snapshot()),
        SessionCommand::Help => ctx.presenter.help(HELP_LINES),
        SessionCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Write the current artifact to disk, returning where it went.
/// Failures are reported through the presenter.
async fn save<D, A, P>(
    session: &SessionController<D, A>,
    path: Option<PathBuf>,
    ctx: &mut CommandContext<'_, P>,
) -> Option<PathBuf>
where
    D: CaptureDevice,
    A: ArtifactStore,
    P: Player,
{
    let (Some(handle), Some(audio)) = (session.artifact(), session.artifact_data()) else {
        ctx.presenter.error("No recording to save");
        return None;
    };

    let path = path.unwrap_or_else(|| ctx.output_dir.join(handle.suggested_filename()));
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            ctx.presenter
                .error(&format!("Failed to create {}: {}", parent.display(), e));
            return None;
        }
    }

    match fs::write(&path, audio.data()).await {
        Ok(()) => {
            ctx.presenter.success(&format!(
                "Saved {} ({})",
                path.display(),
                audio.human_readable_size()
            ));
            Some(path)
        }
        Err(e) => {
            ctx.presenter
                .error(&format!("Failed to write {}: {}", path.display(), e));
            None
        }
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    let env_config = AppConfig {
        format: env::var("VOICE_MEMO_FORMAT").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}
