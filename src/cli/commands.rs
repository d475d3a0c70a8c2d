//! Command implementations

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::app::{AppContainer, DefaultAppContainer, EditorSession, RenderInteractor};
use crate::cli::args::{ExportArgs, OverlayArgs, PlanArgs, PreviewArgs};
use crate::config_initialization::AppSettings;
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::OverlayParameters;
use crate::output::ArtifactWriter;
use crate::planner::{CommandBuilder, CommandSpec};
use crate::utils::format_file_size;
use crate::utils::logging::ProgressReporter;
use crate::utils::time::TimeParser;

/// Execute the export command
pub async fn export(
    container: &DefaultAppContainer,
    settings: &AppSettings,
    args: ExportArgs,
    overwrite: bool,
) -> Result<()> {
    let mut session = EditorSession::with_settings(overlay_settings(settings, &args.overlay)?);
    load_assets(&mut session, &args.input, &args.watermark).await?;

    let duration = match &args.duration {
        Some(raw) => parse_duration(raw)?,
        None => container
            .probe_port()
            .probe_duration(&args.input)
            .await
            .with_context(|| format!("Failed to probe duration of {}", args.input))?,
    };
    session.on_duration_known(duration);
    session.set_range(args.range.from, args.range.to);
    if let Some(window) = session.absolute_range() {
        info!("Exporting {} of {}", window, duration);
    }

    container
        .load_engine()
        .await
        .context("Failed to load ffmpeg")?;
    let interactor = container.render_interactor();
    let artifact = with_progress(&interactor, "Export", session.export(&interactor))
        .await
        .context("Export failed")?;

    let output = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&settings.export_file_name));
    write_artifact(&artifact, &output, overwrite)
}

/// Execute the preview command
pub async fn preview(
    container: &DefaultAppContainer,
    settings: &AppSettings,
    args: PreviewArgs,
    overwrite: bool,
) -> Result<()> {
    let mut session = EditorSession::with_settings(overlay_settings(settings, &args.overlay)?);
    load_assets(&mut session, &args.input, &args.watermark).await?;

    container
        .load_engine()
        .await
        .context("Failed to load ffmpeg")?;
    let interactor = container.render_interactor();
    let preview = with_progress(&interactor, "Preview", session.open_preview(&interactor))
        .await
        .context("Preview failed")?;

    let output = args
        .output
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&settings.preview_file_name));
    write_artifact(preview.artifact(), &output, overwrite)?;
    preview.dismiss();
    Ok(())
}

/// Execute the plan command
pub fn plan(settings: &AppSettings, args: PlanArgs) -> Result<()> {
    let spec = plan_command(settings, &args)?;

    if args.json {
        let json = serde_json::to_string_pretty(&spec).context("Failed to serialize command")?;
        println!("{}", json);
    } else {
        println!("ffmpeg {}", spec.display_line());
    }
    Ok(())
}

/// Build the command a `plan` invocation describes
pub fn plan_command(settings: &AppSettings, args: &PlanArgs) -> Result<CommandSpec> {
    let units = OverlayParameters::to_engine_units(&overlay_settings(settings, &args.overlay)?);
    if args.preview {
        return Ok(CommandBuilder::build_preview_command(&units));
    }

    let raw = args
        .duration
        .as_deref()
        .ok_or_else(|| DomainError::BadArgs("--duration is required to plan an export".to_string()))?;
    let duration = parse_duration(raw)?;

    let mut selection = SelectionState::new();
    selection.set_range(args.range.from, args.range.to);
    let window = selection.absolute_range(duration)?;
    Ok(CommandBuilder::build_export_command(&window, &units))
}

fn overlay_settings(settings: &AppSettings, args: &OverlayArgs) -> Result<OverlaySettings> {
    let defaults = settings.default_overlay;
    let overlay = OverlaySettings::new(
        args.transparency.unwrap_or(defaults.transparency),
        args.scale.unwrap_or(defaults.scale),
    )?;
    Ok(overlay)
}

fn parse_duration(raw: &str) -> Result<MediaDuration> {
    let seconds = TimeParser::parse_time(raw)?;
    Ok(MediaDuration::from_seconds(seconds)?)
}

async fn load_assets(session: &mut EditorSession, input: &str, watermark: &str) -> Result<()> {
    let source = tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read source video {}", input))?;
    session.load_source(SourceAsset::new(display_name(input), source));

    let overlay = tokio::fs::read(watermark)
        .await
        .with_context(|| format!("Failed to read watermark image {}", watermark))?;
    session.set_overlay(OverlayAsset::new(display_name(watermark), overlay));
    Ok(())
}

fn display_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Drive a render while logging engine progress
async fn with_progress<F, T>(interactor: &RenderInteractor, operation: &str, render: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    let reporter = Arc::new(Mutex::new(ProgressReporter::new(operation)));
    let listener = Arc::clone(&reporter);
    let subscription = interactor
        .adapter()
        .engine()
        .events()
        .subscribe_progress(move |progress| {
            listener
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .update(progress);
        });

    let result = render.await;
    subscription.unsubscribe();

    reporter
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .finish(result.is_ok());
    if let Err(err) = &result {
        if let Some(diagnostics) = err.diagnostics() {
            error!("ffmpeg output:\n{}", diagnostics);
        }
    }
    result
}

fn write_artifact(artifact: &Artifact, output: &Path, overwrite: bool) -> Result<()> {
    let written = ArtifactWriter::write(artifact, output, overwrite)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!(
        "{} ({}, {})",
        written.display(),
        format_file_size(artifact.len() as u64),
        artifact.mime_type
    );
    Ok(())
}
