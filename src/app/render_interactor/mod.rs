// Render interactor - Orchestrates one export or preview action

use std::sync::Arc;

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::OverlayParameters;
use crate::engine::EngineAdapter;
use crate::planner::{CommandBuilder, CommandSpec, SOURCE_FILE, WATERMARK_FILE};
use crate::ports::*;

/// Everything one render action needs, captured at trigger time
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub mode: RenderMode,
    pub source: SourceAsset,
    pub overlay: OverlayAsset,
    pub settings: OverlaySettings,
    /// Trim window; required for export, ignored for preview
    pub window: Option<AbsoluteRange>,
}

/// Interactor for the export and preview use cases
pub struct RenderInteractor {
    adapter: EngineAdapter,
    log_port: Arc<dyn LogPort>,
}

impl RenderInteractor {
    /// Create new render interactor with injected ports
    pub fn new(engine: Arc<dyn EnginePort>, log_port: Arc<dyn LogPort>) -> Self {
        Self {
            adapter: EngineAdapter::new(engine),
            log_port,
        }
    }

    pub fn adapter(&self) -> &EngineAdapter {
        &self.adapter
    }

    /// Build the engine command for a request without running it
    pub fn plan(request: &RenderRequest) -> Result<CommandSpec, DomainError> {
        let units = OverlayParameters::to_engine_units(&request.settings);
        match request.mode {
            RenderMode::Export => {
                let window = request.window.as_ref().ok_or_else(|| {
                    DomainError::AssetMissing("source duration not known yet".to_string())
                })?;
                Ok(CommandBuilder::build_export_command(window, &units))
            }
            RenderMode::Preview => Ok(CommandBuilder::build_preview_command(&units)),
        }
    }

    /// Run one action end to end. Engine files are released on every path.
    pub async fn render(&self, request: RenderRequest) -> Result<Artifact, DomainError> {
        let spec = Self::plan(&request)?;

        self.log_port
            .info(&format!(
                "Starting {} of {} with watermark {}",
                request.mode, request.source.name, request.overlay.name
            ))
            .await;

        let result = self.run(&spec, &request).await;
        self.adapter.release().await;

        match result {
            Ok(data) => {
                let artifact = Artifact::for_mode(request.mode, data);
                self.log_port
                    .info(&format!(
                        "{} finished: {} bytes of {}",
                        request.mode,
                        artifact.len(),
                        artifact.mime_type
                    ))
                    .await;
                Ok(artifact)
            }
            Err(err) => {
                self.log_port
                    .error(&format!("{} failed: {}", request.mode, err))
                    .await;
                if let Some(diagnostics) = err.diagnostics() {
                    self.log_port
                        .debug(&format!("Engine diagnostics:\n{}", diagnostics))
                        .await;
                }
                Err(err)
            }
        }
    }

    async fn run(&self, spec: &CommandSpec, request: &RenderRequest) -> Result<Vec<u8>, DomainError> {
        self.adapter
            .materialize(SOURCE_FILE, &request.source.data)
            .await?;
        self.adapter
            .materialize(WATERMARK_FILE, &request.overlay.data)
            .await?;

        self.log_port
            .debug(&format!("Engine command: {}", spec.display_line()))
            .await;
        self.adapter.execute(spec).await?;

        self.adapter.retrieve(&spec.output).await
    }
}
