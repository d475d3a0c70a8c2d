use std::sync::Arc;

use crate::adapters::{FFprobeAdapter, FfmpegProcessEngine, TracingLogAdapter};
use crate::app::render_interactor::RenderInteractor;
use crate::config_initialization::AppSettings;
use crate::domain::errors::DomainError;
use crate::engine::Subscription;
use crate::ports::{EngineLoadConfig, EnginePort, LogPort, ProbePort};

pub trait AppContainer: Send + Sync {
    fn render_interactor(&self) -> Arc<RenderInteractor>;
    fn probe_port(&self) -> Arc<dyn ProbePort>;
    fn engine(&self) -> Arc<dyn EnginePort>;
}

pub struct DefaultAppContainer {
    engine: Arc<dyn EnginePort>,
    probe_port: Arc<dyn ProbePort>,
    render_interactor: Arc<RenderInteractor>,
    load_config: EngineLoadConfig,
    _engine_log: Subscription,
}

impl DefaultAppContainer {
    /// Wire the ffmpeg process engine and ffprobe from resolved settings
    pub fn new(settings: &AppSettings) -> Self {
        let engine = Arc::new(FfmpegProcessEngine::new());
        let probe_port = Arc::new(FFprobeAdapter::new(settings.ffprobe_path.clone()));
        Self::with_ports(
            engine as Arc<dyn EnginePort>,
            probe_port as Arc<dyn ProbePort>,
            settings,
        )
    }

    /// Wire arbitrary engine and probe implementations
    pub fn with_ports(
        engine: Arc<dyn EnginePort>,
        probe_port: Arc<dyn ProbePort>,
        settings: &AppSettings,
    ) -> Self {
        let log_port = Arc::new(TracingLogAdapter::new(settings.log_level));

        // Raw engine output is only interesting at trace level
        let engine_log = engine.events().subscribe_log(|line| {
            tracing::trace!(target: "trimark::engine", "{}", line);
        });

        let render_interactor = Arc::new(RenderInteractor::new(
            Arc::clone(&engine),
            Arc::clone(&log_port) as Arc<dyn LogPort>,
        ));

        Self {
            engine,
            probe_port,
            render_interactor,
            load_config: settings.engine_load_config(),
            _engine_log: engine_log,
        }
    }

    /// Load the engine once; later calls are no-ops
    pub async fn load_engine(&self) -> Result<(), DomainError> {
        if self.engine.is_loaded() {
            return Ok(());
        }
        self.engine.load(&self.load_config).await
    }
}

impl AppContainer for DefaultAppContainer {
    fn render_interactor(&self) -> Arc<RenderInteractor> {
        Arc::clone(&self.render_interactor)
    }

    fn probe_port(&self) -> Arc<dyn ProbePort> {
        Arc::clone(&self.probe_port)
    }

    fn engine(&self) -> Arc<dyn EnginePort> {
        Arc::clone(&self.engine)
    }
}
