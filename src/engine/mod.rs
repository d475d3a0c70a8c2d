//! Boundary to the external transcoding engine
//!
//! [`EngineAdapter`] is the only component that talks to an [`EnginePort`].
//! One render action is a strict sequence: materialize every input, execute,
//! retrieve the output, release the scope.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::domain::errors::DomainError;
use crate::planner::CommandSpec;
use crate::ports::EnginePort;

pub mod events;
pub mod progress;

pub use events::{EngineEvents, Subscription};
pub use progress::{EngineProgress, ProgressParser};

/// Engine log lines kept as diagnostics for a failed execution
pub const DIAGNOSTIC_TAIL_LINES: usize = 20;

/// Reject names that would escape a flat virtual filesystem
pub fn validate_virtual_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\'])
        || name.contains('\0')
    {
        return Err(DomainError::Configuration(format!(
            "Invalid virtual file name: {:?}",
            name
        )));
    }
    Ok(())
}

/// A virtual file held by the current action
#[derive(Debug, Clone)]
struct ScopedName {
    name: String,
    /// False for outputs the engine may never have written
    written: bool,
}

/// Scoped access to the engine's virtual filesystem and executor
pub struct EngineAdapter {
    engine: Arc<dyn EnginePort>,
    scope: Mutex<Vec<ScopedName>>,
}

impl EngineAdapter {
    pub fn new(engine: Arc<dyn EnginePort>) -> Self {
        Self {
            engine,
            scope: Mutex::new(Vec::new()),
        }
    }

    /// The wrapped engine handle
    pub fn engine(&self) -> &Arc<dyn EnginePort> {
        &self.engine
    }

    /// Write `data` under `name` for the duration of the current action
    pub async fn materialize(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        debug!(name, bytes = data.len(), "Materializing engine input");
        self.engine.write_file(name, data).await?;
        self.track(name, true);
        Ok(())
    }

    /// Run one command. A non-zero exit or engine failure becomes
    /// [`DomainError::Engine`] carrying the tail of the engine log.
    ///
    /// The command's output joins the scope before execution, so a partial
    /// output left by a failed run is released with the inputs.
    pub async fn execute(&self, spec: &CommandSpec) -> Result<(), DomainError> {
        self.ensure_loaded()?;
        self.track(&spec.output, false);

        let captured = Arc::new(Mutex::new(VecDeque::with_capacity(DIAGNOSTIC_TAIL_LINES)));
        let sink = Arc::clone(&captured);
        let subscription = self.engine.events().subscribe_log(move |line| {
            let mut lines = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if lines.len() == DIAGNOSTIC_TAIL_LINES {
                lines.pop_front();
            }
            lines.push_back(line.to_string());
        });

        debug!(mode = %spec.mode, "Executing engine command");
        let result = self.engine.exec(spec.argv()).await;
        drop(subscription);

        let diagnostics = captured
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n");

        match result {
            Ok(0) => Ok(()),
            Ok(code) => Err(DomainError::Engine {
                message: format!("{} command exited with code {}", spec.mode, code),
                diagnostics,
            }),
            Err(DomainError::Engine {
                message,
                diagnostics: own,
            }) => Err(DomainError::Engine {
                message,
                diagnostics: if own.is_empty() { diagnostics } else { own },
            }),
            Err(err) => Err(err),
        }
    }

    /// Read the output of the current action
    pub async fn retrieve(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        self.ensure_loaded()?;
        self.track(name, true);
        let data = self.engine.read_file(name).await?;
        debug!(name, bytes = data.len(), "Retrieved engine output");
        Ok(data)
    }

    /// Delete every file touched by the current action. Failures are logged;
    /// an output that was never written is skipped quietly.
    pub async fn release(&self) {
        let held: Vec<ScopedName> = self.scope().drain(..).collect();
        for ScopedName { name, written } in held {
            match self.engine.delete_file(&name).await {
                Ok(()) => {}
                Err(err) if !written => {
                    debug!(name = %name, error = %err, "Unwritten output not released");
                }
                Err(err) => {
                    warn!(name = %name, error = %err, "Failed to release engine file");
                }
            }
        }
    }

    /// Names currently held by the action scope
    pub fn scoped_names(&self) -> Vec<String> {
        self.scope().iter().map(|held| held.name.clone()).collect()
    }

    fn ensure_loaded(&self) -> Result<(), DomainError> {
        if self.engine.is_loaded() {
            Ok(())
        } else {
            Err(DomainError::engine("engine not loaded"))
        }
    }

    fn track(&self, name: &str, written: bool) {
        let mut scope = self.scope();
        match scope.iter_mut().find(|held| held.name == name) {
            Some(held) => held.written |= written,
            None => scope.push(ScopedName {
                name: name.to_string(),
                written,
            }),
        }
    }

    fn scope(&self) -> MutexGuard<'_, Vec<ScopedName>> {
        self.scope.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
