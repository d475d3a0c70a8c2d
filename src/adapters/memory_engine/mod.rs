//! In-process engine with a scripted executor
//!
//! Keeps the virtual filesystem in a map and records every executed
//! argument vector. Used by tests and dry runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::errors::DomainError;
use crate::engine::{validate_virtual_name, EngineEvents, EngineProgress};
use crate::ports::{EngineLoadConfig, EnginePort};

/// What the next executions do
#[derive(Debug, Clone, PartialEq)]
pub enum ExecBehavior {
    /// Write `output` to the command's last argument and exit with 0
    Succeed { output: Vec<u8> },
    /// Print `log` lines and exit with `code`, writing nothing
    ExitCode { code: i32, log: Vec<String> },
    /// Write `output` to the last argument, then exit with `code`
    PartialOutput { output: Vec<u8>, code: i32 },
    /// Print `log` lines, then throw instead of completing
    Fail { message: String, log: Vec<String> },
}

impl Default for ExecBehavior {
    fn default() -> Self {
        ExecBehavior::Succeed {
            output: b"rendered".to_vec(),
        }
    }
}

/// Engine double backed by memory
#[derive(Default)]
pub struct InMemoryEngine {
    loaded: AtomicBool,
    load_config: Mutex<Option<EngineLoadConfig>>,
    files: Mutex<HashMap<String, Vec<u8>>>,
    executions: Mutex<Vec<Vec<String>>>,
    behavior: Mutex<ExecBehavior>,
    events: EngineEvents,
}

impl InMemoryEngine {
    /// Unloaded engine
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that is already loaded with the default configuration
    pub fn loaded() -> Self {
        let engine = Self::new();
        *lock(&engine.load_config) = Some(EngineLoadConfig::default());
        engine.loaded.store(true, Ordering::SeqCst);
        engine
    }

    pub fn with_behavior(self, behavior: ExecBehavior) -> Self {
        self.set_behavior(behavior);
        self
    }

    pub fn set_behavior(&self, behavior: ExecBehavior) {
        *lock(&self.behavior) = behavior;
    }

    /// Every argument vector executed so far
    pub fn executions(&self) -> Vec<Vec<String>> {
        lock(&self.executions).clone()
    }

    /// Names present in the virtual filesystem, sorted
    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = lock(&self.files).keys().cloned().collect();
        names.sort();
        names
    }

    pub fn file(&self, name: &str) -> Option<Vec<u8>> {
        lock(&self.files).get(name).cloned()
    }

    pub fn load_config(&self) -> Option<EngineLoadConfig> {
        lock(&self.load_config).clone()
    }

    fn missing_inputs(&self, args: &[String]) -> Vec<String> {
        let files = lock(&self.files);
        args.windows(2)
            .filter(|pair| pair[0] == "-i")
            .map(|pair| pair[1].clone())
            .filter(|input| !files.contains_key(input))
            .collect()
    }
}

#[async_trait]
impl EnginePort for InMemoryEngine {
    async fn load(&self, config: &EngineLoadConfig) -> Result<(), DomainError> {
        *lock(&self.load_config) = Some(config.clone());
        self.loaded.store(true, Ordering::SeqCst);
        self.events.emit_log("in-memory engine loaded");
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        validate_virtual_name(name)?;
        lock(&self.files).insert(name.to_string(), data.to_vec());
        Ok(())
    }

    async fn exec(&self, args: &[String]) -> Result<i32, DomainError> {
        lock(&self.executions).push(args.to_vec());

        let missing = self.missing_inputs(args);
        if !missing.is_empty() {
            for input in &missing {
                self.events
                    .emit_log(&format!("{}: No such file or directory", input));
            }
            return Ok(1);
        }

        let behavior = lock(&self.behavior).clone();
        match behavior {
            ExecBehavior::Succeed { output } => {
                self.events.emit_log("  Duration: 00:00:10.00, start: 0.000000");
                self.events
                    .emit_progress(&EngineProgress { ratio: 1.0, time: 10.0 });
                if let Some(target) = args.last() {
                    validate_virtual_name(target)?;
                    lock(&self.files).insert(target.clone(), output);
                }
                Ok(0)
            }
            ExecBehavior::ExitCode { code, log } => {
                for line in &log {
                    self.events.emit_log(line);
                }
                Ok(code)
            }
            ExecBehavior::PartialOutput { output, code } => {
                if let Some(target) = args.last() {
                    validate_virtual_name(target)?;
                    lock(&self.files).insert(target.clone(), output);
                }
                self.events.emit_log("Conversion failed!");
                Ok(code)
            }
            ExecBehavior::Fail { message, log } => {
                for line in &log {
                    self.events.emit_log(line);
                }
                Err(DomainError::engine(message))
            }
        }
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        lock(&self.files).get(name).cloned().ok_or_else(|| {
            DomainError::engine(format!("{}: No such file in virtual filesystem", name))
        })
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        match lock(&self.files).remove(name) {
            Some(_) => Ok(()),
            None => Err(DomainError::engine(format!(
                "{}: No such file in virtual filesystem",
                name
            ))),
        }
    }

    fn events(&self) -> &EngineEvents {
        &self.events
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
