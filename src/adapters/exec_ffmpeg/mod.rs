//! FFmpeg process engine
//!
//! Runs a native `ffmpeg` binary. A private temporary directory stands in
//! for the engine's virtual filesystem and is removed when the engine is
//! dropped.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::domain::errors::DomainError;
use crate::engine::{validate_virtual_name, EngineEvents, ProgressParser};
use crate::ports::{EngineLoadConfig, EnginePort};

struct LoadedEngine {
    workdir: TempDir,
    binary: PathBuf,
    threads: usize,
}

/// Engine backed by an `ffmpeg` child process per execution
#[derive(Default)]
pub struct FfmpegProcessEngine {
    state: Mutex<Option<LoadedEngine>>,
    events: EngineEvents,
}

impl FfmpegProcessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory backing the virtual filesystem, once loaded
    pub fn workdir(&self) -> Option<PathBuf> {
        self.state().as_ref().map(|s| s.workdir.path().to_path_buf())
    }

    fn state(&self) -> MutexGuard<'_, Option<LoadedEngine>> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn loaded_paths(&self) -> Result<(PathBuf, PathBuf, usize), DomainError> {
        self.state()
            .as_ref()
            .map(|s| (s.workdir.path().to_path_buf(), s.binary.clone(), s.threads))
            .ok_or_else(|| DomainError::engine("engine not loaded"))
    }

    fn resolve(&self, name: &str) -> Result<PathBuf, DomainError> {
        validate_virtual_name(name)?;
        let (workdir, _, _) = self.loaded_paths()?;
        Ok(workdir.join(name))
    }

    /// Full argument vector for the child process. `-threads` goes right
    /// before the output file so it applies to encoding.
    fn process_args(args: &[String], threads: usize) -> Vec<String> {
        let mut full: Vec<String> = ["-hide_banner", "-nostdin", "-nostats", "-progress", "pipe:2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let (output, options) = match args.split_last() {
            Some((output, options)) => (Some(output), options),
            None => (None, args),
        };
        full.extend(options.iter().cloned());
        full.push("-threads".to_string());
        full.push(threads.to_string());
        full.extend(output.cloned());
        full
    }

    /// Length of the `-ss`/`-to` window, when the command has one
    fn trim_window_length(args: &[String]) -> Option<f64> {
        let value_of = |flag: &str| {
            args.windows(2)
                .find(|pair| pair[0] == flag)
                .and_then(|pair| pair[1].parse::<f64>().ok())
        };
        let start = value_of("-ss").unwrap_or(0.0);
        let end = value_of("-to")?;
        Some(end - start)
    }
}

#[async_trait]
impl EnginePort for FfmpegProcessEngine {
    async fn load(&self, config: &EngineLoadConfig) -> Result<(), DomainError> {
        let output = Command::new(&config.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                DomainError::engine(format!(
                    "Failed to start engine binary {}: {}",
                    config.binary.display(),
                    e
                ))
            })?;

        let banner = String::from_utf8_lossy(&output.stdout);
        let version = banner.lines().next().unwrap_or_default().to_string();
        if !output.status.success() {
            return Err(DomainError::Engine {
                message: format!("{} -version failed", config.binary.display()),
                diagnostics: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        let workdir = tempfile::Builder::new()
            .prefix("trimark-vfs-")
            .tempdir()
            .map_err(|e| DomainError::engine(format!("Failed to create virtual filesystem: {}", e)))?;

        let threads = config.threading.thread_count();
        info!(
            version = %version,
            threads,
            workdir = %workdir.path().display(),
            "Engine loaded"
        );
        self.events.emit_log(&version);

        *self.state() = Some(LoadedEngine {
            workdir,
            binary: config.binary.clone(),
            threads,
        });
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.state().is_some()
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::write(&path, data)
            .await
            .map_err(|e| DomainError::engine(format!("Failed to write {}: {}", name, e)))
    }

    async fn exec(&self, args: &[String]) -> Result<i32, DomainError> {
        let (workdir, binary, threads) = self.loaded_paths()?;

        let mut child = Command::new(&binary)
            .args(Self::process_args(args, threads))
            .current_dir(&workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DomainError::engine(format!("Failed to spawn engine: {}", e)))?;

        let mut parser = match Self::trim_window_length(args) {
            Some(length) => ProgressParser::with_total(length),
            None => ProgressParser::new(),
        };

        if let Some(stderr) = child.stderr.take() {
            let mut lines = BufReader::new(stderr).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .map_err(|e| DomainError::engine(format!("Failed to read engine log: {}", e)))?
            {
                if let Some(progress) = parser.feed(&line) {
                    self.events.emit_progress(&progress);
                }
                self.events.emit_log(&line);
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DomainError::engine(format!("Engine process failed: {}", e)))?;
        let code = status.code().unwrap_or(-1);
        debug!(code, "Engine process exited");
        Ok(code)
    }

    async fn read_file(&self, name: &str) -> Result<Vec<u8>, DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| DomainError::engine(format!("Failed to read {}: {}", name, e)))
    }

    async fn delete_file(&self, name: &str) -> Result<(), DomainError> {
        let path = self.resolve(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| DomainError::engine(format!("Failed to delete {}: {}", name, e)))
    }

    fn events(&self) -> &EngineEvents {
        &self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trim_window_length() {
        let with_window = args(&["-i", "input.mp4", "-ss", "5", "-to", "12", "-y", "output.mp4"]);
        assert_eq!(FfmpegProcessEngine::trim_window_length(&with_window), Some(7.0));

        let preview = args(&["-i", "input.mp4", "-vframes", "1", "first_frame.png"]);
        assert_eq!(FfmpegProcessEngine::trim_window_length(&preview), None);
    }

    #[test]
    fn test_threads_precede_output_file() {
        let preview = args(&["-i", "input.mp4", "-i", "watermark.jpg", "-vframes", "1", "first_frame.png"]);
        let full = FfmpegProcessEngine::process_args(&preview, 4);

        assert_eq!(&full[..5], &args(&["-hide_banner", "-nostdin", "-nostats", "-progress", "pipe:2"])[..]);
        assert_eq!(
            &full[full.len() - 3..],
            &args(&["-threads", "4", "first_frame.png"])[..]
        );
        let first_input = full.iter().position(|a| a == "-i").unwrap();
        let threads = full.iter().position(|a| a == "-threads").unwrap();
        assert!(threads > first_input);
    }

    #[tokio::test]
    async fn test_unloaded_engine_rejects_io() {
        let engine = FfmpegProcessEngine::new();
        assert!(!engine.is_loaded());
        assert!(engine.write_file("input.mp4", b"data").await.is_err());
        assert!(engine.exec(&args(&["-version"])).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_load() {
        let engine = FfmpegProcessEngine::new();
        let config = EngineLoadConfig {
            binary: PathBuf::from("/nonexistent/trimark-ffmpeg"),
            ..EngineLoadConfig::default()
        };
        let err = engine.load(&config).await.unwrap_err();
        assert!(matches!(err, DomainError::Engine { .. }));
        assert!(!engine.is_loaded());
    }
}
