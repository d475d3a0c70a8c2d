//! Integration tests for the engine adapter against the in-memory engine

use std::sync::Arc;

use trimark_cli::adapters::{ExecBehavior, InMemoryEngine};
use trimark_cli::domain::model::{AbsoluteRange, EngineUnits, RenderMode};
use trimark_cli::engine::EngineAdapter;
use trimark_cli::planner::{CommandBuilder, CommandSpec, EXPORT_OUTPUT_FILE, SOURCE_FILE, WATERMARK_FILE};
use trimark_cli::ports::EnginePort;
use trimark_cli::DomainError;

// Test utilities

fn units() -> EngineUnits {
    EngineUnits {
        opacity: "0.50".to_string(),
        scale_factor: "1.00".to_string(),
    }
}

fn export_spec() -> CommandSpec {
    let window = AbsoluteRange::new(2.0, 8.0).unwrap();
    CommandBuilder::build_export_command(&window, &units())
}

async fn materialize_inputs(adapter: &EngineAdapter) {
    adapter.materialize(SOURCE_FILE, b"video").await.unwrap();
    adapter.materialize(WATERMARK_FILE, b"image").await.unwrap();
}

// Lifecycle

#[tokio::test]
async fn test_successful_action_releases_every_name() {
    let engine = Arc::new(InMemoryEngine::loaded());
    let adapter = EngineAdapter::new(engine.clone());

    materialize_inputs(&adapter).await;
    adapter.execute(&export_spec()).await.unwrap();
    let data = adapter.retrieve(EXPORT_OUTPUT_FILE).await.unwrap();
    assert_eq!(data, b"rendered");
    assert_eq!(adapter.scoped_names().len(), 3);

    adapter.release().await;

    assert!(adapter.scoped_names().is_empty());
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_failed_action_still_releases_inputs() {
    let engine = Arc::new(InMemoryEngine::loaded().with_behavior(ExecBehavior::ExitCode {
        code: 1,
        log: vec!["Invalid data found when processing input".to_string()],
    }));
    let adapter = EngineAdapter::new(engine.clone());

    materialize_inputs(&adapter).await;
    let err = adapter.execute(&export_spec()).await.unwrap_err();
    adapter.release().await;

    match err {
        DomainError::Engine { message, diagnostics } => {
            assert!(message.contains("exited with code 1"));
            assert!(diagnostics.contains("Invalid data found"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_engine_failure_gets_captured_log() {
    let engine = Arc::new(InMemoryEngine::loaded().with_behavior(ExecBehavior::Fail {
        message: "engine aborted".to_string(),
        log: vec!["Out of memory".to_string()],
    }));
    let adapter = EngineAdapter::new(engine.clone());

    materialize_inputs(&adapter).await;
    let err = adapter.execute(&export_spec()).await.unwrap_err();
    adapter.release().await;

    match err {
        DomainError::Engine { message, diagnostics } => {
            assert_eq!(message, "engine aborted");
            assert_eq!(diagnostics, "Out of memory");
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_partial_output_released_after_failed_run() {
    let engine = Arc::new(InMemoryEngine::loaded().with_behavior(ExecBehavior::PartialOutput {
        output: b"truncated".to_vec(),
        code: 1,
    }));
    let adapter = EngineAdapter::new(engine.clone());

    materialize_inputs(&adapter).await;
    assert!(adapter.execute(&export_spec()).await.is_err());
    assert!(adapter.scoped_names().contains(&EXPORT_OUTPUT_FILE.to_string()));
    adapter.release().await;

    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_unwritten_output_does_not_block_release() {
    let engine = Arc::new(InMemoryEngine::loaded().with_behavior(ExecBehavior::ExitCode {
        code: 1,
        log: Vec::new(),
    }));
    let adapter = EngineAdapter::new(engine.clone());

    materialize_inputs(&adapter).await;
    assert!(adapter.execute(&export_spec()).await.is_err());
    adapter.release().await;

    assert!(adapter.scoped_names().is_empty());
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_missing_input_reported_as_diagnostics() {
    let engine = Arc::new(InMemoryEngine::loaded());
    let adapter = EngineAdapter::new(engine.clone());

    adapter.materialize(SOURCE_FILE, b"video").await.unwrap();
    let err = adapter.execute(&export_spec()).await.unwrap_err();
    adapter.release().await;

    assert!(err
        .diagnostics()
        .is_some_and(|lines| lines.contains("watermark.jpg: No such file")));
    assert!(engine.file_names().is_empty());
}

#[tokio::test]
async fn test_unloaded_engine_rejected() {
    let engine = Arc::new(InMemoryEngine::new());
    let adapter = EngineAdapter::new(engine.clone());

    let err = adapter.materialize(SOURCE_FILE, b"video").await.unwrap_err();

    assert!(matches!(err, DomainError::Engine { .. }));
    assert!(engine.file_names().is_empty());
    assert!(engine.executions().is_empty());
}

#[tokio::test]
async fn test_invalid_virtual_name_rejected() {
    let adapter = EngineAdapter::new(Arc::new(InMemoryEngine::loaded()));
    let err = adapter.materialize("../escape.mp4", b"x").await.unwrap_err();
    assert!(matches!(err, DomainError::Configuration(_)));
    assert!(adapter.scoped_names().is_empty());
}

#[tokio::test]
async fn test_capture_listener_removed_after_execute() {
    let engine = Arc::new(InMemoryEngine::loaded());
    let adapter = EngineAdapter::new(engine.clone());

    materialize_inputs(&adapter).await;
    adapter.execute(&export_spec()).await.unwrap();
    adapter.release().await;

    assert_eq!(engine.events().listener_count(), 0);
}

#[tokio::test]
async fn test_preview_argv_executed_verbatim() {
    let engine = Arc::new(InMemoryEngine::loaded());
    let adapter = EngineAdapter::new(engine.clone());
    let spec = CommandBuilder::build_preview_command(&units());
    assert_eq!(spec.mode, RenderMode::Preview);

    materialize_inputs(&adapter).await;
    adapter.execute(&spec).await.unwrap();
    adapter.release().await;

    assert_eq!(engine.executions(), vec![spec.args.clone()]);
}
