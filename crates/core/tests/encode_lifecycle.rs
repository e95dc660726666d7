//! Encode job lifecycle integration tests.
//!
//! These tests run whole jobs against the mock driver, probe and workspace:
//! - Per-pass command construction
//! - Stop on first failing pass
//! - Scratch directory release on every outcome
//! - Progress listener wiring

use std::sync::Arc;

use passforge_core::{
    testing::{fixtures, MockDriver, MockFormat, MockProbe, MockWorkspace},
    Arg, Config, EncodeError, EncodingFormat, ExecutionFailure, FormatPreset, ProgressEvent,
    Video,
};

/// Test helper bundling a video with its mocks.
struct TestHarness {
    video: Video,
    driver: Arc<MockDriver>,
    workspace: Arc<MockWorkspace>,
}

impl TestHarness {
    fn new() -> Self {
        Self::with_config(Config::default())
    }

    fn with_config(config: Config) -> Self {
        let driver = Arc::new(MockDriver::new());
        let workspace = Arc::new(MockWorkspace::new());
        let video = fixtures::video_with(
            "/media/source.mkv",
            driver.clone(),
            Arc::new(MockProbe::new()),
            workspace.clone(),
            config,
        );

        Self {
            video,
            driver,
            workspace,
        }
    }

    async fn commands(&self) -> Vec<Vec<String>> {
        self.driver
            .recorded_executions()
            .await
            .into_iter()
            .map(|e| e.command.to_strings())
            .collect()
    }
}

#[tokio::test]
async fn test_two_pass_encode_builds_pass_commands() {
    let harness = TestHarness::new();
    let format = EncodingFormat::video("libx264").with_passes(2);

    let summary = harness
        .video
        .encode(&format, "/tmp/out.mp4")
        .await
        .unwrap();
    assert_eq!(summary.passes_run, 2);

    let executions = harness.driver.recorded_executions().await;
    assert_eq!(executions.len(), 2);
    assert!(executions.iter().all(|e| !e.background));

    let first = &executions[0].command;
    let second = &executions[1].command;
    for (command, index) in [(first, 1), (second, 2)] {
        assert_eq!(command.last(), Some(&Arg::from("/tmp/out.mp4")));
        assert_eq!(command.value_of("-pass"), Some(&Arg::Int(index)));
        assert_eq!(command.value_of("-vcodec"), Some(&Arg::from("libx264")));
    }

    let prefix = first.value_of("-passlogfile").cloned().unwrap();
    assert_eq!(second.value_of("-passlogfile"), Some(&prefix));

    // The log prefix lives in the job's scratch directory.
    let scratch = harness.workspace.root().join(&summary.job_id);
    assert!(prefix
        .as_text()
        .unwrap()
        .starts_with(scratch.to_str().unwrap()));
}

#[tokio::test]
async fn test_single_pass_has_no_pass_flags() {
    let harness = TestHarness::new();
    let format = EncodingFormat::video("libx264");

    harness.video.save(&format, "/tmp/out.mp4").await.unwrap();

    let commands = harness.commands().await;
    assert_eq!(commands.len(), 1);
    assert_eq!(
        commands[0],
        vec!["-y", "-i", "/media/source.mkv", "-vcodec", "libx264", "/tmp/out.mp4"]
    );
}

#[tokio::test]
async fn test_failing_pass_stops_the_job() {
    let harness = TestHarness::new();
    harness
        .driver
        .fail_on_call(2, ExecutionFailure::exited(Some(1), "Conversion failed!"))
        .await;
    let format = EncodingFormat::video("libx264").with_passes(3);

    let err = harness
        .video
        .save(&format, "/tmp/out.mp4")
        .await
        .unwrap_err();

    match &err {
        EncodeError::Encoding {
            pass, total, code, ..
        } => {
            assert_eq!(*pass, 2);
            assert_eq!(*total, 3);
            assert_eq!(*code, Some(1));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("Encoding failed"));
    assert_eq!(harness.driver.execution_count().await, 2);
    assert_eq!(harness.workspace.clean_calls().await.len(), 1);
}

#[tokio::test]
async fn test_invalid_pass_count_touches_nothing() {
    for passes in [0, -1] {
        let harness = TestHarness::new();
        let format = EncodingFormat::video("libx264").with_passes(passes);

        let err = harness
            .video
            .save(&format, "/tmp/out.mp4")
            .await
            .unwrap_err();

        assert!(err.is_configuration());
        assert_eq!(harness.driver.execution_count().await, 0);
        assert!(harness.workspace.create_calls().await.is_empty());
        assert!(harness.workspace.clean_calls().await.is_empty());
    }
}

#[tokio::test]
async fn test_scratch_dir_released_after_success() {
    let harness = TestHarness::new();
    let format = EncodingFormat::video("libx264").with_passes(2);

    let summary = harness
        .video
        .encode(&format, "/tmp/out.mp4")
        .await
        .unwrap();

    let creates = harness.workspace.create_calls().await;
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].job_id, summary.job_id);
    assert_eq!(creates[0].permissions, 0o777);
    assert_eq!(creates[0].max_attempts, 50);
    assert_eq!(harness.workspace.clean_calls().await, vec![summary.job_id]);
}

#[tokio::test]
async fn test_one_listener_per_pass() {
    let harness = TestHarness::new();
    harness
        .driver
        .set_progress_events(vec![
            ProgressEvent {
                frame: Some(120),
                time_secs: 5.0,
                speed: Some("2.0x".to_string()),
                finished: false,
            },
            ProgressEvent {
                frame: Some(240),
                time_secs: 10.0,
                speed: Some("2.0x".to_string()),
                finished: true,
            },
        ])
        .await;
    let format = MockFormat::new(EncodingFormat::video("libx264").with_passes(2));

    harness.video.save(&format, "/tmp/out.mp4").await.unwrap();

    let listeners = format.recorded_listeners();
    assert_eq!(listeners.len(), 2);
    assert_eq!((listeners[0].pass, listeners[0].total_passes), (1, 2));
    assert_eq!((listeners[1].pass, listeners[1].total_passes), (2, 2));

    let passes: Vec<u32> = format.recorded_events().iter().map(|(p, _)| *p).collect();
    assert_eq!(passes, vec![1, 1, 2, 2]);

    let executions = harness.driver.recorded_executions().await;
    assert!(executions.iter().all(|e| e.had_listener));
}

#[tokio::test]
async fn test_no_listener_without_progress_capability() {
    let harness = TestHarness::new();
    let format = EncodingFormat::video("libx264").with_passes(2);

    harness.video.save(&format, "/tmp/out.mp4").await.unwrap();

    let executions = harness.driver.recorded_executions().await;
    assert!(executions.iter().all(|e| !e.had_listener));
}

#[tokio::test]
async fn test_configured_threads_reach_every_pass() {
    let mut config = Config::default();
    config.encoder.threads = Some(4);
    let harness = TestHarness::with_config(config);
    let format = EncodingFormat::video("libx264").with_passes(2);

    harness.video.save(&format, "/tmp/out.mp4").await.unwrap();

    for execution in harness.driver.recorded_executions().await {
        assert_eq!(execution.command.value_of("-threads"), Some(&Arg::Int(4)));
    }
}

#[tokio::test]
async fn test_job_filters_do_not_leak_into_video() {
    let mut harness = TestHarness::new();
    harness.video.filters().resize(1280, 720);
    let format = EncodingFormat::video("libx264").with_passes(2);

    harness.video.save(&format, "/tmp/a.mp4").await.unwrap();
    harness.video.save(&format, "/tmp/b.mp4").await.unwrap();

    assert_eq!(harness.video.pipeline().len(), 1);
    let commands = harness.commands().await;
    assert_eq!(commands.len(), 4);
    for command in commands {
        assert_eq!(command.iter().filter(|a| *a == "-vcodec").count(), 1);
        assert_eq!(command.iter().filter(|a| *a == "-s").count(), 1);
    }
}

#[tokio::test]
async fn test_configured_commands_keep_pass_and_listener_handling() {
    let mut config = Config::default();
    config.encoder.commands = Some(vec!["-c:v".to_string(), "libvpx-vp9".to_string()]);
    let harness = TestHarness::with_config(config);
    let format = MockFormat::new(EncodingFormat::from_preset(FormatPreset::X264));

    harness
        .video
        .save_with_configured_commands(&format, "/tmp/out.webm")
        .await
        .unwrap();

    let commands = harness.commands().await;
    assert_eq!(commands.len(), 2);
    for (index, command) in commands.iter().enumerate() {
        assert_eq!(command[..5], ["-y", "-i", "/media/source.mkv", "-c:v", "libvpx-vp9"]);
        assert_eq!(command[5..7], ["-pass".to_string(), (index + 1).to_string()]);
        assert!(!command.iter().any(|a| a == "-b:v" || a == "-refs"));
    }
    assert_eq!(format.recorded_listeners().len(), 2);
    assert_eq!(harness.workspace.clean_calls().await.len(), 1);
}
