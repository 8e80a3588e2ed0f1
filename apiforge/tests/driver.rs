//! Driver acceptance tests against a scripted agent service.
//!
//! Covers the run contract: credential check before any contact, all five
//! artifacts on success, nothing written when the service fails, ordered
//! abort on write failure, and overwrite on re-run.

mod common;

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use apiforge::agents::AgentConfig;
use apiforge::artifact::{Artifact, ArtifactKind};
use apiforge::config::Config;
use apiforge::console::Console;
use apiforge::driver::{Driver, SessionState};
use apiforge::llm::LlmError;
use apiforge::openapi::{self, ApiInfo};
use apiforge::service::{AgentService, SessionHandle, SessionOutput};
use apiforge::{Error, Result};
use async_trait::async_trait;
use serde_json::{Value, json};

use common::{ScriptedConsole, dir_listing};

/// Agent service double: records registrations, returns canned output.
struct ScriptedService {
    output: Option<SessionOutput>,
    reject_roster: bool,
    registered: Mutex<Vec<Vec<&'static str>>>,
    runs: AtomicUsize,
}

impl ScriptedService {
    fn succeeding(output: SessionOutput) -> Self {
        Self {
            output: Some(output),
            reject_roster: false,
            registered: Mutex::new(Vec::new()),
            runs: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            output: None,
            reject_roster: false,
            registered: Mutex::new(Vec::new()),
            runs: AtomicUsize::new(0),
        }
    }

    fn rejecting(output: SessionOutput) -> Self {
        Self {
            reject_roster: true,
            ..Self::succeeding(output)
        }
    }

    fn registrations(&self) -> usize {
        self.registered.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentService for ScriptedService {
    async fn register(&self, agents: &[AgentConfig]) -> Result<SessionHandle> {
        self.registered
            .lock()
            .unwrap()
            .push(agents.iter().map(|a| a.name).collect());
        if self.reject_roster {
            return Err(Error::config("roster rejected by service"));
        }
        SessionHandle::new(agents)
    }

    async fn run(
        &self,
        _session: &SessionHandle,
        console: &mut dyn Console,
    ) -> Result<SessionOutput> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        console.print("[scripted] running");
        match &self.output {
            Some(output) => Ok(output.clone()),
            None => Err(Error::ExternalService(LlmError::RateLimited {
                retry_after: Some(30),
            })),
        }
    }
}

fn sample_output(title: &str) -> SessionOutput {
    let endpoints = json!({"paths": {"/pets": {"get": {"summary": "List pets"}}}});
    let schemas = json!({"Pet": {"type": "object", "example": {"name": "Rex"}}});
    let info = ApiInfo {
        title: title.to_string(),
        description: "Manage pets".to_string(),
    };
    let spec = openapi::assemble(Some(&endpoints), schemas.as_object(), &info);

    let mut out = SessionOutput::new();
    out.insert(Artifact::json(
        ArtifactKind::Requirements,
        json!({"requirements": format!("{title} requirements")}),
    ));
    out.insert(Artifact::json(
        ArtifactKind::Architecture,
        json!({"architecture": "Resources: /pets"}),
    ));
    out.insert(Artifact::json(ArtifactKind::Endpoints, endpoints));
    out.insert(Artifact::json(ArtifactKind::OpenApiSpec, spec));
    out.insert(Artifact::markdown(
        ArtifactKind::Documentation,
        format!("# {title}\n\nGET /pets lists pets.\n"),
    ));
    out
}

fn config_for(dir: &Path) -> Config {
    Config {
        output_dir: dir.to_path_buf(),
        ..Config::new("sk-test")
    }
}

const ALL_FILES: [&str; 5] = [
    "api_architecture.json",
    "api_documentation.md",
    "api_endpoints.json",
    "api_requirements.json",
    "openapi_specification.json",
];

#[tokio::test]
async fn successful_run_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("Pet Store")));
    let mut console = ScriptedConsole::default();

    let report = driver.run(&mut console).await.unwrap();

    assert_eq!(driver.state(), SessionState::Completed);
    assert_eq!(report.written.len(), 5);
    assert_eq!(dir_listing(dir.path()), ALL_FILES);
    for name in ALL_FILES {
        let body = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(!body.trim().is_empty(), "{name} is empty");
    }
    assert!(console.printed("API specification generation complete!"));
}

#[tokio::test]
async fn written_in_fixed_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("Pets")));
    let report = driver.run(&mut ScriptedConsole::default()).await.unwrap();

    let order: Vec<_> = report
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    let expected: Vec<_> = ArtifactKind::ALL.iter().map(|k| k.file_name()).collect();
    assert_eq!(order, expected);
}

#[tokio::test]
async fn openapi_file_is_valid_3_0_json() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("Pet Store")));
    driver.run(&mut ScriptedConsole::default()).await.unwrap();

    let raw = std::fs::read_to_string(dir.path().join("openapi_specification.json")).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    let version = doc["openapi"].as_str().unwrap();
    assert!(version.starts_with("3.0."), "unexpected version {version}");
    assert_eq!(doc["info"]["title"], "Pet Store");
    assert_eq!(doc["paths"]["/pets"]["get"]["summary"], "List pets");
}

#[tokio::test]
async fn missing_credential_fails_before_contact_or_write() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    let config = Config {
        output_dir: out.clone(),
        ..Config::new("")
    };
    let service = ScriptedService::succeeding(sample_output("Pets"));
    let mut driver = Driver::new(config, service);

    let err = driver.run(&mut ScriptedConsole::default()).await.unwrap_err();

    assert!(matches!(err, Error::Configuration(_)), "{err}");
    assert_ne!(err.exit_code(), 0);
    assert_eq!(driver.state(), SessionState::NotStarted);
    assert!(!out.exists());
}

#[tokio::test]
async fn missing_credential_never_registers() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        output_dir: dir.path().to_path_buf(),
        ..Config::new("   ")
    };
    let mut driver = Driver::new(config, ScriptedService::succeeding(sample_output("Pets")));
    assert!(driver.run(&mut ScriptedConsole::default()).await.is_err());
    assert_eq!(driver.service().registrations(), 0);
    assert_eq!(driver.service().runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn service_failure_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::failing());
    let mut console = ScriptedConsole::default();

    let err = driver.run(&mut console).await.unwrap_err();

    assert!(matches!(err, Error::ExternalService(LlmError::RateLimited { .. })), "{err}");
    assert_eq!(err.exit_code(), 1);
    assert_eq!(driver.state(), SessionState::Aborted);
    assert!(dir_listing(dir.path()).is_empty());
    assert!(console.printed("rate limited"));
}

#[tokio::test]
async fn registration_failure_aborts_like_other_failures() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::rejecting(sample_output("Pets")));
    let mut console = ScriptedConsole::default();

    let err = driver.run(&mut console).await.unwrap_err();

    assert!(matches!(err, Error::Configuration(_)), "{err}");
    assert_eq!(driver.state(), SessionState::Aborted);
    assert!(console.printed("roster rejected by service"));
    assert_eq!(driver.service().runs.load(Ordering::SeqCst), 0);
    assert!(dir_listing(dir.path()).is_empty());
}

#[tokio::test]
async fn write_failure_aborts_remaining_writes() {
    let dir = tempfile::tempdir().unwrap();
    // A directory squatting on the architecture file name makes the rename fail.
    std::fs::create_dir(dir.path().join("api_architecture.json")).unwrap();

    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("Pets")));
    let err = driver.run(&mut ScriptedConsole::default()).await.unwrap_err();

    match &err {
        Error::ArtifactWrite { path, .. } => {
            assert!(path.ends_with("api_architecture.json"), "{}", path.display())
        }
        other => panic!("expected ArtifactWrite, got {other}"),
    }
    assert_eq!(driver.state(), SessionState::Aborted);
    assert!(dir.path().join("api_requirements.json").is_file());
    assert!(!dir.path().join("api_endpoints.json").exists());
    assert!(!dir.path().join("openapi_specification.json").exists());
    assert!(!dir.path().join("api_documentation.md").exists());
    assert!(!dir.path().join(".api_architecture.json.tmp").exists());
}

#[tokio::test]
async fn second_run_overwrites_all_files() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("First API")));
    first.run(&mut ScriptedConsole::default()).await.unwrap();

    let mut second = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("Second API")));
    second.run(&mut ScriptedConsole::default()).await.unwrap();

    assert_eq!(dir_listing(dir.path()), ALL_FILES);
    for name in ALL_FILES {
        let body = std::fs::read_to_string(dir.path().join(name)).unwrap();
        assert!(!body.contains("First API"), "{name} still has first-run content");
    }
    let doc = std::fs::read_to_string(dir.path().join("api_documentation.md")).unwrap();
    assert!(doc.starts_with("# Second API"));
}

#[tokio::test]
async fn roster_registered_in_fixed_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut driver = Driver::new(config_for(dir.path()), ScriptedService::succeeding(sample_output("Pets")));
    driver.run(&mut ScriptedConsole::default()).await.unwrap();
    driver.run(&mut ScriptedConsole::default()).await.unwrap();

    let registered = driver.service().registered.lock().unwrap().clone();
    assert_eq!(registered.len(), 2);
    for names in registered {
        assert_eq!(
            names,
            [
                "Coordinator",
                "Requirements",
                "Architect",
                "EndpointDesigner",
                "SchemaDesigner",
                "Documentation"
            ]
        );
    }
}
