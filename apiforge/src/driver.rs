//! Orchestration driver.
//!
//! Registers the roster, runs one session, writes whatever it produced.
//! One session per driver run; nothing is retried or resumed.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::agents;
use crate::artifact::ArtifactWriter;
use crate::config::Config;
use crate::console::{self, Console};
use crate::error::Result;
use crate::service::{AgentService, LlmAgentService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NotStarted,
    Running,
    Completed,
    Aborted,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::NotStarted => write!(f, "not started"),
            SessionState::Running => write!(f, "running"),
            SessionState::Completed => write!(f, "completed"),
            SessionState::Aborted => write!(f, "aborted"),
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

pub struct Driver<S> {
    config: Config,
    service: S,
    writer: ArtifactWriter,
    state: SessionState,
}

impl Driver<LlmAgentService> {
    /// Driver backed by the chat-completions service described by `config`.
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let service = LlmAgentService::new(config.llm_client()?);
        Ok(Self::new(config, service))
    }
}

impl<S: AgentService> Driver<S> {
    pub fn new(config: Config, service: S) -> Self {
        let writer = ArtifactWriter::new(config.output_dir.clone());
        Self {
            config,
            service,
            writer,
            state: SessionState::NotStarted,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Run one session end to end.
    ///
    /// Fails with [`Error::Configuration`](crate::error::Error::Configuration)
    /// before contacting the service when the credential is missing.
    /// Registration and service errors are returned as-is, abort the
    /// session and leave the output directory untouched. The first
    /// artifact write failure aborts the remaining writes.
    pub async fn run(&mut self, console: &mut dyn Console) -> Result<RunReport> {
        self.config.validate()?;

        let started_at = Utc::now();
        console::section(console, "API Specification Generator");
        console.print("This tool will help you create a detailed REST API specification with best practices guidance.");
        console.print("You'll be guided through each phase of the API design process using specialized AI agents.");

        let roster = agents::roster();
        let session = match self.service.register(&roster).await {
            Ok(session) => session,
            Err(e) => {
                self.transition(SessionState::Aborted, "unregistered");
                console::error(console, "system", &e.to_string());
                return Err(e);
            }
        };
        self.transition(SessionState::Running, &session.id);

        let output = match self.service.run(&session, console).await {
            Ok(output) => output,
            Err(e) => {
                self.transition(SessionState::Aborted, &session.id);
                console::error(console, session.entry().name, &e.to_string());
                return Err(e);
            }
        };

        for kind in output.missing() {
            tracing::warn!(session = %session.id, kind = %kind, "Session produced no artifact");
        }

        let written = match self.writer.write_all(output.artifacts()).await {
            Ok(written) => written,
            Err(e) => {
                self.transition(SessionState::Aborted, &session.id);
                console::error(console, "system", &e.to_string());
                return Err(e);
            }
        };

        self.transition(SessionState::Completed, &session.id);
        console.print("");
        console.print("API specification generation complete!");
        for path in &written {
            console::status(console, "system", "💾", &path.display().to_string());
        }

        Ok(RunReport {
            session_id: session.id,
            started_at,
            finished_at: Utc::now(),
            written,
        })
    }

    fn transition(&mut self, to: SessionState, session_id: &str) {
        tracing::info!(session = %session_id, from = %self.state, to = %to, "Session state");
        self.state = to;
    }
}

impl<S> fmt::Debug for Driver<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("config", &self.config)
            .field("output_dir", &self.writer.dir())
            .field("state", &self.state)
            .finish()
    }
}

