//! The agent service boundary.
//!
//! A session is registered once with the full roster and then run to
//! completion. What happens inside a run (model calls, tool use, user
//! prompts) belongs to the service; the driver only sees the finished
//! [`SessionOutput`].

mod pipeline;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;

use crate::agents::{self, AgentConfig, Phase};
use crate::artifact::{Artifact, ArtifactKind};
use crate::console::Console;
use crate::error::{Error, Result};

pub use pipeline::LlmAgentService;

/// Capability interface over whatever runs the agents.
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Register the roster. Fails when the handoff chain is not the
    /// linear Coordinator-first chain.
    async fn register(&self, agents: &[AgentConfig]) -> Result<SessionHandle>;

    /// Run the session to completion.
    async fn run(&self, session: &SessionHandle, console: &mut dyn Console)
    -> Result<SessionOutput>;
}

/// A registered, not yet run, session.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    pub id: String,
    agents: Vec<AgentConfig>,
}

impl SessionHandle {
    /// Validate the roster and assign a session id.
    pub fn new(agents: &[AgentConfig]) -> Result<Self> {
        agents::validate_chain(agents).map_err(Error::Configuration)?;
        Ok(Self {
            id: new_session_id(),
            agents: agents.to_vec(),
        })
    }

    /// Registered agents in handoff order.
    pub fn agents(&self) -> &[AgentConfig] {
        &self.agents
    }

    pub fn agent(&self, phase: Phase) -> Option<&AgentConfig> {
        self.agents.iter().find(|a| a.phase == phase)
    }

    /// The agent active when the session starts.
    pub fn entry(&self) -> &AgentConfig {
        // validate_chain guarantees a non-empty roster
        &self.agents[0]
    }
}

fn new_session_id() -> String {
    format!(
        "{}-{:08x}",
        Utc::now().format("%Y%m%d%H%M%S"),
        rand::random::<u32>()
    )
}

/// Everything a finished session produced, keyed by artifact kind.
#[derive(Debug, Clone, Default)]
pub struct SessionOutput {
    artifacts: BTreeMap<ArtifactKind, Artifact>,
}

impl SessionOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an artifact, replacing any earlier one of the same kind.
    pub fn insert(&mut self, artifact: Artifact) {
        self.artifacts.insert(artifact.kind, artifact);
    }

    pub fn get(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.get(&kind)
    }

    /// Artifacts in write order.
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Kinds the session did not produce.
    pub fn missing(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|k| !self.artifacts.contains_key(k))
            .collect()
    }
}
