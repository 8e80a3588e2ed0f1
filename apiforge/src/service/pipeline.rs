//! Chat-completions backed agent service.
//!
//! Walks the registered chain in order. Each phase is one agent run
//! (instructions as system prompt, a phase prompt as user message, the
//! phase's save tool offered), with the Coordinator reviewing between
//! phases. Output is collected in memory and only returned once the whole
//! chain has finished.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map, Value, json};

use super::{AgentService, SessionHandle, SessionOutput};
use crate::agents::{AgentConfig, Phase};
use crate::artifact::{Artifact, ArtifactKind};
use crate::console::{self, Console};
use crate::error::{Error, Result};
use crate::extract::extract_json;
use crate::llm::{LlmClient, Message};
use crate::openapi::{self, ApiInfo};
use crate::tools::{self, Captured};

/// Upper bound on model turns within a single agent run.
const MAX_TURNS: usize = 8;

pub struct LlmAgentService {
    llm: LlmClient,
    max_turns: usize,
}

impl LlmAgentService {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm,
            max_turns: MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    /// One agent run: loop until the model answers without tool calls.
    async fn run_agent(
        &self,
        agent: &AgentConfig,
        prompt: &str,
        console: &mut dyn Console,
    ) -> Result<AgentRun> {
        tracing::info!(agent = agent.name, model = %self.llm.model(), "Agent run started");

        let tools = tools::tools_for(agent.phase);
        let mut messages = vec![Message::user(prompt)];
        let mut run = AgentRun::default();

        for turn in 0..self.max_turns {
            let reply = self
                .llm
                .chat(agent.instructions, &messages, &tools)
                .await?
                .into_message()?;

            run.text = reply.text().trim().to_string();
            if reply.tool_calls().is_empty() {
                tracing::info!(agent = agent.name, turns = turn + 1, "Agent run finished");
                return Ok(run);
            }

            let calls = reply.tool_calls().to_vec();
            messages.push(reply);

            for call in &calls {
                let outcome = tools::handle_call(call);
                match &outcome.captured {
                    Some((kind, _)) => {
                        console::status(console, agent.name, "💾", &format!("{kind} captured"));
                    }
                    None => {
                        console::warn(console, agent.name, &outcome.reply);
                        tracing::warn!(agent = agent.name, tool = %call.function.name, reply = %outcome.reply, "Tool call rejected");
                    }
                }
                if let Some((kind, value)) = outcome.captured {
                    run.captured.insert(kind, value);
                }
                messages.push(Message::tool(&call.id, &outcome.reply));
            }
        }

        tracing::warn!(agent = agent.name, max_turns = self.max_turns, "Agent run hit turn limit");
        console::warn(console, agent.name, "Turn limit reached, using the last reply");
        Ok(run)
    }

    /// Run the Coordinator with `prompt` and print its reply under `heading`.
    async fn consult(
        &self,
        session: &SessionHandle,
        heading: &str,
        prompt: &str,
        console: &mut dyn Console,
        ledger: &mut Ledger,
    ) -> Result<String> {
        let coordinator = agent(session, Phase::Coordination)?;
        let run = self.run_agent(coordinator, prompt, console).await?;
        console.print("");
        console.print(&format!("{heading}:"));
        console::say(console, coordinator.name, &run.text);
        ledger.absorb(&run);
        Ok(run.text)
    }

    /// Announce a phase and run its agent.
    async fn run_phase(
        &self,
        session: &SessionHandle,
        phase: Phase,
        title: &str,
        prompt: &str,
        console: &mut dyn Console,
    ) -> Result<AgentRun> {
        let agent = agent(session, phase)?;
        let from = session
            .agents()
            .iter()
            .find(|a| a.handoff == Some(phase))
            .map(|a| a.name)
            .unwrap_or("Coordinator");

        console::section(console, title);
        console::best_practices(console, phase.best_practices());
        console::handoff(console, from, agent.name, phase.blurb());
        tracing::info!(session = %session.id, phase = %phase, "Handoff");

        self.run_agent(agent, prompt, console).await
    }
}

#[async_trait]
impl AgentService for LlmAgentService {
    async fn register(&self, agents: &[AgentConfig]) -> Result<SessionHandle> {
        let handle = SessionHandle::new(agents)?;
        tracing::info!(session = %handle.id, agents = handle.agents().len(), "Session registered");
        Ok(handle)
    }

    async fn run(
        &self,
        session: &SessionHandle,
        console: &mut dyn Console,
    ) -> Result<SessionOutput> {
        let mut ledger = Ledger::default();
        let entry = session.entry();

        console::status(console, entry.name, "🔄", "Agent Activated");
        console.print(&format!("   {}", entry.phase.blurb()));

        let description = console
            .read_line("Please describe the API you want to create (purpose, main features, etc.):")
            .await
            .map_err(|e| Error::config(format!("failed to read API description: {e}")))?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::config("no API description given"))?;

        self.consult(
            session,
            "Coordinator's Guidance",
            &prompts::guidance(&description),
            console,
            &mut ledger,
        )
        .await?;

        // Requirements
        let run = self
            .run_phase(
                session,
                Phase::Requirements,
                "Phase 1: Requirements Gathering",
                &prompts::requirements(&description),
                console,
            )
            .await?;
        let requirements = run.text_for(ArtifactKind::Requirements);
        ledger.set(ArtifactKind::Requirements, Captured::Text(requirements.clone()));
        console::say(console, Phase::Requirements.agent_name(), &requirements);

        self.consult(
            session,
            "Coordinator's Feedback on Requirements",
            &prompts::requirements_feedback(&requirements),
            console,
            &mut ledger,
        )
        .await?;
        let requirements = ledger.text(ArtifactKind::Requirements);

        // Architecture
        let run = self
            .run_phase(
                session,
                Phase::Architecture,
                "Phase 2: API Architecture Design",
                &prompts::architecture(&requirements),
                console,
            )
            .await?;
        let architecture = run.text_for(ArtifactKind::Architecture);
        ledger.set(ArtifactKind::Architecture, Captured::Text(architecture.clone()));
        console::say(console, Phase::Architecture.agent_name(), &architecture);

        self.consult(
            session,
            "Coordinator's Feedback on Architecture",
            &prompts::architecture_feedback(&architecture),
            console,
            &mut ledger,
        )
        .await?;
        let architecture = ledger.text(ArtifactKind::Architecture);

        // Endpoints
        let run = self
            .run_phase(
                session,
                Phase::Endpoints,
                "Phase 3: Endpoint Design",
                &prompts::endpoints(&architecture),
                console,
            )
            .await?;
        let endpoints = match run.json_for(ArtifactKind::Endpoints) {
            Some(map) => map,
            None => {
                console::warn(
                    console,
                    Phase::Endpoints.agent_name(),
                    "Could not parse endpoints as JSON. Using default empty paths.",
                );
                let mut map = Map::new();
                map.insert("paths".into(), json!({}));
                map
            }
        };
        ledger.set(ArtifactKind::Endpoints, Captured::Json(endpoints));
        console::status(console, Phase::Endpoints.agent_name(), "✅", "Endpoints designed");

        self.consult(
            session,
            "Coordinator's Feedback on Endpoints",
            prompts::ENDPOINTS_FEEDBACK,
            console,
            &mut ledger,
        )
        .await?;
        let endpoints = Value::Object(ledger.json(ArtifactKind::Endpoints).unwrap_or_default());

        // Schemas
        let run = self
            .run_phase(
                session,
                Phase::Schema,
                "Phase 4: Schema Design",
                &prompts::schemas(&architecture, &endpoints),
                console,
            )
            .await?;
        let schemas = run.json_for(ArtifactKind::OpenApiSpec).map(unwrap_schemas);
        match &schemas {
            Some(_) => console::status(
                console,
                Phase::Schema.agent_name(),
                "✅",
                "Schemas designed successfully with examples",
            ),
            None => console::warn(
                console,
                Phase::Schema.agent_name(),
                "Schemas were not in valid JSON format. Using default schemas.",
            ),
        }

        // Title and description
        let coordinator = agent(session, Phase::Coordination)?;
        console::status(console, coordinator.name, "🔄", "Extracting API title and description");
        let meta = self
            .run_agent(coordinator, &prompts::metadata(&requirements), console)
            .await?;
        ledger.absorb(&meta);
        let info = meta
            .api_info()
            .unwrap_or_else(|| ApiInfo::fallback(&requirements));

        // Drafts saved before this point are superseded by the assembled document.
        let spec = openapi::assemble(Some(&endpoints), schemas.as_ref(), &info);
        if let Value::Object(map) = &spec {
            ledger.set(ArtifactKind::OpenApiSpec, Captured::Json(map.clone()));
        }

        // Documentation
        let pretty_spec = serde_json::to_string_pretty(&spec).unwrap_or_else(|_| spec.to_string());
        let run = self
            .run_phase(
                session,
                Phase::Documentation,
                "Phase 5: Documentation Generation",
                &prompts::documentation(&requirements, &architecture, &pretty_spec),
                console,
            )
            .await?;
        let mut documentation = run.text_for(ArtifactKind::Documentation);
        if documentation.trim().is_empty() {
            console::warn(
                console,
                Phase::Documentation.agent_name(),
                "No documentation returned. Writing a minimal overview.",
            );
            documentation = format!("# {}\n\n{}\n", info.title, info.description);
        }
        ledger.set(ArtifactKind::Documentation, Captured::Text(documentation));
        console::status(console, Phase::Documentation.agent_name(), "✅", "Documentation generated");

        self.consult(
            session,
            "Coordinator's Final Message",
            prompts::FINAL,
            console,
            &mut ledger,
        )
        .await?;

        let spec = match ledger.json(ArtifactKind::OpenApiSpec).map(Value::Object) {
            Some(revised) if openapi::is_openapi_3_0(&revised) => revised,
            _ => spec,
        };

        let mut output = SessionOutput::new();
        output.insert(Artifact::json(
            ArtifactKind::Requirements,
            json!({ "requirements": ledger.text(ArtifactKind::Requirements) }),
        ));
        output.insert(Artifact::json(
            ArtifactKind::Architecture,
            json!({ "architecture": ledger.text(ArtifactKind::Architecture) }),
        ));
        output.insert(Artifact::json(
            ArtifactKind::Endpoints,
            Value::Object(ledger.json(ArtifactKind::Endpoints).unwrap_or_default()),
        ));
        output.insert(Artifact::json(ArtifactKind::OpenApiSpec, spec));
        output.insert(Artifact::markdown(
            ArtifactKind::Documentation,
            ledger.text(ArtifactKind::Documentation),
        ));

        tracing::info!(session = %session.id, artifacts = output.len(), "Session complete");
        Ok(output)
    }
}

fn agent(session: &SessionHandle, phase: Phase) -> Result<&AgentConfig> {
    session
        .agent(phase)
        .ok_or_else(|| Error::config(format!("{} agent is not registered", phase.agent_name())))
}

/// Accept either bare schemas or a full OpenAPI document.
fn unwrap_schemas(map: Map<String, Value>) -> Map<String, Value> {
    if map.contains_key("openapi")
        && let Some(Value::Object(schemas)) = map
            .get("components")
            .and_then(|c| c.get("schemas"))
    {
        return schemas.clone();
    }
    map
}

/// What one agent run produced.
#[derive(Debug, Default)]
struct AgentRun {
    /// Final text reply.
    text: String,
    /// Last value saved per artifact kind through tool calls.
    captured: HashMap<ArtifactKind, Captured>,
}

impl AgentRun {
    /// Saved text for `kind`, else the final reply.
    fn text_for(&self, kind: ArtifactKind) -> String {
        match self.captured.get(&kind) {
            Some(Captured::Text(t)) => t.clone(),
            _ => self.text.clone(),
        }
    }

    /// Saved JSON for `kind`, else JSON found in the final reply.
    fn json_for(&self, kind: ArtifactKind) -> Option<Map<String, Value>> {
        match self.captured.get(&kind) {
            Some(Captured::Json(m)) => Some(m.clone()),
            _ => extract_json(&self.text),
        }
    }

    /// Title and description from a saved document (bare or under `info`),
    /// else from JSON in the final reply.
    fn api_info(&self) -> Option<ApiInfo> {
        let saved = self.captured.values().filter_map(|c| match c {
            Captured::Json(map) => Some(map),
            Captured::Text(_) => None,
        });
        for map in saved {
            let info = ApiInfo::from_json(map).or_else(|| {
                map.get("info")
                    .and_then(Value::as_object)
                    .and_then(ApiInfo::from_json)
            });
            if info.is_some() {
                return info;
            }
        }
        extract_json(&self.text).as_ref().and_then(ApiInfo::from_json)
    }
}

/// Latest value per artifact kind across the whole session. Later saves
/// (including the Coordinator's) replace earlier ones.
#[derive(Debug, Default)]
struct Ledger {
    latest: HashMap<ArtifactKind, Captured>,
}

impl Ledger {
    fn set(&mut self, kind: ArtifactKind, value: Captured) {
        self.latest.insert(kind, value);
    }

    fn absorb(&mut self, run: &AgentRun) {
        for (kind, value) in &run.captured {
            self.latest.insert(*kind, value.clone());
        }
    }

    fn text(&self, kind: ArtifactKind) -> String {
        match self.latest.get(&kind) {
            Some(Captured::Text(t)) => t.clone(),
            Some(Captured::Json(m)) => serde_json::to_string_pretty(m).unwrap_or_default(),
            None => String::new(),
        }
    }

    fn json(&self, kind: ArtifactKind) -> Option<Map<String, Value>> {
        match self.latest.get(&kind) {
            Some(Captured::Json(m)) => Some(m.clone()),
            Some(Captured::Text(t)) => extract_json(t),
            None => None,
        }
    }
}

/// User-turn prompts for each step of the session.
mod prompts {
    use serde_json::Value;

    pub fn guidance(description: &str) -> String {
        format!(
            "The user wants to create an API for: {description}\n\n\
             Provide a brief overview of the API design process we're about to start \
             and any initial recommendations based on the user's request."
        )
    }

    pub fn requirements(description: &str) -> String {
        format!(
            "Gather detailed requirements for an API based on this description: {description}. \
             Include best practices and recommendations."
        )
    }

    pub fn requirements_feedback(requirements: &str) -> String {
        format!(
            "The requirements gathering phase has completed with these requirements:\n\n\
             {requirements}\n\n\
             Please provide feedback on these requirements and suggestions for the \
             architecture design phase."
        )
    }

    pub fn architecture(requirements: &str) -> String {
        format!(
            "Design the architecture for an API with these requirements: {requirements}. \
             Include best practices and recommendations."
        )
    }

    pub fn architecture_feedback(architecture: &str) -> String {
        format!(
            "The architecture design phase has completed with this architecture:\n\n\
             {architecture}\n\n\
             Please provide feedback on this architecture and suggestions for the \
             endpoint design phase."
        )
    }

    pub fn endpoints(architecture: &str) -> String {
        format!(
            "Design detailed specifications for each endpoint based on this architecture:\n\n\
             {architecture}\n\n\
             For each endpoint, include:\n\
             1. Path and HTTP method\n\
             2. Request parameters and body schema\n\
             3. Response schemas for different status codes\n\
             4. Example requests and responses\n\n\
             Format your response as a valid OpenAPI 3.0 paths object.\n\
             Wrap your JSON in ```json and ``` markers."
        )
    }

    pub const ENDPOINTS_FEEDBACK: &str = "The endpoint design phase has completed. \
        Please provide suggestions for the documentation generation phase.";

    pub fn schemas(architecture: &str, endpoints: &Value) -> String {
        format!(
            "Based on this API architecture and endpoints, design detailed schemas for all data models:\n\n\
             {architecture}\n\n\
             Endpoints: {endpoints}\n\n\
             Create a complete 'schemas' object for the OpenAPI specification.\n\n\
             CRITICAL: Every schema MUST include an 'example' property with realistic sample \
             data that would be used in production."
        )
    }

    pub fn metadata(requirements: &str) -> String {
        format!(
            "Based on these requirements, provide a concise API title and description for an \
             OpenAPI specification:\n\n\
             {requirements}\n\n\
             Respond in JSON format with 'title' and 'description' fields.\n\
             Wrap your JSON in ```json and ``` markers."
        )
    }

    pub fn documentation(requirements: &str, architecture: &str, spec: &str) -> String {
        format!(
            "Create comprehensive markdown documentation for this API:\n\n\
             Requirements:\n{requirements}\n\n\
             Architecture:\n{architecture}\n\n\
             OpenAPI Specification:\n{spec}\n\n\
             Include multiple realistic examples for each endpoint, showing both request and \
             response.\n\
             Document common use cases and best practices for using the API."
        )
    }

    pub const FINAL: &str = "The API specification generation process has completed. \
        Please provide a summary of what was created and any final recommendations for the user.";
}
