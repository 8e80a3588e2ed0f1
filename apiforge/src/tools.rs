//! Function tools offered to the agents.
//!
//! Each phase agent gets a `save_*` tool for its artifact; the coordinator
//! gets all of them. Calling a tool does not touch the filesystem: the
//! argument is captured and handed back to the session, which returns it
//! as that phase's output once the run completes.

use serde_json::{Map, Value, json};

use crate::agents::Phase;
use crate::artifact::ArtifactKind;
use crate::llm::{ToolCall, ToolDef};

/// Which argument a save tool takes and whether it must be JSON.
struct SaveTool {
    kind: ArtifactKind,
    name: &'static str,
    param: &'static str,
    description: &'static str,
    json: bool,
}

const SAVE_TOOLS: [SaveTool; 5] = [
    SaveTool {
        kind: ArtifactKind::Requirements,
        name: "save_requirements",
        param: "requirements",
        description: "Save the gathered requirements document.",
        json: false,
    },
    SaveTool {
        kind: ArtifactKind::Architecture,
        name: "save_architecture",
        param: "architecture",
        description: "Save the API architecture document.",
        json: false,
    },
    SaveTool {
        kind: ArtifactKind::Endpoints,
        name: "save_endpoints",
        param: "endpoints_json",
        description: "Save the API endpoints as a JSON string with a \"paths\" object.",
        json: true,
    },
    SaveTool {
        kind: ArtifactKind::OpenApiSpec,
        name: "save_openapi_spec",
        param: "spec_json",
        description: "Save the schemas or a complete OpenAPI specification as a JSON string.",
        json: true,
    },
    SaveTool {
        kind: ArtifactKind::Documentation,
        name: "save_documentation",
        param: "documentation",
        description: "Save the API documentation as markdown.",
        json: false,
    },
];

impl SaveTool {
    fn def(&self) -> ToolDef {
        ToolDef::function(
            self.name,
            self.description,
            json!({
                "type": "object",
                "required": [self.param],
                "properties": {
                    self.param: { "type": "string" }
                }
            }),
        )
    }
}

/// A value captured from a save-tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Text(String),
    Json(Map<String, Value>),
}

/// Result of handling one tool call.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutcome {
    pub captured: Option<(ArtifactKind, Captured)>,
    /// Text returned to the model as the tool result.
    pub reply: String,
}

impl ToolOutcome {
    fn error(reply: impl Into<String>) -> Self {
        Self { captured: None, reply: reply.into() }
    }
}

/// Tools offered to the agent of `phase`.
pub fn tools_for(phase: Phase) -> Vec<ToolDef> {
    let kind = match phase {
        Phase::Coordination => return SAVE_TOOLS.iter().map(SaveTool::def).collect(),
        Phase::Requirements => ArtifactKind::Requirements,
        Phase::Architecture => ArtifactKind::Architecture,
        Phase::Endpoints => ArtifactKind::Endpoints,
        Phase::Schema => ArtifactKind::OpenApiSpec,
        Phase::Documentation => ArtifactKind::Documentation,
    };
    SAVE_TOOLS
        .iter()
        .filter(|t| t.kind == kind)
        .map(SaveTool::def)
        .collect()
}

/// Interpret a tool call from the model.
pub fn handle_call(call: &ToolCall) -> ToolOutcome {
    let Some(tool) = SAVE_TOOLS.iter().find(|t| t.name == call.function.name) else {
        return ToolOutcome::error(format!("Error: Unknown tool: {}", call.function.name));
    };

    let args: Value = match serde_json::from_str(&call.function.arguments) {
        Ok(v) => v,
        Err(_) => return ToolOutcome::error("Error: Invalid arguments"),
    };

    let captured = match (&args[tool.param], tool.json) {
        (Value::String(s), false) => Captured::Text(s.clone()),
        (Value::String(s), true) => match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => Captured::Json(map),
            _ => return ToolOutcome::error("Error: Invalid JSON format"),
        },
        // Some models send the object itself instead of an encoded string.
        (Value::Object(map), true) => Captured::Json(map.clone()),
        _ => {
            return ToolOutcome::error(format!("Error: missing string argument '{}'", tool.param));
        }
    };

    tracing::debug!(tool = tool.name, kind = %tool.kind, "Captured tool output");
    ToolOutcome {
        captured: Some((tool.kind, captured)),
        reply: format!("{} saved successfully", tool.kind),
    }
}
