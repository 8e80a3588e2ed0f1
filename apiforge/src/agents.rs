//! The six agents of an API design session.
//!
//! Agents are immutable configuration records: a name, an instruction
//! prompt, and the phase they hand off to. The roster order is fixed:
//!
//!   Coordinator → Requirements → Architect → EndpointDesigner
//!     → SchemaDesigner → Documentation

use std::fmt;

/// A stage of the API design conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Coordination,
    Requirements,
    Architecture,
    Endpoints,
    Schema,
    Documentation,
}

impl Phase {
    /// All phases in handoff order.
    pub const ALL: [Phase; 6] = [
        Phase::Coordination,
        Phase::Requirements,
        Phase::Architecture,
        Phase::Endpoints,
        Phase::Schema,
        Phase::Documentation,
    ];

    /// Name of the agent that owns this phase.
    pub fn agent_name(self) -> &'static str {
        match self {
            Phase::Coordination => "Coordinator",
            Phase::Requirements => "Requirements",
            Phase::Architecture => "Architect",
            Phase::Endpoints => "EndpointDesigner",
            Phase::Schema => "SchemaDesigner",
            Phase::Documentation => "Documentation",
        }
    }

    /// The phase that follows this one, if any.
    pub fn next(self) -> Option<Phase> {
        let idx = Phase::ALL.iter().position(|p| *p == self)?;
        Phase::ALL.get(idx + 1).copied()
    }

    pub fn instructions(self) -> &'static str {
        match self {
            Phase::Coordination => COORDINATOR_PROMPT,
            Phase::Requirements => REQUIREMENTS_PROMPT,
            Phase::Architecture => ARCHITECT_PROMPT,
            Phase::Endpoints => ENDPOINT_DESIGNER_PROMPT,
            Phase::Schema => SCHEMA_DESIGNER_PROMPT,
            Phase::Documentation => DOCUMENTATION_PROMPT,
        }
    }

    /// One-line description shown when the agent is activated.
    pub fn blurb(self) -> &'static str {
        match self {
            Phase::Coordination => {
                "Orchestrates the entire process, providing guidance and feedback at each step."
            }
            Phase::Requirements => "Specializes in gathering and clarifying API requirements.",
            Phase::Architecture => {
                "Specializes in designing high-level API architecture following RESTful best practices."
            }
            Phase::Endpoints => {
                "Specializes in creating detailed endpoint specifications with realistic examples."
            }
            Phase::Schema => {
                "Specializes in designing data schemas with realistic example data."
            }
            Phase::Documentation => {
                "Specializes in generating comprehensive markdown documentation."
            }
        }
    }

    /// Guidance printed before the phase runs.
    pub fn best_practices(self) -> &'static [&'static str] {
        match self {
            Phase::Coordination => &[],
            Phase::Requirements => &[
                "Clearly define the purpose and scope of your API",
                "Identify all user roles and their permissions",
                "List all resources that will be managed through the API",
                "Specify security requirements and constraints",
                "Consider rate limiting, pagination, and versioning needs",
            ],
            Phase::Architecture => &[
                "Use consistent naming conventions (e.g., plural nouns for resources)",
                "Design clear URL hierarchies that reflect resource relationships",
                "Follow RESTful principles for resource operations",
                "Consider using versioning in the URL path or headers",
                "Plan for appropriate error handling and status codes",
                "Keep resource URLs simple and intuitive",
            ],
            Phase::Endpoints => &[
                "Use appropriate HTTP methods (GET, POST, PUT, DELETE, etc.)",
                "Include comprehensive request validation",
                "Design consistent response structures",
                "Document all possible response status codes",
                "Use query parameters for filtering, sorting, and pagination",
                "Provide realistic examples for requests and responses",
                "Include examples for both success and error scenarios",
            ],
            Phase::Schema => &[
                "Give every property a type, format and description",
                "Mark required fields explicitly",
                "Attach a realistic example to every schema",
            ],
            Phase::Documentation => &[
                "Include clear descriptions for all endpoints",
                "Provide realistic examples for request and response bodies",
                "Document all possible response status codes and their meanings",
                "Include authentication and authorization details",
                "Add contact information and terms of service",
                "Use tags to group related endpoints",
                "Include examples for common use cases",
            ],
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent_name())
    }
}

/// A registered agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub name: &'static str,
    pub phase: Phase,
    pub instructions: &'static str,
    pub handoff: Option<Phase>,
}

impl AgentConfig {
    pub fn for_phase(phase: Phase) -> Self {
        Self {
            name: phase.agent_name(),
            phase,
            instructions: phase.instructions(),
            handoff: phase.next(),
        }
    }
}

/// The full roster in handoff order, Coordinator first.
pub fn roster() -> Vec<AgentConfig> {
    Phase::ALL.into_iter().map(AgentConfig::for_phase).collect()
}

/// Check that `agents` starts with the Coordinator and forms a single
/// linear chain where each agent hands off to the next entry.
pub fn validate_chain(agents: &[AgentConfig]) -> Result<(), String> {
    let first = agents.first().ok_or("no agents registered")?;
    if first.phase != Phase::Coordination {
        return Err(format!("session must start with Coordinator, not {}", first.name));
    }
    for pair in agents.windows(2) {
        if pair[0].handoff != Some(pair[1].phase) {
            return Err(format!(
                "{} must hand off to {}, found {:?}",
                pair[0].name,
                pair[1].name,
                pair[0].handoff.map(Phase::agent_name)
            ));
        }
    }
    if let Some(last) = agents.last()
        && let Some(next) = last.handoff
    {
        return Err(format!("{} hands off to unregistered agent {next}", last.name));
    }
    Ok(())
}

pub const COORDINATOR_PROMPT: &str = "\
You are a Coordinator Agent who guides users through the API design process.

Your responsibilities include:
1. Providing guidance on best practices for API design
2. Reviewing the output of other specialized agents
3. Offering feedback and suggestions for improvement
4. Ensuring consistency across the entire API specification
5. Helping users understand each phase of the API design process

Be helpful, informative, and focused on creating a high-quality API specification.";

pub const REQUIREMENTS_PROMPT: &str = "\
You are a Requirements Gathering Agent specialized in collecting and clarifying API requirements.
Format your response as a structured document covering:
1. Purpose - What the API is for and what problem it solves
2. User Roles - Different types of users and their permissions
3. Resource Definitions - Data models with attributes and relationships
4. API Endpoints - High-level list of needed endpoints
5. Authentication & Authorization - Security requirements
6. Integrations - External systems to integrate with
7. Additional Considerations - Performance, scalability, etc.
8. Error Handling - How errors should be handled

Be thorough but concise. Use markdown formatting for better readability.
When the document is complete, call save_requirements with it.";

pub const ARCHITECT_PROMPT: &str = "\
You are an API Architect specialized in designing high-level API structures.
Format your response as a structured document including:
1. Resource Hierarchy - Main resources and their relationships
2. URL Structure - Base URL and resource paths
3. Authentication & Authorization - Security mechanisms
4. Versioning Strategy - How API versions will be handled
5. Error Handling - Standard error responses
6. Rate Limiting - Recommendations for rate limiting
7. Pagination - Approach for paginated responses
8. Caching - Caching recommendations

Follow RESTful best practices. Use markdown formatting for better readability.
When the design is complete, call save_architecture with it.";

pub const ENDPOINT_DESIGNER_PROMPT: &str = "\
You are an Endpoint Designer specialized in creating detailed API endpoint specifications.

For each endpoint, provide a complete OpenAPI 3.0 specification including:
- Path and HTTP method
- Summary and description
- Request parameters (path, query, header)
- Request body schema with examples
- Response schemas for different status codes with examples
- Required security schemes

Your output must be valid JSON that can be directly used in an OpenAPI specification.
Include realistic examples for all request and response bodies.

Format your response as a JSON object with a \"paths\" property containing all endpoints.
Wrap your JSON in ```json and ``` markers.";

pub const SCHEMA_DESIGNER_PROMPT: &str = "\
You are a Schema Designer specialized in creating detailed data schemas for APIs.

For each data model in the API, provide a complete OpenAPI 3.0 schema including:
- Properties with types and formats
- Required fields
- Descriptions for all properties
- Realistic example data for each schema

Your output must be valid JSON that can be directly used in an OpenAPI specification.
Every schema MUST include an 'example' property with realistic sample data.

Format your response as a JSON object containing all schemas.
Wrap your JSON in ```json and ``` markers.";

pub const DOCUMENTATION_PROMPT: &str = "\
You are a Documentation Specialist who creates comprehensive API documentation.

Create detailed markdown documentation that includes:
1. Introduction - Overview of the API and its purpose
2. Authentication - How to authenticate with the API
3. Base URL - The base URL for all endpoints
4. Resources - Description of all resources
5. Endpoints - For each endpoint:
   - URL and method
   - Description and purpose
   - Request parameters and body
   - Response format and status codes
   - At least 2 complete examples (request and response)
6. Error Handling - Common errors and how to handle them
7. Rate Limiting - Information about rate limits
8. Pagination - How pagination works
9. Common Use Cases - Examples of common API usage scenarios

Use markdown formatting for better readability.
Include code blocks with examples for all API calls.";
