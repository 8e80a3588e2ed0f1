//! apiforge: interactive multi-agent REST API designer.
//!
//! Six agents, registered once in a fixed handoff chain, interview the user
//! and produce an OpenAPI 3.0 specification plus markdown documentation:
//!
//!   Coordinator → Requirements → Architect → EndpointDesigner
//!     → SchemaDesigner → Documentation
//!
//! The [`driver::Driver`] registers the roster with an
//! [`service::AgentService`], runs one session, and writes the five
//! artifacts with [`artifact::ArtifactWriter`].

pub mod agents;
pub mod artifact;
pub mod config;
pub mod console;
pub mod driver;
pub mod error;
pub mod extract;
pub mod llm;
pub mod openapi;
pub mod service;
pub mod tools;

pub use error::{Error, Result};
