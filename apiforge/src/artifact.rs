//! Persisting session output.
//!
//! Five files, written in a fixed order after the session ends. Each file
//! is written to a temporary sibling and renamed into place, so a file is
//! either fully written or untouched. There is no atomicity across files.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{Error, Result};

/// What a phase produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKind {
    Requirements,
    Architecture,
    Endpoints,
    OpenApiSpec,
    Documentation,
}

impl ArtifactKind {
    /// Write order.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Requirements,
        ArtifactKind::Architecture,
        ArtifactKind::Endpoints,
        ArtifactKind::OpenApiSpec,
        ArtifactKind::Documentation,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::Requirements => "api_requirements.json",
            ArtifactKind::Architecture => "api_architecture.json",
            ArtifactKind::Endpoints => "api_endpoints.json",
            ArtifactKind::OpenApiSpec => "openapi_specification.json",
            ArtifactKind::Documentation => "api_documentation.md",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::Requirements => "Requirements",
            ArtifactKind::Architecture => "Architecture",
            ArtifactKind::Endpoints => "Endpoints",
            ArtifactKind::OpenApiSpec => "OpenAPI specification",
            ArtifactKind::Documentation => "Documentation",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArtifactContent {
    Json(Value),
    Markdown(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub content: ArtifactContent,
}

impl Artifact {
    pub fn json(kind: ArtifactKind, value: Value) -> Self {
        Self { kind, content: ArtifactContent::Json(value) }
    }

    pub fn markdown(kind: ArtifactKind, text: impl Into<String>) -> Self {
        Self { kind, content: ArtifactContent::Markdown(text.into()) }
    }

    /// Serialized file body. JSON is pretty-printed with a trailing newline.
    pub fn render(&self) -> Result<String> {
        match &self.content {
            ArtifactContent::Json(value) => {
                let mut body = serde_json::to_string_pretty(value).map_err(|e| {
                    Error::ArtifactWrite {
                        path: PathBuf::from(self.kind.file_name()),
                        source: std::io::Error::other(e),
                    }
                })?;
                body.push('\n');
                Ok(body)
            }
            ArtifactContent::Markdown(text) => Ok(text.clone()),
        }
    }
}

/// Writes artifacts into one output directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Write one artifact, replacing any previous file.
    pub async fn write(&self, artifact: &Artifact) -> Result<PathBuf> {
        let path = self.path_for(artifact.kind);
        let body = artifact.render()?;
        let tmp = self.dir.join(format!(".{}.tmp", artifact.kind.file_name()));

        let wrap = |source| Error::ArtifactWrite { path: path.clone(), source };
        tokio::fs::create_dir_all(&self.dir).await.map_err(wrap)?;
        if let Err(e) = tokio::fs::write(&tmp, body.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(wrap(e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(wrap(e));
        }

        tracing::info!(kind = %artifact.kind, path = %path.display(), bytes = body.len(), "Artifact written");
        Ok(path)
    }

    /// Write artifacts in `ArtifactKind::ALL` order. The first failure
    /// aborts the remaining writes; files already written stay in place.
    pub async fn write_all<'a, I>(&self, artifacts: I) -> Result<Vec<PathBuf>>
    where
        I: IntoIterator<Item = &'a Artifact>,
    {
        let mut ordered: Vec<&Artifact> = artifacts.into_iter().collect();
        ordered.sort_by_key(|a| a.kind);

        let mut written = Vec::with_capacity(ordered.len());
        for artifact in ordered {
            written.push(self.write(artifact).await?);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_names_match_artifact_kinds() {
        let names: Vec<_> = ArtifactKind::ALL.iter().map(|k| k.file_name()).collect();
        assert_eq!(
            names,
            [
                "api_requirements.json",
                "api_architecture.json",
                "api_endpoints.json",
                "openapi_specification.json",
                "api_documentation.md"
            ]
        );
    }

    #[test]
    fn json_renders_pretty_with_newline() {
        let a = Artifact::json(ArtifactKind::Requirements, json!({"requirements": "x"}));
        assert_eq!(a.render().unwrap(), "{\n  \"requirements\": \"x\"\n}\n");
    }

    #[test]
    fn markdown_renders_verbatim() {
        let a = Artifact::markdown(ArtifactKind::Documentation, "# API\n");
        assert_eq!(a.render().unwrap(), "# API\n");
    }

    #[tokio::test]
    async fn write_replaces_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        writer
            .write(&Artifact::markdown(ArtifactKind::Documentation, "first"))
            .await
            .unwrap();
        let path = writer
            .write(&Artifact::markdown(ArtifactKind::Documentation, "second"))
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().flatten().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn write_all_follows_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let artifacts = [
            Artifact::markdown(ArtifactKind::Documentation, "doc"),
            Artifact::json(ArtifactKind::Requirements, json!({"requirements": "r"})),
            Artifact::json(ArtifactKind::OpenApiSpec, json!({"openapi": "3.0.0"})),
        ];
        let written = writer.write_all(&artifacts).await.unwrap();
        let names: Vec<_> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            ["api_requirements.json", "openapi_specification.json", "api_documentation.md"]
        );
    }

    #[tokio::test]
    async fn write_into_file_path_fails_with_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "x").unwrap();

        let writer = ArtifactWriter::new(&blocker);
        let err = writer
            .write(&Artifact::markdown(ArtifactKind::Documentation, "doc"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ArtifactWrite { .. }), "{err}");
    }
}
