//! Architecture diagram collaborator.
//!
//! The engine hands the cleaned answer to a [`DiagramRenderer`] and only
//! checks whether an [`ImageHandle`] came back. Rendering problems never
//! reach the user as errors; the engine folds them into
//! [`DiagramOutcome::Failed`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument};

use crate::error::CoreError;

/// Reference topology drawn for infra-focused answers.
const ARCHITECTURE_DOT: &str = r##"digraph architecture {
  label="Web App Infra on AWS";
  labelloc="t";
  fontname="Helvetica";
  rankdir=LR;
  node [shape=box, style="rounded,filled", fillcolor="#f5f5f5", fontname="Helvetica"];

  subgraph cluster_vpc {
    label="VPC";
    frontend [label="React App\n(S3)"];
    elb [label="ALB\n(ELB)"];
    backend [label="Node.js App\n(EC2)"];
    db [label="PostgreSQL\n(RDS)", shape=cylinder];
  }

  frontend -> elb -> backend -> db;
}
"##;

const DIAGRAM_STEM: &str = "generated_architecture";

/// Location of a rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle(PathBuf);

impl ImageHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// What happened on the diagram path of a generate action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramOutcome {
    /// The output mode does not call for a diagram.
    NotRequested,
    /// The renderer produced an image.
    Rendered(ImageHandle),
    /// The renderer ran but produced nothing.
    Empty,
    /// The renderer failed; the reason is kept for logs and tests.
    Failed(String),
}

impl DiagramOutcome {
    pub fn image(&self) -> Option<&ImageHandle> {
        match self {
            DiagramOutcome::Rendered(image) => Some(image),
            _ => None,
        }
    }
}

/// Renders a picture for an answer.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render a diagram for `answer`, returning `None` when no image was
    /// produced.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Diagram` or `CoreError::Io` on failure.
    async fn render(&self, answer: &str) -> Result<Option<ImageHandle>, CoreError>;
}

/// Renderer used when diagrams are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDiagram;

#[async_trait]
impl DiagramRenderer for NoDiagram {
    async fn render(&self, _answer: &str) -> Result<Option<ImageHandle>, CoreError> {
        Ok(None)
    }
}

/// Writes the reference topology as DOT and renders it to PNG with Graphviz.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    output_dir: PathBuf,
    dot_binary: String,
}

impl GraphvizRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, dot_binary: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            dot_binary: dot_binary.into(),
        }
    }

    pub fn dot_path(&self) -> PathBuf {
        self.output_dir.join(format!("{DIAGRAM_STEM}.dot"))
    }

    pub fn png_path(&self) -> PathBuf {
        self.output_dir.join(format!("{DIAGRAM_STEM}.png"))
    }
}

#[async_trait]
impl DiagramRenderer for GraphvizRenderer {
    #[instrument(skip_all, fields(dir = %self.output_dir.display()))]
    async fn render(&self, answer: &str) -> Result<Option<ImageHandle>, CoreError> {
        debug!(answer_len = answer.len(), "rendering architecture diagram");

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let dot_path = self.dot_path();
        let png_path = self.png_path();
        tokio::fs::write(&dot_path, ARCHITECTURE_DOT).await?;

        let output = Command::new(&self.dot_binary)
            .arg("-Tpng")
            .arg("-o")
            .arg(&png_path)
            .arg(&dot_path)
            .output()
            .await
            .map_err(|e| CoreError::Diagram(format!("failed to run {}: {e}", self.dot_binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Diagram(format!(
                "{} exited with {}: {}",
                self.dot_binary,
                output.status,
                stderr.trim()
            )));
        }

        if tokio::fs::try_exists(&png_path).await? {
            Ok(Some(ImageHandle::new(png_path)))
        } else {
            Ok(None)
        }
    }
}
