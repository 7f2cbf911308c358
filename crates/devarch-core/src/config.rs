//! Configuration types for devarch-core.
//!
//! This module defines [`EngineConfig`] (CLI-level settings and overrides),
//! [`ProjectConfig`] (from `.devarch/config.yaml`), and its sub-configuration
//! types. When the engine starts, overrides in `EngineConfig` take precedence
//! over values read from `ProjectConfig`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::gateway::{DEFAULT_ENDPOINT, DEFAULT_MODEL};

// ── Engine Configuration (CLI-level) ─────────────────────────

/// Engine configuration provided by the CLI layer.
///
/// Holds the working directory, the ready-to-use API key and optional
/// overrides for the model and inference endpoint.
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use devarch_core::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .work_dir(PathBuf::from("/tmp/project"))
///     .api_key("secret")
///     .model("meta-llama/Llama-3.3-70B-Instruct-Turbo".to_owned())
///     .build();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
pub struct EngineConfig {
    /// Directory holding `.devarch/`. Relative paths in the project config
    /// resolve against it.
    work_dir: PathBuf,

    /// Bearer token for the inference endpoint.
    #[builder(setter(into))]
    #[serde(skip_serializing)]
    api_key: String,

    /// Override model identifier (takes precedence over config.yaml).
    #[builder(default, setter(into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,

    /// Override inference endpoint URL (takes precedence over config.yaml).
    #[builder(default, setter(into))]
    #[serde(skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
}

impl EngineConfig {
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Returns the `.devarch` directory path.
    pub fn devarch_dir(&self) -> PathBuf {
        self.work_dir.join(".devarch")
    }

    /// Returns the path to `config.yaml` inside the `.devarch` directory.
    pub fn config_path(&self) -> PathBuf {
        self.devarch_dir().join("config.yaml")
    }

    /// Resolve a configured path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_dir.join(path)
        }
    }
}

// ── Project Configuration (.devarch/config.yaml) ────────────

/// Project-level configuration, deserialized from `.devarch/config.yaml`.
///
/// All fields have serde defaults so that missing keys produce a valid
/// configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Inference endpoint and model.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Persona, guideline and template overrides.
    #[serde(default)]
    pub prompts: PromptsConfig,

    /// Architecture diagram rendering.
    #[serde(default)]
    pub diagram: DiagramConfig,
}

/// Inference endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            endpoint: default_endpoint(),
        }
    }
}

/// Prompt asset configuration.
///
/// `persona` and `guidelines` replace the built-in text documents; `include`
/// lists directories whose templates replace built-in templates by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidelines: Option<PathBuf>,

    #[serde(default)]
    pub include: Vec<PathBuf>,
}

/// Architecture diagram configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramConfig {
    /// Render diagrams for infra-focused modes.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Where generated diagram files are written.
    #[serde(default = "default_diagram_dir")]
    pub output_dir: PathBuf,

    /// Graphviz executable used to render PNGs.
    #[serde(default = "default_dot_binary")]
    pub dot_binary: String,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output_dir: default_diagram_dir(),
            dot_binary: default_dot_binary(),
        }
    }
}

// ── Default value functions for serde ────────────────────────

fn default_true() -> bool {
    true
}

fn default_model() -> String {
    DEFAULT_MODEL.to_owned()
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_owned()
}

fn default_diagram_dir() -> PathBuf {
    PathBuf::from(".devarch").join("diagrams")
}

fn default_dot_binary() -> String {
    "dot".to_owned()
}

// ── Config loading ───────────────────────────────────────────

/// Load [`ProjectConfig`] from a `config.yaml` file.
///
/// If the file does not exist, returns the default configuration.
///
/// # Errors
///
/// Returns `CoreError::Io` if the file exists but cannot be read.
/// Returns `CoreError::Config` if the file contains invalid YAML.
pub fn load_project_config(config_path: &Path) -> Result<ProjectConfig, crate::CoreError> {
    if !config_path.exists() {
        return Ok(ProjectConfig::default());
    }
    let content = std::fs::read_to_string(config_path)?;
    if content.trim().is_empty() {
        return Ok(ProjectConfig::default());
    }
    let config: ProjectConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_should_build_engine_config_with_defaults() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/tmp/project"))
            .api_key("key")
            .build();

        assert_eq!(config.work_dir(), Path::new("/tmp/project"));
        assert_eq!(config.api_key(), "key");
        assert!(config.model().is_none());
        assert!(config.endpoint().is_none());
    }

    #[test]
    fn test_should_build_engine_config_with_overrides() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/tmp/project"))
            .api_key("key")
            .model("some/model".to_owned())
            .endpoint("http://localhost:9000/inference".to_owned())
            .build();

        assert_eq!(config.model(), Some("some/model"));
        assert_eq!(config.endpoint(), Some("http://localhost:9000/inference"));
    }

    #[test]
    fn test_should_compute_devarch_paths() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/home/user/project"))
            .api_key("key")
            .build();

        assert_eq!(
            config.devarch_dir(),
            PathBuf::from("/home/user/project/.devarch")
        );
        assert_eq!(
            config.config_path(),
            PathBuf::from("/home/user/project/.devarch/config.yaml")
        );
        assert_eq!(
            config.resolve(Path::new("prompts/intro.txt")),
            PathBuf::from("/home/user/project/prompts/intro.txt")
        );
        assert_eq!(
            config.resolve(Path::new("/etc/intro.txt")),
            PathBuf::from("/etc/intro.txt")
        );
    }

    #[test]
    fn test_should_not_serialize_api_key() {
        let config = EngineConfig::builder()
            .work_dir(PathBuf::from("/tmp/project"))
            .api_key("super-secret")
            .build();

        let value = serde_json::to_value(&config).expect("should serialize");
        assert_eq!(value["work_dir"], json!("/tmp/project"));
        assert!(value.get("api_key").is_none());
        assert!(value.get("model").is_none());
    }

    #[test]
    fn test_should_deserialize_default_project_config() {
        let config: ProjectConfig = serde_yaml::from_str("{}").expect("should parse");

        assert_eq!(config.gateway.model, DEFAULT_MODEL);
        assert_eq!(config.gateway.endpoint, DEFAULT_ENDPOINT);
        assert!(config.prompts.persona.is_none());
        assert!(config.prompts.include.is_empty());
        assert!(config.diagram.enabled);
        assert_eq!(config.diagram.output_dir, PathBuf::from(".devarch/diagrams"));
        assert_eq!(config.diagram.dot_binary, "dot");
    }

    #[test]
    fn test_should_deserialize_full_project_config() {
        let yaml = r#"
gateway:
  model: mistralai/Mixtral-8x7B-Instruct-v0.1
  endpoint: http://localhost:8080/inference
prompts:
  persona: prompts/devops_intro.txt
  guidelines: prompts/writing_guidelines.txt
  include:
    - prompts/templates
diagram:
  enabled: false
  outputDir: out/diagrams
  dotBinary: /usr/local/bin/dot
"#;

        let config: ProjectConfig = serde_yaml::from_str(yaml).expect("should parse YAML");

        assert_eq!(config.gateway.model, "mistralai/Mixtral-8x7B-Instruct-v0.1");
        assert_eq!(config.gateway.endpoint, "http://localhost:8080/inference");
        assert_eq!(
            config.prompts.persona.as_deref(),
            Some(Path::new("prompts/devops_intro.txt"))
        );
        assert_eq!(config.prompts.include.len(), 1);
        assert!(!config.diagram.enabled);
        assert_eq!(config.diagram.output_dir, PathBuf::from("out/diagrams"));
        assert_eq!(config.diagram.dot_binary, "/usr/local/bin/dot");
    }

    #[test]
    fn test_should_load_default_when_config_file_missing() {
        let config =
            load_project_config(Path::new("/nonexistent/config.yaml")).expect("should default");
        assert_eq!(config.gateway.model, DEFAULT_MODEL);
        assert!(config.diagram.enabled);
    }

    #[test]
    fn test_should_load_default_for_empty_file() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").expect("should write config");

        let config = load_project_config(&path).expect("should default");
        assert_eq!(config.gateway.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn test_should_load_config_from_tempfile() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "gateway:\n  model: test-model\n").expect("should write config");

        let config = load_project_config(&path).expect("should load config");
        assert_eq!(config.gateway.model, "test-model");
        assert_eq!(config.gateway.endpoint, DEFAULT_ENDPOINT);
        assert!(config.diagram.enabled);
    }

    #[test]
    fn test_should_reject_invalid_yaml() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "gateway: [not, a, map]\n").expect("should write config");

        let err = load_project_config(&path).unwrap_err();
        assert!(matches!(err, crate::CoreError::Config(_)));
    }
}
