//! Prompt composition.
//!
//! [`PromptComposer`] turns a [`PromptRequest`] into a single
//! [`ComposedPrompt`] by rendering the `devops/prompt` template with the
//! request, the persona preamble and the writing guidelines. Block order is
//! fixed by the template: config file (only when present), user need,
//! persona, writing guidelines, mode instruction, closing directive and the
//! `Assistant:` cue.

use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::debug;

use crate::error::PmError;
use crate::manager::PromptManager;
use crate::mode::OutputMode;

/// Appended to the previous prompt to ask the model to keep going.
pub const CONTINUE_CUE: &str = "\n\nContinue from where you left off:\n";

const PROMPT_TEMPLATE: &str = "devops/prompt";

const BUILTIN_PERSONA: &str = include_str!("../assets/devops_intro.txt");
const BUILTIN_GUIDELINES: &str = include_str!("../assets/writing_guidelines.txt");

// ── Request ──────────────────────────────────────────────────

/// One generate action's input: what the user needs, an optional uploaded
/// file, and the requested output mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    user_need: String,
    file_content: Option<String>,
    mode: OutputMode,
}

impl PromptRequest {
    /// Create a request without file content.
    pub fn new(user_need: impl Into<String>, mode: OutputMode) -> Self {
        Self {
            user_need: user_need.into(),
            file_content: None,
            mode,
        }
    }

    /// Attach the decoded content of an uploaded file.
    pub fn with_file_content(mut self, content: impl Into<String>) -> Self {
        self.file_content = Some(content.into());
        self
    }

    pub fn user_need(&self) -> &str {
        &self.user_need
    }

    pub fn file_content(&self) -> Option<&str> {
        self.file_content.as_deref()
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// True when the user need has at least one non-whitespace character.
    pub fn has_user_need(&self) -> bool {
        !self.user_need.trim().is_empty()
    }
}

// ── Assets ───────────────────────────────────────────────────

/// The persona preamble and writing guidelines, loaded once at startup and
/// embedded verbatim into every prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAssets {
    persona: String,
    guidelines: String,
}

impl PromptAssets {
    pub fn new(persona: impl Into<String>, guidelines: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            guidelines: guidelines.into(),
        }
    }

    /// The assets shipped with the crate.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_PERSONA, BUILTIN_GUIDELINES)
    }

    /// Load assets from files, using the built-in text for any path not given.
    ///
    /// # Errors
    ///
    /// Returns `PmError::Io` if a given file cannot be read.
    pub fn load(persona: Option<&Path>, guidelines: Option<&Path>) -> Result<Self, PmError> {
        let persona = match persona {
            Some(path) => {
                debug!(path = %path.display(), "loading persona preamble");
                fs::read_to_string(path)?
            }
            None => BUILTIN_PERSONA.to_owned(),
        };
        let guidelines = match guidelines {
            Some(path) => {
                debug!(path = %path.display(), "loading writing guidelines");
                fs::read_to_string(path)?
            }
            None => BUILTIN_GUIDELINES.to_owned(),
        };
        Ok(Self { persona, guidelines })
    }

    pub fn persona(&self) -> &str {
        &self.persona
    }

    pub fn guidelines(&self) -> &str {
        &self.guidelines
    }
}

impl Default for PromptAssets {
    fn default() -> Self {
        Self::builtin()
    }
}

// ── Composed prompt ──────────────────────────────────────────

/// Prompt text ready to send to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposedPrompt(String);

impl ComposedPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for ComposedPrompt {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComposedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Composer ─────────────────────────────────────────────────

/// Builds prompts from requests. Holds the template manager and the assets;
/// both are immutable after construction.
#[derive(Debug)]
pub struct PromptComposer {
    manager: PromptManager,
    assets: PromptAssets,
}

impl PromptComposer {
    pub fn new(manager: PromptManager, assets: PromptAssets) -> Self {
        Self { manager, assets }
    }

    /// A composer with built-in templates and assets.
    ///
    /// # Errors
    ///
    /// Returns `PmError::InvalidTemplate` if a built-in template fails to parse.
    pub fn builtin() -> Result<Self, PmError> {
        Ok(Self::new(PromptManager::new()?, PromptAssets::builtin()))
    }

    /// Compose the prompt for a request.
    ///
    /// User need and file content are trimmed before embedding. The config
    /// file block is left out when the trimmed file content is empty.
    ///
    /// # Errors
    ///
    /// Returns `PmError::RenderError` if the template (possibly a user
    /// override) fails to render.
    pub fn compose(&self, request: &PromptRequest) -> Result<ComposedPrompt, PmError> {
        let ctx = json!({
            "file_content": request.file_content().map(str::trim).unwrap_or_default(),
            "user_need": request.user_need().trim(),
            "persona": self.assets.persona(),
            "guidelines": self.assets.guidelines(),
            "instruction": request.mode().instruction(),
        });
        let prompt = self.manager.render(PROMPT_TEMPLATE, &ctx)?;
        debug!(mode = request.mode().name(), len = prompt.len(), "composed prompt");
        Ok(ComposedPrompt(prompt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::PromptTemplate;

    fn composer() -> PromptComposer {
        PromptComposer::new(
            PromptManager::new().expect("should create manager"),
            PromptAssets::new("PERSONA", "GUIDELINES"),
        )
    }

    #[test]
    fn test_should_render_exact_layout_without_file() {
        let prompt = composer()
            .compose(&PromptRequest::new("Deploy a blog", OutputMode::Explain))
            .expect("should compose");

        let expected = "=== USER NEED ===\nDeploy a blog\n\nPERSONA\n\n\
            === WRITING GUIDELINES ===\nGUIDELINES\n\n\
            Now act like a senior DevOps engineer. Explain how this setup works in plain English, step by step.\n\
            Do not add generic closings. Don’t say 'let’s work together'. Don’t repeat or ask questions at the end.\n\n\
            Assistant:";
        assert_eq!(prompt.as_str(), expected);
    }

    #[test]
    fn test_should_put_file_block_first() {
        let request = PromptRequest::new("Review this", OutputMode::CodeOnly)
            .with_file_content("\n  on: push\n");
        let prompt = composer().compose(&request).expect("should compose");

        assert!(
            prompt
                .as_str()
                .starts_with("=== CONFIG FILE ===\non: push\n\n=== USER NEED ===\nReview this\n\n")
        );
    }

    #[test]
    fn test_should_include_only_selected_instruction() {
        let composer = composer();
        for mode in OutputMode::ALL {
            let prompt = composer
                .compose(&PromptRequest::new("need", mode))
                .expect("should compose");
            for other in OutputMode::ALL {
                assert_eq!(
                    prompt.as_str().contains(other.instruction()),
                    other == mode,
                    "mode {mode:?} vs {other:?}"
                );
            }
        }
    }

    #[test]
    fn test_should_omit_file_block_for_empty_content() {
        let composer = composer();
        for content in [None, Some(""), Some("  \n\t ")] {
            let mut request = PromptRequest::new("need", OutputMode::FullSetup);
            if let Some(c) = content {
                request = request.with_file_content(c);
            }
            let prompt = composer.compose(&request).expect("should compose");
            assert!(!prompt.as_str().contains("=== CONFIG FILE ==="));
        }
    }

    #[test]
    fn test_should_trim_user_need() {
        let prompt = composer()
            .compose(&PromptRequest::new("  need  ", OutputMode::InfraOnly))
            .expect("should compose");
        assert!(prompt.as_str().contains("=== USER NEED ===\nneed\n\n"));
    }

    #[test]
    fn test_should_keep_block_order() {
        let request =
            PromptRequest::new("need", OutputMode::SreDoc).with_file_content("resource {}");
        let prompt = composer().compose(&request).expect("should compose");
        let text = prompt.as_str();

        let positions: Vec<usize> = [
            "=== CONFIG FILE ===",
            "=== USER NEED ===",
            "PERSONA",
            "=== WRITING GUIDELINES ===",
            "Now act like a senior DevOps engineer.",
            "Do not add generic closings.",
            "Assistant:",
        ]
        .iter()
        .map(|marker| text.find(marker).expect("marker should be present"))
        .collect();

        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.ends_with("Assistant:"));
    }

    #[test]
    fn test_should_use_builtin_assets() {
        let composer = PromptComposer::builtin().expect("should create composer");
        let prompt = composer
            .compose(&PromptRequest::new("need", OutputMode::FullSetup))
            .expect("should compose");

        assert!(prompt.as_str().contains(BUILTIN_PERSONA));
        assert!(prompt.as_str().contains(BUILTIN_GUIDELINES));
    }

    #[test]
    fn test_should_load_assets_from_files() {
        let dir = tempfile::tempdir().expect("should create temp dir");
        let persona = dir.path().join("intro.txt");
        std::fs::write(&persona, "Custom persona\n").expect("should write persona");

        let assets = PromptAssets::load(Some(&persona), None).expect("should load assets");
        assert_eq!(assets.persona(), "Custom persona\n");
        assert_eq!(assets.guidelines(), BUILTIN_GUIDELINES);
    }

    #[test]
    fn test_should_fail_loading_missing_asset() {
        let err = PromptAssets::load(Some(Path::new("/nonexistent/intro.txt")), None).unwrap_err();
        assert!(matches!(err, PmError::Io(_)));
    }

    #[test]
    fn test_should_use_overridden_template() {
        let mut manager = PromptManager::new().expect("should create manager");
        manager
            .add_template(PromptTemplate::new(
                PROMPT_TEMPLATE,
                "{{ instruction }} | {{ user_need }}",
            ))
            .expect("should override template");
        let composer = PromptComposer::new(manager, PromptAssets::default());

        let prompt = composer
            .compose(&PromptRequest::new(" x ", OutputMode::Explain))
            .expect("should compose");
        assert_eq!(
            prompt.as_str(),
            format!("{} | x", OutputMode::Explain.instruction())
        );
    }

    #[test]
    fn test_should_report_user_need_presence() {
        assert!(PromptRequest::new(" a ", OutputMode::Explain).has_user_need());
        assert!(!PromptRequest::new(" \n ", OutputMode::Explain).has_user_need());
    }
}
