//! Session orchestration.
//!
//! The [`Engine`] is the main entry point for devarch-core. It owns the
//! prompt composer, the inference gateway and the diagram renderer, all
//! immutable after construction, and drives one [`Session`] at a time
//! through generate and continue actions. Sessions hold all mutable state,
//! so one engine can serve any number of independent sessions.

use devarch_pm::{CONTINUE_CUE, OutputMode, PromptAssets, PromptComposer, PromptManager, PromptRequest};
use tracing::{debug, error, info, instrument, warn};

use crate::config::{EngineConfig, ProjectConfig, load_project_config};
use crate::diagram::{DiagramOutcome, DiagramRenderer, GraphvizRenderer, NoDiagram};
use crate::error::CoreError;
use crate::gateway::{InferenceClient, ModelGateway};
use crate::presenter::{
    CONTINUED_HEADING, DIAGRAM_CAPTION, DIAGRAM_HEADING, EMPTY_NEED_WARNING, Presenter,
    SOLUTION_HEADING,
};
use crate::sanitizer;
use crate::session::{Session, SessionPhase};

/// Result of a generate action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// The user need was empty; nothing was sent and the session is unchanged.
    Rejected,
    /// An answer was produced (possibly an error message from the endpoint).
    Answered(Answer),
}

/// The answer shown for a generate action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Cleaned answer text, as stored in the session.
    pub text: String,
    /// What happened on the diagram path.
    pub diagram: DiagramOutcome,
}

/// Drives the prompt → completion → cleanup pipeline for sessions.
///
/// # Examples
///
/// ```no_run
/// use std::path::PathBuf;
/// use devarch_core::{Engine, EngineConfig, Session};
///
/// # fn example() -> Result<(), devarch_core::CoreError> {
/// let config = EngineConfig::builder()
///     .work_dir(PathBuf::from("."))
///     .api_key("secret")
///     .build();
///
/// let engine = Engine::new(config)?;
/// let mut session = Session::new();
/// # let _ = (engine, &mut session);
/// # Ok(())
/// # }
/// ```
pub struct Engine {
    composer: PromptComposer,
    gateway: Box<dyn ModelGateway>,
    renderer: Box<dyn DiagramRenderer>,
    model: String,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("composer", &self.composer)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine from CLI configuration.
    ///
    /// Loads `.devarch/config.yaml` (defaults if missing), the prompt assets
    /// and template overrides it names, and sets up the HTTP gateway and the
    /// Graphviz renderer. CLI overrides take precedence over the file.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Config` if the config file is invalid and
    /// `CoreError::Prompt` if assets or templates cannot be loaded.
    #[instrument(skip_all)]
    pub fn new(config: EngineConfig) -> Result<Self, CoreError> {
        info!(dir = %config.work_dir().display(), "initializing engine");

        let project_config = load_project_config(&config.config_path())?;
        let composer = build_composer(&config, &project_config)?;

        let endpoint = config
            .endpoint()
            .unwrap_or(&project_config.gateway.endpoint)
            .to_owned();
        let model = config
            .model()
            .map(String::from)
            .unwrap_or_else(|| project_config.gateway.model.clone());
        let gateway = InferenceClient::new(config.api_key()).with_endpoint(endpoint);

        let diagram = &project_config.diagram;
        let renderer: Box<dyn DiagramRenderer> = if diagram.enabled {
            Box::new(GraphvizRenderer::new(
                config.resolve(&diagram.output_dir),
                diagram.dot_binary.clone(),
            ))
        } else {
            Box::new(NoDiagram)
        };

        debug!(model = %model, endpoint = gateway.endpoint(), diagrams = diagram.enabled, "engine ready");
        Ok(Self::from_parts(composer, Box::new(gateway), renderer, model))
    }

    /// Assemble an engine from already-built collaborators.
    pub fn from_parts(
        composer: PromptComposer,
        gateway: Box<dyn ModelGateway>,
        renderer: Box<dyn DiagramRenderer>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            composer,
            gateway,
            renderer,
            model: model.into(),
        }
    }

    /// Model identifier sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn composer(&self) -> &PromptComposer {
        &self.composer
    }

    /// Generate a fresh answer for `request`.
    ///
    /// An empty user need is rejected with a warning before anything is
    /// sent. Otherwise the composed prompt and the cleaned answer replace
    /// the session's conversation state and the session becomes `Ready`.
    /// Endpoint and transport failures become the answer text. Infra-focused
    /// modes also get a diagram; diagram failures never fail the action.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Prompt` if the prompt template fails to render.
    #[instrument(skip_all, fields(mode = request.mode().name()))]
    pub async fn generate(
        &self,
        session: &mut Session,
        request: &PromptRequest,
        presenter: &mut dyn Presenter,
    ) -> Result<GenerateOutcome, CoreError> {
        if !request.has_user_need() {
            warn!("generate requested without a problem statement");
            presenter.warn(EMPTY_NEED_WARNING);
            return Ok(GenerateOutcome::Rejected);
        }

        let prompt = self.composer.compose(request)?;

        session.set_phase(SessionPhase::Generating);
        let text = self.ask(prompt.as_str()).await;
        session.state_mut().record(prompt.into_string(), text.clone());
        session.set_mode(request.mode());
        session.set_phase(SessionPhase::Ready);
        info!(answer_len = text.len(), "answer generated");

        presenter.answer(SOLUTION_HEADING, &text);
        let diagram = self.diagram_for(request.mode(), &text, presenter).await;

        Ok(GenerateOutcome::Answered(Answer { text, diagram }))
    }

    /// Ask the model to continue the current answer.
    ///
    /// Resends the last prompt with a continue cue, cleans the reply and
    /// appends it to the accumulated answer after a blank line. The full
    /// accumulated answer is presented. Returns the appended text.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NothingToContinue` if the session has no answer yet.
    #[instrument(skip_all)]
    pub async fn continue_answer(
        &self,
        session: &mut Session,
        presenter: &mut dyn Presenter,
    ) -> Result<String, CoreError> {
        if !session.state().can_continue() {
            return Err(CoreError::NothingToContinue);
        }

        let followup = format!("{}{CONTINUE_CUE}", session.state().last_prompt());

        session.set_phase(SessionPhase::Continuing);
        let text = self.ask(&followup).await;
        session.state_mut().append(&text);
        session.set_phase(SessionPhase::Ready);
        info!(
            appended_len = text.len(),
            total_len = session.state().accumulated_answer().len(),
            "answer continued"
        );

        presenter.answer(CONTINUED_HEADING, session.state().accumulated_answer());
        Ok(text)
    }

    /// One gateway round trip, folded into display text and cleaned.
    async fn ask(&self, prompt: &str) -> String {
        let raw = match self.gateway.complete(prompt, &self.model).await {
            Ok(reply) => reply.into_display_text(),
            Err(e) => {
                error!(error = %e, "inference request failed");
                format!("❌ Request failed: {e}")
            }
        };
        sanitizer::clean(&raw)
    }

    async fn diagram_for(
        &self,
        mode: OutputMode,
        text: &str,
        presenter: &mut dyn Presenter,
    ) -> DiagramOutcome {
        if !mode.wants_diagram() {
            return DiagramOutcome::NotRequested;
        }

        presenter.diagram_section(DIAGRAM_HEADING);
        match self.renderer.render(text).await {
            Ok(Some(image)) => {
                debug!(path = %image.path().display(), "diagram rendered");
                presenter.diagram(&image, DIAGRAM_CAPTION);
                DiagramOutcome::Rendered(image)
            }
            Ok(None) => DiagramOutcome::Empty,
            Err(e) => {
                warn!(error = %e, "diagram rendering failed");
                DiagramOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Build the prompt composer from configured assets and template directories.
fn build_composer(
    config: &EngineConfig,
    project_config: &ProjectConfig,
) -> Result<PromptComposer, CoreError> {
    let mut manager = PromptManager::new()?;
    for dir in &project_config.prompts.include {
        let resolved = config.resolve(dir);
        if resolved.is_dir() {
            manager.load_dir(&resolved)?;
            debug!(dir = %resolved.display(), "loaded custom prompt directory");
        }
    }

    let persona = project_config
        .prompts
        .persona
        .as_deref()
        .map(|p| config.resolve(p));
    let guidelines = project_config
        .prompts
        .guidelines
        .as_deref()
        .map(|p| config.resolve(p));
    let assets = PromptAssets::load(persona.as_deref(), guidelines.as_deref())?;

    Ok(PromptComposer::new(manager, assets))
}
