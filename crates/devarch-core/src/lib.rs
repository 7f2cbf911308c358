mod config;
mod diagram;
mod engine;
mod error;
mod gateway;
mod preset;
mod presenter;
mod sanitizer;
mod session;

pub use config::{
    DiagramConfig, EngineConfig, GatewayConfig, ProjectConfig, PromptsConfig, load_project_config,
};
pub use diagram::{DiagramOutcome, DiagramRenderer, GraphvizRenderer, ImageHandle, NoDiagram};
pub use engine::{Answer, Engine, GenerateOutcome};
pub use error::CoreError;
pub use gateway::{
    DEFAULT_ENDPOINT, DEFAULT_MODEL, InferenceClient, MAX_TOKENS, ModelGateway, ModelReply,
    TEMPERATURE,
};
pub use preset::QuickStart;
pub use presenter::{
    CONTINUED_HEADING, DIAGRAM_CAPTION, DIAGRAM_HEADING, EMPTY_NEED_WARNING, Presenter,
    SOLUTION_HEADING,
};
pub use sanitizer::{FILLER_PHRASES, clean};
pub use session::{ConversationState, Session, SessionPhase};

pub use devarch_pm::{OutputMode, PromptRequest};
