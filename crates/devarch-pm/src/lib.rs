mod composer;
mod error;
mod manager;
mod mode;
mod template;

pub use composer::{CONTINUE_CUE, ComposedPrompt, PromptAssets, PromptComposer, PromptRequest};
pub use error::PmError;
pub use manager::PromptManager;
pub use mode::OutputMode;
pub use template::PromptTemplate;
