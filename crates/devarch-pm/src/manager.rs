use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use minijinja::{Environment, ErrorKind, UndefinedBehavior};
use tracing::debug;

use crate::error::PmError;
use crate::template::PromptTemplate;

/// Templates compiled into the binary. Files loaded with
/// [`PromptManager::load_dir`] replace these by name.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[(
    "devops/prompt",
    include_str!("../templates/devops/prompt.j2"),
)];

/// File extensions recognized as templates by [`PromptManager::load_dir`].
const TEMPLATE_EXTENSIONS: &[&str] = &["j2", "jinja"];

/// Manages prompt templates and renders them with context variables.
///
/// Rendering is strict: a template that references a variable missing from
/// the context fails instead of silently rendering an empty string.
#[derive(Debug)]
pub struct PromptManager {
    env: Environment<'static>,
    names: BTreeSet<String>,
}

impl PromptManager {
    /// Create a manager preloaded with the built-in templates.
    ///
    /// # Errors
    ///
    /// Returns `PmError::InvalidTemplate` if a built-in template fails to parse.
    pub fn new() -> Result<Self, PmError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);

        let mut manager = Self {
            env,
            names: BTreeSet::new(),
        };
        for (name, source) in BUILTIN_TEMPLATES {
            manager.add_template(PromptTemplate::new(*name, *source))?;
        }
        Ok(manager)
    }

    /// Load all `.j2` / `.jinja` templates from a directory, recursively.
    ///
    /// A file at `<dir>/devops/prompt.j2` is registered as `devops/prompt`,
    /// replacing any template already registered under that name.
    /// Returns the number of templates loaded.
    ///
    /// # Errors
    ///
    /// Returns `PmError::Io` if the directory cannot be read and
    /// `PmError::InvalidTemplate` if a file does not parse.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, PmError> {
        let mut loaded = 0;
        self.load_dir_inner(dir, dir, &mut loaded)?;
        debug!(dir = %dir.display(), loaded, "loaded prompt templates");
        Ok(loaded)
    }

    fn load_dir_inner(&mut self, root: &Path, dir: &Path, loaded: &mut usize) -> Result<(), PmError> {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_dir() {
                self.load_dir_inner(root, &path, loaded)?;
                continue;
            }

            let is_template = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| TEMPLATE_EXTENSIONS.contains(&e));
            if !is_template {
                continue;
            }

            let Ok(relative) = path.with_extension("").strip_prefix(root).map(Path::to_path_buf)
            else {
                continue;
            };
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let source = fs::read_to_string(&path)?;
            self.add_template(PromptTemplate::new(name, source))?;
            *loaded += 1;
        }
        Ok(())
    }

    /// Register a single template, replacing one with the same name.
    ///
    /// # Errors
    ///
    /// Returns `PmError::InvalidTemplate` if the source does not parse.
    pub fn add_template(&mut self, template: PromptTemplate) -> Result<(), PmError> {
        let PromptTemplate { name, source } = template;
        self.env
            .add_template_owned(name.clone(), source)
            .map_err(|e| PmError::InvalidTemplate(format!("{name}: {e}")))?;
        self.names.insert(name);
        Ok(())
    }

    /// Render a template by name with the given context.
    ///
    /// # Errors
    ///
    /// Returns `PmError::TemplateNotFound` for an unknown name and
    /// `PmError::RenderError` if rendering fails.
    pub fn render(&self, name: &str, ctx: &serde_json::Value) -> Result<String, PmError> {
        let template = self.env.get_template(name).map_err(|e| match e.kind() {
            ErrorKind::TemplateNotFound => PmError::TemplateNotFound(name.to_owned()),
            _ => PmError::InvalidTemplate(e.to_string()),
        })?;
        template
            .render(ctx)
            .map_err(|e| PmError::RenderError(format!("{name}: {e}")))
    }

    /// Names of all registered templates, sorted.
    pub fn list_templates(&self) -> Vec<&str> {
        self.names.iter().map(String::as_str).collect()
    }
}
