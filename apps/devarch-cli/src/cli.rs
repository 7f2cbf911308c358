use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use devarch_core::{
    Engine, EngineConfig, GenerateOutcome, OutputMode, PromptRequest, QuickStart, Session,
};
use tracing::info;

use crate::output::TextPresenter;
use crate::tui::{self, Upload};
use crate::upload::read_upload;

#[derive(Debug, Parser)]
#[command(
    name = "devarch",
    about = "DevOps architect assistant: infrastructure answers from an LLM"
)]
pub struct Cli {
    /// Project directory holding `.devarch/`
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    pub work_dir: PathBuf,

    /// API key for the inference endpoint
    #[arg(long, global = true, env = "TOGETHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model override
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Inference endpoint override
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate one answer and print it to stdout
    Ask {
        /// Problem statement (falls back to --preset when empty)
        need: Option<String>,

        /// Configuration file to review (yaml, yml, tf, json, sh)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output mode
        #[arg(short, long, default_value = "full-setup")]
        mode: OutputMode,

        /// Quick-start problem statement
        #[arg(short, long, value_enum)]
        preset: Option<PresetArg>,

        /// Ask the model to continue the answer this many times
        #[arg(long = "continue", default_value_t = 0, value_name = "N")]
        continues: u32,
    },

    /// Start an interactive terminal session
    Tui {
        /// Configuration file to review (yaml, yml, tf, json, sh)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Initial output mode
        #[arg(short, long, default_value = "full-setup")]
        mode: OutputMode,
    },
}

/// Quick-start presets as command-line values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    SecureAws,
    GithubActions,
    TerraformS3Ec2,
}

impl From<PresetArg> for QuickStart {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::SecureAws => QuickStart::SecureAws,
            PresetArg::GithubActions => QuickStart::GithubActions,
            PresetArg::TerraformS3Ec2 => QuickStart::TerraformS3Ec2,
        }
    }
}

impl Cli {
    /// Log directory name for the selected command.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Ask { .. } => "ask",
            Commands::Tui { .. } => "tui",
        }
    }

    /// The TUI owns the terminal, so it must not log to stderr.
    pub fn logs_to_stderr(&self) -> bool {
        !matches!(self.command, Commands::Tui { .. })
    }

    pub async fn run(self) -> Result<()> {
        let engine = self.engine()?;
        match self.command {
            Commands::Ask {
                need,
                file,
                mode,
                preset,
                continues,
            } => {
                let need = resolve_need(need, preset.map(QuickStart::from));
                let content = read_upload(file.as_deref())?;
                ask(&engine, build_request(need, content, mode), continues).await
            }
            Commands::Tui { file, mode } => {
                let upload = match file {
                    Some(path) => Some(Upload {
                        name: display_name(&path),
                        content: read_upload(Some(&path))?,
                    }),
                    None => None,
                };
                tui::run(engine, upload, mode).await
            }
        }
    }

    fn engine(&self) -> Result<Engine> {
        let Some(api_key) = self.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            bail!("missing API key: set TOGETHER_API_KEY or pass --api-key");
        };
        let config = EngineConfig::builder()
            .work_dir(self.work_dir.clone())
            .api_key(api_key)
            .model(self.model.clone())
            .endpoint(self.endpoint.clone())
            .build();
        Engine::new(config).context("failed to initialize engine")
    }
}

async fn ask(engine: &Engine, request: PromptRequest, continues: u32) -> Result<()> {
    let mut session = Session::new();
    let mut presenter = TextPresenter::new(io::stdout());

    let outcome = engine
        .generate(&mut session, &request, &mut presenter)
        .await?;
    if outcome == GenerateOutcome::Rejected {
        bail!("no problem statement: pass NEED or --preset");
    }

    for round in 1..=continues {
        info!(round, "continuing answer");
        engine.continue_answer(&mut session, &mut presenter).await?;
    }
    Ok(())
}

/// A blank need falls back to the preset's problem statement.
fn resolve_need(need: Option<String>, preset: Option<QuickStart>) -> String {
    match (need, preset) {
        (Some(need), _) if !need.trim().is_empty() => need,
        (_, Some(preset)) => preset.prompt().to_owned(),
        (need, None) => need.unwrap_or_default(),
    }
}

fn build_request(need: String, file_content: String, mode: OutputMode) -> PromptRequest {
    let request = PromptRequest::new(need, mode);
    if file_content.trim().is_empty() {
        request
    } else {
        request.with_file_content(file_content)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_ask_with_defaults() {
        let cli = Cli::try_parse_from(["devarch", "ask", "Deploy a blog"]).expect("should parse");
        assert_eq!(cli.work_dir, PathBuf::from("."));
        assert_eq!(cli.command_name(), "ask");
        assert!(cli.logs_to_stderr());
        match cli.command {
            Commands::Ask {
                need,
                mode,
                preset,
                continues,
                file,
            } => {
                assert_eq!(need.as_deref(), Some("Deploy a blog"));
                assert_eq!(mode, OutputMode::FullSetup);
                assert!(preset.is_none());
                assert!(file.is_none());
                assert_eq!(continues, 0);
            }
            Commands::Tui { .. } => panic!("expected ask"),
        }
    }

    #[test]
    fn test_should_parse_ask_options() {
        let cli = Cli::try_parse_from([
            "devarch",
            "ask",
            "--mode",
            "sre-doc",
            "--preset",
            "terraform-s3-ec2",
            "--continue",
            "2",
            "--model",
            "some/model",
            "-C",
            "/srv/project",
        ])
        .expect("should parse");
        assert_eq!(cli.model.as_deref(), Some("some/model"));
        assert_eq!(cli.work_dir, PathBuf::from("/srv/project"));
        match cli.command {
            Commands::Ask {
                mode,
                preset,
                continues,
                ..
            } => {
                assert_eq!(mode, OutputMode::SreDoc);
                assert_eq!(preset, Some(PresetArg::TerraformS3Ec2));
                assert_eq!(continues, 2);
            }
            Commands::Tui { .. } => panic!("expected ask"),
        }
    }

    #[test]
    fn test_should_reject_unknown_mode() {
        assert!(Cli::try_parse_from(["devarch", "ask", "x", "--mode", "poetry"]).is_err());
    }

    #[test]
    fn test_should_not_log_tui_to_stderr() {
        let cli = Cli::try_parse_from(["devarch", "tui", "--file", "ci.yml"]).expect("should parse");
        assert_eq!(cli.command_name(), "tui");
        assert!(!cli.logs_to_stderr());
    }

    #[test]
    fn test_should_prefer_need_over_preset() {
        assert_eq!(
            resolve_need(Some("mine".into()), Some(QuickStart::SecureAws)),
            "mine"
        );
        assert_eq!(
            resolve_need(Some("  ".into()), Some(QuickStart::SecureAws)),
            QuickStart::SecureAws.prompt()
        );
        assert_eq!(resolve_need(None, None), "");
    }

    #[test]
    fn test_should_map_every_preset_arg() {
        let mapped: Vec<QuickStart> = PresetArg::value_variants()
            .iter()
            .map(|&arg| arg.into())
            .collect();
        assert_eq!(mapped, QuickStart::ALL.to_vec());
    }

    #[test]
    fn test_should_drop_blank_file_content() {
        let request = build_request("need".into(), " \n".into(), OutputMode::Explain);
        assert!(request.file_content().is_none());

        let request = build_request("need".into(), "on: push".into(), OutputMode::Explain);
        assert_eq!(request.file_content(), Some("on: push"));
    }

    #[test]
    fn test_should_require_api_key() {
        let cli = Cli::try_parse_from(["devarch", "--api-key", " ", "ask", "x"])
            .expect("should parse");
        let err = cli.engine().unwrap_err();
        assert!(err.to_string().contains("missing API key"));
    }
}
