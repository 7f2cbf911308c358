//! Output modes selectable by the user.
//!
//! Each [`OutputMode`] carries exactly one instruction sentence that is
//! embedded verbatim into the composed prompt, plus a display label for the
//! terminal surfaces.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PmError;

/// The shape of answer the user asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Infra, CI/CD, app setup, security and sample code.
    #[default]
    FullSetup,
    /// Infrastructure setup only.
    InfraOnly,
    /// Application code and deployment configs only.
    CodeOnly,
    /// Internal SRE runbook style.
    SreDoc,
    /// Plain-English walkthrough.
    Explain,
}

impl OutputMode {
    /// All modes in display order.
    pub const ALL: [OutputMode; 5] = [
        OutputMode::FullSetup,
        OutputMode::InfraOnly,
        OutputMode::CodeOnly,
        OutputMode::SreDoc,
        OutputMode::Explain,
    ];

    /// The instruction sentence appended after the persona for this mode.
    pub fn instruction(self) -> &'static str {
        match self {
            OutputMode::FullSetup => {
                "Include infra, CI/CD, app setup, security, secrets, cost-saving tips, and sample code."
            }
            OutputMode::InfraOnly => {
                "Give only infrastructure setup like Terraform or AWS Console steps."
            }
            OutputMode::CodeOnly => {
                "Give only backend/frontend code and deployment-ready YAML/configs."
            }
            OutputMode::SreDoc => {
                "Write the response like an internal SRE runbook. Use headings and concise steps."
            }
            OutputMode::Explain => "Explain how this setup works in plain English, step by step.",
        }
    }

    /// Human-readable label shown in the UI.
    pub fn label(self) -> &'static str {
        match self {
            OutputMode::FullSetup => "💡 Full Setup",
            OutputMode::InfraOnly => "🛠 Infra Only",
            OutputMode::CodeOnly => "📦 Code Only",
            OutputMode::SreDoc => "📄 Like an SRE doc",
            OutputMode::Explain => "🧠 Just Explain",
        }
    }

    /// Kebab-case name accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            OutputMode::FullSetup => "full-setup",
            OutputMode::InfraOnly => "infra-only",
            OutputMode::CodeOnly => "code-only",
            OutputMode::SreDoc => "sre-doc",
            OutputMode::Explain => "explain",
        }
    }

    /// Whether answers in this mode come with an architecture diagram.
    ///
    /// True for the infra-focused modes, the ones whose label mentions
    /// "setup" or "infra".
    pub fn wants_diagram(self) -> bool {
        matches!(self, OutputMode::FullSetup | OutputMode::InfraOnly)
    }

    /// The next mode in display order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutputMode {
    type Err = PmError;

    /// Parse a kebab-case name or a display label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(needle) || m.label() == needle)
            .ok_or_else(|| PmError::InvalidMode(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_kebab_names() {
        for mode in OutputMode::ALL {
            let parsed: OutputMode = mode.name().parse().expect("should parse name");
            assert_eq!(parsed, mode);
        }
        assert_eq!("SRE-DOC".parse::<OutputMode>().ok(), Some(OutputMode::SreDoc));
    }

    #[test]
    fn test_should_parse_labels() {
        let parsed: OutputMode = "📄 Like an SRE doc".parse().expect("should parse label");
        assert_eq!(parsed, OutputMode::SreDoc);
    }

    #[test]
    fn test_should_reject_unknown_mode() {
        let err = "poetry".parse::<OutputMode>().unwrap_err();
        assert!(matches!(err, PmError::InvalidMode(s) if s == "poetry"));
    }

    #[test]
    fn test_should_have_distinct_instructions() {
        for a in OutputMode::ALL {
            for b in OutputMode::ALL {
                if a != b {
                    assert_ne!(a.instruction(), b.instruction());
                }
            }
        }
    }

    #[test]
    fn test_should_want_diagram_for_infra_and_setup_labels() {
        for mode in OutputMode::ALL {
            let label = mode.label().to_lowercase();
            let expected = label.contains("infra") || label.contains("setup");
            assert_eq!(mode.wants_diagram(), expected, "mode {mode:?}");
        }
    }

    #[test]
    fn test_should_cycle_through_all_modes() {
        let mut mode = OutputMode::default();
        let mut seen = Vec::new();
        for _ in 0..OutputMode::ALL.len() {
            seen.push(mode);
            mode = mode.next();
        }
        assert_eq!(mode, OutputMode::FullSetup);
        assert_eq!(seen, OutputMode::ALL.to_vec());
    }

    #[test]
    fn test_should_deserialize_kebab_case() {
        let mode: OutputMode = serde_json::from_str("\"infra-only\"").expect("should deserialize");
        assert_eq!(mode, OutputMode::InfraOnly);
    }
}
