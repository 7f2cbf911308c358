//! Quick-start prompts offered alongside free-form input.

use serde::{Deserialize, Serialize};

/// A canned problem statement the user can start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuickStart {
    SecureAws,
    GithubActions,
    TerraformS3Ec2,
}

impl QuickStart {
    pub const ALL: [QuickStart; 3] = [
        QuickStart::SecureAws,
        QuickStart::GithubActions,
        QuickStart::TerraformS3Ec2,
    ];

    pub fn label(self) -> &'static str {
        match self {
            QuickStart::SecureAws => "🔐 Secure AWS Setup",
            QuickStart::GithubActions => "🚀 CI/CD GitHub Actions",
            QuickStart::TerraformS3Ec2 => "☁️ Terraform S3 + EC2",
        }
    }

    /// The problem statement filled into the input.
    pub fn prompt(self) -> &'static str {
        match self {
            QuickStart::SecureAws => {
                "Help me deploy a secure and cost-effective web app on AWS using Node.js, React, and PostgreSQL."
            }
            QuickStart::GithubActions => {
                "Here’s my GitHub Actions file. Can you review and improve it for deploying a React frontend and Node.js backend?"
            }
            QuickStart::TerraformS3Ec2 => {
                "Please check my Terraform file. I want to host a static site on S3 behind CloudFront and run Node.js on EC2."
            }
        }
    }

    /// Cycle helper for UIs: none → first → ... → last → none.
    pub fn cycle(current: Option<QuickStart>) -> Option<QuickStart> {
        match current {
            None => Some(Self::ALL[0]),
            Some(preset) => {
                let idx = Self::ALL.iter().position(|p| *p == preset).unwrap_or(0);
                Self::ALL.get(idx + 1).copied()
            }
        }
    }
}
