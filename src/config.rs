//! Configuration for the grievance desk operator CLI
//!
//! CLI arguments and environment variable handling using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::aggregate::GrievanceFilter;
use crate::model::{Domain, GrievanceStatus};

/// Operator tooling for the Bolo Bharat grievance desk
#[derive(Parser, Debug, Clone)]
#[command(name = "grievance-desk")]
#[command(about = "Summarize, filter, export and triage citizen grievances")]
pub struct Args {
    /// JSON snapshot of the document tree (grievances, userDetails, users)
    #[arg(long, env = "DATA_FILE", default_value = "grievances.json")]
    pub data_file: PathBuf,

    /// Comma-separated email addresses granted administrator access
    #[arg(long, env = "ADMIN_EMAILS", default_value = "admin@bolobharat.com")]
    pub admin_emails: String,

    /// Directory the CSV export is written to
    #[arg(long, env = "EXPORT_DIR", default_value = ".")]
    pub export_dir: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines instead of human-readable text
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Totals by domain and by status
    Summary,

    /// Grievances newest first, optionally filtered
    List {
        /// Case-insensitive substring of the problem title
        #[arg(long)]
        search: Option<String>,

        /// Domain label, e.g. "Water Supply"
        #[arg(long)]
        domain: Option<String>,

        /// Status label, e.g. "In Progress"
        #[arg(long)]
        status: Option<String>,
    },

    /// Write every grievance to grievances.csv
    Export {
        /// Overrides EXPORT_DIR
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Move a grievance to a new status
    SetStatus {
        /// Submitter user id
        #[arg(long)]
        submitter: String,

        /// Grievance id
        #[arg(long)]
        id: String,

        /// Target status label
        #[arg(long)]
        status: String,
    },
}

impl Args {
    /// Admin emails as a trimmed, lowercased list
    pub fn admin_email_list(&self) -> Vec<String> {
        self.admin_emails
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Identity the operator acts as; the first configured admin
    pub fn operator_email(&self) -> Option<String> {
        self.admin_email_list().into_iter().next()
    }

    /// Directory for exports, honouring a per-command override
    pub fn export_target(&self) -> PathBuf {
        match &self.command {
            Command::Export { out: Some(dir) } => dir.clone(),
            _ => self.export_dir.clone(),
        }
    }

    /// Whether the command writes to the snapshot
    pub fn is_mutation(&self) -> bool {
        matches!(self.command, Command::SetStatus { .. })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.admin_email_list().is_empty() {
            return Err("ADMIN_EMAILS must name at least one administrator".to_string());
        }

        match &self.command {
            Command::List { domain, status, .. } => {
                if let Some(domain) = domain.as_deref().filter(|d| !d.trim().is_empty()) {
                    domain.parse::<Domain>()?;
                }
                if let Some(status) = status {
                    status.parse::<GrievanceStatus>()?;
                }
            }
            Command::SetStatus { submitter, id, status } => {
                if submitter.trim().is_empty() || id.trim().is_empty() {
                    return Err("--submitter and --id must not be empty".to_string());
                }
                status.parse::<GrievanceStatus>()?;
            }
            Command::Summary | Command::Export { .. } => {}
        }

        Ok(())
    }

    /// Filter built from `list` options
    pub fn list_filter(&self) -> Option<GrievanceFilter> {
        let Command::List { search, domain, status } = &self.command else {
            return None;
        };
        Some(GrievanceFilter {
            search_term: search.clone(),
            domain: domain.clone(),
            status: status.as_deref().and_then(|s| s.parse().ok()),
        })
    }
}
