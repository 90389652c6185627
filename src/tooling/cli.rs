//! CLI Tooling
//!
//! Command-line interface for maintaining a synchronized file tree: repair
//! scans, folder and file mutations that keep the record store in step, and
//! inspection of stored records.

use crate::config::{ConfigLoader, DbafsConfig};
use crate::dbafs::Dbafs;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::path;
use crate::store::FileSystemNode;
use crate::sync::SyncReport;
use crate::types::Fingerprint;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use serde_json::json;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// dbafs CLI - keep a file tree and its record store in sync
#[derive(Parser)]
#[command(name = "dbafs")]
#[command(about = "Database-backed file tree maintenance")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Logging settings with command-line flags applied over `base`.
    pub fn logging_config(&self, base: &LoggingConfig) -> LoggingConfig {
        let mut config = base.clone();
        if self.verbose {
            config.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.output = output.clone();
        }
        if self.log_file.is_some() {
            config.file = self.log_file.clone();
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile records with the disk below a prefix
    Scan {
        /// Prefix to reconcile (default: the upload path)
        prefix: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Create a folder and any missing parents
    Mkdir { path: String },
    /// Move a file or folder
    Mv { from: String, to: String },
    /// Copy a file or folder
    Cp { from: String, to: String },
    /// Delete a file or folder
    Rm { path: String },
    /// Remove the contents of a folder
    Purge { path: String },
    /// Deny web access to a folder
    Protect { path: String },
    /// Allow web access to a folder again
    Unprotect { path: String },
    /// Print the fingerprint of a file or folder
    Hash { path: String },
    /// List stored records
    Ls {
        /// Only records at or below this path
        prefix: Option<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Print the effective configuration
    Config,
}

/// CLI context for one workspace
pub struct CliContext {
    dbafs: Dbafs,
    config: DbafsConfig,
}

impl CliContext {
    /// Load configuration for the workspace and open its record store.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = load_config(&workspace_root, config_path.as_ref())?;
        Self::with_config(workspace_root, config)
    }

    pub fn with_config(workspace_root: PathBuf, config: DbafsConfig) -> Result<Self, ApiError> {
        let dbafs = Dbafs::open(&workspace_root, &config)?;
        Ok(Self { dbafs, config })
    }

    pub fn dbafs(&self) -> &Dbafs {
        &self.dbafs
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command);
        let flushed = self.dbafs.flush();
        if let Err(e) = &flushed {
            error!(command = command_name(command), error = %e, "failed to flush record store");
        }
        info!(
            command = command_name(command),
            ok = result.is_ok() && flushed.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "command finished"
        );
        // The command's own error takes precedence over a failed flush.
        let output = result?;
        flushed?;
        Ok(output)
    }

    fn execute_inner(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Scan { prefix, format } => {
                let prefix = prefix
                    .clone()
                    .unwrap_or_else(|| self.config.files.upload_path.clone());
                let report = self.dbafs.reconcile(&prefix)?;
                format_sync_report(&prefix, &report, format)
            }
            Commands::Mkdir { path } => {
                let existed = self.dbafs.engine().fs().is_dir(&path::normalize(path)?);
                let folder = self.dbafs.folder(path)?;
                if existed {
                    Ok(format!("Folder already exists: {}", folder.path()))
                } else {
                    Ok(format!("Created folder: {}", folder.path()))
                }
            }
            Commands::Mv { from, to } => {
                self.dbafs.engine().rename(from, to)?;
                Ok(format!("Moved {} -> {}", from, to))
            }
            Commands::Cp { from, to } => {
                self.dbafs.engine().copy_to(from, to)?;
                Ok(format!("Copied {} -> {}", from, to))
            }
            Commands::Rm { path } => {
                let normalized = path::normalize(path)?;
                if !self.dbafs.engine().fs().exists(&normalized) {
                    return Err(ApiError::NotFound(normalized));
                }
                self.dbafs.engine().delete(&normalized)?;
                Ok(format!("Deleted: {}", normalized))
            }
            Commands::Purge { path } => {
                let folder = self.existing_folder(path)?;
                folder.purge()?;
                Ok(format!("Purged: {}", folder.path()))
            }
            Commands::Protect { path } => {
                let folder = self.existing_folder(path)?;
                folder.protect()?;
                Ok(format!("Protected: {}", folder.path()))
            }
            Commands::Unprotect { path } => {
                let folder = self.existing_folder(path)?;
                folder.unprotect()?;
                Ok(format!("Unprotected: {}", folder.path()))
            }
            Commands::Hash { path } => {
                let normalized = path::normalize(path)?;
                let fs = self.dbafs.engine().fs();
                let hash = if fs.is_dir(&normalized) {
                    self.dbafs.folder(&normalized)?.hash()?
                } else if fs.is_file(&normalized) {
                    self.dbafs.file(&normalized)?.hash()?
                } else {
                    return Err(ApiError::NotFound(normalized));
                };
                Ok(format!("{}  {}", display_hash(&hash), normalized))
            }
            Commands::Ls { prefix, format } => {
                let records = self.records(prefix.as_deref())?;
                format_records(&records, format)
            }
            Commands::Config => toml::to_string_pretty(&self.config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }

    fn existing_folder(&self, path: &str) -> Result<crate::entity::Folder<'_>, ApiError> {
        let normalized = path::normalize(path)?;
        if !self.dbafs.engine().fs().is_dir(&normalized) {
            return Err(ApiError::NotADirectory(normalized));
        }
        self.dbafs.folder(&normalized)
    }

    fn records(&self, prefix: Option<&str>) -> Result<Vec<FileSystemNode>, ApiError> {
        let store = self.dbafs.engine().store();
        let Some(prefix) = prefix else {
            return Ok(store.all()?);
        };
        let prefix = path::normalize(prefix)?;
        let mut records = Vec::new();
        if let Some(own) = store.find_by_path(&prefix, Default::default())? {
            records.push(own);
        }
        records.extend(store.find_all_under_prefix(&prefix)?);
        Ok(records)
    }
}

/// Load configuration from an explicit file or from the workspace layers.
pub fn load_config(
    workspace_root: &std::path::Path,
    config_path: Option<&PathBuf>,
) -> Result<DbafsConfig, ApiError> {
    match config_path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(workspace_root),
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Scan { .. } => "scan",
        Commands::Mkdir { .. } => "mkdir",
        Commands::Mv { .. } => "mv",
        Commands::Cp { .. } => "cp",
        Commands::Rm { .. } => "rm",
        Commands::Purge { .. } => "purge",
        Commands::Protect { .. } => "protect",
        Commands::Unprotect { .. } => "unprotect",
        Commands::Hash { .. } => "hash",
        Commands::Ls { .. } => "ls",
        Commands::Config => "config",
    }
}

fn display_hash(hash: &Fingerprint) -> &str {
    if hash.is_unhashable() {
        "(unhashable)"
    } else {
        hash.as_str()
    }
}

fn short_hash(hash: &Fingerprint) -> String {
    if hash.is_unhashable() {
        "-".to_string()
    } else {
        hash.as_str().chars().take(12).collect()
    }
}

fn format_sync_report(prefix: &str, report: &SyncReport, format: &str) -> Result<String, ApiError> {
    match format {
        "json" => {
            let out = json!({
                "prefix": prefix,
                "added": report.added,
                "updated": report.updated,
                "removed": report.removed,
                "reparented": report.reparented,
            });
            serde_json::to_string_pretty(&out)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render report: {}", e)))
        }
        "text" => {
            if report.is_clean() {
                return Ok(format!("{}: records are in sync", display_prefix(prefix)));
            }
            let mut out = format!("Reconciled {}\n", display_prefix(prefix));
            out.push_str(&format!("  Added: {}\n", report.added.len()));
            out.push_str(&format!("  Updated: {}\n", report.updated.len()));
            out.push_str(&format!("  Removed: {}\n", report.removed.len()));
            out.push_str(&format!("  Reparented: {}", report.reparented.len()));
            Ok(out)
        }
        other => Err(invalid_format(other)),
    }
}

fn format_records(records: &[FileSystemNode], format: &str) -> Result<String, ApiError> {
    match format {
        "json" => serde_json::to_string_pretty(records)
            .map_err(|e| ApiError::ConfigError(format!("Failed to render records: {}", e))),
        "text" => {
            if records.is_empty() {
                return Ok("No records.".to_string());
            }
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Parent", "Kind", "Path", "Size", "Hash"]);
            for node in records {
                let parent = node
                    .parent_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "-".to_string());
                table.add_row(vec![
                    node.id.to_string(),
                    parent,
                    node.kind.as_str().to_string(),
                    node.path.clone(),
                    node.size.to_string(),
                    short_hash(&node.hash),
                ]);
            }
            Ok(table.to_string())
        }
        other => Err(invalid_format(other)),
    }
}

fn display_prefix(prefix: &str) -> &str {
    if prefix.is_empty() {
        "."
    } else {
        prefix
    }
}

fn invalid_format(format: &str) -> ApiError {
    ApiError::ConfigError(format!(
        "Invalid output format: {} (must be 'text' or 'json')",
        format
    ))
}
