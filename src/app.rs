use anyhow::{Context, Result, bail};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{Span, info, info_span, warn};
use tracing_appender::non_blocking::WorkerGuard;

use crate::config::AppConfig;
use crate::{git, logs};

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("Failed to open log file in '{}'", dir.display())]
    LogFile {
        dir: PathBuf,
        #[source]
        source: tracing_appender::rolling::InitError,
    },
}

/// Services shared by the daemon and the interactive app.
pub struct Common {
    span: Span,
    _log_guard: Option<WorkerGuard>,
}

impl Common {
    pub fn new(config: &AppConfig) -> Result<Self, CommonError> {
        let log_guard = if config.debug {
            logs::init_file_logging(&config.config_dir).map_err(|source| CommonError::LogFile {
                dir: config.config_dir.clone(),
                source,
            })?
        } else {
            None
        };

        let span = info_span!("lazygit", version = config.build.version, debug = config.debug);
        span.in_scope(|| {
            info!(
                config_dir = %config.config_dir.display(),
                temp_dir = %config.temp_dir.display(),
                config_files = config.user_config_paths.len(),
                "common:ready"
            )
        });

        Ok(Self {
            span,
            _log_guard: log_guard,
        })
    }

    pub fn span(&self) -> &Span {
        &self.span
    }
}

/// Start the interactive session for the repository in the current directory.
///
/// `filter_path` is handed to the session as given.
pub fn run(config: &AppConfig, common: &Common, filter_path: Option<&Path>) -> Result<()> {
    let _enter = common.span().enter();
    info!(
        work_tree = ?config.work_tree,
        git_dir = ?config.git_dir,
        filter = ?filter_path,
        "app:start"
    );

    if !git::is_git_repo()? {
        match config.user_config.not_a_repository.as_str() {
            "quit" => {
                info!("app:not a repository, quitting");
                return Ok(());
            }
            "create" => {
                git::init().context("Failed to initialise a git repository")?;
                info!("app:initialised repository");
            }
            "skip" => {
                let Some(repo) = config.app_state.most_recent_repo() else {
                    bail!(
                        "{} must be run inside a git repository and no recent repository exists",
                        config.name
                    );
                };
                info!(repo = %repo.display(), "app:not a repository, opening most recent");
                env::set_current_dir(repo).with_context(|| {
                    format!("Failed to change directory to '{}'", repo.display())
                })?;
            }
            _ => bail!("{} must be run inside a git repository", config.name),
        }
    }
    let repo_root = git::get_repo_root()?;
    let branch = git::get_current_branch().unwrap_or_else(|e| {
        warn!(error = %e, "app:could not read current branch");
        String::new()
    });

    let mut state = config.app_state.clone();
    state.record_repo(&repo_root);
    state.last_version = config.build.version.to_string();
    state
        .save(&config.config_dir)
        .context("Failed to save app state")?;

    println!("{}", repo_root.display());
    if branch.is_empty() {
        println!("HEAD (detached)");
    } else {
        println!("On branch {}", branch);
    }
    if let Some(filter) = filter_path {
        println!("Filtering by path: {}", filter.display());
    }

    info!(repo = %repo_root.display(), branch = %branch, "app:completed");
    Ok(())
}
