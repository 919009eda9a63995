use anyhow::{Context, Result, anyhow};
use std::path::Path;
use tracing::error;

use crate::app::{self, Common};
use crate::config::{self, AppConfig};
use crate::daemon::{self, DaemonKind};
use crate::invocation::{InvocationRequest, ResolvedContext};
use crate::logs;
use crate::mode::DispatchDecision;
use crate::scratch::ScratchDir;
use crate::version::BuildInfo;

/// Execute the chosen action. The three print actions return before any
/// resources are acquired.
pub fn dispatch(
    decision: DispatchDecision,
    request: &InvocationRequest,
    context: &ResolvedContext,
    daemon_kind: Option<DaemonKind>,
) -> Result<()> {
    let build = BuildInfo::current();

    match decision {
        DispatchDecision::PrintVersion => {
            println!("{build}");
            Ok(())
        }
        DispatchDecision::PrintDefaultConfig => {
            let yaml = config::default_config_yaml()?;
            println!("{yaml}");
            Ok(())
        }
        DispatchDecision::PrintConfigDir => {
            let dir = config::config_dir(context.config_dir.as_deref())?;
            println!("{}", dir.display());
            Ok(())
        }
        DispatchDecision::TailLogs => {
            let dir = config::config_dir(context.config_dir.as_deref())?;
            logs::tail_logs(&dir)
        }
        DispatchDecision::RunDaemon => {
            let kind = daemon_kind
                .ok_or_else(|| anyhow!("Daemon mode selected without a daemon kind"))?;
            let todo_file = request.positional.as_deref().map(Path::new);
            with_session(build, request, context, |_, common| {
                daemon::handle(common, kind, todo_file)
            })
        }
        DispatchDecision::RunInteractive => {
            with_session(build, request, context, |app_config, common| {
                app::run(app_config, common, request.filter_path.as_deref())
            })
        }
    }
}

/// Acquire the scratch directory, build the app config and common context,
/// then hand off. Locals drop in reverse order, so logs are flushed before the
/// scratch directory is removed, on success and on every error path.
fn with_session<F>(
    build: BuildInfo,
    request: &InvocationRequest,
    context: &ResolvedContext,
    handoff: F,
) -> Result<()>
where
    F: FnOnce(&AppConfig, &Common) -> Result<()>,
{
    let scratch = ScratchDir::acquire()?;

    let app_config = AppConfig::new(build, request.modes.debug, scratch.path(), context)
        .context("Failed to load app config")?;
    let common = Common::new(&app_config).context("Failed to set up common context")?;

    handoff(&app_config, &common).inspect_err(|err| {
        let _enter = common.span().enter();
        error!(error = ?err, "session:failed");
    })
}
