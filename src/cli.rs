use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::invocation::{self, InvocationRequest, ModeFlags};
use crate::process_env::{self, SystemEnv};
use crate::{daemon, dispatch, mode};

/// Multi-character short flags, rewritten to their long form before parsing.
const MULTI_CHAR_SHORTS: &[(&str, &str)] = &[
    ("-cd", "--print-config-dir"),
    ("-ucd", "--use-config-dir"),
    ("-ucf", "--use-config-file"),
];

/// A simple terminal UI for git commands
#[derive(Parser, Debug)]
#[command(name = "lazygit", about, long_about = None)]
pub struct Cli {
    /// Path of git repo (equivalent to --work-tree=<path> --git-dir=<path>/.git/)
    #[arg(short = 'p', long = "path", value_name = "PATH")]
    pub repo_path: Option<OsString>,

    /// Path to filter on in `git log -- <path>`. When in filter mode, the commits,
    /// reflog, and stash are filtered based on the given path, and some operations
    /// are restricted
    #[arg(short, long, value_name = "PATH")]
    pub filter: Option<OsString>,

    /// Print the current version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Run in debug mode with logging (see --logs flag below). Use the LOG_LEVEL
    /// env var to set the log level (debug/info/warn/error)
    #[arg(short, long)]
    pub debug: bool,

    /// Tail lazygit logs (intended to be used when `lazygit --debug` is called in
    /// a separate terminal tab)
    #[arg(short, long)]
    pub logs: bool,

    /// Print the default config
    #[arg(short, long)]
    pub config: bool,

    /// Print the config directory (short: -cd)
    #[arg(long)]
    pub print_config_dir: bool,

    /// Override default config directory with provided directory (short: -ucd)
    #[arg(long, value_name = "DIR")]
    pub use_config_dir: Option<OsString>,

    /// Equivalent of the --work-tree git argument
    #[arg(short = 'w', long, value_name = "PATH")]
    pub work_tree: Option<OsString>,

    /// Equivalent of the --git-dir git argument
    #[arg(short = 'g', long, value_name = "PATH")]
    pub git_dir: Option<OsString>,

    /// Comma separated list to custom config file(s) (short: -ucf)
    #[arg(long, value_name = "FILES")]
    pub use_config_file: Option<String>,

    /// Todo file
    #[arg(value_name = "GITARGS", hide = true)]
    pub gitargs: Option<String>,
}

impl Cli {
    pub fn into_request(self) -> InvocationRequest {
        InvocationRequest {
            repo_path: non_empty_path(self.repo_path),
            filter_path: non_empty_path(self.filter),
            positional: self.gitargs.filter(|s| !s.is_empty()),
            modes: ModeFlags {
                show_version: self.version,
                debug: self.debug,
                tail_logs: self.logs,
                show_config: self.config,
                show_config_dir: self.print_config_dir,
            },
            work_tree: non_empty_path(self.work_tree),
            git_dir: non_empty_path(self.git_dir),
            config_dir: non_empty_path(self.use_config_dir),
            config_file: self.use_config_file.filter(|s| !s.is_empty()),
        }
    }
}

/// Path flags are taken as raw strings so that an empty value means "unset".
fn non_empty_path(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}

/// Rewrites `-cd`, `-ucd` and `-ucf` (also `-ucd=<value>`) to long flags.
/// Everything after a literal `--` is passed through unchanged.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            for (short, long) in MULTI_CHAR_SHORTS {
                if text == *short {
                    return OsString::from(*long);
                }
                if let Some(value) = text
                    .strip_prefix(short)
                    .and_then(|rest| rest.strip_prefix('='))
                {
                    return OsString::from(format!("{long}={value}"));
                }
            }
            arg
        })
        .collect()
}

pub fn run() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let request = cli.into_request();

    // Read once, before anything touches the environment.
    let daemon_kind = daemon::detect();

    let context = invocation::resolve(&request)?;
    process_env::apply(&context, &mut SystemEnv)?;

    let decision = mode::classify(&request.modes, daemon_kind.is_some());
    dispatch::dispatch(decision, &request, &context, daemon_kind)
}
