//! The only place that writes process-global state: environment variables
//! inherited by git subprocesses and daemon re-invocations, and the current
//! working directory.

use std::ffi::OsStr;
use std::io;
use std::path::Path;

use crate::invocation::{ResolveError, ResolvedContext};

pub const CONFIG_FILE_ENV: &str = "LG_CONFIG_FILE";
pub const CONFIG_DIR_ENV: &str = "CONFIG_DIR";
pub const GIT_WORK_TREE_ENV: &str = "GIT_WORK_TREE";
pub const GIT_DIR_ENV: &str = "GIT_DIR";

pub trait ProcessEnv {
    fn set_var(&mut self, key: &str, value: &OsStr);
    fn set_current_dir(&mut self, path: &Path) -> io::Result<()>;
}

/// The real process environment. Only valid while the process is still
/// single-threaded.
pub struct SystemEnv;

impl ProcessEnv for SystemEnv {
    fn set_var(&mut self, key: &str, value: &OsStr) {
        // SAFETY: `cli::run` applies the context before any thread is spawned.
        unsafe { std::env::set_var(key, value) }
    }

    fn set_current_dir(&mut self, path: &Path) -> io::Result<()> {
        std::env::set_current_dir(path)
    }
}

/// Export the context and enter its work tree.
pub fn apply(context: &ResolvedContext, env: &mut impl ProcessEnv) -> Result<(), ResolveError> {
    for (key, value) in context.exports() {
        env.set_var(key, &value);
    }

    if let Some(work_tree) = &context.work_tree {
        env.set_current_dir(work_tree)
            .map_err(|source| ResolveError::Chdir {
                path: work_tree.clone(),
                source,
            })?;
    }

    Ok(())
}
