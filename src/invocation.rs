//! Turns the parsed command line into an absolute git context.
//!
//! [`resolve`] is pure apart from reading the current directory: it never
//! touches the process environment. Exporting the result is the job of
//! [`crate::process_env::apply`].

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::process_env::{CONFIG_DIR_ENV, CONFIG_FILE_ENV, GIT_DIR_ENV, GIT_WORK_TREE_ENV};

/// Boolean switches that select the terminal action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeFlags {
    pub show_version: bool,
    pub debug: bool,
    pub tail_logs: bool,
    pub show_config: bool,
    pub show_config_dir: bool,
}

/// Raw invocation inputs. `None` means the flag was absent or empty.
#[derive(Debug, Clone, Default)]
pub struct InvocationRequest {
    pub repo_path: Option<PathBuf>,
    pub filter_path: Option<PathBuf>,
    /// Parsed but never consulted when choosing what to run.
    pub positional: Option<String>,
    pub modes: ModeFlags,
    pub work_tree: Option<PathBuf>,
    pub git_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub config_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedContext {
    pub work_tree: Option<PathBuf>,
    pub git_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub config_file: Option<String>,
}

impl ResolvedContext {
    /// Environment variables this context exports, in export order.
    pub fn exports(&self) -> Vec<(&'static str, OsString)> {
        let mut vars = Vec::new();
        if let Some(files) = &self.config_file {
            vars.push((CONFIG_FILE_ENV, OsString::from(files)));
        }
        if let Some(dir) = &self.config_dir {
            vars.push((CONFIG_DIR_ENV, dir.clone().into_os_string()));
        }
        if let Some(work_tree) = &self.work_tree {
            vars.push((GIT_WORK_TREE_ENV, work_tree.clone().into_os_string()));
        }
        if let Some(git_dir) = &self.git_dir {
            vars.push((GIT_DIR_ENV, git_dir.clone().into_os_string()));
        }
        vars
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("--path option is incompatible with the --work-tree and --git-dir options")]
    IncompatibleFlags,

    #[error("Failed to resolve absolute path for '{}'", path.display())]
    PathResolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to change directory to '{}'", path.display())]
    Chdir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Resolve the request into absolute git paths and config overrides.
///
/// `--path <p>` is shorthand for `--work-tree <abs p> --git-dir <abs p>/.git`
/// and cannot be combined with either of them.
pub fn resolve(request: &InvocationRequest) -> Result<ResolvedContext, ResolveError> {
    if request.repo_path.is_some() && (request.work_tree.is_some() || request.git_dir.is_some()) {
        return Err(ResolveError::IncompatibleFlags);
    }

    let (work_tree, git_dir) = match &request.repo_path {
        Some(repo_path) => {
            let abs = absolute_path(repo_path)?;
            let git_dir = abs.join(".git");
            (Some(abs), Some(git_dir))
        }
        None => (
            request.work_tree.as_deref().map(absolute_path).transpose()?,
            request.git_dir.as_deref().map(absolute_path).transpose()?,
        ),
    };

    Ok(ResolvedContext {
        work_tree,
        git_dir,
        config_dir: request.config_dir.clone(),
        config_file: request.config_file.clone(),
    })
}

fn absolute_path(path: &Path) -> Result<PathBuf, ResolveError> {
    if path.is_absolute() {
        return Ok(clean(path));
    }
    let cwd = std::env::current_dir().map_err(|source| ResolveError::PathResolution {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(clean(&cwd.join(path)))
}

/// Lexically normalize an absolute path: drop `.` and trailing separators,
/// fold `..`. Symlinks are not followed.
fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            // `/..` stays `/`
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_repo(path: &str) -> InvocationRequest {
        InvocationRequest {
            repo_path: Some(PathBuf::from(path)),
            ..Default::default()
        }
    }

    #[test]
    fn repo_path_conflicts_with_work_tree() {
        let request = InvocationRequest {
            work_tree: Some(PathBuf::from("/w")),
            ..with_repo("/tmp/repo")
        };
        assert!(matches!(
            resolve(&request),
            Err(ResolveError::IncompatibleFlags)
        ));
    }

    #[test]
    fn repo_path_conflicts_with_git_dir() {
        let request = InvocationRequest {
            git_dir: Some(PathBuf::from("/g")),
            ..with_repo("/tmp/repo")
        };
        assert!(matches!(
            resolve(&request),
            Err(ResolveError::IncompatibleFlags)
        ));
    }

    #[test]
    fn repo_path_expands_to_work_tree_and_git_dir() {
        let context = resolve(&with_repo("/tmp/repo")).unwrap();
        assert_eq!(context.work_tree, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(context.git_dir, Some(PathBuf::from("/tmp/repo/.git")));
    }

    #[test]
    fn trailing_separator_is_normalized() {
        let context = resolve(&with_repo("/tmp/repo/")).unwrap();
        assert_eq!(context.work_tree, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(context.git_dir, Some(PathBuf::from("/tmp/repo/.git")));
    }

    #[test]
    fn relative_repo_path_is_joined_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let context = resolve(&with_repo("some/repo")).unwrap();
        assert_eq!(context.work_tree, Some(cwd.join("some/repo")));
        assert_eq!(context.git_dir, Some(cwd.join("some/repo/.git")));
    }

    #[test]
    fn explicit_git_paths_are_kept_independent() {
        let request = InvocationRequest {
            work_tree: Some(PathBuf::from("/src/checkout")),
            git_dir: Some(PathBuf::from("/srv/git/project.git")),
            ..Default::default()
        };
        let context = resolve(&request).unwrap();
        assert_eq!(context.work_tree, Some(PathBuf::from("/src/checkout")));
        assert_eq!(context.git_dir, Some(PathBuf::from("/srv/git/project.git")));
    }

    #[test]
    fn empty_request_exports_nothing() {
        let context = resolve(&InvocationRequest::default()).unwrap();
        assert_eq!(context, ResolvedContext::default());
        assert!(context.exports().is_empty());
    }

    #[test]
    fn config_file_list_is_exported_verbatim() {
        let request = InvocationRequest {
            config_file: Some("b.yml,a.yml,b.yml".to_string()),
            ..Default::default()
        };
        let exports = resolve(&request).unwrap().exports();
        assert_eq!(
            exports,
            vec![(CONFIG_FILE_ENV, OsString::from("b.yml,a.yml,b.yml"))]
        );
    }

    #[test]
    fn exports_cover_every_override() {
        let request = InvocationRequest {
            config_dir: Some(PathBuf::from("cfg")),
            config_file: Some("a.yml".to_string()),
            ..with_repo("/tmp/repo")
        };
        let keys: Vec<_> = resolve(&request)
            .unwrap()
            .exports()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec![CONFIG_FILE_ENV, CONFIG_DIR_ENV, GIT_WORK_TREE_ENV, GIT_DIR_ENV]
        );
    }

    #[test]
    fn clean_folds_dots() {
        assert_eq!(clean(Path::new("/a/b/../c/./d/")), PathBuf::from("/a/c/d"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
    }
}
