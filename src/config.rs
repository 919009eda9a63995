use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::invocation::ResolvedContext;
use crate::process_env::{CONFIG_DIR_ENV, CONFIG_FILE_ENV};
use crate::state::AppState;
use crate::version::BuildInfo;

pub const APP_NAME: &str = "lazygit";
const DEFAULT_CONFIG_FILE: &str = "config.yml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the config directory: no home directory found")]
    NoConfigDir,

    #[error("Failed to create config directory '{}'", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid user config")]
    Invalid(#[source] serde_yaml::Error),
}

/// User-facing settings. Every key is optional in the YAML files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserConfig {
    pub gui: GuiConfig,
    pub git: GitConfig,
    pub refresher: RefresherConfig,
    pub os: OsConfig,
    pub confirm_on_quit: bool,
    pub quit_on_top_level_return: bool,
    pub disable_startup_popups: bool,
    /// One of `prompt`, `create`, `skip`, `quit`. `skip` opens the most
    /// recent repository instead of the current directory.
    pub not_a_repository: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            gui: GuiConfig::default(),
            git: GitConfig::default(),
            refresher: RefresherConfig::default(),
            os: OsConfig::default(),
            confirm_on_quit: false,
            quit_on_top_level_return: false,
            disable_startup_popups: false,
            not_a_repository: "prompt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuiConfig {
    pub scroll_height: u32,
    pub scroll_past_bottom: bool,
    pub mouse_events: bool,
    pub skip_discard_change_warning: bool,
    pub side_panel_width: f64,
    pub show_file_tree: bool,
    pub show_command_log: bool,
    pub nerd_fonts_version: String,
    pub border: String,
    pub theme: ThemeConfig,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            scroll_height: 2,
            scroll_past_bottom: true,
            mouse_events: true,
            skip_discard_change_warning: false,
            side_panel_width: 0.3333,
            show_file_tree: true,
            show_command_log: true,
            nerd_fonts_version: String::new(),
            border: "rounded".to_string(),
            theme: ThemeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    pub active_border_color: Vec<String>,
    pub inactive_border_color: Vec<String>,
    pub selected_line_bg_color: Vec<String>,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            active_border_color: vec!["green".to_string(), "bold".to_string()],
            inactive_border_color: vec!["default".to_string()],
            selected_line_bg_color: vec!["blue".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitConfig {
    pub paging: PagingConfig,
    pub auto_fetch: bool,
    pub auto_refresh: bool,
    pub fetch_all: bool,
    pub main_branches: Vec<String>,
    pub log: LogConfig,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            paging: PagingConfig::default(),
            auto_fetch: true,
            auto_refresh: true,
            fetch_all: true,
            main_branches: vec!["master".to_string(), "main".to_string()],
            log: LogConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PagingConfig {
    pub color_arg: String,
    pub pager: String,
    pub use_config: bool,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            color_arg: "always".to_string(),
            pager: String::new(),
            use_config: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogConfig {
    pub order: String,
    pub show_graph: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            order: "topo-order".to_string(),
            show_graph: "always".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefresherConfig {
    /// Seconds between file-status refreshes.
    pub refresh_interval: u64,
    /// Seconds between background fetches.
    pub fetch_interval: u64,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            refresh_interval: 10,
            fetch_interval: 60,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OsConfig {
    pub edit: String,
    pub open: String,
}

/// YAML rendering of [`UserConfig::default`], as printed by `--config`.
pub fn default_config_yaml() -> Result<String, ConfigError> {
    serde_yaml::to_string(&UserConfig::default()).map_err(ConfigError::Invalid)
}

/// Resolve the config directory.
///
/// Priority:
/// 1. `--use-config-dir`
/// 2. An inherited `CONFIG_DIR` (daemon re-invocations)
/// 3. `$XDG_CONFIG_HOME/lazygit`
/// 4. `~/.config/lazygit`
pub fn config_dir(override_dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    config_dir_from(
        override_dir,
        std::env::var_os(CONFIG_DIR_ENV).map(PathBuf::from),
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        home::home_dir(),
    )
}

fn config_dir_from(
    override_dir: Option<&Path>,
    env_dir: Option<PathBuf>,
    xdg_config_home: Option<PathBuf>,
    home_dir: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_dir.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(xdg) = xdg_config_home.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(xdg.join(APP_NAME));
    }
    home_dir
        .map(|home| home.join(".config").join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

/// Split a `--use-config-file` list. Order is kept, duplicates too.
pub fn split_config_files(list: &str) -> Vec<PathBuf> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Load the user config by deep-merging each file over the defaults.
/// Later files win per key.
pub fn load_user_config(paths: &[PathBuf]) -> Result<UserConfig, ConfigError> {
    let mut merged = serde_yaml::to_value(UserConfig::default()).map_err(ConfigError::Invalid)?;

    for path in paths {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        if content.trim().is_empty() {
            continue;
        }
        let overlay: Value = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "config:merge");
        merge_values(&mut merged, overlay);
    }

    serde_yaml::from_value(merged).map_err(ConfigError::Invalid)
}

fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        // An explicit null leaves the default in place.
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

/// Everything the daemon and the interactive app need to start.
#[derive(Debug)]
pub struct AppConfig {
    pub name: &'static str,
    pub build: BuildInfo,
    pub debug: bool,
    pub temp_dir: PathBuf,
    pub config_dir: PathBuf,
    pub user_config_paths: Vec<PathBuf>,
    pub user_config: UserConfig,
    pub app_state: AppState,
    pub work_tree: Option<PathBuf>,
    pub git_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn new(
        build: BuildInfo,
        debug_flag: bool,
        temp_dir: &Path,
        context: &ResolvedContext,
    ) -> Result<Self, ConfigError> {
        let debug = debug_flag || std::env::var("DEBUG").is_ok_and(|v| v == "TRUE");

        let config_dir = config_dir(context.config_dir.as_deref())?;
        fs::create_dir_all(&config_dir).map_err(|source| ConfigError::CreateDir {
            path: config_dir.clone(),
            source,
        })?;

        let custom_files = context
            .config_file
            .clone()
            .or_else(|| std::env::var(CONFIG_FILE_ENV).ok())
            .filter(|s| !s.is_empty());
        let user_config_paths = match custom_files {
            Some(list) => split_config_files(&list),
            None => {
                let default_path = config_dir.join(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    vec![default_path]
                } else {
                    Vec::new()
                }
            }
        };

        let user_config = load_user_config(&user_config_paths)?;
        let app_state = AppState::load(&config_dir)?;

        Ok(Self {
            name: APP_NAME,
            build,
            debug,
            temp_dir: temp_dir.to_path_buf(),
            config_dir,
            user_config_paths,
            user_config,
            app_state,
            work_tree: context.work_tree.clone(),
            git_dir: context.git_dir.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn override_dir_wins() {
        let dir = config_dir_from(
            Some(Path::new("/custom")),
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/xdg")),
            Some(PathBuf::from("/home/me")),
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/custom"));
    }

    #[test]
    fn inherited_env_dir_beats_xdg() {
        let dir = config_dir_from(
            None,
            Some(PathBuf::from("/env")),
            Some(PathBuf::from("/xdg")),
            None,
        )
        .unwrap();
        assert_eq!(dir, PathBuf::from("/env"));
    }

    #[test]
    fn xdg_dir_gets_app_name() {
        let dir = config_dir_from(None, None, Some(PathBuf::from("/xdg")), None).unwrap();
        assert_eq!(dir, PathBuf::from("/xdg/lazygit"));
    }

    #[test]
    fn falls_back_to_home() {
        let dir = config_dir_from(None, Some(PathBuf::new()), None, Some(PathBuf::from("/home/me")))
            .unwrap();
        assert_eq!(dir, PathBuf::from("/home/me/.config/lazygit"));
    }

    #[test]
    fn no_home_is_an_error() {
        assert!(matches!(
            config_dir_from(None, None, None, None),
            Err(ConfigError::NoConfigDir)
        ));
    }

    #[test]
    fn split_keeps_order_and_duplicates() {
        assert_eq!(
            split_config_files("b.yml, a.yml,,b.yml"),
            vec![
                PathBuf::from("b.yml"),
                PathBuf::from("a.yml"),
                PathBuf::from("b.yml")
            ]
        );
    }

    #[test]
    fn default_yaml_uses_camel_case_keys() {
        let yaml = default_config_yaml().unwrap();
        assert!(yaml.contains("gui:"));
        assert!(yaml.contains("scrollHeight: 2"));
        assert!(yaml.contains("refreshInterval: 10"));
        assert!(yaml.contains("notARepository: prompt"));
    }

    #[test]
    fn no_files_means_defaults() {
        assert_eq!(load_user_config(&[]).unwrap(), UserConfig::default());
    }

    #[test]
    fn later_files_override_earlier_ones_per_key() {
        let dir = TempDir::new().unwrap();
        let first = dir.path().join("a.yml");
        let second = dir.path().join("b.yml");
        fs::write(&first, "gui:\n  scrollHeight: 5\n  mouseEvents: false\n").unwrap();
        fs::write(&second, "gui:\n  scrollHeight: 9\nconfirmOnQuit: true\n").unwrap();

        let config = load_user_config(&[first, second]).unwrap();
        assert_eq!(config.gui.scroll_height, 9);
        assert!(!config.gui.mouse_events);
        assert!(config.confirm_on_quit);
        // untouched keys keep their defaults
        assert_eq!(config.gui.border, "rounded");
        assert_eq!(config.refresher.fetch_interval, 60);
    }

    #[test]
    fn empty_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_user_config(&[path]).unwrap(), UserConfig::default());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.yml");
        assert!(matches!(
            load_user_config(&[path]),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "gui: [unclosed\n").unwrap();
        assert!(matches!(
            load_user_config(&[path]),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn wrong_type_is_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "gui:\n  scrollHeight: lots\n").unwrap();
        assert!(matches!(
            load_user_config(&[path]),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn app_config_reads_default_file_from_config_dir() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("cfg");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.yml"), "refresher:\n  fetchInterval: 5\n").unwrap();

        let context = ResolvedContext {
            config_dir: Some(config_dir.clone()),
            ..Default::default()
        };
        let config = AppConfig::new(BuildInfo::current(), true, temp.path(), &context).unwrap();
        assert_eq!(config.config_dir, config_dir);
        assert_eq!(config.user_config.refresher.fetch_interval, 5);
        assert!(config.debug);
        assert_eq!(config.temp_dir, temp.path());
    }

    #[test]
    fn app_config_creates_missing_config_dir() {
        let temp = TempDir::new().unwrap();
        let config_dir = temp.path().join("nested").join("cfg");
        let context = ResolvedContext {
            config_dir: Some(config_dir.clone()),
            config_file: Some(temp.path().join("none.yml").display().to_string()),
            ..Default::default()
        };
        // the custom file does not exist, but the directory is created first
        assert!(AppConfig::new(BuildInfo::current(), false, temp.path(), &context).is_err());
        assert!(config_dir.is_dir());
    }
}
