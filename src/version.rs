use std::fmt;

/// Build metadata, injected at compile time by release builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
    pub build_source: &'static str,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: option_env!("LAZYGIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")),
            commit: option_env!("LAZYGIT_COMMIT").unwrap_or(""),
            date: option_env!("LAZYGIT_BUILD_DATE").unwrap_or(""),
            build_source: option_env!("LAZYGIT_BUILD_SOURCE").unwrap_or("unknown"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "commit={}, build date={}, build source={}, version={}, os={}, arch={}",
            self.commit,
            self.date,
            self.build_source,
            self.version,
            std::env::consts::OS,
            std::env::consts::ARCH
        )
    }
}
