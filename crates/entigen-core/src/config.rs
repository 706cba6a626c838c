//! Shared defaults and environment lookups.
//!
//! Keeps the constants the CLI and the component crates agree on in one place.

/// Environment variable names.
pub mod env_vars {
    /// Standard tracing filter directive.
    pub const RUST_LOG: &str = "RUST_LOG";
    /// `true` or `1` switches log output to JSON lines.
    pub const LOG_JSON: &str = "ENTIGEN_LOG_JSON";
}

/// Default values.
pub mod defaults {
    /// Filter used when `RUST_LOG` is not set.
    pub const LOG_FILTER: &str = "entigen=info";
    /// Filter used when `--verbose` is passed and `RUST_LOG` is not set.
    pub const VERBOSE_LOG_FILTER: &str = "entigen=debug";
    /// Id given to the OpenTherm hub when the document names none.
    pub const HUB_ID: &str = "opentherm_hub";
}

/// Whether JSON log output was requested through the environment.
pub fn log_json() -> bool {
    std::env::var(env_vars::LOG_JSON)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

/// Default tracing filter for the given verbosity.
pub fn default_log_filter(verbose: bool) -> &'static str {
    if verbose {
        defaults::VERBOSE_LOG_FILTER
    } else {
        defaults::LOG_FILTER
    }
}

/// Accepts `1`, `true`, `yes` and `on`, ignoring case.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Input document formats accepted by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
}

impl DocumentFormat {
    /// Pick the format from a file extension. Unknown extensions are `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Infer the format from a path.
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}
