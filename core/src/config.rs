//! Process configuration shared by the broker, the Titanic services and
//! the sample workers.
//!
//! Precedence (highest to lowest): CLI flags, `TITANIC_*` environment
//! variables, an optional `titanic.toml` in the working directory, then
//! the built-in defaults below — the layering this corpus's `config`
//! crate usage favors over hand-rolled env/file parsing.

use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:5555";
pub const DEFAULT_DIR: &str = ".titanic";

#[derive(Debug, Clone, Deserialize)]
struct FileConfig {
    endpoint: Option<String>,
    dir: Option<PathBuf>,
}

/// CLI surface shared by every Titanic binary.
///
/// `-v`/`--verbose` is the only spec-mandated flag; `--endpoint` and
/// `--dir` exist because the spec requires the broker address to be a
/// parameter rather than a compile-time constant.
#[derive(Debug, Clone, Parser)]
pub struct Args {
    /// Enable verbose (debug) logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Broker address, e.g. `tcp://127.0.0.1:5555`.
    #[arg(long, env = "TITANIC_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Titanic store directory.
    #[arg(long, env = "TITANIC_DIR")]
    pub dir: Option<PathBuf>,

    /// Path to an optional TOML config file.
    #[arg(long, default_value = "titanic.toml")]
    pub config: PathBuf,
}

/// Resolved configuration after layering CLI, env, file and defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub verbose: bool,
    pub endpoint: String,
    pub dir: PathBuf,
}

impl AppConfig {
    /// Parse CLI args and layer them over the optional config file and
    /// built-in defaults.
    #[must_use]
    pub fn load() -> Self {
        Self::from_args(Args::parse())
    }

    pub fn from_args(args: Args) -> Self {
        let file = load_file_config(&args.config);

        let endpoint = args
            .endpoint
            .or_else(|| file.as_ref().and_then(|f| f.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let dir = args
            .dir
            .or_else(|| file.as_ref().and_then(|f| f.dir.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DIR));

        Self {
            verbose: args.verbose,
            endpoint,
            dir,
        }
    }

    /// Initialize `tracing-subscriber` at the level implied by `-v`.
    pub fn init_tracing(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };
        let filter = tracing_subscriber::EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy();
        tracing_subscriber::fmt()
            .with_target(false)
            .compact()
            .with_env_filter(filter)
            .init();
    }
}

fn load_file_config(path: &std::path::Path) -> Option<FileConfig> {
    if !path.exists() {
        return None;
    }
    config::Config::builder()
        .add_source(config::File::from(path))
        .build()
        .ok()?
        .try_deserialize()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    fn args(endpoint: Option<&str>, dir: Option<&str>) -> Args {
        Args {
            verbose: false,
            endpoint: endpoint.map(String::from),
            dir: dir.map(PathBuf::from),
            config: PathBuf::from("nonexistent-titanic.toml"),
        }
    }

    #[test]
    fn falls_back_to_defaults() {
        let cfg = AppConfig::from_args(args(None, None));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.dir, PathBuf::from(DEFAULT_DIR));
    }

    #[test]
    fn cli_flags_override_defaults() {
        let cfg = AppConfig::from_args(args(Some("tcp://10.0.0.1:9999"), Some("/tmp/store")));
        assert_eq!(cfg.endpoint, "tcp://10.0.0.1:9999");
        assert_eq!(cfg.dir, PathBuf::from("/tmp/store"));
    }
}
