//! Command-line flags and configuration resolution.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use growtech::config::{self, GrowTechConfig};

/// Flags accepted by the `growtech` binary.
#[derive(Debug, Parser)]
#[command(name = "growtech", version, about = "GrowTech: your technical skills mentor")]
pub struct Args {
    /// Path to a TOML configuration file.
    #[arg(long, env = "GROWTECH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. `0.0.0.0:8501`.
    #[arg(long)]
    pub bind: Option<String>,

    /// Log filter directive, e.g. `info` or `growtech_kernel=debug`.
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Load the model in the background at start-up instead of on first use.
    #[arg(long)]
    pub preload: bool,
}

/// Loads the config file, applies flag overrides, then validates the result.
///
/// # Errors
///
/// Fails if the file cannot be loaded or the merged settings are invalid.
pub fn resolve_config(args: &Args) -> Result<GrowTechConfig> {
    let mut config =
        config::load(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(bind) = &args.bind {
        config.server.bind.clone_from(bind);
    }
    if let Some(filter) = &args.log_filter {
        config.logging.filter.clone_from(filter);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_config(name: &str, body: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "growtech-cli-{}-{name}.toml",
            std::process::id()
        ));
        fs::write(&path, body).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("growtech").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_file_values() {
        let path = write_config(
            "override",
            "[server]\nbind = \"127.0.0.1:9000\"\n\n[logging]\nfilter = \"warn\"\n",
        );
        let config_arg = path.to_string_lossy().into_owned();

        let from_file = resolve_config(&parse(&["--config", &config_arg])).unwrap();
        assert_eq!(from_file.server.bind, "127.0.0.1:9000");
        assert_eq!(from_file.logging.filter, "warn");

        let overridden = resolve_config(&parse(&[
            "--config",
            &config_arg,
            "--bind",
            "0.0.0.0:8600",
            "--log-filter",
            "growtech_kernel=debug",
        ]))
        .unwrap();
        assert_eq!(overridden.server.bind, "0.0.0.0:8600");
        assert_eq!(overridden.logging.filter, "growtech_kernel=debug");

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn bad_bind_flag_is_rejected() {
        let path = write_config("bad-bind", "[server]\nbind = \"127.0.0.1:9000\"\n");
        let config_arg = path.to_string_lossy().into_owned();

        let err = resolve_config(&parse(&["--config", &config_arg, "--bind", "nowhere"]))
            .expect_err("unparsable bind");
        assert!(format!("{err:#}").contains("server.bind"));

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn preload_defaults_off() {
        let args = parse(&["--bind", "127.0.0.1:8501"]);
        assert!(!args.preload);
        assert_eq!(args.bind.as_deref(), Some("127.0.0.1:8501"));
    }
}
