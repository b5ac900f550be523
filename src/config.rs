//! Process configuration
//!
//! Both binaries take `--flag value` pairs, falling back to environment
//! variables and then to defaults.

use anyhow::{Context, Result, anyhow, bail};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DIRECTORY_BIND: &str = "127.0.0.1:4001";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const ENV_DIRECTORY: &str = "CAN_DIRECTORY";
pub const ENV_DATA_DIR: &str = "CAN_DATA_DIR";
pub const ENV_TIMEOUT_MS: &str = "CAN_TIMEOUT_MS";
pub const ENV_DIRECTORY_BIND: &str = "CAN_DIRECTORY_BIND";

#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    pub bind: SocketAddr,
    pub directory: SocketAddr,
    pub data_dir: PathBuf,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryConfig {
    pub bind: SocketAddr,
    pub request_timeout: Duration,
}

/// Collects `--name value` pairs. Unknown flags are kept; a flag without a
/// value is an error.
fn parse_flags(args: &[String]) -> Result<Vec<(String, String)>> {
    let mut flags = Vec::new();
    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        if let Some(name) = arg.strip_prefix("--") {
            let value = args
                .get(i + 1)
                .ok_or_else(|| anyhow!("--{} needs a value", name))?;
            flags.push((name.to_string(), value.clone()));
            i += 2;
        } else {
            i += 1;
        }
    }
    Ok(flags)
}

fn flag<'a>(flags: &'a [(String, String)], name: &str) -> Option<&'a str> {
    flags
        .iter()
        .rev()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// Flag first, then the environment variable.
fn lookup<F>(flags: &[(String, String)], name: &str, env_key: &str, env: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    flag(flags, name).map(str::to_string).or_else(|| env(env_key))
}

fn parse_timeout(raw: Option<String>) -> Result<Duration> {
    match raw {
        Some(ms) => {
            let ms: u64 = ms
                .parse()
                .with_context(|| format!("invalid timeout '{}'", ms))?;
            if ms == 0 {
                bail!("timeout must be positive");
            }
            Ok(Duration::from_millis(ms))
        }
        None => Ok(DEFAULT_REQUEST_TIMEOUT),
    }
}

impl NodeConfig {
    /// Reads the process arguments (without the program name) and environment.
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args, |key| std::env::var(key).ok())
    }

    pub fn parse<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags = parse_flags(args)?;

        let bind: SocketAddr = flag(&flags, "bind")
            .ok_or_else(|| anyhow!("--bind <addr:port> is required"))?
            .parse()
            .context("invalid --bind address")?;

        let directory: SocketAddr = lookup(&flags, "directory", ENV_DIRECTORY, &env)
            .ok_or_else(|| anyhow!("--directory <addr:port> or {} is required", ENV_DIRECTORY))?
            .parse()
            .context("invalid directory address")?;

        let data_dir = lookup(&flags, "data-dir", ENV_DATA_DIR, &env)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(format!("data-{}", bind.port())));

        let request_timeout = parse_timeout(lookup(&flags, "timeout-ms", ENV_TIMEOUT_MS, &env))?;

        Ok(Self {
            bind,
            directory,
            data_dir,
            request_timeout,
        })
    }
}

impl DirectoryConfig {
    pub fn from_env() -> Result<Self> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::parse(&args, |key| std::env::var(key).ok())
    }

    pub fn parse<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flags = parse_flags(args)?;

        let bind: SocketAddr = lookup(&flags, "bind", ENV_DIRECTORY_BIND, &env)
            .unwrap_or_else(|| DEFAULT_DIRECTORY_BIND.to_string())
            .parse()
            .context("invalid directory bind address")?;

        let request_timeout = parse_timeout(lookup(&flags, "timeout-ms", ENV_TIMEOUT_MS, &env))?;

        Ok(Self {
            bind,
            request_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_node_config_from_flags() {
        let config = NodeConfig::parse(
            &args(&[
                "--bind",
                "127.0.0.1:5000",
                "--directory",
                "127.0.0.1:4001",
                "--data-dir",
                "/tmp/can",
                "--timeout-ms",
                "2500",
            ]),
            no_env,
        )
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.directory, "127.0.0.1:4001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("/tmp/can"));
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_node_config_defaults_and_env_fallback() {
        let env = |key: &str| match key {
            ENV_DIRECTORY => Some("10.0.0.1:4001".to_string()),
            _ => None,
        };
        let config = NodeConfig::parse(&args(&["--bind", "127.0.0.1:5002"]), env).unwrap();

        assert_eq!(config.directory, "10.0.0.1:4001".parse::<SocketAddr>().unwrap());
        assert_eq!(config.data_dir, PathBuf::from("data-5002"));
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_flag_wins_over_env() {
        let env = |key: &str| match key {
            ENV_DATA_DIR => Some("from-env".to_string()),
            _ => None,
        };
        let config = NodeConfig::parse(
            &args(&[
                "--bind",
                "127.0.0.1:5000",
                "--directory",
                "127.0.0.1:4001",
                "--data-dir",
                "from-flag",
            ]),
            env,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("from-flag"));
    }

    #[test]
    fn test_node_config_requires_bind_and_directory() {
        assert!(NodeConfig::parse(&args(&["--directory", "127.0.0.1:4001"]), no_env).is_err());
        assert!(NodeConfig::parse(&args(&["--bind", "127.0.0.1:5000"]), no_env).is_err());
        assert!(NodeConfig::parse(&args(&["--bind"]), no_env).is_err());
    }

    #[test]
    fn test_invalid_timeout_is_rejected() {
        let base = ["--bind", "127.0.0.1:5000", "--directory", "127.0.0.1:4001"];
        for bad in ["0", "soon"] {
            let mut list = base.to_vec();
            list.extend(["--timeout-ms", bad]);
            assert!(NodeConfig::parse(&args(&list), no_env).is_err(), "{}", bad);
        }
    }

    #[test]
    fn test_directory_config_default_bind() {
        let config = DirectoryConfig::parse(&[], no_env).unwrap();
        assert_eq!(config.bind, DEFAULT_DIRECTORY_BIND.parse::<SocketAddr>().unwrap());

        let env = |key: &str| match key {
            ENV_DIRECTORY_BIND => Some("0.0.0.0:9000".to_string()),
            _ => None,
        };
        let config = DirectoryConfig::parse(&[], env).unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000".parse::<SocketAddr>().unwrap());
    }
}
