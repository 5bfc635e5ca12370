use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::daemon::{DaemonConfig, DaemonError};

const DEFAULT_DIR: &str = "books";
const DEFAULT_DAEMON_TIMEOUT: &str = "24h";
const WRITE_PROBE_FILE: &str = "test_write_file.txt";

#[derive(Debug, Parser)]
#[command(name = "pbcsync", version, about = "Mirror a PocketBook Cloud library into a local directory")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Download missing books into the directory.
    Sync(SyncArgs),
    /// Print current version.
    Version,
}

// Every flag falls back to an environment variable when not given.
#[derive(Debug, Clone, Args)]
pub struct SyncArgs {
    /// Client ID of the PocketBook Cloud API.
    #[arg(long, env = "PBC_CLIENT_ID")]
    pub client_id: Option<String>,
    /// Client secret of the PocketBook Cloud API.
    #[arg(long, env = "PBC_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
    /// PocketBook Cloud username, usually an email.
    #[arg(long, env = "PBC_USERNAME")]
    pub username: Option<String>,
    /// PocketBook Cloud password.
    #[arg(long, env = "PBC_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Directory to sync files into.
    #[arg(long, env = "DIR", default_value = DEFAULT_DIR)]
    pub dir: PathBuf,
    /// Enable debug output.
    #[arg(long, env = "DEBUG")]
    pub debug: bool,
    /// Keep running and sync every `--daemon-timeout`.
    #[arg(long, env = "DAEMON")]
    pub daemon: bool,
    /// Interval between syncs in daemon mode, e.g. 24h, 90m, 1h30m.
    #[arg(
        long,
        env = "DAEMON_TIMEOUT",
        default_value = DEFAULT_DAEMON_TIMEOUT,
        value_parser = parse_duration
    )]
    pub daemon_timeout: Duration,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("incorrect directory {}: {source}", dir.display())]
    Directory {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("incorrect directory {}: is not a directory", dir.display())]
    NotADirectory { dir: PathBuf },
    #[error("daemon timeout: {0}")]
    Daemon(#[from] DaemonError),
}

/// Validated settings for the `sync` command.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub dir: PathBuf,
    pub daemon: Option<DaemonConfig>,
}

impl SyncArgs {
    /// Checks required values in flag order, then the target directory.
    pub fn validate(self) -> Result<SyncConfig, ConfigError> {
        let client_id = required(self.client_id, "client-id")?;
        let client_secret = required(self.client_secret, "client-secret")?;
        let username = required(self.username, "username")?;
        let password = required(self.password, "password")?;
        if self.dir.as_os_str().is_empty() {
            return Err(ConfigError::Required("dir"));
        }
        check_directory(&self.dir)?;
        let daemon = if self.daemon {
            Some(DaemonConfig::new(self.daemon_timeout)?)
        } else {
            None
        };

        Ok(SyncConfig {
            client_id,
            client_secret,
            username,
            password,
            dir: self.dir,
            daemon,
        })
    }
}

fn required(value: Option<String>, param: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::Required(param))
}

/// The directory must exist, be a directory and accept new files.
pub fn check_directory(dir: &Path) -> Result<(), ConfigError> {
    let directory_error = |source| ConfigError::Directory {
        dir: dir.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(dir).map_err(directory_error)?;
    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory {
            dir: dir.to_path_buf(),
        });
    }

    let probe = dir.join(WRITE_PROBE_FILE);
    std::fs::write(&probe, b"test").map_err(directory_error)?;
    let _ = std::fs::remove_file(probe);
    Ok(())
}

/// Parses durations in the `72h`, `1h30m`, `1.5h`, `500ms` style.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let value = input.trim();
    if value == "0" {
        return Ok(Duration::ZERO);
    }
    if value.is_empty() {
        return Err("duration is empty".to_string());
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut rest = value;
    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let number_len = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {input:?}"));
        }
        let amount: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}"))?;
        rest = &rest[number_len..];

        let unit_len = rest.find(is_number).unwrap_or(rest.len());
        let seconds_per_unit = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            "" => return Err(format!("missing unit in duration {input:?}")),
            unit => return Err(format!("unknown unit {unit:?} in duration {input:?}")),
        };
        rest = &rest[unit_len..];
        total = Duration::try_from_secs_f64(amount * seconds_per_unit)
            .ok()
            .and_then(|part| total.checked_add(part))
            .ok_or_else(|| format!("duration {input:?} out of range"))?;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    fn args(dir: &Path) -> SyncArgs {
        SyncArgs {
            client_id: Some("some-id".into()),
            client_secret: Some("some-secret".into()),
            username: Some("some-username".into()),
            password: Some("some-password".into()),
            dir: dir.to_path_buf(),
            debug: false,
            daemon: false,
            daemon_timeout: Duration::from_secs(86_400),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_sync_flags() {
        let cli = Cli::try_parse_from([
            "pbcsync",
            "sync",
            "--client-id",
            "some-id",
            "--client-secret",
            "some-secret",
            "--username",
            "some-username",
            "--password",
            "some-password",
            "--dir",
            "testdata",
            "--daemon",
            "--daemon-timeout",
            "1h30m",
        ])
        .unwrap();

        let Command::Sync(args) = cli.command else {
            panic!("expected sync command");
        };
        assert_eq!(args.client_id.as_deref(), Some("some-id"));
        assert_eq!(args.username.as_deref(), Some("some-username"));
        assert_eq!(args.dir, PathBuf::from("testdata"));
        assert!(args.daemon);
        assert_eq!(args.daemon_timeout, Duration::from_secs(5400));
    }

    #[test]
    fn parses_version_command() {
        let cli = Cli::try_parse_from(["pbcsync", "version"]).unwrap();
        assert!(matches!(cli.command, Command::Version));
    }

    #[test]
    fn reports_first_missing_value() {
        let dir = tempdir().unwrap();
        let cases: [(fn(&mut SyncArgs), &str); 5] = [
            (|a| a.client_id = None, "client-id is required"),
            (|a| a.client_secret = Some(String::new()), "client-secret is required"),
            (|a| a.username = None, "username is required"),
            (|a| a.password = None, "password is required"),
            (|a| a.dir = PathBuf::new(), "dir is required"),
        ];

        for (mutate, expected) in cases {
            let mut args = args(dir.path());
            mutate(&mut args);
            let err = args.validate().unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn client_id_is_reported_before_later_values() {
        let dir = tempdir().unwrap();
        let mut args = args(dir.path());
        args.client_id = None;
        args.password = None;

        let err = args.validate().unwrap_err();

        assert!(matches!(err, ConfigError::Required("client-id")));
    }

    #[test]
    fn missing_directory_is_rejected() {
        let dir = tempdir().unwrap();
        let err = args(&dir.path().join("missing")).validate().unwrap_err();

        match err {
            ConfigError::Directory { source, .. } => {
                assert_eq!(source.kind(), io::ErrorKind::NotFound)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        std::fs::write(&file, b"x").unwrap();

        let err = args(&file).validate().unwrap_err();

        assert!(matches!(err, ConfigError::NotADirectory { .. }));
    }

    #[test]
    fn writable_directory_passes_and_probe_is_removed() {
        let dir = tempdir().unwrap();

        let config = args(dir.path()).validate().unwrap();

        assert_eq!(config.dir, dir.path());
        assert!(config.daemon.is_none());
        assert!(!dir.path().join(WRITE_PROBE_FILE).exists());
    }

    #[test]
    fn daemon_mode_requires_positive_interval() {
        let dir = tempdir().unwrap();
        let mut daemon_args = args(dir.path());
        daemon_args.daemon = true;

        let config = daemon_args.clone().validate().unwrap();
        assert_eq!(
            config.daemon.map(|d| d.interval()),
            Some(Duration::from_secs(86_400))
        );

        daemon_args.daemon_timeout = Duration::ZERO;
        let err = daemon_args.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Daemon(DaemonError::ZeroInterval)));
    }

    #[test]
    fn parses_go_style_durations() {
        assert_eq!(parse_duration("24h"), Ok(Duration::from_secs(86_400)));
        assert_eq!(parse_duration("1h30m"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("1.5h"), Ok(Duration::from_secs(5400)));
        assert_eq!(parse_duration("500ms"), Ok(Duration::from_millis(500)));
        assert_eq!(parse_duration("0"), Ok(Duration::ZERO));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("5d").is_err());
        assert!(parse_duration("h").is_err());
    }

    #[test]
    fn rejects_durations_out_of_range() {
        let err = parse_duration("99999999999999999999h").unwrap_err();
        assert!(err.contains("out of range"), "{err}");
        assert!(parse_duration("5124095576030431h5124095576030431h").is_err());
        assert!(
            Cli::try_parse_from(["pbcsync", "sync", "--daemon-timeout", "99999999999999999999h"])
                .is_err()
        );
    }
}
