//! Command-line arguments and the block settings document.
//!
//! Block settings come from an optional YAML document in the desktop format. The environment
//! variables listed below override individual keys on top of it.

use std::fs;
use std::path::{Path, PathBuf};

use block_contract::{BlockId, BlockSettings};
use clap::Parser;
use platform_host::{BlockEntry, DashboardConfig};
use serde_json::Value;

use crate::ServerError;

/// Command-line arguments, each with an environment fallback.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "dashboard_server",
    version,
    about = "Serves bubble dashboard blocks over HTTP and SSE"
)]
pub struct ServerArgs {
    /// Interface to listen on.
    #[arg(long, env = "BUBBLE_HOST", default_value = "0.0.0.0")]
    pub host: String,
    /// TCP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,
    /// YAML configuration document holding per-block settings.
    #[arg(long, env = "BUBBLE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl ServerArgs {
    /// `host:port` listen address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    Text,
    Number,
    List,
}

struct EnvOverride {
    var: &'static str,
    block: &'static str,
    key: &'static str,
    kind: ValueKind,
}

const ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        var: "EMAIL_HOST",
        block: "emails",
        key: "imap_host",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "EMAIL_ADDRESS",
        block: "emails",
        key: "email",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "EMAIL_PASSWORD",
        block: "emails",
        key: "password",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "EMAIL_MAX",
        block: "emails",
        key: "max_display",
        kind: ValueKind::Number,
    },
    EnvOverride {
        var: "JOBS_KEYWORDS",
        block: "jobs",
        key: "keywords",
        kind: ValueKind::List,
    },
    EnvOverride {
        var: "JOBS_LOCATION",
        block: "jobs",
        key: "location",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "TMDB_API_KEY",
        block: "movies",
        key: "tmdb_api_key",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "TMDB_LANGUAGE",
        block: "movies",
        key: "language",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "WEATHER_CITY",
        block: "weather",
        key: "city",
        kind: ValueKind::Text,
    },
    EnvOverride {
        var: "WEATHER_API_KEY",
        block: "weather",
        key: "api_key",
        kind: ValueKind::Text,
    },
];

fn override_value(kind: ValueKind, raw: &str) -> Option<Value> {
    match kind {
        ValueKind::Text => Some(Value::from(raw)),
        ValueKind::Number => raw.trim().parse::<u64>().ok().map(Value::from),
        ValueKind::List => Some(Value::from(
            raw.split(',')
                .map(str::trim)
                .filter(|word| !word.is_empty())
                .collect::<Vec<_>>(),
        )),
    }
}

fn settings_mut<'a>(config: &'a mut DashboardConfig, block: &str) -> &'a mut BlockSettings {
    let id = BlockId::trusted(block);
    let index = match config.blocks.iter().position(|entry| entry.id == id) {
        Some(index) => index,
        None => {
            config.blocks.push(BlockEntry {
                id,
                enabled: false,
                grid_row: 0,
                grid_col: 0,
                config: BlockSettings::new(),
            });
            config.blocks.len() - 1
        }
    };
    &mut config.blocks[index].config
}

/// Applies environment overrides to the block settings of `config`.
///
/// `lookup` resolves a variable name; blank values are ignored. Returns the names of the
/// variables that were applied.
pub fn apply_env_overrides(
    config: &mut DashboardConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Vec<&'static str> {
    let mut applied = Vec::new();
    for rule in ENV_OVERRIDES {
        let Some(raw) = lookup(rule.var).filter(|raw| !raw.trim().is_empty()) else {
            continue;
        };
        let Some(value) = override_value(rule.kind, &raw) else {
            tracing::warn!(var = rule.var, "ignoring non-numeric override");
            continue;
        };
        settings_mut(config, rule.block).set(rule.key, value);
        applied.push(rule.var);
    }
    applied
}

/// Loads the settings document, or the default document when no path is given.
///
/// # Errors
///
/// Returns [`ServerError::ConfigRead`] or [`ServerError::ConfigParse`] when the document at
/// `path` cannot be used.
pub fn load_config(path: Option<&Path>) -> Result<DashboardConfig, ServerError> {
    let Some(path) = path else {
        return Ok(DashboardConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;
    if raw.trim().is_empty() {
        return Ok(DashboardConfig::default());
    }
    serde_yaml::from_str(&raw).map_err(|source| ServerError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_listen_on_all_interfaces_port_8000() {
        if ["BUBBLE_HOST", "PORT", "BUBBLE_CONFIG"]
            .iter()
            .any(|var| std::env::var_os(var).is_some())
        {
            return;
        }
        let args = ServerArgs::try_parse_from(["dashboard_server"]).expect("parse");
        assert_eq!(args.bind_addr(), "0.0.0.0:8000");
        assert_eq!(args.config, None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = ServerArgs::try_parse_from([
            "dashboard_server",
            "--host",
            "127.0.0.1",
            "--port",
            "9100",
            "--config",
            "/etc/bubble.yaml",
        ])
        .expect("parse");
        assert_eq!(args.bind_addr(), "127.0.0.1:9100");
        assert_eq!(args.config, Some(PathBuf::from("/etc/bubble.yaml")));
    }

    #[test]
    fn env_overrides_replace_block_settings() {
        let mut config = DashboardConfig::default();
        let applied = apply_env_overrides(
            &mut config,
            env(&[
                ("WEATHER_CITY", "Lyon"),
                ("EMAIL_MAX", "3"),
                ("JOBS_KEYWORDS", "rust, embedded ,"),
                ("TMDB_API_KEY", "   "),
            ]),
        );

        assert_eq!(applied, vec!["EMAIL_MAX", "JOBS_KEYWORDS", "WEATHER_CITY"]);
        let weather = config.settings_for(&BlockId::trusted("weather"));
        assert_eq!(weather.str("city"), Some("Lyon"));
        let emails = config.settings_for(&BlockId::trusted("emails"));
        assert_eq!(emails.u64_or("max_display", 0), 3);
        let jobs = config.settings_for(&BlockId::trusted("jobs"));
        assert_eq!(jobs.string_list("keywords"), vec!["rust", "embedded"]);
        let movies = config.settings_for(&BlockId::trusted("movies"));
        assert_eq!(movies.secret("tmdb_api_key"), None);
    }

    #[test]
    fn overrides_create_missing_entries_disabled() {
        let mut config = DashboardConfig {
            blocks: Vec::new(),
            ..DashboardConfig::default()
        };
        apply_env_overrides(&mut config, env(&[("TMDB_LANGUAGE", "fr-FR")]));

        let entry = config.entry(&BlockId::trusted("movies")).expect("entry");
        assert!(!entry.enabled);
        assert_eq!(entry.config.str("language"), Some("fr-FR"));
    }

    #[test]
    fn bad_number_is_skipped() {
        let mut config = DashboardConfig::default();
        let applied = apply_env_overrides(&mut config, env(&[("EMAIL_MAX", "many")]));
        assert!(applied.is_empty());
        let emails = config.settings_for(&BlockId::trusted("emails"));
        assert_eq!(emails.u64_or("max_display", 0), 5);
    }

    #[test]
    fn missing_config_path_uses_default_document() {
        let config = load_config(None).expect("default");
        assert_eq!(config, DashboardConfig::default());

        let err =
            load_config(Some(Path::new("/nonexistent/bubble.yaml"))).expect_err("missing");
        assert!(err
            .to_string()
            .starts_with("failed to read config /nonexistent/bubble.yaml"));
    }
}
