use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

/// Typed configuration for the bridge.
#[derive(Clone, Debug)]
pub struct Config {
    // Platform credentials
    pub api_id: i32,
    pub api_hash: String,

    // Files
    pub session_file: PathBuf,
    pub state_file: PathBuf,

    // First-login helpers (prompted for when absent)
    pub phone: Option<String>,
    pub password: Option<String>,

    // Fetch bounds
    pub history_scan_limit: usize,
}

impl Config {
    /// Load from the environment, after applying an optional `.env` file.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(env_str)
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_id_raw = lookup("TG_API_ID")
            .and_then(non_empty)
            .ok_or_else(|| Error::Config("TG_API_ID environment variable is required".to_string()))?;
        let api_id = api_id_raw
            .trim()
            .parse::<i32>()
            .map_err(|_| Error::Config(format!("TG_API_ID must be an integer, got {api_id_raw:?}")))?;

        let api_hash = lookup("TG_API_HASH").and_then(non_empty).ok_or_else(|| {
            Error::Config("TG_API_HASH environment variable is required".to_string())
        })?;

        let session_file = lookup("TG_SESSION_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("ai_agent_session.session"));
        let state_file = lookup("TG_STATE_FILE")
            .and_then(non_empty)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("channel_state.json"));

        let phone = lookup("TG_PHONE").and_then(non_empty);
        let password = lookup("TG_PASSWORD").and_then(non_empty);

        let history_scan_limit = lookup("TG_HISTORY_SCAN_LIMIT")
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(10_000);

        Ok(Self {
            api_id,
            api_hash: api_hash.trim().to_string(),
            session_file,
            state_file,
            phone,
            password,
            history_scan_limit,
        })
    }
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim().trim_start_matches("export ").trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let cfg = Config::from_lookup(lookup(&[("TG_API_ID", "12345"), ("TG_API_HASH", "abc")]))
            .unwrap();
        assert_eq!(cfg.api_id, 12345);
        assert_eq!(cfg.api_hash, "abc");
        assert_eq!(cfg.session_file, PathBuf::from("ai_agent_session.session"));
        assert_eq!(cfg.state_file, PathBuf::from("channel_state.json"));
        assert_eq!(cfg.phone, None);
        assert_eq!(cfg.history_scan_limit, 10_000);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = Config::from_lookup(lookup(&[
            ("TG_API_ID", " 7 "),
            ("TG_API_HASH", "h"),
            ("TG_STATE_FILE", "/var/lib/tgb/state.json"),
            ("TG_PHONE", "+15550100"),
            ("TG_HISTORY_SCAN_LIMIT", "500"),
        ]))
        .unwrap();
        assert_eq!(cfg.api_id, 7);
        assert_eq!(cfg.state_file, PathBuf::from("/var/lib/tgb/state.json"));
        assert_eq!(cfg.phone.as_deref(), Some("+15550100"));
        assert_eq!(cfg.history_scan_limit, 500);
    }

    #[test]
    fn missing_or_bad_credentials_are_config_errors() {
        let err = Config::from_lookup(lookup(&[("TG_API_HASH", "h")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let err =
            Config::from_lookup(lookup(&[("TG_API_ID", "x1"), ("TG_API_HASH", "h")])).unwrap_err();
        assert!(err.to_string().contains("TG_API_ID must be an integer"));

        let err = Config::from_lookup(lookup(&[("TG_API_ID", "1"), ("TG_API_HASH", " ")]))
            .unwrap_err();
        assert!(err.to_string().contains("TG_API_HASH"));
    }

    #[test]
    fn dotenv_lines_are_parsed() {
        let parsed = parse_dotenv(
            "# comment\nTG_API_ID=1\nexport TG_API_HASH=\"quoted\"\n\nbroken line\nTG_PHONE='+1'\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("TG_API_ID".to_string(), "1".to_string()),
                ("TG_API_HASH".to_string(), "quoted".to_string()),
                ("TG_PHONE".to_string(), "+1".to_string()),
            ]
        );
    }
}
