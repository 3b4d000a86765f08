//! Load config from file and environment.

use std::path::PathBuf;

use serde::Deserialize;

/// Daemon configuration. File: ~/.config/toxide/config.toml or
/// /etc/toxide/config.toml. Env overrides: TOXIDE_NAME, TOXIDE_SAVE_PATH.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Display name shown to friends (default "toxide").
    #[serde(default = "default_name")]
    pub name: String,
    /// Status message shown to friends.
    #[serde(default = "default_status")]
    pub status: String,
    /// Where the serialized profile is kept; created on first run.
    #[serde(default)]
    pub save_path: Option<PathBuf>,
    /// DHT nodes to seed from. Defaults to a small list of long-running
    /// public nodes.
    #[serde(default = "default_bootstrap")]
    pub bootstrap: Vec<BootstrapNode>,
}

/// One DHT bootstrap node: host, port, and hex public key.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BootstrapNode {
    pub host: String,
    pub port: u16,
    pub public_key: String,
}

fn default_name() -> String {
    "toxide".into()
}

fn default_status() -> String {
    "echoing messages".into()
}

fn default_bootstrap() -> Vec<BootstrapNode> {
    // From the public node list at nodes.tox.chat.
    [
        (
            "tox.initramfs.io",
            33445,
            "3F0A45A268367C1BEA652F258C85F4A66DA76BCAA667A49E770BCC4917AB6A25",
        ),
        (
            "tox.abilinski.com",
            33445,
            "10C00EB250C3233E343E2AEBA07115A5C28920E9C8D29492F6D00B29049EDC7E",
        ),
        (
            "tox.plastiras.org",
            33445,
            "8E8B63299B3D520FB377FE5100E65E3322F7AE5B20A0ACED2981769FC5B43725",
        ),
    ]
    .into_iter()
    .map(|(host, port, public_key)| BootstrapNode {
        host: host.into(),
        port,
        public_key: public_key.into(),
    })
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: default_name(),
            status: default_status(),
            save_path: None,
            bootstrap: default_bootstrap(),
        }
    }
}

impl Config {
    /// Profile path: configured one, else ~/.config/toxide/profile.tox.
    pub fn save_path(&self) -> PathBuf {
        if let Some(p) = &self.save_path {
            return p.clone();
        }
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        home.join(".config/toxide/profile.tox")
    }
}

/// Load config: merge default, then config file (if present), then env vars.
pub fn load() -> Config {
    let mut c = load_file().unwrap_or_default();
    if let Ok(s) = std::env::var("TOXIDE_NAME") {
        if !s.is_empty() {
            c.name = s;
        }
    }
    if let Ok(s) = std::env::var("TOXIDE_SAVE_PATH") {
        if !s.is_empty() {
            c.save_path = Some(PathBuf::from(s));
        }
    }
    c
}

fn config_paths() -> Vec<PathBuf> {
    let home = std::env::var_os("HOME").map(PathBuf::from);
    let mut out = Vec::new();
    if let Some(h) = home {
        out.push(h.join(".config/toxide/config.toml"));
    }
    out.push(PathBuf::from("/etc/toxide/config.toml"));
    out
}

fn load_file() -> Option<Config> {
    for p in config_paths() {
        if p.exists() {
            if let Ok(s) = std::fs::read_to_string(&p) {
                match toml::from_str::<Config>(&s) {
                    Ok(c) => return Some(c),
                    Err(e) => log::warn!("ignoring invalid config {}: {e}", p.display()),
                }
            }
            break;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_bootstrap_nodes() {
        let c = Config::default();
        assert_eq!(c.name, "toxide");
        assert!(!c.bootstrap.is_empty());
        for node in &c.bootstrap {
            assert_eq!(node.public_key.len(), 64);
            assert_ne!(node.port, 0);
        }
    }

    #[test]
    fn parse_full_file() {
        let c: Config = toml::from_str(
            r#"
            name = "bot"
            status = "around"
            save_path = "/var/lib/toxide/profile.tox"

            [[bootstrap]]
            host = "127.0.0.1"
            port = 33445
            public_key = "76518406F6A9F2217E8DC487CC783C25CC16A15EB36FF32E335A235342C48A39"
            "#,
        )
        .unwrap();
        assert_eq!(c.name, "bot");
        assert_eq!(c.bootstrap.len(), 1);
        assert_eq!(c.bootstrap[0].host, "127.0.0.1");
        assert_eq!(c.save_path().to_str().unwrap(), "/var/lib/toxide/profile.tox");
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let c: Config = toml::from_str(r#"name = "bot""#).unwrap();
        assert_eq!(c.status, default_status());
        assert!(!c.bootstrap.is_empty());
    }

    #[test]
    fn unknown_keys_rejected() {
        assert!(toml::from_str::<Config>(r#"nmae = "typo""#).is_err());
    }
}
