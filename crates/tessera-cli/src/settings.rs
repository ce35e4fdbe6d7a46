//! Operator configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. `<home>/config/tessera.toml`, if present
//! 3. `TESSERA_*` environment variables, nested with `__`
//!    (e.g. `TESSERA_CUSTODY__REFRESH_TOKEN`)

use anyhow::Context;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tessera_identity::CustodyOptions;
use tessera_signer::{Credential, CustodyClient, CustodyConfig, DEFAULT_REQUEST_TIMEOUT_MS};
use uuid::Uuid;

/// Default home directory, relative to the working directory.
pub const DEFAULT_HOME: &str = ".tessera";

/// Config file location relative to the home directory.
pub const CONFIG_FILE: &str = "config/tessera.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct TesseraConfig {
    /// Root directory for all node files.
    pub home: PathBuf,
    /// Node identity record, relative to `home`.
    pub node_key_file: PathBuf,
    /// Validator key and sign state directory, relative to `home`.
    pub privval_dir: PathBuf,
    /// Default log level.
    pub log_level: String,
    /// `pretty` or `json`.
    pub log_format: String,
    /// Custody service settings.
    #[serde(default)]
    pub custody: CustodySettings,
}

/// Custody service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CustodySettings {
    /// Identity service base URL.
    pub ident_url: String,
    /// Vault service base URL.
    pub vault_url: String,
    /// Long-lived refresh credential.
    #[serde(default)]
    pub refresh_token: Option<Credential>,
    /// Custody domain for new or existing keys.
    #[serde(default)]
    pub custody_domain_id: Option<Uuid>,
    /// Existing key to bind to.
    #[serde(default)]
    pub key_id: Option<Uuid>,
    /// Per-request deadline in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for CustodySettings {
    fn default() -> Self {
        Self {
            ident_url: "http://127.0.0.1:8080".to_string(),
            vault_url: "http://127.0.0.1:8080".to_string(),
            refresh_token: None,
            custody_domain_id: None,
            key_id: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl TesseraConfig {
    /// Loads configuration rooted at `home`.
    ///
    /// `home` comes from the command line, then `TESSERA_HOME`, then
    /// [`DEFAULT_HOME`].
    pub fn load(home: Option<&Path>) -> anyhow::Result<Self> {
        let home = home
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("TESSERA_HOME").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_HOME));

        Self::load_from(&home, Environment::with_prefix("TESSERA"))
    }

    fn load_from(home: &Path, env: Environment) -> anyhow::Result<Self> {
        let custody = CustodySettings::default();
        let home_str = home.to_string_lossy().into_owned();

        let config = Config::builder()
            .set_default("node_key_file", "config/node_key.json")?
            .set_default("privval_dir", "privval")?
            .set_default("log_level", "warn")?
            .set_default("log_format", "pretty")?
            .set_default("custody.ident_url", custody.ident_url)?
            .set_default("custody.vault_url", custody.vault_url)?
            .set_default("custody.request_timeout_ms", custody.request_timeout_ms)?
            .add_source(File::from(home.join(CONFIG_FILE)).required(false))
            .add_source(
                env.prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override("home", home_str)?
            .build()
            .context("failed to read configuration")?;

        config
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Returns the node identity record path.
    pub fn node_key_path(&self) -> PathBuf {
        self.home.join(&self.node_key_file)
    }

    /// Returns the validator directory.
    pub fn privval_root(&self) -> PathBuf {
        self.home.join(&self.privval_dir)
    }

    /// Returns the identity options derived from the custody settings.
    pub fn custody_options(&self) -> CustodyOptions {
        CustodyOptions {
            refresh_token: self.custody.refresh_token.clone(),
            custody_domain_id: self.custody.custody_domain_id,
            key_id: self.custody.key_id,
        }
    }

    /// Builds the custody client.
    pub fn custody_client(&self) -> anyhow::Result<CustodyClient> {
        let config = CustodyConfig {
            ident_url: self.custody.ident_url.clone(),
            vault_url: self.custody.vault_url.clone(),
            request_timeout_ms: self.custody.request_timeout_ms,
        };
        CustodyClient::new(config).context("failed to build custody client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Environment::with_prefix("TESSERA").source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = TesseraConfig::load_from(dir.path(), env(&[])).unwrap();

        assert_eq!(config.home, dir.path());
        assert_eq!(config.node_key_path(), dir.path().join("config/node_key.json"));
        assert_eq!(config.privval_root(), dir.path().join("privval"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.custody.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(config.custody_options(), CustodyOptions::none());
    }

    #[test]
    fn test_file_then_env() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
log_level = "info"
log_format = "json"

[custody]
vault_url = "https://vault.example"
request_timeout_ms = 2500
"#,
        )
        .unwrap();

        let domain = Uuid::new_v4();
        let domain_str = domain.to_string();
        let config = TesseraConfig::load_from(
            dir.path(),
            env(&[
                ("TESSERA_LOG_LEVEL", "debug"),
                ("TESSERA_CUSTODY__REFRESH_TOKEN", "refresh"),
                ("TESSERA_CUSTODY__CUSTODY_DOMAIN_ID", &domain_str),
            ]),
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, "json");
        assert_eq!(config.custody.vault_url, "https://vault.example");
        assert_eq!(config.custody.request_timeout_ms, 2500);
        assert_eq!(
            config.custody_options(),
            CustodyOptions::create(Credential::new("refresh"), domain)
        );
    }
}
