use std::path::{Path, PathBuf};

use color_eyre::Result;
use color_eyre::eyre::{Context, bail, eyre};
use serde::{Deserialize, Serialize};

use crate::jellyfin_rs::ServerEndpoint;

/// Contents of the optional TOML config file. Every key is optional and
/// unknown keys are ignored.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub server_a: Option<ServerConfig>,
    #[serde(default)]
    pub server_b: Option<ServerConfig>,
}

/// Connection details for one server as written in the file or given on the
/// command line. Validated into a [`ServerEndpoint`] by [`Config::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: Option<String>,
    pub user_id: Option<String>,
    pub token: Option<String>,
}

impl ServerConfig {
    /// Fields set here win over `fallback`.
    fn or(self, fallback: ServerConfig) -> ServerConfig {
        ServerConfig {
            host: self.host.or(fallback.host),
            user_id: self.user_id.or(fallback.user_id),
            token: self.token.or(fallback.token),
        }
    }
}

impl FileConfig {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err(format!("Failed to read config file: {}", path.display()))?;
        let config: FileConfig = toml::from_str(&contents)
            .wrap_err(format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Default config file location, e.g. `~/.config/jellyfin-watch-sync/config.toml`.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("jellyfin-watch-sync").join("config.toml"))
    }

    /// Load the explicit file if given, else the default file if it exists.
    /// A missing default file is not an error: everything can come from flags.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    fn template() -> Self {
        let server = |name: &str| ServerConfig {
            host: Some(format!("{}.example.net", name)),
            user_id: Some("<user id>".to_string()),
            token: Some("<api token>".to_string()),
        };
        FileConfig {
            dry_run: Some(true),
            server_a: Some(server("jellyfin-a")),
            server_b: Some(server("jellyfin-b")),
        }
    }

    /// Write a template config to `path`, refusing to overwrite an existing file.
    pub fn create_default_at(path: &Path) -> Result<()> {
        if path.exists() {
            bail!("Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(&Self::template()).wrap_err("Failed to serialize config")?;
        std::fs::write(path, contents)
            .wrap_err(format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or(eyre!("No default config directory found"))?;
        Self::create_default_at(&path)?;
        Ok(path)
    }
}

/// Fully resolved run configuration.
#[derive(Debug)]
pub struct Config {
    pub server_a: ServerEndpoint,
    pub server_b: ServerEndpoint,
    pub dry_run: bool,
}

impl Config {
    /// Merge command line values over the file. Dry run defaults to on.
    ///
    /// # Errors
    /// Fails when any host, user id or token is missing for either server,
    /// naming every missing flag, or when a host is not a usable url.
    pub fn resolve(
        file: FileConfig,
        cli_a: ServerConfig,
        cli_b: ServerConfig,
        cli_dry_run: Option<bool>,
    ) -> Result<Self> {
        let a = cli_a.or(file.server_a.unwrap_or_default());
        let b = cli_b.or(file.server_b.unwrap_or_default());

        let mut missing = Vec::new();
        for (prefix, server) in [("a", &a), ("b", &b)] {
            if server.host.as_deref().is_none_or(str::is_empty) {
                missing.push(format!("--{}-host", prefix));
            }
            if server.user_id.as_deref().is_none_or(str::is_empty) {
                missing.push(format!("--{}-user", prefix));
            }
            if server.token.as_deref().is_none_or(str::is_empty) {
                missing.push(format!("--{}-token", prefix));
            }
        }
        if !missing.is_empty() {
            bail!("Missing required configuration: {}", missing.join(", "));
        }

        Ok(Config {
            server_a: endpoint("a", a)?,
            server_b: endpoint("b", b)?,
            dry_run: cli_dry_run.or(file.dry_run).unwrap_or(true),
        })
    }
}

fn endpoint(name: &str, server: ServerConfig) -> Result<ServerEndpoint> {
    ServerEndpoint::new(
        server.host.as_deref().unwrap_or_default(),
        server.user_id.unwrap_or_default(),
        server.token.unwrap_or_default(),
    )
    .wrap_err(format!("Invalid configuration for server {}", name.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(host: &str, user_id: &str, token: &str) -> ServerConfig {
        ServerConfig {
            host: Some(host.to_string()),
            user_id: Some(user_id.to_string()),
            token: Some(token.to_string()),
        }
    }

    #[test]
    fn test_resolve_from_cli_only() {
        let config = Config::resolve(
            FileConfig::default(),
            server("a.example.net/", "ua", "ta"),
            server("http://b.local:8096", "ub", "tb"),
            None,
        )
        .unwrap();

        assert_eq!(config.server_a.host(), "https://a.example.net");
        assert_eq!(config.server_a.user_id(), "ua");
        assert_eq!(config.server_b.host(), "http://b.local:8096");
        assert_eq!(config.server_b.token(), "tb");
    }

    #[test]
    fn test_dry_run_defaults_to_true() {
        let config = Config::resolve(
            FileConfig::default(),
            server("a", "ua", "ta"),
            server("b", "ub", "tb"),
            None,
        )
        .unwrap();
        assert!(config.dry_run);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            dry_run: Some(true),
            server_a: Some(server("file-a", "file-ua", "file-ta")),
            server_b: Some(server("file-b", "file-ub", "file-tb")),
        };
        let cli_a = ServerConfig {
            token: Some("cli-ta".to_string()),
            ..Default::default()
        };

        let config = Config::resolve(file, cli_a, ServerConfig::default(), Some(false)).unwrap();

        assert_eq!(config.server_a.host(), "https://file-a");
        assert_eq!(config.server_a.token(), "cli-ta");
        assert_eq!(config.server_b.user_id(), "file-ub");
        assert!(!config.dry_run);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = Config::resolve(
            FileConfig::default(),
            ServerConfig {
                host: Some("a".to_string()),
                user_id: Some(String::new()),
                token: Some("ta".to_string()),
            },
            ServerConfig::default(),
            None,
        )
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Missing required configuration: --a-user, --b-host, --b-user, --b-token"
        );
    }

    #[test]
    fn test_toml_parse() {
        let toml_str = r#"
            dry_run = false

            [server_a]
            host = "https://a.example.net"
            user_id = "ua"
            token = "ta"

            [server_b]
            host = "b.example.net"
        "#;
        let parsed: FileConfig = toml::from_str(toml_str).unwrap();

        assert_eq!(parsed.dry_run, Some(false));
        assert_eq!(
            parsed.server_a.as_ref().unwrap().host.as_deref(),
            Some("https://a.example.net")
        );
        let b = parsed.server_b.unwrap();
        assert_eq!(b.host.as_deref(), Some("b.example.net"));
        assert!(b.token.is_none());
    }

    #[test]
    fn test_toml_unknown_fields_ignored() {
        let parsed: Result<FileConfig, _> = toml::from_str("dry_run = true\nsomething_else = 1\n");
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_create_default_round_trips_and_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        FileConfig::create_default_at(&path).unwrap();
        let loaded = FileConfig::from_file(&path).unwrap();
        assert_eq!(loaded.dry_run, Some(true));
        assert_eq!(
            loaded.server_a.unwrap().host.as_deref(),
            Some("jellyfin-a.example.net")
        );

        assert!(FileConfig::create_default_at(&path).is_err());
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
