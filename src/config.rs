use anyhow::{bail, Context, Result};
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const ENV_PREFIX: &str = "LIGHTBNB";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
}

/// Connection settings for the LightBnB database.
///
/// Either `url` or the individual fields describe the server; `url` wins when
/// both are present.
#[derive(Deserialize, Clone)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

impl Config {
    /// Layers built-in defaults, the TOML file at `path` (if it exists) and
    /// `LIGHTBNB__*` environment variables, in that order.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref();
        let builder = Self::defaults()?
            .add_source(config::File::from(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
            .with_context(|| format!("Failed to load configuration from path: {:?}", config_path))
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        let builder = config::Config::builder()
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432_i64)?
            .set_default("database.name", "lightbnb")?
            .set_default("database.max_connections", 10_i64)?
            .set_default("database.connection_timeout_secs", 30_i64)?;
        Ok(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings = builder.build().context("Failed to build configuration")?;
        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.database.validate()?;
        Ok(config)
    }
}

impl DatabaseConfig {
    fn validate(&self) -> Result<()> {
        if self.url.is_none() && self.user.is_none() {
            bail!("database.user must be set when database.url is not");
        }
        if self.max_connections == 0 {
            bail!("database.max_connections must be at least 1");
        }
        Ok(())
    }

    /// Connection string handed to libpq: the configured URL, or a
    /// keyword/value string built from the individual fields.
    pub fn connection_string(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }

        let mut parts = vec![
            format!("host={}", quote_conninfo(&self.host)),
            format!("port={}", self.port),
            format!("dbname={}", quote_conninfo(&self.name)),
        ];
        if let Some(user) = &self.user {
            parts.push(format!("user={}", quote_conninfo(user)));
        }
        if let Some(password) = &self.password {
            parts.push(format!("password={}", quote_conninfo(password)));
        }
        parts.join(" ")
    }
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .finish()
    }
}

// libpq keyword/value syntax: single-quote the value, backslash-escape
// quotes and backslashes.
fn quote_conninfo(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};

    fn load_toml(toml: &str) -> Result<Config> {
        let builder = Config::defaults()?.add_source(File::from_str(toml, FileFormat::Toml));
        Config::from_builder(builder)
    }

    #[test]
    fn defaults_fill_in_everything_but_credentials() {
        let config = load_toml("[database]\nuser = \"vagrant\"\n").unwrap();
        let db = &config.database;

        assert_eq!(db.host, "localhost");
        assert_eq!(db.port, 5432);
        assert_eq!(db.name, "lightbnb");
        assert_eq!(db.max_connections, 10);
        assert_eq!(db.connection_timeout_secs, 30);
        assert_eq!(db.user.as_deref(), Some("vagrant"));
        assert!(db.password.is_none());
    }

    #[test]
    fn missing_user_without_url_is_rejected() {
        let err = load_toml("[database]\nhost = \"db.internal\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("database.user"));
    }

    #[test]
    fn url_takes_precedence_over_fields() {
        let config = load_toml(
            "[database]\nurl = \"postgres://app@db.internal/lightbnb\"\nhost = \"ignored\"\n",
        )
        .unwrap();
        assert_eq!(
            config.database.connection_string(),
            "postgres://app@db.internal/lightbnb"
        );
    }

    #[test]
    fn connection_string_quotes_values() {
        let config = load_toml(
            "[database]\nuser = \"vagrant\"\npassword = \"it's a \\\\secret\"\nport = 6543\n",
        )
        .unwrap();
        assert_eq!(
            config.database.connection_string(),
            "host='localhost' port=6543 dbname='lightbnb' user='vagrant' password='it\\'s a \\\\secret'"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load_toml("[database]\nuser = \"vagrant\"\npassword = \"hunter2\"\n").unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
