use std::{env, net::SocketAddr};

use anyhow::{anyhow, Context, Result};
use derive_more::Constructor;
use url::Url;

pub const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3030";
const DEFAULT_DATABASE_PORT: u16 = 5432;

#[derive(Debug, Clone)]
pub struct Config {
    /// Connection string handed to sea-orm.
    pub database_url: String,
    pub weather: WeatherConfig,
    pub bind_address: SocketAddr,
}

#[derive(Debug, Clone, Constructor)]
pub struct WeatherConfig {
    pub base_url: Url,
    pub api_key: String,
}

/// PostgreSQL connection parameters, used when `DATABASE_URL` is not set.
#[derive(Debug, Clone, Constructor)]
pub struct DatabaseParts {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from a variable lookup function.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| var(key).with_context(|| format!("{key} not set"));

        let database_url = match var("DATABASE_URL") {
            Some(url) => url,
            None => {
                let port = match var("DATABASE_PORT") {
                    Some(port) => port
                        .parse()
                        .with_context(|| format!("Invalid DATABASE_PORT `{port}`"))?,
                    None => DEFAULT_DATABASE_PORT,
                };
                DatabaseParts::new(
                    required("DATABASE_HOST")?,
                    port,
                    required("DATABASE_NAME")?,
                    required("DATABASE_USER")?,
                    required("DATABASE_PASSWORD")?,
                )
                .url()?
                .into()
            }
        };

        let base_url = var("WEATHER_API_URL").unwrap_or_else(|| DEFAULT_WEATHER_API_URL.into());
        let weather = WeatherConfig::new(
            Url::parse(&base_url).with_context(|| format!("Invalid WEATHER_API_URL `{base_url}`"))?,
            required("WEATHER_API_KEY")?,
        );

        let bind_address = var("BIND_ADDRESS").unwrap_or_else(|| DEFAULT_BIND_ADDRESS.into());
        let bind_address = bind_address
            .parse()
            .with_context(|| format!("Invalid BIND_ADDRESS `{bind_address}`"))?;

        Ok(Self {
            database_url,
            weather,
            bind_address,
        })
    }
}

impl DatabaseParts {
    /// The `postgres://` connection URL, with user and password percent-encoded.
    pub fn url(&self) -> Result<Url> {
        let base = format!("postgres://{}:{}/{}", self.host, self.port, self.name);
        let mut url = Url::parse(&base).with_context(|| format!("Invalid database URL `{base}`"))?;
        url.set_username(&self.user)
            .map_err(|_| anyhow!("Can't set database user on `{base}`"))?;
        url.set_password(Some(&self.password))
            .map_err(|_| anyhow!("Can't set database password on `{base}`"))?;
        Ok(url)
    }
}
