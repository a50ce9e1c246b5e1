use std::{
    collections::{HashMap, HashSet},
    future::Future,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bollard::{
    container::{
        Config, CreateContainerOptions, ListContainersOptions, RemoveContainerOptions,
        StartContainerOptions,
    },
    image::CreateImageOptions,
    service::{HostConfig, PortBinding},
    Docker,
};
use futures_util::TryStreamExt;
use rstest::{fixture, rstest};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{service, weather::WeatherLookup};

/// A fresh in-memory SQLite database with all tables created.
///
/// Limited to a single connection, so every query sees the same database.
#[fixture]
pub async fn database() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let connection = Database::connect(options).await?;
    crate::database::create_tables(&connection).await?;
    Ok(connection)
}

/// Weather lookup answering from a fixed table. City names match case-insensitively.
#[derive(Debug, Default)]
pub struct StaticWeather {
    weather: HashMap<String, f64>,
    /// Cities confirmed to exist, but without weather data.
    confirmed: HashSet<String>,
    weather_requests: AtomicUsize,
}

impl StaticWeather {
    pub fn with_city(mut self, name: &str, weather: f64) -> Self {
        self.weather.insert(name.to_lowercase(), weather);
        self
    }

    pub fn confirm_only(mut self, name: &str) -> Self {
        self.confirmed.insert(name.to_lowercase());
        self
    }

    /// How often `current_weather` was called.
    pub fn weather_requests(&self) -> usize {
        self.weather_requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherLookup for StaticWeather {
    async fn check_existing(&self, city: &str) -> bool {
        let city = city.to_lowercase();
        self.weather.contains_key(&city) || self.confirmed.contains(&city)
    }

    async fn current_weather(&self, city: &str) -> Result<f64> {
        self.weather_requests.fetch_add(1, Ordering::SeqCst);
        self.weather
            .get(&city.to_lowercase())
            .copied()
            .ok_or_else(|| anyhow!("No weather for `{city}`"))
    }
}

#[rstest]
#[tokio::test]
#[ignore = "manually only"]
async fn recreate_container_and_register_for_picnic(
    postgres_container: impl Future<Output = Result<PostgresContainer>>,
) -> Result<()> {
    let container = postgres_container.await?;
    let database = connect_with_retry(&container.url()).await?;
    let weather = StaticWeather::default().with_city("Paris", 18.5);

    let city = service::create_city(&database, &weather, "paris").await?;
    let picnic = service::create_picnic(&database, city.id, chrono::Utc::now()).await?;
    let user = service::register_user(&database, "John", "Doe", 30).await?;
    service::register_for_picnic(&database, user.id, picnic.picnic.id).await?;

    let err = service::register_for_picnic(&database, user.id, picnic.picnic.id)
        .await
        .unwrap_err();
    assert!(matches!(err, crate::AppError::DuplicateRegistration { .. }));

    Ok(())
}

/// PostgreSQL needs a moment after the container started.
async fn connect_with_retry(url: &str) -> Result<DatabaseConnection> {
    let mut last_error = None;
    for _ in 0..30 {
        match crate::database::connect(url).await {
            Ok(connection) => return Ok(connection),
            Err(e) => last_error = Some(e),
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
    Err(last_error.unwrap_or_else(|| anyhow!("Database never became ready")))
}

/// A throwaway PostgreSQL server in docker, published on localhost.
#[derive(Debug, Clone)]
pub struct PostgresContainer {
    pub image: String,
    pub name: String,
    pub host_port: u16,
    pub database: String,
    pub password: String,
}

impl Default for PostgresContainer {
    fn default() -> Self {
        Self {
            image: "postgres:16.4".into(),
            name: "picnic-planner-postgres-test".into(),
            // Off the default port, so a local server keeps running.
            host_port: 5433,
            database: "picnics".into(),
            password: "picnic-planner-test".into(),
        }
    }
}

impl PostgresContainer {
    pub fn url(&self) -> String {
        format!(
            "postgres://postgres:{}@localhost:{}/{}",
            self.password, self.host_port, self.database
        )
    }

    /// Pulls the image, replaces any container of the same name and starts a fresh one.
    pub async fn start(&self, docker: &Docker) -> Result<()> {
        docker
            .create_image(
                Some(CreateImageOptions {
                    from_image: self.image.as_str(),
                    ..Default::default()
                }),
                None,
                None,
            )
            .try_collect::<Vec<_>>()
            .await
            .with_context(|| format!("Pulling {}", self.image))?;

        self.remove_existing(docker).await?;

        docker
            .create_container(
                Some(CreateContainerOptions {
                    name: self.name.clone(),
                    ..Default::default()
                }),
                self.container_config(),
            )
            .await
            .context("Creating container")?;

        docker
            .start_container(&self.name, None::<StartContainerOptions<String>>)
            .await
            .context("Starting container")?;
        Ok(())
    }

    fn container_config(&self) -> Config<String> {
        let port_bindings = HashMap::from([(
            "5432/tcp".to_string(),
            Some(vec![PortBinding {
                host_ip: Some("127.0.0.1".into()),
                host_port: Some(self.host_port.to_string()),
            }]),
        )]);

        Config {
            image: Some(self.image.clone()),
            env: Some(vec![
                "POSTGRES_USER=postgres".into(),
                format!("POSTGRES_PASSWORD={}", self.password),
                format!("POSTGRES_DB={}", self.database),
            ]),
            host_config: Some(HostConfig {
                port_bindings: Some(port_bindings),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    /// Stopped containers count too, their name would still be taken.
    async fn remove_existing(&self, docker: &Docker) -> Result<()> {
        let containers = docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: true,
                ..Default::default()
            }))
            .await
            .context("Listing containers")?;

        let name = format!("/{}", self.name);
        let exists = containers
            .iter()
            .flat_map(|container| &container.names)
            .any(|names| names.contains(&name));
        if exists {
            docker
                .remove_container(
                    &self.name,
                    Some(RemoveContainerOptions {
                        force: true,
                        ..Default::default()
                    }),
                )
                .await
                .context("Removing container")?;
        }
        Ok(())
    }
}

#[fixture]
pub async fn postgres_container() -> Result<PostgresContainer> {
    let docker = Docker::connect_with_local_defaults()?;
    let container = PostgresContainer::default();
    container.start(&docker).await?;
    Ok(container)
}
