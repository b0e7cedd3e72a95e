//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Honey-point schedule.
    #[serde(default)]
    pub points: PointsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance.
    pub url: String,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Honey-point awards per event. Policy, not code: deployments may tune
/// these without touching the ledger.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointsConfig {
    /// Awarded to the post author when a like goes active (revoked on undo).
    #[serde(default = "default_like_points")]
    pub like: i64,
    /// Awarded to the post author when a pollination goes active.
    #[serde(default = "default_pollination_points")]
    pub pollination: i64,
    /// Awarded to the commenter for each comment.
    #[serde(default = "default_comment_points")]
    pub comment: i64,
    /// Awarded to the author when a post is created.
    #[serde(default = "default_post_created_points")]
    pub post_created: i64,
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            like: default_like_points(),
            pollination: default_pollination_points(),
            comment: default_comment_points(),
            post_created: default_post_created_points(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_like_points() -> i64 {
    5
}

const fn default_pollination_points() -> i64 {
    15
}

const fn default_comment_points() -> i64 {
    10
}

const fn default_post_created_points() -> i64 {
    25
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `POLLENEER_ENV`)
    /// 3. Environment variables with `POLLENEER_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("POLLENEER_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("POLLENEER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("POLLENEER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_defaults_match_observed_schedule() {
        let points = PointsConfig::default();
        assert_eq!(points.like, 5);
        assert_eq!(points.pollination, 15);
        assert_eq!(points.comment, 10);
        assert_eq!(points.post_created, 25);
    }
}
