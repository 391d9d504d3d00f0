//! Server configuration from the environment.
//!
//! All variables are required at startup; a missing one aborts the process
//! with a fatal error rather than limping along half-configured.

use thiserror::Error;

/// A required environment variable was absent or empty.
#[derive(Error, Debug)]
#[error("{0} is required env variable")]
pub struct MissingEnvVar(&'static str);

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Primary database URI (forwarded to sibling services).
    pub db_uri: String,
    /// List-view database URI (forwarded to sibling services).
    pub db_uri_listview: String,
    /// Base URI of the event-store service.
    pub event_store_endpoint: String,
}

impl Config {
    /// Read the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`MissingEnvVar`] for the first required variable that is
    /// absent or empty.
    pub fn from_env() -> Result<Self, MissingEnvVar> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`MissingEnvVar`] for the first required variable the lookup
    /// does not yield a non-empty value for.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, MissingEnvVar> {
        Ok(Self {
            db_uri: require(&lookup, "DB_URI")?,
            db_uri_listview: require(&lookup, "DB_URI_LISTVIEW")?,
            event_store_endpoint: require(&lookup, "EVENT_STORE_ENDPOINT")?,
        })
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, MissingEnvVar> {
    match lookup(name) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(MissingEnvVar(name)),
    }
}
