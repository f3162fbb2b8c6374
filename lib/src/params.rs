//! Connection parameters for the source database.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_FETCH_SIZE: u32 = 500;

/// How to reach the source database. The pipeline only ever reads these.
#[derive(Clone, Default, Builder, Serialize, Deserialize, PartialEq, Eq)]
#[builder(
    setter(into, strip_option),
    default,
    build_fn(validate = "Self::validate")
)]
pub struct ConnectionParameters {
    /// Driver class name, e.g. `org.sqlite.JDBC`. Optional: the connection string picks the driver.
    pub driver_class: Option<String>,
    /// JDBC-style connection string, e.g. `jdbc:sqlite:/data/shop.db`.
    pub connection_string: Option<String>,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
    /// Rows per round trip. `None` means the caller did not choose one.
    pub fetch_size: Option<u32>,
}

impl ConnectionParametersBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(Some(0)) = self.fetch_size {
            return Err("fetch size must be at least 1".to_string());
        }
        Ok(())
    }
}

impl ConnectionParameters {
    pub fn builder() -> ConnectionParametersBuilder {
        ConnectionParametersBuilder::default()
    }

    /// Parameters with the default fetch size, mirroring the four-argument constructor
    /// most callers use.
    pub fn new(
        driver_class: impl Into<String>,
        connection_string: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        ConnectionParameters {
            driver_class: non_empty(driver_class.into()),
            connection_string: non_empty(connection_string.into()),
            username: non_empty(username.into()),
            password: non_empty(password.into()),
            fetch_size: None,
        }
    }

    pub fn with_fetch_size(mut self, fetch_size: u32) -> Self {
        self.fetch_size = Some(fetch_size.max(1));
        self
    }

    /// The connection string, if one was given and it is not blank.
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn fetch_size_or_default(&self) -> u32 {
        self.fetch_size.unwrap_or(DEFAULT_FETCH_SIZE)
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("driver_class", &self.driver_class)
            .field("connection_string", &self.connection_string)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("fetch_size", &self.fetch_size)
            .finish()
    }
}
