use std::env;

use crate::error::AppError;

const DEFAULT_PORT: u16 = 5000;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: String,
}

impl ServerConfig {
    pub fn new_from_env() -> Result<Self, AppError> {
        let port = parse_port(env::var("PORT").ok().as_deref())?;
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Config("DATABASE_URL".to_string()))?;

        Ok(Self { port, database_url })
    }
}

/// `PORT` value, falling back to the default when unset.
pub fn parse_port(raw: Option<&str>) -> Result<u16, AppError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| AppError::InvalidConfig {
            key: "PORT",
            value: raw.to_string(),
        }),
        None => Ok(DEFAULT_PORT),
    }
}
