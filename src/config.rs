use std::env;

use crate::{errors::ConfigError, repositories::MongoDbInitializationInfo};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CHECKOUT_API_URL: &str = "https://payments.yoco.com/api/checkouts";
pub const DEFAULT_MONGODB_DB: &str = "checkout-relay";
pub const DEFAULT_CHECKOUT_COLLECTION: &str = "checkouts";

/// What happens to the HTTP outcome when the checkout record cannot be stored
/// after the provider already created the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreFailurePolicy {
    /// The caller gets a 500 even though the session exists upstream.
    #[default]
    Escalate,
    /// The failure is logged and the caller still gets the upstream record.
    LogOnly,
}

impl StoreFailurePolicy {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "escalate" => Some(StoreFailurePolicy::Escalate),
            "log" | "log-only" | "log_only" => Some(StoreFailurePolicy::LogOnly),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_url: String,
    pub cors_origin: String,
    pub checkout_api_url: String,
    pub checkout_secret_key: String,
    pub mongodb: Option<MongoDbInitializationInfo>,
    pub store_failure_policy: StoreFailurePolicy,
    pub log_path: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let required = |key: &'static str| optional(key).ok_or(ConfigError::Missing(key));

        let port: u16 = match optional("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key: "PORT", value })?,
            None => DEFAULT_PORT,
        };

        let store_failure_policy = match optional("STORE_FAILURE_POLICY") {
            Some(value) => StoreFailurePolicy::parse(&value)
                .ok_or(ConfigError::Invalid { key: "STORE_FAILURE_POLICY", value })?,
            None => StoreFailurePolicy::default(),
        };

        let frontend_url = required("FRONTEND_URL")?;

        let mongodb = optional("MONGODB_URI").map(|uri| MongoDbInitializationInfo {
            uri,
            database: optional("MONGODB_DB").unwrap_or_else(|| String::from(DEFAULT_MONGODB_DB)),
            collection: optional("MONGODB_CHECKOUT_COLLECTION")
                .unwrap_or_else(|| String::from(DEFAULT_CHECKOUT_COLLECTION)),
        });

        Ok(AppConfig {
            port,
            cors_origin: optional("CORS_ORIGIN").unwrap_or_else(|| frontend_url.clone()),
            frontend_url,
            checkout_api_url: optional("CHECKOUT_API_URL")
                .unwrap_or_else(|| String::from(DEFAULT_CHECKOUT_API_URL)),
            checkout_secret_key: required("CHECKOUT_SECRET_KEY")?,
            mongodb,
            store_failure_policy,
            log_path: optional("LOG_PATH"),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
