//! Configuration module with business-specific sub-modules
//!
//! - `database` - Database connection and pool configuration
//! - `delivery` - Email and SMS provider selection and credentials
//! - `environment` - Environment detection and logging configuration
//! - `verification` - Verification and invitation lifecycle settings
//!
//! Every struct is built once at startup and handed to the services by value.

pub mod database;
pub mod delivery;
pub mod environment;
pub mod verification;

use serde::{Deserialize, Serialize};

pub use database::DatabaseConfig;
pub use delivery::{DeliveryConfig, EmailProvider, SmsProvider};
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use verification::VerificationConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Verification and invitation lifecycle configuration
    pub verification: VerificationConfig,

    /// Outbound delivery configuration
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            verification: VerificationConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig::new("mysql://localhost:3306/onboard_dev"),
            verification: VerificationConfig {
                dev_mode: true,
                ..VerificationConfig::default()
            },
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig::new("mysql://prod-db:3306/onboard").with_max_connections(50),
            verification: VerificationConfig::default(),
            delivery: DeliveryConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// The environment picks the logging profile; every other section is read
    /// from its own variables so the process environment always wins.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            database: DatabaseConfig::from_env(),
            verification: VerificationConfig::from_env(),
            delivery: DeliveryConfig::from_env(),
            logging: LoggingConfig::for_environment(environment).with_env_level(),
        }
    }
}
