//! # Infrastructure Layer
//!
//! Concrete adapters for the onboarding core: MySQL repositories, email and
//! SMS delivery, bcrypt password hashing and tracing setup.
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)
//! - `twilio-sms`: Enable Twilio SMS service (default)

// Re-export core types for convenience
pub use ob_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Email delivery providers
pub mod email;

/// Password hashing
pub mod security;

/// SMS service module - External SMS providers
pub mod sms;

/// Tracing subscriber setup
pub mod telemetry;

use std::sync::Arc;

use ob_core::services::verification::{EmailServiceTrait, SmsServiceTrait};
use ob_shared::config::{AppConfig, VerificationConfig};

use crate::security::BcryptPasswordHasher;

#[cfg(feature = "mysql")]
pub use services::{InfrastructureServices, MySqlInvitationService, MySqlVerificationService};

#[cfg(feature = "mysql")]
mod services {
    use std::sync::Arc;

    use ob_core::clock::SystemClock;
    use ob_core::services::invitation::{InvitationService, InvitationServiceConfig};
    use ob_core::services::verification::{
        EmailServiceTrait, SmsServiceTrait, VerificationService, VerificationServiceConfig,
    };
    use ob_shared::config::AppConfig;

    use crate::database::{
        DatabasePool, MySqlInvitationRepository, MySqlMembershipRepository,
        MySqlUserRepository, MySqlVerificationCodeRepository,
    };
    use crate::security::BcryptPasswordHasher;
    use crate::{
        create_delivery, create_password_hasher, effective_verification_config,
        InfrastructureError,
    };

    pub type MySqlVerificationService = VerificationService<
        MySqlUserRepository,
        MySqlVerificationCodeRepository,
        dyn EmailServiceTrait,
        dyn SmsServiceTrait,
        SystemClock,
    >;

    pub type MySqlInvitationService = InvitationService<
        MySqlInvitationRepository,
        MySqlUserRepository,
        MySqlMembershipRepository,
        dyn EmailServiceTrait,
        BcryptPasswordHasher,
        SystemClock,
    >;

    /// Infrastructure service container
    #[derive(Clone)]
    pub struct InfrastructureServices {
        pub config: AppConfig,
        pub database: DatabasePool,
        pub email: Arc<dyn EmailServiceTrait>,
        pub sms: Arc<dyn SmsServiceTrait>,
        pub password_hasher: Arc<BcryptPasswordHasher>,
    }

    impl InfrastructureServices {
        /// Wire delivery adapters and the hasher around an open pool
        pub fn new(config: AppConfig, database: DatabasePool) -> Result<Self, InfrastructureError> {
            let (email, sms) = create_delivery(&config);
            let password_hasher = create_password_hasher()?;
            Ok(Self {
                config,
                database,
                email,
                sms,
                password_hasher,
            })
        }

        pub fn verification_service(&self) -> Result<MySqlVerificationService, InfrastructureError> {
            let pool = self.database.get_pool().clone();
            let verification = effective_verification_config(&self.config);
            let service = VerificationService::new(
                Arc::new(MySqlUserRepository::new(pool.clone())),
                Arc::new(MySqlVerificationCodeRepository::new(pool)),
                self.email.clone(),
                self.sms.clone(),
                Arc::new(SystemClock),
                VerificationServiceConfig::from(&verification),
            )?;
            Ok(service)
        }

        pub fn invitation_service(&self) -> Result<MySqlInvitationService, InfrastructureError> {
            let pool = self.database.get_pool().clone();
            let verification = effective_verification_config(&self.config);
            let service = InvitationService::new(
                Arc::new(MySqlInvitationRepository::new(pool.clone())),
                Arc::new(MySqlUserRepository::new(pool.clone())),
                Arc::new(MySqlMembershipRepository::new(pool)),
                self.email.clone(),
                self.password_hasher.clone(),
                Arc::new(SystemClock),
                InvitationServiceConfig::from(&verification),
            )?;
            Ok(service)
        }
    }
}

/// Build the email and SMS adapters selected by the delivery settings
pub fn create_delivery(
    config: &AppConfig,
) -> (Arc<dyn EmailServiceTrait>, Arc<dyn SmsServiceTrait>) {
    (
        email::create_email_service(&config.delivery),
        sms::create_sms_service(&config.delivery),
    )
}

/// Verification settings with dev mode forced off in production
pub fn effective_verification_config(config: &AppConfig) -> VerificationConfig {
    let mut verification = config.verification.clone();
    if config.environment.is_production() && verification.dev_mode {
        tracing::warn!("Verification dev mode ignored in production");
        verification.dev_mode = false;
    }
    verification
}

/// Password hasher honouring `BCRYPT_COST`
pub fn create_password_hasher() -> Result<Arc<BcryptPasswordHasher>, InfrastructureError> {
    Ok(Arc::new(BcryptPasswordHasher::from_env()?))
}

/// Initialize infrastructure services
///
/// Loads configuration, installs the tracing subscriber, opens the pool and
/// applies migrations.
#[cfg(feature = "mysql")]
pub async fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    let config = load_config();
    telemetry::init_tracing(&config.logging);
    tracing::info!(environment = %config.environment, "Initializing infrastructure services...");

    let database = database::DatabasePool::new(&config.database).await?;
    database.run_migrations().await?;

    let services = InfrastructureServices::new(config, database)?;
    tracing::info!("Infrastructure services initialized successfully");
    Ok(services)
}

/// Load configuration from the environment, reading `.env` when present
pub fn load_config() -> AppConfig {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// HTTP request error for external services
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// SMS service error
    #[error("SMS service error: {0}")]
    Sms(String),

    #[error("Email service error: {0}")]
    Email(String),

    /// Service construction rejected by the domain layer
    #[error(transparent)]
    Domain(#[from] ob_core::errors::DomainError),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}
