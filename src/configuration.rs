use anyhow::Context;
use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::domain::UserEmail;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub app_settings: AppSettings,
    pub mail: MailSettings,
    pub email_client: Option<EmailClientSettings>,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    /// Public address the application is reachable at, used in emailed links.
    pub base_url: String,
    pub hmac_secret: Secret<String>,
}

impl ApplicationSettings {
    /// Scheme, host and port of `base_url`, the port omitted when it is the
    /// scheme's default.
    pub fn origin(&self) -> Result<String, anyhow::Error> {
        let base_url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("`{}` is not a valid base url", self.base_url))?;
        let origin = base_url.origin();
        if !origin.is_tuple() {
            anyhow::bail!("`{}` has no usable origin", self.base_url);
        }
        Ok(origin.ascii_serialization())
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
    pub require_ssl: bool,
}

impl DatabaseSettings {
    pub fn without_db(&self) -> PgConnectOptions {
        let ssl_mode = if self.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        PgConnectOptions::new()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .ssl_mode(ssl_mode)
    }

    pub fn with_db(&self) -> PgConnectOptions {
        self.without_db().database(&self.database_name)
    }
}

/// Application-wide values exposed to handlers and mail templates.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct AppSettings {
    pub app_name: String,
    pub token_lifetime: TokenLifetimeSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct TokenLifetimeSettings {
    /// Human readable, substituted as-is into the verification mail.
    pub verification_token: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct MailSettings {
    pub message_templates: MailMessageTemplates,
}

/// printf-style templates, `%s` placeholders are filled in order.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct MailMessageTemplates {
    pub verify_subject: String,
    pub verify_message_body: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct EmailClientSettings {
    pub base_url: String,
    pub sender_email: String,
    pub authorization_token: Secret<String>,
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<UserEmail, String> {
        UserEmail::parse(self.sender_email.clone())
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_milliseconds)
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let mut settings = config::Config::default();
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to determine the current directory: {}", e)))?;
    let configuration_directory = base_path.join("configuration");

    // Read the shared defaults first
    settings.merge(config::File::from(configuration_directory.join("base")).required(true))?;

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;

    // Layer on the environment-specific values
    settings.merge(
        config::File::from(configuration_directory.join(environment.as_str())).required(true),
    )?;

    // e.g. `APP_APPLICATION__PORT=5001` sets `Settings.application.port`
    settings.merge(config::Environment::with_prefix("app").separator("__"))?;

    // Parse config file into Setting struct
    settings.try_into()
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}
