use dotenvy::dotenv;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

pub const ENVIRONMENT: &str = "ENVIRONMENT";
pub const LOG_LEVEL: &str = "LOG_LEVEL";

/// Environment variables required in every deployment mode. Each must be
/// present and non-empty.
const COMMON_REQUIRED_FIELDS: [&str; 6] = [
    "ADMIN_DASHBOARD_URL",
    "API_URL",
    "DATABASE_URL",
    "JWT_SECRET",
    "REDIS_URL",
    "SESSION_SECRET",
];

/// Third-party integration credentials. Required in production, optional in
/// development so a local checkout runs without any external accounts.
const INTEGRATION_FIELDS: [&str; 13] = [
    "AIRTABLE_API_KEY",
    "AIRTABLE_FAMILY_BASE_ID",
    "AIRTABLE_MEMBERS_TABLE_ID",
    "AIRTABLE_RESUME_BOOKS_BASE_ID",
    "GITHUB_TOKEN",
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_DRIVE_RESUME_BOOKS_FOLDER_ID",
    "MEMBER_PROFILE_URL",
    "POSTMARK_API_TOKEN",
    "SENTRY_DSN",
    "SLACK_CLIENT_ID",
    "SLACK_CLIENT_SECRET",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, PartialEq, Eq)]
pub struct EnvironmentParseError;

impl FromStr for Environment {
    type Err = EnvironmentParseError;
    fn from_str(mode: &str) -> Result<Environment, Self::Err> {
        match mode.to_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            _ => Err(EnvironmentParseError),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Environment validation failure carrying every violation found, keyed by
/// variable name. Violations are reported as a whole so an operator fixing a
/// deployment sees all missing variables in one pass instead of one at a time.
#[derive(Debug)]
pub struct Error {
    pub violations: BTreeMap<String, String>,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let summary = self
            .violations
            .iter()
            .map(|(field, reason)| format!("{field}: {reason}"))
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "invalid environment configuration: {summary}")
    }
}

impl StdError for Error {}

/// Validated process configuration, discriminated by deployment mode.
///
/// Constructed exactly once at boot via [`Config::from_env`] and immutable
/// afterwards. Integration accessors return `Option<String>`; when the mode
/// is [`Environment::Production`] they are guaranteed `Some` and non-empty.
#[derive(Clone, Debug)]
pub struct Config {
    environment: Environment,

    admin_dashboard_url: String,
    api_url: String,
    database_url: String,
    jwt_secret: String,
    redis_url: String,
    session_secret: String,

    airtable_api_key: Option<String>,
    airtable_family_base_id: Option<String>,
    airtable_members_table_id: Option<String>,
    airtable_resume_books_base_id: Option<String>,
    github_token: Option<String>,
    google_client_id: Option<String>,
    google_client_secret: Option<String>,
    google_drive_resume_books_folder_id: Option<String>,
    member_profile_url: Option<String>,
    postmark_api_token: Option<String>,
    sentry_dsn: Option<String>,
    slack_client_id: Option<String>,
    slack_client_secret: Option<String>,

    log_level_filter: LevelFilter,
}

impl Config {
    /// Loads and validates the process environment.
    ///
    /// This is the single initialization point for configuration; a failure
    /// here must abort startup before any traffic is served.
    pub fn from_env() -> Result<Self, Error> {
        // Load .env file first
        dotenv().ok();
        Self::validate(std::env::vars())
    }

    /// Validates an explicit environment mapping.
    ///
    /// Values are trimmed, and an empty-after-trim value is treated as
    /// absent before any rule runs. Every violation is collected before
    /// failing; no partial `Config` is ever returned.
    pub fn validate<I>(raw: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut values: BTreeMap<String, String> = raw
            .into_iter()
            .filter_map(|(name, value)| {
                let value = value.trim().to_string();
                if value.is_empty() {
                    None
                } else {
                    Some((name, value))
                }
            })
            .collect();

        let mut violations: BTreeMap<String, String> = BTreeMap::new();

        let environment = match values.remove(ENVIRONMENT) {
            Some(mode) => match mode.parse::<Environment>() {
                Ok(environment) => Some(environment),
                Err(EnvironmentParseError) => {
                    violations.insert(
                        ENVIRONMENT.to_string(),
                        "must be \"development\" or \"production\"".to_string(),
                    );
                    None
                }
            },
            None => {
                violations.insert(ENVIRONMENT.to_string(), "required".to_string());
                None
            }
        };

        // Common fields are mode-independent, so they are checked even when
        // the discriminator itself is invalid.
        for name in COMMON_REQUIRED_FIELDS {
            if !values.contains_key(name) {
                violations.insert(name.to_string(), "required".to_string());
            }
        }

        if environment == Some(Environment::Production) {
            for name in INTEGRATION_FIELDS {
                if !values.contains_key(name) {
                    violations.insert(name.to_string(), "required".to_string());
                }
            }
        }

        let log_level_filter = match values.remove(LOG_LEVEL) {
            Some(level) => match LevelFilter::from_str(&level) {
                Ok(filter) => filter,
                Err(_) => {
                    violations.insert(
                        LOG_LEVEL.to_string(),
                        "must be one of OFF, ERROR, WARN, INFO, DEBUG, TRACE".to_string(),
                    );
                    LevelFilter::Info
                }
            },
            None => LevelFilter::Info,
        };

        if let Some(environment) = environment {
            if violations.is_empty() {
                return Ok(Config {
                    environment,
                    admin_dashboard_url: values.remove("ADMIN_DASHBOARD_URL").unwrap_or_default(),
                    api_url: values.remove("API_URL").unwrap_or_default(),
                    database_url: values.remove("DATABASE_URL").unwrap_or_default(),
                    jwt_secret: values.remove("JWT_SECRET").unwrap_or_default(),
                    redis_url: values.remove("REDIS_URL").unwrap_or_default(),
                    session_secret: values.remove("SESSION_SECRET").unwrap_or_default(),
                    airtable_api_key: values.remove("AIRTABLE_API_KEY"),
                    airtable_family_base_id: values.remove("AIRTABLE_FAMILY_BASE_ID"),
                    airtable_members_table_id: values.remove("AIRTABLE_MEMBERS_TABLE_ID"),
                    airtable_resume_books_base_id: values.remove("AIRTABLE_RESUME_BOOKS_BASE_ID"),
                    github_token: values.remove("GITHUB_TOKEN"),
                    google_client_id: values.remove("GOOGLE_CLIENT_ID"),
                    google_client_secret: values.remove("GOOGLE_CLIENT_SECRET"),
                    google_drive_resume_books_folder_id: values
                        .remove("GOOGLE_DRIVE_RESUME_BOOKS_FOLDER_ID"),
                    member_profile_url: values.remove("MEMBER_PROFILE_URL"),
                    postmark_api_token: values.remove("POSTMARK_API_TOKEN"),
                    sentry_dsn: values.remove("SENTRY_DSN"),
                    slack_client_id: values.remove("SLACK_CLIENT_ID"),
                    slack_client_secret: values.remove("SLACK_CLIENT_SECRET"),
                    log_level_filter,
                });
            }
        }

        Err(Error { violations })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn admin_dashboard_url(&self) -> &str {
        &self.admin_dashboard_url
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }

    pub fn session_secret(&self) -> &str {
        &self.session_secret
    }

    pub fn airtable_api_key(&self) -> Option<String> {
        self.airtable_api_key.clone()
    }

    pub fn airtable_family_base_id(&self) -> Option<String> {
        self.airtable_family_base_id.clone()
    }

    pub fn airtable_members_table_id(&self) -> Option<String> {
        self.airtable_members_table_id.clone()
    }

    pub fn airtable_resume_books_base_id(&self) -> Option<String> {
        self.airtable_resume_books_base_id.clone()
    }

    pub fn github_token(&self) -> Option<String> {
        self.github_token.clone()
    }

    pub fn google_client_id(&self) -> Option<String> {
        self.google_client_id.clone()
    }

    pub fn google_client_secret(&self) -> Option<String> {
        self.google_client_secret.clone()
    }

    pub fn google_drive_resume_books_folder_id(&self) -> Option<String> {
        self.google_drive_resume_books_folder_id.clone()
    }

    pub fn member_profile_url(&self) -> Option<String> {
        self.member_profile_url.clone()
    }

    pub fn postmark_api_token(&self) -> Option<String> {
        self.postmark_api_token.clone()
    }

    pub fn sentry_dsn(&self) -> Option<String> {
        self.sentry_dsn.clone()
    }

    pub fn slack_client_id(&self) -> Option<String> {
        self.slack_client_id.clone()
    }

    pub fn slack_client_secret(&self) -> Option<String> {
        self.slack_client_secret.clone()
    }

    pub fn log_level_filter(&self) -> LevelFilter {
        self.log_level_filter
    }

    /// The values the rendering layer embeds into the client-visible
    /// `window.env` payload. Never include secrets here.
    pub fn client_payload(&self) -> serde_json::Value {
        json!({
            "ENVIRONMENT": self.environment,
            "SENTRY_DSN": self.sentry_dsn,
        })
    }
}
