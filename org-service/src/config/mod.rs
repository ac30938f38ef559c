use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct OrgServiceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub realm: RealmScopeConfig,
    pub policy: PolicyConfig,
    pub identity_store: IdentityStoreConfig,
    pub jwt: JwtConfig,
    pub smtp: SmtpConfig,
    pub invitation: InvitationConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

/// Which realms this extension is in scope for.
#[derive(Debug, Clone, Deserialize)]
pub struct RealmScopeConfig {
    /// Regex fragment matched case-insensitively against the realm name.
    pub scope_pattern: String,
}

/// Per-endpoint authorization policy switches.
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// The legacy hello join endpoint historically performed no role check.
    /// Turning this on applies the same ADMIN/MANAGER gate as the rest.
    pub hello_join_requires_role: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityStoreConfig {
    pub base_url: String,
    pub service_token: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub public_key_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvitationConfig {
    /// Base URL the registration link points at.
    pub registration_base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub invite_attempts: u32,
    pub invite_window_seconds: u64,
}

impl OrgServiceConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = OrgServiceConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("org-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            realm: RealmScopeConfig {
                scope_pattern: get_env("REALM_SCOPE_PATTERN", Some("track|swiftly"), is_prod)?,
            },
            policy: PolicyConfig {
                hello_join_requires_role: get_env(
                    "ORG_POLICY_HELLO_JOIN_REQUIRES_ROLE",
                    Some("false"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(false),
            },
            identity_store: IdentityStoreConfig {
                base_url: get_env("IDENTITY_STORE_URL", None, is_prod)?,
                service_token: get_env("IDENTITY_STORE_TOKEN", None, is_prod)?,
                timeout_seconds: get_env("IDENTITY_STORE_TIMEOUT_SECONDS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
            },
            jwt: JwtConfig {
                public_key_path: get_env("JWT_PUBLIC_KEY_PATH", None, is_prod)?,
            },
            smtp: SmtpConfig {
                host: get_env("SMTP_HOST", None, is_prod)?,
                port: get_env("SMTP_PORT", Some("587"), is_prod)?
                    .parse()
                    .unwrap_or(587),
                user: get_env("SMTP_USER", None, is_prod)?,
                password: get_env("SMTP_PASSWORD", None, is_prod)?,
                from_email: get_env("SMTP_FROM_EMAIL", None, is_prod)?,
            },
            invitation: InvitationConfig {
                registration_base_url: get_env(
                    "REGISTRATION_BASE_URL",
                    Some("http://localhost:3000"),
                    is_prod,
                )?,
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("http://localhost:3000"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            rate_limit: RateLimitConfig {
                invite_attempts: get_env("RATE_LIMIT_INVITE_ATTEMPTS", Some("10"), is_prod)?
                    .parse()
                    .unwrap_or(10),
                invite_window_seconds: get_env(
                    "RATE_LIMIT_INVITE_WINDOW_SECONDS",
                    Some("60"),
                    is_prod,
                )?
                .parse()
                .unwrap_or(60),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.realm.scope_pattern.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "REALM_SCOPE_PATTERN must not be empty"
            )));
        }

        if self.environment == Environment::Prod
            && self.security.allowed_origins.iter().any(|o| o == "*")
        {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin not allowed in production"
            )));
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
