//! # Runtime Configuration
//!
//! Read once from the environment at startup. A variable that is set but
//! malformed is an error; only absent variables take their defaults.
//!
//! | Variable                       | Default  |
//! |--------------------------------|----------|
//! | `DATABASE_URL`                 | required |
//! | `ACERVO_REQUIRE_AUTHORIZATION` | `true`   |
//! | `ACERVO_AUDIT_EXPIRY`          | `true`   |
//! | `ACERVO_LOG_FORMAT`            | `pretty` |
//! | `ACERVO_DB_MAX_CONNECTIONS`    | `10`     |
//! | `ACERVO_ACTOR_ID`              | `system` |
//! | `ACERVO_ACTOR_ROLE`            | `SYSTEM` |

use std::str::FromStr;

use thiserror::Error;

use acervo_core::ActorContext;
use acervo_rights::ExpiryAuditPolicy;
use acervo_settlement::SettlementPolicy;

/// A configuration variable could not be used.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is absent.
    #[error("{0} is not set")]
    Missing(&'static str),
    /// A variable is set to a value that cannot be parsed.
    #[error("{name} has invalid value {value:?}: expected {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

/// Everything the binary reads from its environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcervoConfig {
    /// `DATABASE_URL`. Only commands that touch the store require it.
    pub database_url: Option<String>,
    /// `ACERVO_REQUIRE_AUTHORIZATION`: gate settlements on rights documents.
    pub require_authorization: bool,
    /// `ACERVO_AUDIT_EXPIRY`: record a ledger entry for each expiry.
    pub audit_expiry: bool,
    /// `ACERVO_LOG_FORMAT`.
    pub log_format: LogFormat,
    /// `ACERVO_DB_MAX_CONNECTIONS`: pool size, at least 1.
    pub db_max_connections: u32,
    /// `ACERVO_ACTOR_ID`: who operator commands are attributed to.
    pub actor_id: String,
    /// `ACERVO_ACTOR_ROLE`: role stamped next to `actor_id`.
    pub actor_role: String,
}

impl AcervoConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read through `lookup`, which returns a variable's value if set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let text = |name: &'static str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        let require_authorization = parse_flag(&lookup, "ACERVO_REQUIRE_AUTHORIZATION", true)?;
        let audit_expiry = parse_flag(&lookup, "ACERVO_AUDIT_EXPIRY", true)?;

        let log_format = match lookup("ACERVO_LOG_FORMAT") {
            None => LogFormat::default(),
            Some(value) => value.parse().map_err(|()| ConfigError::Invalid {
                name: "ACERVO_LOG_FORMAT",
                value,
                expected: "json or pretty",
            })?,
        };

        let db_max_connections = match lookup("ACERVO_DB_MAX_CONNECTIONS") {
            None => 10,
            Some(value) => match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "ACERVO_DB_MAX_CONNECTIONS",
                        value,
                        expected: "a positive integer",
                    })
                }
            },
        };

        Ok(Self {
            database_url,
            require_authorization,
            audit_expiry,
            log_format,
            db_max_connections,
            actor_id: text("ACERVO_ACTOR_ID", "system"),
            actor_role: text("ACERVO_ACTOR_ROLE", "SYSTEM"),
        })
    }

    /// The database URL, or an error naming the missing variable.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    /// Operator identity stamped on governance entries.
    pub fn actor(&self) -> ActorContext {
        ActorContext::new(self.actor_id.clone(), self.actor_role.clone())
    }

    /// Settlement gate derived from `require_authorization`.
    pub fn settlement_policy(&self) -> SettlementPolicy {
        SettlementPolicy {
            require_authorization: self.require_authorization,
        }
    }

    /// Expiry auditing derived from `audit_expiry`.
    pub fn expiry_policy(&self) -> ExpiryAuditPolicy {
        ExpiryAuditPolicy::from_flag(self.audit_expiry)
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value,
            expected: "true or false",
        }),
    }
}
