//! # Actor Context
//!
//! The identity responsible for a decision. Supplied by the caller's
//! authenticated session and passed explicitly into every audited operation;
//! nothing in the engine reads an ambient security context.

use serde::{Deserialize, Serialize};

/// Who is acting, and in which role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorContext {
    /// Actor identifier as issued by the authentication layer.
    pub id: String,
    /// Role label at the time of the action (e.g. `LEGAL_REVIEWER`).
    pub role: String,
}

impl ActorContext {
    /// Identifier used for decisions the engine takes on its own.
    pub const SYSTEM_ID: &'static str = "system";
    /// Role label used for decisions the engine takes on its own.
    pub const SYSTEM_ROLE: &'static str = "SYSTEM";

    /// Build an actor context.
    pub fn new(id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: role.into(),
        }
    }

    /// The engine itself, e.g. for scheduled expiry sweeps.
    pub fn system() -> Self {
        Self::new(Self::SYSTEM_ID, Self::SYSTEM_ROLE)
    }

    /// Whether this is the built-in system actor.
    pub fn is_system(&self) -> bool {
        self.id == Self::SYSTEM_ID
    }
}

impl std::fmt::Display for ActorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.id, self.role)
    }
}
