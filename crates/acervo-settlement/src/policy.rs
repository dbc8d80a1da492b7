//! Settlement policy.

use serde::{Deserialize, Serialize};

/// Switches governing [`SettlementEngine::settle`](crate::SettlementEngine::settle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPolicy {
    /// Refuse settlement of items with no permitting rights document.
    ///
    /// Turning this off settles unauthorized items, as older deployments did.
    pub require_authorization: bool,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            require_authorization: true,
        }
    }
}

impl SettlementPolicy {
    /// Policy that skips the authorization gate.
    pub fn unguarded() -> Self {
        Self {
            require_authorization: false,
        }
    }
}
