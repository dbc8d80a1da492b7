//! Expiry audit policy.

use serde::{Deserialize, Serialize};

/// Whether the expiry sweep records a governance entry per expired document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryAuditPolicy {
    /// Append one `legal` entry (`DOCUMENT_EXPIRED`) per expired document,
    /// committed together with the status change.
    #[default]
    Record,
    /// Change status only.
    Silent,
}

impl ExpiryAuditPolicy {
    /// Build from a boolean "audit expiry" switch.
    pub fn from_flag(audit: bool) -> Self {
        if audit {
            Self::Record
        } else {
            Self::Silent
        }
    }
}
