//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every identifier namespace in the licensing engine.
//! You cannot pass a `BeneficiaryId` where an `ItemId` is expected.
//!
//! Records owned by this engine (documents, transactions, ledger entries)
//! use time-ordered UUIDs (version 7): identifiers minted later in the same
//! process compare greater, which breaks ties between equal timestamps. Records owned by external collaborators (catalog items,
//! photo assets, people, licensees) keep whatever identifier the owning
//! system issued, so they wrap a `String`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Wrap an existing UUID (e.g. when hydrating from the store).
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix(concat!($prefix, ":")).unwrap_or(s);
                Uuid::from_str(s).map(Self)
            }
        }
    };
}

macro_rules! external_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier issued by the owning system.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a rights document.
    DocumentId,
    "document"
);
uuid_id!(
    /// Unique identifier for a settlement transaction.
    TransactionId,
    "transaction"
);
uuid_id!(
    /// Unique identifier for a governance ledger entry.
    EntryId,
    "entry"
);

external_id!(
    /// Identifier of an archive catalog item.
    ItemId
);
external_id!(
    /// Identifier of a specific photographic asset belonging to an item.
    PhotoAssetId
);
external_id!(
    /// Identifier of a person (depicted person, author, reviewer).
    PersonId
);
external_id!(
    /// Identifier of the rights-holder entitled to a settlement's net payout.
    BeneficiaryId
);
external_id!(
    /// Identifier of the buyer/licensee in a settlement.
    LicenseeId
);
