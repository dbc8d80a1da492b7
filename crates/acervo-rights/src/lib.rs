//! # acervo-rights: Rights Authorization Engine
//!
//! Answers "may this item be licensed, for this purpose, in this territory?"
//! from the rights documents on file, and owns the document lifecycle
//! actions that change those answers: registration, reviewer validation and
//! rejection, and the expiry sweep.
//!
//! Every answer is derived from [`acervo_state::RightsDocument::permits_licensing`].
//! Absence of a permitting document is a denial.

pub mod engine;
pub mod policy;

pub use engine::{labels, AuthorizationEngine, DOCUMENT_ENTITY};
pub use policy::ExpiryAuditPolicy;
