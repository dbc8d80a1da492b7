//! # Domain Vocabularies
//!
//! Closed enumerations shared across the engine: what kind of rights
//! document was signed, which purposes and territories it permits, what
//! license a buyer acquires, and which category a governance decision
//! belongs to.
//!
//! Every enum has a stable `snake_case` string form used by serde, the
//! PostgreSQL columns and the ledger export. `as_str()` and `FromStr` are
//! exact inverses.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AcervoError;

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// All variants in declaration order.
            pub fn all() -> &'static [$name] {
                &[ $( Self::$variant, )+ ]
            }

            /// The stable snake_case identifier.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $text, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AcervoError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(AcervoError::Validation(format!(
                        concat!("unknown ", $label, ": {:?}"),
                        other
                    ))),
                }
            }
        }
    };
}

vocabulary! {
    /// The legal instrument a rights document represents.
    DocumentKind, "document kind" {
        /// Assignment of copyright over the work.
        AssignmentOfCopyright => "assignment_of_copyright",
        /// Assignment of the image rights of a depicted person.
        AssignmentOfImageRights => "assignment_of_image_rights",
        /// A narrower authorization to use an image.
        ImageUseAuthorization => "image_use_authorization",
        /// A declaration that the work is in the public domain.
        PublicDomain => "public_domain",
        /// Any other instrument; described in free text.
        Other => "other",
    }
}

vocabulary! {
    /// A use a rights document may permit.
    Purpose, "purpose" {
        /// Academic or scholarly research.
        Research => "research",
        /// Use by the holding institution itself.
        Institutional => "institutional",
        /// Journalism and editorial publication.
        Editorial => "editorial",
        /// Commercial exploitation.
        Commercial => "commercial",
        /// Advertising campaigns.
        Advertising => "advertising",
    }
}

vocabulary! {
    /// Where a rights document permits use.
    Territory, "territory" {
        /// The archive's home country.
        Domestic => "domestic",
        /// Worldwide.
        International => "international",
        /// A specific territory named in the usage restrictions.
        Specific => "specific",
    }
}

vocabulary! {
    /// The license a buyer acquires in a settlement.
    LicenseType, "license type" {
        /// Editorial publication.
        Editorial => "editorial",
        /// Commercial exploitation.
        Commercial => "commercial",
        /// Academic use.
        Academic => "academic",
        /// Advertising.
        Advertising => "advertising",
        /// Institutional use.
        Institutional => "institutional",
    }
}

vocabulary! {
    /// The category of a governance ledger decision.
    DecisionCategory, "decision category" {
        /// Legal decisions (document review, expiry).
        Legal => "legal",
        /// Licensing decisions.
        Licensing => "licensing",
        /// Financial decisions (settlement, reversal).
        Financial => "financial",
        /// Administrative decisions (fiscal configuration).
        Administrative => "administrative",
        /// Decisions taken by the system itself.
        System => "system",
    }
}

impl LicenseType {
    /// The purpose a license of this type exercises.
    pub fn purpose(&self) -> Purpose {
        match self {
            Self::Editorial => Purpose::Editorial,
            Self::Commercial => Purpose::Commercial,
            Self::Academic => Purpose::Research,
            Self::Advertising => Purpose::Advertising,
            Self::Institutional => Purpose::Institutional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_str_and_from_str_are_inverses() {
        for kind in DocumentKind::all() {
            assert_eq!(DocumentKind::from_str(kind.as_str()).unwrap(), *kind);
        }
        for purpose in Purpose::all() {
            assert_eq!(Purpose::from_str(purpose.as_str()).unwrap(), *purpose);
        }
        for territory in Territory::all() {
            assert_eq!(Territory::from_str(territory.as_str()).unwrap(), *territory);
        }
        for category in DecisionCategory::all() {
            assert_eq!(DecisionCategory::from_str(category.as_str()).unwrap(), *category);
        }
        for license in LicenseType::all() {
            assert_eq!(LicenseType::from_str(license.as_str()).unwrap(), *license);
        }
    }

    #[test]
    fn serde_matches_as_str() {
        let json = serde_json::to_string(&DocumentKind::AssignmentOfImageRights).unwrap();
        assert_eq!(json, "\"assignment_of_image_rights\"");
        let json = serde_json::to_string(&DecisionCategory::Financial).unwrap();
        assert_eq!(json, "\"financial\"");
    }

    #[test]
    fn unknown_value_is_a_validation_error() {
        let err = Purpose::from_str("propaganda").unwrap_err();
        assert!(matches!(err, AcervoError::Validation(_)));
        assert!(err.to_string().contains("unknown purpose"));
    }

    #[test]
    fn license_types_map_to_purposes() {
        assert_eq!(LicenseType::Commercial.purpose(), Purpose::Commercial);
        assert_eq!(LicenseType::Academic.purpose(), Purpose::Research);
    }
}
