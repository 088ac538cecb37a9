//! Strongly-typed identifiers for domain entities
//!
//! Using newtype wrappers around UUIDs provides type safety and prevents
//! accidental mixing of different identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates from an existing UUID
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns true for the nil UUID, which no persisted entity carries
            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                // Strip prefix if present
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Clinical directory identifiers
define_id!(PatientId, "PAT");
define_id!(DoctorId, "DOC");

// Billing identifiers
define_id!(BillId, "BIL");
define_id!(BillItemId, "ITM");
define_id!(PaymentId, "PAY");
define_id!(ShiftId, "SHF");
define_id!(SettlementId, "SET");

// Ward and theater identifiers
define_id!(AdmissionId, "ADM");
define_id!(BedId, "BED");
define_id!(OperationId, "OPR");
define_id!(TheaterId, "THR");
define_id!(PackageId, "PKG");

/// A system-user identity (cashier, teller, administrator).
///
/// User identities come from the external identity provider and are opaque
/// strings rather than UUIDs, so they get their own newtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identity is blank (whitespace counts as blank)
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bill_id_display() {
        let id = BillId::new();
        let display = id.to_string();
        assert!(display.starts_with("BIL-"));
    }

    #[test]
    fn test_id_parsing() {
        let original = BillId::new();
        let parsed: BillId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_uuid_conversion() {
        let uuid = Uuid::new_v4();
        let patient_id = PatientId::from(uuid);
        let back: Uuid = patient_id.into();
        assert_eq!(uuid, back);
    }

    #[test]
    fn test_nil_detection() {
        let nil = PatientId::from_uuid(Uuid::nil());
        assert!(nil.is_nil());
        assert!(!PatientId::new().is_nil());
    }

    #[test]
    fn test_user_id_blank() {
        assert!(UserId::new("").is_empty());
        assert!(UserId::new("   ").is_empty());
        assert!(!UserId::new("cashier-01").is_empty());
    }
}
