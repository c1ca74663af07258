//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Identifier of a warehouse (hub).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WarehouseId(Uuid);

/// Identifier of a category (root or sub-category).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

/// Identifier of a stock transaction (stock-out or transfer request).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

/// Identifier of a notification.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(Uuid);

macro_rules! impl_uuid_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create a new identifier.
            ///
            /// Uses UUIDv7 (time-ordered). Prefer passing IDs explicitly in tests
            /// for determinism.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $t {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<Uuid> for $t {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$t> for Uuid {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::from_str(s)
                    .map_err(|e| DomainError::validation(format!("{}: {}", $name, e)))?;
                Ok(Self(uuid))
            }
        }
    };
}

impl_uuid_newtype!(WarehouseId, "WarehouseId");
impl_uuid_newtype!(CategoryId, "CategoryId");
impl_uuid_newtype!(TransactionId, "TransactionId");
impl_uuid_newtype!(NotificationId, "NotificationId");

/// Display prefix of item identifiers. Not part of the barcode.
pub const ITEM_ID_PREFIX: &str = "it-";

/// Identifier of an item (SKU).
///
/// Item ids are a registry-allocated sequence rather than UUIDs: the id's
/// numeric part doubles as the barcode suffix, so it must stay short and
/// must never be reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub fn from_sequence(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u64 {
        self.0
    }

    /// Next id in the sequence.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// The id with its non-barcode prefix stripped (`it-000042` -> `000042`).
    pub fn barcode_suffix(&self) -> String {
        let rendered = self.to_string();
        rendered
            .strip_prefix(ITEM_ID_PREFIX)
            .unwrap_or(&rendered)
            .to_string()
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{ITEM_ID_PREFIX}{:06}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(ITEM_ID_PREFIX).unwrap_or(s);
        digits
            .parse::<u64>()
            .map(Self)
            .map_err(|e| DomainError::validation(format!("ItemId: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_id_renders_with_prefix_and_padding() {
        let id = ItemId::from_sequence(42);
        assert_eq!(id.to_string(), "it-000042");
        assert_eq!(id.barcode_suffix(), "000042");
    }

    #[test]
    fn item_id_parses_with_or_without_prefix() {
        assert_eq!("it-000042".parse::<ItemId>().unwrap(), ItemId::from_sequence(42));
        assert_eq!("7".parse::<ItemId>().unwrap(), ItemId::from_sequence(7));
        assert!(matches!(
            "it-abc".parse::<ItemId>(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn large_sequences_are_not_truncated() {
        let id = ItemId::from_sequence(12_345_678);
        assert_eq!(id.barcode_suffix(), "12345678");
        assert_eq!(id.next().sequence(), 12_345_679);
    }

    #[test]
    fn uuid_ids_round_trip_through_strings() {
        let id = WarehouseId::new();
        let parsed: WarehouseId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<CategoryId>().is_err());
    }
}
