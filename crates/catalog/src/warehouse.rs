use serde::{Deserialize, Serialize};

use nexus_core::{DomainError, DomainResult, Entity, WarehouseId};

/// A physical hub that holds stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub name: String,
    /// Short uppercase code that leads every barcode minted for this hub.
    pub prefix: String,
}

impl Warehouse {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> DomainResult<Self> {
        Self::with_id(WarehouseId::new(), name, prefix)
    }

    pub fn with_id(
        id: WarehouseId,
        name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        let prefix = prefix.into().trim().to_uppercase();
        if name.is_empty() {
            return Err(DomainError::validation("warehouse name cannot be empty"));
        }
        if prefix.is_empty() {
            return Err(DomainError::validation("warehouse prefix cannot be empty"));
        }
        Ok(Self { id, name, prefix })
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
