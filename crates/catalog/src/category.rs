use serde::{Deserialize, Serialize};

use nexus_core::{CategoryId, DomainError, DomainResult, Entity};

/// Category node in a two-level tree (roots and their sub-categories).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Short uppercase barcode segment.
    pub code: String,
    pub parent_id: Option<CategoryId>,
}

impl Category {
    pub fn root(name: impl Into<String>, code: impl Into<String>) -> DomainResult<Self> {
        Self::with_id(CategoryId::new(), name, code, None)
    }

    pub fn child(
        parent_id: CategoryId,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> DomainResult<Self> {
        Self::with_id(CategoryId::new(), name, code, Some(parent_id))
    }

    pub fn with_id(
        id: CategoryId,
        name: impl Into<String>,
        code: impl Into<String>,
        parent_id: Option<CategoryId>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        let code = code.into().trim().to_uppercase();
        if name.is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        if code.is_empty() {
            return Err(DomainError::validation("category code cannot be empty"));
        }
        if parent_id == Some(id) {
            return Err(DomainError::validation("category cannot be its own parent"));
        }
        Ok(Self {
            id,
            name,
            code,
            parent_id,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
