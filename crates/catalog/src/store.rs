//! Catalog Store: warehouses and categories (reference data).

use nexus_core::{CategoryId, DomainError, DomainResult, WarehouseId};

use crate::{Category, Warehouse};

/// In-memory reference data, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct CatalogStore {
    warehouses: Vec<Warehouse>,
    categories: Vec<Category>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Warehouses ──────────────────────────────────────────────────────────

    pub fn add_warehouse(&mut self, warehouse: Warehouse) -> DomainResult<&Warehouse> {
        if self.warehouse(&warehouse.id).is_some() {
            return Err(DomainError::validation(format!(
                "warehouse {} already exists",
                warehouse.id
            )));
        }
        self.warehouses.push(warehouse);
        Ok(&self.warehouses[self.warehouses.len() - 1])
    }

    pub fn warehouse(&self, id: &WarehouseId) -> Option<&Warehouse> {
        self.warehouses.iter().find(|w| w.id == *id)
    }

    pub fn require_warehouse(&self, id: &WarehouseId) -> DomainResult<&Warehouse> {
        self.warehouse(id)
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))
    }

    /// Remove a warehouse. Items that still reference it are left as they are.
    pub fn remove_warehouse(&mut self, id: &WarehouseId) -> DomainResult<Warehouse> {
        let idx = self
            .warehouses
            .iter()
            .position(|w| w.id == *id)
            .ok_or_else(|| DomainError::not_found(format!("warehouse {id}")))?;
        Ok(self.warehouses.remove(idx))
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }

    // ── Categories ──────────────────────────────────────────────────────────

    /// Add a category.
    ///
    /// A sub-category's parent must already exist and must itself be a root,
    /// which keeps the tree at two levels and rules out cycles.
    pub fn add_category(&mut self, category: Category) -> DomainResult<&Category> {
        if self.category(&category.id).is_some() {
            return Err(DomainError::validation(format!(
                "category {} already exists",
                category.id
            )));
        }
        if let Some(parent_id) = category.parent_id {
            let parent = self.require_category(&parent_id)?;
            if !parent.is_root() {
                return Err(DomainError::validation(format!(
                    "parent category '{}' is itself a sub-category",
                    parent.name
                )));
            }
        }
        self.categories.push(category);
        Ok(&self.categories[self.categories.len() - 1])
    }

    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == *id)
    }

    pub fn require_category(&self, id: &CategoryId) -> DomainResult<&Category> {
        self.category(id)
            .ok_or_else(|| DomainError::not_found(format!("category {id}")))
    }

    /// Remove a category together with its sub-categories.
    ///
    /// Returns the removed categories, the requested one first.
    pub fn remove_category(&mut self, id: &CategoryId) -> DomainResult<Vec<Category>> {
        self.require_category(id)?;

        let (removed, kept): (Vec<Category>, Vec<Category>) = std::mem::take(&mut self.categories)
            .into_iter()
            .partition(|c| c.id == *id || c.parent_id == Some(*id));
        self.categories = kept;

        let mut removed = removed;
        removed.sort_by_key(|c| c.id != *id);
        Ok(removed)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn root_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_root())
    }

    pub fn subcategories(&self, parent: &CategoryId) -> impl Iterator<Item = &Category> {
        let parent = *parent;
        self.categories
            .iter()
            .filter(move |c| c.parent_id == Some(parent))
    }

    /// Display label: `"Parent / Child"` for sub-categories, the name for roots.
    pub fn category_path(&self, id: &CategoryId) -> Option<String> {
        let category = self.category(id)?;
        match category.parent_id.and_then(|p| self.category(&p)) {
            Some(parent) => Some(format!("{} / {}", parent.name, category.name)),
            None => Some(category.name.clone()),
        }
    }
}
