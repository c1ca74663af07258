//! Declarative catalog seed (loaded from JSON by the host).

use serde::{Deserialize, Serialize};

use nexus_core::{DomainError, DomainResult};

use crate::{CatalogStore, Category, Warehouse};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub warehouses: Vec<WarehouseSeed>,
    #[serde(default)]
    pub categories: Vec<CategorySeed>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseSeed {
    pub name: String,
    pub prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySeed {
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub children: Vec<CategorySeed>,
}

impl CatalogSeed {
    /// Small built-in catalog for demos and local runs.
    pub fn demo() -> Self {
        let leaf = |name: &str, code: &str| CategorySeed {
            name: name.to_string(),
            code: code.to_string(),
            children: Vec::new(),
        };
        Self {
            warehouses: vec![
                WarehouseSeed {
                    name: "Manila Central Hub".to_string(),
                    prefix: "MNL".to_string(),
                },
                WarehouseSeed {
                    name: "Cebu Distribution Hub".to_string(),
                    prefix: "CEB".to_string(),
                },
            ],
            categories: vec![
                CategorySeed {
                    name: "Construction".to_string(),
                    code: "CON".to_string(),
                    children: vec![leaf("Hardware", "HW"), leaf("Lumber", "LUM")],
                },
                CategorySeed {
                    name: "Electrical".to_string(),
                    code: "ELE".to_string(),
                    children: vec![leaf("Wiring", "WIR")],
                },
            ],
        }
    }

    /// Build a catalog from the seed. Nesting deeper than root/child is rejected.
    pub fn into_store(self) -> DomainResult<CatalogStore> {
        let mut store = CatalogStore::new();
        for w in self.warehouses {
            store.add_warehouse(Warehouse::new(w.name, w.prefix)?)?;
        }
        for root in self.categories {
            let root_id = store.add_category(Category::root(root.name, root.code)?)?.id;
            for child in root.children {
                if !child.children.is_empty() {
                    return Err(DomainError::validation(format!(
                        "category '{}' nests deeper than two levels",
                        child.name
                    )));
                }
                store.add_category(Category::child(root_id, child.name, child.code)?)?;
            }
        }
        Ok(store)
    }
}
