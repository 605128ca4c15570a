use std::collections::HashMap;

use crate::feed::{Catalog, CatalogError, FeatureTypeInfo, TypeName};

/// Catalog backed by a fixed map of qualified type names (`prefix:name`)
/// to their metadata, typically the `[catalog]` table of the config file.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    types: HashMap<String, FeatureTypeInfo>,
}

impl StaticCatalog {
    pub fn new(types: HashMap<String, FeatureTypeInfo>) -> Self {
        Self { types }
    }
}

impl Catalog for StaticCatalog {
    fn feature_type(&self, name: &TypeName) -> Result<FeatureTypeInfo, CatalogError> {
        let qualified = name.to_string();
        self.types
            .get(&qualified)
            .or_else(|| self.types.get(&name.local))
            .cloned()
            .ok_or(CatalogError::NotFound(qualified))
    }
}
