use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::{DomainError, DomainResult, Entity, ItemMasterId};

/// Catalog entry describing a fabric type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemMaster {
    pub id: ItemMasterId,
    pub code: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub unit_of_measure: String,
    /// Standard selling price per unit, if one is set.
    pub standard_price: Option<Decimal>,
    pub is_active: bool,
}

impl Entity for ItemMaster {
    type Id = ItemMasterId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItemMaster {
    pub code: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub unit_of_measure: String,
    pub standard_price: Option<Decimal>,
}

impl NewItemMaster {
    pub fn new(code: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            category: category.into(),
            description: None,
            unit_of_measure: "Meters".to_string(),
            standard_price: None,
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.code.trim().is_empty() {
            return Err(DomainError::validation("item code cannot be empty"));
        }
        if self.code.chars().count() > 50 {
            return Err(DomainError::validation("item code cannot exceed 50 characters"));
        }
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("item name cannot be empty"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::validation("item category cannot be empty"));
        }
        if let Some(price) = self.standard_price {
            if price.is_sign_negative() && !price.is_zero() {
                return Err(DomainError::validation("standard price cannot be negative"));
            }
        }
        Ok(())
    }
}
