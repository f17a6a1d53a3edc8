use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use shoplist_core::{Entity, ItemId};

/// Entity: a single shopping-list entry.
///
/// Instances are only minted by a store (which assigns the id and the clock);
/// afterwards the id and `created_at` never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    id: ItemId,
    name: String,
    quantity: i64,
    purchased: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Item {
    /// Build a fresh item from a validated create command.
    pub fn create(id: ItemId, cmd: CreateItem, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: cmd.name.trim().to_string(),
            quantity: cmd.quantity,
            purchased: cmd.purchased.unwrap_or(false),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a validated partial update in place.
    ///
    /// Only fields present in `cmd` change. `updated_at` is refreshed and never
    /// moves backwards, even if the wall clock does.
    pub fn apply(&mut self, cmd: UpdateItem, now: DateTime<Utc>) {
        if let Some(name) = cmd.name {
            self.name = name.trim().to_string();
        }
        if let Some(quantity) = cmd.quantity {
            self.quantity = quantity;
        }
        if let Some(purchased) = cmd.purchased {
            self.purchased = purchased;
        }
        self.updated_at = now.max(self.updated_at);
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn purchased(&self) -> bool {
        self.purchased
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Command: create an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateItem {
    pub name: String,
    pub quantity: i64,
    pub purchased: Option<bool>,
}

/// Command: partially update an item.
///
/// Validation guarantees at least one field is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub purchased: Option<bool>,
}

impl UpdateItem {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.quantity.is_none() && self.purchased.is_none()
    }
}
