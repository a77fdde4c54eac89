//! Housekeeping multi-select.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::details::{HousekeepingCategory, HousekeepingSelection, HousekeepingTask, RequestDetails};
use crate::error::{Error, Result};
use crate::flows::{RequestDraft, ServiceFlow};
use crate::request::ServiceType;

/// A discrete housekeeping service a guest can pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HousekeepingItem {
    pub id: String,
    pub name: String,
    pub category: HousekeepingCategory,
    pub estimated_minutes: u32,
}

impl HousekeepingItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: HousekeepingCategory,
        estimated_minutes: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category,
            estimated_minutes,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HousekeepingFlow {
    catalog: BTreeMap<String, HousekeepingItem>,
    selected: BTreeSet<String>,
    notes: String,
}

impl HousekeepingFlow {
    pub fn new(catalog: impl IntoIterator<Item = HousekeepingItem>) -> Self {
        Self {
            catalog: catalog.into_iter().map(|item| (item.id.clone(), item)).collect(),
            ..Default::default()
        }
    }

    /// Catalog grouped for display.
    pub fn by_category(&self) -> BTreeMap<HousekeepingCategory, Vec<&HousekeepingItem>> {
        let mut groups: BTreeMap<_, Vec<_>> = BTreeMap::new();
        for item in self.catalog.values() {
            groups.entry(item.category).or_default().push(item);
        }
        groups
    }

    /// Flips an item's selection. Returns whether it is now selected.
    pub fn toggle(&mut self, item_id: &str) -> Result<bool> {
        if !self.catalog.contains_key(item_id) {
            return Err(Error::validation(format!("items: unknown item {}", item_id)));
        }
        if self.selected.remove(item_id) {
            Ok(false)
        } else {
            self.selected.insert(item_id.to_string());
            Ok(true)
        }
    }

    pub fn is_selected(&self, item_id: &str) -> bool {
        self.selected.contains(item_id)
    }

    pub fn selection_count(&self) -> usize {
        self.selected.len()
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Items are serviced concurrently, so the estimate is the slowest one.
    pub fn estimated_completion_time(&self) -> u32 {
        self.selected_items()
            .map(|item| item.estimated_minutes)
            .max()
            .unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.selected.clear();
        self.notes.clear();
    }

    fn selected_items(&self) -> impl Iterator<Item = &HousekeepingItem> {
        self.selected.iter().filter_map(|id| self.catalog.get(id))
    }
}

impl ServiceFlow for HousekeepingFlow {
    fn service(&self) -> ServiceType {
        ServiceType::Housekeeping
    }

    fn can_submit(&self) -> bool {
        !self.selected.is_empty()
    }

    fn draft(&self) -> Result<RequestDraft> {
        if self.selected.is_empty() {
            return Err(Error::validation("items: select at least one service"));
        }

        let notes = self.notes.trim();
        let task = HousekeepingTask {
            items: self
                .selected_items()
                .map(|item| HousekeepingSelection {
                    id: item.id.clone(),
                    name: item.name.clone(),
                    category: item.category,
                    estimated_minutes: item.estimated_minutes,
                })
                .collect(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            estimated_completion_time: self.estimated_completion_time(),
        };
        Ok(RequestDraft::new(RequestDetails::Housekeeping(task)))
    }
}
