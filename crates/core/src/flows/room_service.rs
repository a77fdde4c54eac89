//! Room-service cart and checkout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::details::{order_total, OrderLine, RequestDetails, RoomServiceOrder};
use crate::error::{Error, Result};
use crate::flows::{RequestDraft, ServiceFlow};
use crate::limits::{DELIVERY_BUFFER_MINUTES, MAX_LINE_QUANTITY, MAX_ORDER_LINES};
use crate::request::ServiceType;

/// A dish as listed on the in-room menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Price in minor currency units.
    pub price: u64,
    pub prep_time_minutes: u32,
    #[serde(default = "default_true")]
    pub available: bool,
}

fn default_true() -> bool {
    true
}

impl MenuItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: u64, prep: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            prep_time_minutes: prep,
            available: true,
        }
    }
}

/// Cart over a menu snapshot.
#[derive(Debug, Clone, Default)]
pub struct RoomServiceFlow {
    menu: BTreeMap<String, MenuItem>,
    cart: BTreeMap<String, u32>,
    guest_name: String,
    special_instructions: String,
}

impl RoomServiceFlow {
    pub fn new(menu: impl IntoIterator<Item = MenuItem>) -> Self {
        Self {
            menu: menu.into_iter().map(|item| (item.id.clone(), item)).collect(),
            ..Default::default()
        }
    }

    /// Adds one unit. Returns the new quantity.
    pub fn add_item(&mut self, menu_item_id: &str) -> Result<u32> {
        let current = self.quantity(menu_item_id);
        self.set_quantity(menu_item_id, current + 1)?;
        Ok(current + 1)
    }

    /// Removes one unit. Returns the new quantity.
    pub fn remove_item(&mut self, menu_item_id: &str) -> u32 {
        match self.cart.get_mut(menu_item_id) {
            Some(qty) if *qty > 1 => {
                *qty -= 1;
                *qty
            }
            Some(_) => {
                self.cart.remove(menu_item_id);
                0
            }
            None => 0,
        }
    }

    /// Sets a line's quantity; zero removes the line.
    pub fn set_quantity(&mut self, menu_item_id: &str, quantity: u32) -> Result<()> {
        if quantity == 0 {
            self.cart.remove(menu_item_id);
            return Ok(());
        }

        let item = self
            .menu
            .get(menu_item_id)
            .ok_or_else(|| Error::validation(format!("items: unknown menu item {}", menu_item_id)))?;
        if !item.available {
            return Err(Error::validation(format!(
                "items: {} is currently unavailable",
                item.name
            )));
        }
        if quantity > MAX_LINE_QUANTITY {
            return Err(Error::validation("items: quantity too large"));
        }
        if !self.cart.contains_key(menu_item_id) && self.cart.len() >= MAX_ORDER_LINES {
            return Err(Error::validation("items: cart is full"));
        }

        self.cart.insert(menu_item_id.to_string(), quantity);
        Ok(())
    }

    pub fn quantity(&self, menu_item_id: &str) -> u32 {
        self.cart.get(menu_item_id).copied().unwrap_or(0)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn set_guest_name(&mut self, name: impl Into<String>) {
        self.guest_name = name.into();
    }

    pub fn set_special_instructions(&mut self, text: impl Into<String>) {
        self.special_instructions = text.into();
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn item_count(&self) -> u32 {
        self.cart.values().sum()
    }

    /// Cart lines in menu-id order.
    pub fn lines(&self) -> Vec<OrderLine> {
        self.cart
            .iter()
            .filter_map(|(id, &quantity)| {
                self.menu.get(id).map(|item| OrderLine {
                    menu_item_id: id.clone(),
                    name: item.name.clone(),
                    quantity,
                    unit_price: item.price,
                })
            })
            .collect()
    }

    /// Sum of price × quantity, in minor units. Saturates, so an
    /// impossible cart fails validation at submit instead of wrapping.
    pub fn total_amount(&self) -> u64 {
        order_total(&self.lines()).unwrap_or(u64::MAX)
    }

    /// Slowest dish plus the delivery buffer. `None` for an empty cart.
    pub fn estimated_prep_time(&self) -> Option<u32> {
        self.cart
            .keys()
            .filter_map(|id| self.menu.get(id))
            .map(|item| item.prep_time_minutes)
            .max()
            .map(|slowest| slowest + DELIVERY_BUFFER_MINUTES)
    }

    /// Clears the form after a successful checkout.
    pub fn reset(&mut self) {
        self.cart.clear();
        self.special_instructions.clear();
    }
}

impl ServiceFlow for RoomServiceFlow {
    fn service(&self) -> ServiceType {
        ServiceType::RoomService
    }

    fn can_submit(&self) -> bool {
        !self.cart.is_empty() && !self.guest_name.trim().is_empty()
    }

    fn draft(&self) -> Result<RequestDraft> {
        let mut missing = Vec::new();
        if self.cart.is_empty() {
            missing.push("items: cart is empty".to_string());
        }
        if self.guest_name.trim().is_empty() {
            missing.push("guestName: required".to_string());
        }
        if !missing.is_empty() {
            return Err(Error::ValidationFailed(missing));
        }

        let instructions = self.special_instructions.trim();
        let order = RoomServiceOrder {
            items: self.lines(),
            total_amount: self.total_amount(),
            guest_name: self.guest_name.trim().to_string(),
            special_instructions: (!instructions.is_empty()).then(|| instructions.to_string()),
            estimated_prep_time: self.estimated_prep_time().unwrap_or(DELIVERY_BUFFER_MINUTES),
        };
        Ok(RequestDraft::new(RequestDetails::RoomService(order)))
    }
}
