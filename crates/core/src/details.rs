//! Type-specific request payloads.
//!
//! On the wire a payload travels next to its discriminator:
//! `{ "type": "housekeeping", "payload": { ... } }`, so a request can never
//! carry a payload of the wrong shape for its type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::error::{Error, Result};
use crate::limits::MAX_NOTES_LEN;
use crate::request::ServiceType;

/// Per-type payload, tagged by service type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum RequestDetails {
    RoomService(RoomServiceOrder),
    Housekeeping(HousekeepingTask),
    Maintenance(MaintenanceTicket),
    Wifi(WifiAccess),
    Feedback(FeedbackEntry),
}

impl RequestDetails {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Self::RoomService(_) => ServiceType::RoomService,
            Self::Housekeeping(_) => ServiceType::Housekeeping,
            Self::Maintenance(_) => ServiceType::Maintenance,
            Self::Wifi(_) => ServiceType::Wifi,
            Self::Feedback(_) => ServiceType::Feedback,
        }
    }

    /// Schema validation for the payload of any type.
    pub fn validate_payload(&self) -> Result<()> {
        match self {
            Self::RoomService(order) => order.check(),
            Self::Housekeeping(task) => task.check(),
            Self::Maintenance(ticket) => ticket.check(),
            Self::Wifi(access) => access.validate().map_err(Error::from),
            Self::Feedback(entry) => entry.validate().map_err(Error::from),
        }
    }

    /// Estimated minutes to fulfil, when the payload carries one.
    pub fn eta_minutes(&self) -> Option<u32> {
        match self {
            Self::RoomService(order) => Some(order.estimated_prep_time),
            Self::Housekeeping(task) => Some(task.estimated_completion_time),
            _ => None,
        }
    }

    pub fn default_title(&self) -> String {
        match self {
            Self::RoomService(order) => {
                let count: u32 = order.items.iter().map(|line| line.quantity).sum();
                if count == 1 {
                    "Room service order (1 item)".to_string()
                } else {
                    format!("Room service order ({} items)", count)
                }
            }
            Self::Housekeeping(task) => {
                let names: Vec<&str> = task.items.iter().map(|i| i.name.as_str()).collect();
                format!("Housekeeping: {}", names.join(", "))
            }
            Self::Maintenance(ticket) => format!("Maintenance: {}", ticket.issue.label()),
            Self::Wifi(_) => "Wi-Fi access".to_string(),
            Self::Feedback(entry) => format!("Feedback ({}/5)", entry.rating),
        }
    }
}

fn not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// One cart line of a room-service order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[validate(length(min = 1, max = 64))]
    pub menu_item_id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 1, max = 99))]
    pub quantity: u32,
    /// Unit price in minor currency units.
    pub unit_price: u64,
}

impl OrderLine {
    /// `None` when price × quantity does not fit in a `u64`.
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}

/// Sum of all line totals, `None` on overflow.
pub fn order_total(lines: &[OrderLine]) -> Option<u64> {
    lines
        .iter()
        .try_fold(0u64, |acc, line| acc.checked_add(line.line_total()?))
}

/// Room-service checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomServiceOrder {
    #[validate(length(min = 1, max = 50))]
    pub items: Vec<OrderLine>,
    pub total_amount: u64,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub guest_name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub special_instructions: Option<String>,
    pub estimated_prep_time: u32,
}

impl RoomServiceOrder {
    fn check(&self) -> Result<()> {
        self.validate()?;

        let mut problems = Vec::new();
        for line in &self.items {
            if let Err(e) = line.validate() {
                problems.extend(messages_of(e.into()));
            }
        }
        match order_total(&self.items) {
            Some(expected) if expected != self.total_amount => problems.push(format!(
                "totalAmount: expected {} but got {}",
                expected, self.total_amount
            )),
            Some(_) => {}
            None => problems.push("totalAmount: overflow".to_string()),
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(problems))
        }
    }
}

/// Housekeeping item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HousekeepingCategory {
    Cleaning,
    Amenities,
    Laundry,
}

/// A selected housekeeping item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HousekeepingSelection {
    #[validate(length(min = 1, max = 64))]
    pub id: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub category: HousekeepingCategory,
    pub estimated_minutes: u32,
}

/// Housekeeping multi-select payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HousekeepingTask {
    #[validate(length(min = 1, max = 30))]
    pub items: Vec<HousekeepingSelection>,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub notes: Option<String>,
    /// Max of the selections' estimates; they run concurrently.
    pub estimated_completion_time: u32,
}

impl HousekeepingTask {
    fn check(&self) -> Result<()> {
        self.validate()?;

        let mut problems = Vec::new();
        let mut seen = BTreeSet::new();
        for item in &self.items {
            if let Err(e) = item.validate() {
                problems.extend(messages_of(e.into()));
            }
            if !seen.insert(item.id.as_str()) {
                problems.push(format!("items: duplicate selection {}", item.id));
            }
        }
        let expected = self
            .items
            .iter()
            .map(|i| i.estimated_minutes)
            .max()
            .unwrap_or(0);
        if expected != self.estimated_completion_time {
            problems.push(format!(
                "estimatedCompletionTime: expected {} but got {}",
                expected, self.estimated_completion_time
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(problems))
        }
    }
}

/// Maintenance urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

/// Either a curated catalog issue or the guest's own description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MaintenanceIssue {
    #[serde(rename_all = "camelCase")]
    Catalog { issue_id: String, name: String },
    Custom { description: String },
}

impl MaintenanceIssue {
    pub fn label(&self) -> &str {
        match self {
            Self::Catalog { name, .. } => name,
            Self::Custom { description } => description,
        }
    }
}

/// Maintenance ticket payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceTicket {
    pub issue: MaintenanceIssue,
    pub urgency: Urgency,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MaintenanceTicket {
    fn check(&self) -> Result<()> {
        let mut problems = Vec::new();
        match &self.issue {
            MaintenanceIssue::Catalog { issue_id, name } => {
                if issue_id.trim().is_empty() || name.trim().is_empty() {
                    problems.push("issue: catalog issue requires id and name".to_string());
                }
            }
            MaintenanceIssue::Custom { description } => {
                if description.trim().is_empty() {
                    problems.push("issue: description must not be blank".to_string());
                } else if description.chars().count() > MAX_NOTES_LEN {
                    problems.push("issue: description too long".to_string());
                }
            }
        }
        if self
            .notes
            .as_ref()
            .is_some_and(|n| n.chars().count() > MAX_NOTES_LEN)
        {
            problems.push("notes: too long".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed(problems))
        }
    }
}

/// Record of a guest opening the Wi-Fi screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WifiAccess {
    #[serde(default)]
    #[validate(length(max = 64))]
    pub device_label: Option<String>,
}

/// Post-completion rating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEntry {
    /// The completed request this rates.
    pub request_id: Uuid,
    #[validate(range(min = 1, max = 5))]
    pub rating: u8,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

fn messages_of(err: Error) -> Vec<String> {
    match err {
        Error::ValidationFailed(messages) => messages,
        other => vec![other.to_string()],
    }
}
