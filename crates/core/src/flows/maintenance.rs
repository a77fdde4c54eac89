//! Maintenance issue picker.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::details::{MaintenanceIssue, MaintenanceTicket, RequestDetails, Urgency};
use crate::error::{Error, Result};
use crate::flows::{RequestDraft, ServiceFlow};
use crate::request::ServiceType;

/// A curated issue with its predefined urgency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTemplate {
    pub id: String,
    pub name: String,
    pub urgency: Urgency,
}

impl IssueTemplate {
    pub fn new(id: impl Into<String>, name: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            urgency,
        }
    }
}

/// Catalog issue and custom text are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub struct MaintenanceFlow {
    catalog: BTreeMap<String, IssueTemplate>,
    selected: Option<String>,
    custom: String,
    urgency_override: Option<Urgency>,
    notes: String,
}

impl MaintenanceFlow {
    pub fn new(catalog: impl IntoIterator<Item = IssueTemplate>) -> Self {
        Self {
            catalog: catalog.into_iter().map(|t| (t.id.clone(), t)).collect(),
            ..Default::default()
        }
    }

    pub fn catalog(&self) -> impl Iterator<Item = &IssueTemplate> {
        self.catalog.values()
    }

    /// Picks a catalog issue; clears custom text and any urgency override.
    pub fn select_issue(&mut self, issue_id: &str) -> Result<()> {
        if !self.catalog.contains_key(issue_id) {
            return Err(Error::validation(format!("issue: unknown issue {}", issue_id)));
        }
        self.selected = Some(issue_id.to_string());
        self.custom.clear();
        self.urgency_override = None;
        Ok(())
    }

    /// Describes the problem in free text; clears the catalog selection.
    pub fn set_custom_issue(&mut self, text: impl Into<String>) {
        self.custom = text.into();
        if !self.custom.trim().is_empty() && self.selected.take().is_some() {
            self.urgency_override = None;
        }
    }

    pub fn set_urgency(&mut self, urgency: Urgency) {
        self.urgency_override = Some(urgency);
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn selected_issue(&self) -> Option<&IssueTemplate> {
        self.selected.as_ref().and_then(|id| self.catalog.get(id))
    }

    pub fn custom_issue(&self) -> &str {
        &self.custom
    }

    /// Override if set, otherwise the catalog default (medium for custom).
    pub fn urgency(&self) -> Urgency {
        self.urgency_override
            .or_else(|| self.selected_issue().map(|t| t.urgency))
            .unwrap_or_default()
    }

    pub fn reset(&mut self) {
        self.selected = None;
        self.custom.clear();
        self.urgency_override = None;
        self.notes.clear();
    }

    fn issue(&self) -> Option<MaintenanceIssue> {
        if let Some(template) = self.selected_issue() {
            return Some(MaintenanceIssue::Catalog {
                issue_id: template.id.clone(),
                name: template.name.clone(),
            });
        }
        let custom = self.custom.trim();
        (!custom.is_empty()).then(|| MaintenanceIssue::Custom {
            description: custom.to_string(),
        })
    }
}

impl ServiceFlow for MaintenanceFlow {
    fn service(&self) -> ServiceType {
        ServiceType::Maintenance
    }

    fn can_submit(&self) -> bool {
        self.issue().is_some()
    }

    fn draft(&self) -> Result<RequestDraft> {
        let issue = self
            .issue()
            .ok_or_else(|| Error::validation("issue: pick an issue or describe it"))?;
        let notes = self.notes.trim();
        let ticket = MaintenanceTicket {
            issue,
            urgency: self.urgency(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        };
        Ok(RequestDraft::new(RequestDetails::Maintenance(ticket)))
    }
}
