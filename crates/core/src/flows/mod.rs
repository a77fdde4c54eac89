//! Service flow controllers.
//!
//! Each controller is a synchronous form model for one request type. It
//! never talks to the store itself: it produces a [`RequestDraft`] that the
//! caller turns into exactly one creation command. Validation failures stay
//! here; the controller refuses to build a draft until its guard is satisfied.

pub mod feedback;
pub mod housekeeping;
pub mod maintenance;
pub mod room_service;
pub mod wifi;

pub use feedback::FeedbackFlow;
pub use housekeeping::{HousekeepingFlow, HousekeepingItem};
pub use maintenance::{IssueTemplate, MaintenanceFlow};
pub use room_service::{MenuItem, RoomServiceFlow};
pub use wifi::{WifiField, WifiScreen};

use std::sync::atomic::{AtomicBool, Ordering};

use crate::details::RequestDetails;
use crate::error::Result;
use crate::request::{NewServiceRequest, ServiceType};
use crate::session::Session;

/// A flow that terminates in a creation command.
pub trait ServiceFlow {
    /// The request type this flow creates.
    fn service(&self) -> ServiceType;

    /// Whether the submit action is enabled.
    fn can_submit(&self) -> bool;

    /// Builds the payload, or `ValidationFailed` naming what is missing.
    fn draft(&self) -> Result<RequestDraft>;
}

/// Output of a flow: a typed payload plus a human label.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    pub title: String,
    pub details: RequestDetails,
}

impl RequestDraft {
    pub fn new(details: RequestDetails) -> Self {
        Self {
            title: details.default_title(),
            details,
        }
    }

    /// Binds the draft to the session it is submitted from.
    pub fn into_command(self, session: &Session) -> NewServiceRequest {
        NewServiceRequest {
            session_id: session.guest_session_id,
            tenant_id: session.tenant_id,
            title: Some(self.title),
            details: self.details,
        }
    }
}

/// Re-submission guard: at most one creation call in flight per form.
#[derive(Debug, Default)]
pub struct SubmissionGuard {
    in_flight: AtomicBool,
}

impl SubmissionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the guard. `None` while a previous submission is still pending.
    pub fn try_begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight {
                flag: &self.in_flight,
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

/// Releases the guard when dropped, whatever the submission outcome.
#[derive(Debug)]
pub struct InFlight<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
