//! Post-completion rating.

use uuid::Uuid;

use crate::details::{FeedbackEntry, RequestDetails};
use crate::error::{Error, Result};
use crate::flows::{RequestDraft, ServiceFlow};
use crate::limits::{MAX_COMMENT_LEN, MAX_RATING};
use crate::request::{RequestStatus, ServiceRequest, ServiceType};

#[derive(Debug, Clone)]
pub struct FeedbackFlow {
    request_id: Uuid,
    rating: u8,
    comment: String,
}

impl FeedbackFlow {
    /// Only completed requests can be rated.
    pub fn for_request(request: &ServiceRequest) -> Result<Self> {
        if request.status != RequestStatus::Completed {
            return Err(Error::validation(format!(
                "request_id: request is {}, not completed",
                request.status
            )));
        }
        Ok(Self {
            request_id: request.id,
            rating: 0,
            comment: String::new(),
        })
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// 1..=5 picks a star; 0 clears the rating.
    pub fn set_rating(&mut self, rating: u8) -> Result<()> {
        if rating > MAX_RATING {
            return Err(Error::validation(format!(
                "rating: must be at most {}",
                MAX_RATING
            )));
        }
        self.rating = rating;
        Ok(())
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) -> Result<()> {
        let comment = comment.into();
        if comment.chars().count() > MAX_COMMENT_LEN {
            return Err(Error::validation(format!(
                "comment: must be at most {} characters",
                MAX_COMMENT_LEN
            )));
        }
        self.comment = comment;
        Ok(())
    }
}

impl ServiceFlow for FeedbackFlow {
    fn service(&self) -> ServiceType {
        ServiceType::Feedback
    }

    fn can_submit(&self) -> bool {
        self.rating > 0
    }

    fn draft(&self) -> Result<RequestDraft> {
        if self.rating == 0 {
            return Err(Error::validation("rating: pick a rating"));
        }
        let comment = self.comment.trim();
        Ok(RequestDraft::new(RequestDetails::Feedback(FeedbackEntry {
            request_id: self.request_id,
            rating: self.rating,
            comment: (!comment.is_empty()).then(|| comment.to_string()),
        })))
    }
}
