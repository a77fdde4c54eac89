//! Core types, state machine, and service flows for the hotel guest portal.

pub mod details;
pub mod error;
pub mod flows;
pub mod limits;
pub mod qr;
pub mod request;
pub mod session;
pub mod tenant;

pub use details::*;
pub use error::{Error, Result};
pub use qr::{QrToken, ShortCode};
pub use request::*;
pub use session::*;
pub use tenant::*;
