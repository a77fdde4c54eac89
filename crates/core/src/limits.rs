//! Size limits and fixed timings for the guest portal.
//!
//! The `#[validate]` derive macro requires literal values in attributes,
//! so some field limits are duplicated in `details.rs`. Keep both in sync
//! when modifying.

// === Session ===

/// Guest session validity window (hours).
pub const SESSION_TTL_HOURS: i64 = 24;

/// QR token pattern: URL-safe characters only, bounded length.
pub const QR_TOKEN_PATTERN: &str = r"^[A-Za-z0-9_-]{6,128}$";

/// Short-link code pattern.
pub const SHORT_CODE_PATTERN: &str = r"^[A-Za-z0-9]{3,32}$";

// === Flows ===

/// Fixed delivery buffer added on top of the slowest dish (minutes).
pub const DELIVERY_BUFFER_MINUTES: u32 = 15;

/// Maximum lines in a room-service cart.
pub const MAX_ORDER_LINES: usize = 50;

/// Maximum quantity of a single menu item.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Guest name max length.
pub const MAX_GUEST_NAME_LEN: usize = 100;

/// Free-text notes / custom issue max length.
pub const MAX_NOTES_LEN: usize = 500;

/// Feedback comment max length.
pub const MAX_COMMENT_LEN: usize = 2000;

/// Lowest and highest star rating.
pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

// === HTTP ===

/// Largest accepted request-creation body.
pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
