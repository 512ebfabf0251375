//! Canonical schema constants for structured logging
//!
//! Every log event emitted by the migration engine uses these keys, so log
//! consumers can filter on them without parsing messages.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

/// Field tracing uses for an event's plain message
pub const FIELD_MESSAGE: &str = "message";

/// Ledger table a migration run works against
pub const FIELD_TABLE: &str = "table";

pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
