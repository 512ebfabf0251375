//! Types shared by the onward error and logging facilities
//!
//! - **Schema constants**: canonical field keys and event names used by
//!   structured log events

pub mod schema;
