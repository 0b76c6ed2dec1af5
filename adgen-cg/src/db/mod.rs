//! Database access layer for adgen-cg
//!
//! Thin query functions over the collaborator tables created by
//! `adgen_common::db::init_database`. The service only reads sessions and
//! audience ownership, and appends usage records.

pub mod audiences;
pub mod sessions;
pub mod usage;

pub use audiences::{insert_audience, is_audience_owner};
pub use sessions::{find_session_user, insert_session};
pub use usage::{count_usage_logs, insert_usage_log};
