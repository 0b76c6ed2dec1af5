//! Database bootstrap shared by adgen services

pub mod init;

pub use init::{create_schema, init_database};
