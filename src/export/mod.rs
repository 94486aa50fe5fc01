// src/export/mod.rs
//! Everything that leaves the process: Parquet tables and donation payloads.

pub mod donation;
pub mod parquet;

pub use self::donation::{decline_payload, donation_key, donation_payload, write_payload};
pub use self::parquet::{write_outputs, write_table};
