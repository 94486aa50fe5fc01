// src/lib.rs
pub mod annotations;
pub mod archive;
pub mod config;
pub mod export;
pub mod extract;
pub mod pipeline;
pub mod registry;
pub mod table;
