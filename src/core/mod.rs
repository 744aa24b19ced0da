//! Core data types: messages, the store, and failure mapping.

pub mod error_mapper;
pub mod failure;
pub mod message;
pub mod store;
