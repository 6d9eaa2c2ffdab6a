//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate geocoder, record store and marker registry into use-case
//!   level APIs.
//! - Keep console/UI layers decoupled from storage and display details.

pub mod sync_service;
