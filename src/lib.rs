//! BVMT-SIM Virtual Trading Library
//!
//! Core components for the BVMT paper-trading portfolio client: domain model
//! and derived metrics, the portfolio coordinator, and the REST backend client.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
