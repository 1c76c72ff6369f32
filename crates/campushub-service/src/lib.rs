//! # campushub-service
//!
//! Business logic for the CampusHub notification subsystem: target
//! resolution, durable persistence orchestration, and best-effort
//! real-time delivery dispatch.

pub mod notification;
