//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the services used by wpd-bot:
//! - Chat services (e.g., Slack)
//! - Story metadata services (the Wattpad API)
//!
//! Each service module defines both a generic trait and a concrete
//! implementation, allowing for extensibility and easy testing.

pub mod chat;
pub mod wattpad;
