//! Event handling for wpd-bot.
//!
//! This module implements the message pipeline:
//! - Extracting story and part references from message text
//! - Reconciling references into unique resolved stories
//! - Building response cards and dispatching them with feedback reactions

pub mod card;
pub mod extract;
pub mod link_event;
pub mod reconcile;
