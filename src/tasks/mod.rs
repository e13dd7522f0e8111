//! Background Tasks Module
//!
//! Contains the expiration worker and the deadline queue it drains.
//!
//! # Tasks
//! - Expiration: removes map entries as their deadlines elapse

mod queue;
mod reaper;

pub(crate) use queue::DeadlineQueue;
pub(crate) use reaper::spawn_reaper;
