//! Cadence: outcome-driven habit tracking.
//!
//! Outcomes are goals; outputs are the recurring actions that serve them.
//! This crate holds the recurrence model, the completion accounting that
//! colors days and weeks, shortfall detection, starter suggestions, metric
//! trends, skill progression, the reminder scheduler, and `SQLite`
//! persistence.

pub mod accounting;
pub mod config;
pub mod dashboard;
pub mod logging;
pub mod metric;
pub mod model;
pub mod reminder;
pub mod review;
pub mod schedule;
pub mod shortfall;
pub mod skill;
pub mod starter;
pub mod storage;
pub mod week;
