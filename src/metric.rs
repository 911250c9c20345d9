//! Metric trends: how a measure moved across its entries.

use jiff::civil::Date;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Metric, MetricEntry};

/// Summary of a run of entries, oldest to newest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricTrend {
    pub count: usize,
    pub first_date: Date,
    pub first: f64,
    pub latest_date: Date,
    pub latest: f64,
    /// `latest - first`.
    pub change: f64,
    pub min: f64,
    pub max: f64,
}

/// Summarizes `entries` in date order, or `None` if there are none.
pub fn trend(entries: &[MetricEntry]) -> Option<MetricTrend> {
    let first = entries.iter().min_by_key(|e| e.date)?;
    let latest = entries.iter().max_by_key(|e| e.date)?;
    let (min, max) = entries
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), e| {
            (lo.min(e.value), hi.max(e.value))
        });

    Some(MetricTrend {
        count: entries.len(),
        first_date: first.date,
        first: first.value,
        latest_date: latest.date,
        latest: latest.value,
        change: latest.value - first.value,
        min,
        max,
    })
}

/// The outcome's primary metric, if one is marked.
pub fn primary_metric(metrics: &[Metric], outcome_id: Uuid) -> Option<&Metric> {
    metrics
        .iter()
        .find(|m| m.outcome_id == outcome_id && m.is_primary)
}
