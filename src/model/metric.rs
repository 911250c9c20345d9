//! Metrics: named numeric measures tracked against an outcome.

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MetricError {
    #[error("metric name is required")]
    EmptyName,

    #[error("metric value must be a finite number, got {0}")]
    NonFiniteValue(f64),
}

/// A measure such as body weight or pages read.
///
/// At most one metric per outcome is primary; storage clears the flag on
/// the others when a metric is saved as primary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metric {
    pub id: Uuid,
    pub outcome_id: Uuid,
    pub name: String,
    pub unit: String,
    pub is_primary: bool,
    pub created_at: Timestamp,
}

impl Metric {
    /// Name and unit are trimmed. The name must not be blank.
    pub fn new(outcome_id: Uuid, name: &str, unit: &str, is_primary: bool) -> Result<Self, MetricError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MetricError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            outcome_id,
            name: name.to_string(),
            unit: unit.trim().to_string(),
            is_primary,
            created_at: Timestamp::now(),
        })
    }

    /// Applies an edit, keeping unspecified fields.
    pub fn edit(
        &self,
        name: Option<&str>,
        unit: Option<&str>,
        is_primary: Option<bool>,
    ) -> Result<Self, MetricError> {
        let mut edited = Self::new(
            self.outcome_id,
            name.unwrap_or(&self.name),
            unit.unwrap_or(&self.unit),
            is_primary.unwrap_or(self.is_primary),
        )?;
        edited.id = self.id;
        edited.created_at = self.created_at;
        Ok(edited)
    }
}

/// One dated reading. A metric has at most one entry per date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    pub metric_id: Uuid,
    pub date: Date,
    pub value: f64,
}

impl MetricEntry {
    pub fn new(metric_id: Uuid, date: Date, value: f64) -> Result<Self, MetricError> {
        if !value.is_finite() {
            return Err(MetricError::NonFiniteValue(value));
        }
        Ok(Self {
            metric_id,
            date,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn new_metric_trims_and_requires_name() {
        let metric = Metric::new(Uuid::nil(), "  Weight ", " kg ", true).unwrap();
        assert_eq!(metric.name, "Weight");
        assert_eq!(metric.unit, "kg");
        assert!(metric.is_primary);

        assert_eq!(
            Metric::new(Uuid::nil(), "   ", "kg", false).unwrap_err(),
            MetricError::EmptyName
        );
    }

    #[test]
    fn edit_keeps_identity_and_unspecified_fields() {
        let metric = Metric::new(Uuid::nil(), "Weight", "kg", false).unwrap();
        let edited = metric.edit(None, Some("lb"), Some(true)).unwrap();

        assert_eq!(edited.id, metric.id);
        assert_eq!(edited.created_at, metric.created_at);
        assert_eq!(edited.name, "Weight");
        assert_eq!(edited.unit, "lb");
        assert!(edited.is_primary);
        assert!(metric.edit(Some(""), None, None).is_err());
    }

    #[test]
    fn entry_rejects_non_finite_values() {
        let day = date(2026, 2, 23);
        assert!(MetricEntry::new(Uuid::nil(), day, 72.5).is_ok());
        assert!(matches!(
            MetricEntry::new(Uuid::nil(), day, f64::NAN),
            Err(MetricError::NonFiniteValue(_))
        ));
        assert!(MetricEntry::new(Uuid::nil(), day, f64::INFINITY).is_err());
    }
}
