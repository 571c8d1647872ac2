//! Repeat-offender aggregation
//!
//! Counts are taken from the record store on every call. Nothing is cached, so
//! a submission made right after an evaluation shows up in the next one.

use serde::Serialize;
use sitesafe_core::models::{DateRange, RecordKind};
use sitesafe_core::validation::normalize_hard_hat;
use sitesafe_core::{AppError, AuthorizedSession, EscalationThresholds};
use sitesafe_db::{Field, RecordQuery, RecordStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffenderStatus {
    pub hard_hat_number: String,
    /// Lifetime violations for the token.
    pub total: i64,
    /// Violations dated inside the trailing window, today included.
    pub recent: i64,
    pub escalate: bool,
}

impl OffenderStatus {
    pub fn from_counts(
        hard_hat_number: String,
        total: i64,
        recent: i64,
        thresholds: &EscalationThresholds,
    ) -> Self {
        Self {
            hard_hat_number,
            total,
            recent,
            escalate: total >= thresholds.total || recent >= thresholds.recent,
        }
    }
}

#[derive(Clone)]
pub struct RepeatOffenderAggregator {
    store: RecordStore,
    thresholds: EscalationThresholds,
}

impl RepeatOffenderAggregator {
    pub fn new(store: RecordStore, thresholds: EscalationThresholds) -> Self {
        Self { store, thresholds }
    }

    pub fn thresholds(&self) -> &EscalationThresholds {
        &self.thresholds
    }

    pub async fn evaluate(
        &self,
        session: &AuthorizedSession,
        hard_hat_number: &str,
    ) -> Result<OffenderStatus, AppError> {
        let token = normalize_hard_hat(hard_hat_number);
        if token.is_empty() {
            return Err(AppError::Validation(
                "Hard hat number is required".to_string(),
            ));
        }

        let today = self.store.clock().today();
        let window = DateRange::trailing(today, self.thresholds.window_days);
        let lifetime = RecordQuery::new(RecordKind::PersonnelViolation)
            .equals(Field::HardHatNumber, Some(token.as_str()));
        let trailing = lifetime.clone().within(&window);

        let (total, recent) = tokio::try_join!(
            self.store.count(session, &lifetime),
            self.store.count(session, &trailing)
        )?;

        let status = OffenderStatus::from_counts(token, total, recent, &self.thresholds);
        if status.escalate {
            tracing::warn!(
                hard_hat = %status.hard_hat_number,
                total = status.total,
                recent = status.recent,
                "Repeat offender flagged for escalation"
            );
        } else {
            tracing::debug!(
                hard_hat = %status.hard_hat_number,
                total = status.total,
                recent = status.recent,
                "Repeat offender check"
            );
        }
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn either_threshold_escalates() {
        let thresholds = EscalationThresholds::default();
        assert!(!OffenderStatus::from_counts("1".into(), 2, 1, &thresholds).escalate);
        assert!(OffenderStatus::from_counts("1".into(), 3, 0, &thresholds).escalate);
        assert!(OffenderStatus::from_counts("1".into(), 2, 2, &thresholds).escalate);
        assert!(!OffenderStatus::from_counts("1".into(), 0, 0, &thresholds).escalate);
    }

    #[test]
    fn thresholds_are_configurable() {
        let strict = EscalationThresholds {
            total: 1,
            recent: 1,
            window_days: 7,
        };
        assert!(OffenderStatus::from_counts("1".into(), 1, 0, &strict).escalate);
    }

    #[test]
    fn status_serializes_flat() {
        let status = OffenderStatus::from_counts("117".into(), 3, 3, &EscalationThresholds::default());
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "hard_hat_number": "117",
                "total": 3,
                "recent": 3,
                "escalate": true
            })
        );
    }
}
