use std::fmt;

use chrono::{DateTime, Utc};
use lunchradar_common::types::{AcquisitionOutcome, Strategy};
use serde::Serialize;

/// End-of-run summary. Logged and returned to the caller; the per-source
/// detail lives in the run outcome log.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources_attempted: usize,
    pub sources_succeeded: usize,
    pub traditional: usize,
    pub screenshot: usize,
    pub total_items: usize,
    pub total_cost_cents: u64,
    /// The run hit its wall-clock deadline; unfinished sources were
    /// abandoned after their completed peers were persisted.
    pub timed_out: bool,
}

impl RunReport {
    pub fn from_outcomes(
        run_id: &str,
        started_at: DateTime<Utc>,
        outcomes: &[AcquisitionOutcome],
        timed_out: bool,
    ) -> Self {
        let strategy_count = |s: Strategy| {
            outcomes
                .iter()
                .filter(|o| o.succeeded() && o.strategy == Some(s))
                .count()
        };
        Self {
            run_id: run_id.to_string(),
            started_at,
            finished_at: Utc::now(),
            sources_attempted: outcomes.len(),
            sources_succeeded: outcomes.iter().filter(|o| o.succeeded()).count(),
            traditional: strategy_count(Strategy::Traditional),
            screenshot: strategy_count(Strategy::Screenshot),
            total_items: outcomes.iter().map(|o| o.items.len()).sum(),
            total_cost_cents: outcomes.iter().map(|o| o.cost_cents).sum(),
            timed_out,
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.sources_attempted == 0 {
            return 0.0;
        }
        self.sources_succeeded as f64 / self.sources_attempted as f64 * 100.0
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} sources succeeded ({:.0}%), {} traditional / {} screenshot, {} dishes, {}¢{}",
            self.sources_succeeded,
            self.sources_attempted,
            self.success_rate(),
            self.traditional,
            self.screenshot,
            self.total_items,
            self.total_cost_cents,
            if self.timed_out { ", timed out" } else { "" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lunchradar_common::types::{ExtractionMethod, MenuItem};

    fn outcome(id: &str, strategy: Option<Strategy>, items: usize, cost: u64) -> AcquisitionOutcome {
        AcquisitionOutcome {
            source_id: id.to_string(),
            source_name: id.to_string(),
            strategy,
            method: strategy.map(|_| ExtractionMethod::Pattern),
            items: (0..items)
                .map(|i| MenuItem::new_validated(&format!("Rätt {i}"), 110, None, None, None).unwrap())
                .collect(),
            cost_cents: cost,
            acquired_at: Utc::now(),
            failure: (items == 0).then(|| "no menu found".to_string()),
        }
    }

    #[test]
    fn aggregates_outcomes() {
        let outcomes = vec![
            outcome("a", Some(Strategy::Traditional), 5, 2),
            outcome("b", Some(Strategy::Screenshot), 4, 14),
            outcome("c", Some(Strategy::Screenshot), 0, 14),
            outcome("d", None, 0, 0),
        ];
        let report = RunReport::from_outcomes("run-1", Utc::now(), &outcomes, false);

        assert_eq!(report.sources_attempted, 4);
        assert_eq!(report.sources_succeeded, 2);
        assert_eq!(report.traditional, 1);
        assert_eq!(report.screenshot, 1);
        assert_eq!(report.total_items, 9);
        assert_eq!(report.total_cost_cents, 30);
        assert_eq!(report.success_rate(), 50.0);
    }

    #[test]
    fn empty_run_has_zero_rate() {
        let report = RunReport::from_outcomes("run-2", Utc::now(), &[], true);
        assert_eq!(report.success_rate(), 0.0);
        assert!(report.timed_out);
        assert!(format!("{report}").contains("timed out"));
    }
}
