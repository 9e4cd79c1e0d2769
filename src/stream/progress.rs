//! Monotonic progress-percentage state machine.
//!
//! The value only ever moves forward within a session: stage targets,
//! interpolated bands, and per-result updates all apply through a max. It
//! resets to zero only when a new session starts.

use super::event::ProgressState;

/// Fixed targets for stages without sub-progress, increasing by stage order.
/// `searching` and `filtering` are listed for completeness but reach their
/// neighborhood through interpolation instead.
const STAGE_TARGETS: &[(&str, f64)] = &[
    ("initializing", 5.0),
    ("model_selected", 10.0),
    ("query_built", 15.0),
    ("searching", 50.0),
    ("search_complete", 65.0),
    ("summarizing", 80.0),
    ("summarize_complete", 85.0),
    ("filtering", 95.0),
    ("filter_complete", 98.0),
    ("completed", 100.0),
];

/// Monotonically non-decreasing progress value in `[0, 100]`.
#[derive(Debug, Clone, Default)]
pub struct ProgressTracker {
    value: f64,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Back to zero for a fresh session.
    pub fn reset(&mut self) {
        self.value = 0.0;
    }

    /// Apply a progress stage.
    ///
    /// `searching` interpolates across its reserved 15-50 band (capped at
    /// 95), `filtering` across 85-95 (capped at 98); every other known stage
    /// jumps to its fixed target. Unknown stages leave the value untouched.
    pub fn apply_stage(&mut self, state: &ProgressState) {
        match state.stage.as_str() {
            "searching" => self.raise((15.0 + sub_ratio(state) * 35.0).min(95.0)),
            "filtering" => self.raise((85.0 + sub_ratio(state) * 10.0).min(98.0)),
            stage => {
                if let Some(&(_, target)) = STAGE_TARGETS.iter().find(|(name, _)| *name == stage) {
                    self.raise(target);
                }
            }
        }
    }

    /// Stream the final 90-100 band as individual results land. A missing or
    /// zero total leaves the value untouched.
    pub fn apply_result(&mut self, index: u64, total: u64) {
        if total == 0 {
            return;
        }
        let ratio = (index as f64 / total as f64).min(1.0);
        self.raise(90.0 + ratio * 10.0);
    }

    /// The backend declared the pipeline finished.
    pub fn complete(&mut self) {
        self.raise(100.0);
    }

    /// Session teardown: a bar that started moving must not freeze mid-way,
    /// whatever the outcome.
    pub fn finalize(&mut self) {
        if self.value > 0.0 && self.value < 100.0 {
            self.value = 100.0;
        }
    }

    fn raise(&mut self, target: f64) {
        if target > self.value {
            self.value = target;
        }
    }
}

fn sub_ratio(state: &ProgressState) -> f64 {
    let total = state.total.unwrap_or(0).max(1) as f64;
    let current = state.current.unwrap_or(0) as f64;
    (current / total).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::event::describe_stage;
    use serde_json::json;

    fn stage(name: &str, current: u64, total: u64) -> ProgressState {
        describe_stage(name, &json!({ "current": current, "total": total }))
    }

    #[test]
    fn test_fixed_stage_targets() {
        let mut tracker = ProgressTracker::new();

        tracker.apply_stage(&stage("initializing", 0, 0));
        assert_eq!(tracker.value(), 5.0);

        tracker.apply_stage(&stage("query_built", 0, 0));
        assert_eq!(tracker.value(), 15.0);

        tracker.apply_stage(&stage("summarize_complete", 0, 0));
        assert_eq!(tracker.value(), 85.0);
    }

    #[test]
    fn test_searching_interpolates_its_band() {
        let mut tracker = ProgressTracker::new();

        tracker.apply_stage(&stage("searching", 0, 4));
        assert_eq!(tracker.value(), 15.0);

        tracker.apply_stage(&stage("searching", 2, 4));
        assert_eq!(tracker.value(), 32.5);

        tracker.apply_stage(&stage("searching", 4, 4));
        assert_eq!(tracker.value(), 50.0);

        // Overshooting current is clamped to the full band.
        tracker.apply_stage(&stage("searching", 9, 4));
        assert_eq!(tracker.value(), 50.0);
    }

    #[test]
    fn test_filtering_interpolates_its_band() {
        let mut tracker = ProgressTracker::new();
        tracker.apply_stage(&stage("filtering", 1, 2));
        assert_eq!(tracker.value(), 90.0);
        tracker.apply_stage(&stage("filtering", 2, 2));
        assert_eq!(tracker.value(), 95.0);
    }

    #[test]
    fn test_value_never_regresses() {
        let mut tracker = ProgressTracker::new();
        tracker.apply_stage(&stage("summarizing", 0, 0));
        assert_eq!(tracker.value(), 80.0);

        // A late low-band update cannot pull the value back down.
        tracker.apply_stage(&stage("searching", 1, 10));
        assert_eq!(tracker.value(), 80.0);
        tracker.apply_stage(&stage("initializing", 0, 0));
        assert_eq!(tracker.value(), 80.0);
        tracker.apply_result(0, 100);
        assert_eq!(tracker.value(), 90.0);
    }

    #[test]
    fn test_monotonic_across_arbitrary_event_order() {
        let stages = [
            "completed",
            "searching",
            "initializing",
            "filter_complete",
            "query_built",
            "summarizing",
            "filtering",
            "search_complete",
        ];

        let mut tracker = ProgressTracker::new();
        let mut previous = tracker.value();
        for name in stages {
            tracker.apply_stage(&stage(name, 1, 3));
            assert!(tracker.value() >= previous, "regressed on {name}");
            previous = tracker.value();
        }
    }

    #[test]
    fn test_result_band_and_completion() {
        let mut tracker = ProgressTracker::new();

        tracker.apply_result(9, 10);
        assert_eq!(tracker.value(), 99.0);

        // Zero total is a no-op rather than a division by zero.
        tracker.apply_result(5, 0);
        assert_eq!(tracker.value(), 99.0);

        tracker.complete();
        assert_eq!(tracker.value(), 100.0);
    }

    #[test]
    fn test_unknown_stage_is_a_no_op() {
        let mut tracker = ProgressTracker::new();
        tracker.apply_stage(&stage("searching", 2, 4));
        let before = tracker.value();
        tracker.apply_stage(&describe_stage("reranking", &json!({})));
        assert_eq!(tracker.value(), before);
    }

    #[test]
    fn test_finalize_only_closes_a_started_bar() {
        let mut tracker = ProgressTracker::new();
        tracker.finalize();
        assert_eq!(tracker.value(), 0.0);

        tracker.apply_stage(&stage("initializing", 0, 0));
        tracker.finalize();
        assert_eq!(tracker.value(), 100.0);

        tracker.finalize();
        assert_eq!(tracker.value(), 100.0);
    }

    #[test]
    fn test_reset_returns_to_zero() {
        let mut tracker = ProgressTracker::new();
        tracker.complete();
        tracker.reset();
        assert_eq!(tracker.value(), 0.0);
    }
}
