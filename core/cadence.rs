/**
`ScoringTimes` holds every timestamp the scoring decision depends on, in milliseconds.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoringTimes {
	/// The time of the first scoring decision.
	pub first_score: Option<u64>,
	pub last_score_start: Option<u64>,
	pub last_score_end: Option<u64>,
}

/**
`ScoringCadence` decides whether to score the model before a boosting round.

Scoring always happens when `score_each_iteration` is set or on the final pass. A positive `score_tree_interval` scores every that many trees and disables the time based heuristic. Otherwise scoring happens during the first `initial_score_interval` milliseconds, and afterwards at most once every `score_interval` milliseconds, and only while the last scoring pass took less than 10% of the time since it started.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringCadence {
	pub score_each_iteration: bool,
	pub score_tree_interval: usize,
	pub score_interval: u64,
	pub initial_score_interval: u64,
}

const MAX_DUTY_CYCLE: f64 = 0.1;

impl ScoringCadence {
	pub fn should_score(
		&self,
		now: u64,
		times: ScoringTimes,
		n_trees: usize,
		final_scoring: bool,
	) -> bool {
		if self.score_each_iteration || final_scoring {
			return true;
		}
		if self.score_tree_interval > 0 {
			return n_trees % self.score_tree_interval == 0;
		}
		let first_score = times.first_score.unwrap_or(now);
		if now.saturating_sub(first_score) < self.initial_score_interval {
			return true;
		}
		match (times.last_score_start, times.last_score_end) {
			(Some(start), Some(end)) => {
				let since_last_score = now.saturating_sub(start);
				let last_duration = end.saturating_sub(start);
				since_last_score > self.score_interval
					&& (last_duration as f64) / (since_last_score as f64) < MAX_DUTY_CYCLE
			}
			// Nothing was scored yet.
			_ => true,
		}
	}
}

#[cfg(test)]
fn heuristic() -> ScoringCadence {
	ScoringCadence {
		score_each_iteration: false,
		score_tree_interval: 0,
		score_interval: 4000,
		initial_score_interval: 4000,
	}
}

#[test]
fn test_initial_window_always_scores() {
	let cadence = heuristic();
	let times = ScoringTimes {
		first_score: Some(1000),
		last_score_start: Some(3000),
		last_score_end: Some(3500),
	};
	assert!(cadence.should_score(3600, times, 3, false));
	assert!(cadence.should_score(1000, ScoringTimes::default(), 0, false));
}

#[test]
fn test_duty_cycle() {
	let cadence = heuristic();
	let times = ScoringTimes {
		first_score: Some(0),
		last_score_start: Some(10_000),
		last_score_end: Some(10_300),
	};
	// Less than the score interval has passed.
	assert!(!cadence.should_score(13_000, times, 10, false));
	// 300ms of 4500ms is below 10%.
	assert!(cadence.should_score(14_500, times, 10, false));
	// A slow scoring pass defers the next one.
	let slow = ScoringTimes {
		last_score_end: Some(10_600),
		..times
	};
	assert!(!cadence.should_score(14_500, slow, 10, false));
	assert!(cadence.should_score(16_100, slow, 10, false));
}

#[test]
fn test_tree_interval_overrides_heuristic() {
	let cadence = ScoringCadence {
		score_tree_interval: 5,
		..heuristic()
	};
	let times = ScoringTimes {
		first_score: Some(0),
		last_score_start: Some(0),
		last_score_end: Some(1),
	};
	assert!(cadence.should_score(100_000, times, 10, false));
	// The initial window does not apply with a tree interval.
	assert!(!cadence.should_score(100, times, 3, false));
	assert!(cadence.should_score(100, times, 3, true));
}

#[test]
fn test_score_each_iteration() {
	let cadence = ScoringCadence {
		score_each_iteration: true,
		score_tree_interval: 5,
		..heuristic()
	};
	assert!(cadence.should_score(0, ScoringTimes::default(), 3, false));
}

#[test]
fn test_cadence_with_fast_scoring() {
	let cadence = ScoringCadence {
		initial_score_interval: 0,
		..heuristic()
	};
	// One tree per second and 200ms scoring passes.
	let mut times = ScoringTimes::default();
	let mut scored_at = Vec::new();
	for tree in 0..20u64 {
		let now = tree * 1000;
		if times.first_score.is_none() {
			times.first_score = Some(now);
		}
		if cadence.should_score(now, times, tree as usize, false) {
			times.last_score_start = Some(now);
			times.last_score_end = Some(now + 200);
			scored_at.push(now);
		}
	}
	assert_eq!(scored_at, vec![0, 5000, 10_000, 15_000]);
}
