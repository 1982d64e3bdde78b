use crate::{
	config::StoppingMetric,
	model::{MetricSnapshot, MetricValues},
	options::Task,
};

impl StoppingMetric {
	/// `Auto` becomes log loss for classifiers and mean squared error for regressors.
	pub fn resolve(self, task: &Task) -> StoppingMetric {
		match (self, task) {
			(StoppingMetric::Auto, Task::Regression) => StoppingMetric::MSE,
			(StoppingMetric::Auto, Task::Classification { .. }) => StoppingMetric::LogLoss,
			(metric, _) => metric,
		}
	}

	pub fn value(self, metrics: &MetricValues) -> Option<f32> {
		match self {
			StoppingMetric::Auto => None,
			StoppingMetric::LogLoss => metrics.logloss,
			StoppingMetric::MSE => metrics.mse,
			StoppingMetric::RMSE => metrics.rmse,
			StoppingMetric::MAE => metrics.mae,
			StoppingMetric::AUC => metrics.auc,
			StoppingMetric::Misclassification => metrics.classification_error,
		}
	}

	pub fn higher_is_better(self) -> bool {
		matches!(self, StoppingMetric::AUC)
	}
}

/**
Decide whether to stop training because the last `stopping_rounds` scored values of `metric` in `history` all failed to improve on the best value before them. A value improves on the best when it is better by more than `tolerance` times the magnitude of the best. Unscored snapshots are skipped, and `stopping_rounds == 0` never stops.
*/
pub fn stop_early(
	history: &[MetricSnapshot],
	stopping_rounds: usize,
	metric: StoppingMetric,
	tolerance: f64,
) -> bool {
	if stopping_rounds == 0 {
		return false;
	}
	let values = history
		.iter()
		.filter_map(|snapshot| snapshot.metrics.as_ref())
		.filter_map(|metrics| metric.value(metrics))
		.filter(|value| value.is_finite())
		.map(f64::from);
	let mut best: Option<f64> = None;
	let mut rounds_without_improvement = 0;
	for value in values {
		let improved = match best {
			None => true,
			Some(best) => {
				let margin = tolerance * best.abs();
				if metric.higher_is_better() {
					value > best + margin
				} else {
					value < best - margin
				}
			}
		};
		if improved {
			best = Some(value);
			rounds_without_improvement = 0;
		} else {
			rounds_without_improvement += 1;
		}
	}
	rounds_without_improvement >= stopping_rounds
}

#[cfg(test)]
fn history(values: &[Option<f32>]) -> Vec<MetricSnapshot> {
	values
		.iter()
		.enumerate()
		.map(|(index, value)| MetricSnapshot {
			timestamp_ms: index as u64,
			metrics: value.map(|value| MetricValues {
				mse: Some(value),
				auc: Some(value),
				..Default::default()
			}),
		})
		.collect()
}

#[test]
fn test_worsening_metric_stops() {
	let history = history(&[Some(1.0), Some(1.1), Some(1.2)]);
	assert!(!stop_early(&history, 3, StoppingMetric::MSE, 0.0));
	let history = self::history(&[Some(1.0), Some(1.1), Some(1.2), Some(1.3)]);
	assert!(stop_early(&history, 3, StoppingMetric::MSE, 0.0));
	// Higher is better for AUC.
	assert!(!stop_early(&history, 3, StoppingMetric::AUC, 0.0));
}

#[test]
fn test_improvement_resets_window() {
	let history = history(&[Some(1.0), Some(1.1), Some(0.5), Some(0.6), Some(0.7)]);
	assert!(!stop_early(&history, 3, StoppingMetric::MSE, 0.0));
	assert!(stop_early(&history, 2, StoppingMetric::MSE, 0.0));
}

#[test]
fn test_unscored_snapshots_are_skipped() {
	let history = history(&[Some(1.0), None, Some(1.0), None, None, Some(1.0), Some(1.0)]);
	assert!(stop_early(&history, 3, StoppingMetric::MSE, 0.0));
	assert!(!stop_early(&history, 0, StoppingMetric::MSE, 0.0));
}

#[test]
fn test_tolerance_is_relative() {
	let history = history(&[Some(1.0), Some(0.995), Some(0.992), Some(0.991)]);
	// Each step improves by less than 1% of the best value.
	assert!(stop_early(&history, 3, StoppingMetric::MSE, 0.01));
	assert!(!stop_early(&history, 3, StoppingMetric::MSE, 0.0));
}

#[test]
fn test_resolve_auto() {
	assert_eq!(
		StoppingMetric::Auto.resolve(&Task::Regression),
		StoppingMetric::MSE
	);
	assert_eq!(
		StoppingMetric::Auto.resolve(&Task::Classification { n_classes: 2 }),
		StoppingMetric::LogLoss
	);
	assert_eq!(
		StoppingMetric::AUC.resolve(&Task::Regression),
		StoppingMetric::AUC
	);
}
