use super::{
	auc_roc::auc_roc,
	log_loss::{ClassificationInput, LogLoss},
	misclassification::Misclassification,
	Metric, StreamingMetric,
};
use itertools::izip;
use ndarray::prelude::*;

/// Compute the weighted metrics of a classification model. The area under the ROC curve is only computed for binary classifiers.
pub struct ClassificationMetrics;

pub struct ClassificationMetricsInput<'a> {
	/// (n_examples, 1) for binary classification, holding the probability of class 1, or (n_examples, n_classes)
	pub probabilities: ArrayView2<'a, f32>,
	/// Zero-based class indexes.
	pub labels: &'a [f32],
	pub weights: &'a [f32],
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassificationMetricsOutput {
	pub logloss: Option<f32>,
	pub misclassification: Option<f32>,
	pub auc: Option<f32>,
}

impl<'a> Metric<'a> for ClassificationMetrics {
	type Input = ClassificationMetricsInput<'a>;
	type Output = ClassificationMetricsOutput;

	fn compute(input: Self::Input) -> Self::Output {
		let mut logloss = LogLoss::default();
		let mut misclassification = Misclassification::new();
		for (probabilities, label, weight) in izip!(
			input.probabilities.genrows(),
			input.labels,
			input.weights
		) {
			let input = ClassificationInput {
				probabilities,
				label: *label,
				weight: *weight,
			};
			logloss.update(input.clone());
			misclassification.update(input);
		}
		let auc = if input.probabilities.ncols() == 1 {
			let positive = input.probabilities.column(0).to_vec();
			auc_roc(&positive, input.labels, input.weights)
		} else {
			None
		};
		ClassificationMetricsOutput {
			logloss: logloss.finalize(),
			misclassification: misclassification.finalize(),
			auc,
		}
	}
}

#[test]
fn test_binary_classification_metrics() {
	let probabilities = arr2(&[[0.9f32], [0.4], [0.4], [0.2]]);
	let labels = [1.0, 1.0, 0.0, 0.0];
	let weights = [1.0; 4];
	let output = ClassificationMetrics::compute(ClassificationMetricsInput {
		probabilities: probabilities.view(),
		labels: &labels,
		weights: &weights,
	});
	assert_eq!(output.misclassification, Some(0.25));
	assert!((output.auc.unwrap() - 0.875).abs() < 1e-6);
	let expected = -(0.9f32.ln() + 0.4f32.ln() + 0.6f32.ln() + 0.8f32.ln()) / 4.0;
	assert!((output.logloss.unwrap() - expected).abs() < 1e-5);
}

#[test]
fn test_multiclass_metrics_skip_auc() {
	let probabilities = arr2(&[[0.6f32, 0.3, 0.1], [0.2, 0.2, 0.6]]);
	let labels = [0.0, 1.0];
	let weights = [1.0, 1.0];
	let output = ClassificationMetrics::compute(ClassificationMetricsInput {
		probabilities: probabilities.view(),
		labels: &labels,
		weights: &weights,
	});
	assert_eq!(output.misclassification, Some(0.5));
	assert_eq!(output.auc, None);
}
