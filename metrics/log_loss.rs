use super::{mean::Mean, StreamingMetric};
use ndarray::prelude::*;
use num_traits::{clamp, ToPrimitive};

/// LogLoss is the cross entropy between the predicted class probabilities and the label. [Learn more](https://en.wikipedia.org/wiki/Cross_entropy#Cross-entropy_loss_function_and_logistic_regression).
#[derive(Clone, Debug, Default)]
pub struct LogLoss(Mean);

/**
The input to [LogLoss](struct.LogLoss.html) and [Misclassification](struct.Misclassification.html).

Binary classifiers produce a single probability, the probability of class 1. Multiclass classifiers produce one probability per class.
*/
#[derive(Clone, Debug)]
pub struct ClassificationInput<'a> {
	/// (n_classes), or (1) for binary classification
	pub probabilities: ArrayView1<'a, f32>,
	/// The zero-based class index.
	pub label: f32,
	pub weight: f32,
}

impl<'a> ClassificationInput<'a> {
	/// Return the probability the model assigned to `class`.
	pub fn probability_of(&self, class: usize) -> Option<f32> {
		if self.probabilities.len() == 1 {
			let positive = self.probabilities[0];
			match class {
				0 => Some(1.0 - positive),
				1 => Some(positive),
				_ => None,
			}
		} else {
			self.probabilities.get(class).copied()
		}
	}

	pub fn class(&self) -> Option<usize> {
		if self.label.is_nan() {
			None
		} else {
			self.label.to_usize()
		}
	}
}

impl<'a> StreamingMetric<'a> for LogLoss {
	type Input = ClassificationInput<'a>;
	type Output = Option<f32>;

	fn update(&mut self, input: ClassificationInput) {
		let probability = match input.class().and_then(|class| input.probability_of(class)) {
			Some(probability) => probability,
			None => return,
		};
		// Log loss is undefined when the probability is 0 or 1.
		let probability = clamp(probability, std::f32::EPSILON, 1.0 - std::f32::EPSILON);
		self.0.update((-probability.ln(), input.weight));
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		self.0.finalize()
	}
}

#[test]
fn test_binary_log_loss() {
	let probabilities = arr1(&[0.8f32, 0.4]);
	let labels = [1.0, 0.0];
	let mut metric = LogLoss::default();
	for (probability, label) in probabilities.iter().zip(labels.iter()) {
		metric.update(ClassificationInput {
			probabilities: ArrayView1::from(std::slice::from_ref(probability)),
			label: *label,
			weight: 1.0,
		});
	}
	let expected = -(0.8f32.ln() + 0.6f32.ln()) / 2.0;
	assert!((metric.finalize().unwrap() - expected).abs() < 1e-6);
}

#[test]
fn test_multiclass_log_loss() {
	let probabilities = arr2(&[[0.7f32, 0.2, 0.1], [0.1, 0.1, 0.8]]);
	let labels = [0.0, 2.0];
	let weights = [1.0, 3.0];
	let mut metric = LogLoss::default();
	for (row, (label, weight)) in probabilities
		.genrows()
		.into_iter()
		.zip(labels.iter().zip(weights.iter()))
	{
		metric.update(ClassificationInput {
			probabilities: row,
			label: *label,
			weight: *weight,
		});
	}
	let expected = -(0.7f32.ln() + 3.0 * 0.8f32.ln()) / 4.0;
	assert!((metric.finalize().unwrap() - expected).abs() < 1e-6);
}
