use super::{log_loss::ClassificationInput, mean::Mean, StreamingMetric};

/// The misclassification error is the weighted proportion of examples whose most probable class is not the label.
#[derive(Clone, Debug, Default)]
pub struct Misclassification(Mean);

impl Misclassification {
	pub fn new() -> Self {
		Self::default()
	}
}

impl<'a> StreamingMetric<'a> for Misclassification {
	type Input = ClassificationInput<'a>;
	type Output = Option<f32>;

	fn update(&mut self, input: ClassificationInput) {
		let class = match input.class() {
			Some(class) => class,
			None => return,
		};
		let prediction = if input.probabilities.len() == 1 {
			if input.probabilities[0] >= 0.5 {
				1
			} else {
				0
			}
		} else {
			input
				.probabilities
				.iter()
				.enumerate()
				.fold((0, std::f32::NEG_INFINITY), |best, (index, probability)| {
					if *probability > best.1 {
						(index, *probability)
					} else {
						best
					}
				})
				.0
		};
		self.0
			.update((if prediction == class { 0.0 } else { 1.0 }, input.weight))
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Option<f32> {
		self.0.finalize()
	}
}

#[test]
fn test_misclassification() {
	use ndarray::prelude::*;
	let probabilities = arr2(&[[0.7f32, 0.3], [0.4, 0.6], [0.9, 0.1], [0.2, 0.8]]);
	let labels = [0.0, 0.0, 1.0, 1.0];
	let mut metric = Misclassification::new();
	for (row, label) in probabilities.genrows().into_iter().zip(labels.iter()) {
		metric.update(ClassificationInput {
			probabilities: row,
			label: *label,
			weight: 1.0,
		});
	}
	assert_eq!(metric.finalize(), Some(0.5));
}
