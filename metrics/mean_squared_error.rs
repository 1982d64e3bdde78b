use super::{mean::Mean, StreamingMetric};

/// The mean squared error is the weighted mean of squared differences between the predicted value and the label.
#[derive(Clone, Debug, Default)]
pub struct MeanSquaredError(Mean);

/// The input to [MeanSquaredError](struct.MeanSquaredError.html) and [MeanAbsoluteError](struct.MeanAbsoluteError.html).
#[derive(Clone, Copy, Debug)]
pub struct ErrorInput {
	pub prediction: f32,
	pub label: f32,
	pub weight: f32,
}

impl StreamingMetric<'_> for MeanSquaredError {
	type Input = ErrorInput;
	type Output = Option<f32>;

	fn update(&mut self, input: Self::Input) {
		self.0
			.update(((input.label - input.prediction).powi(2), input.weight))
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		self.0.finalize()
	}
}

/// The mean absolute error is the weighted mean of absolute differences between the predicted value and the label.
#[derive(Clone, Debug, Default)]
pub struct MeanAbsoluteError(Mean);

impl StreamingMetric<'_> for MeanAbsoluteError {
	type Input = ErrorInput;
	type Output = Option<f32>;

	fn update(&mut self, input: Self::Input) {
		self.0
			.update(((input.label - input.prediction).abs(), input.weight))
	}

	fn merge(&mut self, other: Self) {
		self.0.merge(other.0)
	}

	fn finalize(self) -> Self::Output {
		self.0.finalize()
	}
}

#[test]
fn test_weighted_errors() {
	let inputs = [
		ErrorInput {
			prediction: 1.0,
			label: 2.0,
			weight: 1.0,
		},
		ErrorInput {
			prediction: 0.0,
			label: 3.0,
			weight: 2.0,
		},
	];
	let mut mse = MeanSquaredError::default();
	let mut mae = MeanAbsoluteError::default();
	for input in inputs.iter() {
		mse.update(*input);
		mae.update(*input);
	}
	// (1 * 1 + 9 * 2) / 3
	assert!((mse.finalize().unwrap() - 19.0 / 3.0).abs() < 1e-6);
	// (1 * 1 + 3 * 2) / 3
	assert!((mae.finalize().unwrap() - 7.0 / 3.0).abs() < 1e-6);
}
