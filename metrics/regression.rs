use super::{
	mean_squared_error::{ErrorInput, MeanAbsoluteError, MeanSquaredError},
	Metric, StreamingMetric,
};
use itertools::izip;
use ndarray::prelude::*;

/// Compute the weighted error metrics of a regression model.
pub struct RegressionMetrics;

pub struct RegressionMetricsInput<'a> {
	/// (n_examples)
	pub predictions: ArrayView1<'a, f32>,
	pub labels: &'a [f32],
	pub weights: &'a [f32],
}

#[derive(Clone, Debug, PartialEq)]
pub struct RegressionMetricsOutput {
	pub mse: Option<f32>,
	pub rmse: Option<f32>,
	pub mae: Option<f32>,
}

impl<'a> Metric<'a> for RegressionMetrics {
	type Input = RegressionMetricsInput<'a>;
	type Output = RegressionMetricsOutput;

	fn compute(input: Self::Input) -> Self::Output {
		let mut mse = MeanSquaredError::default();
		let mut mae = MeanAbsoluteError::default();
		for (prediction, label, weight) in izip!(input.predictions.iter(), input.labels, input.weights)
		{
			let input = ErrorInput {
				prediction: *prediction,
				label: *label,
				weight: *weight,
			};
			mse.update(input);
			mae.update(input);
		}
		let mse = mse.finalize();
		RegressionMetricsOutput {
			mse,
			rmse: mse.map(f32::sqrt),
			mae: mae.finalize(),
		}
	}
}

#[test]
fn test_regression_metrics() {
	let predictions = arr1(&[1.0f32, 2.0, 3.0, 10.0]);
	let labels = [1.0, 4.0, 3.0, std::f32::NAN];
	let weights = [1.0, 1.0, 2.0, 1.0];
	let output = RegressionMetrics::compute(RegressionMetricsInput {
		predictions: predictions.view(),
		labels: &labels,
		weights: &weights,
	});
	assert_eq!(
		output,
		RegressionMetricsOutput {
			mse: Some(1.0),
			rmse: Some(1.0),
			mae: Some(0.5),
		}
	);
}
