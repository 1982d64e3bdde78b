/*!
This crate defines the [`Metric`](trait.Metric.html) and [`StreamingMetric`](trait.StreamingMetric.html) traits and the weighted metrics a training job records each time it scores a model, such as [`MeanSquaredError`](struct.MeanSquaredError.html) and [`LogLoss`](struct.LogLoss.html).

Every metric weighs each example by its weight. Examples with a missing label or a missing weight do not count.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod auc_roc;
mod classification;
mod log_loss;
mod mean;
mod mean_squared_error;
mod misclassification;
mod regression;

pub use self::auc_roc::{auc_roc, compute_roc_curve, RocCurvePoint};
pub use self::classification::{
	ClassificationMetrics, ClassificationMetricsInput, ClassificationMetricsOutput,
};
pub use self::log_loss::{ClassificationInput, LogLoss};
pub use self::mean::Mean;
pub use self::mean_squared_error::{ErrorInput, MeanAbsoluteError, MeanSquaredError};
pub use self::misclassification::Misclassification;
pub use self::regression::{RegressionMetrics, RegressionMetricsInput, RegressionMetricsOutput};

/**
A `Metric` is computed in one call from its complete input, such as all the predictions and labels of a scoring pass.

The lifetime `'a` lets an `Input` borrow the arrays it reads from.
*/
pub trait Metric<'a> {
	type Input;
	type Output;
	fn compute(input: Self::Input) -> Self::Output;
}

/**
A `StreamingMetric` is accumulated one example at a time with `update()`. Partial results computed over different chunks of examples combine with `merge()`, and `finalize()` produces the value.

# Examples

A metric that tracks the largest weight it has seen:

```
use gbm_bridge_metrics::StreamingMetric;

#[derive(Default)]
struct MaxWeight(f32);

impl StreamingMetric<'_> for MaxWeight {
	type Input = f32;
	type Output = f32;
	fn update(&mut self, weight: f32) {
		self.0 = self.0.max(weight)
	}
	fn merge(&mut self, other: Self) {
		self.0 = self.0.max(other.0)
	}
	fn finalize(self) -> f32 {
		self.0
	}
}

let mut left = MaxWeight::default();
left.update(2.0);
let mut right = MaxWeight::default();
right.update(0.5);
left.merge(right);
assert_eq!(left.finalize(), 2.0);
```
*/
pub trait StreamingMetric<'a> {
	type Input;
	type Output;
	fn update(&mut self, input: Self::Input);
	fn merge(&mut self, other: Self);
	fn finalize(self) -> Self::Output;
}
