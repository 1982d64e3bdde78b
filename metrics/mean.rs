use super::StreamingMetric;

/// The weighted arithmetic mean of a stream of `(value, weight)` pairs.
#[derive(Clone, Debug, Default)]
pub struct Mean {
	weighted_sum: f64,
	total_weight: f64,
}

impl Mean {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn total_weight(&self) -> f64 {
		self.total_weight
	}
}

impl StreamingMetric<'_> for Mean {
	type Input = (f32, f32);
	type Output = Option<f32>;

	fn update(&mut self, (value, weight): Self::Input) {
		// Observations without a usable weight or value do not count.
		if !weight.is_finite() || value.is_nan() {
			return;
		}
		self.weighted_sum += f64::from(value) * f64::from(weight);
		self.total_weight += f64::from(weight);
	}

	fn merge(&mut self, other: Self) {
		self.weighted_sum += other.weighted_sum;
		self.total_weight += other.total_weight;
	}

	fn finalize(self) -> Self::Output {
		if self.total_weight > 0.0 {
			Some((self.weighted_sum / self.total_weight) as f32)
		} else {
			None
		}
	}
}

#[test]
fn test_weighted_mean() {
	let mut mean = Mean::new();
	mean.update((1.0, 1.0));
	mean.update((4.0, 3.0));
	mean.update((100.0, 0.0));
	mean.update((100.0, std::f32::NAN));
	assert_eq!(mean.total_weight(), 4.0);
	assert_eq!(mean.finalize(), Some(3.25));
}

#[test]
fn test_empty_mean() {
	assert_eq!(Mean::new().finalize(), None);
	let mut a = Mean::new();
	a.update((2.0, 1.0));
	let mut b = Mean::new();
	b.update((4.0, 1.0));
	a.merge(b);
	assert_eq!(a.finalize(), Some(3.0));
}
