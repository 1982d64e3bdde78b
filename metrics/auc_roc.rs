use itertools::izip;
use std::cmp::Ordering;

/**
This function computes the area under the receiver operating characteristic curve using the trapezoid method. `labels` hold 0 or 1 and every example counts with its weight. Examples with a missing probability, label, or weight are ignored.

Returns `None` when the examples do not include both classes.
*/
pub fn auc_roc(probabilities: &[f32], labels: &[f32], weights: &[f32]) -> Option<f32> {
	let roc_curve = compute_roc_curve(probabilities, labels, weights)?;
	// compute the riemann sum of the roc curve
	let auc = roc_curve
		.windows(2)
		.map(|pair| {
			let left = &pair[0];
			let right = &pair[1];
			let y_average = (left.true_positive_rate + right.true_positive_rate) / 2.0;
			let dx = right.false_positive_rate - left.false_positive_rate;
			y_average * dx
		})
		.sum();
	Some(auc)
}

#[derive(Debug, PartialEq)]
pub struct RocCurvePoint {
	/// Examples with a probability of at least `threshold` are predicted positive.
	pub threshold: f32,
	/// The true positive rate for all predictions with probability >= threshold.
	pub true_positive_rate: f32,
	/// The false positive rate for all predictions with probability >= threshold.
	pub false_positive_rate: f32,
}

/// This function computes the ROC curve. The ROC curve plots the false positive rate on the x axis and the true positive rate on the y axis for various classification thresholds.
pub fn compute_roc_curve(
	probabilities: &[f32],
	labels: &[f32],
	weights: &[f32],
) -> Option<Vec<RocCurvePoint>> {
	let mut tps_fps = compute_tps_fps_by_threshold(probabilities, labels, weights);
	for i in 1..tps_fps.len() {
		tps_fps[i].true_positives += tps_fps[i - 1].true_positives;
		tps_fps[i].false_positives += tps_fps[i - 1].false_positives;
	}
	let last = tps_fps.last()?;
	let total_positives = last.true_positives;
	let total_negatives = last.false_positives;
	if total_positives <= 0.0 || total_negatives <= 0.0 {
		return None;
	}
	// The curve starts at (0, 0).
	let mut roc_curve = vec![RocCurvePoint {
		threshold: 1.0,
		true_positive_rate: 0.0,
		false_positive_rate: 0.0,
	}];
	for point in tps_fps.iter() {
		roc_curve.push(RocCurvePoint {
			threshold: point.threshold,
			true_positive_rate: (point.true_positives / total_positives) as f32,
			false_positive_rate: (point.false_positives / total_negatives) as f32,
		});
	}
	Some(roc_curve)
}

#[derive(Debug)]
struct TpsFpsPoint {
	threshold: f32,
	true_positives: f64,
	false_positives: f64,
}

/// Compute the weight of true positives and false positives at each distinct threshold, from the highest threshold to the lowest.
fn compute_tps_fps_by_threshold(
	probabilities: &[f32],
	labels: &[f32],
	weights: &[f32],
) -> Vec<TpsFpsPoint> {
	let mut examples: Vec<(f32, bool, f64)> = izip!(probabilities, labels, weights)
		.filter(|(probability, label, weight)| {
			!probability.is_nan() && !label.is_nan() && weight.is_finite()
		})
		.map(|(probability, label, weight)| (*probability, *label >= 0.5, f64::from(*weight)))
		.collect();
	examples.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
	let mut tps_fps: Vec<TpsFpsPoint> = Vec::new();
	for (probability, positive, weight) in examples {
		let (tp, fp) = if positive { (weight, 0.0) } else { (0.0, weight) };
		match tps_fps.last_mut() {
			// examples with the same probability share a threshold
			Some(last) if last.threshold == probability => {
				last.true_positives += tp;
				last.false_positives += fp;
			}
			_ => tps_fps.push(TpsFpsPoint {
				threshold: probability,
				true_positives: tp,
				false_positives: fp,
			}),
		}
	}
	tps_fps
}

#[test]
fn test_roc_curve_groups_ties() {
	let probabilities = [0.8, 0.8, 0.6, 0.3, 0.1];
	let labels = [0.0, 1.0, 1.0, 0.0, 1.0];
	let weights = [1.0; 5];
	let roc_curve = compute_roc_curve(&probabilities, &labels, &weights).unwrap();
	let points: Vec<(f32, f32, f32)> = roc_curve
		.iter()
		.map(|point| {
			(
				point.threshold,
				point.false_positive_rate,
				point.true_positive_rate,
			)
		})
		.collect();
	let expected = [
		(1.0, 0.0, 0.0),
		(0.8, 0.5, 1.0 / 3.0),
		(0.6, 0.5, 2.0 / 3.0),
		(0.3, 1.0, 2.0 / 3.0),
		(0.1, 1.0, 1.0),
	];
	assert_eq!(points.len(), expected.len());
	for (point, expected) in points.iter().zip(expected.iter()) {
		assert_eq!(point.0, expected.0);
		assert!((point.1 - expected.1).abs() < 1e-6);
		assert!((point.2 - expected.2).abs() < 1e-6);
	}
	let auc = auc_roc(&probabilities, &labels, &weights).unwrap();
	assert!((auc - 5.0 / 12.0).abs() < 1e-6);
}

#[test]
fn test_auc() {
	let probabilities = [0.9, 0.4, 0.4, 0.2];
	let labels = [1.0, 1.0, 0.0, 0.0];
	let auc = auc_roc(&probabilities, &labels, &[1.0; 4]).unwrap();
	assert!((auc - 0.875).abs() < 1e-6);
}

#[test]
fn test_weighted_auc() {
	let labels = vec![1.0, 1.0, 0.0, 0.0];
	let probabilities = vec![0.9, 0.4, 0.4, 0.2];
	let weights = vec![2.0, 1.0, 1.0, 1.0];
	let auc = auc_roc(&probabilities, &labels, &weights).unwrap();
	assert!((auc - 11.0 / 12.0).abs() < 1e-6);
}

#[test]
fn test_auc_needs_both_classes() {
	assert_eq!(auc_roc(&[0.1, 0.7], &[1.0, 1.0], &[1.0, 1.0]), None);
	assert_eq!(auc_roc(&[], &[], &[]), None);
}
