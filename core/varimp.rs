use fnv::FnvHashMap;
use gbm_bridge_features::FeatureMap;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VariableImportance {
	pub variable: String,
	/// The raw score reported by the boosting engine.
	pub relative: f32,
	/// The score divided by the largest score.
	pub scaled: f32,
	/// The score divided by the sum of all scores.
	pub percentage: f32,
}

/// Compute the importance of every feature in `feature_map` from the engine's `scores`, most important first. Features without a score have importance zero.
pub fn compute_variable_importances(
	scores: &FnvHashMap<String, f32>,
	feature_map: &FeatureMap,
) -> Vec<VariableImportance> {
	let relative: Vec<(String, f32)> = feature_map
		.entries
		.iter()
		.map(|entry| {
			let score = scores
				.get(&entry.name)
				.copied()
				.filter(|score| score.is_finite())
				.unwrap_or(0.0);
			(entry.name.clone(), score)
		})
		.collect();
	let max = relative
		.iter()
		.map(|(_, score)| *score)
		.fold(0.0f32, f32::max);
	let sum: f32 = relative.iter().map(|(_, score)| *score).sum();
	let mut importances: Vec<VariableImportance> = relative
		.into_iter()
		.map(|(variable, relative)| VariableImportance {
			variable,
			relative,
			scaled: if max > 0.0 { relative / max } else { 0.0 },
			percentage: if sum > 0.0 { relative / sum } else { 0.0 },
		})
		.collect();
	importances.sort_by(|a, b| {
		b.relative
			.partial_cmp(&a.relative)
			.unwrap_or(Ordering::Equal)
	});
	importances
}

#[test]
fn test_variable_importances() {
	use gbm_bridge_features::{FeatureMapEntry, FeatureType};
	let feature_map = FeatureMap {
		entries: ["color.red", "color.blue", "age"]
			.iter()
			.enumerate()
			.map(|(index, name)| FeatureMapEntry {
				index,
				name: (*name).to_owned(),
				feature_type: FeatureType::Indicator,
			})
			.collect(),
	};
	let scores: FnvHashMap<String, f32> = maplit::hashmap! {
		"age".to_owned() => 6.0,
		"color.red".to_owned() => 2.0,
	}
	.into_iter()
	.collect();
	let importances = compute_variable_importances(&scores, &feature_map);
	let variables: Vec<&str> = importances
		.iter()
		.map(|importance| importance.variable.as_str())
		.collect();
	assert_eq!(variables, vec!["age", "color.red", "color.blue"]);
	assert_eq!(importances[0].scaled, 1.0);
	assert_eq!(importances[1].percentage, 0.25);
	assert_eq!(importances[2].relative, 0.0);
}
