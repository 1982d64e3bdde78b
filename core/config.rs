/*!
This module defines the `Config` struct, which is read from a JSON file and converted into the [`TrainOptions`](../options/struct.TrainOptions.html) of a model build. Every field is optional. Fields that are absent take their default value.
*/

use anyhow::{Context, Result};
use gbm_bridge_features::{MatrixType, SparseFormat};
use std::{collections::BTreeMap, path::Path};

#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
	pub response_column: Option<String>,
	pub weight_column: Option<String>,
	pub fold_column: Option<String>,
	pub offset_column: Option<String>,
	pub matrix_type: Option<MatrixType>,
	pub sparse_format: Option<SparseFormat>,
	pub n_trees: Option<usize>,
	pub max_depth: Option<usize>,
	pub learn_rate: Option<f64>,
	pub col_sample_rate: Option<f64>,
	pub distribution: Option<Distribution>,
	pub grow_policy: Option<GrowPolicy>,
	pub tree_method: Option<TreeMethod>,
	pub backend: Option<Backend>,
	pub gpu_id: Option<usize>,
	pub score_each_iteration: Option<bool>,
	pub score_tree_interval: Option<usize>,
	/// milliseconds
	pub score_interval: Option<u64>,
	/// milliseconds
	pub initial_score_interval: Option<u64>,
	pub stopping_rounds: Option<usize>,
	pub stopping_metric: Option<StoppingMetric>,
	pub stopping_tolerance: Option<f64>,
	/// seconds, 0 disables the limit
	pub max_runtime_secs: Option<f64>,
	pub cluster_size: Option<usize>,
	pub max_parallel_builds: Option<usize>,
	/// These parameters are passed to the boosting engine as is, overriding the derived ones.
	pub booster_params: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
	Auto,
	Bernoulli,
	Multinomial,
	Gaussian,
	Poisson,
	Gamma,
	Tweedie,
}

impl std::fmt::Display for Distribution {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Distribution::Auto => "auto",
			Distribution::Bernoulli => "bernoulli",
			Distribution::Multinomial => "multinomial",
			Distribution::Gaussian => "gaussian",
			Distribution::Poisson => "poisson",
			Distribution::Gamma => "gamma",
			Distribution::Tweedie => "tweedie",
		};
		write!(f, "{}", s)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowPolicy {
	Depthwise,
	Lossguide,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeMethod {
	Auto,
	Exact,
	Approx,
	Hist,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
	Auto,
	Cpu,
	Gpu,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum StoppingMetric {
	#[serde(rename = "auto")]
	Auto,
	#[serde(rename = "logloss")]
	LogLoss,
	#[serde(rename = "mse")]
	MSE,
	#[serde(rename = "rmse")]
	RMSE,
	#[serde(rename = "mae")]
	MAE,
	#[serde(rename = "auc")]
	AUC,
	#[serde(rename = "misclassification")]
	Misclassification,
}

impl std::fmt::Display for StoppingMetric {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			StoppingMetric::Auto => "Auto",
			StoppingMetric::LogLoss => "Log Loss",
			StoppingMetric::MSE => "Mean Squared Error",
			StoppingMetric::RMSE => "Root Mean Squared Error",
			StoppingMetric::MAE => "Mean Absolute Error",
			StoppingMetric::AUC => "Area Under the Receiver Operating Characteristic Curve",
			StoppingMetric::Misclassification => "Misclassification Error",
		};
		write!(f, "{}", s)
	}
}

/// Read the config from the JSON file at `config_path`, if one is given.
pub fn load_config(config_path: Option<&Path>) -> Result<Option<Config>> {
	if let Some(config_path) = config_path {
		let config = std::fs::read_to_string(config_path)
			.with_context(|| format!("failed to read config file {}", config_path.display()))?;
		let config = serde_json::from_str(&config)
			.with_context(|| format!("failed to parse config file {}", config_path.display()))?;
		Ok(Some(config))
	} else {
		Ok(None)
	}
}

#[test]
fn test_parse_config() {
	let config: Config = serde_json::from_str(
		r#"{
			"response_column": "price",
			"weight_column": "w",
			"matrix_type": "sparse",
			"sparse_format": "csc",
			"n_trees": 20,
			"stopping_metric": "auc",
			"grow_policy": "lossguide",
			"tree_method": "hist",
			"booster_params": { "min_child_weight": 2 }
		}"#,
	)
	.unwrap();
	assert_eq!(config.response_column.as_deref(), Some("price"));
	assert_eq!(config.matrix_type, Some(MatrixType::Sparse));
	assert_eq!(config.sparse_format, Some(SparseFormat::Csc));
	assert_eq!(config.n_trees, Some(20));
	assert_eq!(config.stopping_metric, Some(StoppingMetric::AUC));
	assert_eq!(config.grow_policy, Some(GrowPolicy::Lossguide));
	assert_eq!(config.distribution, None);
	let booster_params = config.booster_params.unwrap();
	assert_eq!(booster_params["min_child_weight"], serde_json::json!(2));
}

#[test]
fn test_unknown_fields_are_rejected() {
	let result = serde_json::from_str::<Config>(r#"{ "ntrees": 20 }"#);
	assert!(result.is_err());
}

#[test]
fn test_load_config() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config.json");
	std::fs::write(&path, r#"{ "response_column": "y", "learn_rate": 0.1 }"#).unwrap();
	let config = load_config(Some(&path)).unwrap().unwrap();
	assert_eq!(config.learn_rate, Some(0.1));
	assert!(load_config(None).unwrap().is_none());
	let error = load_config(Some(&dir.path().join("missing.json"))).unwrap_err();
	assert!(error.to_string().starts_with("failed to read config file"));
}
