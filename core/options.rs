use crate::config::{
	Backend, Config, Distribution, GrowPolicy, StoppingMetric, TreeMethod,
};
use anyhow::{format_err, Result};
use gbm_bridge_dataframe::Column;
use gbm_bridge_features::{BufferOptions, MatrixType, SparseFormat};
use std::collections::BTreeMap;

/// These are the parameters handed to the boosting engine.
pub type BoosterParams = BTreeMap<String, serde_json::Value>;

/// The options of a single model build.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainOptions {
	pub response_column: String,
	pub weight_column: Option<String>,
	pub fold_column: Option<String>,
	pub offset_column: Option<String>,
	pub matrix_type: MatrixType,
	pub sparse_format: SparseFormat,
	pub n_trees: usize,
	pub max_depth: usize,
	pub learn_rate: f64,
	pub col_sample_rate: f64,
	pub distribution: Distribution,
	pub grow_policy: GrowPolicy,
	pub tree_method: TreeMethod,
	pub backend: Backend,
	pub gpu_id: usize,
	pub score_each_iteration: bool,
	/// Score every this many trees. Zero enables the time based heuristic.
	pub score_tree_interval: usize,
	/// milliseconds
	pub score_interval: u64,
	/// milliseconds
	pub initial_score_interval: u64,
	/// Zero disables early stopping.
	pub stopping_rounds: usize,
	pub stopping_metric: StoppingMetric,
	pub stopping_tolerance: f64,
	/// seconds, 0 disables the limit
	pub max_runtime_secs: f64,
	/// The number of nodes the build would run on. Only single node builds are supported.
	pub cluster_size: usize,
	pub max_parallel_builds: usize,
	pub booster_params: BoosterParams,
	pub buffer_options: BufferOptions,
}

impl TrainOptions {
	pub fn new(response_column: impl Into<String>) -> Self {
		Self {
			response_column: response_column.into(),
			weight_column: None,
			fold_column: None,
			offset_column: None,
			matrix_type: MatrixType::Auto,
			sparse_format: SparseFormat::Csr,
			n_trees: 50,
			max_depth: 6,
			learn_rate: 0.3,
			col_sample_rate: 1.0,
			distribution: Distribution::Auto,
			grow_policy: GrowPolicy::Depthwise,
			tree_method: TreeMethod::Auto,
			backend: Backend::Auto,
			gpu_id: 0,
			score_each_iteration: false,
			score_tree_interval: 0,
			score_interval: 4000,
			initial_score_interval: 4000,
			stopping_rounds: 0,
			stopping_metric: StoppingMetric::Auto,
			stopping_tolerance: 1e-3,
			max_runtime_secs: 0.0,
			cluster_size: 1,
			max_parallel_builds: 2,
			booster_params: BoosterParams::new(),
			buffer_options: BufferOptions::default(),
		}
	}

	pub fn from_config(config: Config) -> Result<Self> {
		let response_column = config
			.response_column
			.ok_or_else(|| format_err!("the config must name a response column"))?;
		let defaults = Self::new(response_column);
		Ok(Self {
			weight_column: config.weight_column,
			fold_column: config.fold_column,
			offset_column: config.offset_column,
			matrix_type: config.matrix_type.unwrap_or(defaults.matrix_type),
			sparse_format: config.sparse_format.unwrap_or(defaults.sparse_format),
			n_trees: config.n_trees.unwrap_or(defaults.n_trees),
			max_depth: config.max_depth.unwrap_or(defaults.max_depth),
			learn_rate: config.learn_rate.unwrap_or(defaults.learn_rate),
			col_sample_rate: config.col_sample_rate.unwrap_or(defaults.col_sample_rate),
			distribution: config.distribution.unwrap_or(defaults.distribution),
			grow_policy: config.grow_policy.unwrap_or(defaults.grow_policy),
			tree_method: config.tree_method.unwrap_or(defaults.tree_method),
			backend: config.backend.unwrap_or(defaults.backend),
			gpu_id: config.gpu_id.unwrap_or(defaults.gpu_id),
			score_each_iteration: config
				.score_each_iteration
				.unwrap_or(defaults.score_each_iteration),
			score_tree_interval: config
				.score_tree_interval
				.unwrap_or(defaults.score_tree_interval),
			score_interval: config.score_interval.unwrap_or(defaults.score_interval),
			initial_score_interval: config
				.initial_score_interval
				.unwrap_or(defaults.initial_score_interval),
			stopping_rounds: config.stopping_rounds.unwrap_or(defaults.stopping_rounds),
			stopping_metric: config.stopping_metric.unwrap_or(defaults.stopping_metric),
			stopping_tolerance: config
				.stopping_tolerance
				.unwrap_or(defaults.stopping_tolerance),
			max_runtime_secs: config.max_runtime_secs.unwrap_or(defaults.max_runtime_secs),
			cluster_size: config.cluster_size.unwrap_or(defaults.cluster_size),
			max_parallel_builds: config
				.max_parallel_builds
				.unwrap_or(defaults.max_parallel_builds),
			booster_params: config.booster_params.unwrap_or_default(),
			..defaults
		})
	}

	/// The columns that never become features.
	pub fn excluded_columns(&self) -> Vec<&str> {
		let mut excluded = vec![self.response_column.as_str()];
		excluded.extend(self.weight_column.as_deref());
		excluded.extend(self.fold_column.as_deref());
		excluded.extend(self.offset_column.as_deref());
		excluded
	}

	/// Compute the parameters for the boosting engine. Entries of `booster_params` take precedence.
	pub fn create_params(&self, task: &Task) -> BoosterParams {
		let mut params = BoosterParams::new();
		let objective = match (self.distribution, task) {
			(Distribution::Bernoulli, _) => "binary:logistic",
			(Distribution::Multinomial, _) => "multi:softprob",
			(Distribution::Gaussian, _) => "reg:squarederror",
			(Distribution::Poisson, _) => "count:poisson",
			(Distribution::Gamma, _) => "reg:gamma",
			(Distribution::Tweedie, _) => "reg:tweedie",
			(Distribution::Auto, Task::Regression) => "reg:squarederror",
			(Distribution::Auto, Task::Classification { n_classes: 2 }) => "binary:logistic",
			(Distribution::Auto, Task::Classification { .. }) => "multi:softprob",
		};
		params.insert("objective".to_owned(), objective.into());
		if let Task::Classification { n_classes } = task {
			if objective == "multi:softprob" {
				params.insert("num_class".to_owned(), (*n_classes).into());
			}
		}
		params.insert("eta".to_owned(), self.learn_rate.into());
		params.insert("max_depth".to_owned(), self.max_depth.into());
		params.insert("colsample_bytree".to_owned(), self.col_sample_rate.into());
		let grow_policy = match self.grow_policy {
			GrowPolicy::Depthwise => "depthwise",
			GrowPolicy::Lossguide => "lossguide",
		};
		params.insert("grow_policy".to_owned(), grow_policy.into());
		let tree_method = match (self.backend, self.tree_method) {
			(Backend::Gpu, _) => "gpu_hist",
			(_, TreeMethod::Auto) => "auto",
			(_, TreeMethod::Exact) => "exact",
			(_, TreeMethod::Approx) => "approx",
			(_, TreeMethod::Hist) => "hist",
		};
		params.insert("tree_method".to_owned(), tree_method.into());
		if self.backend == Backend::Gpu {
			params.insert("gpu_id".to_owned(), self.gpu_id.into());
		}
		for (key, value) in self.booster_params.iter() {
			params.insert(key.clone(), value.clone());
		}
		params
	}
}

/// The task is determined by the type of the response column.
#[derive(Clone, Debug, PartialEq)]
pub enum Task {
	Regression,
	Classification { n_classes: usize },
}

impl Task {
	pub fn from_response(column: &Column) -> Self {
		match column {
			Column::Number(_) => Task::Regression,
			Column::Enum(column) => Task::Classification {
				n_classes: column.options.len(),
			},
		}
	}

	pub fn is_classification(&self) -> bool {
		matches!(self, Task::Classification { .. })
	}
}

#[test]
fn test_options_from_config() {
	let config: Config = serde_json::from_str(
		r#"{ "response_column": "y", "weight_column": "w", "n_trees": 7, "score_tree_interval": 2 }"#,
	)
	.unwrap();
	let options = TrainOptions::from_config(config).unwrap();
	assert_eq!(options.n_trees, 7);
	assert_eq!(options.score_tree_interval, 2);
	assert_eq!(options.score_interval, 4000);
	assert_eq!(options.learn_rate, 0.3);
	assert_eq!(options.max_parallel_builds, 2);
	assert_eq!(options.excluded_columns(), vec!["y", "w"]);
}

#[test]
fn test_config_without_response() {
	let error = TrainOptions::from_config(Config::default()).unwrap_err();
	assert_eq!(error.to_string(), "the config must name a response column");
}

#[test]
fn test_create_params() {
	let mut options = TrainOptions::new("y");
	options.learn_rate = 0.1;
	options
		.booster_params
		.insert("max_depth".to_owned(), serde_json::json!(3));
	let params = options.create_params(&Task::Classification { n_classes: 3 });
	assert_eq!(params["objective"], serde_json::json!("multi:softprob"));
	assert_eq!(params["num_class"], serde_json::json!(3));
	assert_eq!(params["eta"], serde_json::json!(0.1));
	assert_eq!(params["max_depth"], serde_json::json!(3));
	let params = options.create_params(&Task::Classification { n_classes: 2 });
	assert_eq!(params["objective"], serde_json::json!("binary:logistic"));
	assert!(!params.contains_key("num_class"));
}
