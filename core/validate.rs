use crate::{
	config::{Backend, Distribution, GrowPolicy, TreeMethod},
	driver::TrainingFrames,
	engine::BoostingEngine,
	options::{Task, TrainOptions},
};
use gbm_bridge_dataframe::{Column, DataFrame};
use gbm_bridge_features::{BuildError, FeatureLayout, MatrixType, SparseFormat};

#[derive(Clone, Debug, PartialEq)]
pub struct ValidationError {
	pub field: &'static str,
	pub message: String,
}

/// Every problem found with the options of a model build, reported together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValidationErrors {
	pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
	pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
		self.errors.push(ValidationError {
			field,
			message: message.into(),
		});
	}

	pub fn is_empty(&self) -> bool {
		self.errors.is_empty()
	}

	pub fn len(&self) -> usize {
		self.errors.len()
	}

	pub fn fields(&self) -> Vec<&'static str> {
		self.errors.iter().map(|error| error.field).collect()
	}
}

impl std::fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "Illegal argument(s) for the model build:")?;
		for error in self.errors.iter() {
			write!(f, "\n  {}: {}", error.field, error.message)?;
		}
		Ok(())
	}
}

impl std::error::Error for ValidationErrors {}

/**
Check `options` against `frames` and `engine` before any matrix is built. On success this returns the feature layout of the training frame.
*/
pub fn validate<E>(
	engine: &E,
	frames: &TrainingFrames,
	options: &TrainOptions,
) -> Result<FeatureLayout, ValidationErrors>
where
	E: BoostingEngine,
{
	let mut errors = ValidationErrors::default();
	if options.cluster_size > 1 {
		errors.push(
			"cluster_size",
			format!(
				"Training is only supported on a single node, but the build was configured for {} nodes.",
				options.cluster_size
			),
		);
	}
	match frames.train.column(&options.response_column) {
		None => errors.push(
			"response_column",
			format!(
				"There is no column named \"{}\" in the training frame.",
				options.response_column
			),
		),
		Some(response) => {
			if response.missing_count() > 0 {
				errors.push(
					"response_column",
					"The response contains missing values, which are not supported.",
				);
			}
			validate_distribution(
				options.distribution,
				&Task::from_response(response),
				&mut errors,
			);
		}
	}
	if let Some(valid) = frames.valid {
		if valid.column(&options.response_column).is_none() {
			errors.push(
				"validation_frame",
				format!(
					"There is no column named \"{}\" in the validation frame.",
					options.response_column
				),
			);
		}
	}
	if let Some(weight_column) = options.weight_column.as_deref() {
		match frames.train.column(weight_column) {
			None => errors.push(
				"weight_column",
				format!("There is no column named \"{}\".", weight_column),
			),
			Some(column) if column.as_number().is_none() => errors.push(
				"weight_column",
				BuildError::NonNumericWeights(weight_column.to_owned()).to_string(),
			),
			Some(_) => {}
		}
	}
	if options.offset_column.is_some() {
		errors.push("offset_column", "Offset is not supported.");
	}
	if !(options.learn_rate > 0.0 && options.learn_rate <= 1.0) {
		errors.push("learn_rate", "learn_rate must be between 0 (exclusive) and 1 (inclusive).");
	}
	if !(options.col_sample_rate > 0.0 && options.col_sample_rate <= 1.0) {
		errors.push(
			"col_sample_rate",
			"col_sample_rate must be between 0 (exclusive) and 1 (inclusive).",
		);
	}
	if options.grow_policy == GrowPolicy::Lossguide && options.tree_method != TreeMethod::Hist {
		errors.push("grow_policy", "grow_policy=lossguide requires tree_method=hist.");
	}
	if options.n_trees == 0 {
		errors.push("n_trees", "n_trees must be positive.");
	}
	if options.backend == Backend::Gpu && !engine.gpu_available(options.gpu_id) {
		errors.push(
			"backend",
			format!("GPU backend (gpu_id: {}) is not functional.", options.gpu_id),
		);
	}
	let layout = match FeatureLayout::compute(frames.train, &options.excluded_columns()) {
		Ok(layout) => Some(layout),
		Err(error) => {
			errors.push("training_frame", error.to_string());
			None
		}
	};
	if let Some(layout) = layout.as_ref() {
		if layout.full_width() == 0 {
			errors.push("training_frame", "There are no feature columns to train on.");
		}
		if options.sparse_format == SparseFormat::Csc
			&& options.matrix_type != MatrixType::Dense
			&& layout.cat_count() > 0
		{
			errors.push(
				"sparse_format",
				BuildError::CscWithCategoricals(layout.cat_count()).to_string(),
			);
		}
		if let Some(valid) = frames.valid {
			validate_validation_frame(frames.train, valid, layout, options, &mut errors);
		}
	}
	match layout {
		Some(layout) if errors.is_empty() => Ok(layout),
		_ => Err(errors),
	}
}

/// The validation matrix is built with the layout of the training frame, so the validation frame needs every column the training matrix reads, with the same types.
fn validate_validation_frame(
	train: &DataFrame,
	valid: &DataFrame,
	layout: &FeatureLayout,
	options: &TrainOptions,
	errors: &mut ValidationErrors,
) {
	if let (Some(Column::Enum(train_response)), Some(valid_response)) = (
		train.column(&options.response_column),
		valid.column(&options.response_column),
	) {
		match valid_response {
			Column::Enum(valid_response) if valid_response.options == train_response.options => {}
			_ => errors.push(
				"validation_frame",
				format!(
					"The response column \"{}\" of the validation frame must be an enum column with the options {:?}.",
					options.response_column, train_response.options
				),
			),
		}
	}
	if let Some(weight_column) = options.weight_column.as_deref() {
		match valid.column(weight_column) {
			Some(Column::Number(_)) => {}
			Some(_) => errors.push(
				"validation_frame",
				format!(
					"The weight column \"{}\" of the validation frame must be a number column.",
					weight_column
				),
			),
			None => errors.push(
				"validation_frame",
				format!(
					"There is no column named \"{}\" in the validation frame.",
					weight_column
				),
			),
		}
	}
	let expected_columns = layout
		.cat_columns
		.iter()
		.map(|name| (name, "an enum"))
		.chain(layout.num_columns.iter().map(|name| (name, "a number")));
	for (name, expected_type) in expected_columns {
		match (valid.column(name), expected_type) {
			(Some(Column::Enum(_)), "an enum") | (Some(Column::Number(_)), "a number") => {}
			(Some(_), _) => errors.push(
				"validation_frame",
				format!(
					"The column \"{}\" of the validation frame must be {} column.",
					name, expected_type
				),
			),
			(None, _) => errors.push(
				"validation_frame",
				format!("There is no column named \"{}\" in the validation frame.", name),
			),
		}
	}
}

fn validate_distribution(distribution: Distribution, task: &Task, errors: &mut ValidationErrors) {
	match (distribution, task) {
		(Distribution::Auto, _) => {}
		(Distribution::Bernoulli, Task::Classification { n_classes: 2 }) => {}
		(Distribution::Bernoulli, _) => errors.push(
			"distribution",
			"Binomial requires the response to be a 2-class categorical.",
		),
		(Distribution::Multinomial, Task::Classification { .. }) => {}
		(Distribution::Multinomial, Task::Regression) => errors.push(
			"distribution",
			"Multinomial requires a categorical response.",
		),
		(_, Task::Classification { .. }) => errors.push(
			"distribution",
			format!("The {} distribution requires a numeric response.", distribution),
		),
		(_, Task::Regression) => {}
	}
}

#[cfg(test)]
fn fake_engine() -> crate::test_engine::FakeEngine {
	use crate::control::ManualClock;
	use std::sync::Arc;
	crate::test_engine::FakeEngine::new(Arc::new(ManualClock::new(0)))
}

#[test]
fn test_valid_options() {
	let frame = crate::test_engine::regression_frame(10);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let layout = validate(&fake_engine(), &frames, &TrainOptions::new("y")).unwrap();
	assert_eq!(layout.cat_columns, vec!["color"]);
	assert_eq!(layout.num_columns, vec!["x"]);
}

#[test]
fn test_errors_are_reported_together() {
	let frame = crate::test_engine::regression_frame(10);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let mut options = TrainOptions::new("y");
	options.cluster_size = 3;
	options.offset_column = Some("offset".to_owned());
	options.learn_rate = 2.0;
	options.col_sample_rate = 0.0;
	options.grow_policy = GrowPolicy::Lossguide;
	options.distribution = Distribution::Bernoulli;
	options.n_trees = 0;
	options.backend = Backend::Gpu;
	options.weight_column = Some("color".to_owned());
	let errors = validate(&fake_engine(), &frames, &options).unwrap_err();
	assert_eq!(
		errors.fields(),
		vec![
			"cluster_size",
			"distribution",
			"weight_column",
			"offset_column",
			"learn_rate",
			"col_sample_rate",
			"grow_policy",
			"n_trees",
			"backend",
		]
	);
	assert!(errors.to_string().contains("offset_column: Offset is not supported."));
}

#[test]
fn test_response_checks() {
	use gbm_bridge_dataframe::NumberColumn;
	let frame = DataFrame::new(vec![
		Column::Number(NumberColumn::new("x".to_owned(), vec![1.0, 2.0])),
		Column::Number(NumberColumn::new("y".to_owned(), vec![1.0, std::f32::NAN])),
	]);
	let valid = crate::test_engine::classification_frame(2);
	let frames = TrainingFrames {
		train: &frame,
		valid: Some(&valid),
	};
	let errors = validate(&fake_engine(), &frames, &TrainOptions::new("y")).unwrap_err();
	assert_eq!(errors.fields(), vec!["response_column", "validation_frame"]);
	// The validation frame also lacks "y", which is a feature column when the response is "z".
	let errors = validate(&fake_engine(), &frames, &TrainOptions::new("z")).unwrap_err();
	assert_eq!(
		errors.fields(),
		vec!["response_column", "validation_frame", "validation_frame"]
	);
}

#[test]
fn test_csc_with_categoricals() {
	let frame = crate::test_engine::regression_frame(10);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let mut options = TrainOptions::new("y");
	options.sparse_format = SparseFormat::Csc;
	let errors = validate(&fake_engine(), &frames, &options).unwrap_err();
	assert_eq!(errors.fields(), vec!["sparse_format"]);
	options.matrix_type = MatrixType::Dense;
	assert!(validate(&fake_engine(), &frames, &options).is_ok());
	let frame = crate::test_engine::classification_frame(10);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let mut options = TrainOptions::new("label");
	options.sparse_format = SparseFormat::Csc;
	assert!(validate(&fake_engine(), &frames, &options).is_ok());
}

#[test]
fn test_distribution_checks() {
	let frame = crate::test_engine::classification_frame(10);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let mut options = TrainOptions::new("label");
	options.distribution = Distribution::Bernoulli;
	assert!(validate(&fake_engine(), &frames, &options).is_ok());
	options.distribution = Distribution::Poisson;
	let errors = validate(&fake_engine(), &frames, &options).unwrap_err();
	assert_eq!(
		errors.errors[0].message,
		"The poisson distribution requires a numeric response."
	);
}

#[test]
fn test_no_feature_columns() {
	use gbm_bridge_dataframe::NumberColumn;
	let frame = DataFrame::new(vec![Column::Number(NumberColumn::new(
		"y".to_owned(),
		vec![1.0, 2.0],
	))]);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let errors = validate(&fake_engine(), &frames, &TrainOptions::new("y")).unwrap_err();
	assert_eq!(errors.fields(), vec!["training_frame"]);
}

#[test]
fn test_validation_frame_columns() {
	use gbm_bridge_dataframe::{EnumColumn, NumberColumn};
	let mut train = crate::test_engine::regression_frame(4);
	train.columns.push(Column::Number(NumberColumn::new(
		"w".to_owned(),
		vec![1.0; 4],
	)));
	// "x" is an enum column here, and "color" and "w" are absent.
	let valid = DataFrame::new(vec![
		Column::Enum(EnumColumn::from_values(
			"x".to_owned(),
			vec!["a".to_owned()],
			&[Some("a"), Some("a")],
		)),
		Column::Number(NumberColumn::new("y".to_owned(), vec![0.0, 1.0])),
	]);
	let frames = TrainingFrames {
		train: &train,
		valid: Some(&valid),
	};
	let mut options = TrainOptions::new("y");
	options.weight_column = Some("w".to_owned());
	let errors = validate(&fake_engine(), &frames, &options).unwrap_err();
	let messages: Vec<&str> = errors
		.errors
		.iter()
		.map(|error| error.message.as_str())
		.collect();
	assert_eq!(
		messages,
		vec![
			"There is no column named \"w\" in the validation frame.",
			"There is no column named \"color\" in the validation frame.",
			"The column \"x\" of the validation frame must be a number column.",
		]
	);
	assert_eq!(errors.fields(), vec!["validation_frame"; 3]);
}

#[test]
fn test_validation_response_options_must_match() {
	use gbm_bridge_dataframe::{EnumColumn, NumberColumn};
	let train = crate::test_engine::classification_frame(6);
	let valid = DataFrame::new(vec![
		Column::Number(NumberColumn::new("x".to_owned(), vec![1.0, 2.0])),
		Column::Enum(EnumColumn::from_values(
			"label".to_owned(),
			vec!["yes".to_owned(), "no".to_owned()],
			&[Some("yes"), Some("no")],
		)),
	]);
	let frames = TrainingFrames {
		train: &train,
		valid: Some(&valid),
	};
	let errors = validate(&fake_engine(), &frames, &TrainOptions::new("label")).unwrap_err();
	assert_eq!(errors.fields(), vec!["validation_frame"]);
	let same = crate::test_engine::classification_frame(3);
	let frames = TrainingFrames {
		train: &train,
		valid: Some(&same),
	};
	assert!(validate(&fake_engine(), &frames, &TrainOptions::new("label")).is_ok());
}
