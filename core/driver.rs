/*!
This module drives a single model build: it validates the options, builds the training data, and then adds one tree per round until every tree is built, early stopping kicks in, the build runs out of time, or it is cancelled. Along the way it scores the model on the cadence of [`ScoringCadence`](../cadence/struct.ScoringCadence.html) and publishes an in-progress [`ModelRecord`](../model/struct.ModelRecord.html) after every scoring pass.
*/

use crate::{
	cadence::{ScoringCadence, ScoringTimes},
	control::{Clock, JobControl, SystemClock},
	early_stopping::stop_early,
	engine::{Booster, BoostingEngine},
	id::Id,
	model::{
		publish, MetricSnapshot, MetricValues, ModelRecord, ModelStore, RecordState, TerminalState,
	},
	options::{Task, TrainOptions},
	table::{model_summary_table, scoring_history_table, variable_importances_table},
	validate::validate,
	varimp::{compute_variable_importances, VariableImportance},
};
use anyhow::{format_err, Context, Result};
use gbm_bridge_dataframe::DataFrame;
use gbm_bridge_features::{
	build_training_data, choose_matrix_format, DataOptions, FeatureLayout, TrainingData,
};
use gbm_bridge_metrics::{
	ClassificationMetrics, ClassificationMetricsInput, Metric, RegressionMetrics,
	RegressionMetricsInput,
};
use gbm_bridge_progress::ProgressCounter;
use num_traits::ToPrimitive;
use std::{path::PathBuf, sync::Arc};

const FEATURE_MAP_FILENAME: &str = "featureMap.txt";

/// The frames a build reads. Builds never mutate them, so many builds can share the same frames.
#[derive(Clone, Copy, Debug)]
pub struct TrainingFrames<'a> {
	pub train: &'a DataFrame,
	pub valid: Option<&'a DataFrame>,
}

/// A `Job` is the handle a caller holds on a running build.
pub struct Job {
	pub model_id: Id,
	pub progress: ProgressCounter,
	pub control: JobControl,
	pub clock: Arc<dyn Clock>,
}

impl Job {
	pub fn new(n_trees: usize) -> Self {
		Self {
			model_id: Id::new(),
			progress: ProgressCounter::new(n_trees as u64),
			control: JobControl::new(),
			clock: Arc::new(SystemClock),
		}
	}

	pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
		self.clock = clock;
		self
	}
}

/// The mutable bookkeeping of a build, threaded through every round.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingState {
	pub n_trees: usize,
	/// `scored_train[i]` holds the training metrics of the model with `i` trees.
	pub scored_train: Vec<MetricSnapshot>,
	pub scored_valid: Option<Vec<MetricSnapshot>>,
	/// `training_time_ms[0]` is the start of the build and `training_time_ms[i]` is the time the `i`th round finished.
	pub training_time_ms: Vec<u64>,
	pub times: ScoringTimes,
	pub n_scoring_passes: usize,
	pub variable_importances: Vec<VariableImportance>,
}

impl TrainingState {
	fn new(start_ms: u64, has_valid: bool) -> Self {
		Self {
			n_trees: 0,
			scored_train: vec![MetricSnapshot::default()],
			scored_valid: if has_valid {
				Some(vec![MetricSnapshot::default()])
			} else {
				None
			},
			training_time_ms: vec![start_ms],
			times: ScoringTimes::default(),
			n_scoring_passes: 0,
			variable_importances: Vec::new(),
		}
	}

	fn finish_round(&mut self, now: u64) {
		self.n_trees += 1;
		self.scored_train.push(MetricSnapshot::default());
		if let Some(scored_valid) = self.scored_valid.as_mut() {
			scored_valid.push(MetricSnapshot::default());
		}
		self.training_time_ms.push(now);
	}

	/// Early stopping looks at the validation history when there is one.
	fn stopping_history(&self) -> &[MetricSnapshot] {
		self.scored_valid.as_deref().unwrap_or(&self.scored_train)
	}
}

#[derive(Debug)]
pub struct TrainOutput {
	pub model_id: Id,
	pub terminal_state: TerminalState,
	pub state: TrainingState,
	/// The final record. Cancelled builds do not persist one.
	pub record: Option<ModelRecord>,
}

struct Build<'a, B> {
	job: &'a Job,
	store: &'a dyn ModelStore,
	options: &'a TrainOptions,
	task: Task,
	layout: FeatureLayout,
	train: TrainingData,
	valid: Option<TrainingData>,
	booster: B,
	cadence: ScoringCadence,
	feature_map_path: PathBuf,
}

/**
Train a model with `engine` and publish it to `store`.

Configuration problems are returned as [`ValidationErrors`](../validate/struct.ValidationErrors.html) before any matrix is built. Matrix capacity and alignment problems, initial training failures, and prediction and serialization failures abort the build. The concrete error types can be recovered with `downcast_ref`.
*/
pub fn train<E>(
	engine: &E,
	store: &dyn ModelStore,
	job: &Job,
	frames: TrainingFrames,
	options: &TrainOptions,
) -> Result<TrainOutput>
where
	E: BoostingEngine,
{
	let start_ms = job.clock.now_millis();
	let layout = validate(engine, &frames, options)?;
	let task = frames
		.train
		.column(&options.response_column)
		.map(Task::from_response)
		.ok_or_else(|| format_err!("there is no response column"))?;

	// Build the training data.
	let excluded_columns = options.excluded_columns();
	let format = choose_matrix_format(
		frames.train,
		&layout,
		&excluded_columns,
		options.matrix_type,
		options.sparse_format,
	);
	let data_options = DataOptions {
		response_column: &options.response_column,
		weight_column: options.weight_column.as_deref(),
		format,
		buffer_options: options.buffer_options,
	};
	let train_data = build_training_data(frames.train, &layout, &data_options)
		.context("failed to build the training matrix")?;
	let valid_data = frames
		.valid
		.map(|valid| build_training_data(valid, &layout, &data_options))
		.transpose()
		.context("failed to build the validation matrix")?;

	// Write the feature map. The directory is removed when the build ends.
	let model_dir = tempfile::Builder::new()
		.prefix(&format!("gbm-model-{}", job.model_id))
		.tempdir()
		.context("failed to create the model directory")?;
	let feature_map_path = model_dir.path().join(FEATURE_MAP_FILENAME);
	layout
		.feature_map
		.write_to_path(&feature_map_path)
		.with_context(|| format!("failed to write {}", feature_map_path.display()))?;

	let params = options.create_params(&task);
	let booster = engine
		.initial_train(&train_data, &params)
		.context("failed to start training")?;

	let mut control = job.control.clone();
	if options.max_runtime_secs > 0.0 {
		let max_runtime_ms = (options.max_runtime_secs * 1000.0)
			.to_u64()
			.unwrap_or(u64::MAX);
		control.set_deadline(start_ms.saturating_add(max_runtime_ms));
	}

	let mut build = Build {
		job,
		store,
		options,
		task,
		layout,
		train: train_data,
		valid: valid_data,
		booster,
		cadence: ScoringCadence {
			score_each_iteration: options.score_each_iteration,
			score_tree_interval: options.score_tree_interval,
			score_interval: options.score_interval,
			initial_score_interval: options.initial_score_interval,
		},
		feature_map_path,
	};
	let mut state = TrainingState::new(start_ms, build.valid.is_some());
	let terminal_state = match build.run(&mut state, &control)? {
		Some(terminal_state) => terminal_state,
		None => {
			log::info!(
				"The build of model {} was cancelled after {} trees.",
				job.model_id,
				state.n_trees
			);
			return Ok(TrainOutput {
				model_id: job.model_id,
				terminal_state: TerminalState::Cancelled,
				state,
				record: None,
			});
		}
	};

	let booster_bytes = build
		.booster
		.serialize()
		.context("failed to serialize the booster")?;
	let record = build.record(
		&state,
		Some(booster_bytes),
		RecordState::Terminated(terminal_state),
	);
	publish(store, &record).context("failed to persist the model")?;
	log::info!(
		"The build of model {} is {} with {} trees.",
		job.model_id,
		terminal_state,
		state.n_trees
	);
	drop(model_dir);
	Ok(TrainOutput {
		model_id: job.model_id,
		terminal_state,
		state,
		record: Some(record),
	})
}

impl<'a, B> Build<'a, B>
where
	B: Booster,
{
	/// Run the boosting rounds. This returns `None` if the build was cancelled.
	fn run(
		&mut self,
		state: &mut TrainingState,
		control: &JobControl,
	) -> Result<Option<TerminalState>> {
		let job = self.job;
		let clock = job.clock.as_ref();
		let stopping_metric = self.options.stopping_metric.resolve(&self.task);
		for round in 0..self.options.n_trees {
			let scored = self.maybe_score(state, false)?;
			if scored
				&& stop_early(
					state.stopping_history(),
					self.options.stopping_rounds,
					stopping_metric,
					self.options.stopping_tolerance,
				) {
				log::info!(
					"Stopping early after {} trees because {} stopped improving.",
					state.n_trees,
					stopping_metric
				);
				self.maybe_score(state, true)?;
				self.job.progress.finish();
				return Ok(Some(TerminalState::StoppedEarly));
			}

			let round_start = clock.now_millis();
			if let Err(error) = self.booster.update(&self.train, round) {
				log::error!("Failed to build tree {}: {}", round + 1, error);
			}
			let now = clock.now_millis();
			log::info!(
				"{}. tree was built in {} ms.",
				round + 1,
				now.saturating_sub(round_start)
			);

			state.finish_round(now);
			self.job.progress.inc(1);

			let timed_out = control.is_timed_out(now);
			if control.is_cancel_requested() && !timed_out {
				return Ok(None);
			}
			if timed_out {
				log::info!(
					"The build ran out of time after {} trees.",
					state.n_trees
				);
				if !scored {
					self.maybe_score(state, true)?;
				}
				self.job.progress.finish();
				return Ok(Some(TerminalState::TimedOut));
			}
		}
		self.maybe_score(state, true)?;
		self.job.progress.finish();
		Ok(Some(TerminalState::Complete))
	}

	/// Score the model if the cadence allows it. This returns true if the model was scored.
	fn maybe_score(&self, state: &mut TrainingState, final_scoring: bool) -> Result<bool> {
		let clock = self.job.clock.as_ref();
		let now = clock.now_millis();
		if state.times.first_score.is_none() {
			state.times.first_score = Some(now);
		}
		self.job.progress.set_message(format!(
			"Built {} trees so far (out of {}).",
			state.n_trees, self.options.n_trees
		));
		if !self
			.cadence
			.should_score(now, state.times, state.n_trees, final_scoring)
		{
			return Ok(false);
		}

		state.times.last_score_start = Some(now);
		let train_metrics = self.compute_metrics(&self.train)?;
		let valid_metrics = self
			.valid
			.as_ref()
			.map(|valid| self.compute_metrics(valid))
			.transpose()?;
		if let Some(snapshot) = state.scored_train.last_mut() {
			*snapshot = MetricSnapshot {
				timestamp_ms: now,
				metrics: Some(train_metrics),
			};
		}
		if let (Some(scored_valid), Some(valid_metrics)) =
			(state.scored_valid.as_mut(), valid_metrics)
		{
			if let Some(snapshot) = scored_valid.last_mut() {
				*snapshot = MetricSnapshot {
					timestamp_ms: now,
					metrics: Some(valid_metrics),
				};
			}
		}
		state.times.last_score_end = Some(clock.now_millis());
		state.n_scoring_passes += 1;

		let scores = self
			.booster
			.feature_score(&self.feature_map_path)
			.context("failed to compute the feature scores")?;
		state.variable_importances =
			compute_variable_importances(&scores, &self.layout.feature_map);

		let record = self.record(state, None, RecordState::InProgress);
		publish(self.store, &record).context("failed to publish the model")?;
		log::info!("{}\n{}", record.model_summary, record.scoring_history);
		Ok(true)
	}

	fn compute_metrics(&self, data: &TrainingData) -> Result<MetricValues> {
		let predictions = self
			.booster
			.predict(&data.matrix)
			.context("failed to score the model")?;
		if predictions.nrows() != data.labels.len() || predictions.ncols() == 0 {
			return Err(format_err!(
				"the engine returned {} x {} predictions for {} rows",
				predictions.nrows(),
				predictions.ncols(),
				data.labels.len()
			));
		}
		let metrics = match self.task {
			Task::Regression => {
				let metrics = RegressionMetrics::compute(RegressionMetricsInput {
					predictions: predictions.column(0),
					labels: &data.labels,
					weights: &data.weights,
				});
				MetricValues {
					mse: metrics.mse,
					rmse: metrics.rmse,
					mae: metrics.mae,
					..Default::default()
				}
			}
			Task::Classification { .. } => {
				let metrics = ClassificationMetrics::compute(ClassificationMetricsInput {
					probabilities: predictions.view(),
					labels: &data.labels,
					weights: &data.weights,
				});
				MetricValues {
					logloss: metrics.logloss,
					classification_error: metrics.misclassification,
					auc: metrics.auc,
					..Default::default()
				}
			}
		};
		Ok(metrics)
	}

	fn record(
		&self,
		state: &TrainingState,
		booster: Option<Vec<u8>>,
		record_state: RecordState,
	) -> ModelRecord {
		let start_ms = state.training_time_ms.first().copied().unwrap_or(0);
		ModelRecord {
			model_id: self.job.model_id,
			state: record_state,
			booster,
			n_trees: state.n_trees,
			matrix_format: self.train.matrix.format(),
			feature_names: self.layout.feature_names.clone(),
			scored_train: state.scored_train.clone(),
			scored_valid: state.scored_valid.clone(),
			training_time_ms: state.training_time_ms.clone(),
			variable_importances: state.variable_importances.clone(),
			model_summary: model_summary_table(
				state.n_trees,
				self.layout.full_width(),
				self.train.matrix.format(),
			),
			scoring_history: scoring_history_table(
				&state.scored_train,
				state.scored_valid.as_deref(),
				start_ms,
			),
			variable_importances_table: variable_importances_table(&state.variable_importances),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		config::StoppingMetric,
		control::ManualClock,
		engine::EngineError,
		model::{load, MemoryStore},
		test_engine::{classification_frame, regression_frame, FakeEngine},
		validate::ValidationErrors,
	};

	fn setup(n_trees: usize) -> (Arc<ManualClock>, FakeEngine, Job, TrainOptions) {
		let clock = Arc::new(ManualClock::new(0));
		let engine = FakeEngine::new(clock.clone());
		let job = Job::new(n_trees).with_clock(clock.clone());
		let mut options = TrainOptions::new("y");
		options.n_trees = n_trees;
		(clock, engine, job, options)
	}

	fn scored_count(history: &[MetricSnapshot]) -> usize {
		history
			.iter()
			.filter(|snapshot| snapshot.metrics.is_some())
			.count()
	}

	#[test]
	fn test_complete_build() {
		let (_, engine, job, options) = setup(5);
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::Complete);
		assert_eq!(output.state.n_trees, 5);
		// The rounds at 0, 1000, 2000, and 3000 ms fall in the initial scoring window, then the final model is scored.
		assert_eq!(output.state.n_scoring_passes, 5);
		assert_eq!(engine.predict_calls(), 5);
		assert_eq!(output.state.scored_train.len(), 6);
		assert_eq!(scored_count(&output.state.scored_train), 5);
		assert!(output.state.scored_train[4].metrics.is_none());
		assert_eq!(output.state.training_time_ms, vec![0, 1000, 2000, 3000, 4000, 5000]);
		let last = output.state.scored_train[5].metrics.as_ref().unwrap();
		assert_eq!(last.mse, Some(25.0));
		assert_eq!(last.rmse, Some(5.0));
		assert!(last.logloss.is_none());
		assert!(job.progress.is_finished());
		assert_eq!(job.progress.get(), 5);
		assert_eq!(
			job.progress.message().unwrap(),
			"Built 5 trees so far (out of 5)."
		);
		let record = load(&store, job.model_id).unwrap().unwrap();
		assert_eq!(record.state, RecordState::Terminated(TerminalState::Complete));
		assert_eq!(record.booster.unwrap(), b"fake booster with 5 trees".to_vec());
		assert_eq!(record.scoring_history.rows.len(), 5);
		assert_eq!(record.feature_names, vec!["color.red", "color.blue", "color.missing(NA)", "x"]);
	}

	#[test]
	fn test_early_stopping_scores_once_more() {
		let (_, engine, job, mut options) = setup(20);
		options.score_each_iteration = true;
		options.stopping_rounds = 3;
		options.stopping_tolerance = 0.0;
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::StoppedEarly);
		// The error grows as 0, 1, 4, 9, so the fourth scoring pass stops the build.
		assert_eq!(output.state.n_trees, 3);
		assert_eq!(engine.predict_calls(), 5);
		assert_eq!(output.state.n_scoring_passes, 5);
		assert_eq!(job.progress.get(), 20);
		let record = output.record.unwrap();
		assert_eq!(record.state, RecordState::Terminated(TerminalState::StoppedEarly));
		assert_eq!(record.n_trees, 3);
	}

	#[test]
	fn test_early_stopping_prefers_validation() {
		let (_, mut engine, job, mut options) = setup(6);
		// Predictions approach the validation labels, so the validation error keeps falling.
		engine.step = -1.0;
		options.score_each_iteration = true;
		options.stopping_rounds = 2;
		options.stopping_metric = StoppingMetric::MAE;
		let frame = regression_frame(20);
		let valid = {
			let mut valid = regression_frame(10);
			if let gbm_bridge_dataframe::Column::Number(column) = &mut valid.columns[2] {
				column.data = vec![-10.0; 10];
			}
			valid
		};
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: Some(&valid),
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::Complete);
		assert_eq!(output.state.n_trees, 6);
		let scored_valid = output.state.scored_valid.unwrap();
		assert_eq!(scored_valid.len(), 7);
		assert_eq!(scored_valid[6].metrics.as_ref().unwrap().mae, Some(4.0));
		assert_eq!(engine.predict_calls(), 14);
	}

	#[test]
	fn test_update_failure_is_a_noop_round() {
		let (_, mut engine, job, options) = setup(4);
		engine.fail_rounds = vec![1, 2];
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::Complete);
		assert_eq!(output.state.n_trees, 4);
		assert_eq!(job.progress.get(), 4);
		assert_eq!(
			output.record.unwrap().booster.unwrap(),
			b"fake booster with 2 trees".to_vec()
		);
	}

	#[test]
	fn test_initial_train_failure_aborts() {
		let (_, mut engine, job, options) = setup(4);
		engine.fail_initial_train = true;
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let error = train(&engine, &store, &job, frames, &options).unwrap_err();
		assert!(error.downcast_ref::<EngineError>().is_some());
		assert!(load(&store, job.model_id).unwrap().is_none());
		assert_eq!(job.progress.get(), 0);
	}

	#[test]
	fn test_validation_frame_without_weights_is_rejected_up_front() {
		let (_, engine, job, mut options) = setup(4);
		options.weight_column = Some("w".to_owned());
		let mut frame = regression_frame(20);
		frame
			.columns
			.push(gbm_bridge_dataframe::Column::Number(
				gbm_bridge_dataframe::NumberColumn::new("w".to_owned(), vec![1.0; 20]),
			));
		let valid = regression_frame(10);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: Some(&valid),
		};
		let error = train(&engine, &store, &job, frames, &options).unwrap_err();
		let errors = error.downcast_ref::<ValidationErrors>().unwrap();
		assert_eq!(errors.fields(), vec!["validation_frame"]);
		assert!(load(&store, job.model_id).unwrap().is_none());
	}

	#[test]
	fn test_validation_errors_abort() {
		let (_, engine, job, mut options) = setup(4);
		options.learn_rate = 0.0;
		options.offset_column = Some("offset".to_owned());
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let error = train(&engine, &store, &job, frames, &options).unwrap_err();
		let errors = error.downcast_ref::<ValidationErrors>().unwrap();
		assert_eq!(errors.fields(), vec!["offset_column", "learn_rate"]);
		assert_eq!(engine.predict_calls(), 0);
	}

	#[test]
	fn test_cancel() {
		let (_, mut engine, job, mut options) = setup(10);
		engine.cancel_after_round = Some((1, job.control.clone()));
		options.score_each_iteration = true;
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::Cancelled);
		assert_eq!(output.state.n_trees, 2);
		assert!(output.record.is_none());
		// Rounds 0 and 1 were scored, and there is no final scoring pass.
		assert_eq!(engine.predict_calls(), 2);
		assert_eq!(job.progress.get(), 2);
		assert!(!job.progress.is_finished());
		let record = load(&store, job.model_id).unwrap().unwrap();
		assert_eq!(record.state, RecordState::InProgress);
		assert!(record.booster.is_none());
	}

	#[test]
	fn test_timeout() {
		let (_, engine, job, mut options) = setup(10);
		options.max_runtime_secs = 2.5;
		options.score_tree_interval = 100;
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::TimedOut);
		assert_eq!(output.state.n_trees, 3);
		// Round 0 and the final model are scored.
		assert_eq!(engine.predict_calls(), 2);
		assert!(job.progress.is_finished());
		let record = output.record.unwrap();
		assert_eq!(record.state, RecordState::Terminated(TerminalState::TimedOut));
		assert_eq!(record.booster.unwrap(), b"fake booster with 3 trees".to_vec());
	}

	#[test]
	fn test_timeout_wins_over_cancel() {
		let (_, mut engine, job, mut options) = setup(10);
		engine.cancel_after_round = Some((0, job.control.clone()));
		options.max_runtime_secs = 1.0;
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::TimedOut);
		assert_eq!(output.state.n_trees, 1);
		// Round 0 was scored before the timeout, so there is no extra final pass.
		assert_eq!(engine.predict_calls(), 1);
		assert!(output.record.is_some());
	}

	#[test]
	fn test_scoring_respects_duty_cycle() {
		let (_, mut engine, job, mut options) = setup(40);
		engine.tree_millis = 500;
		engine.predict_millis = 300;
		options.score_interval = 2000;
		options.initial_score_interval = 1000;
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.state.times.first_score, Some(0));
		let scored: Vec<u64> = output
			.state
			.scored_train
			.iter()
			.filter_map(|snapshot| snapshot.metrics.as_ref().map(|_| snapshot.timestamp_ms))
			.collect();
		// Each pass takes 300 ms, so after the first second a pass happens once more than 2000 ms have passed since the last one started. The last pass is the final one.
		assert_eq!(
			scored,
			vec![0, 800, 4100, 7400, 10700, 14000, 17300, 20600, 22400]
		);
		assert_eq!(output.state.n_scoring_passes, 9);
	}

	#[test]
	fn test_classification_build() {
		let clock = Arc::new(ManualClock::new(0));
		let engine = FakeEngine::new(clock.clone());
		let job = Job::new(3).with_clock(clock);
		let mut options = TrainOptions::new("label");
		options.n_trees = 3;
		options.score_each_iteration = true;
		let frame = classification_frame(30);
		let valid = classification_frame(12);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: Some(&valid),
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		assert_eq!(output.terminal_state, TerminalState::Complete);
		let record = output.record.unwrap();
		let metrics = record.last_scored().unwrap().metrics.clone().unwrap();
		assert!((metrics.logloss.unwrap() - std::f32::consts::LN_2).abs() < 1e-6);
		assert_eq!(metrics.auc, Some(0.5));
		assert!(metrics.mse.is_none());
		assert_eq!(record.variable_importances.len(), 1);
		assert_eq!(record.variable_importances[0].variable, "x");
		assert_eq!(record.variable_importances[0].scaled, 1.0);
	}

	#[test]
	fn test_feature_map_directory_is_removed() {
		let (_, engine, job, options) = setup(2);
		let frame = regression_frame(20);
		let store = MemoryStore::new();
		let frames = TrainingFrames {
			train: &frame,
			valid: None,
		};
		let output = train(&engine, &store, &job, frames, &options).unwrap();
		let path = engine.last_feature_map_path().unwrap();
		assert_eq!(path.file_name().unwrap(), FEATURE_MAP_FILENAME);
		let dir_name = path.parent().unwrap().file_name().unwrap().to_str().unwrap();
		assert!(dir_name.starts_with(&format!("gbm-model-{}", output.model_id)));
		assert!(!path.exists());
		let importances = output.record.unwrap().variable_importances;
		let variables: Vec<&str> = importances
			.iter()
			.map(|importance| importance.variable.as_str())
			.collect();
		assert_eq!(variables, vec!["x", "color.missing(NA)", "color.blue", "color.red"]);
	}
}
