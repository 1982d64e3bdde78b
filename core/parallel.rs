use crate::{
	driver::{train, Job, TrainOutput, TrainingFrames},
	engine::BoostingEngine,
	model::ModelStore,
	options::TrainOptions,
};
use anyhow::{Context, Result};
use rayon::prelude::*;

/// One build to run with [`train_in_parallel`](fn.train_in_parallel.html).
pub struct BuildRequest {
	pub job: Job,
	pub options: TrainOptions,
}

/**
Run every build in `requests` against the same `frames`, at most `max_parallel_builds` at a time. The builds share nothing but the frames, the engine, and the store. The result of each build is returned in the order of `requests`, and one failed build does not stop the others.
*/
pub fn train_in_parallel<E>(
	engine: &E,
	store: &dyn ModelStore,
	frames: TrainingFrames,
	requests: &[BuildRequest],
	max_parallel_builds: usize,
) -> Result<Vec<Result<TrainOutput>>>
where
	E: BoostingEngine + Sync,
{
	let n_threads = max_parallel_builds.max(1);
	log::info!(
		"Running {} model builds, {} at a time.",
		requests.len(),
		n_threads
	);
	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(n_threads)
		.build()
		.context("failed to create the build thread pool")?;
	let outputs: Vec<Result<TrainOutput>> = pool.install(|| {
		requests
			.par_iter()
			.map(|request| train(engine, store, &request.job, frames, &request.options))
			.collect()
	});
	Ok(outputs)
}

#[test]
fn test_parallel_builds_respect_the_limit() {
	use crate::{
		control::ManualClock,
		model::{load, MemoryStore, RecordState, TerminalState},
		test_engine::{regression_frame, FakeEngine},
	};
	use std::sync::Arc;
	let clock = Arc::new(ManualClock::new(0));
	let mut engine = FakeEngine::new(clock.clone());
	engine.tree_millis = 0;
	engine.sleep_millis = 5;
	let store = MemoryStore::new();
	let frame = regression_frame(20);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let requests: Vec<BuildRequest> = (0..6)
		.map(|_| {
			let mut options = TrainOptions::new("y");
			options.n_trees = 4;
			BuildRequest {
				job: Job::new(options.n_trees).with_clock(clock.clone()),
				options,
			}
		})
		.collect();
	let outputs = train_in_parallel(&engine, &store, frames, &requests, 2).unwrap();
	assert_eq!(outputs.len(), 6);
	for (request, output) in requests.iter().zip(outputs) {
		let output = output.unwrap();
		assert_eq!(output.model_id, request.job.model_id);
		assert_eq!(output.terminal_state, TerminalState::Complete);
		let record = load(&store, request.job.model_id).unwrap().unwrap();
		assert_eq!(record.state, RecordState::Terminated(TerminalState::Complete));
	}
	assert!(engine.max_active_builds() <= 2);
	assert!(engine.max_active_builds() >= 1);
}

#[test]
fn test_failed_build_does_not_stop_the_others() {
	use crate::{control::ManualClock, test_engine::FakeEngine};
	use std::sync::Arc;
	let clock = Arc::new(ManualClock::new(0));
	let engine = FakeEngine::new(clock.clone());
	let store = crate::model::MemoryStore::new();
	let frame = crate::test_engine::regression_frame(20);
	let frames = TrainingFrames {
		train: &frame,
		valid: None,
	};
	let mut bad_options = TrainOptions::new("y");
	bad_options.n_trees = 0;
	let mut good_options = TrainOptions::new("y");
	good_options.n_trees = 2;
	let requests = vec![
		BuildRequest {
			job: Job::new(0).with_clock(clock.clone()),
			options: bad_options,
		},
		BuildRequest {
			job: Job::new(2).with_clock(clock),
			options: good_options,
		},
	];
	let outputs = train_in_parallel(&engine, &store, frames, &requests, 2).unwrap();
	assert!(outputs[0].is_err());
	assert_eq!(outputs[1].as_ref().unwrap().state.n_trees, 2);
}
