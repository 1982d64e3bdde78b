/*!
This crate trains gradient boosted tree models on a [`DataFrame`](../gbm_bridge_dataframe/struct.DataFrame.html) with an external boosting engine.

A caller describes a build with [`TrainOptions`](struct.TrainOptions.html), usually loaded from a JSON [`Config`](struct.Config.html), and runs it with [`train`](fn.train.html). The engine is reached only through the [`BoostingEngine`](trait.BoostingEngine.html) and [`Booster`](trait.Booster.html) traits. A build scores its model as it goes, stops early when its stopping metric stops improving, honors cancellation and a runtime limit, and publishes a [`ModelRecord`](struct.ModelRecord.html) to a [`ModelStore`](trait.ModelStore.html). Several builds can share the same frames with [`train_in_parallel`](fn.train_in_parallel.html).
*/

#![allow(clippy::tabs_in_doc_comments)]

mod cadence;
mod config;
mod control;
mod driver;
mod early_stopping;
mod engine;
mod id;
mod model;
mod options;
mod parallel;
mod table;
#[cfg(test)]
mod test_engine;
mod validate;
mod varimp;

pub use self::cadence::{ScoringCadence, ScoringTimes};
pub use self::config::{
	load_config, Backend, Config, Distribution, GrowPolicy, StoppingMetric, TreeMethod,
};
pub use self::control::{Clock, JobControl, ManualClock, SystemClock};
pub use self::driver::{train, Job, TrainOutput, TrainingFrames, TrainingState};
pub use self::early_stopping::stop_early;
pub use self::engine::{Booster, BoostingEngine, EngineError};
pub use self::id::{Id, ParseIdError};
pub use self::model::{
	load, publish, MemoryStore, MetricSnapshot, MetricValues, ModelRecord, ModelStore,
	RecordState, TerminalState,
};
pub use self::options::{BoosterParams, Task, TrainOptions};
pub use self::parallel::{train_in_parallel, BuildRequest};
pub use self::table::{
	model_summary_table, scoring_history_table, variable_importances_table, Table,
};
pub use self::validate::{validate, ValidationError, ValidationErrors};
pub use self::varimp::{compute_variable_importances, VariableImportance};
