/*!
This module defines the `ModelRecord`, the persisted output of a model build, and the `ModelStore` that records are published to. A build publishes an in-progress record every time it scores, and the final record when it terminates.
*/

use crate::{id::Id, table::Table, varimp::VariableImportance};
use anyhow::{format_err, Result};
use fnv::FnvHashMap;
use gbm_bridge_features::MatrixFormat;
use std::sync::Mutex;

/// The metrics recorded by one scoring pass. Each metric is absent when it does not apply to the task or could not be computed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricValues {
	pub mse: Option<f32>,
	pub rmse: Option<f32>,
	pub mae: Option<f32>,
	pub logloss: Option<f32>,
	pub classification_error: Option<f32>,
	pub auc: Option<f32>,
}

/// The metrics of the model with a given number of trees. `metrics` is `None` until the model with that many trees is scored.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MetricSnapshot {
	pub timestamp_ms: u64,
	pub metrics: Option<MetricValues>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum TerminalState {
	/// Every requested tree was built.
	Complete,
	StoppedEarly,
	Cancelled,
	TimedOut,
}

impl std::fmt::Display for TerminalState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			TerminalState::Complete => "complete",
			TerminalState::StoppedEarly => "stopped-early",
			TerminalState::Cancelled => "cancelled",
			TerminalState::TimedOut => "timed-out",
		};
		write!(f, "{}", s)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum RecordState {
	InProgress,
	Terminated(TerminalState),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ModelRecord {
	pub model_id: Id,
	pub state: RecordState,
	/// The serialized booster. In-progress records do not carry one.
	pub booster: Option<Vec<u8>>,
	pub n_trees: usize,
	pub matrix_format: MatrixFormat,
	pub feature_names: Vec<String>,
	/// `scored_train[i]` holds the training metrics of the model with `i` trees.
	pub scored_train: Vec<MetricSnapshot>,
	pub scored_valid: Option<Vec<MetricSnapshot>>,
	/// `training_time_ms[i]` is the time the `i`th tree was finished, and `training_time_ms[0]` is the start of training.
	pub training_time_ms: Vec<u64>,
	pub variable_importances: Vec<VariableImportance>,
	pub model_summary: Table,
	pub scoring_history: Table,
	pub variable_importances_table: Table,
}

const MAJOR_VERSION: u8 = 0;

impl ModelRecord {
	/// Serialize this record behind a one byte major version.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut bytes = vec![MAJOR_VERSION];
		rmp_serde::encode::write_named(&mut bytes, self)?;
		Ok(bytes)
	}

	/// Deserialize a `ModelRecord` from a slice.
	pub fn from_slice(slice: &[u8]) -> Result<Self> {
		let (major_version, slice) = slice
			.split_first()
			.ok_or_else(|| format_err!("the model record is empty"))?;
		if *major_version != MAJOR_VERSION {
			return Err(format_err!("unknown major version {}", major_version));
		}
		let record: Self = rmp_serde::from_slice(slice)?;
		Ok(record)
	}

	/// The last snapshot that holds metrics, preferring validation metrics.
	pub fn last_scored(&self) -> Option<&MetricSnapshot> {
		let history = self.scored_valid.as_ref().unwrap_or(&self.scored_train);
		history
			.iter()
			.rev()
			.find(|snapshot| snapshot.metrics.is_some())
	}
}

/// A key value store for serialized model records.
pub trait ModelStore: Send + Sync {
	fn put(&self, model_id: Id, bytes: Vec<u8>) -> Result<()>;
	fn get(&self, model_id: Id) -> Result<Option<Vec<u8>>>;
}

/// Serialize `record` and write it to `store` under its model id.
pub fn publish(store: &dyn ModelStore, record: &ModelRecord) -> Result<()> {
	store.put(record.model_id, record.to_bytes()?)
}

pub fn load(store: &dyn ModelStore, model_id: Id) -> Result<Option<ModelRecord>> {
	store
		.get(model_id)?
		.map(|bytes| ModelRecord::from_slice(&bytes))
		.transpose()
}

#[derive(Debug, Default)]
pub struct MemoryStore {
	records: Mutex<FnvHashMap<Id, Vec<u8>>>,
}

impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

impl ModelStore for MemoryStore {
	fn put(&self, model_id: Id, bytes: Vec<u8>) -> Result<()> {
		let mut records = self
			.records
			.lock()
			.map_err(|_| format_err!("the model store lock is poisoned"))?;
		records.insert(model_id, bytes);
		Ok(())
	}

	fn get(&self, model_id: Id) -> Result<Option<Vec<u8>>> {
		let records = self
			.records
			.lock()
			.map_err(|_| format_err!("the model store lock is poisoned"))?;
		Ok(records.get(&model_id).cloned())
	}
}

#[cfg(test)]
fn test_record() -> ModelRecord {
	use crate::table::{model_summary_table, scoring_history_table, variable_importances_table};
	let scored_train = vec![
		MetricSnapshot {
			timestamp_ms: 100,
			metrics: Some(MetricValues {
				mse: Some(4.0),
				rmse: Some(2.0),
				..Default::default()
			}),
		},
		MetricSnapshot::default(),
	];
	let variable_importances = vec![VariableImportance {
		variable: "x".to_owned(),
		relative: 3.0,
		scaled: 1.0,
		percentage: 1.0,
	}];
	ModelRecord {
		model_id: Id::new(),
		state: RecordState::Terminated(TerminalState::Complete),
		booster: Some(vec![1, 2, 3]),
		n_trees: 1,
		matrix_format: MatrixFormat::Dense,
		feature_names: vec!["x".to_owned()],
		scoring_history: scoring_history_table(&scored_train, None, 100),
		scored_train,
		scored_valid: None,
		training_time_ms: vec![100, 200],
		variable_importances_table: variable_importances_table(&variable_importances),
		variable_importances,
		model_summary: model_summary_table(1, 1, MatrixFormat::Dense),
	}
}

#[test]
fn test_record_bytes() {
	let record = test_record();
	let bytes = record.to_bytes().unwrap();
	assert_eq!(bytes[0], MAJOR_VERSION);
	assert_eq!(ModelRecord::from_slice(&bytes).unwrap(), record);
	let mut bytes = bytes;
	bytes[0] = 7;
	let error = ModelRecord::from_slice(&bytes).unwrap_err();
	assert_eq!(error.to_string(), "unknown major version 7");
	assert!(ModelRecord::from_slice(&[]).is_err());
}

#[test]
fn test_memory_store() {
	let store = MemoryStore::new();
	let record = test_record();
	assert!(load(&store, record.model_id).unwrap().is_none());
	publish(&store, &record).unwrap();
	let loaded = load(&store, record.model_id).unwrap().unwrap();
	assert_eq!(loaded.booster, Some(vec![1, 2, 3]));
	assert_eq!(loaded.last_scored().unwrap().timestamp_ms, 100);
}
