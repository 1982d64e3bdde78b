use crate::{
	model::{MetricSnapshot, MetricValues},
	varimp::VariableImportance,
};
use gbm_bridge_features::MatrixFormat;

/// A titled table of strings, rendered as a markdown style grid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Table {
	pub title: String,
	pub header: Vec<String>,
	pub rows: Vec<Vec<String>>,
}

const PADDING: usize = 1;

impl std::fmt::Display for Table {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		// update column widths with header
		let mut column_widths: Vec<usize> =
			self.header.iter().map(|header| header.len()).collect();
		// update column widths with values
		for row in self.rows.iter() {
			for (column_width, value) in column_widths.iter_mut().zip(row.iter()) {
				*column_width = usize::max(*column_width, value.len());
			}
		}
		writeln!(f, "{}", self.title)?;
		let line = Line {
			column_widths: &column_widths,
		};
		let header = Row {
			column_widths: &column_widths,
			values: &self.header,
		};
		writeln!(f, "{}", header)?;
		writeln!(f, "{}", line)?;
		for row in self.rows.iter() {
			let row = Row {
				column_widths: &column_widths,
				values: row,
			};
			writeln!(f, "{}", row)?;
		}
		Ok(())
	}
}

struct Line<'a> {
	column_widths: &'a [usize],
}

impl<'a> std::fmt::Display for Line<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for column_width in self.column_widths.iter() {
			write!(f, "{}|", "-".repeat(column_width + 2 * PADDING))?;
		}
		Ok(())
	}
}

struct Row<'a> {
	column_widths: &'a [usize],
	values: &'a [String],
}

impl<'a> std::fmt::Display for Row<'a> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "|")?;
		for (column_width, value) in self.column_widths.iter().zip(self.values) {
			let fill = column_width + PADDING - value.len();
			write!(f, "{}{}{}|", " ".repeat(PADDING), value, " ".repeat(fill))?;
		}
		Ok(())
	}
}

pub fn model_summary_table(n_trees: usize, full_width: usize, format: MatrixFormat) -> Table {
	let format = match format {
		MatrixFormat::Dense => "dense",
		MatrixFormat::Csr => "sparse (csr)",
		MatrixFormat::Csc => "sparse (csc)",
	};
	Table {
		title: "Model Summary".to_owned(),
		header: vec![
			"Number of Trees".to_owned(),
			"Feature Width".to_owned(),
			"Matrix Format".to_owned(),
		],
		rows: vec![vec![
			n_trees.to_string(),
			full_width.to_string(),
			format.to_owned(),
		]],
	}
}

type MetricColumn = (&'static str, fn(&MetricValues) -> Option<f32>);

fn metric_columns() -> [MetricColumn; 5] {
	[
		("RMSE", |metrics| metrics.rmse),
		("MAE", |metrics| metrics.mae),
		("LogLoss", |metrics| metrics.logloss),
		("Classification Error", |metrics| metrics.classification_error),
		("AUC", |metrics| metrics.auc),
	]
}

/// Build one row for every scored snapshot of `scored_train`. `scored_train[i]` and `scored_valid[i]` describe the model with `i` trees. Durations are relative to `start_ms`.
pub fn scoring_history_table(
	scored_train: &[MetricSnapshot],
	scored_valid: Option<&[MetricSnapshot]>,
	start_ms: u64,
) -> Table {
	let has_values = |history: &[MetricSnapshot], value: fn(&MetricValues) -> Option<f32>| {
		history
			.iter()
			.filter_map(|snapshot| snapshot.metrics.as_ref())
			.any(|metrics| value(metrics).is_some())
	};
	let metric_columns = metric_columns();
	let mut columns: Vec<(String, bool, fn(&MetricValues) -> Option<f32>)> = Vec::new();
	for (name, value) in metric_columns.iter() {
		if has_values(scored_train, *value) {
			columns.push((format!("Training {}", name), false, *value));
		}
	}
	if let Some(scored_valid) = scored_valid {
		for (name, value) in metric_columns.iter() {
			if has_values(scored_valid, *value) {
				columns.push((format!("Validation {}", name), true, *value));
			}
		}
	}
	let mut header = vec!["Duration (ms)".to_owned(), "Number of Trees".to_owned()];
	header.extend(columns.iter().map(|(name, _, _)| name.clone()));
	let mut rows = Vec::new();
	for (n_trees, snapshot) in scored_train.iter().enumerate() {
		let train_metrics = match &snapshot.metrics {
			Some(metrics) => metrics,
			None => continue,
		};
		let valid_metrics = scored_valid
			.and_then(|scored_valid| scored_valid.get(n_trees))
			.and_then(|snapshot| snapshot.metrics.as_ref());
		let mut row = vec![
			snapshot.timestamp_ms.saturating_sub(start_ms).to_string(),
			n_trees.to_string(),
		];
		for (_, is_valid, value) in columns.iter() {
			let metrics = if *is_valid {
				valid_metrics
			} else {
				Some(train_metrics)
			};
			row.push(
				metrics
					.and_then(|metrics| value(metrics))
					.map(|value| format!("{:.5}", value))
					.unwrap_or_default(),
			);
		}
		rows.push(row);
	}
	Table {
		title: "Scoring History".to_owned(),
		header,
		rows,
	}
}

pub fn variable_importances_table(importances: &[VariableImportance]) -> Table {
	Table {
		title: "Variable Importances".to_owned(),
		header: vec![
			"Variable".to_owned(),
			"Relative Importance".to_owned(),
			"Scaled Importance".to_owned(),
			"Percentage".to_owned(),
		],
		rows: importances
			.iter()
			.map(|importance| {
				vec![
					importance.variable.clone(),
					format!("{:.5}", importance.relative),
					format!("{:.5}", importance.scaled),
					format!("{:.5}", importance.percentage),
				]
			})
			.collect(),
	}
}

#[test]
fn test_model_summary() {
	let table = model_summary_table(12, 40, MatrixFormat::Csr);
	insta::assert_snapshot!(table.to_string(), @r###"
 Model Summary
 | Number of Trees | Feature Width | Matrix Format |
 |-----------------|---------------|---------------|
 | 12              | 40            | sparse (csr)  |
 "###);
}

#[test]
fn test_scoring_history() {
	let scored = |timestamp_ms, rmse: Option<f32>| MetricSnapshot {
		timestamp_ms,
		metrics: rmse.map(|rmse| MetricValues {
			rmse: Some(rmse),
			mse: Some(rmse * rmse),
			mae: Some(rmse / 2.0),
			..Default::default()
		}),
	};
	let train = vec![
		scored(1000, Some(2.0)),
		scored(2000, None),
		scored(3000, Some(1.0)),
	];
	let valid = vec![
		scored(1000, Some(3.0)),
		scored(2000, None),
		scored(3000, Some(1.5)),
	];
	let table = scoring_history_table(&train, Some(valid.as_slice()), 1000);
	insta::assert_snapshot!(table.to_string(), @r###"
 Scoring History
 | Duration (ms) | Number of Trees | Training RMSE | Training MAE | Validation RMSE | Validation MAE |
 |---------------|-----------------|---------------|--------------|-----------------|----------------|
 | 0             | 0               | 2.00000       | 1.00000      | 3.00000         | 1.50000        |
 | 2000          | 2               | 1.00000       | 0.50000      | 1.50000         | 0.75000        |
 "###);
}
