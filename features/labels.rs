use crate::{rows::RowSelection, BuildError};
use gbm_bridge_dataframe::{Column, DataFrame};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
#[error("Internal error: the training matrix has {matrix_rows} rows, but {label_rows} labels and {weight_rows} weights were extracted.")]
pub struct AlignmentError {
	pub matrix_rows: usize,
	pub label_rows: usize,
	pub weight_rows: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelsAndWeights {
	pub labels: Vec<f32>,
	/// Every weight is 1 when there is no weight column.
	pub weights: Vec<f32>,
}

/**
Extract the label and weight of every selected row. Number responses produce their value, and enum responses produce their zero-based class index.

The number of extracted rows must equal `matrix_rows`. A mismatch means the matrix and the labels were built from different rows, which is an internal error.
*/
pub fn extract_labels_and_weights(
	frame: &DataFrame,
	response_column: &str,
	weight_column: Option<&str>,
	rows: &RowSelection,
	matrix_rows: usize,
) -> Result<LabelsAndWeights, BuildError> {
	let response = frame
		.column(response_column)
		.ok_or_else(|| BuildError::UnknownColumn(response_column.to_owned()))?;
	let weight_values = match weight_column {
		None => None,
		Some(name) => {
			let column = frame
				.column(name)
				.ok_or_else(|| BuildError::UnknownColumn(name.to_owned()))?;
			let column = column
				.as_number()
				.ok_or_else(|| BuildError::NonNumericWeights(name.to_owned()))?;
			Some(column.data.as_slice())
		}
	};
	let mut labels = Vec::with_capacity(rows.len());
	let mut weights = Vec::with_capacity(rows.len());
	for row in rows.iter() {
		let label = match response {
			Column::Number(column) => column.data[row],
			Column::Enum(column) => column.level_f32(row),
		};
		labels.push(label);
		weights.push(weight_values.map(|values| values[row]).unwrap_or(1.0));
	}
	if labels.len() != matrix_rows || weights.len() != matrix_rows {
		return Err(AlignmentError {
			matrix_rows,
			label_rows: labels.len(),
			weight_rows: weights.len(),
		}
		.into());
	}
	Ok(LabelsAndWeights { labels, weights })
}

#[cfg(test)]
fn test_frame() -> DataFrame {
	use gbm_bridge_dataframe::{EnumColumn, NumberColumn};
	DataFrame::new(vec![
		Column::Number(NumberColumn::new(
			"x".to_owned(),
			vec![1.0, 2.0, 3.0, 4.0],
		)),
		Column::Enum(EnumColumn::from_values(
			"label".to_owned(),
			vec!["no".to_owned(), "yes".to_owned()],
			&[Some("yes"), Some("no"), Some("yes"), Some("no")],
		)),
		Column::Number(NumberColumn::new(
			"w".to_owned(),
			vec![0.5, 0.0, 2.0, 1.0],
		)),
	])
}

#[test]
fn test_labels_follow_row_selection() {
	let frame = test_frame();
	let rows = RowSelection::compute(&frame, Some("w")).unwrap();
	let output = extract_labels_and_weights(&frame, "label", Some("w"), &rows, 3).unwrap();
	assert_eq!(output.labels, vec![1.0, 1.0, 0.0]);
	assert_eq!(output.weights, vec![0.5, 2.0, 1.0]);
}

#[test]
fn test_unit_weights_without_weight_column() {
	let frame = test_frame();
	let rows = RowSelection::all(frame.nrows());
	let output = extract_labels_and_weights(&frame, "x", None, &rows, 4).unwrap();
	assert_eq!(output.labels, vec![1.0, 2.0, 3.0, 4.0]);
	assert_eq!(output.weights, vec![1.0; 4]);
}

#[test]
fn test_row_count_mismatch() {
	let frame = test_frame();
	let rows = RowSelection::all(frame.nrows());
	let error = extract_labels_and_weights(&frame, "x", None, &rows, 3).unwrap_err();
	assert_eq!(
		error,
		BuildError::Alignment(AlignmentError {
			matrix_rows: 3,
			label_rows: 4,
			weight_rows: 4,
		})
	);
}
