/*!
This crate turns a dataframe into the training data a boosting engine consumes: a [`TrainingMatrix`](enum.TrainingMatrix.html) in dense, CSR, or CSC form, along with a label and a weight for each row of the matrix.

The steps are:

1. Compute a [`FeatureLayout`](struct.FeatureLayout.html), which one-hot encodes enum columns and places number columns after them.
2. Compute a [`RowSelection`](struct.RowSelection.html), which drops rows whose weight is zero.
3. Build the matrix from the selected rows, growing its buffers as needed up to the 32-bit limit of the engine.
4. Extract labels and weights from the same selected rows.

[`build_training_data`](fn.build_training_data.html) runs steps 2 through 4.
*/

#![allow(clippy::tabs_in_doc_comments)]

mod buffer;
mod labels;
mod layout;
mod matrix;
mod rows;

pub use self::buffer::{
	BufferOptions, CapacityError, GrowableBuffer, INITIAL_BUFFER_LEN, MAX_BUFFER_LEN,
};
pub use self::labels::{extract_labels_and_weights, AlignmentError, LabelsAndWeights};
pub use self::layout::{FeatureLayout, FeatureMap, FeatureMapEntry, FeatureType, LayoutError};
pub use self::matrix::{
	build_matrix, choose_matrix_format, exceeds_dense_limit, fill_ratio, prefers_sparse,
	CscMatrix, CsrMatrix, DenseMatrix, MatrixFormat, MatrixType, SparseFormat, TrainingMatrix,
};
pub use self::rows::RowSelection;

use gbm_bridge_dataframe::DataFrame;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum BuildError {
	#[error(transparent)]
	Capacity(#[from] CapacityError),
	#[error(transparent)]
	Alignment(#[from] AlignmentError),
	#[error("There is no column named \"{0}\".")]
	UnknownColumn(String),
	#[error("The weight column \"{0}\" must be a number column.")]
	NonNumericWeights(String),
	#[error("The column \"{0}\" is absent or does not match the feature layout.")]
	LayoutMismatch(String),
	#[error("The CSC matrix format only supports number columns, but the layout has {0} enum columns.")]
	CscWithCategoricals(usize),
}

/// A matrix with its labels and weights, row for row.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainingData {
	pub matrix: TrainingMatrix,
	pub labels: Vec<f32>,
	pub weights: Vec<f32>,
}

impl TrainingData {
	pub fn rows(&self) -> usize {
		self.matrix.rows()
	}
}

#[derive(Clone, Debug)]
pub struct DataOptions<'a> {
	pub response_column: &'a str,
	pub weight_column: Option<&'a str>,
	pub format: MatrixFormat,
	pub buffer_options: BufferOptions,
}

pub fn build_training_data(
	frame: &DataFrame,
	layout: &FeatureLayout,
	options: &DataOptions,
) -> Result<TrainingData, BuildError> {
	let rows = RowSelection::compute(frame, options.weight_column)?;
	let matrix = build_matrix(frame, layout, &rows, options.format, options.buffer_options)?;
	let LabelsAndWeights { labels, weights } = extract_labels_and_weights(
		frame,
		options.response_column,
		options.weight_column,
		&rows,
		matrix.rows(),
	)?;
	Ok(TrainingData {
		matrix,
		labels,
		weights,
	})
}

#[cfg(test)]
fn hundred_row_frame() -> DataFrame {
	use gbm_bridge_dataframe::{Column, EnumColumn, NumberColumn};
	use std::num::NonZeroUsize;
	let n_rows = 100;
	DataFrame::new(vec![
		Column::Enum(EnumColumn::new(
			"group".to_owned(),
			vec!["a".to_owned(), "b".to_owned()],
			(0..n_rows).map(|i| NonZeroUsize::new(i % 2 + 1)).collect(),
		)),
		Column::Number(NumberColumn::new(
			"x".to_owned(),
			(0..n_rows).map(|i| i as f32 + 1.0).collect(),
		)),
		Column::Number(NumberColumn::new(
			"z".to_owned(),
			(0..n_rows).map(|i| 0.5 - i as f32).collect(),
		)),
		Column::Number(NumberColumn::new(
			"target".to_owned(),
			(0..n_rows).map(|i| (i % 7) as f32).collect(),
		)),
	])
}

#[test]
fn test_hundred_rows_csr_and_dense() {
	let frame = hundred_row_frame();
	let layout = FeatureLayout::compute(&frame, &["target"]).unwrap();
	assert_eq!(layout.full_width(), 5);
	let mut options = DataOptions {
		response_column: "target",
		weight_column: None,
		format: MatrixFormat::Csr,
		buffer_options: BufferOptions::default(),
	};
	let csr = build_training_data(&frame, &layout, &options).unwrap();
	assert_eq!(csr.rows(), 100);
	options.format = MatrixFormat::Dense;
	let dense = build_training_data(&frame, &layout, &options).unwrap();
	assert_eq!(dense.matrix.stored_len(), 100 * layout.full_width());
	let mut csr_entries = Vec::new();
	csr.matrix
		.for_each_nonzero(|row, col, value| csr_entries.push((row, col, value)));
	let mut dense_entries = Vec::new();
	dense
		.matrix
		.for_each_nonzero(|row, col, value| dense_entries.push((row, col, value)));
	// Both iterate in row major order.
	assert_eq!(csr_entries, dense_entries);
	assert_eq!(csr_entries.len(), 300);
	assert_eq!(csr.labels, dense.labels);
	assert_eq!(csr.weights, dense.weights);
}

#[test]
fn test_weights_filter_every_output() {
	use gbm_bridge_dataframe::{Column, NumberColumn};
	let mut frame = hundred_row_frame();
	frame.columns.push(Column::Number(NumberColumn::new(
		"w".to_owned(),
		(0..100).map(|i| if i % 4 == 0 { 0.0 } else { 2.0 }).collect(),
	)));
	let layout = FeatureLayout::compute(&frame, &["target", "w"]).unwrap();
	for format in &[MatrixFormat::Dense, MatrixFormat::Csr] {
		let options = DataOptions {
			response_column: "target",
			weight_column: Some("w"),
			format: *format,
			buffer_options: BufferOptions::default(),
		};
		let data = build_training_data(&frame, &layout, &options).unwrap();
		assert_eq!(data.rows(), 75);
		assert_eq!(data.labels.len(), 75);
		assert_eq!(data.weights, vec![2.0; 75]);
		// Row 0 of the output is source row 1.
		assert_eq!(data.labels[0], 1.0);
	}
}
