use crate::BuildError;
use gbm_bridge_dataframe::DataFrame;

/**
A `RowSelection` lists, in order, the dataframe rows that take part in training. A row is dropped when its weight is exactly zero. Rows with missing weights are kept, and every row is kept when there is no weight column.

The matrix builders and the label and weight extraction all read rows through the same `RowSelection`, so the rows of the matrix always line up with the labels and weights.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct RowSelection {
	rows: Vec<usize>,
	n_source_rows: usize,
}

impl RowSelection {
	/// Select every row.
	pub fn all(n_source_rows: usize) -> Self {
		Self {
			rows: (0..n_source_rows).collect(),
			n_source_rows,
		}
	}

	/// Select the rows whose weight is not zero.
	pub fn from_weights(weights: &[f32]) -> Self {
		let rows = weights
			.iter()
			.enumerate()
			.filter(|(_, weight)| **weight != 0.0)
			.map(|(index, _)| index)
			.collect();
		Self {
			rows,
			n_source_rows: weights.len(),
		}
	}

	pub fn compute(frame: &DataFrame, weight_column: Option<&str>) -> Result<Self, BuildError> {
		match weight_column {
			None => Ok(Self::all(frame.nrows())),
			Some(name) => {
				let column = frame
					.column(name)
					.ok_or_else(|| BuildError::UnknownColumn(name.to_owned()))?;
				let column = column
					.as_number()
					.ok_or_else(|| BuildError::NonNumericWeights(name.to_owned()))?;
				Ok(Self::from_weights(&column.data))
			}
		}
	}

	/// The number of selected rows.
	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}

	/// The number of rows in the source dataframe, selected or not.
	pub fn n_source_rows(&self) -> usize {
		self.n_source_rows
	}

	/// Iterate over the source indexes of the selected rows.
	pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
		self.rows.iter().copied()
	}

	pub fn as_slice(&self) -> &[usize] {
		&self.rows
	}
}

#[test]
fn test_zero_weights_are_dropped() {
	let selection = RowSelection::from_weights(&[1.0, 0.0, 2.5, std::f32::NAN, 0.0, -1.0]);
	assert_eq!(selection.as_slice(), &[0, 2, 3, 5]);
	assert_eq!(selection.len(), 4);
	assert_eq!(selection.n_source_rows(), 6);
}

#[test]
fn test_compute_without_weights() {
	use gbm_bridge_dataframe::{Column, NumberColumn};
	let frame = DataFrame::new(vec![Column::Number(NumberColumn::new(
		"x".to_owned(),
		vec![0.0; 5],
	))]);
	let selection = RowSelection::compute(&frame, None).unwrap();
	assert_eq!(selection.iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
	let error = RowSelection::compute(&frame, Some("w")).unwrap_err();
	assert_eq!(error.to_string(), "There is no column named \"w\".");
}
