use crate::{
	buffer::{BufferOptions, CapacityError, GrowableBuffer, MAX_BUFFER_LEN},
	layout::FeatureLayout,
	rows::RowSelection,
	BuildError,
};
use gbm_bridge_dataframe::DataFrame;
use std::num::NonZeroUsize;

/// This is the matrix representation requested by the user.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixType {
	/// Choose sparse or dense from the data.
	Auto,
	Sparse,
	Dense,
}

/// This is the storage order used for sparse matrices.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SparseFormat {
	Csr,
	/// Column major storage. Only number columns are supported.
	Csc,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum MatrixFormat {
	Dense,
	Csr,
	Csc,
}

/// A `TrainingMatrix` holds the features in the form the boosting engine consumes.
#[derive(Clone, Debug, PartialEq)]
pub enum TrainingMatrix {
	Dense(DenseMatrix),
	Csr(CsrMatrix),
	Csc(CscMatrix),
}

/// Row major values. Missing values are `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct DenseMatrix {
	pub rows: usize,
	pub cols: usize,
	pub values: Vec<f32>,
}

/// Compressed sparse rows. The entries of row `i` are at `row_offsets[i]..row_offsets[i + 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
	pub rows: usize,
	pub cols: usize,
	pub row_offsets: Vec<u64>,
	pub col_index: Vec<u32>,
	pub data: Vec<f32>,
}

/// Compressed sparse columns. The entries of column `j` are at `col_offsets[j]..col_offsets[j + 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct CscMatrix {
	pub rows: usize,
	pub cols: usize,
	pub col_offsets: Vec<u64>,
	pub row_index: Vec<u32>,
	pub data: Vec<f32>,
}

impl TrainingMatrix {
	pub fn rows(&self) -> usize {
		match self {
			Self::Dense(m) => m.rows,
			Self::Csr(m) => m.rows,
			Self::Csc(m) => m.rows,
		}
	}

	pub fn cols(&self) -> usize {
		match self {
			Self::Dense(m) => m.cols,
			Self::Csr(m) => m.cols,
			Self::Csc(m) => m.cols,
		}
	}

	pub fn format(&self) -> MatrixFormat {
		match self {
			Self::Dense(_) => MatrixFormat::Dense,
			Self::Csr(_) => MatrixFormat::Csr,
			Self::Csc(_) => MatrixFormat::Csc,
		}
	}

	/// The number of values held in memory.
	pub fn stored_len(&self) -> usize {
		match self {
			Self::Dense(m) => m.values.len(),
			Self::Csr(m) => m.data.len(),
			Self::Csc(m) => m.data.len(),
		}
	}

	/// Call `f` with `(row, col, value)` for every nonzero, non-missing value.
	pub fn for_each_nonzero(&self, mut f: impl FnMut(usize, usize, f32)) {
		match self {
			Self::Dense(m) => {
				if m.cols == 0 {
					return;
				}
				for (index, value) in m.values.iter().enumerate() {
					if !value.is_nan() && *value != 0.0 {
						f(index / m.cols, index % m.cols, *value);
					}
				}
			}
			Self::Csr(m) => {
				for row in 0..m.rows {
					let range = m.row_offsets[row] as usize..m.row_offsets[row + 1] as usize;
					for (col, value) in m.col_index[range.clone()].iter().zip(&m.data[range]) {
						if *value != 0.0 {
							f(row, *col as usize, *value);
						}
					}
				}
			}
			Self::Csc(m) => {
				for col in 0..m.cols {
					let range = m.col_offsets[col] as usize..m.col_offsets[col + 1] as usize;
					for (row, value) in m.row_index[range.clone()].iter().zip(&m.data[range]) {
						if *value != 0.0 {
							f(*row as usize, col, *value);
						}
					}
				}
			}
		}
	}

	/// The sum of all nonzero, non-missing values.
	pub fn sum(&self) -> f64 {
		let mut sum = 0.0;
		self.for_each_nonzero(|_, _, value| sum += f64::from(value));
		sum
	}
}

impl DenseMatrix {
	pub fn row(&self, index: usize) -> &[f32] {
		&self.values[index * self.cols..(index + 1) * self.cols]
	}

	pub fn get(&self, row: usize, col: usize) -> f32 {
		self.values[row * self.cols + col]
	}
}

/// Compute the mean over the feature columns of the fraction of values a sparse matrix would store.
pub fn fill_ratio(frame: &DataFrame, excluded_columns: &[&str]) -> f64 {
	let n_rows = frame.nrows();
	let ratios: Vec<f64> = frame
		.columns
		.iter()
		.filter(|column| !excluded_columns.contains(&column.name()))
		.map(|column| column.nonzero_count() as f64 / n_rows as f64)
		.collect();
	if n_rows == 0 || ratios.is_empty() {
		return 1.0;
	}
	ratios.iter().sum::<f64>() / ratios.len() as f64
}

/// Return true if a dense `rows` by `cols` matrix has more elements than a buffer can hold.
pub fn exceeds_dense_limit(rows: usize, cols: usize) -> bool {
	(rows as u64)
		.checked_mul(cols as u64)
		.map(|len| len > MAX_BUFFER_LEN as u64)
		.unwrap_or(true)
}

/// A sparse matrix is chosen when fewer than half the values are stored, or when a dense matrix would not be addressable.
pub fn prefers_sparse(fill_ratio: f64, rows: usize, cols: usize) -> bool {
	fill_ratio < 0.5 || exceeds_dense_limit(rows, cols)
}

pub fn choose_matrix_format(
	frame: &DataFrame,
	layout: &FeatureLayout,
	excluded_columns: &[&str],
	matrix_type: MatrixType,
	sparse_format: SparseFormat,
) -> MatrixFormat {
	let sparse = match matrix_type {
		MatrixType::Sparse => true,
		MatrixType::Dense => false,
		MatrixType::Auto => {
			let fill_ratio = fill_ratio(frame, excluded_columns);
			log::info!("fill ratio: {}", fill_ratio);
			prefers_sparse(fill_ratio, frame.nrows(), layout.full_width())
		}
	};
	match (sparse, sparse_format) {
		(false, _) => MatrixFormat::Dense,
		(true, SparseFormat::Csr) => MatrixFormat::Csr,
		(true, SparseFormat::Csc) => MatrixFormat::Csc,
	}
}

struct Sources<'a> {
	cats: Vec<CatSource<'a>>,
	nums: Vec<&'a [f32]>,
}

/// The values of an enum column, with its levels translated to the levels of the layout.
struct CatSource<'a> {
	data: &'a [Option<NonZeroUsize>],
	/// `None` when the column's options are the layout's options.
	levels: Option<Vec<Option<NonZeroUsize>>>,
}

impl<'a> CatSource<'a> {
	fn get(&self, row: usize) -> Option<NonZeroUsize> {
		let value = self.data[row]?;
		match &self.levels {
			None => Some(value),
			Some(levels) => levels.get(value.get() - 1).copied().flatten(),
		}
	}
}

fn resolve_sources<'a>(
	frame: &'a DataFrame,
	layout: &FeatureLayout,
	rows: &RowSelection,
) -> Result<Sources<'a>, BuildError> {
	let n_rows = rows.n_source_rows();
	let cats = layout
		.cat_columns
		.iter()
		.enumerate()
		.map(|(cat_index, name)| -> Result<CatSource<'a>, BuildError> {
			let column = frame
				.column(name)
				.and_then(|column| column.as_enum())
				.filter(|column| column.data.len() == n_rows)
				.ok_or_else(|| BuildError::LayoutMismatch(name.clone()))?;
			let levels = if column.options == layout.cat_options[cat_index] {
				None
			} else {
				let levels = layout.level_map(cat_index, &column.options);
				let n_unknown = levels.iter().filter(|level| level.is_none()).count();
				if n_unknown > 0 {
					log::warn!(
						"{} options of column \"{}\" are not in the feature layout and are treated as missing.",
						n_unknown,
						name
					);
				}
				Some(levels)
			};
			Ok(CatSource {
				data: column.data.as_slice(),
				levels,
			})
		})
		.collect::<Result<Vec<_>, _>>()?;
	let nums = layout
		.num_columns
		.iter()
		.map(|name| {
			frame
				.column(name)
				.and_then(|column| column.as_number())
				.map(|column| column.data.as_slice())
				.filter(|data| data.len() == n_rows)
				.ok_or_else(|| BuildError::LayoutMismatch(name.clone()))
		})
		.collect::<Result<Vec<_>, _>>()?;
	Ok(Sources { cats, nums })
}

/// Build the training matrix for the selected `rows` of `frame`.
pub fn build_matrix(
	frame: &DataFrame,
	layout: &FeatureLayout,
	rows: &RowSelection,
	format: MatrixFormat,
	options: BufferOptions,
) -> Result<TrainingMatrix, BuildError> {
	let sources = resolve_sources(frame, layout, rows)?;
	let matrix = match format {
		MatrixFormat::Dense => {
			log::info!("Treating matrix as dense.");
			TrainingMatrix::Dense(build_dense(&sources, layout, rows, options)?)
		}
		MatrixFormat::Csr => {
			log::info!("Treating matrix as sparse.");
			TrainingMatrix::Csr(build_csr(&sources, layout, rows, options)?)
		}
		MatrixFormat::Csc => {
			log::info!("Treating matrix as sparse, column major.");
			TrainingMatrix::Csc(build_csc(&sources, layout, rows, options)?)
		}
	};
	Ok(matrix)
}

fn build_dense(
	sources: &Sources,
	layout: &FeatureLayout,
	rows: &RowSelection,
	options: BufferOptions,
) -> Result<DenseMatrix, BuildError> {
	let cols = layout.full_width();
	let mut values = GrowableBuffer::<f32>::new("dense matrix", options);
	for row in rows.iter() {
		let features = values.extend_default(cols)?;
		for (cat_index, column) in sources.cats.iter().enumerate() {
			// Missing values set the indicator of the missing bucket.
			features[layout.categorical_id(cat_index, column.get(row))] = 1.0;
		}
		for (num_index, column) in sources.nums.iter().enumerate() {
			features[layout.numeric_id(num_index)] = column[row];
		}
	}
	Ok(DenseMatrix {
		rows: rows.len(),
		cols,
		values: values.into_vec(),
	})
}

fn build_csr(
	sources: &Sources,
	layout: &FeatureLayout,
	rows: &RowSelection,
	options: BufferOptions,
) -> Result<CsrMatrix, BuildError> {
	let max_entries_per_row = usize::max(layout.cat_count() + layout.num_count(), 1);
	let mut row_offsets = Vec::with_capacity(rows.len() + 1);
	let mut col_index = GrowableBuffer::<u32>::new("sparse column index", options);
	let mut data = GrowableBuffer::<f32>::new("sparse matrix data", options);
	row_offsets.push(0);
	for row in rows.iter() {
		col_index.reserve(max_entries_per_row)?;
		data.reserve(max_entries_per_row)?;
		let row_start = data.len();
		for (cat_index, column) in sources.cats.iter().enumerate() {
			// Missing values are left implicit.
			if let Some(value) = column.get(row) {
				// The layout width never exceeds `MAX_BUFFER_LEN`, so the id fits in a u32.
				col_index.push(layout.categorical_id(cat_index, Some(value)) as u32)?;
				data.push(1.0)?;
			}
		}
		for (num_index, column) in sources.nums.iter().enumerate() {
			let value = column[row];
			if !value.is_nan() && value != 0.0 {
				col_index.push(layout.numeric_id(num_index) as u32)?;
				data.push(value)?;
			}
		}
		// A row without entries would be dropped by the engine, leaving more labels than rows. Store an explicit zero in column 0 instead.
		if data.len() == row_start {
			col_index.push(0)?;
			data.push(0.0)?;
		}
		row_offsets.push(data.len() as u64);
	}
	Ok(CsrMatrix {
		rows: rows.len(),
		cols: layout.full_width(),
		row_offsets,
		col_index: col_index.into_vec(),
		data: data.into_vec(),
	})
}

fn build_csc(
	sources: &Sources,
	layout: &FeatureLayout,
	rows: &RowSelection,
	options: BufferOptions,
) -> Result<CscMatrix, BuildError> {
	if layout.cat_count() > 0 {
		return Err(BuildError::CscWithCategoricals(layout.cat_count()));
	}
	if rows.len() > u32::MAX as usize {
		return Err(CapacityError {
			name: "sparse row index",
			required: rows.len() as u64,
			max_len: u32::MAX as usize,
		}
		.into());
	}
	let cols = layout.num_count();
	let mut col_offsets = Vec::with_capacity(cols + 1);
	let mut row_index = GrowableBuffer::<u32>::new("sparse row index", options);
	let mut data = GrowableBuffer::<f32>::new("sparse matrix data", options);
	let mut row_has_entries = vec![false; rows.len()];
	for column in sources.nums.iter() {
		col_offsets.push(data.len() as u64);
		for (position, row) in rows.iter().enumerate() {
			let value = column[row];
			if value.is_nan() || value == 0.0 {
				continue;
			}
			row_index.push(position as u32)?;
			data.push(value)?;
			row_has_entries[position] = true;
		}
	}
	col_offsets.push(data.len() as u64);
	let actual_rows = row_has_entries.iter().filter(|entries| **entries).count();
	if actual_rows < rows.len() {
		log::warn!(
			"{} of {} rows have no nonzero values and are absent from the column major matrix.",
			rows.len() - actual_rows,
			rows.len()
		);
	}
	Ok(CscMatrix {
		rows: actual_rows,
		cols,
		col_offsets,
		row_index: row_index.into_vec(),
		data: data.into_vec(),
	})
}

#[cfg(test)]
mod test_data {
	use gbm_bridge_dataframe::{Column, DataFrame, EnumColumn, NumberColumn};

	pub fn frame() -> DataFrame {
		DataFrame::new(vec![
			Column::Enum(EnumColumn::from_values(
				"color".to_owned(),
				vec!["red".to_owned(), "blue".to_owned()],
				&[Some("red"), Some("blue"), Some("blue"), Some("red"), Some("red")],
			)),
			Column::Number(NumberColumn::new(
				"x".to_owned(),
				vec![1.5, 0.0, -2.0, 0.0, 4.0],
			)),
			Column::Number(NumberColumn::new(
				"y".to_owned(),
				vec![0.0, 3.0, std::f32::NAN, 0.0, 7.0],
			)),
			Column::Number(NumberColumn::new(
				"weight".to_owned(),
				vec![1.0, 2.0, 0.0, 1.0, 0.5],
			)),
		])
	}

	pub fn numeric_frame() -> DataFrame {
		DataFrame::new(vec![
			Column::Number(NumberColumn::new(
				"a".to_owned(),
				vec![1.0, 0.0, 0.0, 2.0],
			)),
			Column::Number(NumberColumn::new(
				"b".to_owned(),
				vec![0.0, 5.0, 0.0, std::f32::NAN],
			)),
			Column::Number(NumberColumn::new(
				"c".to_owned(),
				vec![0.0, 0.0, 6.0, 0.0],
			)),
		])
	}
}

#[cfg(test)]
fn nonzero_entries(matrix: &TrainingMatrix) -> Vec<(usize, usize, f32)> {
	let mut entries = Vec::new();
	matrix.for_each_nonzero(|row, col, value| entries.push((row, col, value)));
	entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
	entries
}

#[test]
fn test_dense_rows() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::compute(&frame, Some("weight")).unwrap();
	let matrix = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Dense,
		BufferOptions::default(),
	)
	.unwrap();
	let matrix = match matrix {
		TrainingMatrix::Dense(matrix) => matrix,
		_ => unreachable!(),
	};
	assert_eq!(matrix.rows, 4);
	assert_eq!(matrix.cols, 5);
	assert_eq!(matrix.values.len(), 20);
	assert_eq!(matrix.row(0), &[1.0, 0.0, 0.0, 1.5, 0.0]);
	assert_eq!(matrix.row(1), &[0.0, 1.0, 0.0, 0.0, 3.0]);
	// Source row 2 has weight zero, so row 2 of the matrix is source row 3.
	assert_eq!(matrix.row(2), &[1.0, 0.0, 0.0, 0.0, 0.0]);
	assert_eq!(matrix.get(3, 4), 7.0);
}

#[test]
fn test_dense_missing_values() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let matrix = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Dense,
		BufferOptions::default(),
	)
	.unwrap();
	match matrix {
		TrainingMatrix::Dense(matrix) => {
			assert_eq!(matrix.rows, 5);
			assert!(matrix.get(2, 4).is_nan());
		}
		_ => unreachable!(),
	}
}

#[test]
fn test_csr_rows() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::compute(&frame, Some("weight")).unwrap();
	let matrix = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csr,
		BufferOptions::default(),
	)
	.unwrap();
	let matrix = match matrix {
		TrainingMatrix::Csr(matrix) => matrix,
		_ => unreachable!(),
	};
	assert_eq!(matrix.rows, 4);
	assert_eq!(matrix.cols, 5);
	assert_eq!(matrix.row_offsets, vec![0, 2, 4, 5, 8]);
	assert_eq!(matrix.col_index, vec![0, 3, 1, 4, 0, 0, 3, 4]);
	assert_eq!(matrix.data, vec![1.0, 1.5, 1.0, 3.0, 1.0, 1.0, 4.0, 7.0]);
}

#[test]
fn test_csr_empty_row_gets_explicit_zero() {
	let frame = test_data::numeric_frame();
	let layout = FeatureLayout::compute(&frame, &["c"]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let matrix = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csr,
		BufferOptions::default(),
	)
	.unwrap();
	let matrix = match matrix {
		TrainingMatrix::Csr(matrix) => matrix,
		_ => unreachable!(),
	};
	assert_eq!(matrix.rows, 4);
	assert_eq!(matrix.row_offsets, vec![0, 1, 2, 3, 4]);
	// Row 2 has only zeros and row 3 has a missing value in "b".
	assert_eq!(matrix.col_index, vec![0, 1, 0, 0]);
	assert_eq!(matrix.data, vec![1.0, 5.0, 0.0, 2.0]);
}

#[test]
fn test_dense_and_sparse_agree() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::compute(&frame, Some("weight")).unwrap();
	let dense = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Dense,
		BufferOptions::default(),
	)
	.unwrap();
	let sparse = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csr,
		BufferOptions::default(),
	)
	.unwrap();
	assert_eq!(dense.rows(), sparse.rows());
	assert!((dense.sum() - sparse.sum()).abs() < 1e-6);
	assert_eq!(nonzero_entries(&dense), nonzero_entries(&sparse));
}

#[test]
fn test_growth_matches_large_initial_buffer() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let small = BufferOptions {
		initial_len: 1,
		max_len: 1 << 10,
	};
	for format in &[MatrixFormat::Dense, MatrixFormat::Csr] {
		let grown = build_matrix(&frame, &layout, &rows, *format, small).unwrap();
		let reference =
			build_matrix(&frame, &layout, &rows, *format, BufferOptions::default()).unwrap();
		match (&grown, &reference) {
			(TrainingMatrix::Dense(a), TrainingMatrix::Dense(b)) => {
				assert_eq!(a.rows, b.rows);
				assert_eq!(a.values.len(), b.values.len());
				for (a, b) in a.values.iter().zip(b.values.iter()) {
					assert!(a == b || (a.is_nan() && b.is_nan()));
				}
			}
			_ => assert_eq!(grown, reference),
		}
	}
}

#[test]
fn test_capacity_error() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let tiny = BufferOptions {
		initial_len: 4,
		max_len: 12,
	};
	let error = build_matrix(&frame, &layout, &rows, MatrixFormat::Dense, tiny).unwrap_err();
	match error {
		BuildError::Capacity(error) => {
			assert_eq!(error.name, "dense matrix");
			assert_eq!(error.required, 15);
		}
		error => panic!("unexpected error {:?}", error),
	}
}

#[test]
fn test_csc() {
	let frame = test_data::numeric_frame();
	let layout = FeatureLayout::compute(&frame, &[]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let matrix = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csc,
		BufferOptions::default(),
	)
	.unwrap();
	let csc = match &matrix {
		TrainingMatrix::Csc(matrix) => matrix,
		_ => unreachable!(),
	};
	assert_eq!(csc.rows, 4);
	assert_eq!(csc.cols, 3);
	assert_eq!(csc.col_offsets, vec![0, 2, 3, 4]);
	assert_eq!(csc.row_index, vec![0, 3, 1, 2]);
	assert_eq!(csc.data, vec![1.0, 2.0, 5.0, 6.0]);
	let csr = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csr,
		BufferOptions::default(),
	)
	.unwrap();
	assert_eq!(nonzero_entries(&matrix), nonzero_entries(&csr));
}

#[test]
fn test_csc_counts_distinct_rows() {
	let frame = test_data::numeric_frame();
	let layout = FeatureLayout::compute(&frame, &["c"]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let matrix = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csc,
		BufferOptions::default(),
	)
	.unwrap();
	assert_eq!(matrix.rows(), 3);
}

#[test]
fn test_csc_rejects_enum_columns() {
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	let rows = RowSelection::all(frame.nrows());
	let error = build_matrix(
		&frame,
		&layout,
		&rows,
		MatrixFormat::Csc,
		BufferOptions::default(),
	)
	.unwrap_err();
	assert!(matches!(error, BuildError::CscWithCategoricals(1)));
}

#[test]
fn test_fill_ratio() {
	let frame = test_data::numeric_frame();
	// Each column stores one or two of four values.
	let ratio = fill_ratio(&frame, &[]);
	assert!((ratio - (0.5 + 0.25 + 0.25) / 3.0).abs() < 1e-9);
	let layout = FeatureLayout::compute(&frame, &[]).unwrap();
	assert_eq!(
		choose_matrix_format(&frame, &layout, &[], MatrixType::Auto, SparseFormat::Csr),
		MatrixFormat::Csr
	);
	assert_eq!(
		choose_matrix_format(&frame, &layout, &[], MatrixType::Dense, SparseFormat::Csr),
		MatrixFormat::Dense
	);
	let frame = test_data::frame();
	let layout = FeatureLayout::compute(&frame, &["weight"]).unwrap();
	// color: 5/5, x: 3/5, y: 2/5.
	assert_eq!(
		choose_matrix_format(
			&frame,
			&layout,
			&["weight"],
			MatrixType::Auto,
			SparseFormat::Csr
		),
		MatrixFormat::Dense
	);
}

#[test]
fn test_dense_limit_forces_sparse() {
	assert!(!prefers_sparse(0.9, 1000, 1000));
	assert!(prefers_sparse(0.49, 10, 10));
	assert!(prefers_sparse(1.0, 1 << 20, 1 << 12));
	assert!(!exceeds_dense_limit(MAX_BUFFER_LEN, 1));
	assert!(exceeds_dense_limit(MAX_BUFFER_LEN + 1, 1));
	assert!(exceeds_dense_limit(i32::MAX as usize, 1));
	assert!(exceeds_dense_limit(i32::MAX as usize, 2));
}

#[test]
fn test_enum_values_follow_the_layout_options() {
	use gbm_bridge_dataframe::{Column, DataFrame, EnumColumn};
	let train = DataFrame::new(vec![Column::Enum(EnumColumn::from_values(
		"color".to_owned(),
		vec!["red".to_owned(), "blue".to_owned()],
		&[Some("red"), Some("blue")],
	))]);
	let valid = DataFrame::new(vec![Column::Enum(EnumColumn::from_values(
		"color".to_owned(),
		vec!["blue".to_owned(), "red".to_owned(), "green".to_owned()],
		&[Some("red"), Some("blue"), Some("green"), None],
	))]);
	let layout = FeatureLayout::compute(&train, &[]).unwrap();
	let rows = RowSelection::all(valid.nrows());
	let dense = build_matrix(
		&valid,
		&layout,
		&rows,
		MatrixFormat::Dense,
		BufferOptions::default(),
	)
	.unwrap();
	match &dense {
		TrainingMatrix::Dense(matrix) => {
			assert_eq!(matrix.cols, 3);
			assert_eq!(matrix.row(0), &[1.0, 0.0, 0.0]);
			assert_eq!(matrix.row(1), &[0.0, 1.0, 0.0]);
			// Options the layout does not know are missing.
			assert_eq!(matrix.row(2), &[0.0, 0.0, 1.0]);
			assert_eq!(matrix.row(3), &[0.0, 0.0, 1.0]);
		}
		_ => unreachable!(),
	}
	let csr = build_matrix(
		&valid,
		&layout,
		&rows,
		MatrixFormat::Csr,
		BufferOptions::default(),
	)
	.unwrap();
	match csr {
		TrainingMatrix::Csr(matrix) => {
			assert_eq!(matrix.row_offsets, vec![0, 1, 2, 3, 4]);
			assert_eq!(matrix.col_index, vec![0, 1, 0, 0]);
			assert_eq!(matrix.data, vec![1.0, 1.0, 0.0, 0.0]);
		}
		_ => unreachable!(),
	}
}
