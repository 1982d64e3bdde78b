/*!
This crate provides the column store that model builds read their training data from. A `DataFrame` is an ordered set of named columns, where each column holds a single type of data and can be read independently at any row index. Model builds never mutate a `DataFrame`, so any number of builds can read the same one at the same time.

Number columns store `f32` values and use `NaN` to mark missing values. Enum columns store a 1-based index into their list of options, and `None` marks a missing value.
*/

use num_traits::ToPrimitive;
use std::num::NonZeroUsize;

#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
	pub columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
	Number(NumberColumn),
	Enum(EnumColumn),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumberColumn {
	pub name: String,
	pub data: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumColumn {
	pub name: String,
	pub options: Vec<String>,
	pub data: Vec<Option<NonZeroUsize>>,
}

impl DataFrame {
	/// Create a `DataFrame` from `columns`. All columns must have the same length.
	pub fn new(columns: Vec<Column>) -> Self {
		debug_assert!(columns
			.windows(2)
			.all(|pair| pair[0].len() == pair[1].len()));
		Self { columns }
	}

	pub fn ncols(&self) -> usize {
		self.columns.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.first().map(|column| column.len()).unwrap_or(0)
	}

	/// Find the index of the column named `name`.
	pub fn column_index(&self, name: &str) -> Option<usize> {
		self.columns.iter().position(|column| column.name() == name)
	}

	pub fn column(&self, name: &str) -> Option<&Column> {
		self.column_index(name).map(|index| &self.columns[index])
	}

	pub fn column_names(&self) -> Vec<&str> {
		self.columns.iter().map(|column| column.name()).collect()
	}
}

impl Column {
	pub fn len(&self) -> usize {
		match self {
			Self::Number(column) => column.data.len(),
			Self::Enum(column) => column.data.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			Self::Number(column) => column.data.is_empty(),
			Self::Enum(column) => column.data.is_empty(),
		}
	}

	pub fn name(&self) -> &str {
		match self {
			Self::Number(column) => column.name.as_str(),
			Self::Enum(column) => column.name.as_str(),
		}
	}

	pub fn as_number(&self) -> Option<&NumberColumn> {
		match self {
			Self::Number(column) => Some(column),
			_ => None,
		}
	}

	pub fn as_enum(&self) -> Option<&EnumColumn> {
		match self {
			Self::Enum(column) => Some(column),
			_ => None,
		}
	}

	pub fn missing_count(&self) -> usize {
		match self {
			Self::Number(column) => column.data.iter().filter(|value| value.is_nan()).count(),
			Self::Enum(column) => column.data.iter().filter(|value| value.is_none()).count(),
		}
	}

	/// Count the values a sparse matrix would have to store for this column. Zeros and missing values are not counted.
	pub fn nonzero_count(&self) -> usize {
		match self {
			Self::Number(column) => column
				.data
				.iter()
				.filter(|value| !value.is_nan() && **value != 0.0)
				.count(),
			Self::Enum(column) => column.data.iter().filter(|value| value.is_some()).count(),
		}
	}
}

impl NumberColumn {
	pub fn new(name: String, data: Vec<f32>) -> Self {
		Self { name, data }
	}

	/// Return true if every non-missing value is a whole number.
	pub fn is_integral(&self) -> bool {
		self.data
			.iter()
			.filter(|value| !value.is_nan())
			.all(|value| value.is_finite() && value.fract() == 0.0)
	}

	/// Return true if every non-missing value is either 0 or 1.
	pub fn is_binary(&self) -> bool {
		self.data
			.iter()
			.filter(|value| !value.is_nan())
			.all(|value| *value == 0.0 || *value == 1.0)
	}
}

impl EnumColumn {
	pub fn new(name: String, options: Vec<String>, data: Vec<Option<NonZeroUsize>>) -> Self {
		Self {
			name,
			options,
			data,
		}
	}

	/// Create an `EnumColumn` by looking up each value in `options`. Values that are not among the options are missing.
	pub fn from_values(name: String, options: Vec<String>, values: &[Option<&str>]) -> Self {
		let data = values
			.iter()
			.map(|value| {
				value.and_then(|value| {
					options
						.iter()
						.position(|option| option == value)
						.and_then(|position| NonZeroUsize::new(position + 1))
				})
			})
			.collect();
		Self {
			name,
			options,
			data,
		}
	}

	/// Return the zero-based option index at `index`, or `None` if the value is missing.
	pub fn level(&self, index: usize) -> Option<usize> {
		self.data[index].map(|value| value.get() - 1)
	}

	/// Return the value at `index` as a zero-based class label, with `NaN` for missing values.
	pub fn level_f32(&self, index: usize) -> f32 {
		self.level(index)
			.and_then(|level| level.to_f32())
			.unwrap_or(std::f32::NAN)
	}
}

#[cfg(test)]
fn test_frame() -> DataFrame {
	DataFrame::new(vec![
		Column::Number(NumberColumn::new(
			"age".to_owned(),
			vec![31.0, 0.0, std::f32::NAN, 45.0],
		)),
		Column::Enum(EnumColumn::from_values(
			"color".to_owned(),
			vec!["red".to_owned(), "green".to_owned()],
			&[Some("green"), None, Some("red"), Some("purple")],
		)),
		Column::Number(NumberColumn::new(
			"ratio".to_owned(),
			vec![0.5, 1.0, 0.0, 0.25],
		)),
	])
}

#[test]
fn test_shape_and_lookup() {
	let frame = test_frame();
	assert_eq!(frame.nrows(), 4);
	assert_eq!(frame.ncols(), 3);
	assert_eq!(frame.column_index("ratio"), Some(2));
	assert!(frame.column("weight").is_none());
	assert_eq!(frame.column_names(), vec!["age", "color", "ratio"]);
}

#[test]
fn test_enum_from_values() {
	let frame = test_frame();
	let color = frame.column("color").unwrap().as_enum().unwrap();
	assert_eq!(color.level(0), Some(1));
	assert_eq!(color.level(1), None);
	assert_eq!(color.level(2), Some(0));
	// Values outside of the options are missing.
	assert_eq!(color.level(3), None);
	assert!(color.level_f32(1).is_nan());
}

#[test]
fn test_column_counts() {
	let frame = test_frame();
	let age = frame.column("age").unwrap();
	assert_eq!(age.nonzero_count(), 2);
	assert_eq!(age.missing_count(), 1);
	let color = frame.column("color").unwrap();
	assert_eq!(color.nonzero_count(), 2);
	assert_eq!(color.missing_count(), 2);
}

#[test]
fn test_integral_and_binary() {
	let frame = test_frame();
	let age = frame.column("age").unwrap().as_number().unwrap();
	assert!(age.is_integral());
	assert!(!age.is_binary());
	let ratio = frame.column("ratio").unwrap().as_number().unwrap();
	assert!(!ratio.is_integral());
	let flags = NumberColumn::new("flag".to_owned(), vec![0.0, 1.0, std::f32::NAN, 1.0]);
	assert!(flags.is_binary());
	assert!(flags.is_integral());
}
