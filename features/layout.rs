use crate::buffer::MAX_BUFFER_LEN;
use gbm_bridge_dataframe::{Column, DataFrame};
use std::{io::Write, num::NonZeroUsize, path::Path};
use thiserror::Error;

/**
A `FeatureLayout` describes how the columns of a dataframe expand into the columns of a training matrix. Enum columns come first and are one-hot encoded, each into a contiguous range of `options.len() + 1` matrix columns. Option `k` (1-based) maps to `offset + k - 1`, and the last column of each range is reserved for missing values. Number columns follow in a single contiguous block, one matrix column each.

# Example

| dataframe column      | matrix columns          |
|-----------------------|-------------------------|
| color: [red, green]   | 0: color.red            |
|                       | 1: color.green          |
|                       | 2: color.missing(NA)    |
| age: number           | 3: age                  |

Here `cat_offsets` is `[0, 3]` and `full_width` is 4.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureLayout {
	/// These are the names of the enum columns, in layout order.
	pub cat_columns: Vec<String>,
	/// These are the names of the number columns, in layout order.
	pub num_columns: Vec<String>,
	/// `cat_options[i]` are the options of enum column `i`. Enum values of other frames are matched to them by name.
	pub cat_options: Vec<Vec<String>>,
	/// `cat_offsets[i]` is the first matrix column of enum column `i`. The last entry is the total one-hot width.
	pub cat_offsets: Vec<usize>,
	/// One name per matrix column.
	pub feature_names: Vec<String>,
	pub feature_map: FeatureMap,
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum LayoutError {
	#[error("The dataset expands to {width} feature columns, but at most {max_width} are supported.")]
	TooWide { width: u64, max_width: usize },
}

impl FeatureLayout {
	/// Compute the layout for every column of `frame` except those named in `excluded_columns`.
	pub fn compute(frame: &DataFrame, excluded_columns: &[&str]) -> Result<Self, LayoutError> {
		let feature_columns = frame
			.columns
			.iter()
			.filter(|column| !excluded_columns.contains(&column.name()));
		let mut cat_columns = Vec::new();
		let mut num_columns = Vec::new();
		for column in feature_columns {
			match column {
				Column::Enum(_) => cat_columns.push(column),
				Column::Number(_) => num_columns.push(column),
			}
		}

		// Compute the offsets with u64 arithmetic so a huge number of options cannot wrap.
		let mut cat_offsets = Vec::with_capacity(cat_columns.len() + 1);
		let mut width: u64 = 0;
		cat_offsets.push(0);
		for column in cat_columns.iter() {
			let n_options = column.as_enum().map(|column| column.options.len()).unwrap_or(0);
			width += n_options as u64 + 1;
			check_width(width)?;
			cat_offsets.push(width as usize);
		}
		width += num_columns.len() as u64;
		check_width(width)?;

		let mut feature_names = Vec::with_capacity(width as usize);
		let mut entries = Vec::with_capacity(width as usize);
		for column in cat_columns.iter().filter_map(|column| column.as_enum()) {
			for option in column.options.iter() {
				feature_names.push(format!("{}.{}", column.name, option));
			}
			feature_names.push(format!("{}.missing(NA)", column.name));
		}
		for (index, name) in feature_names.iter().enumerate() {
			entries.push(FeatureMapEntry {
				index,
				name: sanitize(name),
				feature_type: FeatureType::Indicator,
			});
		}
		for column in num_columns.iter().filter_map(|column| column.as_number()) {
			let feature_type = if column.is_binary() {
				FeatureType::Indicator
			} else if column.is_integral() {
				FeatureType::Integer
			} else {
				FeatureType::Quantitative
			};
			entries.push(FeatureMapEntry {
				index: feature_names.len(),
				name: sanitize(&column.name),
				feature_type,
			});
			feature_names.push(column.name.clone());
		}

		Ok(Self {
			cat_columns: cat_columns
				.iter()
				.map(|column| column.name().to_owned())
				.collect(),
			num_columns: num_columns
				.iter()
				.map(|column| column.name().to_owned())
				.collect(),
			cat_options: cat_columns
				.iter()
				.filter_map(|column| column.as_enum())
				.map(|column| column.options.clone())
				.collect(),
			cat_offsets,
			feature_names,
			feature_map: FeatureMap { entries },
		})
	}

	pub fn cat_count(&self) -> usize {
		self.cat_columns.len()
	}

	pub fn num_count(&self) -> usize {
		self.num_columns.len()
	}

	/// The number of matrix columns taken by the one-hot encoded enum columns.
	pub fn categorical_width(&self) -> usize {
		self.cat_offsets.last().copied().unwrap_or(0)
	}

	pub fn full_width(&self) -> usize {
		self.categorical_width() + self.num_count()
	}

	/// Return the matrix column reserved for missing values of enum column `cat_index`.
	pub fn missing_id(&self, cat_index: usize) -> usize {
		self.cat_offsets[cat_index + 1] - 1
	}

	/// Return the matrix column for the value of enum column `cat_index`. Missing values and values outside the column's options map to the reserved missing column.
	pub fn categorical_id(&self, cat_index: usize, value: Option<NonZeroUsize>) -> usize {
		let offset = self.cat_offsets[cat_index];
		let missing_id = self.missing_id(cat_index);
		value
			.and_then(|value| offset.checked_add(value.get() - 1))
			.filter(|id| *id < missing_id)
			.unwrap_or(missing_id)
	}

	/**
	Map the options of an enum column from another frame onto the options of enum column `cat_index`. Entry `k - 1` of the result is the level in this layout of option `k` in `options`, or `None` if this layout has no option with that name.
	*/
	pub fn level_map(&self, cat_index: usize, options: &[String]) -> Vec<Option<NonZeroUsize>> {
		let layout_options = &self.cat_options[cat_index];
		options
			.iter()
			.map(|option| {
				layout_options
					.iter()
					.position(|layout_option| layout_option == option)
					.and_then(|index| NonZeroUsize::new(index + 1))
			})
			.collect()
	}

	/// Return the matrix column for number column `num_index`.
	pub fn numeric_id(&self, num_index: usize) -> usize {
		self.categorical_width() + num_index
	}
}

fn check_width(width: u64) -> Result<(), LayoutError> {
	if width > MAX_BUFFER_LEN as u64 {
		Err(LayoutError::TooWide {
			width,
			max_width: MAX_BUFFER_LEN,
		})
	} else {
		Ok(())
	}
}

fn sanitize(name: &str) -> String {
	name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// The feature map names and types every matrix column. The boosting engine reads it to report feature importances by name.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMap {
	pub entries: Vec<FeatureMapEntry>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FeatureMapEntry {
	pub index: usize,
	pub name: String,
	pub feature_type: FeatureType,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FeatureType {
	/// A 0/1 indicator, either a one-hot dimension or a binary number column.
	Indicator,
	/// A number column that only holds whole numbers.
	Integer,
	Quantitative,
}

impl std::fmt::Display for FeatureType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let tag = match self {
			FeatureType::Indicator => "i",
			FeatureType::Integer => "int",
			FeatureType::Quantitative => "q",
		};
		write!(f, "{}", tag)
	}
}

impl std::fmt::Display for FeatureMap {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		for entry in self.entries.iter() {
			writeln!(f, "{} {} {}", entry.index, entry.name, entry.feature_type)?;
		}
		Ok(())
	}
}

impl FeatureMap {
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn write_to_path(&self, path: &Path) -> std::io::Result<()> {
		let mut file = std::fs::File::create(path)?;
		file.write_all(self.to_string().as_bytes())?;
		file.sync_all()
	}
}

#[cfg(test)]
fn test_frame() -> DataFrame {
	use gbm_bridge_dataframe::{EnumColumn, NumberColumn};
	DataFrame::new(vec![
		Column::Number(NumberColumn::new(
			"house age".to_owned(),
			vec![12.0, 3.0, std::f32::NAN],
		)),
		Column::Enum(EnumColumn::from_values(
			"color".to_owned(),
			vec!["red".to_owned(), "dark green".to_owned()],
			&[Some("red"), None, Some("dark green")],
		)),
		Column::Number(NumberColumn::new(
			"price".to_owned(),
			vec![1.5, 2.25, 3.0],
		)),
		Column::Number(NumberColumn::new(
			"has_pool".to_owned(),
			vec![0.0, 1.0, 1.0],
		)),
		Column::Enum(EnumColumn::from_values(
			"size".to_owned(),
			vec!["s".to_owned(), "m".to_owned(), "l".to_owned()],
			&[Some("s"), Some("l"), Some("m")],
		)),
	])
}

#[test]
fn test_layout_offsets() {
	let frame = test_frame();
	let layout = FeatureLayout::compute(&frame, &["price"]).unwrap();
	assert_eq!(layout.cat_columns, vec!["color", "size"]);
	assert_eq!(layout.num_columns, vec!["house age", "has_pool"]);
	assert_eq!(layout.cat_offsets, vec![0, 3, 7]);
	assert_eq!(layout.full_width(), 9);
	assert_eq!(layout.feature_names.len(), layout.full_width());
	assert_eq!(layout.feature_map.len(), layout.full_width());
	assert_eq!(layout.categorical_id(0, None), 2);
	assert_eq!(layout.categorical_id(0, NonZeroUsize::new(1)), 0);
	assert_eq!(layout.categorical_id(0, NonZeroUsize::new(2)), 1);
	assert_eq!(layout.categorical_id(1, NonZeroUsize::new(3)), 5);
	assert_eq!(layout.missing_id(1), 6);
	// Out of range levels fall into the missing bucket.
	assert_eq!(layout.categorical_id(0, NonZeroUsize::new(3)), 2);
	assert_eq!(layout.numeric_id(1), 8);
}

#[test]
fn test_feature_map_text() {
	let frame = test_frame();
	let layout = FeatureLayout::compute(&frame, &["price"]).unwrap();
	insta::assert_snapshot!(layout.feature_map.to_string(), @r###"
 0 color.red i
 1 color.darkgreen i
 2 color.missing(NA) i
 3 size.s i
 4 size.m i
 5 size.l i
 6 size.missing(NA) i
 7 houseage int
 8 has_pool i
 "###);
}

#[test]
fn test_quantitative_feature_type() {
	let frame = test_frame();
	let layout = FeatureLayout::compute(&frame, &[]).unwrap();
	let price = layout
		.feature_map
		.entries
		.iter()
		.find(|entry| entry.name == "price")
		.unwrap();
	assert_eq!(price.feature_type, FeatureType::Quantitative);
	assert_eq!(price.index, 8);
}

#[test]
fn test_write_feature_map() {
	let frame = test_frame();
	let layout = FeatureLayout::compute(&frame, &[]).unwrap();
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("featureMap.txt");
	layout.feature_map.write_to_path(&path).unwrap();
	let text = std::fs::read_to_string(&path).unwrap();
	assert_eq!(text.lines().count(), 10);
	assert!(text.starts_with("0 color.red i\n1 color.darkgreen i\n2 color.missing(NA) i\n"));
}

#[test]
fn test_level_map_matches_options_by_name() {
	let frame = test_frame();
	let layout = FeatureLayout::compute(&frame, &[]).unwrap();
	assert_eq!(layout.cat_options[1], vec!["s", "m", "l"]);
	let options = vec!["l".to_owned(), "xl".to_owned(), "s".to_owned()];
	assert_eq!(
		layout.level_map(1, &options),
		vec![NonZeroUsize::new(3), None, NonZeroUsize::new(1)]
	);
}
