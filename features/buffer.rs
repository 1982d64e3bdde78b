use thiserror::Error;

/// The boosting engine addresses matrix elements with signed 32-bit indexes. This leaves a little headroom below `i32::MAX`.
pub const MAX_BUFFER_LEN: usize = i32::MAX as usize - 10;

/// Buffers start out with room for this many elements.
pub const INITIAL_BUFFER_LEN: usize = 1 << 20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BufferOptions {
	pub initial_len: usize,
	pub max_len: usize,
}

impl Default for BufferOptions {
	fn default() -> Self {
		Self {
			initial_len: INITIAL_BUFFER_LEN,
			max_len: MAX_BUFFER_LEN,
		}
	}
}

#[derive(Clone, Debug, Error, PartialEq)]
#[error("The {name} needs room for {required} elements, but at most {max_len} fit into the 32-bit indexed buffers the boosting engine accepts. The data is too large for this algorithm, train with the built-in gradient boosted trees instead.")]
pub struct CapacityError {
	pub name: &'static str,
	pub required: u64,
	pub max_len: usize,
}

/**
A `GrowableBuffer` is a vector with a hard ceiling on its length. Its capacity doubles whenever a write needs more room, until the ceiling is reached. A write that would need more room than the ceiling allows fails with a `CapacityError` instead of truncating.
*/
#[derive(Debug)]
pub struct GrowableBuffer<T> {
	name: &'static str,
	data: Vec<T>,
	capacity: usize,
	max_len: usize,
}

impl<T> GrowableBuffer<T>
where
	T: Copy + Default,
{
	pub fn new(name: &'static str, options: BufferOptions) -> Self {
		let capacity = usize::min(usize::max(options.initial_len, 1), options.max_len);
		Self {
			name,
			data: Vec::with_capacity(capacity),
			capacity,
			max_len: options.max_len,
		}
	}

	pub fn len(&self) -> usize {
		self.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.data.is_empty()
	}

	/// The number of elements this buffer can hold before it grows again.
	pub fn capacity(&self) -> usize {
		self.capacity
	}

	pub fn as_slice(&self) -> &[T] {
		&self.data
	}

	/// Make sure `additional` more elements fit, doubling the capacity as many times as needed.
	pub fn reserve(&mut self, additional: usize) -> Result<(), CapacityError> {
		let required = self
			.data
			.len()
			.checked_add(additional)
			.ok_or_else(|| self.capacity_error(u64::MAX))?;
		while self.capacity < required {
			let new_capacity = usize::min(self.capacity.saturating_mul(2), self.max_len);
			if new_capacity == self.capacity {
				return Err(self.capacity_error(required as u64));
			}
			log::info!(
				"Enlarging the {} from {} to {} elements.",
				self.name,
				self.capacity,
				new_capacity
			);
			self.data.reserve_exact(new_capacity - self.data.len());
			self.capacity = new_capacity;
		}
		Ok(())
	}

	pub fn push(&mut self, value: T) -> Result<(), CapacityError> {
		self.reserve(1)?;
		self.data.push(value);
		Ok(())
	}

	/// Append `len` default values and return them for writing.
	pub fn extend_default(&mut self, len: usize) -> Result<&mut [T], CapacityError> {
		self.reserve(len)?;
		let start = self.data.len();
		self.data.resize(start + len, T::default());
		Ok(&mut self.data[start..])
	}

	/// Trim the buffer to the occupied length and return it.
	pub fn into_vec(mut self) -> Vec<T> {
		self.data.shrink_to_fit();
		self.data
	}

	fn capacity_error(&self, required: u64) -> CapacityError {
		CapacityError {
			name: self.name,
			required,
			max_len: self.max_len,
		}
	}
}

#[test]
fn test_growth_keeps_entries() {
	let options = BufferOptions {
		initial_len: 2,
		max_len: 1024,
	};
	let mut buffer = GrowableBuffer::new("test buffer", options);
	for value in 0..100u32 {
		buffer.push(value).unwrap();
	}
	assert_eq!(buffer.capacity(), 128);
	assert_eq!(buffer.into_vec(), (0..100).collect::<Vec<u32>>());
}

#[test]
fn test_growth_is_capped() {
	let options = BufferOptions {
		initial_len: 4,
		max_len: 10,
	};
	let mut buffer = GrowableBuffer::<f32>::new("test buffer", options);
	buffer.reserve(9).unwrap();
	assert_eq!(buffer.capacity(), 10);
	buffer.extend_default(10).unwrap();
	let error = buffer.push(1.0).unwrap_err();
	assert_eq!(error.required, 11);
	assert_eq!(error.max_len, 10);
	assert!(error.to_string().contains("built-in gradient boosted trees"));
	// A failed write leaves the buffer untouched.
	assert_eq!(buffer.len(), 10);
}

#[test]
fn test_extend_default() {
	let mut buffer = GrowableBuffer::<f32>::new("test buffer", BufferOptions::default());
	let row = buffer.extend_default(3).unwrap();
	row[1] = 2.5;
	assert_eq!(buffer.as_slice(), &[0.0, 2.5, 0.0]);
	assert_eq!(buffer.capacity(), INITIAL_BUFFER_LEN);
}
