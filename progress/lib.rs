#![allow(clippy::tabs_in_doc_comments)]

use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc, Mutex,
};

/**
A `ProgressCounter` tracks how many units of a job have completed, along with an optional status message. Clones share the same state, so the thread running the job can hold one clone while a job tracker polls another.

```
use gbm_bridge_progress::ProgressCounter;

let progress_counter = ProgressCounter::new(100);
let tracker = progress_counter.clone();
progress_counter.inc(1);
progress_counter.set_message("Built 1 trees so far (out of 100).");
assert_eq!(tracker.get(), 1);
assert_eq!(tracker.message().as_deref(), Some("Built 1 trees so far (out of 100)."));
```

The counter only moves forward. Setting a value lower than the current one has no effect, and the value never exceeds `total`.
*/
#[derive(Clone, Debug)]
pub struct ProgressCounter {
	current: Arc<AtomicU64>,
	total: u64,
	message: Arc<Mutex<Option<String>>>,
}

impl ProgressCounter {
	/// A build of `total` trees starts at zero.
	pub fn new(total: u64) -> Self {
		Self {
			current: Arc::new(AtomicU64::new(0)),
			total,
			message: Arc::new(Mutex::new(None)),
		}
	}

	pub fn total(&self) -> u64 {
		self.total
	}

	/// The number of completed units.
	pub fn get(&self) -> u64 {
		self.current.load(Ordering::Relaxed)
	}

	/// Move the current progress value forward to `value`.
	pub fn set(&self, value: u64) {
		self.current
			.fetch_max(u64::min(value, self.total), Ordering::Relaxed);
	}

	/// Add `amount` completed units, stopping at `total`.
	pub fn inc(&self, amount: u64) {
		let _ = self
			.current
			.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
				Some(u64::min(current.saturating_add(amount), self.total))
			});
	}

	/// Advance the progress value to `total`.
	pub fn finish(&self) {
		self.set(self.total);
	}

	pub fn is_finished(&self) -> bool {
		self.get() >= self.total
	}

	pub fn set_message(&self, message: impl Into<String>) {
		if let Ok(mut current) = self.message.lock() {
			*current = Some(message.into());
		}
	}

	pub fn message(&self) -> Option<String> {
		self.message
			.lock()
			.ok()
			.and_then(|message| message.clone())
	}
}

#[test]
fn test_inc_and_finish() {
	let progress_counter = ProgressCounter::new(10);
	progress_counter.inc(3);
	assert_eq!(progress_counter.get(), 3);
	progress_counter.inc(20);
	assert_eq!(progress_counter.get(), 10);
	assert!(progress_counter.is_finished());
}

#[test]
fn test_set_is_monotonic() {
	let progress_counter = ProgressCounter::new(10);
	progress_counter.set(6);
	progress_counter.set(2);
	assert_eq!(progress_counter.get(), 6);
	progress_counter.finish();
	assert_eq!(progress_counter.get(), 10);
}

#[test]
fn test_clones_share_state() {
	let progress_counter = ProgressCounter::new(4);
	let tracker = progress_counter.clone();
	assert_eq!(tracker.message(), None);
	progress_counter.inc(1);
	progress_counter.set_message("working");
	assert_eq!(tracker.get(), 1);
	assert_eq!(tracker.message(), Some("working".to_owned()));
}
