use std::{
	sync::{
		atomic::{AtomicBool, AtomicU64, Ordering},
		Arc,
	},
	time::{SystemTime, UNIX_EPOCH},
};

/// A source of wall clock time in milliseconds.
pub trait Clock: Send + Sync {
	fn now_millis(&self) -> u64;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now_millis(&self) -> u64 {
		SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|duration| duration.as_millis() as u64)
			.unwrap_or(0)
	}
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicU64);

impl ManualClock {
	pub fn new(start: u64) -> Self {
		Self(AtomicU64::new(start))
	}

	pub fn advance(&self, millis: u64) {
		self.0.fetch_add(millis, Ordering::SeqCst);
	}
}

impl Clock for ManualClock {
	fn now_millis(&self) -> u64 {
		self.0.load(Ordering::SeqCst)
	}
}

/**
`JobControl` carries the cooperative stop signals of a build: a cancel request and an optional deadline. The driver polls both once per round. A build that runs out of time still scores its final model, while a cancelled build does not. Clones share the same cancel flag.
*/
#[derive(Clone, Debug, Default)]
pub struct JobControl {
	cancel_requested: Arc<AtomicBool>,
	deadline: Option<u64>,
}

impl JobControl {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn cancel(&self) {
		self.cancel_requested.store(true, Ordering::SeqCst);
	}

	pub fn is_cancel_requested(&self) -> bool {
		self.cancel_requested.load(Ordering::SeqCst)
	}

	/// Stop the build at `deadline`, in clock milliseconds.
	pub fn set_deadline(&mut self, deadline: u64) {
		self.deadline = Some(deadline);
	}

	pub fn deadline(&self) -> Option<u64> {
		self.deadline
	}

	pub fn is_timed_out(&self, now: u64) -> bool {
		self.deadline.map(|deadline| now >= deadline).unwrap_or(false)
	}
}

#[test]
fn test_cancel_is_shared() {
	let control = JobControl::new();
	let handle = control.clone();
	assert!(!control.is_cancel_requested());
	handle.cancel();
	assert!(control.is_cancel_requested());
}

#[test]
fn test_deadline() {
	let mut control = JobControl::new();
	assert!(!control.is_timed_out(u64::MAX));
	control.set_deadline(5000);
	assert!(!control.is_timed_out(4999));
	assert!(control.is_timed_out(5000));
}

#[test]
fn test_manual_clock() {
	let clock = ManualClock::new(10);
	clock.advance(5);
	assert_eq!(clock.now_millis(), 15);
	assert!(SystemClock.now_millis() > 0);
}
