//! Mutual exclusion wrapper for state shared across producer and consumer
//! threads.

use std::sync::{Arc, Mutex};

/// A clonable handle to a mutex-guarded value.
///
/// Every shared-mutable field of the protocol (current demand, consumer slot,
/// hook slots, replay buffers) lives inside one of these and is only touched
/// through [`run`](SyncCell::run), which holds the lock for the duration of
/// the closure. A poisoned lock means a callback panicked inside a critical
/// section, which the protocol does not recover from.
pub struct SyncCell<T>(Arc<Mutex<T>>);

impl<T> SyncCell<T> {
  pub fn new(value: T) -> Self { SyncCell(Arc::new(Mutex::new(value))) }

  /// Run `job` with exclusive access to the value.
  pub fn run<R>(&self, job: impl FnOnce(&mut T) -> R) -> R {
    let mut guard = self.0.lock().unwrap();
    job(&mut guard)
  }

  /// Replace the value.
  pub fn set(&self, value: T) { self.run(|slot| *slot = value); }
}

impl<T: Clone> SyncCell<T> {
  /// Clone the current value out.
  pub fn get(&self) -> T { self.run(|value| value.clone()) }
}

impl<T> Clone for SyncCell<T> {
  #[inline]
  fn clone(&self) -> Self { SyncCell(self.0.clone()) }
}

impl<T: Default> Default for SyncCell<T> {
  fn default() -> Self { SyncCell::new(T::default()) }
}
