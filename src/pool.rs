//! Shared worker pool for producer-side background work.

use futures::executor::ThreadPool;
use once_cell::sync::Lazy;

static POOL: Lazy<ThreadPool> = Lazy::new(|| {
  ThreadPool::builder()
    .name_prefix("pullcast-worker-")
    .create()
    .expect("spawn shared worker pool")
});

/// The process-wide pool used by `from_future` and create-style producers.
pub fn global() -> &'static ThreadPool { &POOL }

/// Run `job` on the shared pool.
pub fn spawn(job: impl FnOnce() + Send + 'static) { POOL.spawn_ok(async move { job() }); }
