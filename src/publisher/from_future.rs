//! Bridge a `Future` into the protocol via the shared worker pool.

use std::convert::Infallible;

use futures::future::{abortable, Future};

use crate::{
  demand::Demand,
  gate::Gate,
  pool,
  publisher::{create::Emitter, Publisher},
  subscriber::Subscriber,
};

/// Publisher resolving a future into a single item followed by completion.
pub struct FromFuture<F> {
  future: F,
}

/// Run `future` on the shared pool once demand arrives; its output becomes
/// the stream's only item. Cancelling the subscription aborts the future.
///
/// The output still counts against demand: subscribe with at least one unit
/// or the resolved value is dropped.
pub fn from_future<F>(future: F) -> FromFuture<F>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  FromFuture { future }
}

impl<F> Publisher for FromFuture<F>
where
  F: Future + Send + 'static,
  F::Output: Send + 'static,
{
  type Item = F::Output;
  type Err = Infallible;
  type Unsub = Gate<F::Output, Infallible>;

  fn subscribe<S>(self, mut subscriber: S) -> Self::Unsub
  where
    S: Subscriber<F::Output, Infallible> + Send + 'static,
  {
    let gate = Gate::new();
    let emitter = Emitter::new(gate.clone());
    let (future, abort) = abortable(self.future);
    let start = move |_: Demand| {
      pool::global().spawn_ok(async move {
        if let Ok(value) = future.await {
          emitter.next(value);
          emitter.complete();
        }
      });
    };
    let stop = move || abort.abort();
    subscriber.on_subscribe(Box::new(gate.clone()));
    gate.install(Box::new(subscriber), Some(Box::new(start)), Some(Box::new(stop)));
    gate
  }
}
