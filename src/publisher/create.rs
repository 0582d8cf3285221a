//! Bridge from an arbitrary asynchronous unit of work into the protocol.

use std::marker::PhantomData;

use crate::{
  demand::Demand,
  gate::{Gate, StartFn, StopFn},
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::Subscription,
};

/// Producer-supplied start/stop pair bound to one subscription's lifecycle.
///
/// `start` runs at most once, on the first non-zero request, and receives the
/// demand outstanding at that moment. `stop` runs at most once, on cancel,
/// and must be safe to run when `start` never did.
pub struct Orchestrator {
  pub(crate) start: StartFn,
  pub(crate) stop: StopFn,
}

impl Orchestrator {
  pub fn new(
    start: impl FnOnce(Demand) + Send + 'static,
    stop: impl FnOnce() + Send + 'static,
  ) -> Self {
    Orchestrator { start: Box::new(start), stop: Box::new(stop) }
  }
}

/// Demand-checked emission endpoint handed to the task.
///
/// Once the subscription is cancelled or completed every call is a no-op, so
/// a task that raced a cancel can keep emitting without harm.
pub struct Emitter<Item, Err> {
  gate: Gate<Item, Err>,
}

impl<Item, Err> Clone for Emitter<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Emitter { gate: self.gate.clone() } }
}

impl<Item, Err> Emitter<Item, Err> {
  pub(crate) fn new(gate: Gate<Item, Err>) -> Self { Emitter { gate } }

  /// Offer one item. Returns the additional demand granted by the
  /// subscriber; [`Demand::NONE`] means the item was dropped.
  pub fn next(&self, value: Item) -> Demand { self.gate.emit(value) }

  /// Terminate the stream successfully.
  pub fn complete(&self) { self.gate.complete(Completion::Finished) }

  /// Terminate the stream with a failure.
  pub fn error(&self, err: Err) { self.gate.complete(Completion::Failed(err)) }

  /// Whether emission has become pointless.
  pub fn is_closed(&self) -> bool { self.gate.is_closed() }
}

/// Publisher wrapping a task that drives an [`Emitter`].
pub struct Create<F, Item, Err> {
  task: F,
  _hint: PhantomData<fn() -> (Item, Err)>,
}

/// Wrap `task` as a publisher.
///
/// The task runs at subscribe time to set up its unit of work and returns the
/// [`Orchestrator`] controlling it; the work itself should only begin when
/// the start hook fires.
pub fn create<Item, Err, F>(task: F) -> Create<F, Item, Err>
where
  F: FnOnce(Emitter<Item, Err>) -> Orchestrator,
{
  Create { task, _hint: PhantomData }
}

impl<F, Item, Err> Publisher for Create<F, Item, Err>
where
  F: FnOnce(Emitter<Item, Err>) -> Orchestrator,
  Item: Send + 'static,
  Err: Send + 'static,
{
  type Item = Item;
  type Err = Err;
  type Unsub = Gate<Item, Err>;

  fn subscribe<S>(self, mut subscriber: S) -> Gate<Item, Err>
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    let gate = Gate::new();
    let Orchestrator { start, stop } = (self.task)(Emitter::new(gate.clone()));
    subscriber.on_subscribe(Box::new(gate.clone()));
    gate.install(Box::new(subscriber), Some(start), Some(stop));
    gate
  }
}
