//! Cold, demand-paced sources backed by an iterator.

use std::convert::Infallible;

use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{BoxedSubscriber, Completion, Subscriber},
  subscription::Subscription,
  sync_cell::SyncCell,
};

/// Publisher emitting the items of an iterator, one per unit of demand.
pub struct FromIter<I> {
  iter: I,
}

/// Emit every item of `source`, paced by demand, then finish.
pub fn from_iter<I>(source: I) -> FromIter<I::IntoIter>
where
  I: IntoIterator,
{
  FromIter { iter: source.into_iter() }
}

/// Emit a single value, then finish.
pub fn of<Item>(value: Item) -> FromIter<std::iter::Once<Item>> { from_iter(std::iter::once(value)) }

struct IterState<I: Iterator> {
  iter: I,
  subscriber: Option<BoxedSubscriber<I::Item, Infallible>>,
  demand: Demand,
  done: bool,
}

/// Subscription driving an iterator source.
///
/// Items are pulled only while demand is outstanding; a later `request`
/// resumes the drain where it stopped. Exhaustion is observed by the drain,
/// so completion is delivered the first time a pull out-runs the iterator.
pub struct IterSubscription<I: Iterator> {
  state: SyncCell<IterState<I>>,
}

impl<I: Iterator> Clone for IterSubscription<I> {
  #[inline]
  fn clone(&self) -> Self { IterSubscription { state: self.state.clone() } }
}

impl<I: Iterator> IterSubscription<I> {
  fn new(iter: I) -> Self {
    IterSubscription {
      state: SyncCell::new(IterState { iter, subscriber: None, demand: Demand::NONE, done: false }),
    }
  }

  fn attach(&self, subscriber: BoxedSubscriber<I::Item, Infallible>) {
    self.state.run(|state| {
      if state.done {
        return;
      }
      state.subscriber = Some(subscriber);
      drain(state);
    });
  }
}

/// Pull items while demand lasts; deliver completion on exhaustion.
fn drain<I: Iterator>(state: &mut IterState<I>) {
  while !state.demand.is_none() {
    match state.iter.next() {
      Some(value) => {
        state.demand -= Demand::Max(1);
        if let Some(subscriber) = state.subscriber.as_mut() {
          state.demand += subscriber.on_next(value);
        }
      }
      None => {
        state.done = true;
        if let Some(mut subscriber) = state.subscriber.take() {
          subscriber.on_complete(Completion::Finished);
        }
        return;
      }
    }
  }
}

impl<I: Iterator> Subscription for IterSubscription<I> {
  fn request(&self, demand: Demand) {
    self.state.run(|state| {
      if state.done {
        return;
      }
      state.demand += demand;
      if state.subscriber.is_some() {
        drain(state);
      }
    });
  }

  fn cancel(&self) {
    self.state.run(|state| {
      state.done = true;
      state.subscriber = None;
    });
  }

  fn is_closed(&self) -> bool { self.state.run(|state| state.done) }
}

impl<I> Publisher for FromIter<I>
where
  I: Iterator + Send + 'static,
  I::Item: Send + 'static,
{
  type Item = I::Item;
  type Err = Infallible;
  type Unsub = IterSubscription<I>;

  fn subscribe<S>(self, mut subscriber: S) -> IterSubscription<I>
  where
    S: Subscriber<I::Item, Infallible> + Send + 'static,
  {
    let subscription = IterSubscription::new(self.iter);
    subscriber.on_subscribe(Box::new(subscription.clone()));
    subscription.attach(Box::new(subscriber));
    subscription
  }
}
