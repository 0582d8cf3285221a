//! Publisher trait, type erasure, and the operator constructors.

use crate::{
  demand::Demand,
  ops::map::Map,
  replay::{Replay, ShareReplay},
  subscriber::{BoxedSubscriber, Completion, FnSubscriber, Subscriber},
  subscription::{BoxSubscription, Subscription},
};

pub mod create;
pub mod from_future;
pub mod from_iter;

/// A factory that, given a subscriber, produces one live subscription.
///
/// Subscribing consumes the publisher value; clonable publishers (such as
/// [`Replay`]) can hand out one activation per clone.
pub trait Publisher {
  type Item;
  type Err;
  /// Concrete handle returned from [`subscribe`](Publisher::subscribe).
  type Unsub: Subscription;

  fn subscribe<S>(self, subscriber: S) -> Self::Unsub
  where
    S: Subscriber<Self::Item, Self::Err> + Send + 'static;
}

/// Object-safe mirror of [`Publisher`], used behind [`BoxPublisher`].
pub trait DynPublisher<Item, Err> {
  fn dyn_subscribe(self: Box<Self>, subscriber: BoxedSubscriber<Item, Err>) -> BoxSubscription;
}

impl<P> DynPublisher<P::Item, P::Err> for P
where
  P: Publisher,
  P::Unsub: Send + Sync + 'static,
  P::Item: 'static,
  P::Err: 'static,
{
  fn dyn_subscribe(self: Box<Self>, subscriber: BoxedSubscriber<P::Item, P::Err>) -> BoxSubscription {
    Box::new((*self).subscribe(subscriber))
  }
}

/// A publisher with its concrete type erased.
pub struct BoxPublisher<Item, Err>(Box<dyn DynPublisher<Item, Err> + Send>);

impl<Item, Err> BoxPublisher<Item, Err> {
  pub fn new<P>(publisher: P) -> Self
  where
    P: Publisher<Item = Item, Err = Err> + Send + 'static,
    P::Unsub: Send + Sync + 'static,
    Item: 'static,
    Err: 'static,
  {
    BoxPublisher(Box::new(publisher))
  }
}

impl<Item, Err> Publisher for BoxPublisher<Item, Err> {
  type Item = Item;
  type Err = Err;
  type Unsub = BoxSubscription;

  fn subscribe<S>(self, subscriber: S) -> BoxSubscription
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    self.0.dyn_subscribe(Box::new(subscriber))
  }
}

/// Operator constructors available on every publisher.
pub trait PublisherExt: Publisher + Sized {
  /// Transform every item with `f`. One item in yields exactly one item out,
  /// so demand accounting passes through unchanged.
  fn map<Out, F>(self, f: F) -> Map<Self, F, Out>
  where
    F: FnMut(Self::Item) -> Out,
  {
    Map::new(self, f)
  }

  /// Erase the concrete publisher type.
  fn boxed(self) -> BoxPublisher<Self::Item, Self::Err>
  where
    Self: Send + 'static,
    Self::Unsub: Send + Sync + 'static,
  {
    BoxPublisher::new(self)
  }

  /// Share one upstream run between many subscribers, replaying the last
  /// `capacity` items to each newcomer. Activation is explicit: nothing runs
  /// until [`Replay::connect`] is called.
  fn replay(self, capacity: usize) -> Replay<Self::Item, Self::Err>
  where
    Self: Send + 'static,
    Self::Unsub: Send + Sync + 'static,
    Self::Item: Clone + Send + 'static,
    Self::Err: Clone + Send + 'static,
  {
    Replay::new(self.boxed(), capacity)
  }

  /// [`replay`](PublisherExt::replay) that connects on the first subscribe.
  fn share_replay(self, capacity: usize) -> ShareReplay<Self::Item, Self::Err>
  where
    Self: Send + 'static,
    Self::Unsub: Send + Sync + 'static,
    Self::Item: Clone + Send + 'static,
    Self::Err: Clone + Send + 'static,
  {
    ShareReplay::new(self.replay(capacity))
  }

  /// Subscribe with a fixed opening demand; the closure's return value is
  /// granted as additional demand after each item.
  fn sink<N>(self, demand: Demand, on_value: N) -> Self::Unsub
  where
    N: FnMut(Self::Item) -> Demand + Send + 'static,
  {
    self.subscribe(FnSubscriber::new(demand, on_value, |_: Completion<Self::Err>| {}))
  }

  /// [`sink`](PublisherExt::sink) with an explicit completion callback.
  fn sink_with<N, C>(self, demand: Demand, on_value: N, on_completion: C) -> Self::Unsub
  where
    N: FnMut(Self::Item) -> Demand + Send + 'static,
    C: FnMut(Completion<Self::Err>) + Send + 'static,
  {
    self.subscribe(FnSubscriber::new(demand, on_value, on_completion))
  }
}

impl<P: Publisher> PublisherExt for P {}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::publisher::from_iter::from_iter;

  #[test]
  fn boxed_publisher_round_trip() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink_target = received.clone();

    from_iter(0..4)
      .boxed()
      .sink(Demand::Unlimited, move |v| {
        sink_target.lock().unwrap().push(v);
        Demand::NONE
      });

    assert_eq!(*received.lock().unwrap(), vec![0, 1, 2, 3]);
  }

  #[test]
  fn sink_demand_bounds_delivery() {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink_target = received.clone();

    from_iter(0..10).sink(Demand::Max(2), move |v| {
      sink_target.lock().unwrap().push(v);
      Demand::NONE
    });

    assert_eq!(*received.lock().unwrap(), vec![0, 1]);
  }

  #[test]
  fn sink_with_observes_completion() {
    let finished = Arc::new(Mutex::new(false));
    let flag = finished.clone();

    from_iter(0..3).sink_with(
      Demand::Unlimited,
      |_| Demand::NONE,
      move |completion| *flag.lock().unwrap() = completion.is_finished(),
    );

    assert!(*finished.lock().unwrap());
  }
}
