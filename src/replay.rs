//! Shared upstream execution with a bounded replay of recent items.

use std::{collections::VecDeque, sync::Arc};

use smallvec::SmallVec;

use crate::{
  demand::Demand,
  gate::Gate,
  publisher::{BoxPublisher, Publisher},
  subscriber::{Completion, Subscriber},
  subscription::{BoxSubscription, Subscription},
  sync_cell::SyncCell,
};

/// Everything the shared run mutates, guarded as one critical section:
/// buffer, completion record, listener set, and the connection slot.
struct ReplayCore<Item, Err> {
  source: Option<BoxPublisher<Item, Err>>,
  buffer: VecDeque<Item>,
  capacity: usize,
  completion: Option<Completion<Err>>,
  taps: SmallVec<[Gate<Item, Err>; 2]>,
  connection: Option<Connection>,
}

/// Clonable handle to the single shared upstream subscription.
#[derive(Clone)]
pub struct Connection(Arc<dyn Subscription + Send + Sync>);

impl Connection {
  fn new(unsub: BoxSubscription) -> Self { Connection(Arc::from(unsub)) }
}

impl Subscription for Connection {
  #[inline]
  fn request(&self, demand: Demand) { self.0.request(demand) }

  #[inline]
  fn cancel(&self) { self.0.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// Publisher fanning one upstream run out to many subscribers, replaying the
/// last `capacity` items to each newcomer.
///
/// Activation is explicit: nothing touches the upstream until
/// [`connect`](Replay::connect) subscribes the internal collector, which
/// requests unlimited demand and records every item and the terminal
/// completion. Each clone of a `Replay` is another subscribable view of the
/// same shared run. For connect-on-first-subscribe, wrap it in
/// [`ShareReplay`].
///
/// A newcomer's own demand still gates its snapshot: a subscriber that
/// requests fewer items than the buffer holds sees only that many.
pub struct Replay<Item, Err> {
  core: SyncCell<ReplayCore<Item, Err>>,
  /// Serializes `connect` callers so the upstream subscription happens
  /// outside the core critical section yet still exactly once.
  connect_lock: SyncCell<()>,
}

impl<Item, Err> Clone for Replay<Item, Err> {
  #[inline]
  fn clone(&self) -> Self {
    Replay { core: self.core.clone(), connect_lock: self.connect_lock.clone() }
  }
}

impl<Item, Err> Replay<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  pub fn new(source: BoxPublisher<Item, Err>, capacity: usize) -> Self {
    Replay {
      core: SyncCell::new(ReplayCore {
        source: Some(source),
        buffer: VecDeque::with_capacity(capacity),
        capacity,
        completion: None,
        taps: SmallVec::new(),
        connection: None,
      }),
      connect_lock: SyncCell::new(()),
    }
  }

  /// Activate the shared upstream subscription.
  ///
  /// Idempotent: the collector subscribes at most once and every call
  /// returns the same [`Connection`] handle.
  pub fn connect(&self) -> Connection {
    self.connect_lock.run(|_| {
      if let Some(connection) = self.core.run(|core| core.connection.clone()) {
        return connection;
      }
      let source = self
        .core
        .run(|core| core.source.take())
        .expect("replay source consumed before first connect");
      let unsub = source.subscribe(Collector { core: self.core.clone() });
      let connection = Connection::new(unsub);
      self.core.run(|core| core.connection = Some(connection.clone()));
      connection
    })
  }
}

/// Internal subscriber owning the shared upstream run.
struct Collector<Item, Err> {
  core: SyncCell<ReplayCore<Item, Err>>,
}

impl<Item, Err> Subscriber<Item, Err> for Collector<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn on_subscribe(&mut self, subscription: BoxSubscription) {
    subscription.request(Demand::Unlimited);
  }

  fn on_next(&mut self, value: Item) -> Demand {
    self.core.run(|core| {
      core.taps.retain(|tap| !tap.is_closed());
      for tap in core.taps.iter() {
        tap.emit(value.clone());
      }
      core.buffer.push_back(value);
      if core.buffer.len() > core.capacity {
        core.buffer.pop_front();
      }
    });
    Demand::Unlimited
  }

  fn on_complete(&mut self, completion: Completion<Err>) {
    self.core.run(|core| {
      if core.completion.is_some() {
        return;
      }
      core.completion = Some(completion.clone());
      for tap in core.taps.drain(..) {
        tap.complete(completion.clone());
      }
    });
  }
}

impl<Item, Err> Publisher for Replay<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;
  type Unsub = Gate<Item, Err>;

  fn subscribe<S>(self, mut subscriber: S) -> Gate<Item, Err>
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    let gate = Gate::new();

    let start = {
      let core = self.core.clone();
      let tap = gate.clone();
      Box::new(move |_: Demand| {
        // Snapshot and registration happen in one critical section, so no
        // upstream item can interleave with the registration point.
        core.run(|state| {
          for value in state.buffer.iter() {
            tap.emit(value.clone());
          }
          match state.completion.clone() {
            Some(completion) => tap.complete(completion),
            None => state.taps.push(tap.clone()),
          }
        });
      })
    };

    let stop = {
      let core = self.core.clone();
      Box::new(move || {
        core.run(|state| state.taps.retain(|tap| !tap.is_closed()));
      })
    };

    subscriber.on_subscribe(Box::new(gate.clone()));
    gate.install(Box::new(subscriber), Some(start), Some(stop));
    gate
  }
}

/// [`Replay`] that activates its upstream on the first subscribe.
pub struct ShareReplay<Item, Err> {
  inner: Replay<Item, Err>,
}

impl<Item, Err> Clone for ShareReplay<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { ShareReplay { inner: self.inner.clone() } }
}

impl<Item, Err> ShareReplay<Item, Err> {
  pub fn new(inner: Replay<Item, Err>) -> Self { ShareReplay { inner } }
}

impl<Item, Err> Publisher for ShareReplay<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  type Item = Item;
  type Err = Err;
  type Unsub = Gate<Item, Err>;

  fn subscribe<S>(self, subscriber: S) -> Gate<Item, Err>
  where
    S: Subscriber<Item, Err> + Send + 'static,
  {
    // Register the subscriber first so a synchronous upstream cannot finish
    // before the newcomer is listening.
    let unsub = self.inner.clone().subscribe(subscriber);
    self.inner.connect();
    unsub
  }
}
