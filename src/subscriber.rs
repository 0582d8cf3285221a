//! Subscriber: the consumer half of the protocol, plus closure adapters.

use crate::{demand::Demand, subscription::BoxSubscription};

/// Terminal signal ending a subscription's item stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion<Err> {
  /// The producer ran out of items.
  Finished,
  /// The producer failed; no further items follow.
  Failed(Err),
}

impl<Err> Completion<Err> {
  #[inline]
  pub fn is_finished(&self) -> bool { matches!(self, Completion::Finished) }

  #[inline]
  pub fn is_failed(&self) -> bool { matches!(self, Completion::Failed(_)) }
}

/// Consumer of one subscription's items.
///
/// `on_next` returns the *additional* demand the subscriber grants on top of
/// what it already requested; returning [`Demand::NONE`] leaves the
/// outstanding demand as it is. Callbacks run inside the subscription's
/// critical section, so they must not call `request`/`cancel` on their own
/// subscription — grant demand through the return value instead.
pub trait Subscriber<Item, Err> {
  /// Receive the handle for the freshly created subscription. Requesting
  /// demand from here is the usual way to set the stream in motion.
  fn on_subscribe(&mut self, subscription: BoxSubscription);

  /// Receive one item. Only called while outstanding demand is non-zero.
  fn on_next(&mut self, value: Item) -> Demand;

  /// Receive the terminal signal. Called at most once; after it the
  /// subscriber is released by the producer side.
  fn on_complete(&mut self, completion: Completion<Err>);
}

/// Boxed subscriber as stored on the producer side of a subscription.
pub type BoxedSubscriber<Item, Err> = Box<dyn Subscriber<Item, Err> + Send>;

impl<Item, Err> Subscriber<Item, Err> for Box<dyn Subscriber<Item, Err> + Send> {
  #[inline]
  fn on_subscribe(&mut self, subscription: BoxSubscription) { (**self).on_subscribe(subscription) }

  #[inline]
  fn on_next(&mut self, value: Item) -> Demand { (**self).on_next(value) }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { (**self).on_complete(completion) }
}

/// Closure-backed subscriber.
///
/// Requests `initial` demand as soon as it is subscribed, hands every item to
/// the value closure, and returns that closure's result as additional demand.
pub struct FnSubscriber<N, C> {
  initial: Demand,
  on_value: N,
  on_completion: C,
}

impl<N, C> FnSubscriber<N, C> {
  pub fn new(initial: Demand, on_value: N, on_completion: C) -> Self {
    FnSubscriber { initial, on_value, on_completion }
  }
}

impl<Item, Err, N, C> Subscriber<Item, Err> for FnSubscriber<N, C>
where
  N: FnMut(Item) -> Demand,
  C: FnMut(Completion<Err>),
{
  fn on_subscribe(&mut self, subscription: BoxSubscription) { subscription.request(self.initial); }

  fn on_next(&mut self, value: Item) -> Demand { (self.on_value)(value) }

  fn on_complete(&mut self, completion: Completion<Err>) { (self.on_completion)(completion) }
}

#[cfg(test)]
mod tests {
  use std::convert::Infallible;

  use super::*;

  #[test]
  fn closure_subscriber_forwards_values_and_demand() {
    let mut total = 0;
    let mut subscriber =
      FnSubscriber::new(Demand::Max(2), |v: i32| {
        total += v;
        Demand::Max(1)
      }, |_: Completion<Infallible>| {});

    assert_eq!(Subscriber::<i32, Infallible>::on_next(&mut subscriber, 10), Demand::Max(1));
    assert_eq!(Subscriber::<i32, Infallible>::on_next(&mut subscriber, 20), Demand::Max(1));
    drop(subscriber);
    assert_eq!(total, 30);
  }

  #[test]
  fn completion_predicates() {
    assert!(Completion::<&str>::Finished.is_finished());
    assert!(Completion::Failed("boom").is_failed());
    assert!(!Completion::Failed("boom").is_finished());
  }
}
