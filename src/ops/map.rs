//! Stateless one-in/one-out transform between the demand gate and the
//! subscriber.

use std::marker::PhantomData;

use crate::{
  demand::Demand,
  publisher::Publisher,
  subscriber::{Completion, Subscriber},
  subscription::BoxSubscription,
};

/// Publisher applying `f` to every upstream item.
///
/// Created by `PublisherExt::map`. Demand-neutral: one item in yields exactly
/// one item out, and the upstream subscription handle is forwarded to the
/// downstream subscriber untouched, so cancelling downstream cancels the
/// source directly.
pub struct Map<P, F, Out> {
  source: P,
  f: F,
  _hint: PhantomData<fn() -> Out>,
}

impl<P, F, Out> Map<P, F, Out> {
  pub(crate) fn new(source: P, f: F) -> Self { Map { source, f, _hint: PhantomData } }
}

impl<P, F, Out> Publisher for Map<P, F, Out>
where
  P: Publisher,
  F: FnMut(P::Item) -> Out + Send + 'static,
{
  type Item = Out;
  type Err = P::Err;
  type Unsub = P::Unsub;

  fn subscribe<S>(self, subscriber: S) -> Self::Unsub
  where
    S: Subscriber<Out, P::Err> + Send + 'static,
  {
    self.source.subscribe(MapSubscriber { inner: subscriber, f: self.f })
  }
}

/// Proxy subscriber transforming items on their way downstream.
pub struct MapSubscriber<S, F> {
  inner: S,
  f: F,
}

impl<Item, Out, Err, S, F> Subscriber<Item, Err> for MapSubscriber<S, F>
where
  S: Subscriber<Out, Err>,
  F: FnMut(Item) -> Out,
{
  #[inline]
  fn on_subscribe(&mut self, subscription: BoxSubscription) { self.inner.on_subscribe(subscription) }

  #[inline]
  fn on_next(&mut self, value: Item) -> Demand { self.inner.on_next((self.f)(value)) }

  #[inline]
  fn on_complete(&mut self, completion: Completion<Err>) { self.inner.on_complete(completion) }
}
