//! Subscription handles: demand requests and cancellation.

use std::sync::Arc;

use crate::demand::Demand;

/// Handle a subscriber uses to pull items and to tear the link down.
///
/// All methods take `&self`: implementations route through interior mutability
/// so one handle can be cloned to the producer thread while the consumer keeps
/// another.
pub trait Subscription {
  /// Merge `demand` into the outstanding demand. The first non-zero request
  /// starts the producer's work.
  fn request(&self, demand: Demand);

  /// Stop delivery and give the producer its chance to release resources.
  /// Idempotent; once this returns, the subscriber will not be called again.
  fn cancel(&self);

  /// Whether the link is terminal (cancelled, or completion delivered).
  fn is_closed(&self) -> bool;
}

/// Type-erased subscription handle delivered to `Subscriber::on_subscribe`.
pub type BoxSubscription = Box<dyn Subscription + Send + Sync>;

impl<S: Subscription + ?Sized> Subscription for Box<S> {
  #[inline]
  fn request(&self, demand: Demand) { (**self).request(demand) }

  #[inline]
  fn cancel(&self) { (**self).cancel() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

impl<S: Subscription + ?Sized> Subscription for Arc<S> {
  #[inline]
  fn request(&self, demand: Demand) { (**self).request(demand) }

  #[inline]
  fn cancel(&self) { (**self).cancel() }

  #[inline]
  fn is_closed(&self) -> bool { (**self).is_closed() }
}

/// An RAII wrapper cancelling the subscription when dropped.
///
/// If you do not assign the guard to a variable it is dropped immediately,
/// which cancels the subscription on the spot.
#[must_use]
pub struct SubscriptionGuard<S: Subscription>(S);

impl<S: Subscription> SubscriptionGuard<S> {
  pub fn new(subscription: S) -> Self { SubscriptionGuard(subscription) }
}

impl<S: Subscription> Subscription for SubscriptionGuard<S> {
  #[inline]
  fn request(&self, demand: Demand) { self.0.request(demand) }

  #[inline]
  fn cancel(&self) { self.0.cancel() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<S: Subscription> Drop for SubscriptionGuard<S> {
  #[inline]
  fn drop(&mut self) { self.0.cancel() }
}
