//! Demand: how many items a subscriber is currently willing to receive.

use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A saturating counter of items a subscriber permits a producer to emit.
///
/// `Demand` never goes negative: subtraction clamps at `Max(0)`, and
/// `Unlimited` absorbs every operation applied to it. `Max(0)` means "no
/// further items accepted right now"; more demand can always be merged in
/// later via `Subscription::request`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Demand {
  /// Accept at most the wrapped number of further items.
  Max(usize),
  /// Accept every item the producer can emit.
  Unlimited,
}

impl Demand {
  /// No items accepted.
  pub const NONE: Demand = Demand::Max(0);

  /// Whether no further items are accepted right now.
  #[inline]
  pub fn is_none(&self) -> bool { *self == Demand::NONE }

  /// Whether every item is accepted.
  #[inline]
  pub fn is_unlimited(&self) -> bool { matches!(self, Demand::Unlimited) }
}

impl Default for Demand {
  #[inline]
  fn default() -> Self { Demand::NONE }
}

impl Add for Demand {
  type Output = Demand;

  fn add(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Max(a), Demand::Max(b)) => Demand::Max(a.saturating_add(b)),
      _ => Demand::Unlimited,
    }
  }
}

impl AddAssign for Demand {
  #[inline]
  fn add_assign(&mut self, rhs: Demand) { *self = *self + rhs; }
}

impl Sub for Demand {
  type Output = Demand;

  /// Clamped subtraction: finite demand never underflows, and subtracting
  /// anything from `Unlimited` leaves it unlimited.
  fn sub(self, rhs: Demand) -> Demand {
    match (self, rhs) {
      (Demand::Unlimited, _) => Demand::Unlimited,
      (Demand::Max(_), Demand::Unlimited) => Demand::NONE,
      (Demand::Max(a), Demand::Max(b)) => Demand::Max(a.saturating_sub(b)),
    }
  }
}

impl SubAssign for Demand {
  #[inline]
  fn sub_assign(&mut self, rhs: Demand) { *self = *self - rhs; }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_is_saturating() {
    assert_eq!(Demand::Max(2) + Demand::Max(3), Demand::Max(5));
    assert_eq!(Demand::Max(usize::MAX) + Demand::Max(1), Demand::Max(usize::MAX));
    assert_eq!(Demand::Unlimited + Demand::Max(7), Demand::Unlimited);
    assert_eq!(Demand::Max(7) + Demand::Unlimited, Demand::Unlimited);
  }

  #[test]
  fn sub_clamps_at_zero() {
    assert_eq!(Demand::Max(3) - Demand::Max(1), Demand::Max(2));
    assert_eq!(Demand::NONE - Demand::Max(1), Demand::NONE);
    assert_eq!(Demand::Max(1) - Demand::Unlimited, Demand::NONE);
    assert_eq!(Demand::Unlimited - Demand::Max(1000), Demand::Unlimited);
  }

  #[test]
  fn unlimited_is_greater_than_every_bound() {
    assert!(Demand::Unlimited > Demand::Max(usize::MAX));
    assert!(Demand::Max(1) > Demand::NONE);
    assert!(Demand::Max(2) < Demand::Max(3));
  }

  #[test]
  fn zero_checks() {
    assert!(Demand::NONE.is_none());
    assert!(!Demand::Max(1).is_none());
    assert!(Demand::Unlimited.is_unlimited());
    assert!(!Demand::Unlimited.is_none());
  }
}
