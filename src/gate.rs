//! The demand-gated link between one producer activation and one subscriber.

use crate::{
  demand::Demand,
  subscriber::{BoxedSubscriber, Completion, Subscriber},
  subscription::Subscription,
  sync_cell::SyncCell,
};

pub(crate) type StartFn = Box<dyn FnOnce(Demand) + Send>;
pub(crate) type StopFn = Box<dyn FnOnce() + Send>;

struct GateState<Item, Err> {
  demand: Demand,
  subscriber: Option<BoxedSubscriber<Item, Err>>,
  start: Option<StartFn>,
  stop: Option<StopFn>,
  started: bool,
  terminal: bool,
  /// Completion that arrived before the subscriber was installed.
  pending: Option<Completion<Err>>,
}

impl<Item, Err> GateState<Item, Err> {
  /// Claim the start hook once demand first becomes non-zero.
  fn start_if_due(&mut self) -> Option<(StartFn, Demand)> {
    if self.started || self.demand.is_none() {
      return None;
    }
    let start = self.start.take()?;
    self.started = true;
    Some((start, self.demand))
  }
}

/// Demand accounting and delivery for one subscription.
///
/// Every field lives behind one [`SyncCell`], and items are handed to the
/// subscriber inside that critical section. This is what guarantees that no
/// subscriber call can happen after `cancel` has returned: a delivery racing
/// the cancel either finishes first or finds the subscriber slot already
/// cleared. The flip side is that subscriber callbacks must not call
/// `request`/`cancel` on their own subscription; additional demand is
/// returned from `on_next` instead.
pub struct Gate<Item, Err> {
  state: SyncCell<GateState<Item, Err>>,
}

impl<Item, Err> Clone for Gate<Item, Err> {
  #[inline]
  fn clone(&self) -> Self { Gate { state: self.state.clone() } }
}

impl<Item, Err> Gate<Item, Err> {
  pub(crate) fn new() -> Self {
    Gate {
      state: SyncCell::new(GateState {
        demand: Demand::NONE,
        subscriber: None,
        start: None,
        stop: None,
        started: false,
        terminal: false,
        pending: None,
      }),
    }
  }

  /// Install the subscriber and producer hooks once `on_subscribe` has run.
  ///
  /// Demand requested during `on_subscribe` is already recorded, so if any is
  /// outstanding the start hook fires here. A cancel that raced ahead of the
  /// install still runs the stop hook; a completion that did is delivered to
  /// the subscriber now.
  pub(crate) fn install(
    &self,
    subscriber: BoxedSubscriber<Item, Err>,
    start: Option<StartFn>,
    stop: Option<StopFn>,
  ) {
    let outcome = self.state.run(move |state| {
      if state.terminal {
        return Err(stop);
      }
      if let Some(completion) = state.pending.take() {
        state.terminal = true;
        state.stop = stop;
        let mut subscriber = subscriber;
        subscriber.on_complete(completion);
        return Ok(None);
      }
      state.subscriber = Some(subscriber);
      state.start = start;
      state.stop = stop;
      Ok(state.start_if_due())
    });
    match outcome {
      Ok(Some((start, demand))) => start(demand),
      Err(Some(stop)) => stop(),
      Ok(None) | Err(None) => {}
    }
  }

  /// Producer-side emission.
  ///
  /// Returns the additional demand granted by the subscriber;
  /// [`Demand::NONE`] means the item was dropped (no outstanding demand, or
  /// the subscription is terminal). Dropping is the tolerated response to a
  /// producer overrunning its demand — racing threads make strict
  /// enforcement unreliable.
  pub(crate) fn emit(&self, value: Item) -> Demand {
    self.state.run(|state| {
      if state.demand.is_none() {
        return Demand::NONE;
      }
      let subscriber = match state.subscriber.as_mut() {
        Some(subscriber) => subscriber,
        None => return Demand::NONE,
      };
      state.demand -= Demand::Max(1);
      let additional = subscriber.on_next(value);
      state.demand += additional;
      additional
    })
  }

  /// Producer-side terminal signal. Delivered to the subscriber at most
  /// once; the subscriber is released afterwards.
  pub(crate) fn complete(&self, completion: Completion<Err>) {
    self.state.run(|state| {
      if state.terminal {
        return;
      }
      match state.subscriber.take() {
        Some(mut subscriber) => {
          state.terminal = true;
          state.start = None;
          subscriber.on_complete(completion);
        }
        None => {
          if state.pending.is_none() {
            state.pending = Some(completion);
          }
        }
      }
    });
  }

  #[cfg(test)]
  pub(crate) fn outstanding(&self) -> Demand { self.state.run(|state| state.demand) }
}

impl<Item, Err> Subscription for Gate<Item, Err> {
  fn request(&self, demand: Demand) {
    let due = self.state.run(|state| {
      if state.terminal {
        return None;
      }
      state.demand += demand;
      state.start_if_due()
    });
    if let Some((start, demand)) = due {
      start(demand);
    }
  }

  fn cancel(&self) {
    let stop = self.state.run(|state| {
      state.terminal = true;
      state.subscriber = None;
      state.start = None;
      state.stop.take()
    });
    // Run the stop hook outside the critical section: it may join a worker
    // that is itself blocked on an emission.
    if let Some(stop) = stop {
      stop();
    }
  }

  fn is_closed(&self) -> bool { self.state.run(|state| state.terminal) }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
  };

  use super::*;
  use crate::subscription::BoxSubscription;

  struct Probe {
    items: Arc<Mutex<Vec<i32>>>,
    completions: Arc<Mutex<Vec<Completion<&'static str>>>>,
    grant: Demand,
  }

  impl Probe {
    fn new(grant: Demand) -> (Self, Arc<Mutex<Vec<i32>>>, Arc<Mutex<Vec<Completion<&'static str>>>>) {
      let items = Arc::new(Mutex::new(Vec::new()));
      let completions = Arc::new(Mutex::new(Vec::new()));
      (Probe { items: items.clone(), completions: completions.clone(), grant }, items, completions)
    }
  }

  impl Subscriber<i32, &'static str> for Probe {
    fn on_subscribe(&mut self, _subscription: BoxSubscription) {}

    fn on_next(&mut self, value: i32) -> Demand {
      self.items.lock().unwrap().push(value);
      self.grant
    }

    fn on_complete(&mut self, completion: Completion<&'static str>) {
      self.completions.lock().unwrap().push(completion);
    }
  }

  #[test]
  fn emission_is_dropped_without_demand() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, items, _) = Probe::new(Demand::NONE);
    gate.install(Box::new(probe), None, None);

    assert_eq!(gate.emit(1), Demand::NONE);
    assert!(items.lock().unwrap().is_empty());
  }

  #[test]
  fn emission_decrements_and_folds_back_granted_demand() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, items, _) = Probe::new(Demand::Max(1));
    gate.install(Box::new(probe), None, None);
    gate.request(Demand::Max(1));

    // Each delivery uses one unit and the probe grants one back.
    for v in 0..5 {
      assert_eq!(gate.emit(v), Demand::Max(1));
    }
    assert_eq!(*items.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    assert_eq!(gate.outstanding(), Demand::Max(1));
  }

  #[test]
  fn first_nonzero_request_claims_start_once() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, _, _) = Probe::new(Demand::NONE);
    let starts = Arc::new(AtomicUsize::new(0));
    let observed = Arc::new(Mutex::new(Demand::NONE));
    let start = {
      let starts = starts.clone();
      let observed = observed.clone();
      Box::new(move |demand| {
        starts.fetch_add(1, Ordering::SeqCst);
        *observed.lock().unwrap() = demand;
      })
    };
    gate.install(Box::new(probe), Some(start), None);

    gate.request(Demand::NONE);
    assert_eq!(starts.load(Ordering::SeqCst), 0);
    gate.request(Demand::Max(3));
    gate.request(Demand::Max(2));
    assert_eq!(starts.load(Ordering::SeqCst), 1);
    assert_eq!(*observed.lock().unwrap(), Demand::Max(3));
    assert_eq!(gate.outstanding(), Demand::Max(5));
  }

  #[test]
  fn completion_is_delivered_exactly_once() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, items, completions) = Probe::new(Demand::NONE);
    gate.install(Box::new(probe), None, None);
    gate.request(Demand::Unlimited);

    gate.complete(Completion::Failed("boom"));
    gate.complete(Completion::Finished);
    assert_eq!(gate.emit(9), Demand::NONE);

    assert_eq!(*completions.lock().unwrap(), vec![Completion::Failed("boom")]);
    assert!(items.lock().unwrap().is_empty());
    assert!(gate.is_closed());
  }

  #[test]
  fn cancel_is_idempotent_and_claims_stop_once() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, items, _) = Probe::new(Demand::NONE);
    let stops = Arc::new(AtomicUsize::new(0));
    let stop = {
      let stops = stops.clone();
      Box::new(move || {
        stops.fetch_add(1, Ordering::SeqCst);
      })
    };
    gate.install(Box::new(probe), None, Some(stop));
    gate.request(Demand::Unlimited);

    gate.cancel();
    gate.cancel();
    assert_eq!(stops.load(Ordering::SeqCst), 1);

    // Post-cancel silence: emissions and completions go nowhere.
    assert_eq!(gate.emit(1), Demand::NONE);
    gate.complete(Completion::Finished);
    assert!(items.lock().unwrap().is_empty());
    assert!(gate.is_closed());
  }

  #[test]
  fn stop_remains_claimable_after_natural_completion() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, _, completions) = Probe::new(Demand::NONE);
    let stops = Arc::new(AtomicUsize::new(0));
    let stop = {
      let stops = stops.clone();
      Box::new(move || {
        stops.fetch_add(1, Ordering::SeqCst);
      })
    };
    gate.install(Box::new(probe), None, Some(stop));

    gate.complete(Completion::Finished);
    assert_eq!(completions.lock().unwrap().len(), 1);
    assert_eq!(stops.load(Ordering::SeqCst), 0);

    gate.cancel();
    assert_eq!(stops.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn cancel_before_install_still_runs_stop() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, items, _) = Probe::new(Demand::NONE);
    let stops = Arc::new(AtomicUsize::new(0));
    let stop = {
      let stops = stops.clone();
      Box::new(move || {
        stops.fetch_add(1, Ordering::SeqCst);
      })
    };

    gate.cancel();
    gate.install(Box::new(probe), None, Some(stop));

    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert_eq!(gate.emit(1), Demand::NONE);
    assert!(items.lock().unwrap().is_empty());
  }

  #[test]
  fn completion_before_install_is_delivered_at_install() {
    let gate: Gate<i32, &'static str> = Gate::new();
    let (probe, _, completions) = Probe::new(Demand::NONE);

    gate.complete(Completion::Finished);
    gate.install(Box::new(probe), None, None);

    assert_eq!(*completions.lock().unwrap(), vec![Completion::Finished]);
    assert!(gate.is_closed());
  }
}
