//! Convenience re-exports of the crate's public surface.

pub use crate::{
  demand::Demand,
  gate::Gate,
  ops::map::Map,
  pool,
  publisher::{
    create::{create, Create, Emitter, Orchestrator},
    from_future::{from_future, FromFuture},
    from_iter::{from_iter, of, FromIter, IterSubscription},
    BoxPublisher, Publisher, PublisherExt,
  },
  replay::{Connection, Replay, ShareReplay},
  subscriber::{BoxedSubscriber, Completion, FnSubscriber, Subscriber},
  subscription::{BoxSubscription, Subscription, SubscriptionGuard},
  sync_cell::SyncCell,
};
