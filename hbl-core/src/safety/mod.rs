//! Safety interlock
//!
//! The interlock is an ordered table of named layers. Each layer is a pure
//! predicate over a [`LinkStatus`] snapshot; the first failing layer
//! decides what the tick does instead of regulating.
//!
//! The link and upstream flags come from collaborators: [`LinkMonitor`]
//! derives the controller-side flags from serial traffic and
//! [`Freshness`] derives the upstream flags from ingestion timestamps.

pub mod freshness;
pub mod interlock;
pub mod link;
pub mod throttle;

pub use freshness::Freshness;
pub use interlock::{evaluate, Evaluation, FailureAction, Layer, LinkStatus};
pub use link::LinkMonitor;
pub use throttle::Throttle;
