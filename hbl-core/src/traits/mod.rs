//! Capability traits
//!
//! These traits define the seams between the control cycle and the
//! algorithms and transport it is built from. A [`Channel`](crate::Channel)
//! owns one instance of each algorithm exclusively.

pub mod control;
pub mod link;

pub use control::{FeedbackFilter, Regulator, TrajectoryGenerator};
pub use link::CommandLink;
