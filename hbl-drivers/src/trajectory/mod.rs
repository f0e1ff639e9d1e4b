//! Trajectory generators

pub mod s_curve;

pub use s_curve::SCurveGenerator;
