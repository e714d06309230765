//! Batch-mutation engine: tag resolution, VR validation, element mutation,
//! persistence, and the run configuration that ties them together.
pub mod mutate;
pub mod params;
pub mod persist;
pub mod substitution;
pub mod tags;
pub mod vr;
