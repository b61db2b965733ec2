//! Foraging colony simulation: a headless runner over `formica_core`.

pub mod app;
pub mod model;
