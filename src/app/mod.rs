//! Headless runner: scenario construction, tick loop and reporting.

pub mod report;
pub mod scenario;
pub mod simulation;

pub use report::RunReport;
pub use simulation::Simulation;
