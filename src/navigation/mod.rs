//! Navigation side effects and the route guard.

pub mod guard;
pub mod navigator;

pub use guard::{GuardDecision, RouteGuard};
pub use navigator::{Navigator, NoopNavigator, RecordingNavigator, TracingNavigator};
