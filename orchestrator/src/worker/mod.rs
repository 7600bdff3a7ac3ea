//! Job dispatching and webhook-driven cache invalidation.
//!
//! Neither component runs in the background: the dispatcher handles one job per call, triggered
//! over HTTP or from the command line, and the invalidation router handles one webhook event per
//! call.

pub mod dispatcher;
pub mod invalidation;
pub mod metrics;

pub use dispatcher::{DispatchError, DispatchOutcome, ProcessingDispatcher};
pub use invalidation::{InvalidationReport, InvalidationRouter, InvalidationStep, StepOutcome, WebhookError};
