//! Asynchronous seam between the conversation store and reply generation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::core::flight::FlightContext;
use crate::engine::rules::{ResponseEngine, classify};

/// Boxed future type for reply generation.
pub type ReplyFuture<'a> = Pin<Box<dyn Future<Output = String> + Send + 'a>>;

/// Produces the assistant reply to a user question.
///
/// Implementations may take arbitrary time; the store preserves reply order
/// per conversation regardless of completion order.
pub trait Responder: Send + Sync {
    /// Produce a reply for `question` about `flight`.
    fn reply(&self, question: String, flight: Arc<FlightContext>) -> ReplyFuture<'_>;
}

/// Rule engine behind a fixed simulated latency.
#[derive(Clone, Debug)]
pub struct DelayedResponder {
    engine: ResponseEngine,
    latency: Duration,
}

impl DelayedResponder {
    /// Wrap `engine`, answering after `latency`.
    #[must_use]
    pub const fn new(engine: ResponseEngine, latency: Duration) -> Self {
        Self { engine, latency }
    }
}

impl Responder for DelayedResponder {
    fn reply(&self, question: String, flight: Arc<FlightContext>) -> ReplyFuture<'_> {
        Box::pin(async move {
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            debug!(rule = %classify(&question), flight = flight.flight_number(), "Answering question");
            self.engine.respond(&question, &flight)
        })
    }
}
