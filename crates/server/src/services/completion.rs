//! One-shot completion signals.
//!
//! A request handler that starts a mutating operation gets back a
//! [`Completion`]; the operation itself holds the matching
//! [`CompletionSignal`]. Both ends are consumed on use, so each operation
//! completes exactly once and exactly one waiter receives the result. Every
//! call gets its own channel, which means concurrent operations of the same
//! kind can never receive each other's results.

use std::future::Future;

use thiserror::Error;
use tokio::sync::oneshot;
use tracing::Instrument;

use super::ServiceError;
use super::outcome::{Operation, Outcome};

/// The waiting side could not receive a result.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The operation ended without completing its signal (e.g. it panicked).
    #[error("{0} was abandoned before completing")]
    Abandoned(Operation),
}

/// Sending half: fired once by the operation.
#[derive(Debug)]
pub struct CompletionSignal<T = ()> {
    operation: Operation,
    sender: oneshot::Sender<Outcome<T>>,
}

/// Receiving half: awaited once by the originating request.
#[derive(Debug)]
pub struct Completion<T = ()> {
    operation: Operation,
    receiver: oneshot::Receiver<Outcome<T>>,
}

impl<T> CompletionSignal<T> {
    /// Create a linked signal/completion pair for one call of `operation`.
    #[must_use]
    pub fn new(operation: Operation) -> (Self, Completion<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self { operation, sender },
            Completion {
                operation,
                receiver,
            },
        )
    }

    /// The operation this signal belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Deliver the operation's result to the waiter.
    pub fn complete(self, result: Result<T, ServiceError>) {
        let outcome = Outcome::new(self.operation, result);
        tracing::debug!(
            event = self.operation.event_name(),
            success = outcome.is_success(),
            "Operation complete"
        );

        if self.sender.send(outcome).is_err() {
            // Client went away; the state change itself stands.
            tracing::debug!(event = self.operation.event_name(), "No waiter for completion");
        }
    }
}

impl<T> Completion<T> {
    /// The operation this completion belongs to.
    #[must_use]
    pub const fn operation(&self) -> Operation {
        self.operation
    }

    /// Wait for the operation's outcome.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError::Abandoned` if the signal was dropped without
    /// being completed.
    pub async fn wait(self) -> Result<Outcome<T>, CompletionError> {
        self.receiver
            .await
            .map_err(|_| CompletionError::Abandoned(self.operation))
    }
}

/// Run `work` as its own task and return the completion to wait on.
///
/// The task keeps running even if the waiter is dropped, so a state change
/// that has started is always either persisted or reverted.
pub fn dispatch<T, F>(operation: Operation, work: F) -> Completion<T>
where
    T: Send + 'static,
    F: Future<Output = Result<T, ServiceError>> + Send + 'static,
{
    let (signal, completion) = CompletionSignal::new(operation);
    let span = tracing::info_span!("operation", event = operation.event_name());

    tokio::spawn(
        async move {
            let result = work.await;
            signal.complete(result);
        }
        .instrument(span),
    );

    completion
}
