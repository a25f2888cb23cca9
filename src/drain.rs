//! Drive a record stream to completion, one record at a time.
//!
//! The stream side knows nothing about dispatch, and the [`Handler`] side
//! knows nothing about framing or transport, so the same drain serves the
//! network feed and the synthetic generator.

use std::fmt::Display;

use codecs::decoding::StreamDecodingError;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Receives what a drained stream produces.
pub trait Handler<T, E> {
    /// One record arrived. The next record is not pulled until this returns.
    fn on_record(&mut self, record: T);

    /// The stream produced an error. Recoverable errors (a single bad frame)
    /// are reported here and drained past; fatal ones end the drain.
    fn on_error(&mut self, _err: &E) {}

    /// The stream is exhausted. Called exactly once, after the final
    /// `on_record`, and only when the stream ended on its own.
    fn on_done(&mut self);
}

/// How a drain ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Drained {
    /// The source reported end-of-stream and `on_done` has fired.
    Completed,

    /// The shutdown token fired between pulls. `on_done` did not fire.
    Cancelled,

    /// The source produced an error it cannot continue past. `on_done` did
    /// not fire.
    Failed,
}

/// Pulls `source` until it is exhausted, dispatching each record to
/// `handler` in stream order.
///
/// Exactly one pull is in flight at any time, and `on_record` has returned
/// before the next pull starts, so a handler that appends to ordered state
/// observes records in wire order. A stream that never ends keeps the drain
/// pending forever; there is deliberately no timeout here, that is the
/// caller's policy.
pub async fn drain<S, T, E, H>(
    mut source: S,
    handler: &mut H,
    shutdown: CancellationToken,
) -> Drained
where
    S: Stream<Item = Result<T, E>> + Unpin,
    E: StreamDecodingError + Display,
    H: Handler<T, E>,
{
    loop {
        let next = tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!(message = "Shutdown signalled, abandoning stream");
                return Drained::Cancelled;
            }
            next = source.next() => next,
        };

        match next {
            Some(Ok(record)) => handler.on_record(record),
            Some(Err(err)) => {
                handler.on_error(&err);

                if !err.can_continue() {
                    warn!(message = "Stream failed", %err);
                    return Drained::Failed;
                }
            }
            None => {
                handler.on_done();
                return Drained::Completed;
            }
        }
    }
}
