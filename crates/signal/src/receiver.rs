use std::sync::Arc;

use {
    sigrelay_channels::InboundHandler,
    tokio::task::JoinHandle,
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
};

use crate::client::SignalMessenger;

/// Handle to a running receive loop.
pub struct ReceiveHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl ReceiveHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop polling and wait for the message in hand, if any, to finish.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            error!(error = %e, "signal receive task failed");
        }
    }
}

/// Start long-polling the daemon for one account.
///
/// Spawns a background task that hands each decoded message to `handler`
/// and waits for it to finish before taking the next, until the returned
/// handle is stopped.
pub fn start_receiving(
    messenger: Arc<SignalMessenger>,
    handler: Arc<dyn InboundHandler>,
) -> ReceiveHandle {
    let cancel = CancellationToken::new();
    let task = tokio::spawn(receive_loop(messenger, handler, cancel.clone()));
    ReceiveHandle { cancel, task }
}

async fn receive_loop(
    messenger: Arc<SignalMessenger>,
    handler: Arc<dyn InboundHandler>,
    cancel: CancellationToken,
) {
    let account = messenger.config().account.clone();
    let timeout_secs = messenger.config().receive_timeout_secs;
    let backoff = messenger.config().poll_backoff();
    info!(account, "starting signal receive loop");

    loop {
        let result = tokio::select! {
            () = cancel.cancelled() => break,
            result = messenger.api().receive(timeout_secs) => result,
        };

        match result {
            Ok(envelopes) => {
                if !envelopes.is_empty() {
                    debug!(account, count = envelopes.len(), "got signal envelopes");
                }
                for message in messenger.decode(&envelopes).await {
                    debug!(
                        account,
                        sender = message.sender.id(),
                        timestamp = message.timestamp,
                        "received signal message"
                    );
                    if let Err(e) = handler.handle(message).await {
                        error!(account, error = %e, "error handling signal message");
                    }
                }
            },
            Err(e) => {
                warn!(
                    account,
                    error = %e,
                    backoff_secs = backoff.as_secs(),
                    "signal receive failed, backing off"
                );
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(backoff) => {},
                }
            },
        }
    }

    info!(account, "signal receive loop stopped");
}
