use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::{Receiver, Sender};
use tokio::sync::Mutex;

/// Broadcasts a shutdown signal to every listener created from it.
///
/// Only listeners that exist at the time of the signal receive it, so a handle can be signalled
/// repeatedly to interrupt whoever happens to be waiting at that moment.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    sender: Sender<()>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            sender: tokio::sync::broadcast::channel(1).0,
        }
    }

    pub fn shutdown(&self) {
        if let Err(e) = self.sender.send(()) {
            // Will fail if nobody is listening for a shutdown signal, in which case the log message
            // can be ignored.
            log::debug!("Shutdown signal had no listeners: {e:?}");
        }
    }

    pub fn new_listener(&self) -> DelegatedShutdownListener {
        DelegatedShutdownListener::new(self.sender.subscribe())
    }
}

#[derive(Clone, Debug)]
pub struct DelegatedShutdownListener {
    receiver: Arc<Mutex<Receiver<()>>>,
}

impl DelegatedShutdownListener {
    pub(crate) fn new(receiver: Receiver<()>) -> Self {
        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Wait for the shutdown signal. It is safe to race this with another future so that the
    /// signal can be used to abandon waiting on that future.
    ///
    /// Resolves as well when every [ShutdownHandle] has been dropped, since no signal can arrive
    /// after that.
    pub async fn wait_for_shutdown(&mut self) {
        match self.receiver.lock().await.recv().await {
            Ok(()) | Err(RecvError::Closed) => {}
            Err(RecvError::Lagged(skipped)) => {
                log::trace!("Shutdown listener lagged by {skipped} signals");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn signalled(listener: &mut DelegatedShutdownListener) -> bool {
        tokio::time::timeout(Duration::from_millis(50), listener.wait_for_shutdown())
            .await
            .is_ok()
    }

    #[tokio::test]
    async fn listener_sees_signal_sent_after_subscribing() {
        let handle = ShutdownHandle::new();
        let mut listener = handle.new_listener();

        handle.shutdown();
        assert!(signalled(&mut listener).await);
    }

    #[tokio::test]
    async fn listener_misses_signal_sent_before_subscribing() {
        let handle = ShutdownHandle::new();
        handle.shutdown();

        let mut listener = handle.new_listener();
        assert!(!signalled(&mut listener).await);
    }

    #[tokio::test]
    async fn dropped_handle_counts_as_shutdown() {
        let handle = ShutdownHandle::new();
        let mut listener = handle.new_listener();
        drop(handle);

        assert!(signalled(&mut listener).await);
    }

    #[tokio::test]
    async fn wait_for_shutdown_resolves_on_signal() {
        let handle = ShutdownHandle::new();
        let mut listener = handle.new_listener();

        let signaller = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            signaller.shutdown();
        });

        tokio::time::timeout(Duration::from_secs(5), listener.wait_for_shutdown())
            .await
            .expect("Listener should have been woken by the shutdown signal");
    }
}
