//! Completion values returned by device thunks
//!
//! A thunk either has its result in hand or will produce it later. Both
//! cases are carried by one explicit sum type so the caller always awaits
//! through the same path instead of branching on what the device happened
//! to return.

use tokio::sync::oneshot;

/// Result of a device thunk: available now, or delivered later over a
/// oneshot channel.
#[derive(Debug)]
pub enum Completion<T> {
    /// The thunk finished inline.
    Ready(T),
    /// The thunk handed the work off; the result arrives on this channel.
    Pending(oneshot::Receiver<T>),
}

impl<T> Completion<T> {
    /// Wrap an immediately available result.
    pub const fn ready(value: T) -> Self {
        Self::Ready(value)
    }

    /// Create a deferred completion plus the sender that resolves it.
    ///
    /// The device keeps the sender and fires it when the real work
    /// finishes; dropping the sender without sending counts as a device
    /// failure at the await site.
    #[must_use]
    pub fn pending() -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self::Pending(rx))
    }

    /// Wait for the final value.
    ///
    /// Returns `None` when a pending completion's sender was dropped
    /// without resolving.
    pub async fn wait(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending(rx) => rx.await.ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ready_resolves_inline() {
        let completion = Completion::ready(7);
        assert_eq!(completion.wait().await, Some(7));
    }

    #[tokio::test]
    async fn test_pending_resolves_after_send() {
        let (tx, completion) = Completion::pending();
        tokio::spawn(async move {
            tx.send(42).ok();
        });
        assert_eq!(completion.wait().await, Some(42));
    }

    #[tokio::test]
    async fn test_dropped_sender_yields_none() {
        let (tx, completion) = Completion::<i32>::pending();
        drop(tx);
        assert_eq!(completion.wait().await, None);
    }
}
