//! The view seam between the connection manager and whatever displays the chat.

mod formatter;
mod terminal;

pub use formatter::MessageFormatter;
pub use terminal::{InputState, TerminalView};

use tokio::sync::oneshot;

use crate::{domain::ConnectionState, protocol::MessageRecord};

/// Completion of a blocking notice.
///
/// Resolves once the user dismissed the notice, or once whoever held the
/// dismiss handle is gone.
#[derive(Debug)]
pub struct Acknowledgement(Option<oneshot::Receiver<()>>);

impl Acknowledgement {
    /// Notice that needs no dismissal.
    pub fn immediate() -> Self {
        Self(None)
    }

    /// Notice dismissed by sending on the returned handle.
    pub fn pending() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self(Some(rx)))
    }

    pub fn is_pending(&self) -> bool {
        self.0.is_some()
    }

    pub async fn wait(self) {
        if let Some(rx) = self.0 {
            // a dropped handle dismisses too
            let _ = rx.await;
        }
    }
}

/// Display surface driven by the connection manager.
///
/// Mirrors what a chat widget on a page offers: a status indicator that
/// can be made clickable, an input box, a message log and a blocking
/// notice. All calls happen on the supervisor task, in event order.
#[cfg_attr(test, mockall::automock)]
pub trait ChatView {
    /// Update the status indicator's state and tooltip.
    fn set_status(&mut self, state: ConnectionState, tooltip: &str);

    /// Make the status indicator trigger a manual retry.
    fn bind_retry(&mut self);

    fn unbind_retry(&mut self);

    fn set_submit_enabled(&mut self, enabled: bool);

    /// Current content of the input box.
    fn input(&self) -> String;

    fn set_input(&mut self, text: &str);

    fn clear_messages(&mut self);

    fn render_message(&mut self, message: &MessageRecord);

    fn render_current_user(&mut self, user: &[String]);

    /// Show a notice the user has to acknowledge.
    ///
    /// No further event is handled until the returned acknowledgement
    /// resolves.
    fn notify_blocking(&mut self, text: &str) -> Acknowledgement;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_acknowledgement_resolves_on_dismiss() {
        // テスト項目: 保留中の確認は閉じる操作で解決され、ハンドルの破棄でも解決される
        // given (前提条件):
        let (dismiss, ack) = Acknowledgement::pending();
        let (dropped, orphan) = Acknowledgement::pending();
        assert!(ack.is_pending());
        assert!(!Acknowledgement::immediate().is_pending());

        // when (操作):
        dismiss.send(()).unwrap();
        drop(dropped);

        // then (期待する結果):
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            ack.wait().await;
            orphan.wait().await;
            Acknowledgement::immediate().wait().await;
        })
        .await
        .expect("acknowledgements should resolve");
    }
}
