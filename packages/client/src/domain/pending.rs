//! Single-slot buffer for a submitted but unconfirmed chat message.

/// The last submitted chat text whose delivery the server may still reject.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMessage {
    text: Option<String>,
}

impl PendingMessage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember `text`, replacing anything stashed before.
    pub fn stash(&mut self, text: String) {
        self.text = Some(text);
    }

    pub fn peek(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_none()
    }

    /// Take the stash for restoring into an input currently holding `current_input`.
    ///
    /// The stash is consumed either way. It is only returned when the input
    /// is empty, so new typing is never overwritten.
    pub fn restore_if_present(&mut self, current_input: &str) -> Option<String> {
        let text = self.text.take()?;
        if current_input.is_empty() {
            Some(text)
        } else {
            tracing::debug!("Input is not empty, dropping pending message");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stash_overwrites_previous_value() {
        // テスト項目: stash は以前の値を上書きする
        // given (前提条件):
        let mut pending = PendingMessage::new();
        pending.stash("first".to_string());

        // when (操作):
        pending.stash("second".to_string());

        // then (期待する結果):
        assert_eq!(pending.peek(), Some("second"));
    }

    #[test]
    fn test_restore_into_empty_input() {
        // テスト項目: 入力欄が空なら退避したメッセージが復元され、退避は消える
        // given (前提条件):
        let mut pending = PendingMessage::new();
        pending.stash("hello".to_string());

        // when (操作):
        let restored = pending.restore_if_present("");

        // then (期待する結果):
        assert_eq!(restored.as_deref(), Some("hello"));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_restore_is_idempotent() {
        // テスト項目: 退避がない状態での復元は何もしない
        // given (前提条件):
        let mut pending = PendingMessage::new();
        pending.stash("hello".to_string());
        pending.restore_if_present("");

        // when (操作):
        let restored = pending.restore_if_present("");

        // then (期待する結果):
        assert_eq!(restored, None);
    }

    #[test]
    fn test_restore_does_not_clobber_new_typing() {
        // テスト項目: 入力欄に新しい入力がある場合は復元せず、退避を破棄する
        // given (前提条件):
        let mut pending = PendingMessage::new();
        pending.stash("hello".to_string());

        // when (操作):
        let restored = pending.restore_if_present("new text");

        // then (期待する結果):
        assert_eq!(restored, None);
        assert!(pending.is_empty());
    }
}
