//! Message formatting utilities for terminal display.

use emoji_chat_shared::time::format_server_timestamp_local;

use crate::{domain::ConnectionState, protocol::MessageRecord};

const RULE: &str = "------------------------------------------------------------";

/// Message formatter for terminal display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a chat message with its local send time.
    pub fn format_message(message: &MessageRecord) -> String {
        Self::format_message_at(message, &format_server_timestamp_local(message.timestamp))
    }

    /// Format a chat message with a preformatted timestamp.
    pub fn format_message_at(message: &MessageRecord, sent_at: &str) -> String {
        format!(
            "{}: {}  ({})\n",
            message.author_text(),
            message.content_text(),
            sent_at
        )
    }

    /// Format the header printed when the message history is replaced.
    pub fn format_history_header() -> String {
        format!("\n{}\n", RULE)
    }

    /// Format the current user's identity.
    pub fn format_current_user(user: &[String]) -> String {
        format!("\nYou are {}\n", user.concat())
    }

    /// Format a status indicator change.
    pub fn format_status(state: ConnectionState, tooltip: &str) -> String {
        format!("[{}] {}\n", state, tooltip)
    }

    /// Format a notice the user has to acknowledge.
    pub fn format_notice(text: &str) -> String {
        format!("\n{}\n! {}\n{}\n", RULE, text, RULE)
    }

    /// Hint printed under a notice.
    pub fn format_acknowledge_hint() -> String {
        "Press Enter to continue.".to_string()
    }

    /// Prompt shown in front of the input line.
    pub fn format_prompt(user: &str) -> String {
        if user.is_empty() {
            "> ".to_string()
        } else {
            format!("{}> ", user)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(author: &[&str], content: &[&str]) -> MessageRecord {
        MessageRecord {
            author: author.iter().map(|s| s.to_string()).collect(),
            content: content.iter().map(|s| s.to_string()).collect(),
            timestamp: 0,
        }
    }

    #[test]
    fn test_format_message_at_joins_graphemes() {
        // テスト項目: 作者と本文の書記素が連結されて表示される
        // given (前提条件):
        let message = record(&["🐱", "🐶"], &["👋", "🌍"]);

        // when (操作):
        let result = MessageFormatter::format_message_at(&message, "2022-04-27T16:00:00+00:00");

        // then (期待する結果):
        assert_eq!(result, "🐱🐶: 👋🌍  (2022-04-27T16:00:00+00:00)\n");
    }

    #[test]
    fn test_format_message_uses_local_time() {
        // テスト項目: タイムスタンプがローカル時刻として表示される
        // given (前提条件):
        let message = record(&["a"], &["b"]);

        // when (操作):
        let result = MessageFormatter::format_message(&message);

        // then (期待する結果):
        assert!(result.starts_with("a: b  (2022-04-2"));
    }

    #[test]
    fn test_format_status() {
        // テスト項目: ステータス変化が状態名とツールチップで表示される
        // given (前提条件):
        let state = ConnectionState::Disconnected;

        // when (操作):
        let result = MessageFormatter::format_status(state, "Disconnected");

        // then (期待する結果):
        assert_eq!(result, "[disconnected] Disconnected\n");
    }

    #[test]
    fn test_format_notice() {
        // テスト項目: 通知が罫線で囲まれて表示される
        // given (前提条件):
        let text = "rate limited";

        // when (操作):
        let result = MessageFormatter::format_notice(text);

        // then (期待する結果):
        assert!(result.contains("! rate limited"));
        assert!(result.contains(RULE));
    }

    #[test]
    fn test_format_prompt() {
        // テスト項目: ユーザー名がある場合はプロンプトに含まれる
        // given (前提条件):
        let user = "🐱";

        // when (操作):
        let named = MessageFormatter::format_prompt(user);
        let anonymous = MessageFormatter::format_prompt("");

        // then (期待する結果):
        assert_eq!(named, "🐱> ");
        assert_eq!(anonymous, "> ");
    }

    #[test]
    fn test_format_current_user() {
        // テスト項目: 現在のユーザーの書記素が連結されて表示される
        // given (前提条件):
        let user = vec!["🦀".to_string(), "🦀".to_string()];

        // when (操作):
        let result = MessageFormatter::format_current_user(&user);

        // then (期待する結果):
        assert_eq!(result, "\nYou are 🦀🦀\n");
    }
}
