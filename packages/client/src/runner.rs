//! Terminal client: wires readline input and the terminal view to a session.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::{mpsc, oneshot};

use crate::{
    config::ClientConfig,
    error::ClientError,
    session::{Session, UserInput},
    view::{InputState, TerminalView},
};

/// Command typed to activate the status indicator.
pub const RETRY_COMMAND: &str = "/retry";
/// Command typed to end the session.
pub const QUIT_COMMAND: &str = "/quit";

/// What a line typed at the prompt means.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineAction {
    /// Nothing typed; the next prompt offers any restored message.
    Recall,
    Retry,
    Quit,
    Submit(String),
}

/// Classify a line typed at the prompt.
pub fn parse_line(line: &str) -> LineAction {
    let line = line.trim_end_matches(['\r', '\n']);
    match line.trim() {
        "" => LineAction::Recall,
        RETRY_COMMAND => LineAction::Retry,
        QUIT_COMMAND => LineAction::Quit,
        _ => LineAction::Submit(line.to_string()),
    }
}

/// Run the terminal chat client until the user quits.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let input = InputState::new();
    let (input_tx, input_rx) = mpsc::unbounded_channel();
    let (ready_tx, ready_rx) = oneshot::channel();

    // rustyline is synchronous, so it gets its own thread
    let input_for_thread = input.clone();
    let _readline_handle = std::thread::spawn(move || match DefaultEditor::new() {
        Ok(editor) => {
            let _ = ready_tx.send(Ok(()));
            readline_loop(editor, input_for_thread, input_tx);
        }
        Err(e) => {
            let _ = ready_tx.send(Err(ClientError::Io(format!(
                "Failed to initialize readline: {}",
                e
            ))));
        }
    });
    ready_rx
        .await
        .map_err(|_| ClientError::Io("Readline thread exited".to_string()))??;

    println!(
        "\nType messages and press Enter to send. {} reconnects when disconnected, {} or Ctrl+C exits.\n",
        RETRY_COMMAND, QUIT_COMMAND
    );

    Session::new(config, TerminalView::new(input))
        .run(input_rx)
        .await;
    Ok(())
}

fn readline_loop(
    mut rl: DefaultEditor,
    input: InputState,
    input_tx: mpsc::UnboundedSender<UserInput>,
) {
    loop {
        let prompt = input.prompt();
        let initial = input.take_recall().unwrap_or_default();

        let read = rl.readline_with_initial(&prompt, (&initial, ""));

        // a line entered while a notice is shown only dismisses it
        if input.acknowledge_notice() {
            if let Ok(line) = &read {
                if let LineAction::Submit(text) = parse_line(line) {
                    input.keep_for_recall_if_free(&text);
                }
                continue;
            }
        }

        let action = match read {
            Ok(line) => parse_line(&line),
            Err(ReadlineError::Interrupted) => {
                tracing::info!("Interrupted");
                LineAction::Quit
            }
            Err(ReadlineError::Eof) => {
                tracing::info!("EOF");
                LineAction::Quit
            }
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                LineAction::Quit
            }
        };

        let user_input = match action {
            LineAction::Recall => continue,
            LineAction::Retry => {
                if !input.retry_bound() {
                    println!("Already connected or connecting.");
                    continue;
                }
                UserInput::Retry
            }
            LineAction::Quit => UserInput::Quit,
            LineAction::Submit(line) => {
                rl.add_history_entry(line.as_str()).ok();
                if !input.submit_enabled() {
                    println!("Not connected, your message was kept.");
                    input.keep_for_recall(&line);
                    continue;
                }
                input.set_draft(&line);
                UserInput::Submit
            }
        };

        let quit = user_input == UserInput::Quit;
        if input_tx.send(user_input).is_err() || quit {
            // Session ended, exit thread
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_submit_keeps_inner_whitespace() {
        // テスト項目: 通常の入力は前後の改行のみ除去されて送信対象となる
        // given (前提条件):
        let line = "  hello  world \n";

        // when (操作):
        let action = parse_line(line);

        // then (期待する結果):
        assert_eq!(action, LineAction::Submit("  hello  world ".to_string()));
    }

    #[test]
    fn test_parse_line_commands() {
        // テスト項目: /retry と /quit がコマンドとして解釈される
        // given (前提条件):
        let lines = ["/retry", " /quit ", ""];

        // when (操作):
        let actions: Vec<LineAction> = lines.iter().map(|l| parse_line(l)).collect();

        // then (期待する結果):
        assert_eq!(
            actions,
            vec![LineAction::Retry, LineAction::Quit, LineAction::Recall]
        );
    }

    #[test]
    fn test_parse_line_whitespace_only_is_recall() {
        // テスト項目: 空白のみの入力は送信されない
        // given (前提条件):
        let line = "   ";

        // when (操作):
        let action = parse_line(line);

        // then (期待する結果):
        assert_eq!(action, LineAction::Recall);
    }
}
