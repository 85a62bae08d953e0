//! Terminal implementation of [`ChatView`].
//!
//! Output goes to stdout. The input box lives on the readline thread, so
//! its content is kept in an [`InputState`] shared between that thread
//! and the view.

use std::{
    io::Write,
    sync::{Arc, Mutex, MutexGuard},
};

use tokio::sync::oneshot;

use crate::{domain::ConnectionState, protocol::MessageRecord};

use super::{Acknowledgement, ChatView, MessageFormatter};

#[derive(Debug, Default)]
struct InputInner {
    /// What the manager sees as the input box content.
    draft: String,
    /// Text to prefill into the next prompt.
    recall: Option<String>,
    user: String,
    submit_enabled: bool,
    retry_bound: bool,
    /// Dismiss handle of the notice on screen.
    notice: Option<oneshot::Sender<()>>,
}

/// Input box state shared with the readline thread.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    inner: Arc<Mutex<InputInner>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, InputInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a line the user just entered as the input box content.
    pub fn set_draft(&self, line: &str) {
        let mut inner = self.lock();
        inner.draft = line.to_string();
        inner.recall = None;
    }

    /// Keep a line that could not be submitted so the next prompt offers it again.
    pub fn keep_for_recall(&self, line: &str) {
        self.lock().recall = Some(line.to_string());
    }

    /// Like [`keep_for_recall`](Self::keep_for_recall), unless a restored
    /// message is already waiting.
    pub fn keep_for_recall_if_free(&self, line: &str) {
        let mut inner = self.lock();
        if inner.recall.is_none() {
            inner.recall = Some(line.to_string());
        }
    }

    pub fn take_recall(&self) -> Option<String> {
        self.lock().recall.take()
    }

    pub fn draft(&self) -> String {
        self.lock().draft.clone()
    }

    pub fn prompt(&self) -> String {
        MessageFormatter::format_prompt(&self.lock().user)
    }

    pub fn submit_enabled(&self) -> bool {
        self.lock().submit_enabled
    }

    pub fn retry_bound(&self) -> bool {
        self.lock().retry_bound
    }

    /// Dismiss the notice on screen. Returns whether there was one.
    pub fn acknowledge_notice(&self) -> bool {
        match self.lock().notice.take() {
            Some(dismiss) => {
                // the session may be gone already
                let _ = dismiss.send(());
                true
            }
            None => false,
        }
    }
}

/// Chat view printing to the terminal.
pub struct TerminalView {
    input: InputState,
}

impl TerminalView {
    pub fn new(input: InputState) -> Self {
        Self { input }
    }

    fn print(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        // stdout failures are not actionable here
        let _ = write!(stdout, "{}", text);
        let _ = stdout.flush();
    }

    fn print_with_prompt(&self, text: &str) {
        self.print(&format!("{}{}", text, self.input.prompt()));
    }
}

impl ChatView for TerminalView {
    fn set_status(&mut self, state: ConnectionState, tooltip: &str) {
        self.print_with_prompt(&MessageFormatter::format_status(state, tooltip));
    }

    fn bind_retry(&mut self) {
        self.input.lock().retry_bound = true;
    }

    fn unbind_retry(&mut self) {
        self.input.lock().retry_bound = false;
    }

    fn set_submit_enabled(&mut self, enabled: bool) {
        self.input.lock().submit_enabled = enabled;
    }

    fn input(&self) -> String {
        self.input.draft()
    }

    fn set_input(&mut self, text: &str) {
        let mut inner = self.input.lock();
        inner.draft = text.to_string();
        if text.is_empty() {
            inner.recall = None;
        } else {
            inner.recall = Some(text.to_string());
            drop(inner);
            self.print_with_prompt("\n(your message was restored, press Enter to edit it)\n");
        }
    }

    fn clear_messages(&mut self) {
        self.print(&MessageFormatter::format_history_header());
    }

    fn render_message(&mut self, message: &MessageRecord) {
        self.print_with_prompt(&MessageFormatter::format_message(message));
    }

    fn render_current_user(&mut self, user: &[String]) {
        self.input.lock().user = user.concat();
        self.print_with_prompt(&MessageFormatter::format_current_user(user));
    }

    fn notify_blocking(&mut self, text: &str) -> Acknowledgement {
        let (dismiss, acknowledgement) = Acknowledgement::pending();
        self.input.lock().notice = Some(dismiss);
        self.print(&format!(
            "{}{}",
            MessageFormatter::format_notice(text),
            MessageFormatter::format_acknowledge_hint()
        ));
        acknowledgement
    }
}
