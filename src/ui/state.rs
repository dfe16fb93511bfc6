use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, warn};
use tui_textarea::TextArea;

use crate::core::prompt::DEFAULT_SYSTEM_PROMPT;
use crate::core::session::{Session, Submission, SubmitRejected};
use crate::ui::chat_loop::keybindings::{map_key, Focus, KeyAction};
use crate::ui::chat_loop::stream::StreamMessage;
use crate::ui::scroll::ScrollState;
use crate::ui::theme::Theme;

pub const INPUT_PLACEHOLDER: &str = "Tell me what you'd like to sew or which project you have in mind...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub kind: StatusKind,
    pub text: String,
}

impl Status {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Interactive state wrapped around a [`Session`]: the two editors, focus,
/// scroll position and the status line.
pub struct ChatUi {
    pub session: Session,
    pub model: String,
    pub prompt_editor: TextArea<'static>,
    pub input: TextArea<'static>,
    pub focus: Focus,
    pub status: Option<Status>,
    pub scroll: ScrollState,
    pub theme: Theme,
    pub should_quit: bool,
}

fn prompt_editor_for(text: &str) -> TextArea<'static> {
    let mut editor = TextArea::new(text.lines().map(str::to_string).collect());
    // Placeholders render as a single span.
    editor.set_placeholder_text(DEFAULT_SYSTEM_PROMPT.lines().next().unwrap_or_default());
    editor
}

/// Normalises line endings to `\n`, expands tabs and drops every other control
/// character.
pub(crate) fn sanitize_pasted_text(text: &str) -> String {
    let without_crlf = text.replace("\r\n", "\n");
    let without_cr = without_crlf.replace('\r', "\n");
    let expanded_tabs = without_cr.replace('\t', "    ");
    expanded_tabs
        .chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .collect()
}

fn message_input() -> TextArea<'static> {
    let mut input = TextArea::default();
    input.set_placeholder_text(INPUT_PLACEHOLDER);
    input
}

impl ChatUi {
    pub fn new(model: impl Into<String>) -> Self {
        let session = Session::new();
        let prompt_editor = prompt_editor_for(session.prompt().get());
        Self {
            session,
            model: model.into(),
            prompt_editor,
            input: message_input(),
            focus: Focus::Input,
            status: None,
            scroll: ScrollState::default(),
            theme: Theme::dark_default(),
            should_quit: false,
        }
    }

    pub fn prompt_editor_text(&self) -> String {
        self.prompt_editor.lines().join("\n")
    }

    pub fn input_text(&self) -> String {
        self.input.lines().join(" ")
    }

    /// True when the editor differs from the prompt that requests will use.
    pub fn prompt_has_unapplied_edits(&self) -> bool {
        self.prompt_editor_text() != self.session.prompt().get()
    }

    pub fn apply_prompt(&mut self) {
        let text = self.prompt_editor_text();
        debug!(chars = text.chars().count(), "applying system prompt");
        self.session.apply_prompt(text);
        self.status = Some(Status::info("Prompt applied."));
    }

    pub fn reset_prompt(&mut self) {
        self.session.reset_prompt();
        self.prompt_editor = prompt_editor_for(self.session.prompt().get());
        self.status = Some(Status::info("Prompt reset to the default."));
    }

    /// Hands the message line to the session. Returns the submission to send
    /// when it was accepted.
    pub fn submit_input(&mut self) -> Option<Submission> {
        let text = self.input_text();
        match self.session.submit(&text) {
            Ok(submission) => {
                self.input = message_input();
                self.status = None;
                self.scroll.scroll_to_bottom();
                Some(submission)
            }
            Err(SubmitRejected::Empty) => None,
            Err(SubmitRejected::Busy) => {
                self.status = Some(Status::info(
                    "Still waiting for the current reply; your message was kept.",
                ));
                None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, page: u16) -> Option<Submission> {
        match map_key(key, self.focus, page) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::ToggleFocus => self.focus = self.focus.toggled(),
            KeyAction::ApplyPrompt => self.apply_prompt(),
            KeyAction::ResetPrompt => self.reset_prompt(),
            KeyAction::Submit => return self.submit_input(),
            KeyAction::ScrollUp(rows) => self.scroll.scroll_up(rows),
            KeyAction::ScrollDown(rows) => self.scroll.scroll_down(rows),
            KeyAction::ScrollTop => self.scroll.scroll_to_top(),
            KeyAction::ScrollBottom => self.scroll.scroll_to_bottom(),
            KeyAction::Edit(key) => match self.focus {
                Focus::Prompt => {
                    self.prompt_editor.input(key);
                }
                Focus::Input => {
                    self.input.input(key);
                    self.keep_input_single_line();
                }
            },
        }
        None
    }

    pub fn paste(&mut self, text: &str) {
        let sanitized = sanitize_pasted_text(text);
        if sanitized.is_empty() {
            return;
        }
        match self.focus {
            Focus::Prompt => {
                self.prompt_editor.insert_str(sanitized);
            }
            Focus::Input => {
                self.input.insert_str(sanitized.replace('\n', " "));
            }
        }
    }

    fn keep_input_single_line(&mut self) {
        if self.input.lines().len() > 1 {
            let joined = self.input_text();
            self.input = message_input();
            self.input.insert_str(joined);
        }
    }

    pub fn on_stream_message(&mut self, message: StreamMessage, stream_id: u64) {
        match message {
            StreamMessage::Chunk(fragment) => {
                self.session.push_fragment(stream_id, &fragment);
            }
            StreamMessage::End => {
                self.session.complete_reply(stream_id);
            }
            StreamMessage::Error(err) => {
                let Some(partial) = self.session.fail_reply(stream_id) else {
                    return;
                };
                warn!(stream_id, error = %err, "reply failed");
                let mut text = format!("Request failed: {err}");
                if partial.fragments > 0 {
                    text.push_str(" (partial reply discarded)");
                }
                self.status = Some(Status::error(text));
            }
        }
    }
}
