//! Maps key presses to chat actions.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Which editor receives text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Prompt,
    Input,
}

impl Focus {
    pub fn toggled(self) -> Self {
        match self {
            Focus::Prompt => Focus::Input,
            Focus::Input => Focus::Prompt,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    ToggleFocus,
    ApplyPrompt,
    ResetPrompt,
    Submit,
    ScrollUp(u16),
    ScrollDown(u16),
    ScrollTop,
    ScrollBottom,
    /// Forward the key to the focused editor.
    Edit(KeyEvent),
}

pub fn map_key(key: KeyEvent, focus: Focus, page: u16) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('s') if ctrl => KeyAction::ApplyPrompt,
        KeyCode::Char('r') if ctrl => KeyAction::ResetPrompt,
        KeyCode::Tab | KeyCode::BackTab => KeyAction::ToggleFocus,
        KeyCode::PageUp => KeyAction::ScrollUp(page.max(1)),
        KeyCode::PageDown => KeyAction::ScrollDown(page.max(1)),
        KeyCode::Home if ctrl => KeyAction::ScrollTop,
        KeyCode::End if ctrl => KeyAction::ScrollBottom,
        KeyCode::Enter if focus == Focus::Input => KeyAction::Submit,
        // The message line is single-line, so vertical arrows scroll instead.
        KeyCode::Up if focus == Focus::Input => KeyAction::ScrollUp(1),
        KeyCode::Down if focus == Focus::Input => KeyAction::ScrollDown(1),
        _ => KeyAction::Edit(key),
    }
}
