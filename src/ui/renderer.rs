use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::core::message::Role;
use crate::ui::chat_loop::keybindings::Focus;
use crate::ui::markdown::render_markdown;
use crate::ui::scroll::wrapped_height;
use crate::ui::state::{ChatUi, StatusKind};
use crate::ui::theme::Theme;

pub const APP_TITLE: &str = "🧵 Sewing Chatbot";

const USER_PREFIX: &str = "You: ";
const USER_CONTINUATION: &str = "     ";
const STREAMING_CURSOR: &str = "▌";
const PROMPT_EDITOR_ROWS: u16 = 8;

fn user_lines(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    content
        .lines()
        .enumerate()
        .map(|(i, text)| {
            let lead = if i == 0 {
                Span::styled(USER_PREFIX, theme.user_prefix_style)
            } else {
                Span::raw(USER_CONTINUATION)
            };
            Line::from(vec![
                lead,
                Span::styled(text.to_string(), theme.user_text_style),
            ])
        })
        .collect()
}

fn assistant_lines(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    render_markdown(content, theme, theme.assistant_text_style)
}

/// Flattens the transcript, plus any reply still streaming, into lines.
pub fn transcript_lines(ui: &ChatUi) -> Vec<Line<'static>> {
    let theme = &ui.theme;
    let mut lines = Vec::new();

    for turn in ui.session.log().all() {
        match turn.role() {
            Role::User => lines.extend(user_lines(turn.content(), theme)),
            Role::Assistant => lines.extend(assistant_lines(turn.content(), theme)),
        }
        lines.push(Line::default());
    }

    if let Some(pending) = ui.session.pending() {
        let mut reply = assistant_lines(&pending.text, theme);
        let cursor = Span::styled(STREAMING_CURSOR, theme.streaming_indicator_style);
        match reply.last_mut() {
            Some(last) => last.spans.push(cursor),
            None => reply.push(Line::from(cursor)),
        }
        lines.extend(reply);
    }

    lines
}

fn bordered(title: String, focused: bool, theme: &Theme) -> Block<'static> {
    let border_style = if focused {
        theme.focused_border_style
    } else {
        theme.border_style
    };
    Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(title)
}

fn draw_header(f: &mut Frame, ui: &ChatUi, area: Rect) {
    let prompt_label = if ui.session.prompt().is_default() {
        "default prompt"
    } else {
        "custom prompt"
    };
    let header = Line::from(vec![
        Span::styled(APP_TITLE, ui.theme.title_style),
        Span::styled(
            format!("  model: {}  ·  {prompt_label}", ui.model),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_prompt_editor(f: &mut Frame, ui: &mut ChatUi, area: Rect) {
    let focused = ui.focus == Focus::Prompt;
    let mut title = " System prompt · Ctrl+S apply · Ctrl+R reset ".to_string();
    if ui.prompt_has_unapplied_edits() {
        title.push_str("· unapplied edits ");
    }
    let block = bordered(title, focused, &ui.theme);
    ui.prompt_editor.set_block(block);
    ui.prompt_editor.set_cursor_line_style(Style::default());
    ui.prompt_editor.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    f.render_widget(&ui.prompt_editor, area);
}

fn draw_transcript(f: &mut Frame, ui: &mut ChatUi, area: Rect) {
    let mut lines = transcript_lines(ui);
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "Ask for a project idea to get started.",
            Style::default().add_modifier(Modifier::DIM),
        )));
    }

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let offset = ui
        .scroll
        .offset_for(wrapped_height(&lines, inner_width), inner_height);

    let mut title = " Chat ".to_string();
    if !ui.scroll.is_pinned() {
        title.push_str("· scrolled (Ctrl+End for latest) ");
    }
    let paragraph = Paragraph::new(lines)
        .block(bordered(title, false, &ui.theme))
        .wrap(Wrap { trim: false })
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn draw_status(f: &mut Frame, ui: &ChatUi, area: Rect) {
    let line = if let Some(pending) = ui.session.pending() {
        Line::from(Span::styled(
            format!("Receiving reply… ({} fragments)", pending.fragments),
            ui.theme.streaming_indicator_style,
        ))
    } else if let Some(status) = &ui.status {
        let style = match status.kind {
            StatusKind::Info => ui.theme.status_info_style,
            StatusKind::Error => ui.theme.status_error_style,
        };
        Line::from(Span::styled(status.text.clone(), style))
    } else {
        Line::default()
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_input(f: &mut Frame, ui: &mut ChatUi, area: Rect) {
    let focused = ui.focus == Focus::Input;
    let title = " Message · Enter send · Tab switch · Ctrl+C quit ".to_string();
    let block = bordered(title, focused, &ui.theme);
    ui.input.set_block(block);
    ui.input.set_cursor_line_style(Style::default());
    ui.input.set_cursor_style(if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    });
    f.render_widget(&ui.input, area);
}

pub fn ui(f: &mut Frame, ui: &mut ChatUi) {
    let area = f.area();
    let prompt_rows = PROMPT_EDITOR_ROWS.min(area.height / 3).max(3);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(prompt_rows),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(area);

    draw_header(f, ui, chunks[0]);
    draw_prompt_editor(f, ui, chunks[1]);
    draw_transcript(f, ui, chunks[2]);
    draw_status(f, ui, chunks[3]);
    draw_input(f, ui, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(ui: &mut ChatUi) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).expect("terminal");
        terminal.draw(|f| super::ui(f, ui)).expect("draw");
        buffer_text(terminal.backend().buffer())
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn transcript_shows_turns_in_order_with_streaming_cursor() {
        let mut ui = ChatUi::new("gpt-4o-mini");
        let first = ui.session.submit("Recommend a beginner project").unwrap();
        ui.session.push_fragment(first.stream_id, "A **tote bag**.");
        ui.session.complete_reply(first.stream_id);
        let second = ui.session.submit("Something smaller?").unwrap();
        ui.session.push_fragment(second.stream_id, "A pouch");

        let lines = plain(&transcript_lines(&ui));
        assert_eq!(
            lines,
            [
                "You: Recommend a beginner project",
                "",
                "A tote bag.",
                "",
                "You: Something smaller?",
                "",
                "A pouch▌",
            ]
        );
    }

    #[test]
    fn multi_line_user_turns_are_indented() {
        let lines = plain(&user_lines("one\ntwo", &Theme::dark_default()));
        assert_eq!(lines, ["You: one", "     two"]);
    }

    #[test]
    fn empty_pending_reply_still_shows_cursor() {
        let mut ui = ChatUi::new("m");
        ui.session.submit("hi").unwrap();
        let lines = plain(&transcript_lines(&ui));
        assert_eq!(lines.last().map(String::as_str), Some(STREAMING_CURSOR));
    }

    #[test]
    fn frame_contains_chrome_and_model() {
        let mut ui = ChatUi::new("gpt-4o-mini");
        let screen = draw(&mut ui);

        assert!(screen.contains("model: gpt-4o-mini"));
        assert!(screen.contains("default prompt"));
        assert!(screen.contains("System prompt"));
        assert!(screen.contains("Message"));
        assert!(screen.contains("Ask for a project idea"));
    }

    #[test]
    fn frame_shows_status_and_custom_prompt_label() {
        let mut ui = ChatUi::new("m");
        ui.prompt_editor = tui_textarea::TextArea::new(vec!["Respond only in English.".into()]);
        ui.apply_prompt();

        let screen = draw(&mut ui);
        assert!(screen.contains("custom prompt"));
        assert!(screen.contains("Prompt applied."));
        assert!(screen.contains("Respond only in English."));
    }

    #[test]
    fn long_transcripts_keep_latest_line_visible() {
        let mut ui = ChatUi::new("m");
        for i in 0..40 {
            let submission = ui.session.submit(&format!("question {i}")).unwrap();
            ui.session.push_fragment(submission.stream_id, &format!("answer {i}"));
            ui.session.complete_reply(submission.stream_id);
        }

        let screen = draw(&mut ui);
        assert!(screen.contains("answer 39"));
        assert!(!screen.contains("You: question 0 "));
    }
}
