//! Turns assistant markdown into styled ratatui lines.
//!
//! Covers what chat replies actually use: headings, emphasis, inline and
//! fenced code, nested lists, block quotes, links and rules. Soft breaks keep
//! the source line structure.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

const CODE_INDENT: &str = "  ";
const QUOTE_PREFIX: &str = "│ ";

enum ListKind {
    Unordered,
    Ordered(u64),
}

struct MarkdownRenderer<'t> {
    theme: &'t Theme,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    quote_depth: usize,
    in_code_block: bool,
}

impl<'t> MarkdownRenderer<'t> {
    fn new(theme: &'t Theme, base: Style) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current: Vec::new(),
            style_stack: vec![base],
            list_stack: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn quote_prefix(&self) -> Option<Span<'static>> {
        (self.quote_depth > 0).then(|| {
            Span::styled(
                QUOTE_PREFIX.repeat(self.quote_depth),
                self.theme.md_blockquote_style,
            )
        })
    }

    fn flush_line(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut spans = Vec::with_capacity(self.current.len() + 1);
        spans.extend(self.quote_prefix());
        spans.append(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn push_blank(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|line| line.spans.is_empty()) || self.lines.is_empty() {
            return;
        }
        self.lines.push(Line::default());
    }

    fn list_indent(&self) -> String {
        "  ".repeat(self.list_stack.len().saturating_sub(1))
    }

    fn start_item(&mut self) {
        self.flush_line();
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        let indent = self.list_indent();
        self.current.push(Span::raw(indent));
        self.current
            .push(Span::styled(marker, self.theme.md_list_marker_style));
    }

    fn push_code_block_text(&mut self, text: &str) {
        let style = self.theme.md_code_block_style;
        for line in text.lines() {
            self.current.push(Span::styled(
                format!("{CODE_INDENT}{}", line.replace('\t', "    ")),
                style,
            ));
            self.flush_line();
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { .. } => {
                    self.flush_line();
                    self.push_style(self.theme.md_heading_style);
                }
                Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
                Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
                Tag::Strikethrough => {
                    self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
                }
                Tag::Link { .. } => self.push_style(self.theme.md_link_style),
                Tag::BlockQuote(_) => {
                    self.flush_line();
                    self.quote_depth += 1;
                    self.push_style(self.theme.md_blockquote_style);
                }
                Tag::List(start) => {
                    self.flush_line();
                    self.list_stack.push(match start {
                        Some(n) => ListKind::Ordered(n),
                        None => ListKind::Unordered,
                    });
                }
                Tag::Item => self.start_item(),
                Tag::CodeBlock(_) => {
                    self.flush_line();
                    self.in_code_block = true;
                }
                _ => {}
            },
            Event::End(tag_end) => match tag_end {
                TagEnd::Paragraph => {
                    if self.list_stack.is_empty() {
                        self.push_blank();
                    } else {
                        self.flush_line();
                    }
                }
                TagEnd::Heading(_) => {
                    self.pop_style();
                    self.push_blank();
                }
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                    self.pop_style()
                }
                TagEnd::BlockQuote(_) => {
                    self.flush_line();
                    self.pop_style();
                    self.quote_depth = self.quote_depth.saturating_sub(1);
                }
                TagEnd::List(_) => {
                    self.flush_line();
                    self.list_stack.pop();
                    if self.list_stack.is_empty() {
                        self.push_blank();
                    }
                }
                TagEnd::Item => self.flush_line(),
                TagEnd::CodeBlock => {
                    self.in_code_block = false;
                    self.push_blank();
                }
                _ => {}
            },
            Event::Text(text) => {
                if self.in_code_block {
                    self.push_code_block_text(&text);
                } else {
                    self.current
                        .push(Span::styled(text.into_string(), self.style()));
                }
            }
            Event::Code(code) => self.current.push(Span::styled(
                code.into_string(),
                self.theme.md_inline_code_style,
            )),
            Event::SoftBreak | Event::HardBreak => {
                self.flush_line();
                if !self.list_stack.is_empty() {
                    let indent = "  ".repeat(self.list_stack.len());
                    self.current.push(Span::raw(indent));
                }
            }
            Event::Rule => {
                self.flush_line();
                self.lines
                    .push(Line::from(Span::styled("─".repeat(24), self.theme.md_rule_style)));
                self.push_blank();
            }
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                self.current
                    .push(Span::styled(marker, self.theme.md_list_marker_style));
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.current.push(Span::styled(html.into_string(), self.style()));
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Renders `content` with `base` as the body text style.
pub fn render_markdown(content: &str, theme: &Theme, base: Style) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = MarkdownRenderer::new(theme, base);
    for event in Parser::new_ext(content, options) {
        renderer.handle(event);
    }
    renderer.finish()
}
