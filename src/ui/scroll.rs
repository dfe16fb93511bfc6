use ratatui::text::Line;
use unicode_width::UnicodeWidthStr;

/// Number of terminal rows `lines` occupy when word-wrapped to `width`
/// columns. Mirrors the greedy word wrap of `Paragraph` closely enough to keep
/// the newest transcript line in view.
pub fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|line| {
            let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
            wrapped_rows(&text, width)
        })
        .sum()
}

fn wrapped_rows(text: &str, width: usize) -> usize {
    let mut rows = 1;
    let mut used = 0;
    for word in text.split_inclusive(' ') {
        let word_width = word.width();
        let visible_width = word.trim_end().width();
        if used + visible_width <= width {
            used += word_width;
            continue;
        }
        if used > 0 {
            rows += 1;
        }
        // Words longer than a row are broken across rows.
        let mut remaining = visible_width;
        while remaining > width {
            rows += 1;
            remaining -= width;
        }
        used = remaining + (word_width - visible_width);
    }
    rows
}

/// Tracks how far the transcript is scrolled away from its newest line.
/// Zero keeps the view pinned to the bottom while a reply streams in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScrollState {
    from_bottom: u16,
    max: u16,
}

impl ScrollState {
    pub fn scroll_up(&mut self, rows: u16) {
        self.from_bottom = self.from_bottom.saturating_add(rows).min(self.max);
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.from_bottom = self.from_bottom.saturating_sub(rows);
    }

    pub fn scroll_to_top(&mut self) {
        self.from_bottom = self.max;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.from_bottom = 0;
    }

    pub fn is_pinned(&self) -> bool {
        self.from_bottom == 0
    }

    /// Records the content and viewport heights from the latest draw and
    /// returns the top row offset to render.
    pub fn offset_for(&mut self, content_rows: usize, viewport_rows: u16) -> u16 {
        let overflow = content_rows.saturating_sub(usize::from(viewport_rows));
        self.max = u16::try_from(overflow).unwrap_or(u16::MAX);
        self.from_bottom = self.from_bottom.min(self.max);
        self.max - self.from_bottom
    }
}
