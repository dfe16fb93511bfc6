use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Transcript
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_text_style: Style,
    pub streaming_indicator_style: Style,

    // Markdown
    pub md_heading_style: Style,
    pub md_inline_code_style: Style,
    pub md_code_block_style: Style,
    pub md_list_marker_style: Style,
    pub md_blockquote_style: Style,
    pub md_link_style: Style,
    pub md_rule_style: Style,

    // Chrome
    pub title_style: Style,
    pub border_style: Style,
    pub focused_border_style: Style,
    pub status_info_style: Style,
    pub status_error_style: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark_default()
    }
}

impl Theme {
    pub fn dark_default() -> Self {
        Theme {
            user_prefix_style: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Cyan),
            assistant_text_style: Style::default().fg(Color::White),
            streaming_indicator_style: Style::default().fg(Color::LightMagenta),

            md_heading_style: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
            md_inline_code_style: Style::default().fg(Color::Yellow),
            md_code_block_style: Style::default().fg(Color::Gray),
            md_list_marker_style: Style::default().fg(Color::LightMagenta),
            md_blockquote_style: Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
            md_link_style: Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::UNDERLINED),
            md_rule_style: Style::default().fg(Color::DarkGray),

            title_style: Style::default()
                .fg(Color::LightMagenta)
                .add_modifier(Modifier::BOLD),
            border_style: Style::default().fg(Color::DarkGray),
            focused_border_style: Style::default().fg(Color::Yellow),
            status_info_style: Style::default().fg(Color::Green),
            status_error_style: Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        }
    }
}
