use crate::palette::Palette;
use ratatui::{
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

const GLOBAL_HELP: &str = r#"

Global:
    q, Q          Quit
    ?             Toggle this help
    Tab           Next view
    Shift+Tab     Previous view
    1-2           Jump to view
    t             Toggle light/dark theme
    r             Refresh now

Press any key to close this help"#;

pub struct Help<'a> {
    view: &'static str,
    palette: &'a Palette,
}

impl<'a> Help<'a> {
    pub fn new(view: &'static str, palette: &'a Palette) -> Self {
        Self { view, palette }
    }

    fn view_help(&self) -> &'static str {
        match self.view {
            "Services" => {
                r#"Services View:
    j, ↓          Scroll down   k, ↑          Scroll up
    g             Top
Cards show the latest logged status. "Last Update" is the
last time the probe saw the service online."#
            }
            "Commits" => {
                r#"Commits View:
    j, ↓          Down        k, ↑          Up
    Space, PgDn   Page down   b, PgUp       Page up
    g             Top"#
            }
            _ => "Unknown view",
        }
    }
}

impl Widget for Help<'_> {
    fn render(self, area: ratatui::layout::Rect, buf: &mut ratatui::buffer::Buffer) {
        let block = Block::default()
            .title(format!(" Help - {} ", self.view))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.palette.other))
            .style(
                Style::default()
                    .fg(self.palette.foreground)
                    .bg(self.palette.background),
            );

        let text = format!("{}{}", self.view_help(), GLOBAL_HELP);
        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
        Clear.render(area, buf);
        paragraph.render(area, buf);
    }
}
