use crate::palette::Palette;
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Bottom line: log source, theme and key hints
pub struct StatusBar<'a> {
    source: &'a str,
    theme: &'static str,
    palette: &'a Palette,
}

impl<'a> StatusBar<'a> {
    pub fn new(source: &'a str, theme: &'static str, palette: &'a Palette) -> Self {
        Self {
            source,
            theme,
            palette,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: ratatui::layout::Rect, buf: &mut ratatui::buffer::Buffer) {
        let line = Line::from(vec![
            Span::styled(
                format!("[{}] ", self.source),
                Style::default().fg(self.palette.muted),
            ),
            Span::raw(format!("j:down k:up t:theme({}) r:refresh ?:help ", self.theme)),
            Span::styled(
                "q:quit",
                Style::default()
                    .fg(self.palette.offline)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(line)
            .style(
                Style::default()
                    .fg(self.palette.foreground)
                    .bg(self.palette.background),
            )
            .render(area, buf);
    }
}
