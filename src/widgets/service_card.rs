use crate::palette::Palette;
use crate::status::ServiceCard;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub const CARD_WIDTH: u16 = 30;
pub const CARD_HEIGHT: u16 = 6;

/// One bordered status card, coloured by the service's status class
pub struct ServiceCardWidget<'a> {
    card: &'a ServiceCard,
    palette: &'a Palette,
}

impl<'a> ServiceCardWidget<'a> {
    pub fn new(card: &'a ServiceCard, palette: &'a Palette) -> Self {
        Self { card, palette }
    }
}

impl Widget for ServiceCardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let status_color = self.palette.status(&self.card.status.class());

        let block = Block::default()
            .title(format!(" {} ", self.card.name))
            .title_style(
                Style::default()
                    .fg(self.palette.foreground)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(status_color));

        let lines = vec![
            Line::from(Span::styled(
                self.card.status.label().to_string(),
                Style::default()
                    .fg(status_color)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Last Update:",
                Style::default().fg(self.palette.muted),
            )),
            Line::from(Span::styled(
                self.card.last_update.clone(),
                Style::default().fg(self.palette.foreground),
            )),
        ];

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true })
            .render(area, buf);
    }
}
