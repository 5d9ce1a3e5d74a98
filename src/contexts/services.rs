use crate::contexts::Context;
use crate::error::Result;
use crate::palette::Palette;
use crate::status::ServiceBoard;
use crate::widgets::service_card::{CARD_HEIGHT, CARD_WIDTH, ServiceCardWidget};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
};
use std::cell::Cell;
use tokio::sync::mpsc::UnboundedReceiver;

pub type StatusUpdate = Result<ServiceBoard>;

pub struct ServicesContext {
    updates: Option<UnboundedReceiver<StatusUpdate>>,
    board: Option<ServiceBoard>,
    scroll_row: usize,
    // Highest first row the last draw could show
    max_scroll: Cell<usize>,
}

impl ServicesContext {
    pub fn new(updates: UnboundedReceiver<StatusUpdate>) -> Self {
        Self {
            updates: Some(updates),
            board: None,
            scroll_row: 0,
            max_scroll: Cell::new(0),
        }
    }

    /// A context fed only through [`apply`](Self::apply)
    pub fn detached() -> Self {
        Self {
            updates: None,
            board: None,
            scroll_row: 0,
            max_scroll: Cell::new(0),
        }
    }

    pub fn board(&self) -> Option<&ServiceBoard> {
        self.board.as_ref()
    }

    /// Swap in a fresh board. Failures keep the previous one on screen.
    pub fn apply(&mut self, update: StatusUpdate) {
        match update {
            Ok(board) => {
                tracing::info!(
                    services = board.cards.len(),
                    online = board.online_count(),
                    "service board refreshed"
                );
                self.board = Some(board);
            }
            Err(e) => {
                tracing::error!("Failed to load data: {}", e);
            }
        }
    }

    fn move_up(&mut self) {
        self.scroll_row = self.scroll_row.saturating_sub(1);
    }

    fn move_down(&mut self) {
        self.scroll_row = (self.scroll_row + 1).min(self.max_scroll.get());
    }
}

impl Context for ServicesContext {
    fn name(&self) -> &'static str {
        "Services"
    }

    fn draw(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let title = match &self.board {
            Some(board) => format!(
                " Services ({}/{} online) ",
                board.online_count(),
                board.cards.len()
            ),
            None => " Services ".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .style(Style::default().fg(palette.foreground).bg(palette.background));

        let Some(board) = &self.board else {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
            return;
        };

        if board.cards.is_empty() {
            f.render_widget(Paragraph::new("No services logged yet").block(block), area);
            return;
        }

        let inner = block.inner(area);
        f.render_widget(block, area);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let columns = (inner.width / CARD_WIDTH).max(1) as usize;
        let visible_rows = (inner.height / CARD_HEIGHT).max(1) as usize;
        let total_rows = board.cards.len().div_ceil(columns);
        let max_scroll = total_rows.saturating_sub(visible_rows);
        self.max_scroll.set(max_scroll);
        let first_row = self.scroll_row.min(max_scroll);
        let card_width = inner.width / columns as u16;
        let card_height = CARD_HEIGHT.min(inner.height);

        for (slot, card) in board.cards.iter().skip(first_row * columns).enumerate() {
            let row = slot / columns;
            if row >= visible_rows {
                break;
            }
            let col = slot % columns;
            let rect = Rect {
                x: inner.x + col as u16 * card_width,
                y: inner.y + row as u16 * CARD_HEIGHT,
                width: card_width,
                height: card_height,
            };
            f.render_widget(ServiceCardWidget::new(card, palette), rect);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('g') => self.scroll_row = 0,
            _ => {}
        }
    }

    async fn tick(&mut self) {
        let mut pending = Vec::new();
        if let Some(rx) = self.updates.as_mut() {
            while let Ok(update) = rx.try_recv() {
                pending.push(update);
            }
        }
        for update in pending {
            self.apply(update);
        }
    }
}
