pub mod commits;
pub mod services;

use crate::palette::Palette;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};

/// Trait for all context views
pub trait Context {
    fn name(&self) -> &'static str;
    fn draw(&self, f: &mut Frame, area: Rect, palette: &Palette);
    fn handle_key(&mut self, key: KeyEvent);
    async fn tick(&mut self);
}
