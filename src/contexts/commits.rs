use crate::contexts::Context;
use crate::localtime::LocalClock;
use crate::palette::Palette;
use crate::sources::github::{FeedGroup, FeedOutcome};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tokio::sync::mpsc::UnboundedReceiver;

pub struct CommitsContext {
    updates: Option<UnboundedReceiver<Vec<FeedGroup>>>,
    groups: Option<Vec<FeedGroup>>,
    clock: LocalClock,
    scroll: u16,
}

impl CommitsContext {
    pub fn new(updates: UnboundedReceiver<Vec<FeedGroup>>, clock: LocalClock) -> Self {
        Self {
            updates: Some(updates),
            groups: None,
            clock,
            scroll: 0,
        }
    }

    pub fn detached(clock: LocalClock) -> Self {
        Self {
            updates: None,
            groups: None,
            clock,
            scroll: 0,
        }
    }

    pub fn groups(&self) -> Option<&[FeedGroup]> {
        self.groups.as_deref()
    }

    /// Each refresh replaces the whole feed, failed groups included
    pub fn apply(&mut self, groups: Vec<FeedGroup>) {
        let failed = groups.iter().filter(|g| g.is_failed()).count();
        tracing::info!(groups = groups.len(), failed, "commit feed refreshed");
        self.groups = Some(groups);
    }

    fn lines(&self, palette: &Palette) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let Some(groups) = &self.groups else {
            return lines;
        };

        for group in groups {
            match &group.outcome {
                FeedOutcome::Loaded(commits) => {
                    lines.push(Line::from(Span::styled(
                        group.label.clone(),
                        Style::default()
                            .fg(palette.accent)
                            .add_modifier(Modifier::BOLD),
                    )));
                    for c in commits {
                        lines.push(Line::from(Span::styled(
                            format!("  {}", c.message),
                            Style::default().fg(palette.foreground),
                        )));
                        lines.push(Line::from(vec![
                            Span::styled(
                                format!("    {} ", c.author),
                                Style::default().fg(palette.muted),
                            ),
                            Span::styled(
                                c.short_sha().to_string(),
                                Style::default()
                                    .fg(palette.accent)
                                    .add_modifier(Modifier::UNDERLINED),
                            ),
                            Span::styled(
                                format!(" {}", self.clock.format(c.date)),
                                Style::default().fg(palette.muted),
                            ),
                        ]));
                        lines.push(Line::from(Span::styled(
                            format!("    {}", c.url),
                            Style::default().fg(palette.muted),
                        )));
                    }
                }
                FeedOutcome::Failed(_) => {
                    lines.push(Line::from(Span::styled(
                        group.failure_text(),
                        Style::default().fg(palette.offline),
                    )));
                }
            }
            lines.push(Line::default());
        }

        lines
    }
}

impl Context for CommitsContext {
    fn name(&self) -> &'static str {
        "Commits"
    }

    fn draw(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let block = Block::default()
            .title(" Recent Commits ")
            .borders(Borders::ALL)
            .style(Style::default().fg(palette.foreground).bg(palette.background));

        if self.groups.is_none() {
            f.render_widget(Paragraph::new("Loading...").block(block), area);
            return;
        }

        let paragraph = Paragraph::new(self.lines(palette))
            .block(block)
            .scroll((self.scroll, 0));
        f.render_widget(paragraph, area);
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::Char('b') | KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::Char('g') => self.scroll = 0,
            _ => {}
        }
    }

    async fn tick(&mut self) {
        let mut latest = None;
        if let Some(rx) = self.updates.as_mut() {
            while let Ok(groups) = rx.try_recv() {
                latest = Some(groups);
            }
        }
        if let Some(groups) = latest {
            self.apply(groups);
        }
    }
}
