use crate::config::Settings;
use crate::contexts::{Context, commits::CommitsContext, services::ServicesContext};
use crate::error::Result;
use crate::palette::{Palette, Theme};
use crate::schedule::{PollHandle, spawn_poller};
use crate::sources::github::GithubClient;
use crate::sources::http_client;
use crate::sources::log_source::StatusLogClient;
use crate::status::ServiceBoard;
use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

const CONTEXT_COUNT: usize = 2;

pub struct App {
    current_context: usize,
    show_help: bool,
    theme: Theme,
    source: String,
    services: ServicesContext,
    commits: CommitsContext,
    pollers: Vec<PollHandle>,
}

impl App {
    /// Build the views and start both pollers. Needs a running tokio runtime.
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = http_client(settings.http_timeout)?;

        let (status_tx, status_rx) = mpsc::unbounded_channel();
        let log_client = StatusLogClient::new(http.clone(), settings.log_source.clone());
        let clock = settings.clock;
        let status_poller = spawn_poller(
            "status-log",
            settings.refresh_interval,
            move || {
                let client = log_client.clone();
                async move {
                    client
                        .fetch_text()
                        .await
                        .map(|text| ServiceBoard::from_log(&text, &clock))
                }
            },
            status_tx,
        );

        let (commits_tx, commits_rx) = mpsc::unbounded_channel();
        let github = GithubClient::new(http, &settings.github_api)
            .with_per_page(settings.commits_per_branch);
        let feeds = settings.feeds.clone();
        let commit_poller = spawn_poller(
            "commit-feed",
            settings.refresh_interval,
            move || {
                let github = github.clone();
                let feeds = feeds.clone();
                async move { github.fetch_feed(&feeds).await }
            },
            commits_tx,
        );

        tracing::info!(
            source = %settings.log_source,
            feeds = settings.feeds.len(),
            refresh_secs = settings.refresh_interval.as_secs(),
            "dashboard started"
        );

        let mut app = Self::with_contexts(
            settings.theme,
            settings.log_source.to_string(),
            ServicesContext::new(status_rx),
            CommitsContext::new(commits_rx, settings.clock),
        );
        app.pollers = vec![status_poller, commit_poller];
        Ok(app)
    }

    pub fn with_contexts(
        theme: Theme,
        source: String,
        services: ServicesContext,
        commits: CommitsContext,
    ) -> Self {
        Self {
            current_context: 0,
            show_help: false,
            theme,
            source,
            services,
            commits,
            pollers: Vec::new(),
        }
    }

    pub fn current_context(&self) -> usize {
        self.current_context
    }

    pub fn context_name(&self) -> &'static str {
        match self.current_context {
            0 => self.services.name(),
            1 => self.commits.name(),
            _ => "Unknown",
        }
    }

    pub fn next_context(&mut self) {
        self.current_context = (self.current_context + 1) % CONTEXT_COUNT;
    }

    pub fn prev_context(&mut self) {
        if self.current_context == 0 {
            self.current_context = CONTEXT_COUNT - 1;
        } else {
            self.current_context -= 1;
        }
    }

    pub fn set_context(&mut self, ctx: usize) {
        if ctx < CONTEXT_COUNT {
            self.current_context = ctx;
        }
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn show_help(&self) -> bool {
        self.show_help
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn palette(&self) -> Palette {
        self.theme.palette()
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        tracing::debug!(theme = %self.theme, "theme toggled");
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Ask both pollers to run now
    pub fn refresh_now(&self) {
        for poller in &self.pollers {
            poller.trigger();
        }
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.services.board().map(|b| b.refreshed_at.as_str())
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            // Any key closes help
            self.show_help = false;
            return;
        }

        match self.current_context {
            0 => self.services.handle_key(key),
            1 => self.commits.handle_key(key),
            _ => {}
        }
    }

    /// Pull pending poll results into both views, visible or not
    pub async fn tick(&mut self) {
        self.services.tick().await;
        self.commits.tick().await;
    }

    pub fn services(&self) -> &ServicesContext {
        &self.services
    }

    pub fn commits(&self) -> &CommitsContext {
        &self.commits
    }

    pub fn shutdown(&mut self) {
        for poller in self.pollers.drain(..) {
            poller.stop();
            tracing::debug!(poller = poller.name(), "stopped");
        }
    }
}
