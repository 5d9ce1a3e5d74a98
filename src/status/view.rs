//! Folding parsed rows into the per-service view and its render model.

use crate::localtime::LocalClock;
use crate::status::parser::{LogRow, NOT_AVAILABLE, ServiceStatus, parse_rows};
use std::collections::HashMap;

/// Latest row of one service plus the last real timestamp ever logged for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntry {
    pub latest: LogRow,
    pub last_known: Option<String>,
}

impl ServiceEntry {
    pub fn name(&self) -> &str {
        &self.latest.service
    }

    /// The latest row's own stamp, else the carried-forward one.
    ///
    /// An empty carried value counts as never seen.
    pub fn display_stamp(&self) -> Option<&str> {
        match self.latest.last_seen.as_stamp() {
            Some(raw) => Some(raw),
            None => self.last_known.as_deref().filter(|raw| !raw.is_empty()),
        }
    }
}

/// Services in order of first appearance in the log
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceView {
    entries: Vec<ServiceEntry>,
}

impl ServiceView {
    /// Fold rows in file order: the last row wins, real stamps carry forward.
    pub fn fold<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = LogRow>,
    {
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut entries: Vec<ServiceEntry> = Vec::new();

        for row in rows {
            let stamp = row.last_seen.as_stamp().map(str::to_string);
            match index.get(&row.service) {
                Some(&i) => {
                    let entry = &mut entries[i];
                    entry.latest = row;
                    if stamp.is_some() {
                        entry.last_known = stamp;
                    }
                }
                None => {
                    index.insert(row.service.clone(), entries.len());
                    entries.push(ServiceEntry {
                        latest: row,
                        last_known: stamp,
                    });
                }
            }
        }

        Self { entries }
    }

    pub fn get(&self, service: &str) -> Option<&ServiceEntry> {
        self.entries.iter().find(|e| e.name() == service)
    }

    pub fn cards(&self, clock: &LocalClock) -> Vec<ServiceCard> {
        self.entries
            .iter()
            .map(|entry| ServiceCard {
                name: entry.name().to_string(),
                status: entry.latest.status.clone(),
                last_update: entry
                    .display_stamp()
                    .map(|raw| clock.format_log_stamp(raw))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCard {
    pub name: String,
    pub status: ServiceStatus,
    pub last_update: String,
}

/// Everything the service grid needs for one refresh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceBoard {
    pub cards: Vec<ServiceCard>,
    pub refreshed_at: String,
}

impl ServiceBoard {
    pub fn from_log(text: &str, clock: &LocalClock) -> Self {
        let view = ServiceView::fold(parse_rows(text));
        Self {
            cards: view.cards(clock),
            refreshed_at: clock.now(),
        }
    }

    pub fn online_count(&self) -> usize {
        self.cards.iter().filter(|c| c.status.is_online()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::parser::LastSeen;

    fn row(time: &str, service: &str, status: &str, last_seen: &str) -> LogRow {
        LogRow {
            time: time.to_string(),
            service: service.to_string(),
            status: ServiceStatus::from(status),
            last_seen: LastSeen::from(last_seen),
        }
    }

    #[test]
    fn one_card_per_distinct_service() {
        let view = ServiceView::fold(vec![
            row("2024-01-01 10:00", "Website", "Online", "2024-01-01 10:00"),
            row("2024-01-01 10:00", "Auth Server", "Online", "2024-01-01 10:00"),
            row("2024-01-01 10:05", "Website", "Offline", "2024-01-01 10:00"),
            row("2024-01-01 10:05", "Cloudflare", "Online", "2024-01-01 10:05"),
        ]);
        let cards = view.cards(&LocalClock::default());
        assert_eq!(cards.len(), 3);
        let names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Website", "Auth Server", "Cloudflare"]);
    }

    #[test]
    fn not_available_falls_back_to_earlier_stamp() {
        let view = ServiceView::fold(vec![
            row("2024-01-01 10:00", "Kezan (PvE)", "Online", "2024-01-01 10:00"),
            row("2024-01-01 10:05", "Kezan (PvE)", "Offline", "N/A"),
        ]);
        let cards = view.cards(&LocalClock::default());
        assert_eq!(cards[0].status, ServiceStatus::Offline);
        assert_eq!(cards[0].last_update, "1.1.2024, 11:00:00 CET");
    }

    #[test]
    fn never_seen_displays_not_available() {
        let view = ServiceView::fold(vec![row(
            "2024-01-01 10:00",
            "Gurubashi (PvP)",
            "Offline",
            "N/A",
        )]);
        let cards = view.cards(&LocalClock::default());
        assert_eq!(cards[0].last_update, "N/A");
    }

    #[test]
    fn carry_forward_tracks_most_recent_real_stamp() {
        let view = ServiceView::fold(vec![
            row("t1", "Website", "Online", "2024-01-01 10:00"),
            row("t2", "Website", "Online", "2024-01-01 11:00"),
            row("t3", "Website", "Offline", "N/A"),
        ]);
        let entry = view.get("Website").unwrap();
        assert_eq!(entry.latest.time, "t3");
        assert_eq!(entry.last_known.as_deref(), Some("2024-01-01 11:00"));
        assert_eq!(entry.display_stamp(), Some("2024-01-01 11:00"));
    }

    #[test]
    fn latest_stamp_wins_over_carried_one() {
        let view = ServiceView::fold(vec![
            row("t1", "Website", "Online", "2024-01-01 11:00"),
            row("t2", "Website", "Online", "2024-01-01 09:00"),
        ]);
        assert_eq!(
            view.get("Website").unwrap().display_stamp(),
            Some("2024-01-01 09:00")
        );
    }

    #[test]
    fn empty_cell_replaces_the_carried_stamp() {
        let text = "\
| 2024-01-01 10:00 | Website | Online | 2024-01-01 10:00 |
| 2024-01-01 10:05 | Website | Offline | |
";
        let board = ServiceBoard::from_log(text, &LocalClock::default());
        assert_eq!(board.cards[0].status, ServiceStatus::Offline);
        // Unparseable stamps are shown verbatim
        assert_eq!(board.cards[0].last_update, "");
    }

    #[test]
    fn empty_carried_stamp_reads_as_never_seen() {
        let text = "\
| 2024-01-01 10:00 | Website | Online | 2024-01-01 10:00 |
| 2024-01-01 10:05 | Website | Offline | |
| 2024-01-01 10:10 | Website | Offline | N/A |
";
        let board = ServiceBoard::from_log(text, &LocalClock::default());
        assert_eq!(board.cards[0].last_update, "N/A");
    }

    #[test]
    fn empty_log_gives_empty_board() {
        let board = ServiceBoard::from_log("# nothing logged yet\n", &LocalClock::default());
        assert!(board.cards.is_empty());
        assert_eq!(board.online_count(), 0);
    }

    #[test]
    fn board_from_log_counts_online_services() {
        let text = "\
| 2024-01-01 10:00 | Website | Online | 2024-01-01 10:00 |
| 2024-01-01 10:00 | Auth Server | Offline | N/A |
| 2024-01-01 10:00 | Cloudflare | Online | 2024-01-01 10:00 |
";
        let board = ServiceBoard::from_log(text, &LocalClock::default());
        assert_eq!(board.cards.len(), 3);
        assert_eq!(board.online_count(), 2);
    }
}
