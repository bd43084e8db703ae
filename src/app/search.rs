// src/app/search.rs
//! Background title lookups for the "Add from JustWatch" dialog.
use std::sync::mpsc::{self, TryRecvError};
use std::time::Duration;

use eframe::egui as eg;
use tracing::{info, warn};

use super::justwatch::{resolve, JustWatchClient};
use super::SearchMsg;

impl crate::app::TripApp {
    /// Kick off a lookup on a worker thread. A newer search supersedes any
    /// request still in flight; its answer is dropped when it arrives.
    pub(crate) fn start_search(&mut self) {
        let query = self.search.query.trim().to_string();
        if query.is_empty() {
            self.search.results.clear();
            self.search.loading = false;
            self.search.searched = false;
            return;
        }

        self.next_search_token += 1;
        let token = self.next_search_token;
        self.search.token = token;
        self.search.loading = true;
        self.search.searched = false;

        let (tx, rx) = mpsc::channel::<SearchMsg>();
        self.search.rx = Some(rx);

        let timeout = Duration::from_secs(self.cfg.search_timeout_secs);
        let limit = self.cfg.search_result_limit;
        let configs = self.cfg.search_locales.clone();

        std::thread::spawn(move || {
            let results = match JustWatchClient::new(timeout, limit) {
                Ok(client) => resolve(&client, &configs, &query),
                Err(e) => {
                    warn!("search client build failed: {e}");
                    Vec::new()
                }
            };
            info!("search `{query}` -> {} results", results.len());
            let _ = tx.send(SearchMsg::Done { token, results });
        });
    }

    /// Abandon whatever is in flight; late answers are ignored.
    pub(crate) fn cancel_search(&mut self) {
        self.next_search_token += 1;
        self.search.token = self.next_search_token;
        self.search.loading = false;
        self.search.rx = None;
    }

    pub(crate) fn poll_search(&mut self, ctx: &eg::Context) {
        let Some(rx) = &self.search.rx else {
            return;
        };
        let msg = match rx.try_recv() {
            Ok(msg) => msg,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => {
                self.search.rx = None;
                self.search.loading = false;
                return;
            }
        };

        match msg {
            SearchMsg::Done { token, results } => {
                if !accepts_token(self.search.token, token) {
                    return;
                }
                self.search.rx = None;
                self.search.loading = false;
                self.search.searched = true;
                self.search.results = results;
                ctx.request_repaint();
            }
        }
    }
}

/// Only the answer to the most recent request is shown.
pub(crate) const fn accepts_token(current: u64, incoming: u64) -> bool {
    current == incoming
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_tokens_are_rejected() {
        assert!(accepts_token(3, 3));
        assert!(!accepts_token(3, 2));
        assert!(!accepts_token(3, 4));
    }

    #[test]
    fn only_the_latest_answer_lands() {
        let ctx = eg::Context::default();
        let mut app = crate::app::TripApp::default();
        let (tx, rx) = mpsc::channel();
        app.search.token = 2;
        app.search.loading = true;
        app.search.rx = Some(rx);

        tx.send(SearchMsg::Done {
            token: 1,
            results: Vec::new(),
        })
        .unwrap();
        app.poll_search(&ctx);
        assert!(app.search.loading);
        assert!(!app.search.searched);

        tx.send(SearchMsg::Done {
            token: 2,
            results: Vec::new(),
        })
        .unwrap();
        app.poll_search(&ctx);
        assert!(!app.search.loading);
        assert!(app.search.searched);
        assert!(app.search.rx.is_none());
    }

    #[test]
    fn blank_query_does_not_start_a_request() {
        let mut app = crate::app::TripApp::default();
        app.search.query = "   ".into();
        app.start_search();
        assert!(!app.search.loading);
        assert!(app.search.rx.is_none());
        assert_eq!(app.next_search_token, 0);
    }
}
