// src/app/prefetch.rs
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use eframe::egui as eg;
use itertools::Itertools;
use tracing::{debug, warn};

use super::cache::{
    download_and_store_resized_with_client, find_any_by_key, url_to_cache_key, POSTER_MAX_W,
    POSTER_QUALITY,
};
use super::{PosterSlot, PosterState, PrefetchDone, WorkItem};

impl crate::app::TripApp {
    /// Spin up the download pool on first use. Workers share one client and
    /// pull from a single queue.
    fn ensure_poster_workers(&mut self) -> bool {
        if self.work_tx.is_some() {
            return true;
        }

        let client = match reqwest::blocking::Client::builder()
            .user_agent(concat!("tripboard/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(20))
            .pool_max_idle_per_host(8)
            .default_headers({
                use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
                let mut h = HeaderMap::new();
                h.insert(
                    ACCEPT,
                    HeaderValue::from_static("image/avif,image/webp,image/*;q=0.8,*/*;q=0.5"),
                );
                h
            })
            .build()
        {
            Ok(c) => Arc::new(c),
            Err(e) => {
                warn!("poster http client build failed: {e}");
                self.set_status(format!("Posters disabled: {e}"));
                return false;
            }
        };

        let (work_tx, work_rx) = mpsc::channel::<WorkItem>();
        let (done_tx, done_rx) = mpsc::channel::<PrefetchDone>();
        let work_rx = Arc::new(Mutex::new(work_rx));

        for _ in 0..self.cfg.poster_workers.max(1) {
            let work_rx = Arc::clone(&work_rx);
            let done_tx = done_tx.clone();
            let client = Arc::clone(&client);

            std::thread::spawn(move || loop {
                let job = match work_rx.lock() {
                    Ok(rx) => rx.recv(),
                    Err(_) => break,
                };
                let Ok((url, key)) = job else {
                    break;
                };

                let result = download_and_store_resized_with_client(
                    &client,
                    &url,
                    &key,
                    POSTER_MAX_W,
                    POSTER_QUALITY,
                );

                if done_tx.send(PrefetchDone { url, result }).is_err() {
                    break;
                }
            });
        }

        self.work_tx = Some(work_tx);
        self.done_rx = Some(done_rx);
        true
    }

    /// Make sure every movie poster is known to the pool. Already cached
    /// files skip the network and go straight to `Cached`.
    pub(crate) fn queue_movie_posters(&mut self) {
        let urls: Vec<String> = self
            .movies
            .iter()
            .filter_map(|m| m.poster_url.clone())
            .filter(|u| !u.trim().is_empty() && !self.posters.contains_key(u))
            .unique()
            .collect();
        if urls.is_empty() || !self.ensure_poster_workers() {
            return;
        }

        for url in urls {
            let key = url_to_cache_key(&url);
            let path = find_any_by_key(&key);
            let state = if path.is_some() {
                PosterState::Cached
            } else {
                PosterState::Pending
            };
            if state == PosterState::Pending {
                if let Some(tx) = &self.work_tx {
                    let _ = tx.send((url.clone(), key.clone()));
                }
            }
            self.posters.insert(
                url,
                PosterSlot {
                    key,
                    state,
                    path,
                    tex: None,
                },
            );
        }
    }

    pub(crate) fn has_pending_posters(&self) -> bool {
        self.posters
            .values()
            .any(|p| p.state == PosterState::Pending)
    }

    /// Drain finished downloads, a bounded number per frame.
    pub(crate) fn poll_prefetch_done(&mut self, ctx: &eg::Context) {
        let Some(rx) = &self.done_rx else {
            return;
        };

        let mut drained = 0usize;
        let mut finished = Vec::new();
        let mut disconnected = false;
        while drained < super::MAX_DONE_PER_FRAME {
            match rx.try_recv() {
                Ok(msg) => {
                    drained += 1;
                    finished.push(msg);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected {
            warn!("poster workers stopped");
            self.work_tx = None;
            self.done_rx = None;
        }

        for msg in finished {
            let Some(slot) = self.posters.get_mut(&msg.url) else {
                continue;
            };
            match msg.result {
                Ok(path) => {
                    slot.path = Some(path);
                    // uploaded lazily during paint
                    slot.state = PosterState::Cached;
                }
                Err(e) => {
                    debug!("poster download failed: {e}");
                    slot.state = PosterState::Failed;
                }
            }
        }

        if drained > 0 {
            ctx.request_repaint();
        }
    }
}
