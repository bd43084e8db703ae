// src/app/mod.rs
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::time::{Duration, Instant};

use eframe::egui::{self as eg, TextureHandle};
use tracing::{info, warn};

pub mod cache;
pub mod data;
pub mod filters;
pub mod gfx;
pub mod justwatch;
pub mod prefetch;
pub mod prefs;
pub mod search;
pub mod store;
pub mod tags;
pub mod types;
pub mod ui;
pub mod utils;

pub use types::*;

use crate::config::{load_config, AppConfig};
use filters::FilterCriteria;
use justwatch::NormalizedSearchResult;
use store::Store;
use tags::{TagForest, TagSelection};

// ---- Tunables ----
const MAX_DONE_PER_FRAME: usize = 12;
const MAX_UPLOADS_PER_FRAME: usize = 4;
const STATUS_TTL: Duration = Duration::from_secs(8);

/// (poster url, cache key)
type WorkItem = (String, String);

pub(crate) struct PosterSlot {
    pub key: String,
    pub state: PosterState,
    pub path: Option<PathBuf>,
    pub tex: Option<TextureHandle>,
}

/// Edit buffer for the movie detail panel.
#[derive(Clone, Debug, Default)]
pub(crate) struct MovieDraft {
    pub id: String,
    pub title: String,
    pub notes: String,
    pub watch_date: String,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct TaskDraft {
    /// Empty while creating a new task.
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: String,
}

/// Trip form mirrors `TripDetails` with plain strings for the date fields.
#[derive(Clone, Debug, Default)]
pub(crate) struct TripDraft {
    pub name: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
    pub lodging: String,
    pub notes: String,
}

impl TripDraft {
    fn from_details(t: &TripDetails) -> Self {
        Self {
            name: t.name.clone(),
            destination: t.destination.clone(),
            start_date: t.start_date.clone().unwrap_or_default(),
            end_date: t.end_date.clone().unwrap_or_default(),
            lodging: t.lodging.clone(),
            notes: t.notes.clone(),
        }
    }

    pub fn to_details(&self) -> TripDetails {
        let opt = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        TripDetails {
            name: self.name.clone(),
            destination: self.destination.clone(),
            start_date: opt(&self.start_date),
            end_date: opt(&self.end_date),
            lodging: self.lodging.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Tag assignment popup for one movie or task.
pub(crate) struct TagEditor {
    pub kind: ItemKind,
    pub item_id: String,
    pub title: String,
    pub selection: TagSelection,
}

/// New park/land/attraction input plus an in-place rename.
#[derive(Default)]
pub(crate) struct ParkEditor {
    pub new_park: String,
    /// parent id -> pending child name
    pub child_names: HashMap<String, String>,
    pub renaming: Option<(String, String)>,
}

#[derive(Default)]
pub(crate) struct SearchDialog {
    pub open: bool,
    pub query: String,
    pub loading: bool,
    /// Token of the request whose answer we still want.
    pub token: u64,
    pub results: Vec<NormalizedSearchResult>,
    pub searched: bool,
    pub rx: Option<Receiver<SearchMsg>>,
}

/// Store writes requested by the views, applied after the frame's closures.
pub(crate) enum Action {
    SaveMovie(MovieDraft),
    AddMovieFromSearch(NormalizedSearchResult),
    SetMovieWatched(String, bool),
    DeleteMovie(String),
    CreateTask(NewTask),
    SaveTask(TaskDraft),
    SetTaskCompleted(String, bool),
    DeleteTask(String),
    SetTags(ItemKind, String, Vec<String>),
    CreateNote(NewNote),
    SaveNote(Note),
    DeleteNote(String),
    CreateTag(NewTag),
    RenameTag(String, String),
    DeleteTag(String),
    SetAttractionDone(String, bool),
    SaveTrip(TripDetails),
    BackupStore,
}

pub struct TripApp {
    cfg: AppConfig,
    store: Option<Store>,
    store_error: Option<String>,

    // data (reloaded from the store after every write)
    movies: Vec<Movie>,
    tasks: Vec<Task>,
    notes: Vec<Note>,
    tags: Vec<Tag>,
    forest: TagForest,
    trip: TripDetails,

    // view state
    view: View,
    movie_filter: FilterCriteria,
    task_filter: FilterCriteria,
    show_tag_filter_popup: bool,
    selected_movie: Option<String>,
    movie_draft: Option<MovieDraft>,
    task_draft: TaskDraft,
    editing_task: Option<TaskDraft>,
    note_draft: NewNote,
    trip_draft: TripDraft,
    park_editor: ParkEditor,
    tag_editor: Option<TagEditor>,
    /// Set from inside table rows, opened once the table is drawn.
    tag_editor_request: Option<(ItemKind, String)>,
    editing_note: Option<Note>,
    confirm_delete: Option<(ItemKind, String)>,

    // search
    search: SearchDialog,
    next_search_token: u64,

    // posters
    posters: HashMap<String, PosterSlot>,
    work_tx: Option<Sender<WorkItem>>,
    done_rx: Option<Receiver<PrefetchDone>>,

    // ui prefs
    poster_width_ui: f32,
    detail_panel_width: f32,
    prefs_dirty: bool,
    prefs_last_write: Instant,

    status: String,
    status_at: Instant,
    did_init: bool,
}

impl Default for TripApp {
    fn default() -> Self {
        Self {
            cfg: AppConfig::default(),
            store: None,
            store_error: None,

            movies: Vec::new(),
            tasks: Vec::new(),
            notes: Vec::new(),
            tags: Vec::new(),
            forest: TagForest::default(),
            trip: TripDetails::default(),

            view: View::Movies,
            movie_filter: FilterCriteria::default(),
            task_filter: FilterCriteria::default(),
            show_tag_filter_popup: false,
            selected_movie: None,
            movie_draft: None,
            task_draft: TaskDraft::default(),
            editing_task: None,
            note_draft: NewNote::default(),
            trip_draft: TripDraft::default(),
            park_editor: ParkEditor::default(),
            tag_editor: None,
            tag_editor_request: None,
            editing_note: None,
            confirm_delete: None,

            search: SearchDialog::default(),
            next_search_token: 0,

            posters: HashMap::new(),
            work_tx: None,
            done_rx: None,

            poster_width_ui: 150.0,
            detail_panel_width: 320.0,
            prefs_dirty: false,
            prefs_last_write: Instant::now(),

            status: String::new(),
            status_at: Instant::now(),
            did_init: false,
        }
    }
}

impl TripApp {
    pub fn new() -> Self {
        let mut app = Self {
            cfg: load_config(),
            ..Self::default()
        };
        app.load_prefs();
        app
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_at = Instant::now();
    }

    /// Open the store and do the first load. Runs once on the first frame.
    fn init(&mut self) {
        let path = self.cfg.store_path();
        match Store::open(&path) {
            Ok(store) => {
                self.store = Some(store);
                self.reload_all();
                self.trip_draft = TripDraft::from_details(&self.trip);
                info!(
                    "Loaded {} movies, {} tasks, {} notes",
                    self.movies.len(),
                    self.tasks.len(),
                    self.notes.len()
                );
            }
            Err(e) => {
                warn!("store open failed: {e}");
                self.store_error = Some(format!("Could not open {}: {e}", path.display()));
            }
        }
        match cache::refresh_poster_cache_light() {
            Ok(n) if n > 0 => info!("removed {n} stale poster files"),
            Ok(_) => {}
            Err(e) => warn!("poster cache refresh failed: {e}"),
        }
    }

    fn ui_render_store_error(&self, ctx: &eg::Context) {
        eg::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Trip store unavailable");
                ui.separator();
                if let Some(err) = &self.store_error {
                    ui.label(err);
                }
                ui.label("Check `db_path` in config.json and restart.");
            });
        });
    }
}

impl eframe::App for TripApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        if !self.did_init {
            self.did_init = true;
            self.init();
        }

        if self.store.is_none() {
            self.ui_render_store_error(ctx);
            return;
        }

        self.poll_search(ctx);
        self.poll_prefetch_done(ctx);

        if !self.status.is_empty() && self.status_at.elapsed() >= STATUS_TTL {
            self.status.clear();
        }

        let mut actions: Vec<Action> = Vec::new();

        eg::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            self.ui_render_topbar(ui, &mut actions);
        });

        match self.view {
            View::Movies => {
                self.ui_render_detail_panel(ctx, &mut actions);
                eg::CentralPanel::default().show(ctx, |ui| {
                    self.ui_render_filter_bar(ui, ItemKind::Movies);
                    ui.separator();
                    self.ui_render_movie_grid(ui, ctx);
                });
            }
            View::Tasks => {
                eg::CentralPanel::default().show(ctx, |ui| {
                    self.ui_render_filter_bar(ui, ItemKind::Tasks);
                    ui.separator();
                    self.ui_render_tasks(ui, &mut actions);
                });
            }
            View::Notes => {
                eg::CentralPanel::default().show(ctx, |ui| self.ui_render_notes(ui, &mut actions));
            }
            View::Parks => {
                eg::CentralPanel::default().show(ctx, |ui| self.ui_render_parks(ui, &mut actions));
            }
            View::Trip => {
                eg::CentralPanel::default().show(ctx, |ui| self.ui_render_trip(ui, &mut actions));
            }
            View::Agenda => {
                eg::CentralPanel::default().show(ctx, |ui| self.ui_render_agenda(ui, &mut actions));
            }
        }

        self.ui_render_tag_filter_popup(ctx);
        self.ui_render_tag_editor(ctx, &mut actions);
        self.ui_render_search_dialog(ctx, &mut actions);
        self.ui_render_confirm_delete(ctx, &mut actions);

        if !actions.is_empty() {
            self.apply_actions(actions);
            ctx.request_repaint();
        }

        self.maybe_save_prefs();

        if self.search.loading || self.has_pending_posters() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
