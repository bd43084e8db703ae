// src/app/data.rs
use tracing::{debug, warn};

use super::store::{StoreError, StoreResult};
use super::tags::TagForest;
use super::{Action, ItemKind, Movie, NewMovie, NewTask, Task, TripDraft};

impl crate::app::TripApp {
    /// Re-read every list from the store. Any failure leaves the old data in
    /// place and reports it on the status line.
    pub(crate) fn reload_all(&mut self) {
        let Some(store) = &self.store else {
            return;
        };
        let loaded = (|| -> StoreResult<_> {
            Ok((
                store.list_movies()?,
                store.list_tasks()?,
                store.list_notes()?,
                store.list_tags()?,
                store.trip()?,
            ))
        })();

        match loaded {
            Ok((movies, tasks, notes, tags, trip)) => {
                self.movies = movies;
                self.tasks = tasks;
                self.notes = notes;
                self.forest = TagForest::build(&tags);
                if self.forest.dropped > 0 {
                    debug!("{} tags hidden with broken parents", self.forest.dropped);
                }
                self.tags = tags;
                self.trip = trip;
                self.forget_missing_selections();
                self.queue_movie_posters();
            }
            Err(e) => {
                warn!("reload failed: {e}");
                self.set_status(format!("Could not load data: {e}"));
            }
        }
    }

    /// Drop selections pointing at rows or tags that no longer exist.
    fn forget_missing_selections(&mut self) {
        if let Some(id) = &self.selected_movie {
            if !self.movies.iter().any(|m| &m.id == id) {
                self.selected_movie = None;
                self.movie_draft = None;
            }
        }
        let known = |id: &String| self.tags.iter().any(|t| &t.id == id);
        self.movie_filter.selected_tag_ids.retain(known);
        self.task_filter.selected_tag_ids.retain(known);
    }

    pub(crate) fn movie_by_id(&self, id: &str) -> Option<&Movie> {
        self.movies.iter().find(|m| m.id == id)
    }

    pub(crate) fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn apply_actions(&mut self, actions: Vec<Action>) {
        let mut wrote = false;
        for action in actions {
            match self.apply_action(action) {
                Ok(Some(msg)) => {
                    wrote = true;
                    self.set_status(msg);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!("store write failed: {e}");
                    let msg = match e {
                        StoreError::Validation(m) => m,
                        other => other.to_string(),
                    };
                    self.set_status(format!("⚠ {msg}"));
                }
            }
        }
        if wrote {
            self.reload_all();
        }
    }

    /// Runs one store write. `Ok(Some(msg))` means data changed.
    fn apply_action(&mut self, action: Action) -> StoreResult<Option<String>> {
        let Some(store) = self.store.as_mut() else {
            return Ok(None);
        };
        let opt = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());

        let msg = match action {
            Action::SaveMovie(draft) => {
                let Some(existing) = self.movies.iter().find(|m| m.id == draft.id) else {
                    return Err(StoreError::NotFound(format!("movie {}", draft.id)));
                };
                let updated = Movie {
                    title: draft.title.clone(),
                    notes: opt(&draft.notes),
                    watch_date: opt(&draft.watch_date),
                    ..existing.clone()
                };
                store.update_movie(&updated)?;
                self.movie_draft = None;
                format!("Saved “{}”", updated.title.trim())
            }
            Action::AddMovieFromSearch(result) => {
                let id = store.create_movie(&NewMovie {
                    title: result.title.clone(),
                    release_year: result.release_year,
                    poster_url: result.poster_url.clone(),
                    deep_link: Some(result.deep_link.clone()),
                    justwatch_id: Some(result.id),
                    ..Default::default()
                })?;
                self.selected_movie = Some(id);
                format!("Added “{}”", result.title)
            }
            Action::SetMovieWatched(id, watched) => {
                store.set_movie_watched(&id, watched)?;
                String::from(if watched { "Marked watched" } else { "Marked unwatched" })
            }
            Action::DeleteMovie(id) => {
                store.delete_movie(&id)?;
                "Movie deleted".to_string()
            }
            Action::CreateTask(new) => {
                store.create_task(&new)?;
                self.task_draft = Default::default();
                format!("Added task “{}”", new.title.trim())
            }
            Action::SaveTask(draft) => {
                let Some(existing) = self.tasks.iter().find(|t| t.id == draft.id) else {
                    return Err(StoreError::NotFound(format!("task {}", draft.id)));
                };
                let updated = Task {
                    title: draft.title.clone(),
                    description: opt(&draft.description),
                    due_date: opt(&draft.due_date),
                    ..existing.clone()
                };
                store.update_task(&updated)?;
                self.editing_task = None;
                format!("Saved task “{}”", updated.title.trim())
            }
            Action::SetTaskCompleted(id, done) => {
                store.set_task_completed(&id, done)?;
                String::from(if done { "Task completed" } else { "Task reopened" })
            }
            Action::DeleteTask(id) => {
                store.delete_task(&id)?;
                "Task deleted".to_string()
            }
            Action::SetTags(kind, item_id, ids) => {
                store.set_tags(kind, &item_id, &ids)?;
                format!("Updated tags ({} selected)", ids.len())
            }
            Action::CreateNote(new) => {
                store.create_note(&new)?;
                self.note_draft.content.clear();
                "Note added".to_string()
            }
            Action::SaveNote(note) => {
                store.update_note(&note)?;
                "Note saved".to_string()
            }
            Action::DeleteNote(id) => {
                store.delete_note(&id)?;
                "Note deleted".to_string()
            }
            Action::CreateTag(new) => {
                store.create_tag(&new)?;
                match &new.parent_id {
                    Some(pid) => {
                        self.park_editor.child_names.remove(pid);
                    }
                    None => self.park_editor.new_park.clear(),
                }
                format!("Added {} “{}”", new.tag_type.as_str(), new.name.trim())
            }
            Action::RenameTag(id, name) => {
                let icon = self.tags.iter().find(|t| t.id == id).and_then(|t| t.icon.clone());
                store.rename_tag(&id, &name, icon.as_deref())?;
                self.park_editor.renaming = None;
                format!("Renamed to “{}”", name.trim())
            }
            Action::DeleteTag(id) => {
                store.delete_tag(&id)?;
                "Tag deleted with everything under it".to_string()
            }
            Action::SetAttractionDone(id, done) => {
                store.set_attraction_done(&id, done)?;
                String::from(if done { "Ride done!" } else { "Ride unmarked" })
            }
            Action::SaveTrip(details) => {
                store.save_trip(&details)?;
                self.trip_draft = TripDraft::from_details(&details);
                "Trip details saved".to_string()
            }
            Action::BackupStore => {
                let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
                let dest = self
                    .cfg
                    .store_path()
                    .with_file_name(format!("tripboard_backup_{stamp}.db"));
                store.backup_to(&dest)?;
                format!("Backup written to {}", dest.display())
            }
        };
        Ok(Some(msg))
    }

    pub(crate) fn new_task_from_draft(&self) -> NewTask {
        let opt = |s: &str| Some(s.trim().to_string()).filter(|s| !s.is_empty());
        NewTask {
            title: self.task_draft.title.clone(),
            description: opt(&self.task_draft.description),
            due_date: opt(&self.task_draft.due_date),
        }
    }

    pub(crate) fn item_title(&self, kind: ItemKind, id: &str) -> String {
        match kind {
            ItemKind::Movies => self.movie_by_id(id).map(|m| m.title.clone()),
            ItemKind::Tasks => self.task_by_id(id).map(|t| t.title.clone()),
        }
        .unwrap_or_default()
    }
}
