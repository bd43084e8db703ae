// src/app/ui/topbar.rs
use eframe::egui as eg;

use crate::app::prefs::{backup_ui_prefs, restore_latest_ui_prefs_backup, POSTER_W_RANGE};
use crate::app::{Action, View};

impl crate::app::TripApp {
    // ---------- TOP BAR ----------
    pub(crate) fn ui_render_topbar(&mut self, ui: &mut eg::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.heading(self.trip_heading());
            ui.separator();

            let before = self.view;
            for view in View::ALL {
                ui.selectable_value(&mut self.view, view, view.title());
            }
            if self.view != before {
                self.show_tag_filter_popup = false;
                self.mark_dirty();
            }

            ui.separator();

            if self.view == View::Movies {
                if ui.button("➕ Add from JustWatch…").clicked() {
                    self.search.open = true;
                }
                ui.label("Poster:");
                if ui
                    .add(eg::Slider::new(&mut self.poster_width_ui, POSTER_W_RANGE).suffix(" px"))
                    .changed()
                {
                    self.mark_dirty();
                }
            }

            ui.menu_button("⋯", |ui| {
                if ui.button("Back up trip data").clicked() {
                    actions.push(Action::BackupStore);
                    ui.close_menu();
                }
                ui.separator();
                if ui.button("Back up UI prefs").clicked() {
                    self.save_prefs();
                    match backup_ui_prefs() {
                        Ok(p) => self.set_status(format!("Prefs saved to {}", p.display())),
                        Err(e) => self.set_status(format!("⚠ prefs backup failed: {e}")),
                    }
                    ui.close_menu();
                }
                if ui.button("Restore latest UI prefs").clicked() {
                    match restore_latest_ui_prefs_backup() {
                        Ok(Some(p)) => {
                            self.load_prefs();
                            self.set_status(format!("Restored {}", p.display()));
                        }
                        Ok(None) => self.set_status("No prefs backup found"),
                        Err(e) => self.set_status(format!("⚠ prefs restore failed: {e}")),
                    }
                    ui.close_menu();
                }
            });

            ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                if !self.status.is_empty() {
                    ui.label(eg::RichText::new(&self.status).italics());
                }
            });
        });
    }

    fn trip_heading(&self) -> String {
        let name = self.trip.name.trim();
        if name.is_empty() {
            "Trip Planner".to_string()
        } else {
            name.to_string()
        }
    }
}
