// src/app/ui/trip.rs
use eframe::egui as eg;

use crate::app::tags::attraction_progress;
use crate::app::utils::{countdown_label, today, trip_length_days};
use crate::app::Action;

impl crate::app::TripApp {
    pub(crate) fn ui_render_trip(&mut self, ui: &mut eg::Ui, actions: &mut Vec<Action>) {
        if let Some(label) = countdown_label(&self.trip, today()) {
            ui.heading(eg::RichText::new(label).size(26.0));
        }
        if let Some(days) = trip_length_days(&self.trip) {
            ui.label(format!(
                "{days} day{} in {}",
                if days == 1 { "" } else { "s" },
                if self.trip.destination.trim().is_empty() {
                    "total"
                } else {
                    self.trip.destination.trim()
                }
            ));
        }
        ui.add_space(8.0);

        ui.columns(2, |cols| {
            let ui = &mut cols[0];
            ui.label(eg::RichText::new("Trip details").strong());
            eg::Grid::new("trip_form")
                .num_columns(2)
                .spacing([8.0, 6.0])
                .show(ui, |ui| {
                    let d = &mut self.trip_draft;
                    ui.label("Name");
                    ui.text_edit_singleline(&mut d.name);
                    ui.end_row();
                    ui.label("Destination");
                    ui.text_edit_singleline(&mut d.destination);
                    ui.end_row();
                    ui.label("Start");
                    super::date_edit(ui, &mut d.start_date, "YYYY-MM-DD");
                    ui.end_row();
                    ui.label("End");
                    super::date_edit(ui, &mut d.end_date, "YYYY-MM-DD");
                    ui.end_row();
                    ui.label("Lodging");
                    ui.text_edit_singleline(&mut d.lodging);
                    ui.end_row();
                    ui.label("Notes");
                    ui.add(eg::TextEdit::multiline(&mut d.notes).desired_rows(4));
                    ui.end_row();
                });
            ui.add_space(6.0);
            let dirty = self.trip_draft.to_details() != self.trip;
            if ui.add_enabled(dirty, eg::Button::new("Save trip")).clicked() {
                actions.push(Action::SaveTrip(self.trip_draft.to_details()));
            }

            let ui = &mut cols[1];
            ui.label(eg::RichText::new("Progress").strong());
            let watched = self.movies.iter().filter(|m| m.watched).count();
            let done = self.tasks.iter().filter(|t| t.completed).count();
            stat_bar(ui, "🎬 Movies watched", watched, self.movies.len());
            stat_bar(ui, "✅ Tasks done", done, self.tasks.len());
            for park in &self.forest.parks {
                let (done, total) = attraction_progress(&self.forest, &park.tag.id);
                stat_bar(ui, &format!("🎢 {}", park.tag.name), done, total);
            }
            if !self.notes.is_empty() {
                ui.label(format!("📝 {} notes", self.notes.len()));
            }
        });
    }
}

fn stat_bar(ui: &mut eg::Ui, label: &str, done: usize, total: usize) {
    ui.label(label);
    let frac = if total == 0 { 0.0 } else { done as f32 / total as f32 };
    ui.add(
        eg::ProgressBar::new(frac)
            .desired_width(240.0)
            .text(format!("{done} / {total}")),
    );
    ui.add_space(4.0);
}
