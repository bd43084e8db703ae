// src/app/ui/agenda.rs
use eframe::egui as eg;

use crate::app::utils::{build_agenda, format_day_label, parse_day, today, truncate_chars};
use crate::app::{Action, ItemKind};

const MAX_TITLE_CHARS: usize = 60;

impl crate::app::TripApp {
    pub(crate) fn ui_render_agenda(&mut self, ui: &mut eg::Ui, actions: &mut Vec<Action>) {
        let days = build_agenda(&self.movies, &self.tasks);
        if days.is_empty() {
            ui.add_space(16.0);
            ui.label("Nothing scheduled. Give movies a watch date or tasks a due date.");
            return;
        }

        let today = today();
        let trip_start = self.trip.start_date.as_deref().and_then(parse_day);
        let trip_end = self.trip.end_date.as_deref().and_then(parse_day);

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for (day, entries) in &days {
                    let mut heading = eg::RichText::new(format_day_label(*day)).strong().size(16.0);
                    if *day == today {
                        heading = heading.color(ui.visuals().warn_fg_color);
                    } else if *day < today {
                        heading = heading.weak();
                    }
                    ui.horizontal(|ui| {
                        ui.label(heading);
                        if *day == today {
                            ui.label(eg::RichText::new("today").small());
                        }
                        let in_trip = match (trip_start, trip_end) {
                            (Some(s), Some(e)) => s <= *day && *day <= e,
                            (Some(s), None) => s == *day,
                            _ => false,
                        };
                        if in_trip {
                            ui.label(eg::RichText::new("✈ trip").small());
                        }
                    });

                    ui.indent(("agenda_day", *day), |ui| {
                        for entry in entries {
                            ui.horizontal(|ui| {
                                let mut done = entry.done;
                                let icon = match entry.kind {
                                    ItemKind::Movies => "🎬",
                                    ItemKind::Tasks => "✅",
                                };
                                let mut text = eg::RichText::new(format!(
                                    "{icon} {}",
                                    truncate_chars(&entry.title, MAX_TITLE_CHARS)
                                ));
                                if entry.done {
                                    text = text.strikethrough().weak();
                                }
                                if ui.checkbox(&mut done, text).changed() {
                                    actions.push(match entry.kind {
                                        ItemKind::Movies => {
                                            Action::SetMovieWatched(entry.id.clone(), done)
                                        }
                                        ItemKind::Tasks => {
                                            Action::SetTaskCompleted(entry.id.clone(), done)
                                        }
                                    });
                                }
                            });
                        }
                    });
                    ui.add_space(6.0);
                }
            });
    }
}
