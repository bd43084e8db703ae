// src/app/ui/search_dialog.rs
use std::collections::HashSet;

use eframe::egui as eg;

use crate::app::utils::normalize_title;
use crate::app::Action;

impl crate::app::TripApp {
    pub(crate) fn ui_render_search_dialog(&mut self, ctx: &eg::Context, actions: &mut Vec<Action>) {
        if !self.search.open {
            return;
        }

        let in_list: HashSet<String> = self.movies.iter().map(|m| normalize_title(&m.title)).collect();

        let mut open = true;
        let mut run_search = false;
        eg::Window::new("Add from JustWatch")
            .collapsible(false)
            .resizable(true)
            .default_width(460.0)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let resp = ui.add(
                        eg::TextEdit::singleline(&mut self.search.query)
                            .hint_text("Movie title…")
                            .desired_width(300.0),
                    );
                    if resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter)) {
                        run_search = true;
                    }
                    if ui.button("Search").clicked() {
                        run_search = true;
                    }
                    if self.search.loading {
                        ui.spinner();
                    }
                });
                ui.separator();

                if self.search.searched && self.search.results.is_empty() && !self.search.loading {
                    ui.label(eg::RichText::new("No matches").weak());
                    return;
                }

                eg::ScrollArea::vertical().max_height(420.0).show(ui, |ui| {
                    for result in &self.search.results {
                        ui.horizontal(|ui| {
                            let exists = in_list.contains(&normalize_title(&result.title));
                            if exists {
                                ui.add_enabled(false, eg::Button::new("In list"));
                            } else if ui.button("➕ Add").clicked() {
                                actions.push(Action::AddMovieFromSearch(result.clone()));
                            }
                            ui.vertical(|ui| {
                                ui.label(eg::RichText::new(result.title_line()).strong());
                                if !result.original_title.is_empty()
                                    && result.original_title != result.title
                                {
                                    ui.label(eg::RichText::new(&result.original_title).small().weak());
                                }
                                ui.hyperlink_to("JustWatch ↗", &result.deep_link);
                            });
                        });
                        ui.separator();
                    }
                });
            });

        if run_search {
            self.start_search();
        }
        if !open {
            self.search.open = false;
            self.cancel_search();
        }
    }
}
