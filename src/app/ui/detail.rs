// src/app/ui/detail.rs
use eframe::egui as eg;

use crate::app::prefs::DETAIL_W_RANGE;
use crate::app::{Action, ItemKind, MovieDraft};

impl crate::app::TripApp {
    pub(crate) fn ui_render_detail_panel(&mut self, ctx: &eg::Context, actions: &mut Vec<Action>) {
        let Some(movie) = self
            .selected_movie
            .as_deref()
            .and_then(|id| self.movie_by_id(id))
            .cloned()
        else {
            return;
        };

        let panel = eg::SidePanel::right("detail_panel")
            .resizable(true)
            .default_width(self.detail_panel_width)
            .min_width(*DETAIL_W_RANGE.start())
            .max_width(*DETAIL_W_RANGE.end())
            .show(ctx, |ui| {
                ui.add_space(6.0);
                ui.horizontal(|ui| {
                    ui.heading("Details");
                    ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                        if ui.button("Close").clicked() {
                            self.selected_movie = None;
                            self.movie_draft = None;
                        }
                    });
                });
                ui.separator();

                eg::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(4.0);
                    let avail_w = ui.available_width().clamp(120.0, 360.0);
                    let poster_size = eg::vec2(avail_w, avail_w * 1.5);

                    if let Some(tex) = self.poster_texture(movie.poster_url.as_deref()) {
                        ui.image((tex.id(), poster_size));
                    } else {
                        let (rect, _resp) = ui.allocate_exact_size(poster_size, eg::Sense::hover());
                        ui.painter().rect_filled(rect, 8.0, eg::Color32::from_gray(40));
                        let text = if movie.poster_url.is_some() {
                            "Poster loading…"
                        } else {
                            "No poster"
                        };
                        ui.painter().text(
                            rect.center(),
                            eg::Align2::CENTER_CENTER,
                            text,
                            eg::FontId::proportional(14.0),
                            eg::Color32::WHITE,
                        );
                    }

                    ui.add_space(8.0);

                    let mut cancel_edit = false;
                    if let Some(draft) = &mut self.movie_draft {
                        eg::Grid::new("movie_edit_grid")
                            .num_columns(2)
                            .spacing([8.0, 6.0])
                            .show(ui, |ui| {
                                ui.label("Title");
                                ui.text_edit_singleline(&mut draft.title);
                                ui.end_row();
                                ui.label("Watch date");
                                super::date_edit(ui, &mut draft.watch_date, "YYYY-MM-DD");
                                ui.end_row();
                            });
                        ui.label("Notes");
                        ui.add(eg::TextEdit::multiline(&mut draft.notes).desired_rows(4));
                        ui.horizontal(|ui| {
                            if ui.button("Save").clicked() {
                                actions.push(Action::SaveMovie(draft.clone()));
                            }
                            if ui.button("Cancel").clicked() {
                                cancel_edit = true;
                            }
                        });
                    }
                    if cancel_edit {
                        self.movie_draft = None;
                    }
                    if self.movie_draft.is_some() {
                        return;
                    }

                    let title = match movie.release_year {
                        Some(y) => format!("{} ({})", movie.title, y),
                        None => movie.title.clone(),
                    };
                    ui.heading(title);

                    let mut watched = movie.watched;
                    if ui.checkbox(&mut watched, "Watched").changed() {
                        actions.push(Action::SetMovieWatched(movie.id.clone(), watched));
                    }

                    let when = movie
                        .watch_date
                        .as_deref()
                        .and_then(crate::app::utils::parse_day)
                        .map(crate::app::utils::format_day_label)
                        .unwrap_or_else(|| "Not scheduled".into());
                    ui.label(format!("📅 {when}"));

                    if let Some(notes) = movie.notes.as_deref().filter(|n| !n.trim().is_empty()) {
                        ui.add_space(4.0);
                        ui.add(eg::Label::new(notes).wrap());
                    }

                    ui.add_space(6.0);
                    ui.label(eg::RichText::new("Tags").strong());
                    super::tag_chips(ui, &movie.tags);

                    if let Some(link) = movie.deep_link.as_deref() {
                        ui.add_space(4.0);
                        ui.hyperlink_to("Where to watch ↗", link);
                    }

                    ui.add_space(8.0);
                    ui.separator();
                    ui.horizontal_wrapped(|ui| {
                        if ui.button("✏ Edit").clicked() {
                            self.movie_draft = Some(MovieDraft {
                                id: movie.id.clone(),
                                title: movie.title.clone(),
                                notes: movie.notes.clone().unwrap_or_default(),
                                watch_date: movie.watch_date.clone().unwrap_or_default(),
                            });
                        }
                        if ui.button("🏷 Tags…").clicked() {
                            self.open_tag_editor(ItemKind::Movies, &movie.id);
                        }
                        if ui.button("🗑 Delete").clicked() {
                            self.confirm_delete = Some((ItemKind::Movies, movie.id.clone()));
                        }
                    });
                });
            });

        let width = panel.response.rect.width();
        if (width - self.detail_panel_width).abs() > 1.0 {
            self.detail_panel_width = width;
            self.mark_dirty();
        }
    }
}
