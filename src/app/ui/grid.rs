// src/app/ui/grid.rs
use eframe::egui as eg;

use crate::app::filters::filtered_indices;

pub const H_SPACING: f32 = 6.0;
pub const V_SPACING: f32 = 10.0;

fn draw_corner_badge(p: &eg::Painter, rect: eg::Rect, label: &str) {
    if label.is_empty() {
        return;
    }
    let pad = 6.0;
    let r = eg::Rect::from_min_size(
        eg::pos2(rect.left() + pad, rect.top() + pad),
        eg::vec2(26.0, 22.0),
    );

    let visuals = p.ctx().style().visuals.clone();
    let bg = visuals.extreme_bg_color.gamma_multiply(0.92);
    let fg = visuals.strong_text_color();

    p.rect_filled(r, eg::Rounding::same(6.0), bg);
    p.rect_stroke(r, eg::Rounding::same(6.0), eg::Stroke::new(1.0, fg));
    p.text(
        r.center(),
        eg::Align2::CENTER_CENTER,
        label,
        eg::FontId::proportional(14.0),
        fg,
    );
}

/// What one card needs, copied out so the paint loop can borrow `self` mutably.
struct Card {
    id: String,
    title_line: String,
    sub_line: String,
    poster_url: Option<String>,
    watched: bool,
}

impl crate::app::TripApp {
    pub(crate) fn ui_render_movie_grid(&mut self, ui: &mut eg::Ui, ctx: &eg::Context) {
        let cards: Vec<Card> = filtered_indices(&self.movies, &self.movie_filter)
            .into_iter()
            .map(|i| &self.movies[i])
            .map(|m| Card {
                id: m.id.clone(),
                title_line: match m.release_year {
                    Some(y) => format!("{} ({y})", m.title),
                    None => m.title.clone(),
                },
                sub_line: m
                    .watch_date
                    .as_deref()
                    .and_then(crate::app::utils::parse_day)
                    .map(crate::app::utils::format_day_label)
                    .unwrap_or_else(|| "—".into()),
                poster_url: m.poster_url.clone(),
                watched: m.watched,
            })
            .collect();

        if cards.is_empty() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| {
                if self.movies.is_empty() {
                    ui.label("No movies yet. Use “Add from JustWatch…” to find one.");
                } else {
                    ui.label("Nothing matches the current filters.");
                }
            });
            return;
        }

        let card_w: f32 = self.poster_width_ui;
        let text_h: f32 = 44.0;
        let card_h: f32 = card_w * 1.5 + text_h;
        let mut uploads_left = super::super::MAX_UPLOADS_PER_FRAME;

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let avail = ui.available_width();
                let cols = ((avail + H_SPACING) / (card_w + H_SPACING))
                    .floor()
                    .max(1.0) as usize;

                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = eg::vec2(H_SPACING, V_SPACING);

                    for (col, card) in cards.iter().enumerate() {
                        if col > 0 && col.is_multiple_of(cols) {
                            ui.end_row();
                        }

                        ui.allocate_ui_with_layout(
                            eg::vec2(card_w, card_h),
                            eg::Layout::top_down(eg::Align::Min),
                            |ui| {
                                ui.set_min_size(eg::vec2(card_w, card_h));
                                let rect = ui.max_rect();

                                let id = eg::Id::new(("movie_card", &card.id));
                                if ui.interact(rect, id, eg::Sense::click()).clicked() {
                                    if self.selected_movie.as_deref() != Some(card.id.as_str()) {
                                        self.movie_draft = None;
                                    }
                                    self.selected_movie = Some(card.id.clone());
                                }

                                // opportunistic upload
                                if let Some(url) = &card.poster_url {
                                    if uploads_left > 0 && self.try_lazy_upload(ctx, url) {
                                        uploads_left -= 1;
                                    }
                                }

                                let poster_rect = eg::Rect::from_min_max(
                                    rect.min,
                                    eg::pos2(rect.min.x + card_w, rect.min.y + card_w * 1.5),
                                );
                                let text_rect = eg::Rect::from_min_max(
                                    eg::pos2(rect.min.x, poster_rect.max.y),
                                    rect.max,
                                );

                                if let Some(tex) = self.poster_texture(card.poster_url.as_deref()) {
                                    ui.painter().image(
                                        tex.id(),
                                        poster_rect,
                                        eg::Rect::from_min_max(eg::pos2(0.0, 0.0), eg::pos2(1.0, 1.0)),
                                        eg::Color32::WHITE,
                                    );
                                } else {
                                    ui.painter()
                                        .rect_filled(poster_rect, 6.0, eg::Color32::from_gray(40));
                                    ui.painter().text(
                                        poster_rect.center(),
                                        eg::Align2::CENTER_CENTER,
                                        "🎬",
                                        eg::FontId::proportional(28.0),
                                        eg::Color32::from_gray(160),
                                    );
                                }

                                if card.watched {
                                    ui.painter().rect_filled(
                                        poster_rect,
                                        eg::Rounding::ZERO,
                                        eg::Color32::from_black_alpha(70),
                                    );
                                    draw_corner_badge(ui.painter(), poster_rect, "✔");
                                }

                                ui.allocate_ui_at_rect(text_rect, |ui| {
                                    ui.add(
                                        eg::Label::new(
                                            eg::RichText::new(format!(
                                                "{}\n{}",
                                                card.title_line, card.sub_line
                                            ))
                                            .size(13.0),
                                        )
                                        .wrap(),
                                    );
                                });

                                if self.selected_movie.as_deref() == Some(card.id.as_str()) {
                                    ui.painter().rect_stroke(
                                        rect.shrink(1.0),
                                        6.0,
                                        eg::Stroke::new(2.0, eg::Color32::YELLOW),
                                    );
                                }
                            },
                        );
                    }

                    ui.end_row();
                });
            });
    }
}
