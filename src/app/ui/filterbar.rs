// src/app/ui/filterbar.rs
use std::collections::HashSet;

use eframe::egui as eg;

use crate::app::filters::{collect_tags, filtered_indices, DateSort, FilterCriteria, StatusFilter};
use crate::app::tags::group_by_root;
use crate::app::{ItemKind, View};

impl crate::app::TripApp {
    fn criteria_mut(&mut self, kind: ItemKind) -> &mut FilterCriteria {
        match kind {
            ItemKind::Movies => &mut self.movie_filter,
            ItemKind::Tasks => &mut self.task_filter,
        }
    }

    fn shown_and_total(&self, kind: ItemKind) -> (usize, usize) {
        match kind {
            ItemKind::Movies => (
                filtered_indices(&self.movies, &self.movie_filter).len(),
                self.movies.len(),
            ),
            ItemKind::Tasks => (
                filtered_indices(&self.tasks, &self.task_filter).len(),
                self.tasks.len(),
            ),
        }
    }

    // ---------- FILTER BAR ----------
    pub(crate) fn ui_render_filter_bar(&mut self, ui: &mut eg::Ui, kind: ItemKind) {
        let (shown, total) = self.shown_and_total(kind);
        let mut open_tags = self.show_tag_filter_popup;

        let criteria = self.criteria_mut(kind);
        ui.horizontal(|ui| {
            ui.add(
                eg::TextEdit::singleline(&mut criteria.search_term)
                    .hint_text("Search…")
                    .desired_width(180.0),
            );

            let tag_label = if criteria.selected_tag_ids.is_empty() {
                "Tags…".to_string()
            } else {
                format!("Tags ({})…", criteria.selected_tag_ids.len())
            };
            if ui.button(tag_label).clicked() {
                open_tags = !open_tags;
            }

            eg::ComboBox::from_id_source(("status_combo", kind.as_str()))
                .selected_text(criteria.status.label(kind))
                .show_ui(ui, |ui| {
                    for s in StatusFilter::ALL {
                        ui.selectable_value(&mut criteria.status, s, s.label(kind));
                    }
                });

            eg::ComboBox::from_id_source(("date_sort_combo", kind.as_str()))
                .selected_text(format!("{}: {}", kind.date_label(), criteria.date_sort.label()))
                .show_ui(ui, |ui| {
                    for s in DateSort::ALL {
                        ui.selectable_value(&mut criteria.date_sort, s, s.label());
                    }
                });

            if ui
                .add_enabled(!criteria.is_default(), eg::Button::new("Clear"))
                .on_hover_text("Reset search, tags, status and sort")
                .clicked()
            {
                criteria.clear();
            }

            ui.separator();
            ui.label(eg::RichText::new(format!("{shown} of {total}")).weak());
        });

        self.show_tag_filter_popup = open_tags;
    }

    // ---------- TAG FILTER POPUP ----------
    pub(crate) fn ui_render_tag_filter_popup(&mut self, ctx: &eg::Context) {
        if !self.show_tag_filter_popup {
            return;
        }
        let kind = match self.view {
            View::Movies => ItemKind::Movies,
            View::Tasks => ItemKind::Tasks,
            _ => {
                self.show_tag_filter_popup = false;
                return;
            }
        };

        let groups = group_by_root(&self.tags);
        let in_use: HashSet<String> = match kind {
            ItemKind::Movies => collect_tags(&self.movies),
            ItemKind::Tasks => collect_tags(&self.tasks),
        }
        .into_iter()
        .map(|t| t.id)
        .collect();

        let mut open = self.show_tag_filter_popup;
        let criteria = self.criteria_mut(kind);
        eg::Window::new("Tag filter")
            .collapsible(false)
            .resizable(true)
            .default_width(320.0)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(eg::RichText::new("Show items with any of:").strong());
                    if !criteria.selected_tag_ids.is_empty() && ui.small_button("Clear").clicked() {
                        criteria.selected_tag_ids.clear();
                    }
                });
                ui.label(eg::RichText::new("Greyed tags are not used by any item.").weak().small());

                ui.separator();
                eg::ScrollArea::vertical().max_height(360.0).show(ui, |ui| {
                    let toggled = tag_picker(ui, &groups, criteria, &in_use);
                    for id in toggled {
                        criteria.toggle_tag(&id);
                    }
                });
            });

        // Apply result (avoid E0499 by setting after .show)
        self.show_tag_filter_popup = open;
    }
}

fn tag_picker(
    ui: &mut eg::Ui,
    groups: &[crate::app::tags::TagGroup],
    criteria: &FilterCriteria,
    in_use: &HashSet<String>,
) -> Vec<String> {
    super::tag_group_picker(
        ui,
        groups,
        "tag_filter",
        |id| criteria.selected_tag_ids.contains(id),
        Some(in_use),
    )
}
