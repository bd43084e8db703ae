// src/app/ui/mod.rs
pub mod agenda;
pub mod detail;
pub mod filterbar;
pub mod grid;
pub mod notes;
pub mod parks;
pub mod search_dialog;
pub mod tasks;
pub mod topbar;
pub mod trip;

use std::collections::HashSet;

use eframe::egui as eg;

use crate::app::tags::TagGroup;
use crate::app::{Action, ItemKind, TagRef};

/// Checkbox list of tag groups, park first then its lands and attractions.
/// Returns the ids the user toggled this frame; selection never cascades.
pub(crate) fn tag_group_picker(
    ui: &mut eg::Ui,
    groups: &[TagGroup],
    id_salt: &str,
    is_selected: impl Fn(&str) -> bool,
    in_use: Option<&HashSet<String>>,
) -> Vec<String> {
    let mut toggled = Vec::new();
    if groups.is_empty() {
        ui.label(eg::RichText::new("No parks yet. Add some on the Parks tab.").weak());
        return toggled;
    }

    let mut checkbox = |ui: &mut eg::Ui, tag: &TagRef, text: String| {
        let mut checked = is_selected(&tag.id);
        let text = match in_use {
            Some(used) if !used.contains(&tag.id) => eg::RichText::new(text).weak(),
            _ => eg::RichText::new(text),
        };
        if ui.checkbox(&mut checked, text).changed() {
            toggled.push(tag.id.clone());
        }
    };

    for group in groups {
        let Some((root, rest)) = group.members.split_first() else {
            continue;
        };
        eg::CollapsingHeader::new(eg::RichText::new(root.label()).strong())
            .id_source((id_salt, &group.root_id))
            .default_open(true)
            .show(ui, |ui| {
                checkbox(ui, root, format!("{} (whole park)", root.name));
                for member in rest {
                    checkbox(ui, member, member.label());
                }
            });
    }
    toggled
}

/// Small read-only tag pills.
pub(crate) fn tag_chips(ui: &mut eg::Ui, tags: &[TagRef]) {
    if tags.is_empty() {
        ui.label(eg::RichText::new("No tags").weak().italics());
        return;
    }
    ui.horizontal_wrapped(|ui| {
        for tag in tags {
            let text = eg::RichText::new(tag.label()).small();
            ui.add(eg::Button::new(text).sense(eg::Sense::hover()).small());
        }
    });
}

/// Single-line date input with an inline hint when the value will be rejected.
pub(crate) fn date_edit(ui: &mut eg::Ui, value: &mut String, hint: &str) -> eg::Response {
    let resp = ui.add(
        eg::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(110.0),
    );
    if !value.trim().is_empty() && crate::app::utils::parse_day(value).is_none() {
        ui.label(eg::RichText::new("YYYY-MM-DD").color(ui.visuals().warn_fg_color));
    }
    resp
}

impl crate::app::TripApp {
    // ---------- TAG ASSIGNMENT ----------
    pub(crate) fn open_tag_editor(&mut self, kind: ItemKind, item_id: &str) {
        let tags: &[TagRef] = match kind {
            ItemKind::Movies => self.movie_by_id(item_id).map(|m| m.tags.as_slice()),
            ItemKind::Tasks => self.task_by_id(item_id).map(|t| t.tags.as_slice()),
        }
        .unwrap_or_default();
        self.tag_editor = Some(crate::app::TagEditor {
            kind,
            item_id: item_id.to_string(),
            title: self.item_title(kind, item_id),
            selection: crate::app::tags::TagSelection::from_refs(tags),
        });
    }

    pub(crate) fn ui_render_tag_editor(&mut self, ctx: &eg::Context, actions: &mut Vec<Action>) {
        let Some(mut editor) = self.tag_editor.take() else {
            return;
        };
        let groups = self.forest.groups();

        let mut open = true;
        let mut done = false;
        eg::Window::new(format!("Tags for “{}”", editor.title))
            .collapsible(false)
            .resizable(true)
            .default_width(340.0)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!("{} selected", editor.selection.len()));
                ui.separator();
                eg::ScrollArea::vertical().max_height(380.0).show(ui, |ui| {
                    let toggled = tag_group_picker(
                        ui,
                        &groups,
                        "tag_editor",
                        |id| editor.selection.contains(id),
                        None,
                    );
                    for id in toggled {
                        editor.selection.toggle(&id);
                    }
                });
                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        actions.push(Action::SetTags(
                            editor.kind,
                            editor.item_id.clone(),
                            editor.selection.ids(),
                        ));
                        done = true;
                    }
                    if ui
                        .add_enabled(!editor.selection.is_empty(), eg::Button::new("Clear"))
                        .clicked()
                    {
                        editor.selection.clear();
                    }
                    if ui.button("Cancel").clicked() {
                        done = true;
                    }
                });
            });

        // Apply result (avoid E0499 by setting after .show)
        if open && !done {
            self.tag_editor = Some(editor);
        }
    }

    // ---------- DELETE CONFIRMATION ----------
    pub(crate) fn ui_render_confirm_delete(&mut self, ctx: &eg::Context, actions: &mut Vec<Action>) {
        let Some((kind, id)) = self.confirm_delete.clone() else {
            return;
        };
        let title = self.item_title(kind, &id);

        let mut open = true;
        let mut answered = false;
        eg::Window::new("Delete?")
            .collapsible(false)
            .resizable(false)
            .anchor(eg::Align2::CENTER_CENTER, eg::vec2(0.0, 0.0))
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label(format!("Delete “{title}”? This cannot be undone."));
                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        actions.push(match kind {
                            ItemKind::Movies => Action::DeleteMovie(id.clone()),
                            ItemKind::Tasks => Action::DeleteTask(id.clone()),
                        });
                        answered = true;
                    }
                    if ui.button("Keep").clicked() {
                        answered = true;
                    }
                });
            });

        if !open || answered {
            self.confirm_delete = None;
        }
    }
}
