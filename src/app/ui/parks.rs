// src/app/ui/parks.rs
use eframe::egui as eg;

use crate::app::tags::{LandNode, ParkNode};
use crate::app::{Action, NewTag, Tag, TagType};

impl crate::app::TripApp {
    pub(crate) fn ui_render_parks(&mut self, ui: &mut eg::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            let resp = ui.add(
                eg::TextEdit::singleline(&mut self.park_editor.new_park)
                    .hint_text("New park…")
                    .desired_width(220.0),
            );
            let enter = resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter));
            let can_add = !self.park_editor.new_park.trim().is_empty();
            if (ui.add_enabled(can_add, eg::Button::new("Add park")).clicked() || enter) && can_add
            {
                actions.push(Action::CreateTag(NewTag {
                    name: self.park_editor.new_park.clone(),
                    tag_type: TagType::Park,
                    parent_id: None,
                    icon: Some("🏰".into()),
                }));
            }
        });

        if self.forest.dropped > 0 {
            ui.label(
                eg::RichText::new(format!(
                    "{} lands/attractions hidden because their parent is missing.",
                    self.forest.dropped
                ))
                .weak()
                .small(),
            );
        }
        ui.separator();

        let parks = self.forest.parks.clone();
        if parks.is_empty() {
            ui.label(eg::RichText::new("No parks yet.").weak());
            return;
        }

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                for park in &parks {
                    self.ui_park_section(ui, park, actions);
                }
            });
    }

    fn ui_park_section(&mut self, ui: &mut eg::Ui, park: &ParkNode, actions: &mut Vec<Action>) {
        let (done, total) = park.progress();
        let header = format!(
            "{} {}   {done}/{total}",
            park.tag.icon.as_deref().unwrap_or("🏰"),
            park.tag.name
        );

        eg::CollapsingHeader::new(eg::RichText::new(header).strong().size(16.0))
            .id_source(("park", &park.tag.id))
            .default_open(true)
            .show(ui, |ui| {
                if total > 0 {
                    ui.add(
                        eg::ProgressBar::new(done as f32 / total as f32)
                            .desired_width(260.0)
                            .text(format!("{done} of {total} rides done")),
                    );
                }
                self.ui_tag_row_controls(ui, &park.tag, actions);

                for land in &park.lands {
                    self.ui_land_section(ui, land, actions);
                }

                self.ui_add_child(ui, &park.tag.id, TagType::Land, actions);
            });
        ui.add_space(6.0);
    }

    fn ui_land_section(&mut self, ui: &mut eg::Ui, land: &LandNode, actions: &mut Vec<Action>) {
        eg::CollapsingHeader::new(format!(
            "{} {}",
            land.tag.icon.as_deref().unwrap_or("🗺"),
            land.tag.name
        ))
        .id_source(("land", &land.tag.id))
        .default_open(true)
        .show(ui, |ui| {
            self.ui_tag_row_controls(ui, &land.tag, actions);
            for attraction in &land.attractions {
                let tag = &attraction.tag;
                ui.horizontal(|ui| {
                    let mut done = tag.done;
                    if ui.checkbox(&mut done, "").changed() {
                        actions.push(Action::SetAttractionDone(tag.id.clone(), done));
                    }
                    self.ui_tag_row_controls(ui, tag, actions);
                });
            }
            self.ui_add_child(ui, &land.tag.id, TagType::Attraction, actions);
        });
    }

    /// Name (or rename box) plus rename/delete buttons for one tag.
    fn ui_tag_row_controls(&mut self, ui: &mut eg::Ui, tag: &Tag, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            let renaming_this = matches!(&self.park_editor.renaming, Some((id, _)) if id == &tag.id);
            if renaming_this {
                let mut cancel = false;
                if let Some((_, name)) = &mut self.park_editor.renaming {
                    let resp = ui.add(eg::TextEdit::singleline(name).desired_width(180.0));
                    let entered = resp.lost_focus() && ui.input(|i| i.key_pressed(eg::Key::Enter));
                    let clicked = ui.small_button("✔").clicked();
                    cancel = ui.small_button("✖").clicked();
                    if entered || clicked {
                        actions.push(Action::RenameTag(tag.id.clone(), name.clone()));
                    }
                }
                if cancel {
                    self.park_editor.renaming = None;
                }
                return;
            }

            if tag.tag_type == TagType::Attraction {
                let mut text = eg::RichText::new(&tag.name);
                if tag.done {
                    text = text.strikethrough().weak();
                }
                ui.label(text);
            }
            if ui.small_button("✏").on_hover_text("Rename").clicked() {
                self.park_editor.renaming = Some((tag.id.clone(), tag.name.clone()));
            }
            if ui
                .small_button("🗑")
                .on_hover_text(match tag.tag_type {
                    TagType::Attraction => "Delete",
                    _ => "Delete with everything inside",
                })
                .clicked()
            {
                actions.push(Action::DeleteTag(tag.id.clone()));
            }
        });
    }

    fn ui_add_child(
        &mut self,
        ui: &mut eg::Ui,
        parent_id: &str,
        tag_type: TagType,
        actions: &mut Vec<Action>,
    ) {
        let hint = match tag_type {
            TagType::Land => "Add land…",
            _ => "Add attraction…",
        };
        ui.horizontal(|ui| {
            let name = self
                .park_editor
                .child_names
                .entry(parent_id.to_string())
                .or_default();
            ui.add(
                eg::TextEdit::singleline(name)
                    .hint_text(hint)
                    .desired_width(200.0),
            );
            if ui
                .add_enabled(!name.trim().is_empty(), eg::Button::new("Add"))
                .clicked()
            {
                actions.push(Action::CreateTag(NewTag {
                    name: name.clone(),
                    tag_type,
                    parent_id: Some(parent_id.to_string()),
                    icon: None,
                }));
            }
        });
    }
}
