// src/app/ui/notes.rs
use eframe::egui as eg;

use crate::app::{Action, NewNote, Note, NoteColor};

const CARD_W: f32 = 220.0;

fn note_fill(color: NoteColor) -> eg::Color32 {
    let (r, g, b) = color.rgb();
    eg::Color32::from_rgb(r, g, b)
}

fn color_picker(ui: &mut eg::Ui, current: &mut NoteColor) -> bool {
    let mut changed = false;
    for c in NoteColor::ALL {
        let (rect, resp) = ui.allocate_exact_size(eg::vec2(18.0, 18.0), eg::Sense::click());
        ui.painter().circle_filled(rect.center(), 8.0, note_fill(c));
        if *current == c {
            ui.painter().circle_stroke(
                rect.center(),
                9.0,
                eg::Stroke::new(2.0, ui.visuals().strong_text_color()),
            );
        }
        if resp.on_hover_text(c.as_str()).clicked() && *current != c {
            *current = c;
            changed = true;
        }
    }
    changed
}

impl crate::app::TripApp {
    pub(crate) fn ui_render_notes(&mut self, ui: &mut eg::Ui, actions: &mut Vec<Action>) {
        ui.horizontal(|ui| {
            ui.add(
                eg::TextEdit::multiline(&mut self.note_draft.content)
                    .hint_text("Jot something down…")
                    .desired_rows(2)
                    .desired_width(360.0),
            );
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    color_picker(ui, &mut self.note_draft.color);
                });
                let can_add = !self.note_draft.content.trim().is_empty();
                if ui.add_enabled(can_add, eg::Button::new("Add note")).clicked() {
                    actions.push(Action::CreateNote(NewNote {
                        content: self.note_draft.content.clone(),
                        color: self.note_draft.color,
                    }));
                }
            });
        });
        ui.separator();

        if self.notes.is_empty() {
            ui.label(eg::RichText::new("No notes yet.").weak());
        }

        eg::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = eg::vec2(10.0, 10.0);
                    for note in &self.notes {
                        note_card(ui, note, actions, &mut self.editing_note);
                    }
                });
            });

        self.ui_render_note_edit_window(ui.ctx(), actions);
    }

    fn ui_render_note_edit_window(&mut self, ctx: &eg::Context, actions: &mut Vec<Action>) {
        let Some(note) = &mut self.editing_note else {
            return;
        };

        let mut open = true;
        let mut close = false;
        eg::Window::new("Edit note")
            .collapsible(false)
            .resizable(true)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.add(eg::TextEdit::multiline(&mut note.content).desired_rows(5));
                ui.horizontal(|ui| {
                    color_picker(ui, &mut note.color);
                });
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        actions.push(Action::SaveNote(note.clone()));
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if !open || close {
            self.editing_note = None;
        }
    }
}

fn note_card(ui: &mut eg::Ui, note: &Note, actions: &mut Vec<Action>, editing: &mut Option<Note>) {
    eg::Frame::none()
        .fill(note_fill(note.color))
        .rounding(6.0)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.set_width(CARD_W);
            ui.horizontal(|ui| {
                let pin = if note.pinned { "📌" } else { "📍" };
                let tip = if note.pinned { "Unpin" } else { "Pin to top" };
                if ui.small_button(pin).on_hover_text(tip).clicked() {
                    actions.push(Action::SaveNote(Note {
                        pinned: !note.pinned,
                        ..note.clone()
                    }));
                }
                ui.with_layout(eg::Layout::right_to_left(eg::Align::Center), |ui| {
                    if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                        actions.push(Action::DeleteNote(note.id.clone()));
                    }
                    if ui.small_button("✏").on_hover_text("Edit").clicked() {
                        *editing = Some(note.clone());
                    }
                });
            });
            ui.add(
                eg::Label::new(eg::RichText::new(&note.content).color(eg::Color32::from_gray(30)))
                    .wrap(),
            );
            ui.label(
                eg::RichText::new(&note.created_at)
                    .small()
                    .color(eg::Color32::from_gray(90)),
            );
        });
}
