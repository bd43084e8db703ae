// src/app/ui/tasks.rs
use eframe::egui as eg;
use egui_extras::{Column, TableBuilder};

use crate::app::filters::filtered_indices;
use crate::app::utils::{format_day_label, parse_day, today};
use crate::app::{Action, ItemKind, TaskDraft};

impl crate::app::TripApp {
    pub(crate) fn ui_render_tasks(&mut self, ui: &mut eg::Ui, actions: &mut Vec<Action>) {
        // ---- new task row ----
        ui.horizontal(|ui| {
            ui.add(
                eg::TextEdit::singleline(&mut self.task_draft.title)
                    .hint_text("New task…")
                    .desired_width(220.0),
            );
            super::date_edit(ui, &mut self.task_draft.due_date, "Due YYYY-MM-DD");
            ui.add(
                eg::TextEdit::singleline(&mut self.task_draft.description)
                    .hint_text("Details (optional)")
                    .desired_width(220.0),
            );
            let can_add = !self.task_draft.title.trim().is_empty();
            if ui.add_enabled(can_add, eg::Button::new("Add")).clicked() {
                actions.push(Action::CreateTask(self.new_task_from_draft()));
            }
        });
        ui.separator();

        let rows = filtered_indices(&self.tasks, &self.task_filter);
        if rows.is_empty() {
            ui.add_space(16.0);
            ui.label(if self.tasks.is_empty() {
                "No tasks yet."
            } else {
                "Nothing matches the current filters."
            });
            self.ui_render_task_edit_window(ui.ctx(), actions);
            return;
        }

        let today = today();
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(eg::Layout::left_to_right(eg::Align::Center))
            .column(Column::exact(28.0))
            .column(Column::remainder().at_least(180.0))
            .column(Column::initial(150.0))
            .column(Column::initial(200.0))
            .column(Column::auto())
            .header(22.0, |mut header| {
                header.col(|_ui| {});
                header.col(|ui| {
                    ui.strong("Task");
                });
                header.col(|ui| {
                    ui.strong("Due");
                });
                header.col(|ui| {
                    ui.strong("Tags");
                });
                header.col(|_ui| {});
            })
            .body(|mut body| {
                for idx in rows {
                    let task = &self.tasks[idx];
                    body.row(30.0, |mut row| {
                        row.col(|ui| {
                            let mut done = task.completed;
                            if ui.checkbox(&mut done, "").changed() {
                                actions.push(Action::SetTaskCompleted(task.id.clone(), done));
                            }
                        });
                        row.col(|ui| {
                            let mut title = eg::RichText::new(&task.title);
                            if task.completed {
                                title = title.strikethrough().weak();
                            }
                            let resp = ui.label(title);
                            if let Some(desc) = task.description.as_deref() {
                                resp.on_hover_text(desc);
                            }
                        });
                        row.col(|ui| {
                            let day = task.due_date.as_deref().and_then(parse_day);
                            match day {
                                Some(d) => {
                                    let text = eg::RichText::new(format_day_label(d));
                                    let overdue = d < today && !task.completed;
                                    ui.label(if overdue {
                                        text.color(ui.visuals().error_fg_color)
                                    } else {
                                        text
                                    });
                                }
                                None => {
                                    ui.label(eg::RichText::new("—").weak());
                                }
                            }
                        });
                        row.col(|ui| {
                            let names = task.tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>();
                            ui.label(eg::RichText::new(names.join(", ")).small());
                        });
                        row.col(|ui| {
                            if ui.small_button("✏").on_hover_text("Edit").clicked() {
                                self.editing_task = Some(TaskDraft {
                                    id: task.id.clone(),
                                    title: task.title.clone(),
                                    description: task.description.clone().unwrap_or_default(),
                                    due_date: task.due_date.clone().unwrap_or_default(),
                                });
                            }
                            if ui.small_button("🏷").on_hover_text("Tags").clicked() {
                                self.tag_editor_request = Some((ItemKind::Tasks, task.id.clone()));
                            }
                            if ui.small_button("🗑").on_hover_text("Delete").clicked() {
                                self.confirm_delete = Some((ItemKind::Tasks, task.id.clone()));
                            }
                        });
                    });
                }
            });

        if let Some((kind, id)) = self.tag_editor_request.take() {
            self.open_tag_editor(kind, &id);
        }
        self.ui_render_task_edit_window(ui.ctx(), actions);
    }

    fn ui_render_task_edit_window(&mut self, ctx: &eg::Context, actions: &mut Vec<Action>) {
        let Some(draft) = &mut self.editing_task else {
            return;
        };

        let mut open = true;
        let mut close = false;
        eg::Window::new("Edit task")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                eg::Grid::new("task_edit_grid")
                    .num_columns(2)
                    .spacing([8.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Title");
                        ui.text_edit_singleline(&mut draft.title);
                        ui.end_row();
                        ui.label("Due");
                        super::date_edit(ui, &mut draft.due_date, "YYYY-MM-DD");
                        ui.end_row();
                        ui.label("Details");
                        ui.add(eg::TextEdit::multiline(&mut draft.description).desired_rows(3));
                        ui.end_row();
                    });
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        actions.push(Action::SaveTask(draft.clone()));
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });

        if !open || close {
            self.editing_task = None;
        }
    }
}
