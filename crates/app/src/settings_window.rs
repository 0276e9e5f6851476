//! Settings window: model, generation options, escalation keywords, email
//! and export folder. Edits a draft; nothing is live until Save.

use crate::types::{AppState, SettingsEditor};
use eframe::egui;
use shared::settings::{Preset, PromptStyle};

enum SettingsAction {
    Save,
    Cancel,
    Refresh,
    Preset(Preset),
}

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);
    ui.heading(egui::RichText::new(title).size(16.0));
    ui.add_space(4.0);
}

/// One keyword per line. Split on '\n' rather than `lines()` so a trailing
/// newline survives while the user is typing.
fn keyword_editor(ui: &mut egui::Ui, id: &str, keywords: &mut Vec<String>) {
    let mut text = keywords.join("\n");
    let response = ui.add(
        egui::TextEdit::multiline(&mut text)
            .id_source(id)
            .desired_rows(4)
            .desired_width(f32::INFINITY),
    );
    if response.changed() {
        *keywords = text.split('\n').map(str::to_string).collect();
    }
}

fn model_section(ui: &mut egui::Ui, editor: &mut SettingsEditor, action: &mut Option<SettingsAction>) {
    section(ui, "AI Model");

    ui.horizontal(|ui| {
        ui.label("Model:");
        if editor.available_models.is_empty() {
            ui.text_edit_singleline(&mut editor.draft.model.name);
        } else {
            egui::ComboBox::from_id_source("model_select")
                .selected_text(editor.draft.model.name.clone())
                .show_ui(ui, |ui| {
                    for name in &editor.available_models {
                        ui.selectable_value(&mut editor.draft.model.name, name.clone(), name);
                    }
                });
        }
        let refreshing = editor.models_task.is_some();
        if ui
            .add_enabled(!refreshing, egui::Button::new("Refresh"))
            .on_hover_text("Ask the model server which models are installed")
            .clicked()
        {
            *action = Some(SettingsAction::Refresh);
        }
        if refreshing {
            ui.spinner();
        }
    });
    if let Some(err) = &editor.models_error {
        ui.label(egui::RichText::new(err).small().color(egui::Color32::from_rgb(200, 120, 60)));
    }

    ui.horizontal(|ui| {
        ui.label("Endpoint:");
        ui.add(
            egui::TextEdit::singleline(&mut editor.draft.model.endpoint)
                .desired_width(320.0),
        );
    });
    if std::env::var("OLLAMA_URL").map_or(false, |v| !v.trim().is_empty()) {
        ui.label(
            egui::RichText::new("OLLAMA_URL is set and overrides this endpoint.")
                .small()
                .weak(),
        );
    }

    section(ui, "Behavior");
    ui.horizontal_wrapped(|ui| {
        ui.label("Presets:");
        for preset in Preset::ALL {
            if ui.button(preset.as_str()).clicked() {
                *action = Some(SettingsAction::Preset(preset));
            }
        }
    });

    ui.horizontal(|ui| {
        ui.label("Prompt style:");
        egui::ComboBox::from_id_source("prompt_style")
            .selected_text(editor.draft.model.prompt_style.as_str())
            .show_ui(ui, |ui| {
                for style in PromptStyle::ALL {
                    ui.selectable_value(&mut editor.draft.model.prompt_style, style, style.as_str());
                }
            });
    });

    let o = &mut editor.draft.model.options;
    egui::Grid::new("generation_options")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("Temperature");
            ui.add(egui::DragValue::new(&mut o.temperature).speed(0.05));
            ui.end_row();

            ui.label("Top-p");
            ui.add(egui::DragValue::new(&mut o.top_p).speed(0.01));
            ui.end_row();

            ui.label("Max tokens");
            ui.add(egui::DragValue::new(&mut o.max_tokens).speed(8.0));
            ui.end_row();

            ui.label("Frequency penalty");
            ui.add(egui::DragValue::new(&mut o.frequency_penalty).speed(0.05));
            ui.end_row();

            ui.label("Presence penalty");
            ui.add(egui::DragValue::new(&mut o.presence_penalty).speed(0.05));
            ui.end_row();
        });
}

fn email_section(ui: &mut egui::Ui, editor: &mut SettingsEditor) {
    section(ui, "Email");
    let email = &mut editor.draft.email;
    egui::Grid::new("email_settings")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            ui.label("SMTP server");
            ui.text_edit_singleline(&mut email.smtp_server);
            ui.end_row();

            ui.label("Port");
            ui.add(egui::DragValue::new(&mut email.smtp_port));
            ui.end_row();

            ui.label("Sender");
            ui.text_edit_singleline(&mut email.sender_email);
            ui.end_row();

            ui.label("Password");
            ui.add(
                egui::TextEdit::singleline(&mut email.sender_password)
                    .password(true)
                    .hint_text("leave empty to be asked"),
            );
            ui.end_row();

            ui.label("Recipient");
            ui.text_edit_singleline(&mut email.recipient_email);
            ui.end_row();

            ui.label("");
            ui.checkbox(&mut email.use_tls, "Use STARTTLS");
            ui.end_row();
        });
}

pub fn render_settings_window(s: &mut AppState, ctx: &egui::Context) {
    let Some(editor) = s.settings_editor.as_mut() else {
        return;
    };

    let mut open = true;
    let mut action = None;
    let live_problems = editor.draft.validate();

    egui::Window::new("Settings")
        .id(egui::Id::new("settings_window"))
        .collapsible(false)
        .resizable(true)
        .default_width(480.0)
        .open(&mut open)
        .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
        .show(ctx, |ui| {
            ui.set_max_height(640.0);
            egui::ScrollArea::vertical()
                .max_height(540.0)
                .show(ui, |ui| {
                    model_section(ui, editor, &mut action);

                    section(ui, "Escalation");
                    ui.label(
                        egui::RichText::new(
                            "Messages containing these words are sent to IT instead of the AI. One per line.",
                        )
                        .small()
                        .weak(),
                    );
                    ui.label("Always escalate:");
                    keyword_editor(ui, "always_escalate", &mut editor.draft.escalation.always_escalate);
                    ui.label("Needs admin rights:");
                    keyword_editor(
                        ui,
                        "escalation_triggers",
                        &mut editor.draft.escalation.escalation_triggers,
                    );

                    email_section(ui, editor);

                    section(ui, "Export");
                    let mut dir = editor.draft.export_dir.clone().unwrap_or_default();
                    ui.horizontal(|ui| {
                        ui.label("Folder:");
                        if ui
                            .add(
                                egui::TextEdit::singleline(&mut dir)
                                    .hint_text("current directory")
                                    .desired_width(320.0),
                            )
                            .changed()
                        {
                            editor.draft.export_dir =
                                if dir.trim().is_empty() { None } else { Some(dir.clone()) };
                        }
                    });
                });

            ui.add_space(8.0);
            for problem in &live_problems {
                ui.colored_label(egui::Color32::from_rgb(220, 80, 80), problem);
            }

            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(live_problems.is_empty(), egui::Button::new("Save"))
                    .clicked()
                {
                    action = Some(SettingsAction::Save);
                }
                if ui.button("Cancel").clicked() {
                    action = Some(SettingsAction::Cancel);
                }
            });
        });

    if !open || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = Some(SettingsAction::Cancel);
    }

    match action {
        Some(SettingsAction::Save) => {
            s.save_settings_from_editor();
        }
        Some(SettingsAction::Cancel) => s.close_settings(),
        Some(SettingsAction::Refresh) => s.refresh_models(),
        Some(SettingsAction::Preset(preset)) => s.apply_preset(preset),
        None => {}
    }
}
