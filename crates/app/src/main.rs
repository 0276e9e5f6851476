use eframe::egui;
use parking_lot::Mutex;
use shared::{Message, Sender};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod modals;
mod settings_window;
mod state;
mod tasks;
mod ticket_window;

// Types module - core type definitions
mod types;
pub use types::*;

// Utils module - helper functions
mod utils;

use modals::Modal;

const WINDOW_TITLE: &str = "AskForHelp - IT Support Assistant";

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = utils::config_path();
    let settings = utils::load_settings_or_default(config_path.as_deref());
    let metadata = services::system_info::collect();

    let mut state = AppState::new(settings, metadata);
    state.config_path = config_path;
    tracing::info!(model = %state.settings.model.name, "starting AskForHelp");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([900.0, 700.0])
            .with_min_inner_size([640.0, 480.0]),
        vsync: true,
        ..Default::default()
    };
    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |_cc| {
            Box::new(AskForHelpApp {
                state: Arc::new(Mutex::new(state)),
            })
        }),
    )
}

struct AskForHelpApp {
    state: Arc<Mutex<AppState>>,
}

/// Main-window buttons, applied after the panels are drawn
#[derive(Clone, Copy, PartialEq, Eq)]
enum MainAction {
    Send,
    GenerateTicket,
    CaptureScreenshot,
    Clear,
    ExportReport,
    Settings,
}

impl eframe::App for AskForHelpApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut guard = self.state.lock();
        let s: &mut AppState = &mut guard;

        // Poll background jobs (non-blocking)
        s.poll_tasks();
        if s.has_pending_tasks() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        let mut style = (*ctx.style()).clone();
        style.visuals.window_rounding = egui::Rounding::same(10.0);
        style.spacing.item_spacing = egui::vec2(8.0, 8.0);
        ctx.set_style(style);

        let mut action = None;

        egui::TopBottomPanel::top("header")
            .frame(egui::Frame::none().fill(egui::Color32::from_rgb(44, 62, 80)))
            .show(ctx, |ui| {
                ui.add_space(10.0);
                ui.vertical_centered(|ui| {
                    ui.heading(
                        egui::RichText::new(WINDOW_TITLE)
                            .size(22.0)
                            .strong()
                            .color(egui::Color32::WHITE),
                    );
                    ui.label(
                        egui::RichText::new("Local AI Chatbot for PC Hardware & Software Support")
                            .size(12.0)
                            .color(egui::Color32::from_rgb(236, 240, 241)),
                    );
                    ui.label(
                        egui::RichText::new(s.metadata.summary_line())
                            .size(11.0)
                            .color(egui::Color32::from_rgb(190, 195, 200)),
                    );
                });
                ui.add_space(10.0);
            });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if s.has_pending_tasks() {
                    ui.spinner();
                }
                ui.label(egui::RichText::new(&s.status).size(12.0));
            });
        });

        egui::TopBottomPanel::bottom("input_area").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let thinking = s.is_thinking();
                let response = ui.add_enabled(
                    !thinking,
                    egui::TextEdit::singleline(&mut s.input_text)
                        .hint_text("Type your issues here...")
                        .desired_width(ui.available_width() - 90.0),
                );
                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                    action = Some(MainAction::Send);
                    response.request_focus();
                }
                if ui
                    .add_enabled(!thinking, egui::Button::new("Submit").min_size(egui::vec2(80.0, 0.0)))
                    .clicked()
                {
                    action = Some(MainAction::Send);
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Generate IT Ticket").clicked() {
                    action = Some(MainAction::GenerateTicket);
                }
                if ui
                    .add_enabled(
                        s.screenshot_task.is_none(),
                        egui::Button::new("Capture Screenshot"),
                    )
                    .clicked()
                {
                    action = Some(MainAction::CaptureScreenshot);
                }
                if ui.button("Clear Chat").clicked() {
                    action = Some(MainAction::Clear);
                }
                if ui.button("Export Report").clicked() {
                    action = Some(MainAction::ExportReport);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        action = Some(MainAction::Settings);
                    }
                });
            });
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let scroll_to_bottom = std::mem::take(&mut s.scroll_to_bottom);
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    for msg in s.transcript.iter() {
                        ui.add_space(4.0);
                        render_message(ui, msg);
                        ui.add_space(4.0);
                    }

                    if s.is_thinking() {
                        render_thinking(ui);
                        ctx.request_repaint();
                    }

                    if scroll_to_bottom {
                        ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                    }
                });
        });

        match action {
            Some(MainAction::Send) => s.send_message(),
            Some(MainAction::GenerateTicket) => s.generate_ticket(),
            Some(MainAction::CaptureScreenshot) => s.capture_screenshot(),
            Some(MainAction::Clear) => s.request_clear(),
            Some(MainAction::ExportReport) => s.export_report(),
            Some(MainAction::Settings) => s.open_settings(),
            None => {}
        }

        ticket_window::render_ticket_window(s, ctx);
        settings_window::render_settings_window(s, ctx);
        render_notice(s, ctx);

        if s.confirm.update(ctx) {
            let result = s.confirm.take_result();
            s.handle_confirm_result(result);
        }
        if s.password_dialog.update(ctx) {
            let result = s.password_dialog.take_result();
            s.handle_password_result(result);
        }
    }
}

/// Render one transcript entry
fn render_message(ui: &mut egui::Ui, msg: &Message) {
    let header = format!("[{}] {}:", msg.timestamp_label(), msg.sender.display_name());

    match msg.sender {
        Sender::User => {
            // User message - right aligned
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                ui.add_space(8.0);
                egui::Frame::none()
                    .fill(egui::Color32::from_rgb(70, 130, 180))
                    .rounding(egui::Rounding::same(12.0))
                    .inner_margin(egui::Margin::same(10.0))
                    .show(ui, |ui| {
                        ui.set_max_width(520.0);
                        ui.label(
                            egui::RichText::new(header)
                                .size(11.0)
                                .color(egui::Color32::from_rgb(220, 230, 245)),
                        );
                        ui.label(
                            egui::RichText::new(&msg.text)
                                .color(egui::Color32::WHITE)
                                .size(15.0),
                        );
                    });
            });
        }
        Sender::Assistant => {
            egui::Frame::none()
                .fill(egui::Color32::from_rgb(235, 245, 238))
                .rounding(egui::Rounding::same(12.0))
                .inner_margin(egui::Margin::same(10.0))
                .show(ui, |ui| {
                    ui.set_max_width(620.0);
                    ui.label(
                        egui::RichText::new(header)
                            .size(11.0)
                            .strong()
                            .color(egui::Color32::from_rgb(39, 174, 96)),
                    );
                    ui.label(
                        egui::RichText::new(&msg.text)
                            .color(egui::Color32::from_rgb(40, 40, 50))
                            .size(15.0),
                    );
                    ui.horizontal(|ui| {
                        if ui
                            .small_button("Copy")
                            .on_hover_text("Copy to clipboard")
                            .clicked()
                        {
                            ui.output_mut(|o| o.copied_text = msg.text.clone());
                        }
                    });
                });
        }
        Sender::System => {
            egui::Frame::none()
                .fill(egui::Color32::from_rgb(236, 240, 241))
                .rounding(egui::Rounding::same(8.0))
                .inner_margin(egui::Margin::same(10.0))
                .show(ui, |ui| {
                    ui.set_max_width(680.0);
                    ui.label(
                        egui::RichText::new(header)
                            .size(11.0)
                            .strong()
                            .color(egui::Color32::from_rgb(44, 62, 80)),
                    );
                    ui.label(
                        egui::RichText::new(msg.text.trim())
                            .size(13.0)
                            .color(egui::Color32::from_rgb(44, 62, 80)),
                    );
                });
        }
    }
}

fn render_thinking(ui: &mut egui::Ui) {
    ui.add_space(4.0);
    egui::Frame::none()
        .fill(egui::Color32::from_rgb(230, 230, 235))
        .rounding(egui::Rounding::same(12.0))
        .inner_margin(egui::Margin::same(10.0))
        .show(ui, |ui| {
            // Animated dots
            let time = ui.input(|i| i.time);
            let dots = match ((time * 2.0) as i32) % 4 {
                0 => "   ",
                1 => ".  ",
                2 => ".. ",
                _ => "...",
            };
            ui.label(
                egui::RichText::new(format!("Thinking{}", dots))
                    .color(egui::Color32::from_rgb(60, 60, 70))
                    .italics(),
            );
        });
}

/// Message box for results and errors; blocks the window until OK.
fn render_notice(s: &mut AppState, ctx: &egui::Context) {
    let Some(notice) = &s.notice else {
        return;
    };

    let id = egui::Id::new("notice");
    modals::paint_overlay(ctx, id);

    let mut dismiss = false;
    egui::Window::new(notice.title.as_str())
        .id(id.with("window"))
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.set_min_width(320.0);
            ui.add_space(6.0);
            if notice.is_error {
                ui.colored_label(egui::Color32::from_rgb(200, 60, 60), &notice.body);
            } else {
                ui.label(&notice.body);
            }
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    dismiss = true;
                }
                if let Some(path) = &notice.path {
                    if ui.button("Open Folder").clicked() {
                        let folder = path.parent().unwrap_or(path.as_path());
                        if let Err(e) = open::that(folder) {
                            tracing::warn!(error = %e, folder = %folder.display(), "could not open folder");
                        }
                    }
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape)) {
        dismiss = true;
    }
    if dismiss {
        s.notice = None;
    }
}
