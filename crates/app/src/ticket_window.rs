//! The "Generate IT Support Ticket" window.

use crate::types::AppState;
use eframe::egui;

#[derive(Clone, Copy, PartialEq, Eq)]
enum TicketAction {
    Copy,
    Save,
    Email,
    Close,
}

pub fn render_ticket_window(s: &mut AppState, ctx: &egui::Context) {
    let Some(draft) = &s.ticket else {
        return;
    };
    let body = draft.body.clone();
    let sending = s.email_task.is_some();

    let mut open = true;
    let mut action = None;

    egui::Window::new("Generate IT Support Ticket")
        .id(egui::Id::new("ticket_window"))
        .collapsible(false)
        .resizable(true)
        .default_size([700.0, 650.0])
        .open(&mut open)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .max_height((ui.available_height() - 44.0).max(120.0))
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    // Read-only view; `&str` is an immutable text buffer.
                    ui.add(
                        egui::TextEdit::multiline(&mut body.as_str())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY),
                    );
                });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Copy to Clipboard").clicked() {
                    action = Some(TicketAction::Copy);
                }
                if ui.button("Save to File").clicked() {
                    action = Some(TicketAction::Save);
                }
                let email_label = if sending { "Sending..." } else { "Send Email" };
                if ui
                    .add_enabled(!sending, egui::Button::new(email_label))
                    .clicked()
                {
                    action = Some(TicketAction::Email);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        action = Some(TicketAction::Close);
                    }
                });
            });
        });

    if !open {
        action = Some(TicketAction::Close);
    }

    match action {
        Some(TicketAction::Copy) => s.copy_ticket(),
        Some(TicketAction::Save) => s.save_ticket(),
        Some(TicketAction::Email) => s.request_send_email(),
        Some(TicketAction::Close) => s.close_ticket(),
        None => {}
    }
}
