//! Password prompt for the SMTP sender account.
//!
//! Used when a ticket is emailed and no password is stored in settings:
//! - Masked input
//! - The typed password lives in `Zeroizing` buffers only
//! - Enter submits, Escape cancels

use super::{paint_overlay, Modal, ModalResult};
use egui::{Align2, Context, Id, Key, RichText, TextEdit, Vec2};
use zeroize::Zeroizing;

pub struct PasswordDialog {
    is_open: bool,
    /// The password being entered (securely zeroed on drop)
    password: Zeroizing<String>,
    result: ModalResult<Zeroizing<String>>,
    message: String,
    id: Id,
}

impl PasswordDialog {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            is_open: false,
            password: Zeroizing::new(String::new()),
            result: ModalResult::Pending,
            message: String::new(),
            id: Id::new(id),
        }
    }

    pub fn open_with_message(&mut self, message: impl Into<String>) {
        self.is_open = true;
        self.message = message.into();
        self.password = Zeroizing::new(String::new());
        self.result = ModalResult::Pending;
    }

    /// Take the result, leaving `Pending` behind.
    pub fn take_result(&mut self) -> ModalResult<Zeroizing<String>> {
        std::mem::replace(&mut self.result, ModalResult::Pending)
    }

    fn submit(&mut self) {
        let password = std::mem::replace(&mut self.password, Zeroizing::new(String::new()));
        self.result = ModalResult::Confirmed(password);
    }
}

impl Modal for PasswordDialog {
    fn update(&mut self, ctx: &Context) -> bool {
        if !self.is_open {
            return false;
        }

        let mut should_close = false;
        paint_overlay(ctx, self.id);

        egui::Window::new("🔐 Email Password")
            .id(self.id.with("window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(350.0);
                ui.add_space(8.0);

                if !self.message.is_empty() {
                    ui.label(&self.message);
                    ui.add_space(8.0);
                }

                ui.horizontal(|ui| {
                    ui.label("Password:");
                    let response = ui.add(
                        TextEdit::singleline(&mut *self.password)
                            .password(true)
                            .desired_width(200.0)
                            .hint_text("App password..."),
                    );
                    response.request_focus();

                    if response.lost_focus()
                        && ui.input(|i| i.key_pressed(Key::Enter))
                        && !self.password.is_empty()
                    {
                        self.submit();
                        should_close = true;
                    }
                });

                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    if ui.button("Cancel").clicked() {
                        self.result = ModalResult::Cancelled;
                        should_close = true;
                    }

                    ui.add_space(8.0);

                    let submit_enabled = !self.password.is_empty();
                    if ui
                        .add_enabled(submit_enabled, egui::Button::new("Send"))
                        .clicked()
                    {
                        self.submit();
                        should_close = true;
                    }
                });

                ui.add_space(8.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    ui.label(RichText::new("🔒 Used for this email only").small().weak());
                });
            });

        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            self.result = ModalResult::Cancelled;
            should_close = true;
        }

        if should_close {
            self.is_open = false;
            self.password = Zeroizing::new(String::new());
        }

        should_close
    }

    fn is_open(&self) -> bool {
        self.is_open
    }

    fn close(&mut self) {
        self.is_open = false;
        self.password = Zeroizing::new(String::new());
        self.result = ModalResult::Cancelled;
    }
}
