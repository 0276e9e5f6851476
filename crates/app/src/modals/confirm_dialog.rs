//! Yes/No confirmation carrying the action it confirms.

use super::{paint_overlay, Modal, ModalResult};
use egui::{Align2, Context, Id, Key, Vec2};

pub struct ConfirmDialog<A> {
    title: String,
    message: String,
    action: Option<A>,
    result: ModalResult<A>,
    id: Id,
}

impl<A> ConfirmDialog<A> {
    pub fn new(id: impl std::hash::Hash) -> Self {
        Self {
            title: String::new(),
            message: String::new(),
            action: None,
            result: ModalResult::Pending,
            id: Id::new(id),
        }
    }

    /// Ask about `action`. Replaces any question still on screen.
    pub fn ask(&mut self, title: impl Into<String>, message: impl Into<String>, action: A) {
        self.title = title.into();
        self.message = message.into();
        self.action = Some(action);
        self.result = ModalResult::Pending;
    }

    pub fn take_result(&mut self) -> ModalResult<A> {
        std::mem::replace(&mut self.result, ModalResult::Pending)
    }

    fn answer(&mut self, yes: bool) {
        self.result = match (yes, self.action.take()) {
            (true, Some(action)) => ModalResult::Confirmed(action),
            _ => ModalResult::Cancelled,
        };
    }
}

impl<A> Modal for ConfirmDialog<A> {
    fn update(&mut self, ctx: &Context) -> bool {
        if self.action.is_none() {
            return false;
        }

        let mut answer = None;
        paint_overlay(ctx, self.id);

        egui::Window::new(self.title.as_str())
            .id(self.id.with("window"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
            .show(ctx, |ui| {
                ui.set_min_width(320.0);
                ui.add_space(8.0);
                ui.label(&self.message);
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("Yes").clicked() {
                        answer = Some(true);
                    }
                    if ui.button("No").clicked() {
                        answer = Some(false);
                    }
                });
            });

        if ctx.input(|i| i.key_pressed(Key::Escape)) {
            answer = Some(false);
        }

        match answer {
            Some(yes) => {
                self.answer(yes);
                true
            }
            None => false,
        }
    }

    fn is_open(&self) -> bool {
        self.action.is_some()
    }

    fn close(&mut self) {
        self.answer(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Action {
        Clear,
    }

    #[test]
    fn test_yes_returns_the_action() {
        let mut dialog = ConfirmDialog::new("confirm");
        assert!(!dialog.is_open());

        dialog.ask("Confirm", "Clear all chat history?", Action::Clear);
        assert!(dialog.is_open());

        dialog.answer(true);
        assert!(!dialog.is_open());
        assert_eq!(dialog.take_result(), ModalResult::Confirmed(Action::Clear));
    }

    #[test]
    fn test_close_cancels() {
        let mut dialog = ConfirmDialog::new("confirm");
        dialog.ask("Confirm", "Clear all chat history?", Action::Clear);
        dialog.close();
        assert_eq!(dialog.take_result(), ModalResult::Cancelled);
        assert_eq!(dialog.take_result(), ModalResult::Pending);
    }
}
