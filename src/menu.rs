/// Contextual action menu state: at most one active item, opened by a
/// long-press (or direct command), closed by any dismissal.
///
/// Delete is a two-step interaction: `request_delete` arms a confirmation for
/// the active item and nothing is removed until `confirm_delete`. The event
/// loop never blocks on a modal prompt.
#[derive(Debug, Default)]
pub struct ContextMenu {
    active: Option<String>,
    confirm_pending: bool,
}

impl ContextMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, task_id: &str) {
        self.active = Some(task_id.to_string());
        self.confirm_pending = false;
    }

    pub fn close(&mut self) {
        self.active = None;
        self.confirm_pending = false;
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_confirm_pending(&self) -> bool {
        self.confirm_pending
    }

    /// Arms the confirmation step for the active item and returns its id, or
    /// `None` when no item is active.
    pub fn request_delete(&mut self) -> Option<&str> {
        if self.active.is_some() {
            self.confirm_pending = true;
        }
        self.active.as_deref()
    }

    /// Resolves an armed confirmation: returns the id to delete and closes
    /// the menu. Without a prior `request_delete` this is a no-op.
    pub fn confirm_delete(&mut self) -> Option<String> {
        if !self.confirm_pending {
            return None;
        }
        self.confirm_pending = false;
        self.active.take()
    }

    /// Declines an armed confirmation; the menu stays open on the same item.
    pub fn cancel_delete(&mut self) {
        self.confirm_pending = false;
    }
}
