//! Dashboard sidebar state.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sidebar {
    open: bool,
}

impl Sidebar {
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The backdrop is shown exactly while the sidebar is open.
    pub fn backdrop_active(&self) -> bool {
        self.open
    }

    /// Page scrolling is locked while the sidebar covers it.
    pub fn scroll_locked(&self) -> bool {
        self.open
    }

    /// Menu button.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Backdrop click or explicit close button.
    pub fn close(&mut self) {
        self.open = false;
    }
}
