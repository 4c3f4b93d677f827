//! Hover and selection indices

/// Hovered and selected catalog indices. Either may be unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub hovered: Option<usize>,
    pub selected: Option<usize>,
}

impl SelectionState {
    pub fn is_highlighted(&self, index: usize) -> bool {
        self.hovered == Some(index) || self.selected == Some(index)
    }
}
