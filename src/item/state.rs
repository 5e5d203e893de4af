use bitflags::bitflags;

bitflags! {
    /// Transient interaction state of an item.
    ///
    /// Cleared by `Item::reset_state` before each frame and repopulated
    /// from the renderer's response while the item is drawn.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ItemState: u16 {
        const HOVERED                = 1 << 0;
        const ACTIVE                 = 1 << 1;
        const FOCUSED                = 1 << 2;
        const CLICKED                = 1 << 3;
        const VISIBLE                = 1 << 4;
        const EDITED                 = 1 << 5;
        const ACTIVATED              = 1 << 6;
        const DEACTIVATED            = 1 << 7;
        const DEACTIVATED_AFTER_EDIT = 1 << 8;
        const TOGGLED_OPEN           = 1 << 9;
    }
}

impl ItemState {
    pub fn is_hovered(self) -> bool {
        self.contains(ItemState::HOVERED)
    }

    pub fn is_clicked(self) -> bool {
        self.contains(ItemState::CLICKED)
    }

    pub fn is_focused(self) -> bool {
        self.contains(ItemState::FOCUSED)
    }

    pub fn is_edited(self) -> bool {
        self.contains(ItemState::EDITED)
    }
}
