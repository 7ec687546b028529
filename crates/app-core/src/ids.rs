use std::fmt;

/// Which of the two configured TVs the remote is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TvSlot {
    #[default]
    One,
    Two,
}

impl TvSlot {
    pub fn index(self) -> usize {
        match self {
            TvSlot::One => 0,
            TvSlot::Two => 1,
        }
    }

    pub fn other(self) -> Self {
        match self {
            TvSlot::One => TvSlot::Two,
            TvSlot::Two => TvSlot::One,
        }
    }

    /// Text shown on the toggle button.
    pub fn label(self) -> &'static str {
        match self {
            TvSlot::One => "TV: 1",
            TvSlot::Two => "TV: 2",
        }
    }
}

impl fmt::Display for TvSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TV{:02}", self.index() + 1)
    }
}
