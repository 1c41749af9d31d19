//! Short rolling memory of previous turns.

/// Number of past turns remembered.
pub const MEMORY_DEPTH: usize = 2;

/// Health values recorded at the end of recent turns.
///
/// Slot 0 holds the most recent value. Used to notice "lost health since
/// last turn" without reading the host's message log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HealthMemory {
    slots: [Option<u32>; MEMORY_DEPTH],
}

impl HealthMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shifts every slot back by one and stores `hp` as the newest value.
    pub fn record(&mut self, hp: u32) {
        self.slots.rotate_right(1);
        self.slots[0] = Some(hp);
    }

    /// Health at the end of the previous recorded turn.
    pub fn previous(&self) -> Option<u32> {
        self.slots[0]
    }

    /// Value recorded `turns_ago + 1` turns back.
    pub fn get(&self, turns_ago: usize) -> Option<u32> {
        self.slots.get(turns_ago).copied().flatten()
    }

    /// True when `current` is below the last recorded value.
    pub fn dropped(&self, current: u32) -> bool {
        self.previous().is_some_and(|previous| current < previous)
    }
}
