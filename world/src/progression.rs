//! Experience and level bookkeeping for the player.

/// Player level, accumulated experience, and the threshold table.
#[derive(Clone, Debug)]
pub(crate) struct ProgressionLedger {
    level: u32,
    experience: u32,
    thresholds: Vec<u32>,
}

impl ProgressionLedger {
    pub(crate) fn new(thresholds: Vec<u32>) -> Self {
        Self {
            level: 0,
            experience: 0,
            thresholds,
        }
    }

    pub(crate) fn level(&self) -> u32 {
        self.level
    }

    pub(crate) fn experience(&self) -> u32 {
        self.experience
    }

    /// Experience needed to complete the current level.
    ///
    /// Levels past the end of the table reuse its last entry. An empty table
    /// never levels up.
    pub(crate) fn threshold(&self) -> u32 {
        let index = usize::try_from(self.level).unwrap_or(usize::MAX);
        self.thresholds
            .get(index)
            .or_else(|| self.thresholds.last())
            .copied()
            .unwrap_or(u32::MAX)
    }

    /// Adds experience without checking the threshold.
    pub(crate) fn credit(&mut self, amount: u32) {
        self.experience = self.experience.saturating_add(amount);
    }

    /// Performs at most one level-up step.
    ///
    /// Returns the new level when the threshold was crossed. Surplus
    /// experience carries over and is only checked again on the next grant.
    pub(crate) fn level_up_once(&mut self) -> Option<u32> {
        if self.thresholds.is_empty() {
            return None;
        }

        let threshold = self.threshold();
        if self.experience < threshold {
            return None;
        }

        self.experience -= threshold;
        self.level = self.level.saturating_add(1);
        Some(self.level)
    }
}
