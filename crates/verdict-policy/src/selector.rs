//! Alternative-specialist selection.
//!
//! Rerouting a retry to "some other specialist" is a deployment concern, so
//! it sits behind a trait. The default walks a fixed roster.

/// Picks a specialist other than the one that just failed.
pub trait SpecialistSelector: Send + Sync {
    /// A specialist different from `current`, or `None` when there is none
    /// to reroute to.
    fn alternative(&self, current: &str) -> Option<String>;
}

/// Rotates through an ordered roster.
///
/// Starts after the position of `current` (or at the front when `current`
/// is not on the roster), wraps at the end, and skips every entry equal to
/// `current`. A roster with no other entry yields `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotatingSelector {
    roster: Vec<String>,
}

impl RotatingSelector {
    pub fn new(roster: Vec<String>) -> Self {
        Self { roster }
    }

    pub fn roster(&self) -> &[String] {
        &self.roster
    }
}

impl SpecialistSelector for RotatingSelector {
    fn alternative(&self, current: &str) -> Option<String> {
        let start = self
            .roster
            .iter()
            .position(|s| s == current)
            .map_or(0, |pos| pos + 1);
        self.roster
            .iter()
            .cycle()
            .skip(start)
            .take(self.roster.len())
            .find(|s| s.as_str() != current)
            .cloned()
    }
}
