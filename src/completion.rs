//! Tab-completion cycling
//!
//! Candidates come from a caller-supplied callback invoked with the current
//! line. Tab steps through the list plus one extra "nothing selected" slot;
//! Escape cancels and restores the original line; any other key accepts the
//! selected candidate and falls through to normal dispatch.
//!
//! This module holds only the cycling state machine. The session owns the
//! callback, the buffer swap, and the redraws.

/// Candidate source: current line text in, candidate list out.
pub type CompletionCallback = Box<dyn FnMut(&str) -> Vec<String>>;

/// What the session should do after a key was routed through the cycler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Key consumed; display the candidate at this index.
    ShowCandidate(usize),
    /// Key consumed; all candidates stepped past, beep and show the
    /// original line.
    ShowOriginal { beep: bool },
    /// Escape: cycling over, restore the original display.
    Cancelled { redisplay: bool },
    /// A candidate was selected when another key arrived: replace the
    /// buffer with it and re-dispatch the key.
    Accept { candidate: usize },
    /// No candidate was selected: just re-dispatch the key.
    Passthrough,
}

const TAB: u8 = 9;
const ESC: u8 = 27;

/// Tab-cycling state, transient within one edit turn.
#[derive(Debug, Default)]
pub struct CompletionCycle {
    active: bool,
    index: usize,
}

impl CompletionCycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Candidate currently selected for display, if any.
    pub fn selected(&self, count: usize) -> Option<usize> {
        (self.active && self.index < count).then_some(self.index)
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.index = 0;
    }

    /// Route one key through the cycler. `count` is the candidate count for
    /// the current line; the caller has already handled the empty list.
    pub fn handle_key(&mut self, key: u8, count: usize) -> CycleOutcome {
        match key {
            TAB => {
                if !self.active {
                    self.active = true;
                    self.index = 0;
                } else {
                    // One extra slot stands for "no candidate selected"
                    self.index = (self.index + 1) % (count + 1);
                }
                if self.index == count {
                    CycleOutcome::ShowOriginal { beep: true }
                } else {
                    CycleOutcome::ShowCandidate(self.index)
                }
            }
            ESC => {
                let redisplay = self.index < count;
                self.reset();
                CycleOutcome::Cancelled { redisplay }
            }
            _ => {
                let selected = self.selected(count);
                self.reset();
                match selected {
                    Some(candidate) => CycleOutcome::Accept { candidate },
                    None => CycleOutcome::Passthrough,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_cycles_through_candidates_and_empty_slot() {
        let mut c = CompletionCycle::new();
        assert_eq!(c.handle_key(TAB, 2), CycleOutcome::ShowCandidate(0));
        assert_eq!(c.handle_key(TAB, 2), CycleOutcome::ShowCandidate(1));
        assert_eq!(c.handle_key(TAB, 2), CycleOutcome::ShowOriginal { beep: true });
        // Wraps back to the first candidate
        assert_eq!(c.handle_key(TAB, 2), CycleOutcome::ShowCandidate(0));
    }

    #[test]
    fn escape_cancels_and_redisplays_original() {
        let mut c = CompletionCycle::new();
        c.handle_key(TAB, 2);
        assert_eq!(c.handle_key(ESC, 2), CycleOutcome::Cancelled { redisplay: true });
        assert!(!c.is_active());
    }

    #[test]
    fn escape_on_empty_slot_skips_redisplay() {
        let mut c = CompletionCycle::new();
        c.handle_key(TAB, 1);
        c.handle_key(TAB, 1); // now on the empty slot
        assert_eq!(c.handle_key(ESC, 1), CycleOutcome::Cancelled { redisplay: false });
    }

    #[test]
    fn other_key_accepts_selected_candidate() {
        let mut c = CompletionCycle::new();
        c.handle_key(TAB, 3);
        c.handle_key(TAB, 3);
        assert_eq!(c.handle_key(b'x', 3), CycleOutcome::Accept { candidate: 1 });
        assert!(!c.is_active());
    }

    #[test]
    fn other_key_on_empty_slot_passes_through() {
        let mut c = CompletionCycle::new();
        c.handle_key(TAB, 1);
        c.handle_key(TAB, 1);
        assert_eq!(c.handle_key(b'x', 1), CycleOutcome::Passthrough);
    }
}
