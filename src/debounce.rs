//! Per-channel debounce state machine: a burst of raw edges in, one
//! press/release report pair out.

use core::ops::Add;

/// Which half of the report pair a fired transition wants sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Press,
    Release,
}

/// What to do with edges that arrive while a pair is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateEdgePolicy {
    /// Drop them; no re-arm until the channel is idle again.
    Ignore,
    /// Latch at most one and start a fresh cycle once the pair closes.
    QueueOne,
}

impl Default for LateEdgePolicy {
    fn default() -> Self {
        Self::Ignore
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig<D> {
    /// Quiet time a channel must see after its last edge before the
    /// press is considered stable.
    pub debounce_window: D,
    /// Time the key is reported held before the release goes out.
    pub hold_interval: D,
    pub late_edges: LateEdgePolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase<I> {
    Idle,
    Pending { deadline: I },
    Transmitting { release_at: I },
    Releasing,
}

#[derive(Debug, Clone, Copy)]
pub struct DebounceState<I> {
    phase: Phase<I>,
    repress: bool,
}

impl<I: Copy + PartialOrd> DebounceState<I> {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            repress: false,
        }
    }

    pub fn phase(&self) -> Phase<I> {
        self.phase
    }

    /// Whether a press/release pair is currently open.
    pub fn in_flight(&self) -> bool {
        matches!(self.phase, Phase::Transmitting { .. } | Phase::Releasing)
    }

    /// Deadline of the next timed transition, if one is armed.
    pub fn deadline(&self) -> Option<I> {
        match self.phase {
            Phase::Pending { deadline } => Some(deadline),
            Phase::Transmitting { release_at } => Some(release_at),
            Phase::Idle | Phase::Releasing => None,
        }
    }

    /// Record a raw edge at `now`. Re-arming replaces the previous
    /// deadline; bounce restarts the window rather than accumulating.
    pub fn edge<D: Copy>(&mut self, now: I, config: &DebounceConfig<D>)
    where
        I: Add<D, Output = I>,
    {
        match self.phase {
            Phase::Idle | Phase::Pending { .. } => {
                self.phase = Phase::Pending {
                    deadline: now + config.debounce_window,
                };
            }
            Phase::Transmitting { .. } | Phase::Releasing => {
                if let LateEdgePolicy::QueueOne = config.late_edges {
                    self.repress = true;
                }
            }
        }
    }

    /// Take the timed transition due at `now`, if any. The caller must
    /// attempt the returned send and close it with [`Self::press_dropped`]
    /// or [`Self::release_done`].
    pub fn fire<D: Copy>(&mut self, now: I, config: &DebounceConfig<D>) -> Option<ReportKind>
    where
        I: Add<D, Output = I>,
    {
        match self.phase {
            Phase::Pending { deadline } if deadline <= now => {
                self.phase = Phase::Transmitting {
                    release_at: now + config.hold_interval,
                };
                Some(ReportKind::Press)
            }
            Phase::Transmitting { release_at } if release_at <= now => {
                self.phase = Phase::Releasing;
                Some(ReportKind::Release)
            }
            _ => None,
        }
    }

    /// The press never made it out; the cycle is abandoned.
    pub fn press_dropped(&mut self) {
        self.phase = Phase::Idle;
        self.repress = false;
    }

    /// The release attempt finished; either way the pair is closed.
    pub fn release_done<D: Copy>(&mut self, now: I, config: &DebounceConfig<D>)
    where
        I: Add<D, Output = I>,
    {
        if core::mem::take(&mut self.repress) {
            self.phase = Phase::Pending {
                deadline: now + config.debounce_window,
            };
        } else {
            self.phase = Phase::Idle;
        }
    }
}

impl<I: Copy + PartialOrd> Default for DebounceState<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    const CONFIG: DebounceConfig<u64> = DebounceConfig {
        debounce_window: 25,
        hold_interval: 100,
        late_edges: LateEdgePolicy::Ignore,
    };

    const QUEUED: DebounceConfig<u64> = DebounceConfig {
        debounce_window: 25,
        hold_interval: 100,
        late_edges: LateEdgePolicy::QueueOne,
    };

    #[test]
    fn edge_arms_window() {
        let mut state: DebounceState<u64> = DebounceState::new();
        state.edge(0, &CONFIG);
        assert_eq!(state.phase(), Phase::Pending { deadline: 25 });
        assert_eq!(state.deadline(), Some(25));

        assert_eq!(state.fire(24, &CONFIG), None);
        assert_eq!(state.fire(25, &CONFIG), Some(ReportKind::Press));
        assert_eq!(state.phase(), Phase::Transmitting { release_at: 125 });
    }

    #[test]
    fn bounce_restarts_window() {
        let mut state: DebounceState<u64> = DebounceState::new();
        state.edge(0, &CONFIG);
        state.edge(10, &CONFIG);
        state.edge(20, &CONFIG);
        assert_eq!(state.deadline(), Some(45));

        assert_eq!(state.fire(44, &CONFIG), None);
        assert_eq!(state.fire(45, &CONFIG), Some(ReportKind::Press));
        assert_eq!(state.fire(46, &CONFIG), None);
    }

    #[test]
    fn hold_then_release() {
        let mut state: DebounceState<u64> = DebounceState::new();
        state.edge(0, &CONFIG);
        assert_eq!(state.fire(25, &CONFIG), Some(ReportKind::Press));
        assert!(state.in_flight());

        assert_eq!(state.fire(124, &CONFIG), None);
        assert_eq!(state.fire(125, &CONFIG), Some(ReportKind::Release));
        assert_eq!(state.phase(), Phase::Releasing);

        state.release_done(125, &CONFIG);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn press_dropped_abandons_cycle() {
        let mut state: DebounceState<u64> = DebounceState::new();
        state.edge(0, &CONFIG);
        assert_eq!(state.fire(25, &CONFIG), Some(ReportKind::Press));

        state.press_dropped();
        assert_eq!(state.phase(), Phase::Idle);
        assert_eq!(state.fire(200, &CONFIG), None);
    }

    #[test]
    fn late_edge_ignored() {
        let mut state: DebounceState<u64> = DebounceState::new();
        state.edge(0, &CONFIG);
        assert_eq!(state.fire(25, &CONFIG), Some(ReportKind::Press));

        state.edge(50, &CONFIG);
        assert_eq!(state.phase(), Phase::Transmitting { release_at: 125 });

        assert_eq!(state.fire(125, &CONFIG), Some(ReportKind::Release));
        state.release_done(125, &CONFIG);
        assert_eq!(state.phase(), Phase::Idle);
    }

    #[test]
    fn late_edge_queued_starts_new_cycle() {
        let mut state: DebounceState<u64> = DebounceState::new();
        state.edge(0, &QUEUED);
        assert_eq!(state.fire(25, &QUEUED), Some(ReportKind::Press));

        state.edge(50, &QUEUED);
        state.edge(60, &QUEUED);

        assert_eq!(state.fire(125, &QUEUED), Some(ReportKind::Release));
        state.release_done(125, &QUEUED);
        assert_eq!(state.phase(), Phase::Pending { deadline: 150 });

        assert_eq!(state.fire(150, &QUEUED), Some(ReportKind::Press));
    }
}
