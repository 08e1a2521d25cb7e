//! Serializes every channel's timer transitions and sends onto one
//! worker context.
//!
//! All methods here must be called from a single execution context; that
//! is what keeps at most one report pair open at a time without a lock.
//! The interrupt side only ever touches an [`crate::edge::EdgeSet`].

use core::ops::Add;

use heapless::Vec;

use crate::channel::{ChannelId, Registry};
use crate::debounce::{DebounceConfig, DebounceState, ReportKind};
use crate::report;
use crate::transport::{LinkStatus, Transport, TransportError};

/// Whether to keep handing reports to the transport while the link is
/// down. `SendAlways` leaves the decision to the transport itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkPolicy {
    SuppressOffline,
    SendAlways,
}

/// Observer for events the core cannot handle locally: dropped reports
/// and link transitions.
pub trait EventSink {
    fn report_dropped(&mut self, id: ChannelId, kind: ReportKind, error: TransportError);
    fn link_changed(&mut self, link: LinkStatus);
}

/// No-op sink for wiring that does not observe.
impl EventSink for () {
    fn report_dropped(&mut self, _id: ChannelId, _kind: ReportKind, _error: TransportError) {}
    fn link_changed(&mut self, _link: LinkStatus) {}
}

pub struct Dispatcher<I, D, const N: usize> {
    registry: Registry<N>,
    states: Vec<DebounceState<I>, N>,
    config: DebounceConfig<D>,
    link_policy: LinkPolicy,
    link: LinkStatus,
}

impl<I, D, const N: usize> Dispatcher<I, D, N>
where
    I: Copy + PartialOrd + Add<D, Output = I>,
    D: Copy,
{
    pub fn new(registry: Registry<N>, config: DebounceConfig<D>, link_policy: LinkPolicy) -> Self {
        let mut states = Vec::new();
        for _ in 0..registry.len() {
            states.push(DebounceState::new()).ok();
        }
        Self {
            registry,
            states,
            config,
            link_policy,
            link: LinkStatus::Disconnected,
        }
    }

    pub fn registry(&self) -> &Registry<N> {
        &self.registry
    }

    pub fn link(&self) -> LinkStatus {
        self.link
    }

    /// Record an edge drained from the interrupt latch. Returns false
    /// for ids outside the registry.
    pub fn notify_edge(&mut self, id: ChannelId, now: I) -> bool {
        match self.states.get_mut(id as usize) {
            Some(state) => {
                state.edge(now, &self.config);
                true
            }
            None => false,
        }
    }

    /// Earliest armed deadline across all channels, for wakeup
    /// scheduling.
    pub fn next_deadline(&self) -> Option<I> {
        self.states
            .iter()
            .filter_map(DebounceState::deadline)
            .reduce(|a, b| if b < a { b } else { a })
    }

    /// New link state from the sink's driver; notifies the sink's
    /// observer once per change.
    pub fn link_changed<E: EventSink>(&mut self, link: LinkStatus, events: &mut E) {
        if self.link != link {
            self.link = link;
            events.link_changed(link);
        }
    }

    /// Fire every due transition and perform the resulting sends. A new
    /// pair is only opened while no other channel has one in flight, so
    /// press/release pairs never interleave. Channels deferred by an
    /// open pair keep their expired deadline and fire on a later call;
    /// the wait is bounded by one pair per channel ahead of them.
    pub fn run<T, E>(&mut self, now: I, transport: &mut T, events: &mut E)
    where
        T: Transport,
        E: EventSink,
    {
        let mut open = self.states.iter().position(DebounceState::in_flight);

        for index in 0..self.states.len() {
            match open {
                Some(i) if i != index => continue,
                _ => {}
            }

            let kind = match self.states[index].fire(now, &self.config) {
                Some(kind) => kind,
                None => continue,
            };

            let channel = self.registry.channels()[index];
            let pressed = kind == ReportKind::Press;
            let outcome = if self.link_policy == LinkPolicy::SuppressOffline
                && self.link != LinkStatus::Connected
            {
                Err(TransportError::Unavailable)
            } else {
                transport.send(&report::encode(&channel, pressed))
            };

            match outcome {
                Ok(()) => {
                    if kind == ReportKind::Release {
                        self.states[index].release_done(now, &self.config);
                    }
                }
                Err(error) => {
                    match kind {
                        ReportKind::Press => self.states[index].press_dropped(),
                        ReportKind::Release => self.states[index].release_done(now, &self.config),
                    }
                    events.report_dropped(channel.id(), kind, error);
                }
            }

            open = if self.states[index].in_flight() {
                Some(index)
            } else {
                None
            };
        }
    }
}
