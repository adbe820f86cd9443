//! Keeping late responses from overwriting newer ones.
//!
//! Every fetch cycle takes a [`Ticket`]; when its response arrives it is
//! applied only if no newer cycle has started since.

use leptos::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Default)]
pub struct LatestOnly {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl LatestOnly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a cycle, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Relaxed) == ticket.0
    }

    /// Run `apply` with `value` if `ticket` is still current. Returns whether
    /// it ran.
    pub fn apply<T>(&self, ticket: Ticket, value: T, apply: impl FnOnce(T)) -> bool {
        if self.is_current(ticket) {
            apply(value);
            true
        } else {
            log::debug!("[Fetch] Dropping stale response #{}", ticket.0);
            false
        }
    }
}

/// Start a cycle on a sequencer owned by a view. `None` once the view has
/// been disposed, e.g. a refresh triggered by a save that finished after the
/// user navigated away.
pub fn begin_owned(latest: StoredValue<LatestOnly>) -> Option<(LatestOnly, Ticket)> {
    let seq = latest.try_get_value()?;
    let ticket = seq.begin();
    Some((seq, ticket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;

    #[test]
    fn test_stale_response_dropped() {
        let seq = LatestOnly::new();
        let first = seq.begin();
        let second = seq.clone().begin();

        let mut shown = Vec::new();
        // second range answers first, then the old request finally lands
        assert!(seq.apply(second, "week 2", |v| shown.push(v)));
        assert!(!seq.apply(first, "week 1", |v| shown.push(v)));

        assert_eq!(shown, vec!["week 2"]);
    }

    #[test]
    fn test_single_cycle_applies() {
        let seq = LatestOnly::new();
        let ticket = seq.begin();
        assert!(seq.is_current(ticket));
        let mut hit = false;
        assert!(seq.apply(ticket, (), |_| hit = true));
        assert!(hit);
    }

    #[test]
    fn test_begin_owned_after_view_is_gone() {
        let owner = Owner::new();
        let latest = owner.with(|| StoredValue::new(LatestOnly::new()));

        let (seq, ticket) = begin_owned(latest).unwrap();
        assert!(seq.is_current(ticket));

        owner.unset();
        assert!(begin_owned(latest).is_none());
        // a response already in flight still resolves against its own handle
        assert!(seq.apply(ticket, (), |_| ()));
    }
}
