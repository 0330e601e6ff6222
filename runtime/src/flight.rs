//! In-flight bookkeeping for runners.
//!
//! Every admitted run holds a guard; dropping the guard releases the slot.
//! This covers normal completion, a panic inside the wrapped future, and the
//! caller dropping the run future before it finishes.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// In-flight count of a single runner, published as a loading flag.
#[derive(Debug)]
pub(crate) struct Flight {
    running: Mutex<usize>,
    loading: watch::Sender<bool>,
}

impl Flight {
    pub(crate) fn new() -> Arc<Self> {
        let (loading, _) = watch::channel(false);
        Arc::new(Self {
            running: Mutex::new(0),
            loading,
        })
    }

    fn running(&self) -> MutexGuard<'_, usize> {
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a run. With `exclusive`, refuses while another run is in flight.
    pub(crate) fn enter(self: &Arc<Self>, exclusive: bool) -> Option<FlightGuard> {
        let mut running = self.running();
        if exclusive && *running > 0 {
            return None;
        }
        *running += 1;
        self.loading.send_replace(true);
        Some(FlightGuard(Arc::clone(self)))
    }

    pub(crate) fn is_loading(&self) -> bool {
        *self.running() > 0
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    fn leave(&self) {
        let mut running = self.running();
        *running = running.saturating_sub(1);
        if *running == 0 {
            self.loading.send_replace(false);
        }
    }
}

/// Releases one [`Flight`] slot on drop.
#[derive(Debug)]
pub(crate) struct FlightGuard(Arc<Flight>);

impl Drop for FlightGuard {
    fn drop(&mut self) {
        self.0.leave();
    }
}

/// Per-key in-flight tickets.
///
/// A key is loading while it holds at least one ticket. Clearing a key drops
/// its tickets, so a guard from before the clear only removes its own ticket
/// and never the ticket of a run started afterwards.
#[derive(Debug)]
pub(crate) struct KeyedFlight<K> {
    tickets: Mutex<HashMap<K, HashSet<u64>>>,
    next_ticket: AtomicU64,
}

impl<K: Eq + Hash + Clone> KeyedFlight<K> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            tickets: Mutex::new(HashMap::new()),
            next_ticket: AtomicU64::new(0),
        })
    }

    fn tickets(&self) -> MutexGuard<'_, HashMap<K, HashSet<u64>>> {
        self.tickets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn enter(self: &Arc<Self>, key: &K, exclusive: bool) -> Option<KeyGuard<K>> {
        let mut tickets = self.tickets();
        if exclusive && tickets.get(key).is_some_and(|held| !held.is_empty()) {
            return None;
        }
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed);
        tickets.entry(key.clone()).or_default().insert(ticket);
        Some(KeyGuard {
            flight: Arc::clone(self),
            key: key.clone(),
            ticket,
        })
    }

    pub(crate) fn is_loading(&self, key: &K) -> bool {
        self.tickets().get(key).is_some_and(|held| !held.is_empty())
    }

    pub(crate) fn is_any_loading(&self) -> bool {
        self.tickets().values().any(|held| !held.is_empty())
    }

    pub(crate) fn loading_keys(&self) -> Vec<K> {
        self.tickets()
            .iter()
            .filter(|(_, held)| !held.is_empty())
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub(crate) fn clear(&self, key: &K) {
        self.tickets().remove(key);
    }

    pub(crate) fn clear_all(&self) {
        self.tickets().clear();
    }

    fn leave(&self, key: &K, ticket: u64) {
        let mut tickets = self.tickets();
        if let Some(held) = tickets.get_mut(key) {
            held.remove(&ticket);
            if held.is_empty() {
                tickets.remove(key);
            }
        }
    }
}

/// Releases one [`KeyedFlight`] ticket on drop.
#[derive(Debug)]
pub(crate) struct KeyGuard<K: Eq + Hash + Clone> {
    flight: Arc<KeyedFlight<K>>,
    key: K,
    ticket: u64,
}

impl<K: Eq + Hash + Clone> Drop for KeyGuard<K> {
    fn drop(&mut self) {
        self.flight.leave(&self.key, self.ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclusive_flight() {
        let flight = Flight::new();
        let guard = flight.enter(true);
        assert!(guard.is_some());
        assert!(flight.is_loading());
        assert!(flight.enter(true).is_none());

        drop(guard);
        assert!(!flight.is_loading());
        assert!(flight.enter(true).is_some());
    }

    #[test]
    fn test_shared_flight_counts_every_run() {
        let flight = Flight::new();
        let rx = flight.subscribe();
        let a = flight.enter(false);
        let b = flight.enter(false);
        assert!(*rx.borrow());

        drop(a);
        assert!(flight.is_loading());
        assert!(*rx.borrow());
        drop(b);
        assert!(!*rx.borrow());
    }

    #[test]
    fn test_stale_guard_after_clear_keeps_new_ticket() {
        let flight = KeyedFlight::new();
        let stale = flight.enter(&"row-1", true);
        flight.clear(&"row-1");
        assert!(!flight.is_loading(&"row-1"));

        let fresh = flight.enter(&"row-1", true);
        assert!(fresh.is_some());
        drop(stale);
        assert!(flight.is_loading(&"row-1"));

        drop(fresh);
        assert!(!flight.is_any_loading());
        assert!(flight.loading_keys().is_empty());
    }
}
