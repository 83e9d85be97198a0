//! Per-trip admission-control critical section.
//!
//! The capacity check and the registration insert must be observed as one
//! indivisible step per trip. `TripLedger` serializes all register/cancel
//! calls for the same trip through an exclusive per-trip lease; calls for
//! different trips proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use tripbook_core::TripId;

/// Default bound on how long a caller waits for a trip's lease.
pub const DEFAULT_LEASE_WAIT: Duration = Duration::from_secs(5);

type Registry = Mutex<HashMap<TripId, Arc<AsyncMutex<()>>>>;

/// The lease could not be acquired within the bounded wait.
#[derive(Debug, Error)]
#[error("admission lease for trip {trip_id} not acquired within {wait:?}")]
pub struct LeaseTimeout {
    pub trip_id: TripId,
    pub wait: Duration,
}

/// Exclusive lease on one trip's admission state.
///
/// Held across the whole check-then-commit sequence and released on drop, so
/// every exit path (success, precondition failure, unexpected error) releases
/// it. Releasing also evicts the trip's registry entry when no other caller
/// holds or awaits it, so lease acquisition with an arbitrary (even
/// nonexistent) trip id cannot grow the registry without bound.
#[derive(Debug)]
pub struct TripLease {
    guard: Option<OwnedMutexGuard<()>>,
    trip_id: TripId,
    registry: Arc<Registry>,
}

impl Drop for TripLease {
    fn drop(&mut self) {
        // Release the mutex before inspecting the slot's reference count.
        self.guard.take();

        let mut leases = self.registry.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(slot) = leases.get(&self.trip_id) {
            // New clones are only minted under the registry lock, so a count
            // of one means the registry holds the sole reference: no lease
            // holder, no waiter.
            if Arc::strong_count(slot) == 1 {
                leases.remove(&self.trip_id);
            }
        }
    }
}

/// Registry of per-trip leases.
///
/// An entry exists only while its trip has a lease held or awaited; the last
/// released lease removes it, so the registry size tracks in-flight admission
/// work, not the set of trip ids ever seen.
#[derive(Debug)]
pub struct TripLedger {
    wait: Duration,
    leases: Arc<Registry>,
}

impl TripLedger {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            leases: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Acquire the exclusive lease for `trip_id`, waiting at most the
    /// configured bound.
    pub async fn acquire(&self, trip_id: TripId) -> Result<TripLease, LeaseTimeout> {
        let slot = {
            // Inner lock only guards the registry lookup; never held across await.
            let mut leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(leases.entry(trip_id).or_default())
        };

        match tokio::time::timeout(self.wait, slot.lock_owned()).await {
            Ok(guard) => Ok(TripLease {
                guard: Some(guard),
                trip_id,
                registry: Arc::clone(&self.leases),
            }),
            Err(_) => Err(LeaseTimeout {
                trip_id,
                wait: self.wait,
            }),
        }
    }
}

impl Default for TripLedger {
    fn default() -> Self {
        Self::new(DEFAULT_LEASE_WAIT)
    }
}
