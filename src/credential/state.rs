//! Shared credential state
//!
//! Holds both credential slots, the active-slot indicator and the
//! refresh-in-flight flag behind a single mutex. Every read and write goes
//! through the lock for the whole operation, so a reader can never see one
//! slot's username paired with another generation's password.

use super::slot::{Credential, CredentialSnapshot, Slot};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug)]
struct Slots {
    odd: Credential,
    even: Credential,
    active: Slot,
    refresh_in_flight: bool,
}

impl Slots {
    fn credential(&self, slot: Slot) -> &Credential {
        match slot {
            Slot::Odd => &self.odd,
            Slot::Even => &self.even,
        }
    }
}

/// Cloneable handle to the shared credential state
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct CredentialState {
    inner: Arc<Mutex<Slots>>,
}

impl CredentialState {
    /// Create state from an initial credential pair per slot and the slot to try first
    pub fn new(odd: Credential, even: Credential, active: Slot) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Slots {
                odd,
                even,
                active,
                refresh_in_flight: false,
            })),
        }
    }

    // Slots is only ever replaced field-complete inside one critical section,
    // so a poisoned lock still guards a consistent value.
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the currently active pair and its slot
    pub fn snapshot_active(&self) -> CredentialSnapshot {
        let slots = self.lock();
        CredentialSnapshot {
            slot: slots.active,
            credential: slots.credential(slots.active).clone(),
        }
    }

    /// Toggle the active slot between odd and even
    pub fn flip_active(&self) {
        let mut slots = self.lock();
        slots.active = slots.active.other();
    }

    /// Currently active slot
    pub fn active_slot(&self) -> Slot {
        self.lock().active
    }

    /// Overwrite both pairs and the active slot in one critical section
    ///
    /// Leaves the refresh-in-flight flag alone; only the refresh task that
    /// set it clears it.
    pub fn replace_all(&self, odd: Credential, even: Credential, active: Slot) {
        self.acquire().replace_all(odd, even, active);
    }

    /// Take the state lock for a composite update
    ///
    /// The lock is released when the guard is dropped (or via
    /// [`CredentialGuard::release`]). Do not hold it across an `.await`.
    pub fn acquire(&self) -> CredentialGuard<'_> {
        CredentialGuard { slots: self.lock() }
    }

    /// Whether a detached refresh is currently running
    pub fn is_refresh_in_flight(&self) -> bool {
        self.lock().refresh_in_flight
    }

    /// Check-and-set the refresh-in-flight flag
    ///
    /// Returns `true` if the caller won the right to start a refresh.
    pub(crate) fn try_begin_refresh(&self) -> bool {
        let mut slots = self.lock();
        if slots.refresh_in_flight {
            false
        } else {
            slots.refresh_in_flight = true;
            true
        }
    }

    pub(crate) fn end_refresh(&self) {
        self.lock().refresh_in_flight = false;
    }
}

impl fmt::Debug for CredentialState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.lock();
        f.debug_struct("CredentialState")
            .field("odd_username", &slots.odd.username())
            .field("even_username", &slots.even.username())
            .field("active", &slots.active)
            .field("refresh_in_flight", &slots.refresh_in_flight)
            .finish()
    }
}

/// Scoped hold on the credential state lock
///
/// Exposes reads and whole-state replacement only; individual fields are
/// never settable, so no partially updated state can be published.
pub struct CredentialGuard<'a> {
    slots: MutexGuard<'a, Slots>,
}

impl CredentialGuard<'_> {
    /// Active slot as seen under this lock
    pub fn active_slot(&self) -> Slot {
        self.slots.active
    }

    /// Pair stored in `slot`
    pub fn credential(&self, slot: Slot) -> &Credential {
        self.slots.credential(slot)
    }

    /// Pair stored in the active slot
    pub fn active_credential(&self) -> &Credential {
        self.slots.credential(self.slots.active)
    }

    /// Overwrite both pairs and the active slot
    pub fn replace_all(&mut self, odd: Credential, even: Credential, active: Slot) {
        let refresh_in_flight = self.slots.refresh_in_flight;
        *self.slots = Slots {
            odd,
            even,
            active,
            refresh_in_flight,
        };
    }

    /// Release the lock
    pub fn release(self) {
        drop(self);
    }
}

impl fmt::Debug for CredentialGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialGuard")
            .field("active", &self.slots.active)
            .finish_non_exhaustive()
    }
}
