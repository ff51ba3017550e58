//! Registration phase gate
//!
//! Guards a collection that may only grow while the suite is in its
//! registration phase. The flip to `Ready` happens at most once and hands
//! the collection out to the single winning caller.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::error::{AlreadyReady, RegistrationClosed};

const REGISTRATION: u8 = 0;
const READY: u8 = 1;

/// Suite life-cycle stage. Monotonic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuitePhase {
    Registration,
    Ready,
}

impl fmt::Display for SuitePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuitePhase::Registration => write!(f, "registration"),
            SuitePhase::Ready => write!(f, "ready"),
        }
    }
}

/// Once-only registration→ready gate over a guarded value.
///
/// Both `register` and the flip in `enter_ready` run under the same lock,
/// so a registration racing the flip lands entirely before it (and is part
/// of the handed-out value) or entirely after it (and is rejected).
pub struct PhaseGate<T> {
    phase: AtomicU8,
    guarded: Mutex<Option<T>>,
}

impl<T> PhaseGate<T> {
    pub fn new(initial: T) -> Self {
        Self {
            phase: AtomicU8::new(REGISTRATION),
            guarded: Mutex::new(Some(initial)),
        }
    }

    /// Current phase, read without taking the lock
    pub fn phase(&self) -> SuitePhase {
        match self.phase.load(Ordering::Acquire) {
            READY => SuitePhase::Ready,
            _ => SuitePhase::Registration,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.phase() == SuitePhase::Ready
    }

    /// Mutate the guarded value if registration is still open
    pub fn register<R>(&self, admit: impl FnOnce(&mut T) -> R) -> Result<R, RegistrationClosed> {
        let mut guarded = self.guarded.lock();
        if self.phase.load(Ordering::Acquire) != REGISTRATION {
            return Err(RegistrationClosed);
        }
        guarded.as_mut().map(admit).ok_or(RegistrationClosed)
    }

    /// Read the guarded value while registration is still open
    pub fn inspect<R>(&self, read: impl FnOnce(&T) -> R) -> Option<R> {
        self.guarded.lock().as_ref().map(read)
    }

    /// Flip to `Ready` and take the guarded value.
    ///
    /// Exactly one caller ever receives `Ok`; every other caller, concurrent
    /// or later, gets `AlreadyReady`.
    pub fn enter_ready(&self) -> Result<T, AlreadyReady> {
        self.enter_ready_with(|value| value)
    }

    /// Like [`enter_ready`](Self::enter_ready), but runs `publish` on the
    /// taken value before the phase reads `Ready` and before the lock is
    /// released. Observers that see `Ready`, or that lock after the flip,
    /// also see whatever `publish` stored.
    pub fn enter_ready_with<R>(&self, publish: impl FnOnce(T) -> R) -> Result<R, AlreadyReady> {
        if self.phase.load(Ordering::Acquire) == READY {
            return Err(AlreadyReady);
        }

        let mut guarded = self.guarded.lock();
        if self.phase.load(Ordering::Acquire) != REGISTRATION {
            return Err(AlreadyReady);
        }
        let published = publish(guarded.take().ok_or(AlreadyReady)?);
        self.phase
            .compare_exchange(REGISTRATION, READY, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AlreadyReady)?;
        Ok(published)
    }
}

impl<T: Default> Default for PhaseGate<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for PhaseGate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseGate")
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn test_register_then_enter_ready() {
        let gate = PhaseGate::new(Vec::new());
        assert_eq!(gate.phase(), SuitePhase::Registration);

        gate.register(|items| items.push(1)).unwrap();
        gate.register(|items| items.push(2)).unwrap();

        assert_eq!(gate.enter_ready(), Ok(vec![1, 2]));
        assert_eq!(gate.phase(), SuitePhase::Ready);
    }

    #[test]
    fn test_enter_ready_only_once() {
        let gate: PhaseGate<Vec<u32>> = PhaseGate::default();
        assert!(gate.enter_ready().is_ok());
        assert_eq!(gate.enter_ready(), Err(AlreadyReady));
        assert_eq!(gate.enter_ready(), Err(AlreadyReady));
        assert!(gate.is_ready());
    }

    #[test]
    fn test_enter_ready_with_publishes_before_flip() {
        let gate = PhaseGate::new(vec![1, 2, 3]);
        let published = std::sync::OnceLock::new();

        let len = gate.enter_ready_with(|items| {
            assert_eq!(gate.phase(), SuitePhase::Registration);
            published.get_or_init(|| items).len()
        });

        assert_eq!(len, Ok(3));
        assert_eq!(published.get(), Some(&vec![1, 2, 3]));
        assert_eq!(gate.enter_ready_with(|items| items.len()), Err(AlreadyReady));
    }

    #[test]
    fn test_register_after_ready_is_closed() {
        let gate = PhaseGate::new(Vec::new());
        gate.register(|items| items.push("early")).unwrap();
        let sealed = gate.enter_ready().unwrap();

        assert_eq!(gate.register(|items| items.push("late")), Err(RegistrationClosed));
        assert_eq!(gate.inspect(|items| items.len()), None);
        assert_eq!(sealed, vec!["early"]);
    }

    #[test]
    fn test_concurrent_enter_ready_has_one_winner() {
        let gate = PhaseGate::new(Vec::<u32>::new());
        let barrier = Barrier::new(16);

        let winners: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let gate = &gate;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        gate.enter_ready().is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(winners, 1);
    }

    #[test]
    fn test_racing_registrations_land_on_one_side_of_flip() {
        let gate = PhaseGate::new(Vec::<u32>::new());
        let barrier = Barrier::new(9);

        let (accepted, sealed) = thread::scope(|scope| {
            let registrars: Vec<_> = (0..8u32)
                .map(|worker| {
                    let gate = &gate;
                    let barrier = &barrier;
                    scope.spawn(move || {
                        barrier.wait();
                        (0..50u32)
                            .map(|i| worker * 100 + i)
                            .filter(|value| gate.register(|items| items.push(*value)).is_ok())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            let flipper = scope.spawn(|| {
                barrier.wait();
                gate.enter_ready().unwrap()
            });

            let accepted: Vec<u32> = registrars
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect();
            (accepted, flipper.join().unwrap())
        });

        let mut accepted = accepted;
        let mut sealed = sealed;
        accepted.sort_unstable();
        sealed.sort_unstable();
        assert_eq!(accepted, sealed);
    }
}
