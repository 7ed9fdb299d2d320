//! Derived telemetry.
//!
//! [`ground_speed`] and [`distance_to_home`] are pure functions of their
//! inputs. [`CombineLatest`] is the small reactive node that remembers the
//! last value of two independently updating inputs and recomputes whenever
//! either side changes.

use std::sync::{Mutex, PoisonError};

use aerolink_types::{HomeDistance, HomePosition, PositionAbsolute, Speed, VelocityNed};

use crate::geo::distance_between;

/// Horizontal speed over ground. The down component is ignored.
pub fn ground_speed(velocity: &VelocityNed) -> Speed {
    Speed(velocity.north.0.hypot(velocity.east.0))
}

/// Offset of `position` from `home`: great-circle distance horizontally,
/// signed altitude difference vertically (positive above home).
pub fn distance_to_home(position: &PositionAbsolute, home: &HomePosition) -> HomeDistance {
    HomeDistance {
        horizontal: distance_between(home.lat, home.lon, position.lat, position.lon),
        vertical: position.alt - home.alt,
    }
}

/// Combine-latest node over a left and a right input.
///
/// Each `push_*` stores the new value and, once both sides are known, calls
/// `emit` with the latest pair. `emit` runs under the node's lock, so two
/// racing pushes publish in the same order they were stored.
#[derive(Debug)]
pub struct CombineLatest<L, R> {
    latest: Mutex<(Option<L>, Option<R>)>,
}

impl<L, R> Default for CombineLatest<L, R> {
    fn default() -> Self {
        Self {
            latest: Mutex::new((None, None)),
        }
    }
}

impl<L, R> CombineLatest<L, R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new left value. Returns `true` if `emit` ran.
    pub fn push_left(&self, value: L, emit: impl FnOnce(&L, &R)) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.0 = Some(value);
        match &*latest {
            (Some(l), Some(r)) => {
                emit(l, r);
                true
            }
            _ => false,
        }
    }

    /// Store a new right value. Returns `true` if `emit` ran.
    pub fn push_right(&self, value: R, emit: impl FnOnce(&L, &R)) -> bool {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        latest.1 = Some(value);
        match &*latest {
            (Some(l), Some(r)) => {
                emit(l, r);
                true
            }
            _ => false,
        }
    }

    /// Forget both inputs.
    pub fn clear(&self) {
        let mut latest = self.latest.lock().unwrap_or_else(PoisonError::into_inner);
        *latest = (None, None);
    }
}
