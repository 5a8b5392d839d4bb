// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Loop state machine of the scheduler.

/// What the scheduler loop is doing right now.
///
/// Only one of the busy states is ever active. Every busy state is entered from
/// [`Idle`](Self::Idle) and returns to it; nothing moves between busy states
/// directly, which is what rules out nested draining.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// Not servicing; a pass may start.
    #[default]
    Idle,
    /// Delivering the pending sync event.
    DrainingSync,
    /// Expanding the next burst into per-listener deliveries.
    DispatchingBurst,
    /// Running one action or one burst delivery.
    RunningAction,
}

impl LoopState {
    /// Returns `true` for every state but [`Idle`](Self::Idle).
    #[must_use]
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Returns `true` if the loop may move from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (
                Self::Idle,
                Self::DrainingSync | Self::DispatchingBurst | Self::RunningAction
            ) | (
                Self::DrainingSync | Self::DispatchingBurst | Self::RunningAction,
                Self::Idle
            )
        )
    }
}
