//! Cooperative tick scheduler
//!
//! Agents register callbacks to fire a number of ticks in the future. The
//! scheduler owns the simulation clock; `advance` moves it forward by one
//! tick and hands back every call that became due, ordered by
//! `(due tick, target)` so dispatch order does not depend on call ids.
//!
//! Suspension is purely data: an agent between ticks is nothing but a
//! pending `ScheduledCall`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{OrchestratorId, Tick};

/// Callbacks an agent can register
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Callback {
    /// The build orchestrator's decision pass
    SettlementTick,
}

/// Handle of one registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CallId(pub u64);

/// A pending future invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledCall {
    pub id: CallId,
    pub target: OrchestratorId,
    pub callback: Callback,
    /// Absolute tick on which the call fires
    pub due: Tick,
    /// Additional firings after this one
    pub loops: u32,
    pub loop_interval: Tick,
}

/// The scheduler surface agents depend on
pub trait SchedulerPort {
    fn current_tick(&self) -> Tick;

    /// Register `callback` on `target` to fire `run_in` ticks from now, then
    /// `loops` more times every `loop_interval` ticks
    fn schedule(
        &mut self,
        callback: Callback,
        target: OrchestratorId,
        run_in: Tick,
        loops: u32,
        loop_interval: Tick,
    ) -> CallId;

    /// Remove every pending registration of `callback` on `target`,
    /// returns how many were removed
    fn cancel(&mut self, target: OrchestratorId, callback: Callback) -> usize;

    /// Remaining ticks per pending registration of `callback` on `target`
    fn pending_calls(&self, target: OrchestratorId, callback: Callback) -> BTreeMap<CallId, i64>;
}

/// Reference scheduler driven by `advance`
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    current_tick: Tick,
    next_call: u64,
    calls: Vec<ScheduledCall>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler resuming at a saved clock value
    pub fn starting_at(tick: Tick) -> Self {
        Self {
            current_tick: tick,
            ..Self::default()
        }
    }

    /// Advance the clock by one tick and return the calls now due
    pub fn advance(&mut self) -> Vec<ScheduledCall> {
        self.current_tick += 1;
        let now = self.current_tick;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.calls.drain(..).partition(|c| c.due <= now);
        self.calls = pending;

        // Native loops re-arm themselves
        for call in due.iter().filter(|c| c.loops > 0) {
            self.calls.push(ScheduledCall {
                due: now + call.loop_interval.max(1),
                loops: call.loops - 1,
                ..call.clone()
            });
        }

        due.sort_by_key(|c| (c.due, c.target, c.id));
        due
    }

    /// Number of pending calls across all targets
    pub fn pending_count(&self) -> usize {
        self.calls.len()
    }
}

impl SchedulerPort for Scheduler {
    fn current_tick(&self) -> Tick {
        self.current_tick
    }

    fn schedule(
        &mut self,
        callback: Callback,
        target: OrchestratorId,
        run_in: Tick,
        loops: u32,
        loop_interval: Tick,
    ) -> CallId {
        let id = CallId(self.next_call);
        self.next_call += 1;
        self.calls.push(ScheduledCall {
            id,
            target,
            callback,
            due: self.current_tick + run_in,
            loops,
            loop_interval,
        });
        id
    }

    fn cancel(&mut self, target: OrchestratorId, callback: Callback) -> usize {
        let before = self.calls.len();
        self.calls
            .retain(|c| !(c.target == target && c.callback == callback));
        before - self.calls.len()
    }

    fn pending_calls(&self, target: OrchestratorId, callback: Callback) -> BTreeMap<CallId, i64> {
        self.calls
            .iter()
            .filter(|c| c.target == target && c.callback == callback)
            .map(|c| (c.id, c.due as i64 - self.current_tick as i64))
            .collect()
    }
}
