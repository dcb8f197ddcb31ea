//! Single-threaded cooperative scheduler.
//!
//! Emulates the UI event loop's idle callbacks and timeouts without threads.
//! Tasks are one-shot: a task that wants to run again reschedules itself when
//! its wakeup is dispatched. Time is a virtual clock advanced by the caller,
//! which keeps every ordering decision deterministic.
//!
//! # Turns
//!
//! - [`Scheduler::take_turn`] drains the idle tasks that were queued *before*
//!   the turn began. Tasks queued while the turn's wakeups are dispatched run
//!   on the next turn.
//! - [`Scheduler::pop_due`] yields expired timers one at a time in deadline
//!   order, so a timer rescheduled during dispatch is seen by the same
//!   `advance` loop if it falls inside the window.
//!
//! Cancellation is idempotent: cancelling an unknown, fired, or already
//! cancelled task returns `false` and has no effect.

use crate::model::TabId;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

/// Handle of a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Raw handle value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// What a task does when it fires. Targets are handles, never references, so
/// a wakeup for a tab that is gone is simply ignored by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Wakeup {
    /// Inject the next backlog batch into a tab's view.
    Replay(TabId),
    /// Advance a tab's animated buddy icon.
    IconFrame(TabId),
    /// Destroy a parked tab whose close timer expired.
    CloseTimeout(TabId),
}

/// Cooperative scheduler with an idle queue and virtual-clock timers.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: Duration,
    next_id: u64,
    idle: VecDeque<(TaskId, Wakeup)>,
    timers: BTreeMap<(Duration, TaskId), Wakeup>,
    deadlines: HashMap<TaskId, Duration>,
    turns: u64,
}

impl Scheduler {
    /// An empty scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn issue(&mut self) -> TaskId {
        self.next_id += 1;
        TaskId(self.next_id)
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of idle turns taken so far.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Queue `wakeup` to run on the next idle turn.
    pub fn add_idle(&mut self, wakeup: Wakeup) -> TaskId {
        let id = self.issue();
        self.idle.push_back((id, wakeup));
        id
    }

    /// Arm a timer firing `delay` after the current time.
    pub fn add_timeout(&mut self, delay: Duration, wakeup: Wakeup) -> TaskId {
        let id = self.issue();
        let deadline = self.now.saturating_add(delay);
        self.timers.insert((deadline, id), wakeup);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending task. Returns whether a pending task was removed.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(deadline) = self.deadlines.remove(&id) {
            self.timers.remove(&(deadline, id));
            return true;
        }
        let before = self.idle.len();
        self.idle.retain(|(queued, _)| *queued != id);
        self.idle.len() != before
    }

    /// Whether `id` is still pending.
    pub fn is_pending(&self, id: TaskId) -> bool {
        self.deadlines.contains_key(&id) || self.idle.iter().any(|(queued, _)| *queued == id)
    }

    /// Number of queued idle tasks.
    pub fn pending_idle(&self) -> usize {
        self.idle.len()
    }

    /// Number of armed timers.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the earliest armed timer.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Take one idle turn: remove and return every idle task queued so far.
    pub fn take_turn(&mut self) -> Vec<(TaskId, Wakeup)> {
        self.turns += 1;
        self.idle.drain(..).collect()
    }

    /// Pop the earliest timer with a deadline at or before `until`, moving the
    /// clock to its deadline.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TaskId, Wakeup)> {
        let (&(deadline, id), _) = self.timers.iter().next()?;
        if deadline > until {
            return None;
        }
        let wakeup = self.timers.remove(&(deadline, id))?;
        self.deadlines.remove(&id);
        self.now = self.now.max(deadline);
        Some((id, wakeup))
    }

    /// Move the clock forward to `to`. Never moves it backwards.
    pub fn set_now(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }

    /// Drop every pending task.
    pub fn clear(&mut self) {
        self.idle.clear();
        self.timers.clear();
        self.deadlines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab(n: u64) -> TabId {
        TabId::from_raw(n)
    }

    #[test]
    fn idle_tasks_run_in_fifo_order() {
        let mut sched = Scheduler::new();
        sched.add_idle(Wakeup::Replay(tab(1)));
        sched.add_idle(Wakeup::Replay(tab(2)));
        let fired: Vec<_> = sched.take_turn().into_iter().map(|(_, w)| w).collect();
        assert_eq!(fired, vec![Wakeup::Replay(tab(1)), Wakeup::Replay(tab(2))]);
        assert_eq!(sched.pending_idle(), 0);
        assert_eq!(sched.turns(), 1);
    }

    #[test]
    fn tasks_queued_after_turn_wait_for_next_turn() {
        let mut sched = Scheduler::new();
        sched.add_idle(Wakeup::Replay(tab(1)));
        let first = sched.take_turn();
        sched.add_idle(Wakeup::Replay(tab(1)));
        assert_eq!(first.len(), 1);
        assert_eq!(sched.pending_idle(), 1);
    }

    #[test]
    fn cancel_removes_idle_task() {
        let mut sched = Scheduler::new();
        let id = sched.add_idle(Wakeup::Replay(tab(1)));
        assert!(sched.cancel(id));
        assert!(sched.take_turn().is_empty());
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut sched = Scheduler::new();
        let id = sched.add_timeout(Duration::from_secs(1), Wakeup::CloseTimeout(tab(1)));
        assert!(sched.cancel(id));
        assert!(!sched.cancel(id), "Second cancel is a no-op");
        assert_eq!(sched.pending_timers(), 0);
    }

    #[test]
    fn cancel_after_fire_is_noop() {
        let mut sched = Scheduler::new();
        let id = sched.add_idle(Wakeup::Replay(tab(1)));
        sched.take_turn();
        assert!(!sched.cancel(id));
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut sched = Scheduler::new();
        sched.add_timeout(Duration::from_millis(300), Wakeup::IconFrame(tab(2)));
        sched.add_timeout(Duration::from_millis(100), Wakeup::IconFrame(tab(1)));
        let until = Duration::from_millis(500);
        let (_, first) = sched.pop_due(until).expect("first timer due");
        assert_eq!(first, Wakeup::IconFrame(tab(1)));
        assert_eq!(sched.now(), Duration::from_millis(100));
        let (_, second) = sched.pop_due(until).expect("second timer due");
        assert_eq!(second, Wakeup::IconFrame(tab(2)));
        assert!(sched.pop_due(until).is_none());
    }

    #[test]
    fn timer_not_due_stays_armed() {
        let mut sched = Scheduler::new();
        let id = sched.add_timeout(Duration::from_secs(600), Wakeup::CloseTimeout(tab(1)));
        assert!(sched.pop_due(Duration::from_secs(1)).is_none());
        assert!(sched.is_pending(id));
        assert_eq!(sched.next_deadline(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn timeouts_are_relative_to_current_time() {
        let mut sched = Scheduler::new();
        sched.set_now(Duration::from_secs(10));
        sched.add_timeout(Duration::from_secs(5), Wakeup::CloseTimeout(tab(1)));
        assert_eq!(sched.next_deadline(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn clock_never_moves_backwards() {
        let mut sched = Scheduler::new();
        sched.set_now(Duration::from_secs(10));
        sched.set_now(Duration::from_secs(5));
        assert_eq!(sched.now(), Duration::from_secs(10));
    }

    #[test]
    fn clear_drops_everything() {
        let mut sched = Scheduler::new();
        sched.add_idle(Wakeup::Replay(tab(1)));
        sched.add_timeout(Duration::from_secs(1), Wakeup::IconFrame(tab(1)));
        sched.clear();
        assert_eq!(sched.pending_idle(), 0);
        assert_eq!(sched.pending_timers(), 0);
    }
}
