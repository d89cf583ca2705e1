use foundation::time::Time;

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    deadline: Time,
    payload: T,
}

impl<T> Entry<T> {
    fn precedes(&self, other: &Self) -> bool {
        self.deadline
            .0
            .total_cmp(&other.deadline.0)
            .then_with(|| self.id.cmp(&other.id))
            .is_lt()
    }
}

/// Deterministic, cancellable timer queue on a caller-driven clock.
///
/// Key properties:
/// - Due timers pop in `(deadline, id)` order; equal deadlines fire in
///   scheduling order.
/// - Cancellation removes the timer; a canceled timer never fires.
/// - Popping a timer moves the clock to its deadline, so work scheduled while
///   handling it is based on the time it fired at.
/// - The clock never moves backwards.
#[derive(Debug)]
pub struct TimerQueue<T> {
    now: Time,
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            now: Time::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Arms a timer firing `delay_s` seconds from now. Negative delays fire
    /// at the current time.
    pub fn schedule(&mut self, delay_s: f64, payload: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        let deadline = self.now.after(delay_s.max(0.0));
        tracing::trace!(timer = id.0, deadline = deadline.0, "timer armed");
        self.entries.push(Entry {
            id,
            deadline,
            payload,
        });
        id
    }

    /// Returns `true` if the timer was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let Some(idx) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        self.entries.remove(idx);
        tracing::trace!(timer = id.0, "timer canceled");
        true
    }

    /// Pops the earliest timer due at or before `until`. A non-finite
    /// `until` is never reached, so nothing pops.
    pub fn pop_due(&mut self, until: Time) -> Option<(TimerId, T)> {
        if !until.0.is_finite() {
            return None;
        }
        let idx = self.earliest()?;
        if self.entries[idx].deadline > until {
            return None;
        }
        let entry = self.entries.remove(idx);
        if entry.deadline > self.now {
            self.now = entry.deadline;
        }
        Some((entry.id, entry.payload))
    }

    /// Moves the clock forward to `t` without firing anything.
    pub fn set_now(&mut self, t: Time) {
        if t > self.now {
            self.now = t;
        }
    }

    fn earliest(&self) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (idx, entry) in self.entries.iter().enumerate() {
            match best {
                None => best = Some(idx),
                Some(b) => {
                    if entry.precedes(&self.entries[b]) {
                        best = Some(idx);
                    }
                }
            }
        }
        best
    }
}
