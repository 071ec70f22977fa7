/// How long a scheduled action waits before it fires.
pub enum Wait<C> {
    /// Lets `n` polls pass, then fires. `Ticks(0)` fires on the next poll.
    Ticks(u32),
    /// Fires on the first poll where the predicate holds.
    Until(Box<dyn Fn(&C) -> bool>),
}

struct Pending<C, A> {
    wait: Wait<C>,
    action: A,
}

/// Per-tick replacement for "wait a frame" and "wait until" routines.
///
/// Nothing runs in the background: the owner calls [`TickScheduler::poll`] once per
/// fixed step and performs whatever actions come back.
pub struct TickScheduler<C, A> {
    pending: Vec<Pending<C, A>>,
}

impl<C, A> Default for TickScheduler<C, A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<C, A> TickScheduler<C, A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, wait: Wait<C>, action: A) {
        self.pending.push(Pending { wait, action });
    }

    pub fn after_ticks(&mut self, ticks: u32, action: A) {
        self.schedule(Wait::Ticks(ticks), action);
    }

    pub fn when(&mut self, predicate: impl Fn(&C) -> bool + 'static, action: A) {
        self.schedule(Wait::Until(Box::new(predicate)), action);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Advances every pending wait by one tick and returns the ready actions in the
    /// order they were scheduled.
    pub fn poll(&mut self, ctx: &C) -> Vec<A> {
        let mut ready = Vec::new();
        let mut still_waiting = Vec::with_capacity(self.pending.len());

        for mut p in self.pending.drain(..) {
            let fire = match &mut p.wait {
                Wait::Ticks(0) => true,
                Wait::Ticks(n) => {
                    *n -= 1;
                    false
                }
                Wait::Until(pred) => pred(ctx),
            };
            if fire {
                ready.push(p.action);
            } else {
                still_waiting.push(p);
            }
        }

        self.pending = still_waiting;
        ready
    }
}
