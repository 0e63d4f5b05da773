//! Animation tick dispatcher.
//!
//! Subscribers are callbacks that return whether they still need ticks.
//! The host owns the actual 16 ms timer; it calls [`AnimationDispatcher::tick`]
//! and keeps the timer running exactly while `tick` returns true. No
//! subscriber → no timer → no idle wakeups.

use std::time::{Duration, Instant};

pub const ANIMATION_TICK: Duration = Duration::from_millis(16);

type TickFn = Box<dyn FnMut(Instant) -> bool>;

#[derive(Default)]
pub struct AnimationDispatcher {
    subscribers: Vec<(u64, TickFn)>,
    next_id: u64,
}

impl AnimationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: TickFn) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.subscribers.push((id, callback));
        tracing::trace!(target: "overlay.anim", id, "anim_subscribed");
        id
    }

    pub fn unsubscribe(&mut self, id: u64) {
        self.subscribers.retain(|(sid, _)| *sid != id);
    }

    /// Run one tick. Subscribers returning false are dropped. Returns true
    /// while anyone still wants ticks.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.subscribers.retain_mut(|(id, callback)| {
            let keep = callback(now);
            if !keep {
                tracing::trace!(target: "overlay.anim", id = *id, "anim_completed");
            }
            keep
        });
        !self.subscribers.is_empty()
    }

    pub fn is_active(&self) -> bool {
        !self.subscribers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn ticks_until_subscriber_finishes() {
        let mut d = AnimationDispatcher::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        d.subscribe(Box::new(move |_| {
            c.set(c.get() + 1);
            c.get() < 3
        }));
        let now = Instant::now();
        assert!(d.tick(now));
        assert!(d.tick(now));
        assert!(!d.tick(now)); // third tick retires the subscriber
        assert_eq!(count.get(), 3);
        assert!(!d.is_active());
    }

    #[test]
    fn unsubscribe_stops_ticks() {
        let mut d = AnimationDispatcher::new();
        let id = d.subscribe(Box::new(|_| true));
        assert!(d.is_active());
        d.unsubscribe(id);
        assert!(!d.tick(Instant::now()));
    }

    #[test]
    fn multiple_subscribers_retire_independently() {
        let mut d = AnimationDispatcher::new();
        d.subscribe(Box::new(|_| false));
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        d.subscribe(Box::new(move |_| {
            h.set(h.get() + 1);
            h.get() < 2
        }));
        let now = Instant::now();
        assert!(d.tick(now)); // first retires, second continues
        assert!(!d.tick(now));
        assert_eq!(hits.get(), 2);
    }
}
