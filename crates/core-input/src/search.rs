//! Incremental search.
//!
//! Any printable character starts or extends the query; matching is
//! ordinal case-insensitive substring over display names. Extending the
//! query searches from the focused item *inclusive* (so a growing query
//! keeps a still-matching focus put); explicit next/previous iterate
//! cyclically from the neighbor index.

use std::time::{Duration, Instant};

/// Pill fade-in/out time.
pub const PILL_FADE: Duration = Duration::from_millis(220);
/// Pill typing-pulse decay time.
pub const PILL_PULSE: Duration = Duration::from_millis(260);

/// Byte range of the first case-insensitive occurrence of `needle` in
/// `haystack`, scanning char boundaries.
pub fn find_match_range(haystack: &str, needle: &str) -> Option<std::ops::Range<usize>> {
    if needle.is_empty() {
        return None;
    }
    let mut start_indices: Vec<usize> = haystack.char_indices().map(|(i, _)| i).collect();
    start_indices.push(haystack.len());
    for w in 0..start_indices.len() - 1 {
        let start = start_indices[w];
        if prefix_matches_ci(&haystack[start..], needle) {
            // Length of the matched region in haystack bytes.
            let mut rest = haystack[start..].chars();
            let mut needle_chars = needle.chars().flat_map(char::to_lowercase).count();
            let mut end = start;
            while needle_chars > 0 {
                let c = rest.next().expect("prefix match guarantees chars");
                end += c.len_utf8();
                // A single source char may lowercase to several chars and
                // overshoot the needle end; saturate instead of wrapping.
                needle_chars = needle_chars.saturating_sub(c.to_lowercase().count());
            }
            return Some(start..end);
        }
    }
    None
}

fn prefix_matches_ci(haystack: &str, needle: &str) -> bool {
    let mut h = haystack.chars().flat_map(char::to_lowercase);
    let mut n = needle.chars().flat_map(char::to_lowercase);
    loop {
        match (n.next(), h.next()) {
            (None, _) => return true,
            (Some(_), None) => return false,
            (Some(a), Some(b)) if a == b => continue,
            _ => return false,
        }
    }
}

pub fn name_matches(haystack: &str, needle: &str) -> bool {
    find_match_range(haystack, needle).is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Inactive,
    Active,
    /// Query cleared; pill fading out.
    Closing,
}

/// The search-mode state machine plus pill animation timing.
#[derive(Debug)]
pub struct SearchController {
    phase: Phase,
    query: String,
    opened_at: Instant,
    last_typed: Instant,
    closed_at: Instant,
}

impl Default for SearchController {
    fn default() -> Self {
        let epoch = Instant::now();
        Self {
            phase: Phase::Inactive,
            query: String::new(),
            opened_at: epoch,
            last_typed: epoch,
            closed_at: epoch,
        }
    }
}

impl SearchController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn begin(&mut self, now: Instant) {
        self.phase = Phase::Active;
        self.query.clear();
        self.opened_at = now;
        self.last_typed = now;
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        debug_assert!(self.is_active());
        self.query.push(c);
        self.last_typed = now;
    }

    /// Backspace inside search mode. Returns false when the query was
    /// already empty (callers keep the mode open regardless).
    pub fn pop_char(&mut self, now: Instant) -> bool {
        self.last_typed = now;
        self.query.pop().is_some()
    }

    /// Revert the most recent `push_char` (no match anywhere).
    pub fn revert_char(&mut self) {
        self.query.pop();
    }

    pub fn close(&mut self, now: Instant) {
        if self.phase == Phase::Active {
            self.phase = Phase::Closing;
            self.closed_at = now;
            self.query.clear();
        }
    }

    /// Pill visibility 0..=1 with the 220 ms fade on both edges.
    pub fn visibility(&self, now: Instant) -> f32 {
        match self.phase {
            Phase::Inactive => 0.0,
            Phase::Active => {
                (now.saturating_duration_since(self.opened_at).as_secs_f32()
                    / PILL_FADE.as_secs_f32())
                .min(1.0)
            }
            Phase::Closing => {
                let gone = now.saturating_duration_since(self.closed_at).as_secs_f32()
                    / PILL_FADE.as_secs_f32();
                (1.0 - gone).max(0.0)
            }
        }
    }

    /// Typing pulse 1 → 0 over 260 ms from the last keystroke.
    pub fn pulse(&self, now: Instant) -> f32 {
        if self.phase != Phase::Active {
            return 0.0;
        }
        let since = now.saturating_duration_since(self.last_typed).as_secs_f32();
        (1.0 - since / PILL_PULSE.as_secs_f32()).max(0.0)
    }

    /// True while the pill still needs animation ticks.
    pub fn needs_ticks(&self, now: Instant) -> bool {
        match self.phase {
            Phase::Inactive => false,
            Phase::Active => {
                self.visibility(now) < 1.0 || self.pulse(now) > 0.0
            }
            Phase::Closing => self.visibility(now) > 0.0,
        }
    }

    /// Closing pills that fully faded drop back to inactive.
    pub fn settle(&mut self, now: Instant) {
        if self.phase == Phase::Closing && self.visibility(now) <= 0.0 {
            self.phase = Phase::Inactive;
        }
    }
}

/// Cyclic forward scan beginning at `start` (inclusive).
pub fn find_forward<F>(count: usize, start: usize, matches: F) -> Option<usize>
where
    F: Fn(usize) -> bool,
{
    if count == 0 {
        return None;
    }
    (0..count).map(|step| (start + step) % count).find(|&i| matches(i))
}

/// Cyclic backward scan beginning at `start` (inclusive).
pub fn find_backward<F>(count: usize, start: usize, matches: F) -> Option<usize>
where
    F: Fn(usize) -> bool,
{
    if count == 0 {
        return None;
    }
    (0..count)
        .map(|step| (start + count - step % count) % count)
        .find(|&i| matches(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_range_ascii() {
        assert_eq!(find_match_range("report.txt", "port"), Some(2..6));
        assert_eq!(find_match_range("Report.TXT", "report"), Some(0..6));
        assert_eq!(find_match_range("abc", "zz"), None);
        assert_eq!(find_match_range("abc", ""), None);
    }

    #[test]
    fn match_range_multibyte() {
        // 'ä' is two bytes; the range must land on char boundaries.
        let r = find_match_range("wärme.txt", "ÄRME").unwrap();
        assert_eq!(&"wärme.txt"[r], "ärme");
    }

    #[test]
    fn cyclic_scans_wrap() {
        let names = ["abc", "Abd", "zzz"];
        let has_a = |i: usize| name_matches(names[i], "a");
        assert_eq!(find_forward(3, 2, has_a), Some(0)); // wraps past end
        assert_eq!(find_backward(3, 0, has_a), Some(0)); // inclusive start
        assert_eq!(find_backward(3, 2, has_a), Some(1));
        assert_eq!(find_forward(0, 0, |_| true), None);
    }

    #[test]
    fn pill_fade_and_pulse() {
        let t0 = Instant::now();
        let mut s = SearchController::new();
        assert_eq!(s.visibility(t0), 0.0);
        s.begin(t0);
        s.push_char('a', t0);
        assert!(s.visibility(t0 + Duration::from_millis(110)) < 1.0);
        assert_eq!(s.visibility(t0 + Duration::from_millis(400)), 1.0);
        assert!(s.pulse(t0 + Duration::from_millis(100)) > 0.0);
        assert_eq!(s.pulse(t0 + Duration::from_millis(300)), 0.0);

        s.close(t0 + Duration::from_millis(500));
        assert!(s.visibility(t0 + Duration::from_millis(600)) < 1.0);
        assert_eq!(s.visibility(t0 + Duration::from_millis(800)), 0.0);
        assert!(s.needs_ticks(t0 + Duration::from_millis(600)));
        s.settle(t0 + Duration::from_millis(800));
        assert!(!s.needs_ticks(t0 + Duration::from_millis(900)));
        assert!(!s.is_active());
    }
}
