//! Fixed-capacity newest-first sample buffer.

use std::collections::VecDeque;

use crate::sample::GazeSample;

/// Number of samples kept for motion estimation.
pub const HISTORY_LEN: usize = 3;

/// The last [`HISTORY_LEN`] samples, newest at index 0.
///
/// Pushing into a full history evicts the oldest sample.
#[derive(Debug, Clone, Default)]
pub struct ShortHistory {
    samples: VecDeque<GazeSample>,
}

impl ShortHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    /// Push a sample as the newest entry.
    pub fn push(&mut self, sample: GazeSample) {
        if self.samples.len() == HISTORY_LEN {
            self.samples.pop_back();
        }
        self.samples.push_front(sample);
    }

    /// Sample at `index`, where 0 is the newest.
    pub fn get(&self, index: usize) -> Option<&GazeSample> {
        self.samples.get(index)
    }

    pub fn latest(&self) -> Option<&GazeSample> {
        self.samples.front()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == HISTORY_LEN
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &GazeSample> {
        self.samples.iter()
    }

    /// `[newest, middle, oldest]` once the history is full.
    pub fn triple(&self) -> Option<[GazeSample; HISTORY_LEN]> {
        match (self.samples.front(), self.samples.get(1), self.samples.get(2)) {
            (Some(s0), Some(s1), Some(s2)) => Some([*s0, *s1, *s2]),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_first_and_eviction() {
        let mut history = ShortHistory::new();
        for t in 0..5 {
            history.push(GazeSample::at(t as f64, 0.0, t));
        }

        assert!(history.is_full());
        assert_eq!(history.len(), HISTORY_LEN);
        let times: Vec<u32> = history.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(times, vec![4, 3, 2]);
        assert_eq!(history.latest().map(|s| s.timestamp_ms), Some(4));
        assert_eq!(history.get(2).map(|s| s.timestamp_ms), Some(2));
        assert!(history.get(3).is_none());
    }

    #[test]
    fn test_triple_requires_full_history() {
        let mut history = ShortHistory::new();
        history.push(GazeSample::at(0.0, 0.0, 0));
        history.push(GazeSample::at(1.0, 0.0, 1));
        assert!(history.triple().is_none());

        history.push(GazeSample::at(3.0, 0.0, 2));
        let [s0, s1, s2] = history.triple().unwrap();
        assert_eq!((s0.timestamp_ms, s1.timestamp_ms, s2.timestamp_ms), (2, 1, 0));
    }

    #[test]
    fn test_clear() {
        let mut history = ShortHistory::new();
        history.push(GazeSample::at(0.0, 0.0, 0));
        history.clear();
        assert!(history.is_empty());
        assert!(history.latest().is_none());
    }
}
