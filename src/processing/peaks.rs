// src/processing/peaks.rs
//! Sliding-window local-maximum peak detection.

/// A detected heartbeat peak.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Sample index within the analyzed window.
    pub index: usize,
    /// Sample timestamp in microseconds, filled in by the session.
    pub timestamp_us: u64,
    /// Filtered amplitude at the peak.
    pub amplitude: f64,
}

/// Windowed local-maximum peak detector.
#[derive(Debug, Clone, Copy)]
pub struct PeakDetector {
    window_radius: usize,
    threshold: f64,
}

impl PeakDetector {
    /// Build a detector with the given half-window and amplitude threshold.
    pub fn new(window_radius: usize, threshold: f64) -> Self {
        Self {
            window_radius,
            threshold,
        }
    }

    /// Detect peaks, returning indices in ascending order.
    ///
    /// Index `i` is a peak iff `signal[i]` equals the maximum over the closed
    /// window `[i - r, i + r]` and `signal[i] > threshold`. Indices within
    /// `r` of either boundary are never evaluated. If several samples in a
    /// window tie for the maximum, each qualifying index is emitted; ties
    /// therefore appear in first-occurrence (ascending) order.
    pub fn detect(&self, signal: &[f64]) -> Vec<usize> {
        let r = self.window_radius;
        if signal.len() < 2 * r + 1 {
            return Vec::new();
        }

        let mut peaks = Vec::new();
        for i in r..signal.len() - r {
            let value = signal[i];
            if value <= self.threshold {
                continue;
            }
            let window_max = signal[i - r..=i + r]
                .iter()
                .fold(f64::NEG_INFINITY, |m, &x| m.max(x));
            if value == window_max {
                peaks.push(i);
            }
        }
        peaks
    }

    /// Half-window in samples.
    pub fn window_radius(&self) -> usize {
        self.window_radius
    }

    /// Amplitude threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_signal_peaks() {
        let detector = PeakDetector::new(1, 0.0);
        let signal = [0.0, 1.0, 5.0, 3.0, 1.0, 4.0, 2.0];
        assert_eq!(detector.detect(&signal), vec![2, 5]);
    }

    #[test]
    fn test_edges_excluded() {
        let detector = PeakDetector::new(2, 0.0);
        // Global max sits at index 1, inside the excluded edge region.
        let signal = [1.0, 9.0, 2.0, 3.0, 5.0, 3.0, 1.0];
        let peaks = detector.detect(&signal);
        for &i in &peaks {
            assert!(i >= 2 && i < signal.len() - 2);
        }
        assert_eq!(peaks, vec![4]);
    }

    #[test]
    fn test_all_below_threshold_yields_empty() {
        let detector = PeakDetector::new(1, 10.0);
        assert!(detector.detect(&[1.0, 2.0, 1.0, 3.0, 1.0]).is_empty());
    }

    #[test]
    fn test_threshold_is_strict() {
        let detector = PeakDetector::new(1, 5.0);
        assert!(detector.detect(&[0.0, 5.0, 0.0]).is_empty());
        assert_eq!(detector.detect(&[0.0, 5.1, 0.0]), vec![1]);
    }

    #[test]
    fn test_plateau_emits_every_tied_index() {
        let detector = PeakDetector::new(1, 0.0);
        // Indices 2 and 3 both equal their window maxima.
        let signal = [0.0, 1.0, 4.0, 4.0, 1.0, 0.0];
        assert_eq!(detector.detect(&signal), vec![2, 3]);
    }

    #[test]
    fn test_short_signal_yields_empty() {
        let detector = PeakDetector::new(3, 0.0);
        assert!(detector.detect(&[1.0, 2.0, 3.0]).is_empty());
    }
}
