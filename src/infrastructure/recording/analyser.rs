//! Rolling time-domain window fed by the capture callback

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::application::ports::TimeDomainSource;
use crate::domain::waveform::{WaveformFrame, SILENCE};

/// Keeps the most recent `window` samples as unsigned bytes.
///
/// Byte value is `128 * (1 + s)` clamped to `0..=255`, so silence is 128.
pub struct TimeDomainAnalyser {
    window: usize,
    ring: Mutex<VecDeque<u8>>,
}

impl TimeDomainAnalyser {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            ring: Mutex::new(std::iter::repeat(SILENCE).take(window).collect()),
        }
    }

    /// Append freshly captured samples, evicting the oldest
    pub fn push(&self, samples: &[f32]) {
        let mut ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        let skip = samples.len().saturating_sub(self.window);
        for &s in &samples[skip..] {
            if ring.len() == self.window {
                ring.pop_front();
            }
            ring.push_back(sample_to_byte(s));
        }
    }
}

impl TimeDomainSource for TimeDomainAnalyser {
    fn snapshot(&self) -> WaveformFrame {
        let ring = self.ring.lock().unwrap_or_else(|e| e.into_inner());
        WaveformFrame::new(ring.iter().copied().collect())
    }
}

fn sample_to_byte(sample: f32) -> u8 {
    if sample.is_nan() {
        return SILENCE;
    }
    (128.0 * (1.0 + sample)).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::waveform::DEFAULT_WINDOW;

    #[test]
    fn starts_silent() {
        let analyser = TimeDomainAnalyser::new(DEFAULT_WINDOW);
        let frame = analyser.snapshot();
        assert_eq!(frame.len(), DEFAULT_WINDOW);
        assert!(frame.samples().iter().all(|&b| b == SILENCE));
    }

    #[test]
    fn maps_amplitude_to_bytes() {
        assert_eq!(sample_to_byte(0.0), 128);
        assert_eq!(sample_to_byte(1.0), 255);
        assert_eq!(sample_to_byte(-1.0), 0);
        assert_eq!(sample_to_byte(0.5), 192);
        assert_eq!(sample_to_byte(f32::NAN), 128);
    }

    #[test]
    fn keeps_latest_window() {
        let analyser = TimeDomainAnalyser::new(4);
        analyser.push(&[-1.0, -1.0]);
        analyser.push(&[0.5, 1.0, 0.0]);
        assert_eq!(analyser.snapshot().samples(), &[0, 192, 255, 128]);

        analyser.push(&[1.0; 10]);
        assert_eq!(analyser.snapshot().samples(), &[255; 4]);
    }
}
