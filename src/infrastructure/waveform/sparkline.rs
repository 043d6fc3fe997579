//! Terminal waveform sinks

use std::sync::{Mutex, MutexGuard};

use crate::application::ports::WaveformSink;
use crate::domain::waveform::WaveformTrace;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Renders each trace as a one-line block-character sparkline.
///
/// Each column shows the peak distance from the centre line among the
/// points that fall into it. Only the latest line is kept.
pub struct SparklineSink {
    columns: usize,
    line: Mutex<String>,
}

impl SparklineSink {
    pub fn new(columns: usize) -> Self {
        let columns = columns.max(1);
        Self {
            columns,
            line: Mutex::new(LEVELS[0].to_string().repeat(columns)),
        }
    }

    /// Most recently rendered line
    pub fn line(&self) -> String {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, String> {
        self.line.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn sparkline(&self, trace: &WaveformTrace) -> String {
        let centre = trace.height / 2.0;
        let mut peaks = vec![0.0f32; self.columns];
        if trace.width > 0.0 && centre > 0.0 {
            for point in &trace.points {
                let col = ((point.x / trace.width) * self.columns as f32) as usize;
                let col = col.min(self.columns - 1);
                let level = ((point.y - centre).abs() / centre).min(1.0);
                peaks[col] = peaks[col].max(level);
            }
        }

        peaks
            .iter()
            .map(|&p| {
                let idx = (p * (LEVELS.len() - 1) as f32).round() as usize;
                LEVELS[idx.min(LEVELS.len() - 1)]
            })
            .collect()
    }
}

impl WaveformSink for SparklineSink {
    fn render(&self, trace: &WaveformTrace) {
        let line = self.sparkline(trace);
        *self.lock() = line;
    }
}

/// Sink that discards every frame
pub struct NoOpWaveformSink;

impl WaveformSink for NoOpWaveformSink {
    fn render(&self, _trace: &WaveformTrace) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::waveform::{TraceStyle, WaveformFrame};

    #[test]
    fn silence_is_flat() {
        let sink = SparklineSink::new(8);
        sink.render(&WaveformFrame::silent(64).trace(100.0, 40.0, TraceStyle::default()));
        assert_eq!(sink.line(), "▁".repeat(8));
    }

    #[test]
    fn full_scale_is_tallest() {
        let sink = SparklineSink::new(4);
        let frame = WaveformFrame::new(vec![255; 64]);
        sink.render(&frame.trace(100.0, 40.0, TraceStyle::default()));
        assert_eq!(sink.line(), "█".repeat(4));
    }

    #[test]
    fn burst_shows_in_its_column() {
        let sink = SparklineSink::new(4);
        let mut samples = vec![128u8; 64];
        samples[0..16].fill(0);
        sink.render(&WaveformFrame::new(samples).trace(100.0, 40.0, TraceStyle::default()));
        assert_eq!(sink.line(), "█▁▁▁");
    }
}
