//! Waveform geometry
//!
//! Turns a time-domain snapshot into the polyline drawn for one frame.

/// Byte value of a zero-amplitude sample in the time-domain buffer
pub const SILENCE: u8 = 128;

/// Default analysis window, in samples
pub const DEFAULT_WINDOW: usize = 2048;

/// Snapshot of the live time-domain buffer, one unsigned byte per sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveformFrame {
    samples: Vec<u8>,
}

impl WaveformFrame {
    pub fn new(samples: Vec<u8>) -> Self {
        Self { samples }
    }

    /// A frame of `len` silent samples
    pub fn silent(len: usize) -> Self {
        Self::new(vec![SILENCE; len])
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Polyline for a canvas of `width` x `height`.
    ///
    /// Points are spaced evenly across the width; each byte maps to
    /// `y = (b / 128) * height / 2`, so silence sits on the centre line.
    /// A closing point at `(width, height / 2)` ends every trace.
    pub fn trace(&self, width: f32, height: f32, style: TraceStyle) -> WaveformTrace {
        let mut points = Vec::with_capacity(self.samples.len() + 1);
        if !self.samples.is_empty() {
            let slice_width = width / self.samples.len() as f32;
            for (i, &b) in self.samples.iter().enumerate() {
                let v = f32::from(b) / 128.0;
                points.push(Point {
                    x: i as f32 * slice_width,
                    y: (v * height) / 2.0,
                });
            }
        }
        points.push(Point {
            x: width,
            y: height / 2.0,
        });

        WaveformTrace {
            points,
            width,
            height,
            style,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Fixed stroke used for the live trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceStyle {
    pub color: &'static str,
    pub line_width: f32,
}

impl Default for TraceStyle {
    fn default() -> Self {
        Self {
            color: "#22c55e",
            line_width: 2.0,
        }
    }
}

/// One frame's worth of drawing: clear the canvas, then stroke `points`.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformTrace {
    pub points: Vec<Point>,
    pub width: f32,
    pub height: f32,
    pub style: TraceStyle,
}
