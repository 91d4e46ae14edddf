//! Recorded pointer traces
//!
//! A trace is a JSON document of timestamped pointer samples:
//!
//! ```json
//! { "viewport": { "width": 1280, "height": 800 },
//!   "scroll_y": 0,
//!   "samples": [ { "t": 0.0, "x": 10, "y": 20 }, { "t": 0.016, "x": 12, "y": 21 } ] }
//! ```
//!
//! Replaying publishes each sample to the [`PointerHub`] once the frame clock
//! passes its timestamp, then advances the [`Scene`] one frame.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::{Point, Viewport};
use crate::pointer::PointerHub;
use crate::scene::{FrameSnapshot, Scene};

/// Longest trace accepted for replay (seconds)
pub const MAX_TRACE_SECS: f64 = 3600.0;

/// Longest settle time after the last sample (seconds)
pub const MAX_TAIL_SECS: f64 = 60.0;

/// Errors loading a trace
#[derive(Debug, Error)]
pub enum TraceError {
    /// File could not be read
    #[error("failed to read trace {path}: {source}")]
    Io {
        /// Trace path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not a valid trace document
    #[error("failed to parse trace: {0}")]
    Parse(#[from] serde_json::Error),

    /// Timestamps go backwards
    #[error("sample {index} at t={t} is earlier than the previous sample")]
    OutOfOrder {
        /// Index of the offending sample
        index: usize,
        /// Its timestamp
        t: f64,
    },

    /// A timestamp is negative, NaN or infinite
    #[error("sample {index} has invalid timestamp t={t}")]
    InvalidTimestamp {
        /// Index of the offending sample
        index: usize,
        /// Its timestamp
        t: f64,
    },

    /// The trace runs longer than a replay may
    #[error("trace lasts {duration_secs}s, longer than the {limit_secs}s limit")]
    TooLong {
        /// Duration requested (samples plus tail)
        duration_secs: f64,
        /// Accepted maximum
        limit_secs: f64,
    },

    /// Settle time is negative, NaN or too large
    #[error("tail of {0}s is outside 0..={max}s", max = MAX_TAIL_SECS)]
    InvalidTail(f64),
}

/// One recorded pointer position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    /// Seconds since the start of the recording
    pub t: f64,
    /// Viewport x
    pub x: f32,
    /// Viewport y
    pub y: f32,
}

impl TraceSample {
    /// Sample position
    pub fn point(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A recorded pointer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerTrace {
    /// Viewport the trace was recorded in
    #[serde(default)]
    pub viewport: Option<Viewport>,

    /// Page scroll offset during the recording
    #[serde(default)]
    pub scroll_y: f32,

    /// Samples in time order
    pub samples: Vec<TraceSample>,
}

impl PointerTrace {
    /// Build a trace from samples
    pub fn new(samples: Vec<TraceSample>) -> Self {
        Self {
            viewport: None,
            scroll_y: 0.0,
            samples,
        }
    }

    /// Evenly spaced samples along a straight line, `count` samples `interval`
    /// seconds apart
    pub fn linear(from: Point, to: Point, count: usize, interval: f64) -> Self {
        let steps = count.saturating_sub(1).max(1) as f32;
        let samples = (0..count)
            .map(|i| {
                let f = i as f32 / steps;
                TraceSample {
                    t: i as f64 * interval,
                    x: from.x + (to.x - from.x) * f,
                    y: from.y + (to.y - from.y) * f,
                }
            })
            .collect();
        Self::new(samples)
    }

    /// Parse a JSON trace
    pub fn from_json(json: &str) -> Result<Self, TraceError> {
        let trace: Self = serde_json::from_str(json)?;
        trace.validate()?;
        Ok(trace)
    }

    /// Load a JSON trace from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| TraceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let trace = Self::from_json(&json)?;
        info!("Loaded trace {} ({} samples)", path.display(), trace.samples.len());
        Ok(trace)
    }

    /// Timestamp of the last sample
    pub fn duration_secs(&self) -> f64 {
        self.samples.last().map_or(0.0, |s| s.t)
    }

    /// Check timestamps are finite, ordered and within [`MAX_TRACE_SECS`]
    pub fn validate(&self) -> Result<(), TraceError> {
        if let Some((index, sample)) = self
            .samples
            .iter()
            .enumerate()
            .find(|(_, s)| !s.t.is_finite() || s.t < 0.0)
        {
            return Err(TraceError::InvalidTimestamp { index, t: sample.t });
        }
        for (index, pair) in self.samples.windows(2).enumerate() {
            if pair[1].t < pair[0].t {
                return Err(TraceError::OutOfOrder {
                    index: index + 1,
                    t: pair[1].t,
                });
            }
        }
        let duration_secs = self.duration_secs();
        if duration_secs > MAX_TRACE_SECS {
            return Err(TraceError::TooLong {
                duration_secs,
                limit_secs: MAX_TRACE_SECS,
            });
        }
        Ok(())
    }
}

/// How a trace is replayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayOptions {
    /// Frames per second
    pub refresh_hz: u32,
    /// Extra seconds simulated after the last sample so springs settle
    pub tail_secs: f64,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            refresh_hz: 60,
            tail_secs: 0.5,
        }
    }
}

impl ReplayOptions {
    fn frame_secs(&self) -> f64 {
        1.0 / f64::from(self.refresh_hz.max(1))
    }

    /// Frames needed to cover `trace` plus the tail, including the frame at t=0
    pub fn frame_count(&self, trace: &PointerTrace) -> Result<u64, TraceError> {
        if !(0.0..=MAX_TAIL_SECS).contains(&self.tail_secs) {
            return Err(TraceError::InvalidTail(self.tail_secs));
        }
        trace.validate()?;

        let total = trace.duration_secs() + self.tail_secs;
        let too_long = || TraceError::TooLong {
            duration_secs: total,
            limit_secs: MAX_TRACE_SECS + MAX_TAIL_SECS,
        };
        let steps = (total / self.frame_secs()).ceil();
        if !steps.is_finite() || steps >= u32::MAX as f64 {
            return Err(too_long());
        }
        (steps as u64).checked_add(1).ok_or_else(too_long)
    }
}

struct Feeder<'a> {
    samples: &'a [TraceSample],
    next: usize,
}

impl Feeder<'_> {
    fn publish_until(&mut self, hub: &PointerHub, now: f64) {
        while let Some(sample) = self.samples.get(self.next) {
            if sample.t > now {
                break;
            }
            hub.publish(sample.point());
            self.next += 1;
        }
    }
}

/// Replay `trace` as fast as possible, returning every frame
pub fn replay(
    scene: &mut Scene,
    hub: &PointerHub,
    trace: &PointerTrace,
    options: ReplayOptions,
) -> Result<Vec<FrameSnapshot>, TraceError> {
    let dt = options.frame_secs();
    let frames = options.frame_count(trace)?;
    debug!("Replaying {} samples over {} frames", trace.samples.len(), frames);

    let mut feeder = Feeder {
        samples: &trace.samples,
        next: 0,
    };

    Ok((0..frames)
        .map(|i| {
            feeder.publish_until(hub, i as f64 * dt);
            scene.advance(dt as f32)
        })
        .collect())
}

/// Replay `trace` paced by a real-time frame clock, handing each frame to
/// `on_frame` as it is produced
pub async fn replay_realtime<F>(
    scene: &mut Scene,
    hub: &PointerHub,
    trace: &PointerTrace,
    options: ReplayOptions,
    mut on_frame: F,
) -> Result<u64, TraceError>
where
    F: FnMut(FrameSnapshot),
{
    let dt = options.frame_secs();
    let frames = options.frame_count(trace)?;
    let mut interval = tokio::time::interval(Duration::from_secs_f64(dt));
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    info!("Real-time replay at {} Hz ({} frames)", options.refresh_hz, frames);

    let mut feeder = Feeder {
        samples: &trace.samples,
        next: 0,
    };

    for i in 0..frames {
        interval.tick().await;
        feeder.publish_until(hub, i as f64 * dt);
        on_frame(scene.advance(dt as f32));
    }
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trace() {
        let trace = PointerTrace::from_json(
            r#"{ "samples": [ { "t": 0.0, "x": 1, "y": 2 }, { "t": 0.5, "x": 3, "y": 4 } ] }"#,
        )
        .unwrap();
        assert_eq!(trace.samples.len(), 2);
        assert_eq!(trace.duration_secs(), 0.5);
        assert_eq!(trace.viewport, None);
    }

    #[test]
    fn test_rejects_out_of_order() {
        let err = PointerTrace::from_json(
            r#"{ "samples": [ { "t": 1.0, "x": 0, "y": 0 }, { "t": 0.5, "x": 0, "y": 0 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TraceError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn test_linear_endpoints() {
        let trace = PointerTrace::linear(Point::new(0.0, 0.0), Point::new(500.0, 500.0), 10, 0.05);
        assert_eq!(trace.samples.len(), 10);
        assert_eq!(trace.samples[0].point(), Point::new(0.0, 0.0));
        assert_eq!(trace.samples[9].point(), Point::new(500.0, 500.0));
        assert!((trace.duration_secs() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_frame_count_covers_tail() {
        let trace = PointerTrace::linear(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 2, 1.0);
        let options = ReplayOptions {
            refresh_hz: 4,
            tail_secs: 0.5,
        };
        // 1.5 s at 4 Hz, plus the frame at t=0
        assert_eq!(options.frame_count(&trace).unwrap(), 7);
    }

    #[test]
    fn test_rejects_overlong_trace() {
        let err = PointerTrace::from_json(
            r#"{ "samples": [ { "t": 0.0, "x": 0, "y": 0 }, { "t": 1e19, "x": 5, "y": 5 } ] }"#,
        )
        .unwrap_err();
        assert!(matches!(err, TraceError::TooLong { .. }));
    }

    #[test]
    fn test_replay_refuses_overlong_trace_built_in_code() {
        let trace = PointerTrace::new(vec![
            TraceSample { t: 0.0, x: 0.0, y: 0.0 },
            TraceSample { t: 1e19, x: 5.0, y: 5.0 },
        ]);
        let hub = PointerHub::new();
        let layout = crate::layout::LayoutTree::new(crate::geometry::Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut scene = Scene::new(&hub, crate::scene::SceneSettings::default(), layout).unwrap();

        let err = replay(&mut scene, &hub, &trace, ReplayOptions::default()).unwrap_err();
        assert!(matches!(err, TraceError::TooLong { .. }));
        assert_eq!(scene.frame_count(), 0);
    }

    #[test]
    fn test_rejects_bad_timestamps_and_tail() {
        let err = PointerTrace::from_json(r#"{ "samples": [ { "t": -1.0, "x": 0, "y": 0 } ] }"#).unwrap_err();
        assert!(matches!(err, TraceError::InvalidTimestamp { index: 0, .. }));

        let trace = PointerTrace::linear(Point::new(0.0, 0.0), Point::new(1.0, 1.0), 2, 1.0);
        for tail_secs in [f64::NAN, f64::INFINITY, -1.0, MAX_TAIL_SECS + 1.0] {
            let options = ReplayOptions {
                refresh_hz: 60,
                tail_secs,
            };
            assert!(matches!(options.frame_count(&trace), Err(TraceError::InvalidTail(_))));
        }
    }
}
