//! Frame planning and playback

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use weldpath_core::{CoordinateTable, Point};

/// Errors reported by a frame sink
#[derive(Error, Debug)]
pub enum VisualizerError {
    /// Frame rate must be finite and positive
    #[error("frame rate must be > 0, got {0}")]
    InvalidFrameRate(f64),

    /// Unrecognized quality name
    #[error("unknown render quality '{0}' (expected 'draft', 'standard' or 'high')")]
    UnknownQuality(String),

    /// The sink could not accept a frame
    #[error("frame sink failed at frame {frame}: {message}")]
    Sink {
        /// Index of the rejected frame.
        frame: usize,
        /// Sink-specific description.
        message: String,
    },

    /// Output stream error
    #[error("frame output error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render quality requested from the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    /// Fast preview with coarse markers
    Draft,
    /// Default balance of speed and detail
    #[default]
    Standard,
    /// Full detail for final review
    High,
}

impl fmt::Display for RenderQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Standard => write!(f, "standard"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for RenderQuality {
    type Err = VisualizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "standard" => Ok(Self::Standard),
            "high" => Ok(Self::High),
            _ => Err(VisualizerError::UnknownQuality(s.to_string())),
        }
    }
}

/// Playback settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    /// Frames per second
    pub frame_rate: f64,
    /// Detail level passed through to the renderer
    pub quality: RenderQuality,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            frame_rate: 30.0,
            quality: RenderQuality::Standard,
        }
    }
}

impl RenderSettings {
    /// Create settings without validating them; see [`RenderSettings::validate`]
    pub fn new(frame_rate: f64, quality: RenderQuality) -> Self {
        Self {
            frame_rate,
            quality,
        }
    }

    /// Reject a frame rate that is zero, negative or not finite
    pub fn validate(&self) -> Result<(), VisualizerError> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(VisualizerError::InvalidFrameRate(self.frame_rate));
        }
        Ok(())
    }

    /// Presentation time of frame `index` in seconds
    pub fn timestamp(&self, index: usize) -> f64 {
        index as f64 / self.frame_rate
    }
}

/// One drawing step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameEvent {
    /// Marker at the point a deposition move leaves from
    StartMarker {
        /// Weld line the marker belongs to.
        line_index: u32,
        /// Departure point.
        point: Point,
    },
    /// Marker at the point a deposition move arrives at
    EndMarker {
        /// Weld line the marker belongs to.
        line_index: u32,
        /// Arrival point.
        point: Point,
    },
    /// The deposited segment between the two markers
    Segment {
        /// Weld line the segment belongs to.
        line_index: u32,
        /// Segment start.
        from: Point,
        /// Segment end.
        to: Point,
    },
}

impl FrameEvent {
    /// Weld line this event draws
    pub fn line_index(&self) -> u32 {
        match self {
            Self::StartMarker { line_index, .. }
            | Self::EndMarker { line_index, .. }
            | Self::Segment { line_index, .. } => *line_index,
        }
    }
}

/// A frame handed to a sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Position in the frame plan, from 0
    pub index: usize,
    /// Seconds since the start of playback
    pub timestamp: f64,
    /// What this frame draws
    pub event: FrameEvent,
}

/// Build the ordered event list for a table
///
/// Lines are visited in first-appearance order. For every consecutive pair of
/// points the plan holds a start marker, an end marker and the connecting
/// segment, in that order. A single-point line contributes only its start
/// marker.
pub fn frame_plan(table: &CoordinateTable) -> Vec<FrameEvent> {
    let mut events = Vec::with_capacity(table.len() * 3);

    for line in table.lines() {
        let index = line.line_index;
        if let [only] = line.points.as_slice() {
            events.push(FrameEvent::StartMarker {
                line_index: index,
                point: *only,
            });
            continue;
        }
        for pair in line.points.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            events.push(FrameEvent::StartMarker {
                line_index: index,
                point: from,
            });
            events.push(FrameEvent::EndMarker {
                line_index: index,
                point: to,
            });
            events.push(FrameEvent::Segment {
                line_index: index,
                from,
                to,
            });
        }
    }

    debug!(
        "Planned {} frame(s) for {} point(s)",
        events.len(),
        table.len()
    );
    events
}

/// Receiver of rendered frames
pub trait FrameSink {
    /// Called once before the first frame
    fn begin(&mut self, _settings: &RenderSettings, _total_frames: usize) -> Result<(), VisualizerError> {
        Ok(())
    }

    /// Accept one frame
    fn frame(&mut self, frame: &Frame) -> Result<(), VisualizerError>;

    /// Called once after the last frame
    fn finish(&mut self) -> Result<(), VisualizerError> {
        Ok(())
    }
}

/// Outcome of a playback run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSummary {
    /// Number of frames delivered to the sink
    pub frames: usize,
    /// Playback length in seconds
    pub duration: f64,
    /// Settings the run used
    pub settings: RenderSettings,
}

/// Drive `sink` with the frame plan of `table`
pub fn play<S: FrameSink + ?Sized>(
    table: &CoordinateTable,
    sink: &mut S,
    settings: &RenderSettings,
) -> Result<PlaybackSummary, VisualizerError> {
    settings.validate()?;
    let plan = frame_plan(table);
    let frames = plan.len();

    sink.begin(settings, frames)?;
    for (index, event) in plan.into_iter().enumerate() {
        let frame = Frame {
            index,
            timestamp: settings.timestamp(index),
            event,
        };
        sink.frame(&frame)?;
    }
    sink.finish()?;

    let summary = PlaybackSummary {
        frames,
        duration: settings.timestamp(frames),
        settings: *settings,
    };
    info!(
        "Played {} frame(s) at {} fps ({} quality, {:.2}s)",
        summary.frames, settings.frame_rate, settings.quality, summary.duration
    );
    Ok(summary)
}

/// Sink that keeps every frame in memory
#[derive(Debug, Default, Clone)]
pub struct FrameRecorder {
    /// Frames in delivery order
    pub frames: Vec<Frame>,
    /// Settings received in `begin`, if playback started
    pub settings: Option<RenderSettings>,
    /// Set once `finish` has been called
    pub finished: bool,
}

impl FrameRecorder {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events without their timing
    pub fn events(&self) -> Vec<FrameEvent> {
        self.frames.iter().map(|f| f.event).collect()
    }
}

impl FrameSink for FrameRecorder {
    fn begin(&mut self, settings: &RenderSettings, total_frames: usize) -> Result<(), VisualizerError> {
        self.settings = Some(*settings);
        self.frames.reserve(total_frames);
        Ok(())
    }

    fn frame(&mut self, frame: &Frame) -> Result<(), VisualizerError> {
        self.frames.push(*frame);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VisualizerError> {
        self.finished = true;
        Ok(())
    }
}

/// Sink that writes one text line per frame
pub struct TextFrameSink<W: Write> {
    writer: W,
}

impl<W: Write> TextFrameSink<W> {
    /// Wrap `writer`; nothing is written until playback begins
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> FrameSink for TextFrameSink<W> {
    fn begin(&mut self, settings: &RenderSettings, total_frames: usize) -> Result<(), VisualizerError> {
        writeln!(
            self.writer,
            "# {} frame(s) at {} fps, {} quality",
            total_frames, settings.frame_rate, settings.quality
        )?;
        Ok(())
    }

    fn frame(&mut self, frame: &Frame) -> Result<(), VisualizerError> {
        let time = frame.timestamp;
        match frame.event {
            FrameEvent::StartMarker { line_index, point } => writeln!(
                self.writer,
                "{:>6} {:>9.3}s line {:>4} start   ({:.3}, {:.3}, {:.3})",
                frame.index, time, line_index, point.x, point.y, point.z
            )?,
            FrameEvent::EndMarker { line_index, point } => writeln!(
                self.writer,
                "{:>6} {:>9.3}s line {:>4} end     ({:.3}, {:.3}, {:.3})",
                frame.index, time, line_index, point.x, point.y, point.z
            )?,
            FrameEvent::Segment {
                line_index,
                from,
                to,
            } => writeln!(
                self.writer,
                "{:>6} {:>9.3}s line {:>4} segment ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})",
                frame.index, time, line_index, from.x, from.y, from.z, to.x, to.y, to.z
            )?,
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VisualizerError> {
        self.writer.flush()?;
        Ok(())
    }
}
