//! # Choreography
//!
//! A choreography plays an ordered list of trajectories one after the other, each for a fixed
//! length of time, as a single finite trajectory.
//!
//! Each segment's trajectory is sampled with the time elapsed since the segment's start, and
//! anchors on the first of those times it sees. The first query that lands in a later segment
//! fixes that segment's time zero but still reports the segment being left, frozen at its end.
//! Later queries in the new segment then see it from its own start. Once a segment has been
//! entered its anchor is never rewound, so callers should query with increasing times.
//!
//! After the last segment's duration the choreography freezes on the last segment's final value,
//! which is the last segment's trajectory at the end of its own duration even if the segment was
//! entered late.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;

use log::debug;

use super::{check_duration, FiniteTrajectory4d, TimeAnchor, TrajError, Trajectory4d};
use crate::geom::{InertialFrameVelocity, Pose};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A sequence of timed trajectory segments played as one trajectory.
pub struct Choreography {
    anchor: TimeAnchor,
    segments: Vec<Segment>,

    /// Start of each segment relative to the choreography's time zero
    start_offsets_s: Vec<f64>,

    duration_s: f64,

    /// Segment-relative time at which each segment's trajectory was anchored
    entries_s: Vec<Option<f64>>,

    /// Index of the latest segment entered
    active: usize,
}

/// Builds a [`Choreography`] segment by segment.
#[derive(Default)]
pub struct ChoreographyBuilder {
    segments: Vec<Segment>,
}

/// A trajectory waiting for its duration, see [`ChoreographyBuilder::with_trajectory`].
pub struct SegmentBuilder {
    parent: ChoreographyBuilder,
    traj: Box<dyn Trajectory4d>,
}

struct Segment {
    traj: Box<dyn Trajectory4d>,
    duration_s: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Choreography {
    pub fn builder() -> ChoreographyBuilder {
        ChoreographyBuilder::default()
    }

    /// Number of segments in the choreography.
    pub fn num_segments(&self) -> usize {
        self.segments.len()
    }

    /// Find the segment containing the given choreography-relative time.
    ///
    /// Times before the start map onto the first segment and times after the end onto the last.
    fn locate(&self, rel_s: f64) -> usize {
        self.start_offsets_s
            .iter()
            .rposition(|start_s| *start_s <= rel_s)
            .unwrap_or(0)
    }

    /// Segment-relative time at which the segment's own trajectory reaches its end.
    fn final_rel_s(&self, index: usize) -> f64 {
        self.entries_s[index].unwrap_or(0.0) + self.segments[index].duration_s
    }

    /// Sample the segment active at `time_s` using `sample`.
    fn sample_with<T, F>(&mut self, time_s: f64, sample: F) -> T
    where
        F: Fn(&mut dyn Trajectory4d, f64) -> T,
    {
        let rel_s = self.anchor.relative(time_s);
        let index = self.locate(rel_s);

        if index > self.active {
            let left = self.active;
            let entry_s = rel_s - self.start_offsets_s[index];

            debug!(
                "Choreography moving from segment {} to {} at {:.3} s",
                left, index, rel_s
            );

            // Fix the new segment's time zero to this instant
            self.segments[index].traj.position(entry_s);
            self.entries_s[index] = Some(entry_s);
            self.active = index;

            let left_end_s = self.final_rel_s(left);
            return sample(self.segments[left].traj.as_mut(), left_end_s);
        }

        let seg_rel_s = rel_s - self.start_offsets_s[index];
        if self.entries_s[index].is_none() {
            self.entries_s[index] = Some(seg_rel_s);
        }

        // Past the end, and never beyond its own duration, a segment is held at its final value
        let seg_rel_s = if rel_s >= self.duration_s {
            self.final_rel_s(index)
        } else {
            seg_rel_s.min(self.final_rel_s(index))
        };

        sample(self.segments[index].traj.as_mut(), seg_rel_s)
    }
}

impl Trajectory4d for Choreography {
    fn position(&mut self, time_s: f64) -> Pose {
        self.sample_with(time_s, |traj, t| traj.position(t))
    }

    fn velocity(&mut self, time_s: f64) -> InertialFrameVelocity {
        self.sample_with(time_s, |traj, t| traj.velocity(t))
    }

    fn state(&mut self, time_s: f64) -> (Pose, InertialFrameVelocity) {
        self.sample_with(time_s, |traj, t| traj.state(t))
    }
}

impl FiniteTrajectory4d for Choreography {
    fn duration_s(&self) -> f64 {
        self.duration_s
    }
}

impl fmt::Debug for Choreography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choreography")
            .field("anchor", &self.anchor)
            .field("start_offsets_s", &self.start_offsets_s)
            .field("duration_s", &self.duration_s)
            .field("entries_s", &self.entries_s)
            .field("active", &self.active)
            .finish()
    }
}

impl ChoreographyBuilder {
    /// Add a trajectory, its duration is given by [`SegmentBuilder::for_time`].
    pub fn with_trajectory<T>(self, traj: T) -> SegmentBuilder
    where
        T: Trajectory4d + 'static,
    {
        SegmentBuilder {
            parent: self,
            traj: Box::new(traj),
        }
    }

    /// Add a finite trajectory for its own duration.
    pub fn with_finite<T>(mut self, traj: T) -> Self
    where
        T: FiniteTrajectory4d + 'static,
    {
        let duration_s = traj.duration_s();
        self.segments.push(Segment {
            traj: Box::new(traj),
            duration_s,
        });
        self
    }

    /// Build the choreography.
    ///
    /// Fails if there are no segments or if any segment's duration is not positive.
    pub fn build(self) -> Result<Choreography, TrajError> {
        if self.segments.is_empty() {
            return Err(TrajError::EmptyChoreography);
        }

        let mut start_offsets_s = Vec::with_capacity(self.segments.len());
        let mut duration_s = 0.0;
        for seg in &self.segments {
            check_duration(seg.duration_s)?;
            start_offsets_s.push(duration_s);
            duration_s += seg.duration_s;
        }

        Ok(Choreography {
            anchor: TimeAnchor::default(),
            entries_s: vec![None; self.segments.len()],
            segments: self.segments,
            start_offsets_s,
            duration_s,
            active: 0,
        })
    }
}

impl SegmentBuilder {
    /// Play the trajectory for the given number of seconds.
    pub fn for_time(mut self, duration_s: f64) -> ChoreographyBuilder {
        self.parent.segments.push(Segment {
            traj: self.traj,
            duration_s,
        });
        self.parent
    }
}
