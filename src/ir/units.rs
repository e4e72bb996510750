//! Onset/offset units for segments.
//!
//! Vendor formats disagree on how they express time. Some store seconds,
//! some store sample indices, and a few store both (computed from one
//! sample rate). [`Bounds`] makes the unit coverage of a segment explicit,
//! so the generic-seq table is just a null-padded rendering of it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which unit pairs a segment (or a whole sequence) carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// Only `onset_s`/`offset_s`.
    Seconds,
    /// Only `onset_sample`/`offset_sample`.
    Samples,
    /// Both pairs, derived from a common sample rate.
    Both,
}

impl Units {
    /// Returns true if the seconds pair is present.
    #[inline]
    pub fn has_seconds(self) -> bool {
        matches!(self, Units::Seconds | Units::Both)
    }

    /// Returns true if the sample-index pair is present.
    #[inline]
    pub fn has_samples(self) -> bool {
        matches!(self, Units::Samples | Units::Both)
    }

    /// Short name used in messages and reports.
    pub fn name(self) -> &'static str {
        match self {
            Units::Seconds => "seconds",
            Units::Samples => "samples",
            Units::Both => "seconds+samples",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Onset and offset of one segment, in whichever units the source provided.
///
/// Construction through the variants is unchecked; [`Bounds::check`] is
/// what [`Segment::new`](super::Segment::new) runs before accepting them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Bounds {
    Seconds {
        onset_s: f64,
        offset_s: f64,
    },
    Samples {
        onset_sample: u64,
        offset_sample: u64,
    },
    Both {
        onset_s: f64,
        offset_s: f64,
        onset_sample: u64,
        offset_sample: u64,
    },
}

impl Bounds {
    /// Bounds in seconds only.
    pub fn seconds(onset_s: f64, offset_s: f64) -> Self {
        Bounds::Seconds { onset_s, offset_s }
    }

    /// Bounds in sample indices only.
    pub fn samples(onset_sample: u64, offset_sample: u64) -> Self {
        Bounds::Samples {
            onset_sample,
            offset_sample,
        }
    }

    /// Bounds in both units.
    pub fn both(onset_s: f64, offset_s: f64, onset_sample: u64, offset_sample: u64) -> Self {
        Bounds::Both {
            onset_s,
            offset_s,
            onset_sample,
            offset_sample,
        }
    }

    /// Sample-index bounds with seconds derived from `samplerate` (Hz).
    pub fn from_samples_at_rate(onset_sample: u64, offset_sample: u64, samplerate: u32) -> Self {
        let rate = f64::from(samplerate);
        Bounds::both(
            onset_sample as f64 / rate,
            offset_sample as f64 / rate,
            onset_sample,
            offset_sample,
        )
    }

    /// Assembles bounds from the four nullable table fields.
    ///
    /// A half-filled pair is an error; so is a row with no complete pair.
    pub fn from_parts(
        onset_s: Option<f64>,
        offset_s: Option<f64>,
        onset_sample: Option<u64>,
        offset_sample: Option<u64>,
    ) -> Result<Self, String> {
        let seconds = match (onset_s, offset_s) {
            (Some(on), Some(off)) => Some((on, off)),
            (None, None) => None,
            _ => return Err("onset_s and offset_s must be set together".to_string()),
        };
        let samples = match (onset_sample, offset_sample) {
            (Some(on), Some(off)) => Some((on, off)),
            (None, None) => None,
            _ => return Err("onset_sample and offset_sample must be set together".to_string()),
        };

        match (seconds, samples) {
            (Some((on_s, off_s)), Some((on_i, off_i))) => Ok(Bounds::both(on_s, off_s, on_i, off_i)),
            (Some((on_s, off_s)), None) => Ok(Bounds::seconds(on_s, off_s)),
            (None, Some((on_i, off_i))) => Ok(Bounds::samples(on_i, off_i)),
            (None, None) => Err("no onset/offset pair in seconds or samples".to_string()),
        }
    }

    /// The unit coverage of these bounds.
    pub fn units(&self) -> Units {
        match self {
            Bounds::Seconds { .. } => Units::Seconds,
            Bounds::Samples { .. } => Units::Samples,
            Bounds::Both { .. } => Units::Both,
        }
    }

    pub fn onset_s(&self) -> Option<f64> {
        match *self {
            Bounds::Seconds { onset_s, .. } | Bounds::Both { onset_s, .. } => Some(onset_s),
            Bounds::Samples { .. } => None,
        }
    }

    pub fn offset_s(&self) -> Option<f64> {
        match *self {
            Bounds::Seconds { offset_s, .. } | Bounds::Both { offset_s, .. } => Some(offset_s),
            Bounds::Samples { .. } => None,
        }
    }

    pub fn onset_sample(&self) -> Option<u64> {
        match *self {
            Bounds::Samples { onset_sample, .. } | Bounds::Both { onset_sample, .. } => {
                Some(onset_sample)
            }
            Bounds::Seconds { .. } => None,
        }
    }

    pub fn offset_sample(&self) -> Option<u64> {
        match *self {
            Bounds::Samples { offset_sample, .. } | Bounds::Both { offset_sample, .. } => {
                Some(offset_sample)
            }
            Bounds::Seconds { .. } => None,
        }
    }

    /// Checks value ranges and ordering in every unit present.
    ///
    /// Seconds must be finite and non-negative; onset must not exceed
    /// offset in either unit.
    pub fn check(&self) -> Result<(), String> {
        if let (Some(on), Some(off)) = (self.onset_s(), self.offset_s()) {
            if !on.is_finite() || !off.is_finite() {
                return Err(format!("non-finite seconds ({}, {})", on, off));
            }
            if on < 0.0 || off < 0.0 {
                return Err(format!("negative seconds ({}, {})", on, off));
            }
            if on > off {
                return Err(format!("onset_s {} is after offset_s {}", on, off));
            }
        }
        if let (Some(on), Some(off)) = (self.onset_sample(), self.offset_sample()) {
            if on > off {
                return Err(format!("onset_sample {} is after offset_sample {}", on, off));
            }
        }
        Ok(())
    }
}
