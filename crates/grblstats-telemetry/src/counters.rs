//! Feature usage counters
//!
//! Each tracked feature has an independent, non-negative counter. Session
//! counts are merged into the lifetime totals by element-wise addition, so
//! merges commute and associate, and a zero delta is a no-op.

use grblstats_core::{thread_safe, ThreadSafe};
use serde::{Deserialize, Serialize};

/// A tracked application feature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// G-code file loaded
    GCodeFile,
    /// Raster image imported
    RasterFile,
    /// Raster image vectorized
    Vectorization,
    /// Centerline trace used
    Centerline,
    /// Dithering used
    Dithering,
    /// Line-by-line raster mode used
    Line2Line,
    /// SVG file imported
    SvgFile,
}

impl Feature {
    /// Features in the order they appear in a report
    pub const REPORT_ORDER: [Feature; 7] = [
        Feature::GCodeFile,
        Feature::RasterFile,
        Feature::Vectorization,
        Feature::Dithering,
        Feature::Line2Line,
        Feature::SvgFile,
        Feature::Centerline,
    ];

    /// Field name used for this feature in a report
    pub fn report_key(self) -> &'static str {
        match self {
            Feature::GCodeFile => "fGCodeFile",
            Feature::RasterFile => "fRasterFile",
            Feature::Vectorization => "fVectorization",
            Feature::Centerline => "fCenterline",
            Feature::Dithering => "fDithering",
            Feature::Line2Line => "fLine2Line",
            Feature::SvgFile => "fSvgFile",
        }
    }
}

/// Per-feature usage counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageCounters {
    pub gcode_file: u64,
    pub raster_file: u64,
    pub vectorization: u64,
    pub centerline: u64,
    pub dithering: u64,
    pub line2line: u64,
    pub svg_file: u64,
}

impl UsageCounters {
    /// Zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a single use of `feature`
    pub fn increment(&mut self, feature: Feature) {
        self.add(feature, 1);
    }

    /// Count `n` uses of `feature`
    pub fn add(&mut self, feature: Feature, n: u64) {
        let slot = self.slot_mut(feature);
        *slot = slot.saturating_add(n);
    }

    /// Current count for `feature`
    pub fn get(&self, feature: Feature) -> u64 {
        match feature {
            Feature::GCodeFile => self.gcode_file,
            Feature::RasterFile => self.raster_file,
            Feature::Vectorization => self.vectorization,
            Feature::Centerline => self.centerline,
            Feature::Dithering => self.dithering,
            Feature::Line2Line => self.line2line,
            Feature::SvgFile => self.svg_file,
        }
    }

    /// Add every count of `delta` into `self`
    pub fn merge(&mut self, delta: &UsageCounters) {
        for feature in Feature::REPORT_ORDER {
            self.add(feature, delta.get(feature));
        }
    }

    /// True when no feature has been used
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn slot_mut(&mut self, feature: Feature) -> &mut u64 {
        match feature {
            Feature::GCodeFile => &mut self.gcode_file,
            Feature::RasterFile => &mut self.raster_file,
            Feature::Vectorization => &mut self.vectorization,
            Feature::Centerline => &mut self.centerline,
            Feature::Dithering => &mut self.dithering,
            Feature::Line2Line => &mut self.line2line,
            Feature::SvgFile => &mut self.svg_file,
        }
    }
}

/// Cloneable handle to the counters of the running session
///
/// Import and raster pipelines may run on worker threads; each of them can
/// hold a clone and bump counts without going through the service.
#[derive(Debug, Clone)]
pub struct SessionCounters {
    inner: ThreadSafe<UsageCounters>,
}

impl SessionCounters {
    pub fn new() -> Self {
        Self {
            inner: thread_safe(UsageCounters::default()),
        }
    }

    /// Count a single use of `feature`
    pub fn increment(&self, feature: Feature) {
        self.inner.lock().increment(feature);
    }

    /// Count `n` uses of `feature`
    pub fn add(&self, feature: Feature, n: u64) {
        self.inner.lock().add(feature, n);
    }

    /// Copy of the counts accumulated so far
    pub fn snapshot(&self) -> UsageCounters {
        *self.inner.lock()
    }

    /// Drain the accumulated counts, leaving zeroes behind
    pub fn take(&self) -> UsageCounters {
        std::mem::take(&mut *self.inner.lock())
    }
}

impl Default for SessionCounters {
    fn default() -> Self {
        Self::new()
    }
}
