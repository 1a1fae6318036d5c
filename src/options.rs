/// How the plane-distance tolerance is chosen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tolerance {
    /// Derived from the magnitude of the input coordinates.
    Automatic,
    /// Used as given; a negative value falls back to `Automatic`.
    Explicit(f64),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Automatic
    }
}

/// Build configuration for [`ConvexHull::with_options`](crate::ConvexHull::with_options).
#[derive(Debug, Clone, Default)]
pub struct HullOptions {
    pub tolerance: Tolerance,
    /// Split merged polygons into triangle fans once the hull is built.
    pub triangulate: bool,
}

impl HullOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// A negative tolerance selects [`Tolerance::Automatic`].
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = if tolerance < 0.0 {
            Tolerance::Automatic
        } else {
            Tolerance::Explicit(tolerance)
        };
        self
    }

    pub fn triangulated(mut self, triangulate: bool) -> Self {
        self.triangulate = triangulate;
        self
    }
}

/// Presentation flags for face index lists. None of them change the hull,
/// only how its faces are written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FaceIndexing {
    /// Emit vertices clockwise when viewed from outside.
    pub clockwise: bool,
    /// Number vertices from 1 instead of 0.
    pub from_one: bool,
    /// Refer to positions in the original input buffer rather than the
    /// compacted vertex list.
    pub point_relative: bool,
}

impl FaceIndexing {
    pub fn clockwise(mut self) -> Self {
        self.clockwise = true;
        self
    }

    pub fn from_one(mut self) -> Self {
        self.from_one = true;
        self
    }

    pub fn point_relative(mut self) -> Self {
        self.point_relative = true;
        self
    }
}
