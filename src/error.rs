use std::fmt;

/// The way in which an input point cloud fails to span three dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    /// All points lie within tolerance of a single location.
    Coincident,
    /// All points lie within tolerance of a single line.
    Collinear,
    /// All points lie within tolerance of a single plane.
    Coplanar,
}

impl fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Degeneracy::Coincident => "coincident",
            Degeneracy::Collinear => "collinear",
            Degeneracy::Coplanar => "coplanar",
        };
        f.write_str(name)
    }
}

/// Errors returned while building a hull.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HullError {
    #[error("invalid input size: {coords} coordinates (need a multiple of 3 describing at least 4 points)")]
    InvalidInputSize { coords: usize },

    #[error("point {point} has a non-finite coordinate")]
    NonFiniteCoordinate { point: usize },

    #[error("degenerate input: points appear to be {0}")]
    DegenerateInput(Degeneracy),

    /// The half-edge mesh broke one of its invariants. This is a bug in the
    /// construction, never a property of the input.
    #[error("mesh consistency error: {0}")]
    MeshConsistency(String),
}

pub type Result<T> = std::result::Result<T, HullError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degeneracy_renders_lowercase() {
        let err = HullError::DegenerateInput(Degeneracy::Collinear);
        assert_eq!(err.to_string(), "degenerate input: points appear to be collinear");
    }

    #[test]
    fn input_size_mentions_count() {
        let err = HullError::InvalidInputSize { coords: 7 };
        assert!(err.to_string().contains("7 coordinates"));
    }
}
