//! Three-dimensional convex hulls by incremental quickhull.
//!
//! The hull is computed entirely inside the constructor. Faces that come out
//! coplanar are merged, so a face is a convex polygon with three or more
//! vertices, listed counter-clockwise when seen from outside.
//!
//! ```
//! use quickhull3d::ConvexHull;
//!
//! let coords = [
//!     0.0, 0.0, 0.0,
//!     1.0, 0.0, 0.0,
//!     0.0, 1.0, 0.0,
//!     0.0, 0.0, 1.0,
//!     0.1, 0.1, 0.1,
//! ];
//! let hull = ConvexHull::from_coords(&coords).unwrap();
//! assert_eq!(hull.num_faces(), 4);
//! assert_eq!(hull.num_vertices(), 4);
//! ```

use nalgebra as na;

mod error;
mod mesh;
mod options;
mod quickhull;
mod vector;

pub use crate::error::{Degeneracy, HullError, Result};
pub use crate::options::{FaceIndexing, HullOptions, Tolerance};
pub use crate::vector::{Point3d, Vector3d};

use crate::quickhull::QuickHull;

/// Outward unit normal and offset of a face plane: points `p` on the plane
/// satisfy `normal.dot(p) == offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3d,
    pub offset: f64,
}

impl Plane {
    /// Signed distance of `point` from the plane, positive outside.
    pub fn distance(&self, point: &Point3d) -> f64 {
        self.normal.dot(&point.coords) - self.offset
    }
}

/// A finished hull: the vertices it uses and its faces as index polygons.
#[derive(Debug, Clone)]
pub struct ConvexHull {
    vertices: Vec<Point3d>,
    faces: Vec<Vec<usize>>,
    planes: Vec<Plane>,
    vertex_point_indices: Vec<usize>,
    tolerance: f64,
    char_length: f64,
}

impl ConvexHull {
    /// Hull of a flat `x, y, z, x, y, z, ...` coordinate buffer.
    pub fn from_coords(coords: &[f64]) -> Result<Self> {
        Self::with_options(coords, &HullOptions::default())
    }

    pub fn with_options(coords: &[f64], options: &HullOptions) -> Result<Self> {
        Self::from_builder(QuickHull::from_coords(coords, options)?)
    }

    pub fn quickhull(points: &[na::Point3<f64>]) -> Result<Self> {
        Self::quickhull_with_options(points, &HullOptions::default())
    }

    pub fn quickhull_with_options(
        points: &[na::Point3<f64>],
        options: &HullOptions,
    ) -> Result<Self> {
        Self::from_builder(QuickHull::from_points(points.to_vec(), options)?)
    }

    fn from_builder(hull: QuickHull) -> Result<Self> {
        let faces = hull
            .hull_faces
            .iter()
            .map(|&face| hull.face_indices(face))
            .collect::<Result<Vec<_>>>()?;
        let planes = hull
            .hull_faces
            .iter()
            .map(|&face| {
                let (normal, offset) = hull.face_plane(face);
                Plane { normal, offset }
            })
            .collect();
        let vertices = hull
            .vertex_point_indices
            .iter()
            .map(|&i| hull.mesh.vertices[i].point)
            .collect();

        Ok(Self {
            vertices,
            faces,
            planes,
            vertex_point_indices: hull.vertex_point_indices,
            tolerance: hull.tolerance,
            char_length: hull.char_length,
        })
    }

    /// Positions of the hull vertices, indexed by the entries of [`faces`](Self::faces).
    pub fn vertices(&self) -> &[Point3d] {
        &self.vertices
    }

    /// One polygon per face, 0-based and counter-clockwise from outside.
    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    pub fn faces_with(&self, indexing: FaceIndexing) -> Vec<Vec<usize>> {
        self.faces
            .iter()
            .map(|face| {
                let mut indices = face.clone();
                if indexing.clockwise {
                    indices[1..].reverse();
                }
                for idx in &mut indices {
                    if indexing.point_relative {
                        *idx = self.vertex_point_indices[*idx];
                    }
                    if indexing.from_one {
                        *idx += 1;
                    }
                }
                indices
            })
            .collect()
    }

    /// For each hull vertex, its position in the input.
    pub fn vertex_point_indices(&self) -> &[usize] {
        &self.vertex_point_indices
    }

    /// Face planes, parallel to [`faces`](Self::faces).
    pub fn planes(&self) -> &[Plane] {
        &self.planes
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Distance below which a point is treated as lying on a plane.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Largest extent of the input along a coordinate axis.
    pub fn char_length(&self) -> f64 {
        self.char_length
    }

    /// Whether `point` is inside the hull or within tolerance of its boundary.
    pub fn contains(&self, point: &Point3d) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance(point) <= self.tolerance)
    }

    pub fn volume(&self) -> f64 {
        let origin = self.vertices[0];
        let mut volume = 0.0;
        for face in &self.faces {
            let a = self.vertices[face[0]] - origin;
            for pair in face[1..].windows(2) {
                let b = self.vertices[pair[0]] - origin;
                let c = self.vertices[pair[1]] - origin;
                volume += a.dot(&b.cross(&c));
            }
        }
        volume / 6.0
    }

    pub fn surface_area(&self) -> f64 {
        let mut area = 0.0;
        for face in &self.faces {
            let a = self.vertices[face[0]];
            for pair in face[1..].windows(2) {
                let b = self.vertices[pair[0]] - a;
                let c = self.vertices[pair[1]] - a;
                area += b.cross(&c).norm();
            }
        }
        area / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_coords() -> Vec<f64> {
        let mut coords = Vec::new();
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    coords.extend_from_slice(&[x, y, z]);
                }
            }
        }
        coords
    }

    #[test]
    fn cube_measures() {
        let hull = ConvexHull::from_coords(&cube_coords()).unwrap();
        assert!((hull.volume() - 8.0).abs() < 1e-12);
        assert!((hull.surface_area() - 24.0).abs() < 1e-12);
        assert!(hull.contains(&Point3d::new(0.5, -0.5, 0.99)));
        assert!(!hull.contains(&Point3d::new(0.0, 0.0, 1.01)));
    }

    #[test]
    fn index_flags_only_relabel() {
        let mut coords = vec![0.0, 0.0, 0.0];
        coords.extend(cube_coords());
        let hull = ConvexHull::from_coords(&coords).unwrap();
        assert_eq!(hull.vertex_point_indices(), &[1, 2, 3, 4, 5, 6, 7, 8]);

        let plain = hull.faces();
        let flipped = hull.faces_with(FaceIndexing::default().clockwise());
        let shifted = hull.faces_with(FaceIndexing::default().from_one().point_relative());
        for ((face, cw), rel) in plain.iter().zip(&flipped).zip(&shifted) {
            assert_eq!(cw[0], face[0]);
            let mut reversed = face[1..].to_vec();
            reversed.reverse();
            assert_eq!(&cw[1..], &reversed[..]);
            for (&i, &j) in face.iter().zip(rel) {
                assert_eq!(j, hull.vertex_point_indices()[i] + 1);
            }
        }
    }
}
