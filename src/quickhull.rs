//! Barber, Dobkin and Huhdanpaa, "The Quickhull algorithm for convex hulls", 1996.

use indexmap::IndexSet;

use crate::error::{Degeneracy, HullError, Result};
use crate::mesh::{FaceId, HalfEdgeId, Mark, Mesh, VertexId};
use crate::options::{HullOptions, Tolerance};
use crate::vector::{NormalizeFast, Point3d, Vector3d, DOUBLE_PREC};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeType {
    /// Merge when the smaller face is concave with respect to the larger one.
    NonConvexWrtLargerFace,
    /// Merge when either face is concave with respect to the other.
    NonConvex,
}

/// A face visited by the horizon walk: the edge it was entered through and
/// the next edge still to look across.
struct HorizonFrame {
    stop: HalfEdgeId,
    edge: Option<HalfEdgeId>,
}

pub(crate) struct QuickHull {
    pub(crate) mesh: Mesh,
    pub(crate) char_length: f64,
    pub(crate) tolerance: f64,
    explicit_tolerance: Tolerance,
    max_vtxs: [VertexId; 3],
    min_vtxs: [VertexId; 3],
    /// Faces with a non-empty outside set, in the order they first claimed a point.
    claimed: IndexSet<FaceId>,
    /// Points orphaned by the current iteration, waiting to be reassigned.
    unclaimed: Vec<VertexId>,
    horizon: Vec<HalfEdgeId>,
    /// Surviving faces, in creation order, once the hull is finished.
    pub(crate) hull_faces: Vec<FaceId>,
    /// Input position of each hull vertex, by dense index.
    pub(crate) vertex_point_indices: Vec<usize>,
}

impl QuickHull {
    /// Builds the hull of a flat `x, y, z, x, y, z, ...` buffer.
    pub(crate) fn from_coords(coords: &[f64], options: &HullOptions) -> Result<Self> {
        if coords.len() % 3 != 0 || coords.len() / 3 < 4 {
            return Err(HullError::InvalidInputSize {
                coords: coords.len(),
            });
        }
        let points = coords
            .chunks(3)
            .map(|c| Point3d::new(c[0], c[1], c[2]))
            .collect();
        Self::from_points(points, options)
    }

    pub(crate) fn from_points(points: Vec<Point3d>, options: &HullOptions) -> Result<Self> {
        if points.len() < 4 {
            return Err(HullError::InvalidInputSize {
                coords: points.len() * 3,
            });
        }
        if let Some(point) = points
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(HullError::NonFiniteCoordinate { point });
        }

        let mut hull = Self {
            mesh: Mesh::new(points),
            char_length: 0.0,
            tolerance: 0.0,
            explicit_tolerance: options.tolerance,
            max_vtxs: [VertexId(0); 3],
            min_vtxs: [VertexId(0); 3],
            claimed: IndexSet::new(),
            unclaimed: Vec::new(),
            horizon: Vec::new(),
            hull_faces: Vec::new(),
            vertex_point_indices: Vec::new(),
        };
        hull.build_hull(options.triangulate)?;
        Ok(hull)
    }

    fn build_hull(&mut self, triangulate: bool) -> Result<()> {
        self.compute_max_and_min();
        log::debug!(
            "{} points, characteristic length {}, tolerance {:e}",
            self.mesh.vertices.len(),
            self.char_length,
            self.tolerance
        );

        self.create_initial_simplex()?;

        let mut iterations = 0;
        while let Some(eye) = self.next_point_to_add() {
            self.add_point_to_hull(eye)?;
            iterations += 1;
        }

        if triangulate {
            self.triangulate()?;
        }
        self.check_mesh()?;
        self.reindex_faces_and_vertices();

        log::debug!(
            "hull built after {} iterations: {} faces, {} vertices",
            iterations,
            self.hull_faces.len(),
            self.vertex_point_indices.len()
        );
        Ok(())
    }

    fn compute_max_and_min(&mut self) {
        let mut max = self.mesh.point(VertexId(0)).coords;
        let mut min = max;
        self.max_vtxs = [VertexId(0); 3];
        self.min_vtxs = [VertexId(0); 3];

        for (i, vertex) in self.mesh.vertices.iter().enumerate().skip(1) {
            for axis in 0..3 {
                let c = vertex.point[axis];
                if c > max[axis] {
                    max[axis] = c;
                    self.max_vtxs[axis] = VertexId(i);
                } else if c < min[axis] {
                    min[axis] = c;
                    self.min_vtxs[axis] = VertexId(i);
                }
            }
        }

        self.char_length = (0..3).map(|axis| max[axis] - min[axis]).fold(0.0, f64::max);
        self.tolerance = match self.explicit_tolerance {
            Tolerance::Explicit(tolerance) if tolerance >= 0.0 => tolerance,
            _ => {
                3.0 * DOUBLE_PREC
                    * (0..3)
                        .map(|axis| max[axis].abs().max(min[axis].abs()))
                        .sum::<f64>()
            }
        };
    }

    fn create_initial_simplex(&mut self) -> Result<()> {
        let mut max = 0.0;
        let mut imax = 0;
        for axis in 0..3 {
            let diff =
                self.mesh.point(self.max_vtxs[axis])[axis] - self.mesh.point(self.min_vtxs[axis])[axis];
            if diff > max {
                max = diff;
                imax = axis;
            }
        }
        if max <= self.tolerance {
            return Err(HullError::DegenerateInput(Degeneracy::Coincident));
        }

        // The two extremes of the widest axis.
        let v0 = self.max_vtxs[imax];
        let v1 = self.min_vtxs[imax];
        let p0 = *self.mesh.point(v0);

        // Farthest from the line v0-v1.
        let mut u01 = self.mesh.point(v1) - p0;
        u01.normalize_fast();
        let mut max_sqr = 0.0;
        let mut third = None;
        for (i, vertex) in self.mesh.vertices.iter().enumerate() {
            let xprod = u01.cross(&(vertex.point - p0));
            let len_sqr = xprod.norm_squared();
            if len_sqr > max_sqr && i != v0.0 && i != v1.0 {
                max_sqr = len_sqr;
                third = Some((VertexId(i), xprod));
            }
        }
        let (v2, mut nrml) = match third {
            Some(third) if max_sqr.sqrt() > 100.0 * self.tolerance => third,
            _ => return Err(HullError::DegenerateInput(Degeneracy::Collinear)),
        };
        nrml.normalize_fast();

        // Farthest from the plane v0-v1-v2.
        let d0 = self.mesh.point(v2).coords.dot(&nrml);
        let mut max_dist = 0.0;
        let mut fourth = None;
        for (i, vertex) in self.mesh.vertices.iter().enumerate() {
            let dist = (vertex.point.coords.dot(&nrml) - d0).abs();
            if dist > max_dist && i != v0.0 && i != v1.0 && i != v2.0 {
                max_dist = dist;
                fourth = Some(VertexId(i));
            }
        }
        let v3 = match fourth {
            Some(v3) if max_dist > 100.0 * self.tolerance => v3,
            _ => return Err(HullError::DegenerateInput(Degeneracy::Coplanar)),
        };
        log::debug!("initial simplex {} {} {} {}", v0.0, v1.0, v2.0, v3.0);

        let simplex = [v0, v1, v2, v3];
        let tris = if self.mesh.point(v3).coords.dot(&nrml) - d0 < 0.0 {
            let tris = [
                self.mesh.create_triangle(v0, v1, v2),
                self.mesh.create_triangle(v3, v1, v0),
                self.mesh.create_triangle(v3, v2, v1),
                self.mesh.create_triangle(v3, v0, v2),
            ];
            for i in 0..3 {
                let k = (i + 1) % 3;
                let (a, b) = (self.mesh.edge(tris[i + 1], 1), self.mesh.edge(tris[k + 1], 0));
                self.mesh.set_opposite(a, b);
                let (a, b) = (self.mesh.edge(tris[i + 1], 2), self.mesh.edge(tris[0], k as isize));
                self.mesh.set_opposite(a, b);
            }
            tris
        } else {
            let tris = [
                self.mesh.create_triangle(v0, v2, v1),
                self.mesh.create_triangle(v3, v0, v1),
                self.mesh.create_triangle(v3, v1, v2),
                self.mesh.create_triangle(v3, v2, v0),
            ];
            for i in 0..3 {
                let k = (i + 1) % 3;
                let (a, b) = (self.mesh.edge(tris[i + 1], 0), self.mesh.edge(tris[k + 1], 1));
                self.mesh.set_opposite(a, b);
                let (a, b) = (
                    self.mesh.edge(tris[i + 1], 2),
                    self.mesh.edge(tris[0], ((3 - i) % 3) as isize),
                );
                self.mesh.set_opposite(a, b);
            }
            tris
        };

        for i in 0..self.mesh.vertices.len() {
            let v = VertexId(i);
            if simplex.contains(&v) {
                continue;
            }
            let point = *self.mesh.point(v);
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &tri in &tris {
                let dist = self.mesh.face(tri).distance_to_plane(&point);
                if dist > max_dist {
                    max_dist = dist;
                    max_face = Some(tri);
                }
            }
            if let Some(face) = max_face {
                self.add_point_to_face(v, face);
            }
        }
        Ok(())
    }

    fn add_point_to_face(&mut self, vertex: VertexId, face: FaceId) {
        self.mesh.vertex_mut(vertex).face = Some(face);
        self.mesh.face_mut(face).outside.push(vertex);
        self.claimed.insert(face);
    }

    fn remove_point_from_face(&mut self, vertex: VertexId, face: FaceId) {
        let outside = &mut self.mesh.face_mut(face).outside;
        if let Some(pos) = outside.iter().position(|&v| v == vertex) {
            outside.remove(pos);
        }
        if outside.is_empty() {
            self.claimed.shift_remove(&face);
        }
        self.mesh.vertex_mut(vertex).face = None;
    }

    /// Empties the outside set of `face`, newest point first.
    fn remove_all_points_from_face(&mut self, face: FaceId) -> Vec<VertexId> {
        let mut points = std::mem::take(&mut self.mesh.face_mut(face).outside);
        if !points.is_empty() {
            self.claimed.shift_remove(&face);
        }
        points.reverse();
        for &v in &points {
            self.mesh.vertex_mut(v).face = None;
        }
        points
    }

    /// Hands the outside set of a discarded face to `absorbing_face` where
    /// possible, and to the unclaimed list otherwise.
    fn delete_face_points(&mut self, face: FaceId, absorbing_face: Option<FaceId>) {
        let points = self.remove_all_points_from_face(face);
        match absorbing_face {
            None => self.unclaimed.extend(points),
            Some(absorbing) => {
                for v in points {
                    let dist = self.mesh.face(absorbing).distance_to_plane(self.mesh.point(v));
                    if dist > self.tolerance {
                        self.add_point_to_face(v, absorbing);
                    } else {
                        self.unclaimed.push(v);
                    }
                }
            }
        }
    }

    /// Farthest outside point of the earliest claiming face.
    fn next_point_to_add(&self) -> Option<VertexId> {
        let &eye_face = self.claimed.get_index(0)?;
        let face = self.mesh.face(eye_face);
        let mut max_dist = 0.0;
        let mut eye = None;
        for &v in face.outside.iter().rev() {
            let dist = face.distance_to_plane(self.mesh.point(v));
            if dist > max_dist {
                max_dist = dist;
                eye = Some(v);
            }
        }
        eye
    }

    fn add_point_to_hull(&mut self, eye: VertexId) -> Result<()> {
        self.horizon.clear();
        self.unclaimed.clear();

        let eye_face = self.mesh.vertex(eye).face.ok_or_else(|| {
            HullError::MeshConsistency(format!("eye point {} is not claimed by any face", eye.0))
        })?;
        log::trace!(
            "adding point {} from face {} ({} faces claim points)",
            eye.0,
            eye_face.0,
            self.claimed.len()
        );

        self.remove_point_from_face(eye, eye_face);
        let eye_point = *self.mesh.point(eye);
        self.calculate_horizon(&eye_point, eye_face)?;
        let new_faces = self.add_new_faces(eye)?;

        for &face in &new_faces {
            if self.mesh.face(face).mark == Mark::Visible {
                while self.do_adjacent_merge(face, MergeType::NonConvexWrtLargerFace)? {}
            }
        }
        for &face in &new_faces {
            if self.mesh.face(face).mark == Mark::NonConvex {
                self.mesh.face_mut(face).mark = Mark::Visible;
                while self.do_adjacent_merge(face, MergeType::NonConvex)? {}
            }
        }

        self.resolve_unclaimed_points(&new_faces);
        Ok(())
    }

    fn visit_horizon_face(&mut self, face: FaceId) {
        self.delete_face_points(face, None);
        self.mesh.face_mut(face).mark = Mark::Deleted;
    }

    /// Deletes every face visible from `eye`, starting at `face`, and
    /// records the boundary edges in the order a depth-first walk meets
    /// them, which closes into a single loop.
    fn calculate_horizon(&mut self, eye: &Point3d, face: FaceId) -> Result<()> {
        self.visit_horizon_face(face);
        let he0 = self.mesh.face(face).he0;
        let mut stack = vec![HorizonFrame {
            stop: he0,
            edge: Some(he0),
        }];

        while let Some(frame) = stack.last_mut() {
            let edge = match frame.edge {
                Some(edge) => edge,
                None => {
                    stack.pop();
                    continue;
                }
            };
            let next = self.mesh.next(edge);
            frame.edge = if next == frame.stop { None } else { Some(next) };

            let opp_face = self.mesh.opposite_face(edge)?;
            if self.mesh.face(opp_face).mark != Mark::Visible {
                continue;
            }
            if self.mesh.face(opp_face).distance_to_plane(eye) > self.tolerance {
                let entry = self.mesh.opposite(edge)?;
                self.visit_horizon_face(opp_face);
                stack.push(HorizonFrame {
                    stop: entry,
                    edge: Some(self.mesh.next(entry)),
                });
            } else {
                self.horizon.push(edge);
            }
        }
        Ok(())
    }

    /// Creates the triangle `eye, tail, head` over horizon edge `he` and
    /// returns its side edge ending at the eye.
    fn add_adjoining_face(&mut self, eye: VertexId, he: HalfEdgeId) -> Result<HalfEdgeId> {
        let (tail, head) = (self.mesh.tail(he), self.mesh.head(he));
        let face = self.mesh.create_triangle(eye, tail, head);
        let outer = self.mesh.edge(face, -1);
        let across = self.mesh.opposite(he)?;
        self.mesh.set_opposite(outer, across);
        Ok(self.mesh.edge(face, 0))
    }

    /// Builds the cone of new faces from the horizon to `eye`.
    fn add_new_faces(&mut self, eye: VertexId) -> Result<Vec<FaceId>> {
        let horizon = std::mem::take(&mut self.horizon);
        if horizon.is_empty() {
            return Err(HullError::MeshConsistency(format!(
                "point {} sees the whole hull",
                eye.0
            )));
        }

        let mut new_faces = Vec::with_capacity(horizon.len());
        let mut side_begin = None;
        let mut side_prev: Option<HalfEdgeId> = None;
        for &he in &horizon {
            let side = self.add_adjoining_face(eye, he)?;
            match side_prev {
                Some(prev) => {
                    let next = self.mesh.next(side);
                    self.mesh.set_opposite(next, prev);
                }
                None => side_begin = Some(side),
            }
            new_faces.push(self.mesh.edge_face(side));
            side_prev = Some(side);
        }
        if let (Some(begin), Some(last)) = (side_begin, side_prev) {
            let next = self.mesh.next(begin);
            self.mesh.set_opposite(next, last);
        }

        self.horizon = horizon;
        Ok(new_faces)
    }

    /// Merges `face` with the first neighbour it should be merged with.
    /// Returns whether a merge happened.
    fn do_adjacent_merge(&mut self, face: FaceId, merge_type: MergeType) -> Result<bool> {
        let tolerance = self.tolerance;
        let he0 = self.mesh.face(face).he0;
        let mut hedge = he0;
        let mut convex = true;

        loop {
            let opp_face = self.mesh.opposite_face(hedge)?;
            let dist1 = self.mesh.opp_face_distance(hedge)?;
            let dist2 = self.mesh.opp_face_distance(self.mesh.opposite(hedge)?)?;

            let merge = match merge_type {
                MergeType::NonConvex => dist1 > -tolerance || dist2 > -tolerance,
                MergeType::NonConvexWrtLargerFace => {
                    let (larger, smaller) =
                        if self.mesh.face(face).area > self.mesh.face(opp_face).area {
                            (dist1, dist2)
                        } else {
                            (dist2, dist1)
                        };
                    if larger > -tolerance {
                        true
                    } else {
                        if smaller > -tolerance {
                            convex = false;
                        }
                        false
                    }
                }
            };

            if merge {
                let discarded = self.mesh.merge_adjacent_face(face, hedge)?;
                log::trace!(
                    "face {} absorbed {:?} ({:?})",
                    face.0,
                    discarded.iter().map(|f| f.0).collect::<Vec<_>>(),
                    merge_type
                );
                for f in discarded {
                    self.delete_face_points(f, Some(face));
                }
                return Ok(true);
            }

            hedge = self.mesh.next(hedge);
            if hedge == he0 {
                break;
            }
        }

        if !convex {
            self.mesh.face_mut(face).mark = Mark::NonConvex;
        }
        Ok(false)
    }

    fn resolve_unclaimed_points(&mut self, new_faces: &[FaceId]) {
        let unclaimed = std::mem::take(&mut self.unclaimed);
        for v in unclaimed {
            let point = *self.mesh.point(v);
            let mut max_dist = self.tolerance;
            let mut max_face = None;
            for &f in new_faces {
                let face = self.mesh.face(f);
                if face.mark != Mark::Visible {
                    continue;
                }
                let dist = face.distance_to_plane(&point);
                if dist > max_dist {
                    max_dist = dist;
                    max_face = Some(f);
                }
                if max_dist > 1000.0 * self.tolerance {
                    break;
                }
            }
            if let Some(face) = max_face {
                self.add_point_to_face(v, face);
            }
        }
    }

    /// Splits every merged polygon into triangles.
    fn triangulate(&mut self) -> Result<()> {
        let count = self.mesh.faces.len();
        let mut created = 0;
        for i in 0..count {
            let face = FaceId(i);
            if self.mesh.face(face).mark == Mark::Visible {
                created += self.mesh.triangulate_face(face)?.len();
            }
        }
        log::debug!("triangulation added {} faces", created);
        Ok(())
    }

    fn check_mesh(&self) -> Result<()> {
        for i in 0..self.mesh.faces.len() {
            let face = FaceId(i);
            match self.mesh.face(face).mark {
                Mark::Deleted => {}
                Mark::Visible => self.mesh.check_consistency(face)?,
                Mark::NonConvex => {
                    return Err(HullError::MeshConsistency(format!(
                        "face {} left marked non-convex",
                        i
                    )))
                }
            }
        }
        Ok(())
    }

    /// Drops deleted faces and numbers the vertices the remaining faces use,
    /// in input order.
    fn reindex_faces_and_vertices(&mut self) {
        for vertex in &mut self.mesh.vertices {
            vertex.index = None;
        }

        let mesh = &self.mesh;
        self.hull_faces = (0..mesh.faces.len())
            .map(FaceId)
            .filter(|&f| mesh.face(f).mark == Mark::Visible)
            .collect();

        let mut used = vec![false; self.mesh.vertices.len()];
        for &face in &self.hull_faces {
            for v in self.mesh.face_vertices(face) {
                used[v.0] = true;
            }
        }

        self.vertex_point_indices.clear();
        for (i, vertex) in self.mesh.vertices.iter_mut().enumerate() {
            if used[i] {
                vertex.index = Some(self.vertex_point_indices.len());
                self.vertex_point_indices.push(i);
            }
        }
    }

    /// Dense vertex indices of a hull face, counter-clockwise from outside.
    pub(crate) fn face_indices(&self, face: FaceId) -> Result<Vec<usize>> {
        self.mesh
            .face_vertices(face)
            .map(|v| {
                self.mesh.vertex(v).index.ok_or_else(|| {
                    HullError::MeshConsistency(format!("hull vertex {} was never indexed", v.0))
                })
            })
            .collect()
    }

    pub(crate) fn face_plane(&self, face: FaceId) -> (Vector3d, f64) {
        let f = self.mesh.face(face);
        (f.normal, f.plane_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng as _};

    fn build(points: &[[f64; 3]]) -> Result<QuickHull> {
        let coords: Vec<f64> = points.iter().flat_map(|p| p.iter().copied()).collect();
        QuickHull::from_coords(&coords, &HullOptions::default())
    }

    fn cube() -> Vec<[f64; 3]> {
        let mut points = Vec::new();
        for &x in &[-1.0, 1.0] {
            for &y in &[-1.0, 1.0] {
                for &z in &[-1.0, 1.0] {
                    points.push([x, y, z]);
                }
            }
        }
        points
    }

    fn random_ball(n: usize, seed: u64) -> Vec<[f64; 3]> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut points = Vec::with_capacity(n);
        while points.len() < n {
            let p = [
                rng.gen_range(-1.0, 1.0),
                rng.gen_range(-1.0, 1.0),
                rng.gen_range(-1.0, 1.0),
            ];
            if p[0] * p[0] + p[1] * p[1] + p[2] * p[2] <= 1.0 {
                points.push(p);
            }
        }
        points
    }

    fn assert_closed(hull: &QuickHull) {
        let mesh = &hull.mesh;
        for &face in &hull.hull_faces {
            let mut count = 0;
            for he in mesh.face_edges(face) {
                let opp = mesh.opposite(he).unwrap();
                assert_eq!(mesh.opposite(opp).unwrap(), he);
                assert_eq!(mesh.head(opp), mesh.tail(he));
                assert_eq!(mesh.edge_face(he), face);
                assert_eq!(mesh.face(mesh.edge_face(opp)).mark, Mark::Visible);
                count += 1;
            }
            assert_eq!(count, mesh.face(face).num_verts);
        }
    }

    #[test]
    fn tetrahedron_is_its_own_simplex() {
        let hull = build(&[
            [1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
        ])
        .unwrap();
        assert_eq!(hull.hull_faces.len(), 4);
        assert_eq!(hull.mesh.faces.len(), 4);
        assert_eq!(hull.vertex_point_indices, vec![0, 1, 2, 3]);
        for &face in &hull.hull_faces {
            assert_eq!(hull.mesh.face(face).num_verts, 3);
        }
        assert_closed(&hull);
    }

    #[test]
    fn simplex_normals_point_outward() {
        let points = [
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
        ];
        let hull = build(&points).unwrap();
        let inside = Point3d::new(0.1, 0.1, 0.1);
        for &face in &hull.hull_faces {
            assert!(hull.mesh.face(face).distance_to_plane(&inside) < 0.0);
        }
    }

    #[test]
    fn cube_faces_merge_into_quads() {
        let hull = build(&cube()).unwrap();
        assert_eq!(hull.hull_faces.len(), 6);
        assert_eq!(hull.vertex_point_indices.len(), 8);
        for &face in &hull.hull_faces {
            assert_eq!(hull.mesh.face(face).num_verts, 4);
        }
        assert_closed(&hull);
    }

    #[test]
    fn triangulated_cube_keeps_a_closed_mesh() {
        let coords: Vec<f64> = cube().iter().flat_map(|p| p.iter().copied()).collect();
        let hull =
            QuickHull::from_coords(&coords, &HullOptions::new().triangulated(true)).unwrap();
        assert_eq!(hull.hull_faces.len(), 12);
        for &face in &hull.hull_faces {
            assert_eq!(hull.mesh.face(face).num_verts, 3);
        }
        assert_closed(&hull);
    }

    #[test]
    fn random_cloud_is_closed_and_fully_processed() {
        let hull = build(&random_ball(500, 17)).unwrap();
        assert!(hull.claimed.is_empty());
        assert!(hull.hull_faces.len() >= 4);
        assert_closed(&hull);
        for &face in &hull.hull_faces {
            assert!(hull.mesh.face(face).outside.is_empty());
        }
    }

    #[test]
    fn interior_point_is_never_indexed() {
        let mut points = cube();
        points.push([0.1, -0.2, 0.3]);
        let hull = build(&points).unwrap();
        assert_eq!(hull.mesh.vertices[8].index, None);
        assert!(!hull.vertex_point_indices.contains(&8));
        for &face in &hull.hull_faces {
            assert!(hull.mesh.face_vertices(face).all(|v| v.0 != 8));
        }
    }

    #[test]
    fn automatic_tolerance_scales_with_coordinates() {
        let hull = build(&cube()).unwrap();
        assert!((hull.tolerance - 9.0 * DOUBLE_PREC).abs() < 1e-30);
        assert!((hull.char_length - 2.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_tolerance_is_used_verbatim() {
        let coords: Vec<f64> = cube().iter().flat_map(|p| p.iter().copied()).collect();
        let hull =
            QuickHull::from_coords(&coords, &HullOptions::new().with_tolerance(1e-6)).unwrap();
        assert_eq!(hull.tolerance, 1e-6);
    }

    #[test]
    fn negative_explicit_tolerance_falls_back_to_automatic() {
        let coords: Vec<f64> = cube().iter().flat_map(|p| p.iter().copied()).collect();
        let options = HullOptions {
            tolerance: Tolerance::Explicit(-1.0),
            triangulate: false,
        };
        let hull = QuickHull::from_coords(&coords, &options).unwrap();
        assert!((hull.tolerance - 9.0 * DOUBLE_PREC).abs() < 1e-30);
        assert_eq!(hull.hull_faces.len(), 6);
        assert_eq!(hull.vertex_point_indices.len(), 8);
    }

    #[test]
    fn fan_triangles_keep_the_polygon_plane() {
        let mut hull = build(&cube()).unwrap();
        for face in hull.hull_faces.clone() {
            let plane = hull.face_plane(face);
            let created = hull.mesh.triangulate_face(face).unwrap();
            assert_eq!(created.len(), 1);
            assert_eq!(hull.face_plane(face), plane);
            for tri in created {
                assert_eq!(hull.mesh.face(tri).num_verts, 3);
                assert_eq!(hull.face_plane(tri), plane);
            }
        }
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let coincident = build(&[[1.0, 2.0, 3.0]; 4]);
        assert_eq!(
            coincident.err(),
            Some(HullError::DegenerateInput(Degeneracy::Coincident))
        );

        let collinear: Vec<_> = (0..5).map(|i| [i as f64, 2.0 * i as f64, 1.0]).collect();
        assert_eq!(
            build(&collinear).err(),
            Some(HullError::DegenerateInput(Degeneracy::Collinear))
        );

        let coplanar: Vec<_> = (0..6)
            .map(|i| {
                let t = i as f64;
                [t.cos(), t.sin(), 0.5]
            })
            .collect();
        assert_eq!(
            build(&coplanar).err(),
            Some(HullError::DegenerateInput(Degeneracy::Coplanar))
        );
    }

    #[test]
    fn bad_buffers_are_rejected() {
        let err = QuickHull::from_coords(&[0.0; 9], &HullOptions::default()).err();
        assert_eq!(err, Some(HullError::InvalidInputSize { coords: 9 }));

        let err = QuickHull::from_coords(&[0.0; 13], &HullOptions::default()).err();
        assert_eq!(err, Some(HullError::InvalidInputSize { coords: 13 }));

        let mut points = cube();
        points[3][1] = f64::NAN;
        assert_eq!(
            build(&points).err(),
            Some(HullError::NonFiniteCoordinate { point: 3 })
        );
    }
}
