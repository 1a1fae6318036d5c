//! Half-edge mesh in arenas. Deleted faces are only marked, never freed.

use crate::error::{HullError, Result};
use crate::vector::{Point3d, Vector3d};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct VertexId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct HalfEdgeId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct FaceId(pub(crate) usize);

/// Lifecycle of a face. `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mark {
    Visible,
    /// Left unmerged by the first merge pass; revisited by the second.
    NonConvex,
    Deleted,
}

#[derive(Debug, Clone)]
pub(crate) struct Vertex {
    pub(crate) point: Point3d,
    /// Dense index among the vertices of the finished hull.
    pub(crate) index: Option<usize>,
    /// Face whose outside set currently holds this vertex.
    pub(crate) face: Option<FaceId>,
}

#[derive(Debug, Clone)]
pub(crate) struct HalfEdge {
    /// Head vertex; the tail is the head of `prev`.
    pub(crate) vertex: VertexId,
    pub(crate) face: FaceId,
    pub(crate) next: HalfEdgeId,
    pub(crate) prev: HalfEdgeId,
    pub(crate) opposite: Option<HalfEdgeId>,
}

#[derive(Debug, Clone)]
pub(crate) struct Face {
    pub(crate) he0: HalfEdgeId,
    /// Twice the polygon area; only compared between faces.
    pub(crate) area: f64,
    pub(crate) normal: Vector3d,
    pub(crate) centroid: Point3d,
    pub(crate) plane_offset: f64,
    pub(crate) num_verts: usize,
    pub(crate) mark: Mark,
    /// Outside set in claim order, oldest first.
    pub(crate) outside: Vec<VertexId>,
}

impl Face {
    fn new(he0: HalfEdgeId) -> Self {
        Self {
            he0,
            area: 0.0,
            normal: Vector3d::zeros(),
            centroid: Point3d::origin(),
            plane_offset: 0.0,
            num_verts: 0,
            mark: Mark::Visible,
            outside: Vec::new(),
        }
    }

    /// Signed distance of `p` from the face plane, positive outside.
    #[inline]
    pub(crate) fn distance_to_plane(&self, p: &Point3d) -> f64 {
        self.normal.dot(&p.coords) - self.plane_offset
    }
}

fn inconsistent(msg: String) -> HullError {
    HullError::MeshConsistency(msg)
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Mesh {
    pub(crate) vertices: Vec<Vertex>,
    pub(crate) half_edges: Vec<HalfEdge>,
    pub(crate) faces: Vec<Face>,
}

/// Half-edges of one face, starting at `he0` and following `next`.
pub(crate) struct FaceEdges<'a> {
    mesh: &'a Mesh,
    he0: HalfEdgeId,
    current: Option<HalfEdgeId>,
}

impl Iterator for FaceEdges<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<HalfEdgeId> {
        let he = self.current?;
        let next = self.mesh.next(he);
        self.current = if next == self.he0 { None } else { Some(next) };
        Some(he)
    }
}

impl Mesh {
    pub(crate) fn new(points: impl IntoIterator<Item = Point3d>) -> Self {
        let vertices = points
            .into_iter()
            .map(|point| Vertex {
                point,
                index: None,
                face: None,
            })
            .collect();
        Self {
            vertices,
            half_edges: Vec::new(),
            faces: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn face(&self, face: FaceId) -> &Face {
        &self.faces[face.0]
    }

    #[inline]
    pub(crate) fn face_mut(&mut self, face: FaceId) -> &mut Face {
        &mut self.faces[face.0]
    }

    #[inline]
    pub(crate) fn vertex(&self, vertex: VertexId) -> &Vertex {
        &self.vertices[vertex.0]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, vertex: VertexId) -> &mut Vertex {
        &mut self.vertices[vertex.0]
    }

    #[inline]
    pub(crate) fn point(&self, vertex: VertexId) -> &Point3d {
        &self.vertices[vertex.0].point
    }

    #[inline]
    pub(crate) fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].next
    }

    #[inline]
    pub(crate) fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[he.0].prev
    }

    #[inline]
    pub(crate) fn head(&self, he: HalfEdgeId) -> VertexId {
        self.half_edges[he.0].vertex
    }

    #[inline]
    pub(crate) fn tail(&self, he: HalfEdgeId) -> VertexId {
        self.head(self.prev(he))
    }

    #[inline]
    pub(crate) fn edge_face(&self, he: HalfEdgeId) -> FaceId {
        self.half_edges[he.0].face
    }

    pub(crate) fn opposite(&self, he: HalfEdgeId) -> Result<HalfEdgeId> {
        self.half_edges[he.0]
            .opposite
            .ok_or_else(|| inconsistent(format!("half edge {} has no opposite", he.0)))
    }

    pub(crate) fn opposite_face(&self, he: HalfEdgeId) -> Result<FaceId> {
        Ok(self.edge_face(self.opposite(he)?))
    }

    pub(crate) fn set_opposite(&mut self, a: HalfEdgeId, b: HalfEdgeId) {
        self.half_edges[a.0].opposite = Some(b);
        self.half_edges[b.0].opposite = Some(a);
    }

    /// The `i`th half-edge of `face`, counting backwards for negative `i`.
    pub(crate) fn edge(&self, face: FaceId, i: isize) -> HalfEdgeId {
        let mut he = self.face(face).he0;
        if i >= 0 {
            for _ in 0..i {
                he = self.next(he);
            }
        } else {
            for _ in i..0 {
                he = self.prev(he);
            }
        }
        he
    }

    pub(crate) fn face_edges(&self, face: FaceId) -> FaceEdges<'_> {
        let he0 = self.face(face).he0;
        FaceEdges {
            mesh: self,
            he0,
            current: Some(he0),
        }
    }

    /// Head vertices of `face` in winding order.
    pub(crate) fn face_vertices(&self, face: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_edges(face).map(move |he| self.head(he))
    }

    fn head_point(&self, he: HalfEdgeId) -> Point3d {
        *self.point(self.head(he))
    }

    fn push_half_edge(&mut self, vertex: VertexId, face: FaceId) -> HalfEdgeId {
        let id = HalfEdgeId(self.half_edges.len());
        self.half_edges.push(HalfEdge {
            vertex,
            face,
            next: id,
            prev: id,
            opposite: None,
        });
        id
    }

    /// Adds the triangle `v0 -> v1 -> v2` with unlinked outer sides.
    pub(crate) fn create_triangle(&mut self, v0: VertexId, v1: VertexId, v2: VertexId) -> FaceId {
        let face = FaceId(self.faces.len());
        let base = self.half_edges.len();
        for (i, &vertex) in [v0, v1, v2].iter().enumerate() {
            self.half_edges.push(HalfEdge {
                vertex,
                face,
                next: HalfEdgeId(base + (i + 1) % 3),
                prev: HalfEdgeId(base + (i + 2) % 3),
                opposite: None,
            });
        }
        self.faces.push(Face::new(HalfEdgeId(base)));
        self.compute_normal(face);
        self.compute_centroid(face);
        self.update_plane_offset(face);
        face
    }

    /// Fan normal around the head of `he0`. Also refreshes `area` and
    /// `num_verts`.
    fn compute_normal(&mut self, face: FaceId) {
        let he0 = self.face(face).he0;
        let he1 = self.next(he0);
        let mut he2 = self.next(he1);

        let p0 = self.head_point(he0);
        let mut d2 = self.head_point(he1) - p0;
        let mut normal = Vector3d::zeros();
        let mut num_verts = 2;

        while he2 != he0 {
            let d1 = d2;
            d2 = self.head_point(he2) - p0;
            normal += d1.cross(&d2);
            he2 = self.next(he2);
            num_verts += 1;
        }

        let area = normal.norm();
        if area > 0.0 {
            normal /= area;
        }

        let f = self.face_mut(face);
        f.normal = normal;
        f.area = area;
        f.num_verts = num_verts;
    }

    fn compute_centroid(&mut self, face: FaceId) {
        let sum = self
            .face_vertices(face)
            .fold(Vector3d::zeros(), |acc, v| acc + self.point(v).coords);
        let f = self.face_mut(face);
        f.centroid = Point3d::from(sum / f.num_verts as f64);
    }

    /// Recomputes cached geometry after a topology change and verifies the
    /// recorded vertex count against the edge cycle.
    pub(crate) fn compute_normal_and_centroid(&mut self, face: FaceId) -> Result<()> {
        self.compute_normal(face);
        self.compute_centroid(face);
        self.update_plane_offset(face);

        let num_verts = self.face_edges(face).count();
        if num_verts != self.face(face).num_verts {
            return Err(inconsistent(format!(
                "face {} records {} vertices but has {}",
                face.0,
                self.face(face).num_verts,
                num_verts
            )));
        }
        Ok(())
    }

    fn update_plane_offset(&mut self, face: FaceId) {
        let f = self.face_mut(face);
        f.plane_offset = f.normal.dot(&f.centroid.coords);
    }

    /// Gives `face` a plane it did not compute from its own vertices.
    fn set_plane(&mut self, face: FaceId, normal: Vector3d, plane_offset: f64) {
        let f = self.face_mut(face);
        f.normal = normal;
        f.plane_offset = plane_offset;
    }

    /// Distance from the plane of `he`'s face to the centroid of the face
    /// across `he`.
    pub(crate) fn opp_face_distance(&self, he: HalfEdgeId) -> Result<f64> {
        let opp_face = self.opposite_face(he)?;
        let centroid = self.face(opp_face).centroid;
        Ok(self.face(self.edge_face(he)).distance_to_plane(&centroid))
    }

    pub(crate) fn check_consistency(&self, face: FaceId) -> Result<()> {
        let f = self.face(face);
        if f.num_verts < 3 {
            return Err(inconsistent(format!(
                "degenerate face {} with {} vertices",
                face.0, f.num_verts
            )));
        }

        let mut num_verts = 0;
        for he in self.face_edges(face) {
            let opp = self.opposite(he)?;
            if self.half_edges[opp.0].opposite != Some(he) {
                return Err(inconsistent(format!(
                    "opposite of half edge {} does not point back",
                    he.0
                )));
            }
            if self.head(opp) != self.tail(he) || self.head(he) != self.tail(opp) {
                return Err(inconsistent(format!(
                    "half edge {} and its opposite disagree on endpoints",
                    he.0
                )));
            }
            let opp_face = self.edge_face(opp);
            if self.face(opp_face).mark == Mark::Deleted {
                return Err(inconsistent(format!(
                    "face {} borders deleted face {}",
                    face.0, opp_face.0
                )));
            }
            num_verts += 1;
        }

        if num_verts != f.num_verts {
            return Err(inconsistent(format!(
                "face {} records {} vertices but has {}",
                face.0, f.num_verts, num_verts
            )));
        }
        Ok(())
    }

    /// Joins `hedge_prev -> hedge` inside `face`. When both border the same
    /// neighbour the edge between them is redundant and is removed; a
    /// neighbouring triangle collapses entirely and is returned as discarded.
    fn connect_half_edges(
        &mut self,
        face: FaceId,
        hedge_prev: HalfEdgeId,
        hedge: HalfEdgeId,
    ) -> Result<Option<FaceId>> {
        let opp_face = self.opposite_face(hedge)?;
        if self.opposite_face(hedge_prev)? != opp_face {
            self.half_edges[hedge_prev.0].next = hedge;
            self.half_edges[hedge.0].prev = hedge_prev;
            return Ok(None);
        }

        let mut discarded = None;
        if hedge_prev == self.face(face).he0 {
            self.face_mut(face).he0 = hedge;
        }

        let hedge_opp = if self.face(opp_face).num_verts == 3 {
            self.face_mut(opp_face).mark = Mark::Deleted;
            discarded = Some(opp_face);
            self.opposite(self.prev(self.opposite(hedge)?))?
        } else {
            let hedge_opp = self.next(self.opposite(hedge)?);
            if self.face(opp_face).he0 == self.prev(hedge_opp) {
                self.face_mut(opp_face).he0 = hedge_opp;
            }
            let skip = self.prev(self.prev(hedge_opp));
            self.half_edges[hedge_opp.0].prev = skip;
            self.half_edges[skip.0].next = hedge_opp;
            hedge_opp
        };

        let before = self.prev(hedge_prev);
        self.half_edges[hedge.0].prev = before;
        self.half_edges[before.0].next = hedge;
        self.set_opposite(hedge, hedge_opp);

        self.compute_normal_and_centroid(opp_face)?;
        Ok(discarded)
    }

    /// Absorbs the face across `hedge_adj` into `face`. Returns every face
    /// that was discarded by the merge, the absorbed one first.
    pub(crate) fn merge_adjacent_face(
        &mut self,
        face: FaceId,
        hedge_adj: HalfEdgeId,
    ) -> Result<Vec<FaceId>> {
        let opp_face = self.opposite_face(hedge_adj)?;
        let mut discarded = vec![opp_face];
        self.face_mut(opp_face).mark = Mark::Deleted;

        let hedge_opp = self.opposite(hedge_adj)?;

        let mut hedge_adj_prev = self.prev(hedge_adj);
        let mut hedge_adj_next = self.next(hedge_adj);
        let mut hedge_opp_prev = self.prev(hedge_opp);
        let mut hedge_opp_next = self.next(hedge_opp);

        // Extend across every edge the two faces share.
        while self.opposite_face(hedge_adj_prev)? == opp_face {
            hedge_adj_prev = self.prev(hedge_adj_prev);
            hedge_opp_next = self.next(hedge_opp_next);
        }
        while self.opposite_face(hedge_adj_next)? == opp_face {
            hedge_opp_prev = self.prev(hedge_opp_prev);
            hedge_adj_next = self.next(hedge_adj_next);
        }

        let stop = self.next(hedge_opp_prev);
        let mut he = hedge_opp_next;
        while he != stop {
            self.half_edges[he.0].face = face;
            he = self.next(he);
        }

        if hedge_adj == self.face(face).he0 {
            self.face_mut(face).he0 = hedge_adj_next;
        }

        if let Some(f) = self.connect_half_edges(face, hedge_opp_prev, hedge_adj_next)? {
            discarded.push(f);
        }
        if let Some(f) = self.connect_half_edges(face, hedge_adj_prev, hedge_opp_next)? {
            discarded.push(f);
        }

        self.compute_normal_and_centroid(face)?;
        self.check_consistency(face)?;
        Ok(discarded)
    }

    /// Splits a polygon into a fan of triangles around the head of its
    /// `he0`. The original face keeps the last triangle; the others are
    /// returned. Every triangle keeps the polygon's plane; slivers cut from
    /// nearly collinear vertices have no usable normal of their own.
    pub(crate) fn triangulate_face(&mut self, face: FaceId) -> Result<Vec<FaceId>> {
        let mut created = Vec::new();
        if self.face(face).num_verts < 4 {
            return Ok(created);
        }
        let (normal, plane_offset) = (self.face(face).normal, self.face(face).plane_offset);

        let he0 = self.face(face).he0;
        let v0 = self.head(he0);
        let last = self.prev(he0);

        let mut hedge = self.next(he0);
        let mut opp_prev = self.opposite(hedge)?;
        hedge = self.next(hedge);

        while hedge != last {
            let (v1, v2) = (self.head(self.prev(hedge)), self.head(hedge));
            let tri = self.create_triangle(v0, v1, v2);
            self.set_plane(tri, normal, plane_offset);
            let tri_he0 = self.face(tri).he0;
            let (tri_next, tri_prev) = (self.next(tri_he0), self.prev(tri_he0));
            self.set_opposite(tri_next, opp_prev);
            let hedge_opp = self.opposite(hedge)?;
            self.set_opposite(tri_prev, hedge_opp);
            opp_prev = tri_he0;
            created.push(tri);
            hedge = self.next(hedge);
        }

        let closing_head = self.head(self.prev(last));
        let closing = self.push_half_edge(closing_head, face);
        self.set_opposite(closing, opp_prev);
        self.half_edges[closing.0].prev = he0;
        self.half_edges[he0.0].next = closing;
        self.half_edges[closing.0].next = last;
        self.half_edges[last.0].prev = closing;

        self.compute_normal_and_centroid(face)?;
        self.set_plane(face, normal, plane_offset);
        self.check_consistency(face)?;
        for &tri in &created {
            self.check_consistency(tri)?;
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> (Mesh, FaceId) {
        let mut mesh = Mesh::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
        ]);
        let face = mesh.create_triangle(VertexId(0), VertexId(1), VertexId(2));
        (mesh, face)
    }

    #[test]
    fn triangle_geometry_is_cached() {
        let (mesh, face) = unit_triangle();
        let f = mesh.face(face);
        assert_eq!(f.num_verts, 3);
        assert!((f.normal - Vector3d::new(0.0, 0.0, 1.0)).norm() < 1e-12);
        assert!((f.area - 1.0).abs() < 1e-12);
        assert!((f.centroid - Point3d::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).norm() < 1e-12);
        assert!(f.plane_offset.abs() < 1e-12);
        assert!((f.distance_to_plane(&Point3d::new(0.2, 0.2, 2.0)) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn edges_walk_the_cycle_both_ways() {
        let (mesh, face) = unit_triangle();
        let heads: Vec<_> = mesh.face_vertices(face).collect();
        assert_eq!(heads, vec![VertexId(0), VertexId(1), VertexId(2)]);

        assert_eq!(mesh.edge(face, -1), mesh.edge(face, 2));
        assert_eq!(mesh.head(mesh.edge(face, -1)), VertexId(2));
        assert_eq!(mesh.tail(mesh.edge(face, 0)), VertexId(2));
    }

    #[test]
    fn unlinked_triangle_fails_consistency() {
        let (mesh, face) = unit_triangle();
        match mesh.check_consistency(face) {
            Err(HullError::MeshConsistency(msg)) => assert!(msg.contains("no opposite")),
            other => panic!("expected a consistency error, got {:?}", other),
        }
    }

    #[test]
    fn collinear_triangle_has_finite_geometry() {
        let mut mesh = Mesh::new(vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(2.0, 0.0, 0.0),
        ]);
        let face = mesh.create_triangle(VertexId(0), VertexId(1), VertexId(2));
        let f = mesh.face(face);
        assert_eq!(f.area, 0.0);
        assert!(f.normal.iter().all(|c| c.is_finite()));
        assert!(f.plane_offset.is_finite());
    }
}
