/// Polygon mesh geometry and its derived per-vertex buffers
use std::fmt;

use nalgebra::{Matrix4, Vector3, Vector4};

use crate::transform::RotationState;

/// One face corner: a vertex index plus optional texture and normal indices.
///
/// Indices are 0-based. `Display` writes the 1-based text form (`v`, `v/t`,
/// `v//n` or `v/t/n`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceIndex {
    pub vertex: usize,
    pub texture: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceIndex {
    pub fn new(vertex: usize, texture: Option<usize>, normal: Option<usize>) -> Self {
        Self {
            vertex,
            texture,
            normal,
        }
    }

    pub fn vertex_only(vertex: usize) -> Self {
        Self::new(vertex, None, None)
    }
}

impl fmt::Display for FaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertex = self.vertex + 1;
        match (self.texture, self.normal) {
            (Some(t), Some(n)) => write!(f, "{}/{}/{}", vertex, t + 1, n + 1),
            (Some(t), None) => write!(f, "{}/{}", vertex, t + 1),
            (None, Some(n)) => write!(f, "{}//{}", vertex, n + 1),
            (None, None) => write!(f, "{}", vertex),
        }
    }
}

/// A polygon given by its ordered corner list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Face {
    pub indices: Vec<FaceIndex>,
}

impl Face {
    pub fn new(indices: Vec<FaceIndex>) -> Self {
        Self { indices }
    }

    /// Build a face from 0-based vertex indices only
    pub fn from_vertices(vertices: &[usize]) -> Self {
        Self::new(vertices.iter().copied().map(FaceIndex::vertex_only).collect())
    }

    /// Corner pairs of the closed polyline, wrapping last to first
    pub fn edges(&self) -> impl Iterator<Item = (&FaceIndex, &FaceIndex)> + '_ {
        let count = self.indices.len();
        (0..count).map(move |i| (&self.indices[i], &self.indices[(i + 1) % count]))
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "f")?;
        for index in &self.indices {
            write!(f, " {}", index)?;
        }
        Ok(())
    }
}

/// A polygon mesh with its model transform state.
///
/// `world_vertices` and `projected_vertices` are derived from `vertices` by
/// [`Mesh::compute_world_vertices`] and [`Mesh::transform`]. They are
/// reallocated only when their length no longer matches the vertex count and
/// are fully rewritten on every call.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vector4<f32>>,
    pub texture_coords: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub faces: Vec<Face>,
    pub position: Vector3<f32>,
    pub rotation: RotationState,
    pub scale: Vector3<f32>,
    world_vertices: Vec<Vector4<f32>>,
    projected_vertices: Vec<Vector4<f32>>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            texture_coords: Vec::new(),
            normals: Vec::new(),
            faces: Vec::new(),
            position: Vector3::zeros(),
            rotation: RotationState::default(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            world_vertices: Vec::new(),
            projected_vertices: Vec::new(),
        }
    }

    /// Append a vertex with `w = 1`
    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) -> usize {
        self.vertices.push(Vector4::new(x, y, z, 1.0));
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Drop all geometry and derived buffers. The model transform is kept.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.texture_coords.clear();
        self.normals.clear();
        self.faces.clear();
        self.world_vertices.clear();
        self.projected_vertices.clear();
    }

    /// Move the model by `delta` in world space
    pub fn translate(&mut self, delta: &Vector3<f32>) {
        self.position += delta;
    }

    /// Rotate the model by delta angles (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation.rotate(dx, dy, dz);
    }

    /// Vertices after the last [`Mesh::transform`] call
    pub fn projected_vertices(&self) -> &[Vector4<f32>] {
        &self.projected_vertices
    }

    /// Vertices after the last [`Mesh::compute_world_vertices`] call
    pub fn world_vertices(&self) -> &[Vector4<f32>] {
        &self.world_vertices
    }

    /// Project every vertex with `matrix` into the projected buffer.
    ///
    /// The perspective divide is applied only when the resulting `w` lies
    /// strictly between `z_near` and `z_far`. Vertices on or beyond either clip
    /// plane keep their homogeneous coordinates, which keeps near-zero `w` out
    /// of the divide.
    pub fn transform(&mut self, matrix: &Matrix4<f32>, z_near: f32, z_far: f32) {
        fit_to_len(&mut self.projected_vertices, self.vertices.len());

        for (projected, vertex) in self.projected_vertices.iter_mut().zip(&self.vertices) {
            let v = matrix * vertex;
            *projected = if v.w > z_near && v.w < z_far { v / v.w } else { v };
        }
    }

    /// Multiply every vertex by `world` into the world buffer (no divide)
    pub fn compute_world_vertices(&mut self, world: &Matrix4<f32>) {
        fit_to_len(&mut self.world_vertices, self.vertices.len());

        for (out, vertex) in self.world_vertices.iter_mut().zip(&self.vertices) {
            *out = world * vertex;
        }
    }

    /// Create an axis-aligned cube mesh made of six quads
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::new();

        for &(x, y, z) in &[
            (-half, -half, half),
            (half, -half, half),
            (half, half, half),
            (-half, half, half),
            (-half, -half, -half),
            (half, -half, -half),
            (half, half, -half),
            (-half, half, -half),
        ] {
            mesh.add_vertex(x, y, z);
        }

        // Front, back, top, bottom, right, left
        for corners in &[
            [0usize, 1, 2, 3],
            [5, 4, 7, 6],
            [3, 2, 6, 7],
            [4, 5, 1, 0],
            [1, 5, 6, 2],
            [4, 0, 3, 7],
        ] {
            mesh.add_face(Face::from_vertices(corners));
        }

        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

fn fit_to_len(buffer: &mut Vec<Vector4<f32>>, len: usize) {
    if buffer.len() != len {
        *buffer = vec![Vector4::zeros(); len];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn single_vertex_mesh(x: f32, y: f32, z: f32, w: f32) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vector4::new(x, y, z, w));
        mesh
    }

    #[test]
    fn test_face_index_display() {
        assert_eq!(FaceIndex::new(0, Some(1), Some(2)).to_string(), "1/2/3");
        assert_eq!(FaceIndex::new(0, None, Some(2)).to_string(), "1//3");
        assert_eq!(FaceIndex::new(0, Some(1), None).to_string(), "1/2");
        assert_eq!(FaceIndex::vertex_only(4).to_string(), "5");
    }

    #[test]
    fn test_face_display() {
        let face = Face::from_vertices(&[0, 1, 2]);
        assert_eq!(face.to_string(), "f 1 2 3");
    }

    #[test]
    fn test_face_edges_wrap_around() {
        let face = Face::from_vertices(&[3, 4, 5]);
        let edges: Vec<_> = face.edges().map(|(a, b)| (a.vertex, b.vertex)).collect();
        assert_eq!(edges, vec![(3, 4), (4, 5), (5, 3)]);
    }

    #[test]
    fn test_cube_topology() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.vertices.len(), 8);
        assert_eq!(cube.faces.len(), 6);
        assert!(cube.faces.iter().all(|f| f.indices.len() == 4));
        assert!(cube
            .vertices
            .iter()
            .all(|v| v.x.abs() == 1.0 && v.y.abs() == 1.0 && v.z.abs() == 1.0 && v.w == 1.0));
    }

    #[test]
    fn test_transform_divides_inside_clip_range() {
        let mut mesh = single_vertex_mesh(2.0, 4.0, 6.0, 2.0);
        mesh.transform(&Matrix4::identity(), 0.5, 10.0);
        assert_relative_eq!(mesh.projected_vertices()[0], Vector4::new(1.0, 2.0, 3.0, 1.0));
    }

    #[test]
    fn test_transform_does_not_divide_at_near_plane() {
        let mut mesh = single_vertex_mesh(2.0, 4.0, 6.0, 0.5);
        mesh.transform(&Matrix4::identity(), 0.5, 10.0);
        assert_eq!(mesh.projected_vertices()[0], Vector4::new(2.0, 4.0, 6.0, 0.5));
    }

    #[test]
    fn test_transform_does_not_divide_at_far_plane() {
        let mut mesh = single_vertex_mesh(2.0, 4.0, 6.0, 10.0);
        mesh.transform(&Matrix4::identity(), 0.5, 10.0);
        assert_eq!(mesh.projected_vertices()[0], Vector4::new(2.0, 4.0, 6.0, 10.0));
    }

    #[test]
    fn test_transform_does_not_divide_behind_camera() {
        let mut mesh = single_vertex_mesh(1.0, 1.0, 1.0, -3.0);
        mesh.transform(&Matrix4::identity(), 0.5, 10.0);
        assert_eq!(mesh.projected_vertices()[0], Vector4::new(1.0, 1.0, 1.0, -3.0));
    }

    #[test]
    fn test_transform_resizes_projected_buffer() {
        let mut mesh = Mesh::cube(1.0);
        mesh.transform(&Matrix4::identity(), 0.01, 100.0);
        assert_eq!(mesh.projected_vertices().len(), 8);

        mesh.add_vertex(0.0, 0.0, 0.0);
        mesh.transform(&Matrix4::identity(), 0.01, 100.0);
        assert_eq!(mesh.projected_vertices().len(), 9);
        // Projected buffer does not touch the world buffer
        assert!(mesh.world_vertices().is_empty());
    }

    #[test]
    fn test_transform_recomputes_on_every_call() {
        let mut mesh = single_vertex_mesh(1.0, 0.0, 0.0, 1.0);
        mesh.transform(&Matrix4::identity(), 0.5, 10.0);
        mesh.transform(&(Matrix4::identity() * 3.0), 0.5, 10.0);
        // w = 3 is inside the range, so the result is divided back to (1,0,0,1)
        assert_relative_eq!(mesh.projected_vertices()[0], Vector4::new(1.0, 0.0, 0.0, 1.0));

        let translate = crate::transform::Transform::translation(&Vector3::new(1.0, 0.0, 0.0));
        mesh.transform(&translate, 0.5, 10.0);
        assert_relative_eq!(mesh.projected_vertices()[0], Vector4::new(2.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_compute_world_vertices() {
        let mut mesh = single_vertex_mesh(1.0, 2.0, 3.0, 1.0);
        let world = Matrix4::identity() * 2.0;
        mesh.compute_world_vertices(&world);
        // No perspective divide even though w is 2
        assert_eq!(mesh.world_vertices()[0], Vector4::new(2.0, 4.0, 6.0, 2.0));
        assert!(mesh.projected_vertices().is_empty());
    }

    #[test]
    fn test_translate_and_rotate() {
        let mut mesh = Mesh::new();
        mesh.translate(&Vector3::new(0.0, 0.05, 0.0));
        mesh.translate(&Vector3::new(-0.05, 0.0, 0.0));
        mesh.rotate(0.1, 0.0, 0.0);
        assert_relative_eq!(mesh.position, Vector3::new(-0.05, 0.05, 0.0));
        assert!((mesh.rotation.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_clear_keeps_model_state() {
        let mut mesh = Mesh::cube(1.0);
        mesh.translate(&Vector3::new(1.0, 0.0, 0.0));
        mesh.transform(&Matrix4::identity(), 0.01, 100.0);
        mesh.clear();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.faces.is_empty());
        assert!(mesh.projected_vertices().is_empty());
        assert_eq!(mesh.position.x, 1.0);
    }
}
