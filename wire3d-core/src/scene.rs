/// Scene composition: camera, mesh and canvas size
use log::debug;
use nalgebra::Matrix4;

use crate::camera::Camera;
use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::raster::{Color, PixelBuffer, WireframeRasterizer};
use crate::transform::Transform;

/// A single mesh viewed through an orbit camera on a canvas of pixels
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub mesh: Option<Mesh>,
    pub camera: Camera,
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Scene {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            mesh: None,
            camera: Camera::new(),
            canvas_width,
            canvas_height,
        }
    }

    pub fn set_canvas_size(&mut self, width: u32, height: u32) {
        self.canvas_width = width;
        self.canvas_height = height;
    }

    fn require_mesh(&self) -> Result<&Mesh> {
        self.mesh
            .as_ref()
            .ok_or_else(|| Error::state("scene has no mesh attached"))
    }

    /// Full object-to-pixel matrix: model, then view, projection, viewport
    pub fn compose(&self) -> Result<Matrix4<f32>> {
        let mesh = self.require_mesh()?;

        let model = Transform::model(&mesh.scale, &mesh.rotation, &mesh.position);
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();
        let viewport = Transform::viewport(
            self.canvas_width as f32,
            self.canvas_height as f32,
            0.0,
            0.0,
        );

        Ok(viewport * projection * view * model)
    }

    /// Compose the pipeline and project the mesh's vertices with it
    pub fn compose_and_project(&mut self) -> Result<()> {
        let matrix = self.compose()?;
        let (z_near, z_far) = (self.camera.z_near(), self.camera.z_far());

        let mesh = self
            .mesh
            .as_mut()
            .ok_or_else(|| Error::state("scene has no mesh attached"))?;
        mesh.transform(&matrix, z_near, z_far);

        debug!(
            "projected {} vertices for {}x{} canvas",
            mesh.vertices.len(),
            self.canvas_width,
            self.canvas_height
        );
        Ok(())
    }

    /// Project the mesh and draw its wireframe into `buffer`
    pub fn render(
        &mut self,
        rasterizer: &WireframeRasterizer,
        buffer: &mut PixelBuffer,
        color: Color,
    ) -> Result<()> {
        self.compose_and_project()?;
        let mesh = self.require_mesh()?;
        rasterizer.render(mesh, buffer, self.camera.z_near(), self.camera.z_far(), color);
        Ok(())
    }
}
