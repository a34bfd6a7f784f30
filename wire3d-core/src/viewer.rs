/// Input-driven controller used by front ends.
///
/// A front end feeds the viewer with canvas sizes, wheel and drag deltas and
/// pan keys. The viewer adjusts the camera and the mesh, re-projects and
/// redraws its pixel buffer, which the front end then presents.
use std::path::Path;

use log::debug;
use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::mesh::Mesh;
use crate::obj;
use crate::raster::{Color, PixelBuffer, WireframeRasterizer};
use crate::scene::Scene;

/// Input sensitivities and colors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewerConfig {
    /// Radius change per wheel unit (one notch is usually 120 units)
    pub zoom_per_wheel_unit: f32,
    /// Rotation in radians per pixel of drag
    pub rotate_per_pixel: f32,
    /// Model translation per pan key press
    pub pan_step: f32,
    pub wire_color: Color,
    pub background: Color,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            zoom_per_wheel_unit: 1.0 / 1000.0,
            rotate_per_pixel: std::f32::consts::PI / 360.0,
            pan_step: 0.05,
            wire_color: Color::GREY,
            background: Color::WHITE,
        }
    }
}

/// Mouse button held during a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragButton {
    /// Vertical motion tilts the model around x
    Left,
    /// Horizontal motion turns the model around y
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Up,
    Down,
    Left,
    Right,
}

pub struct Viewer {
    scene: Scene,
    buffer: Option<PixelBuffer>,
    rasterizer: WireframeRasterizer,
    config: ViewerConfig,
}

impl Viewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            scene: Scene::default(),
            buffer: None,
            rasterizer: WireframeRasterizer::with_background(config.background),
            config,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    pub fn buffer_mut(&mut self) -> Option<&mut PixelBuffer> {
        self.buffer.as_mut()
    }

    /// Replace the mesh and redraw if a canvas exists
    pub fn set_mesh(&mut self, mesh: Mesh) -> Result<()> {
        self.scene.mesh = Some(mesh);
        if self.buffer.is_some() {
            self.redraw()?;
        }
        Ok(())
    }

    /// Load a mesh file. On failure the current mesh is kept.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mesh = obj::load(path)?;
        self.set_mesh(mesh)
    }

    pub fn load_str(&mut self, text: &str) -> Result<()> {
        let mesh = obj::parse(text)?;
        self.set_mesh(mesh)
    }

    /// Set the canvas size, reallocating the buffer when it changes
    pub fn resize(&mut self, width: u32, height: u32) {
        self.scene.set_canvas_size(width, height);
        match self.buffer.as_mut() {
            Some(buffer) => buffer.resize(width as usize, height as usize),
            None => self.buffer = Some(PixelBuffer::new(width as usize, height as usize)),
        }
    }

    /// Zoom by wheel delta; positive moves the camera closer.
    ///
    /// Returns `false` without touching anything when no mesh is loaded.
    pub fn on_wheel(&mut self, delta: f32) -> Result<bool> {
        if self.scene.mesh.is_none() {
            return Ok(false);
        }
        self.scene.camera.zoom(delta * self.config.zoom_per_wheel_unit);
        self.redraw()?;
        Ok(true)
    }

    /// Rotate the model by a drag of `(dx, dy)` pixels
    pub fn on_drag(&mut self, button: DragButton, dx: f32, dy: f32) -> Result<bool> {
        let step = self.config.rotate_per_pixel;
        let Some(mesh) = self.scene.mesh.as_mut() else {
            return Ok(false);
        };
        match button {
            DragButton::Left => mesh.rotate(dy * step, 0.0, 0.0),
            DragButton::Right => mesh.rotate(0.0, dx * step, 0.0),
        }
        self.redraw()?;
        Ok(true)
    }

    /// Move the model one pan step
    pub fn on_pan(&mut self, direction: PanDirection) -> Result<bool> {
        let step = self.config.pan_step;
        let Some(mesh) = self.scene.mesh.as_mut() else {
            return Ok(false);
        };
        let delta = match direction {
            PanDirection::Up => Vector3::new(0.0, step, 0.0),
            PanDirection::Down => Vector3::new(0.0, -step, 0.0),
            PanDirection::Left => Vector3::new(-step, 0.0, 0.0),
            PanDirection::Right => Vector3::new(step, 0.0, 0.0),
        };
        mesh.translate(&delta);
        self.redraw()?;
        Ok(true)
    }

    /// Re-project the mesh and draw a full frame
    pub fn redraw(&mut self) -> Result<()> {
        let buffer = self
            .buffer
            .as_mut()
            .ok_or_else(|| Error::state("no pixel buffer; call resize first"))?;
        self.scene
            .render(&self.rasterizer, buffer, self.config.wire_color)?;
        debug!("redrew frame, camera radius {}", self.scene.camera.radius());
        Ok(())
    }
}

impl Default for Viewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}
