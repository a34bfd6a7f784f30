/// Wireframe rasterizer drawing mesh edges into a shared pixel buffer
use std::io::{self, Write};
use std::sync::atomic::{AtomicU32, Ordering};

use log::debug;
use nalgebra::Vector4;
use rayon::prelude::*;

use crate::mesh::{Face, Mesh};

/// An 8-bit ARGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_argb(255, 255, 255, 255);
    pub const BLACK: Color = Color::from_argb(255, 0, 0, 0);
    /// Default wire color
    pub const GREY: Color = Color::from_argb(255, 150, 147, 147);

    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::from_argb(255, r, g, b)
    }

    /// Pack as `0xAARRGGBB`
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    pub const fn from_packed(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }
}

/// Pre-sized, row-major ARGB pixel buffer.
///
/// Pixels are atomics so that parallel draw tasks can share the buffer by
/// reference. Mutation from the outside always goes through `&mut self`, so
/// nobody can observe a pass that is still clearing or drawing.
pub struct PixelBuffer {
    width: usize,
    height: usize,
    pixels: Vec<AtomicU32>,
    dirty: bool,
}

impl PixelBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: (0..width * height).map(|_| AtomicU32::new(0)).collect(),
            dirty: false,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Reallocate for new dimensions. Content is discarded only when the size
    /// actually changes.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    /// Packed ARGB value at `(x, y)`
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y * self.width + x].load(Ordering::Relaxed))
    }

    /// Copy of all pixels in row-major order
    pub fn snapshot(&self) -> Vec<u32> {
        self.pixels.iter().map(|p| p.load(Ordering::Relaxed)).collect()
    }

    /// Set every pixel to `color`
    pub fn fill(&mut self, color: Color) {
        let argb = color.to_argb();
        self.pixels.par_iter_mut().for_each(|p| *p.get_mut() = argb);
    }

    /// Returns whether a pass completed since the last call, and resets it.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Write the buffer as an ASCII PPM image
    pub fn write_ppm<W: Write>(&self, mut writer: W) -> io::Result<()> {
        write!(writer, "P3\n{} {}\n255\n", self.width, self.height)?;
        for row in self.snapshot().chunks(self.width.max(1)) {
            for &argb in row {
                let color = Color::from_packed(argb);
                write!(writer, "{} {} {} ", color.r, color.g, color.b)?;
            }
            writeln!(writer)?;
        }
        writer.flush()
    }

    fn surface(&self, argb: u32) -> Surface<'_> {
        Surface {
            pixels: &self.pixels,
            width: self.width as i64,
            height: self.height as i64,
            argb,
        }
    }
}

/// Shared write access to a pixel buffer during one pass.
///
/// Edges from different faces may cover the same pixel. Those writes are not
/// ordered, so the last store wins. Every store in a pass writes the same
/// color, so the result does not depend on the order.
struct Surface<'a> {
    pixels: &'a [AtomicU32],
    width: i64,
    height: i64,
    argb: u32,
}

impl Surface<'_> {
    fn put(&self, x: i64, y: i64) {
        if x >= 0 && x < self.width && y >= 0 && y < self.height {
            self.pixels[(y * self.width + x) as usize].store(self.argb, Ordering::Relaxed);
        }
    }
}

/// Draws the closed polyline of every face from a mesh's projected vertices
pub struct WireframeRasterizer {
    background: Color,
}

impl WireframeRasterizer {
    pub fn new() -> Self {
        Self::with_background(Color::WHITE)
    }

    pub fn with_background(background: Color) -> Self {
        Self { background }
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Clear `buffer` and draw every face edge of `mesh` in `color`.
    ///
    /// Faces are drawn in parallel. Edges are skipped when an endpoint index
    /// is out of range, when both endpoints lie on the same outer side of the
    /// canvas, or when either endpoint's depth is outside `[z_near, z_far]`.
    pub fn render(
        &self,
        mesh: &Mesh,
        buffer: &mut PixelBuffer,
        z_near: f32,
        z_far: f32,
        color: Color,
    ) {
        buffer.fill(self.background);

        let projected = mesh.projected_vertices();
        let surface = buffer.surface(color.to_argb());
        let edges: usize = mesh
            .faces
            .par_iter()
            .map(|face| draw_face(face, projected, &surface, z_near, z_far))
            .sum();

        buffer.dirty = true;
        debug!(
            "rendered {} faces, {} edges into {}x{} buffer",
            mesh.faces.len(),
            edges,
            buffer.width,
            buffer.height
        );
    }
}

impl Default for WireframeRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw one face and return the number of edges that reached the line stage
fn draw_face(
    face: &Face,
    projected: &[Vector4<f32>],
    surface: &Surface<'_>,
    z_near: f32,
    z_far: f32,
) -> usize {
    if face.indices.len() < 2 {
        return 0;
    }

    let mut drawn = 0;
    for (a, b) in face.edges() {
        let (Some(p0), Some(p1)) = (projected.get(a.vertex), projected.get(b.vertex)) else {
            continue;
        };
        if !p0.iter().chain(p1.iter()).all(|c| c.is_finite()) {
            continue;
        }

        let s0 = [p0.x.round() as f64, p0.y.round() as f64];
        let s1 = [p1.x.round() as f64, p1.y.round() as f64];
        let (width, height) = (surface.width as f64, surface.height as f64);

        if (s0[0] >= width && s1[0] >= width)
            || (s0[0] < 0.0 && s1[0] < 0.0)
            || (s0[1] >= height && s1[1] >= height)
            || (s0[1] < 0.0 && s1[1] < 0.0)
        {
            continue;
        }

        if p0.z < z_near || p1.z < z_near || p0.z > z_far || p1.z > z_far {
            continue;
        }

        let (Some((x0, y0)), Some((x1, y1))) = (
            enter_guard_band(s0, s1, width, height),
            enter_guard_band(s1, s0, width, height),
        ) else {
            continue;
        };

        for_each_line_point(x0, y0, x1, y1, |x, y| surface.put(x, y));
        drawn += 1;
    }
    drawn
}

/// Pixels kept around the canvas when a long edge is shortened
const GUARD_BAND: f64 = 4096.0;

/// Slide `from` along the edge towards `to` until it lies within
/// [`GUARD_BAND`] pixels of the canvas.
///
/// Endpoints already inside the band come back unchanged, so only edges
/// reaching far off-canvas are shortened. The coordinate of the band side that
/// is crossed is set exactly. Returns `None` when the edge misses the band.
fn enter_guard_band(from: [f64; 2], to: [f64; 2], width: f64, height: f64) -> Option<(i64, i64)> {
    let lo = [-GUARD_BAND, -GUARD_BAND];
    let hi = [width + GUARD_BAND, height + GUARD_BAND];

    let mut entry = from;
    let mut t_entry = 0.0;
    for axis in 0..2 {
        let side = if from[axis] < lo[axis] {
            lo[axis]
        } else if from[axis] > hi[axis] {
            hi[axis]
        } else {
            continue;
        };
        let t = (side - from[axis]) / (to[axis] - from[axis]);
        if t > t_entry {
            t_entry = t;
            entry = [
                from[0] + t * (to[0] - from[0]),
                from[1] + t * (to[1] - from[1]),
            ];
            entry[axis] = side;
        }
    }

    let inside = (0..2).all(|axis| entry[axis] >= lo[axis] && entry[axis] <= hi[axis]);
    inside.then(|| (entry[0].round() as i64, entry[1].round() as i64))
}

/// Visit the integer points of the segment `(x0, y0)..=(x1, y1)`, stepping
/// along the dominant axis and advancing the minor axis whenever the
/// accumulated error exceeds one.
///
/// Coordinates must be small enough that twice their differences fit in an
/// `i64`; the rasterizer only passes points inside the guard band.
pub fn for_each_line_point<F>(x0: i64, y0: i64, x1: i64, y1: i64, mut visit: F)
where
    F: FnMut(i64, i64),
{
    let (dx, dy) = (x1 - x0, y1 - y0);
    let (step_x, step_y) = (dx.signum(), dy.signum());
    let (width, height) = (dx.abs(), dy.abs());

    let x_major = width >= height;
    let length = width.max(height);
    let error_inc = 2 * width.min(height);
    let error_dec = 2 * length;

    let mut error = 0;
    let mut minor = 0;
    for major in 0..=length {
        if x_major {
            visit(x0 + step_x * major, y0 + step_y * minor);
        } else {
            visit(x0 + step_x * minor, y0 + step_y * major);
        }

        error += error_inc;
        if error > 1 {
            error -= error_dec;
            minor += 1;
        }
    }
}
