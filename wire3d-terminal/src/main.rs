/// Wire3D Terminal Viewer
///
/// Shows a mesh file as a wireframe in the terminal, or renders one frame to
/// a PPM image with `--snapshot`.
/// Controls:
///   - Left drag / Up, Down: tilt the model
///   - Right drag / Left, Right: turn the model
///   - Wheel / +, -: zoom
///   - WASD: move the model
///   - Q/ESC: Quit

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use wire3d_core::{obj, Color, Mesh, PixelBuffer, Scene, ViewerConfig, WireframeRasterizer};
use wire3d_terminal::{parse_hex_color, to_io_error, TerminalApp};

#[derive(Parser, Debug)]
#[command(name = "wire3d-terminal", about = "Wireframe mesh viewer for the terminal")]
struct Args {
    /// Mesh file to show; a cube is used when omitted
    mesh: Option<PathBuf>,

    /// Render one frame to this PPM file instead of opening the viewer
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Snapshot width in pixels
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Snapshot height in pixels
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Wire color as RRGGBB
    #[arg(long, value_parser = parse_hex_color, default_value = "969393")]
    color: Color,
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let mesh = match &args.mesh {
        Some(path) => obj::load(path).map_err(to_io_error)?,
        None => Mesh::cube(2.0),
    };

    let config = ViewerConfig {
        wire_color: args.color,
        ..ViewerConfig::default()
    };

    if let Some(path) = &args.snapshot {
        return snapshot(mesh, &config, &args, path);
    }

    let mut app = TerminalApp::new(mesh, config)?;
    app.run()
}

fn snapshot(mesh: Mesh, config: &ViewerConfig, args: &Args, path: &Path) -> io::Result<()> {
    let mut scene = Scene::new(args.width, args.height);
    scene.camera.aspect = args.width as f32 / args.height.max(1) as f32;
    scene.mesh = Some(mesh);

    let rasterizer = WireframeRasterizer::with_background(config.background);
    let mut buffer = PixelBuffer::new(args.width as usize, args.height as usize);
    scene
        .render(&rasterizer, &mut buffer, config.wire_color)
        .map_err(to_io_error)?;

    buffer.write_ppm(BufWriter::new(File::create(path)?))?;
    println!("Wrote {}x{} frame to {}", args.width, args.height, path.display());
    Ok(())
}
