/// Terminal front end for the wireframe viewer
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::io::{self, stdout, Write};
use std::time::Duration;
use wire3d_core::{Color, DragButton, Mesh, PanDirection, Viewer, ViewerConfig};

pub mod renderer;

pub use renderer::TerminalPresenter;

/// Wheel units sent per scroll step or `+`/`-` key
const WHEEL_STEP: f32 = 120.0;
/// Drag distance credited per terminal cell of mouse motion
const PIXELS_PER_CELL: f32 = 8.0;
/// Terminal cells are roughly twice as tall as wide
const CELL_ASPECT: f32 = 0.5;

/// Convert a core error for `io::Result` call sites
pub fn to_io_error(err: wire3d_core::Error) -> io::Error {
    let kind = match err {
        wire3d_core::Error::NotFound { .. } => io::ErrorKind::NotFound,
        wire3d_core::Error::Format { .. } => io::ErrorKind::InvalidData,
        _ => io::ErrorKind::Other,
    };
    io::Error::new(kind, err)
}

/// Parse `RRGGBB` or `#RRGGBB` into an opaque color
pub fn parse_hex_color(text: &str) -> Result<Color, String> {
    let hex = text.trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("expected a color like #969393, got '{}'", text));
    }
    let value = u32::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
    Ok(Color::from_rgb((value >> 16) as u8, (value >> 8) as u8, value as u8))
}

/// Camera aspect for a canvas of terminal cells
pub fn cell_aspect(width: u16, height: u16) -> f32 {
    width as f32 * CELL_ASPECT / height.max(1) as f32
}

/// Main application struct for the terminal wireframe viewer
pub struct TerminalApp {
    viewer: Viewer,
    presenter: TerminalPresenter,
    running: bool,
    last_mouse: Option<(u16, u16)>,
}

impl TerminalApp {
    pub fn new(mesh: Mesh, config: ViewerConfig) -> io::Result<Self> {
        let mut app = Self {
            viewer: Viewer::new(config),
            presenter: TerminalPresenter::new(config.background),
            running: true,
            last_mouse: None,
        };

        let (width, height) = terminal::size()?;
        app.resize(width, height);
        app.viewer.set_mesh(mesh).map_err(to_io_error)?;
        Ok(app)
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            EnableMouseCapture,
            cursor::Hide
        )?;

        let result = self.main_loop();

        // Cleanup
        execute!(
            stdout(),
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        self.render()?;

        while self.running {
            if event::poll(Duration::from_millis(50))? {
                self.handle_event(event::read()?)?;
            }

            let dirty = self
                .viewer
                .buffer_mut()
                .map(|b| b.take_dirty())
                .unwrap_or(false);
            if dirty {
                self.render()?;
            }
        }

        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) {
        // Last row holds the status line
        let rows = height.saturating_sub(1).max(1);
        self.viewer.resize(width as u32, rows as u32);
        self.viewer.scene_mut().camera.aspect = cell_aspect(width, rows);
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => {
                self.resize(width, height);
                self.viewer.redraw().map_err(to_io_error)
            }
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> io::Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }

        let step = PIXELS_PER_CELL;
        let result = match key.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
                return Ok(());
            }
            KeyCode::Char('w') => self.viewer.on_pan(PanDirection::Up),
            KeyCode::Char('s') => self.viewer.on_pan(PanDirection::Down),
            KeyCode::Char('a') => self.viewer.on_pan(PanDirection::Left),
            KeyCode::Char('d') => self.viewer.on_pan(PanDirection::Right),
            KeyCode::Char('+') | KeyCode::Char('=') => self.viewer.on_wheel(WHEEL_STEP),
            KeyCode::Char('-') => self.viewer.on_wheel(-WHEEL_STEP),
            KeyCode::Up => self.viewer.on_drag(DragButton::Left, 0.0, -step),
            KeyCode::Down => self.viewer.on_drag(DragButton::Left, 0.0, step),
            KeyCode::Left => self.viewer.on_drag(DragButton::Right, -step, 0.0),
            KeyCode::Right => self.viewer.on_drag(DragButton::Right, step, 0.0),
            _ => Ok(false),
        };
        result.map(|_| ()).map_err(to_io_error)
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) -> io::Result<()> {
        let position = (mouse.column, mouse.row);
        let result = match mouse.kind {
            MouseEventKind::ScrollUp => self.viewer.on_wheel(WHEEL_STEP),
            MouseEventKind::ScrollDown => self.viewer.on_wheel(-WHEEL_STEP),
            MouseEventKind::Drag(button) => {
                let (last_col, last_row) = self.last_mouse.unwrap_or(position);
                let dx = (mouse.column as f32 - last_col as f32) * PIXELS_PER_CELL;
                let dy = (mouse.row as f32 - last_row as f32) * PIXELS_PER_CELL;
                match button {
                    MouseButton::Left => self.viewer.on_drag(DragButton::Left, dx, dy),
                    MouseButton::Right => self.viewer.on_drag(DragButton::Right, dx, dy),
                    MouseButton::Middle => Ok(false),
                }
            }
            _ => Ok(false),
        };
        self.last_mouse = Some(position);
        result.map(|_| ()).map_err(to_io_error)
    }

    fn render(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        if let Some(buffer) = self.viewer.buffer() {
            self.presenter.draw(buffer, &mut stdout)?;
        }

        // Status line below the canvas
        let row = self.viewer.scene().canvas_height as u16;
        queue!(
            stdout,
            cursor::MoveTo(0, row),
            SetForegroundColor(TermColor::Yellow),
            Print(format!(
                "Wire3D | radius: {:.2} | WASD=Move Arrows/Drag=Rotate +/-/Wheel=Zoom Q=Quit",
                self.viewer.scene().camera.radius()
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}
