/// Reader and writer for the plain-text mesh format (`v`, `vt`, `vn`, `f`)
use std::fs;
use std::path::Path;

use log::{debug, trace};
use nalgebra::{Vector3, Vector4};
use nom::{
    character::complete::{char, i64 as integer},
    combinator::{all_consuming, opt},
    number::complete::float,
    sequence::{preceded, tuple},
    IResult,
};

use crate::error::{Error, Result};
use crate::mesh::{Face, FaceIndex, Mesh};

/// Load a mesh from a text file
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::NotFound {
                path: path.to_path_buf(),
            })
        }
        Err(e) => return Err(e.into()),
    };

    debug!("loading mesh from {}", path.display());
    parse(&text)
}

/// Write a mesh to a text file, replacing any existing content
pub fn save<P: AsRef<Path>>(path: P, mesh: &Mesh) -> Result<()> {
    fs::write(path, serialize(mesh))?;
    Ok(())
}

/// Parse mesh text into a new mesh.
///
/// Blank lines, `#` comments and unknown record kinds are ignored. Records
/// with too few fields are skipped. A malformed number or index fails the
/// whole parse.
pub fn parse(input: &str) -> Result<Mesh> {
    let mut mesh = Mesh::new();

    for (number, line) in input.lines().enumerate() {
        parse_line(line.trim(), number + 1, &mut mesh)?;
    }

    debug!(
        "parsed mesh: {} vertices, {} texture coords, {} normals, {} faces",
        mesh.vertices.len(),
        mesh.texture_coords.len(),
        mesh.normals.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Serialize a mesh: vertices, texture coords, normals, then faces
pub fn serialize(mesh: &Mesh) -> String {
    let mut out = String::new();

    for v in &mesh.vertices {
        out.push_str(&format!("v {} {} {} {}\n", v.x, v.y, v.z, v.w));
    }
    for vt in &mesh.texture_coords {
        out.push_str(&format!("vt {} {} {}\n", vt.x, vt.y, vt.z));
    }
    for vn in &mesh.normals {
        out.push_str(&format!("vn {} {} {}\n", vn.x, vn.y, vn.z));
    }
    for face in &mesh.faces {
        out.push_str(&format!("{}\n", face));
    }

    out
}

fn parse_line(line: &str, number: usize, mesh: &mut Mesh) -> Result<()> {
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let mut tokens = line.split_whitespace();
    let kind = match tokens.next() {
        Some(kind) => kind.to_ascii_lowercase(),
        None => return Ok(()),
    };
    let data: Vec<&str> = tokens.collect();

    match kind.as_str() {
        "v" => parse_vertex(&data, number, mesh),
        "vt" => parse_texture_coord(&data, number, mesh),
        "vn" => parse_normal(&data, number, mesh),
        "f" => parse_face(&data, number, mesh),
        other => {
            trace!("line {}: ignoring record kind '{}'", number, other);
            Ok(())
        }
    }
}

fn parse_vertex(data: &[&str], line: usize, mesh: &mut Mesh) -> Result<()> {
    if data.len() < 3 {
        trace!("line {}: skipping vertex with {} fields", line, data.len());
        return Ok(());
    }

    let x = parse_float(data[0], line)?;
    let y = parse_float(data[1], line)?;
    let z = parse_float(data[2], line)?;
    let w = optional_float(data, 3, 1.0, line)?;

    mesh.vertices.push(Vector4::new(x, y, z, w));
    Ok(())
}

fn parse_texture_coord(data: &[&str], line: usize, mesh: &mut Mesh) -> Result<()> {
    if data.is_empty() {
        trace!("line {}: skipping empty texture coord", line);
        return Ok(());
    }

    let u = parse_float(data[0], line)?;
    let v = optional_float(data, 1, 0.0, line)?;
    let w = optional_float(data, 2, 0.0, line)?;

    mesh.texture_coords.push(Vector3::new(u, v, w));
    Ok(())
}

fn parse_normal(data: &[&str], line: usize, mesh: &mut Mesh) -> Result<()> {
    if data.len() < 3 {
        trace!("line {}: skipping normal with {} fields", line, data.len());
        return Ok(());
    }

    let i = parse_float(data[0], line)?;
    let j = parse_float(data[1], line)?;
    let k = parse_float(data[2], line)?;

    mesh.normals.push(Vector3::new(i, j, k));
    Ok(())
}

fn parse_face(data: &[&str], line: usize, mesh: &mut Mesh) -> Result<()> {
    if data.len() < 3 {
        trace!("line {}: skipping face with {} corners", line, data.len());
        return Ok(());
    }

    let indices = data
        .iter()
        .map(|token| parse_face_index(token, line, mesh))
        .collect::<Result<Vec<_>>>()?;

    mesh.add_face(Face::new(indices));
    Ok(())
}

/// Raw corner fields: vertex, then `/texture` and `/normal` groups whose
/// numbers may be empty.
type RawCorner = (i64, Option<Option<i64>>, Option<Option<i64>>);

fn corner(input: &str) -> IResult<&str, RawCorner> {
    tuple((
        integer,
        opt(preceded(char('/'), opt(integer))),
        opt(preceded(char('/'), opt(integer))),
    ))(input)
}

fn parse_face_index(token: &str, line: usize, mesh: &Mesh) -> Result<FaceIndex> {
    let (_, (vertex, texture, normal)) = all_consuming(corner)(token)
        .map_err(|_| Error::format(line, format!("invalid face corner '{}'", token)))?;

    let vertex = resolve_index(vertex, mesh.vertices.len(), line, token)?;
    let texture = texture
        .flatten()
        .map(|t| resolve_index(t, mesh.texture_coords.len(), line, token))
        .transpose()?;
    let normal = normal
        .flatten()
        .map(|n| resolve_index(n, mesh.normals.len(), line, token))
        .transpose()?;

    Ok(FaceIndex::new(vertex, texture, normal))
}

/// Convert a 1-based index, or a negative one counted back from the current
/// end of the referenced list, to a 0-based slot. The slot must already exist:
/// `0`, forward references and negative indices reaching before the start are
/// rejected.
fn resolve_index(value: i64, count: usize, line: usize, token: &str) -> Result<usize> {
    let resolved = if value > 0 {
        value - 1
    } else {
        count as i64 + value
    };

    usize::try_from(resolved)
        .ok()
        .filter(|&slot| slot < count)
        .ok_or_else(|| {
            Error::format(
                line,
                format!("index {} in '{}' is out of range for {} entries", value, token, count),
            )
        })
}

fn parse_float(token: &str, line: usize) -> Result<f32> {
    all_consuming(float::<&str, nom::error::Error<&str>>)(token)
        .map(|(_, value)| value)
        .map_err(|_| Error::format(line, format!("invalid number '{}'", token)))
}

fn optional_float(data: &[&str], index: usize, default: f32, line: usize) -> Result<f32> {
    match data.get(index) {
        Some(token) => parse_float(token, line),
        None => Ok(default),
    }
}
