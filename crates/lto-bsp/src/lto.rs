//! LTO binary format.
//!
//! Layout (all integers big-endian):
//!   - Magic: "LTO" (3 bytes)
//!   - Version: u8 (1 byte)
//!   - Vertex count: u32 (4 bytes)
//!   - Vertices: 3 × i32 16.16 fixed point each
//!   - Tree, depth-first, back (left) subtree before front (right):
//!     - Leaf: u32 face count (> 0), then count × (u32, u32, u32) indices
//!     - Branch: u32 0, u8 axis, i32 16.16 offset, back subtree, front subtree
//!
//! A face count of zero is the branch marker, so leaves are never written
//! empty. Decoding and re-encoding a file reproduces it byte for byte.

use std::fs::{self, File};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use nalgebra::Point3;

use crate::error::{BspError, Result};
use crate::fixed::{from_fixed, point_from_fixed, point_to_fixed, to_fixed};
use crate::{Axis, BspNode, BspTree, Face, Hyperplane};

/// Magic bytes for LTO format
pub const LTO_MAGIC: [u8; 3] = *b"LTO";

/// Current format version
pub const LTO_VERSION: u8 = 1;

/// Deepest branch nesting accepted when encoding or decoding.
pub const MAX_DECODE_DEPTH: usize = 1024;

const BRANCH_MARKER: u32 = 0;

/// A decoded LTO file.
#[derive(Debug, Clone, PartialEq)]
pub struct LtoFile {
    pub vertices: Vec<Point3<f64>>,
    pub tree: BspTree,
}

/// Writes `vertices` and `tree` to `writer`.
///
/// Nothing is checked ahead of time: an encoding error can leave a partial
/// stream behind. Use [`encode`] or [`save`] when that matters.
pub fn write_tree<W: Write>(writer: &mut W, vertices: &[Point3<f64>], tree: &BspTree) -> Result<()> {
    let count = u32::try_from(vertices.len())
        .map_err(|_| BspError::TooManyVertices(vertices.len()))?;

    writer.write_all(&LTO_MAGIC)?;
    writer.write_all(&[LTO_VERSION])?;
    writer.write_all(&count.to_be_bytes())?;

    for vertex in vertices {
        for raw in point_to_fixed(vertex)? {
            writer.write_all(&raw.to_be_bytes())?;
        }
    }

    let mut encoder = NodeEncoder {
        writer,
        vertex_count: vertices.len(),
        faces_written: 0,
    };
    encoder.write_node(tree.root(), 0)
}

/// Reads a complete LTO stream.
pub fn read_tree<R: Read>(reader: &mut R) -> Result<LtoFile> {
    let mut magic = [0u8; 3];
    reader.read_exact(&mut magic)?;
    if magic != LTO_MAGIC {
        return Err(BspError::BadMagic(magic));
    }

    let version = read_u8(reader)?;
    if version != LTO_VERSION {
        return Err(BspError::UnsupportedVersion(version));
    }

    let count = read_u32(reader)? as usize;
    debug!("reading LTO v{version} with {count} vertices");

    // Cap the preallocation; a corrupt count must not exhaust memory.
    let mut vertices = Vec::with_capacity(count.min(1 << 16));
    for _ in 0..count {
        let raw = [read_i32(reader)?, read_i32(reader)?, read_i32(reader)?];
        vertices.push(point_from_fixed(raw));
    }

    let mut decoder = NodeDecoder {
        reader,
        vertex_count: count,
        faces_read: 0,
    };
    let root = decoder.read_node(0)?;

    Ok(LtoFile {
        vertices,
        tree: BspTree::from_root(root),
    })
}

/// Encodes to an in-memory buffer.
pub fn encode(vertices: &[Point3<f64>], tree: &BspTree) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    write_tree(&mut bytes, vertices, tree)?;
    Ok(bytes)
}

/// Decodes an in-memory buffer, rejecting trailing bytes.
pub fn decode(bytes: &[u8]) -> Result<LtoFile> {
    let mut cursor = Cursor::new(bytes);
    let file = read_tree(&mut cursor)?;
    let rest = bytes.len() - cursor.position() as usize;
    if rest > 0 {
        return Err(BspError::TrailingBytes(rest));
    }
    Ok(file)
}

/// Writes an LTO file.
///
/// The data is encoded in memory, written to a sibling temporary file and
/// renamed over `path` only once it is synced. On failure an existing file at
/// `path` is left as it was.
pub fn save(path: impl AsRef<Path>, vertices: &[Point3<f64>], tree: &BspTree) -> Result<()> {
    let path = path.as_ref();
    let bytes = encode(vertices, tree)?;
    let tmp = temp_path(path)?;

    let written = File::create(&tmp).and_then(|mut file| {
        file.write_all(&bytes)?;
        file.sync_all()
    });
    if let Err(err) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(err.into());
    }

    info!(
        "saved {} ({} bytes, {} vertices, {} leaves)",
        path.display(),
        bytes.len(),
        vertices.len(),
        tree.leaf_count()
    );
    Ok(())
}

/// Reads an LTO file.
pub fn load(path: impl AsRef<Path>) -> Result<LtoFile> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let file = decode(&bytes)?;
    info!(
        "loaded {} ({} vertices, {})",
        path.display(),
        file.vertices.len(),
        file.tree.stats()
    );
    Ok(file)
}

fn temp_path(path: &Path) -> Result<PathBuf> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "LTO path has no file name")
    })?;
    let mut tmp = name.to_os_string();
    tmp.push(".tmp");
    Ok(path.with_file_name(tmp))
}

struct NodeEncoder<'a, W> {
    writer: &'a mut W,
    vertex_count: usize,
    faces_written: usize,
}

impl<W: Write> NodeEncoder<'_, W> {
    fn write_node(&mut self, node: &BspNode, depth: usize) -> Result<()> {
        match node {
            BspNode::Leaf(faces) => {
                if faces.is_empty() {
                    return Err(BspError::EmptyLeaf);
                }
                let count = u32::try_from(faces.len())
                    .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "leaf too large"))?;
                self.writer.write_all(&count.to_be_bytes())?;
                for face in faces {
                    for index in face.indices() {
                        if index as usize >= self.vertex_count {
                            return Err(BspError::InvalidFaceIndex {
                                face: self.faces_written,
                                index,
                                vertex_count: self.vertex_count,
                            });
                        }
                        self.writer.write_all(&index.to_be_bytes())?;
                    }
                    self.faces_written += 1;
                }
                Ok(())
            }
            BspNode::Branch { plane, back, front } => {
                if depth >= MAX_DECODE_DEPTH {
                    return Err(BspError::TreeTooDeep(MAX_DECODE_DEPTH));
                }
                self.writer.write_all(&BRANCH_MARKER.to_be_bytes())?;
                self.writer.write_all(&[u8::from(plane.axis())])?;
                self.writer.write_all(&to_fixed(plane.offset())?.to_be_bytes())?;
                self.write_node(back, depth + 1)?;
                self.write_node(front, depth + 1)
            }
        }
    }
}

struct NodeDecoder<'a, R> {
    reader: &'a mut R,
    vertex_count: usize,
    faces_read: usize,
}

impl<R: Read> NodeDecoder<'_, R> {
    fn read_node(&mut self, depth: usize) -> Result<BspNode> {
        let count = read_u32(self.reader)?;
        if count == BRANCH_MARKER {
            if depth >= MAX_DECODE_DEPTH {
                return Err(BspError::TreeTooDeep(MAX_DECODE_DEPTH));
            }
            let axis = Axis::try_from(read_u8(self.reader)?)?;
            let offset = from_fixed(read_i32(self.reader)?);
            let back = self.read_node(depth + 1)?;
            let front = self.read_node(depth + 1)?;
            return Ok(BspNode::branch(Hyperplane::new(axis, offset), back, front));
        }

        let count = count as usize;
        let mut faces = Vec::with_capacity(count.min(1 << 12));
        for _ in 0..count {
            let indices = [
                read_u32(self.reader)?,
                read_u32(self.reader)?,
                read_u32(self.reader)?,
            ];
            if let Some(index) = indices
                .into_iter()
                .find(|&i| i as usize >= self.vertex_count)
            {
                return Err(BspError::InvalidFaceIndex {
                    face: self.faces_read,
                    index,
                    vertex_count: self.vertex_count,
                });
            }
            faces.push(Face::from_indices(indices));
            self.faces_read += 1;
        }
        Ok(BspNode::Leaf(faces))
    }
}

fn read_u8<R: Read>(reader: &mut R) -> io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<R: Read>(reader: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_i32<R: Read>(reader: &mut R) -> io::Result<i32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}
