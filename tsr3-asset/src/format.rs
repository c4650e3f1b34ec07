//! IA binary format.
//!
//! ```text
//! 0   "IA" + digit N + NUL
//! 4   12 reserved zero bytes
//! 16  u32 vertex count V, then V * N f32
//!     u32 index count I, then I u32
//! ```
//!
//! All numbers are little-endian regardless of host byte order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};
use memmap2::Mmap;
use tsr3_core::{ConvertError, ConvertResult, IndexedArray, Vector};

pub const HEADER_LEN: usize = std::mem::size_of::<IaHeader>();

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Pod, Zeroable)]
pub struct IaHeader {
    pub magic: [u8; 4],
    pub reserved: [u8; 12],
}

impl IaHeader {
    /// Header for arrays of `width`-component vertices. Only single digit
    /// widths can be tagged.
    pub fn for_width(width: usize) -> ConvertResult<Self> {
        let digit = u8::try_from(width)
            .ok()
            .filter(|w| *w <= 9)
            .ok_or_else(|| ConvertError::ia_format(format!("vertex width {width} has no tag")))?;
        Ok(Self {
            magic: [b'I', b'A', b'0' + digit, 0],
            reserved: [0; 12],
        })
    }

    pub fn width(&self) -> Option<usize> {
        match self.magic {
            [b'I', b'A', d @ b'0'..=b'9', 0] => Some(usize::from(d - b'0')),
            _ => None,
        }
    }
}

/// Encoded size in bytes of `ia`.
pub fn encoded_len<const N: usize>(ia: &IndexedArray<N>) -> usize {
    HEADER_LEN + 4 + ia.vertex_count() * N * 4 + 4 + ia.index_count() * 4
}

pub fn encode<const N: usize>(ia: &IndexedArray<N>) -> ConvertResult<Vec<u8>> {
    let header = IaHeader::for_width(N)?;
    let vertex_count = count_u32(ia.vertex_count(), "vertex")?;
    let index_count = count_u32(ia.index_count(), "index")?;

    let mut out = Vec::with_capacity(encoded_len(ia));
    out.extend_from_slice(bytemuck::bytes_of(&header));

    out.extend_from_slice(&vertex_count.to_le_bytes());
    for vertex in ia.vertices() {
        for component in vertex.components() {
            out.extend_from_slice(&component.to_le_bytes());
        }
    }

    out.extend_from_slice(&index_count.to_le_bytes());
    for &index in ia.indices() {
        // index < vertex_count, which already fits in u32
        out.extend_from_slice(&(index as u32).to_le_bytes());
    }

    Ok(out)
}

pub fn decode<const N: usize>(bytes: &[u8]) -> ConvertResult<IndexedArray<N>> {
    let mut reader = ByteReader::new(bytes);

    let header: IaHeader = bytemuck::pod_read_unaligned(reader.take(HEADER_LEN)?);
    match header.width() {
        Some(width) if width == N => {}
        Some(width) => {
            return Err(ConvertError::ia_format(format!(
                "expected IA{N}, found IA{width}"
            )));
        }
        None => return Err(ConvertError::ia_format("bad magic tag")),
    }
    if header.reserved != [0; 12] {
        return Err(ConvertError::ia_format("reserved header bytes are not zero"));
    }

    let vertex_count = reader.u32()? as usize;
    reader.expect_remaining(vertex_count.checked_mul(N * 4), "vertex block")?;
    let mut vertices = Vec::with_capacity(vertex_count);
    for _ in 0..vertex_count {
        let mut components = [0.0f32; N];
        for c in components.iter_mut() {
            *c = f32::from_bits(reader.u32()?);
        }
        vertices.push(Vector::new(components));
    }

    let index_count = reader.u32()? as usize;
    reader.expect_remaining(index_count.checked_mul(4), "index block")?;
    let mut indices = Vec::with_capacity(index_count);
    for _ in 0..index_count {
        indices.push(reader.u32()? as usize);
    }

    if reader.remaining() != 0 {
        return Err(ConvertError::ia_format(format!(
            "{} trailing bytes",
            reader.remaining()
        )));
    }

    IndexedArray::from_parts(vertices, indices)
        .ok_or_else(|| ConvertError::ia_format("index references a missing vertex"))
}

pub fn save_to_file<const N: usize, P: AsRef<Path>>(ia: &IndexedArray<N>, path: P) -> ConvertResult<()> {
    let path = path.as_ref();
    let encoded = encode(ia)?;

    let file = File::create(path).map_err(|e| ConvertError::file_open(path, e))?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);
    writer
        .write_all(&encoded)
        .and_then(|()| writer.flush())
        .map_err(|e| ConvertError::file_open(path, e))
}

pub fn load_from_file<const N: usize, P: AsRef<Path>>(path: P) -> ConvertResult<IndexedArray<N>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ConvertError::file_open(path, e))?;
    // SAFETY: the map is read once and dropped before returning; outputs are
    // not rewritten while a conversion is running.
    let mmap = unsafe { Mmap::map(&file) }.map_err(|e| ConvertError::file_open(path, e))?;
    decode(&mmap)
}

fn count_u32(count: usize, what: &str) -> ConvertResult<u32> {
    u32::try_from(count).map_err(|_| ConvertError::ia_format(format!("{count} {what} entries exceed u32")))
}

struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> ConvertResult<&'a [u8]> {
        if self.remaining() < len {
            return Err(ConvertError::ia_format(format!(
                "truncated at offset {}: need {len} bytes, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    fn u32(&mut self) -> ConvertResult<u32> {
        let bytes: [u8; 4] = bytemuck::pod_read_unaligned(self.take(4)?);
        Ok(u32::from_le_bytes(bytes))
    }

    fn expect_remaining(&self, needed: Option<usize>, what: &str) -> ConvertResult<()> {
        match needed {
            Some(n) if n <= self.remaining() => Ok(()),
            _ => Err(ConvertError::ia_format(format!("{what} is truncated"))),
        }
    }
}
