use std::collections::HashMap;

use crate::vector::Vector;

/// Deduplicated vertex list plus one index per submitted corner.
///
/// Vertices are stored in first-seen order. Two submissions share an entry
/// only when they compare equal component-wise, with no tolerance.
#[derive(Clone, Debug, Default)]
pub struct IndexedArray<const N: usize> {
    vertices: Vec<Vector<N>>,
    indices: Vec<usize>,
    lookup: HashMap<[u32; N], usize>,
}

impl<const N: usize> IndexedArray<N> {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// Rebuilds an array from already deduplicated parts, e.g. a decoded file.
    ///
    /// Returns `None` if an index points past `vertices`.
    pub fn from_parts(vertices: Vec<Vector<N>>, indices: Vec<usize>) -> Option<Self> {
        if indices.iter().any(|&i| i >= vertices.len()) {
            return None;
        }
        let mut lookup = HashMap::with_capacity(vertices.len());
        for (offset, vertex) in vertices.iter().enumerate() {
            if let Some(key) = vertex.exact_key() {
                lookup.entry(key).or_insert(offset);
            }
        }
        Some(Self { vertices, indices, lookup })
    }

    /// Appends one corner, reusing an equal vertex when one was seen before.
    pub fn submit(&mut self, vertex: Vector<N>) {
        let offset = match vertex.exact_key() {
            Some(key) => *self.lookup.entry(key).or_insert_with(|| {
                self.vertices.push(vertex);
                self.vertices.len() - 1
            }),
            // NaN never equals anything, so it always gets a fresh slot.
            None => {
                self.vertices.push(vertex);
                self.vertices.len() - 1
            }
        };
        self.indices.push(offset);
    }

    pub fn vertices(&self) -> &[Vector<N>] {
        &self.vertices
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// The vertex behind the `corner`-th submission.
    pub fn corner(&self, corner: usize) -> Option<&Vector<N>> {
        self.indices.get(corner).map(|&i| &self.vertices[i])
    }
}

impl<const N: usize> PartialEq for IndexedArray<N> {
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices && self.indices == other.indices
    }
}
