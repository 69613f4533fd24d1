//! Position keys for welding coincident vertices.
//!
//! OBJ imports duplicate a vertex once per face that uses it, so two records
//! with different indices can describe the same editable point. Positions are
//! quantized to four decimals and compared by key.

use std::collections::{BTreeSet, HashMap};

use glam::Vec3;

use super::{Vertex, VertexId};

/// Quantization factor: 4 decimal places.
pub const KEY_SCALE: f32 = 10_000.0;

/// Absolute per-component tolerance used by [`same`].
pub const POSITION_TOLERANCE: f32 = 1e-4;

/// Canonical fixed-precision key for a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(i64, i64, i64);

/// Quantize a position to its canonical key.
pub fn key(pos: Vec3) -> PositionKey {
    PositionKey(
        (pos.x * KEY_SCALE).round() as i64,
        (pos.y * KEY_SCALE).round() as i64,
        (pos.z * KEY_SCALE).round() as i64,
    )
}

/// Whether two positions coincide within [`POSITION_TOLERANCE`].
pub fn same(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < POSITION_TOLERANCE
}

/// Order-independent key for an edge between two positions.
pub fn edge_key(a: PositionKey, b: PositionKey) -> (PositionKey, PositionKey) {
    if a < b { (a, b) } else { (b, a) }
}

/// Side table from position key to every vertex index at that position.
#[derive(Debug, Clone, Default)]
pub struct PositionIndex {
    buckets: HashMap<PositionKey, Vec<VertexId>>,
    keys: Vec<PositionKey>,
}

impl PositionIndex {
    /// Build the table in one pass over the vertex array.
    pub fn build(vertices: &[Vertex]) -> Self {
        let mut buckets: HashMap<PositionKey, Vec<VertexId>> = HashMap::new();
        let mut keys = Vec::with_capacity(vertices.len());

        for (i, v) in vertices.iter().enumerate() {
            let k = key(Vec3::from(v.position));
            buckets.entry(k).or_default().push(i as VertexId);
            keys.push(k);
        }

        Self { buckets, keys }
    }

    /// Number of indexed vertices.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Number of distinct positions.
    pub fn distinct_positions(&self) -> usize {
        self.buckets.len()
    }

    /// Key of vertex `v`.
    pub fn key_of(&self, v: VertexId) -> Option<PositionKey> {
        self.keys.get(v as usize).copied()
    }

    /// Every vertex sharing `v`'s position, `v` included.
    pub fn coincident(&self, v: VertexId) -> &[VertexId] {
        self.key_of(v)
            .and_then(|k| self.buckets.get(&k))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every vertex whose key is in `keys`, ascending and deduplicated.
    pub fn matching(&self, keys: impl IntoIterator<Item = PositionKey>) -> Vec<VertexId> {
        let mut out = BTreeSet::new();
        for k in keys {
            if let Some(bucket) = self.buckets.get(&k) {
                out.extend(bucket.iter().copied());
            }
        }
        out.into_iter().collect()
    }
}
