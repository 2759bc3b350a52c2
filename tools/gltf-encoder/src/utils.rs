//! Utility functions shared by preprocessing, packing and GLB assembly

/// Per-component min/max over an interleaved array
#[derive(Debug, Clone, PartialEq)]
pub struct Bounds {
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

impl Bounds {
    /// Midpoint of the box, per component
    pub fn center(&self) -> Vec<f32> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(min, max)| (min + max) / 2.0)
            .collect()
    }
}

/// Compute per-component bounds of `data` read as elements of `stride` values.
///
/// Returns `None` for empty input or a zero stride so that no infinities
/// leak into accessor bounds. Trailing values that do not fill a whole
/// element are ignored.
pub fn compute_bounds(data: &[f32], stride: usize) -> Option<Bounds> {
    if stride == 0 || data.len() < stride {
        return None;
    }

    let mut min = vec![f32::INFINITY; stride];
    let mut max = vec![f32::NEG_INFINITY; stride];

    for element in data.chunks_exact(stride) {
        for (i, &value) in element.iter().enumerate() {
            min[i] = min[i].min(value);
            max[i] = max[i].max(value);
        }
    }

    Some(Bounds { min, max })
}

/// Bytes needed to reach the next 4-byte boundary
pub fn padding_to_4(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Pad `bytes` with `fill` up to a 4-byte boundary
pub fn pad_to_4(bytes: &mut Vec<u8>, fill: u8) {
    let padding = padding_to_4(bytes.len());
    bytes.extend(std::iter::repeat_n(fill, padding));
}
