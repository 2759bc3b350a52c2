//! Binary blob packing with one buffer view and one accessor per append

use crate::utils::Bounds;
use gltf_json as json;
use gltf_json::validation::Checked::Valid;

/// Accessor index returned by buffer operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessorIndex(pub u32);

impl AccessorIndex {
    pub fn as_json_index(&self) -> json::Index<json::Accessor> {
        json::Index::new(self.0)
    }
}

/// Every stored component is a 4-byte float or a 4-byte index
pub const COMPONENT_SIZE: usize = 4;

/// Accessor element type for a given number of components per element
pub fn element_type(stride: usize) -> Option<json::accessor::Type> {
    match stride {
        1 => Some(json::accessor::Type::Scalar),
        2 => Some(json::accessor::Type::Vec2),
        3 => Some(json::accessor::Type::Vec3),
        4 => Some(json::accessor::Type::Vec4),
        _ => None,
    }
}

/// Components per element for an accessor element type
pub fn element_width(ty: json::accessor::Type) -> usize {
    ty.multiplicity()
}

/// Builder for the single binary buffer shared by every mesh.
///
/// Every append starts at a 4-byte aligned offset and writes whole 4-byte
/// components, so the blob never needs padding between views.
pub struct BufferBuilder {
    buffer: Vec<u8>,
    views: Vec<json::buffer::View>,
    accessors: Vec<json::Accessor>,
}

impl BufferBuilder {
    /// Create a new empty buffer builder
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a builder whose blob is allocated once for `bytes`
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(bytes),
            views: Vec::new(),
            accessors: Vec::new(),
        }
    }

    /// Get the current accessor count
    pub fn accessor_count(&self) -> u32 {
        self.accessors.len() as u32
    }

    /// Current byte offset, where the next append will start
    pub fn byte_offset(&self) -> usize {
        self.buffer.len()
    }

    /// Get the binary buffer data
    pub fn data(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the buffer views
    pub fn views(&self) -> &[json::buffer::View] {
        &self.views
    }

    /// Get the accessors
    pub fn accessors(&self) -> &[json::Accessor] {
        &self.accessors
    }

    /// Consume the builder, returning blob, views and accessors
    pub fn finish(self) -> (Vec<u8>, Vec<json::buffer::View>, Vec<json::Accessor>) {
        (self.buffer, self.views, self.accessors)
    }

    /// Pack a float vertex attribute of `stride` components per element.
    ///
    /// `bounds` become the accessor's `min`/`max` (POSITION requires them).
    /// Returns `None` for a stride outside 1..=4.
    pub fn pack_attribute(
        &mut self,
        values: &[f32],
        stride: usize,
        bounds: Option<&Bounds>,
    ) -> Option<AccessorIndex> {
        let type_ = element_type(stride)?;

        let offset = self.buffer.len();
        // glTF buffers are little-endian
        if cfg!(target_endian = "little") {
            self.buffer.extend_from_slice(bytemuck::cast_slice(values));
        } else {
            for value in values {
                self.buffer.extend_from_slice(&value.to_le_bytes());
            }
        }

        self.push_view(
            offset,
            values.len() * COMPONENT_SIZE,
            json::buffer::Target::ArrayBuffer,
        );

        Some(self.push_accessor(
            values.len() / stride,
            json::accessor::ComponentType::F32,
            type_,
            bounds,
        ))
    }

    /// Pack u32 triangle indices
    pub fn pack_indices(&mut self, indices: &[u32]) -> AccessorIndex {
        let offset = self.buffer.len();
        for idx in indices {
            self.buffer.extend_from_slice(&idx.to_le_bytes());
        }

        self.push_view(
            offset,
            indices.len() * COMPONENT_SIZE,
            json::buffer::Target::ElementArrayBuffer,
        );

        self.push_accessor(
            indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
            None,
        )
    }

    fn push_view(&mut self, offset: usize, byte_length: usize, target: json::buffer::Target) {
        self.views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: byte_length.into(),
            byte_offset: Some(offset.into()),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: Some(Valid(target)),
        });
    }

    fn push_accessor(
        &mut self,
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<&Bounds>,
    ) -> AccessorIndex {
        let to_json = |values: &[f32]| {
            json::Value::Array(values.iter().map(|v| json::Value::from(*v)).collect())
        };

        let accessor_idx = self.accessors.len() as u32;
        self.accessors.push(json::Accessor {
            buffer_view: Some(json::Index::new(self.views.len() as u32 - 1)),
            byte_offset: Some(0u64.into()),
            count: count.into(),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min: bounds.map(|b| to_json(&b.min)),
            max: bounds.map(|b| to_json(&b.max)),
            name: None,
            normalized: false,
            sparse: None,
        });

        AccessorIndex(accessor_idx)
    }
}

impl Default for BufferBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::compute_bounds;

    #[test]
    fn test_buffer_builder_positions() {
        let mut builder = BufferBuilder::new();
        let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.5, 1.0, 0.0];
        let bounds = compute_bounds(&positions, 3);
        let idx = builder
            .pack_attribute(&positions, 3, bounds.as_ref())
            .unwrap();

        assert_eq!(idx, AccessorIndex(0));
        assert_eq!(builder.accessor_count(), 1);
        assert_eq!(builder.views().len(), 1);
        // 3 positions * 12 bytes = 36 bytes
        assert_eq!(builder.data().len(), 36);

        let accessor = &builder.accessors()[0];
        assert_eq!(accessor.count.0, 3);
        assert_eq!(accessor.type_, Valid(json::accessor::Type::Vec3));
        assert_eq!(
            accessor.max,
            Some(json::Value::Array(vec![
                json::Value::from(1.0f32),
                json::Value::from(1.0f32),
                json::Value::from(0.0f32),
            ]))
        );
    }

    #[test]
    fn test_buffer_builder_indices_follow_attributes() {
        let mut builder = BufferBuilder::with_capacity(32);
        builder.pack_attribute(&[0.0, 1.0, 0.5, 0.5], 2, None).unwrap();
        let idx = builder.pack_indices(&[0, 1, 1]);

        assert_eq!(idx, AccessorIndex(1));
        assert_eq!(builder.byte_offset(), 28);

        let view = &builder.views()[1];
        assert_eq!(view.byte_offset.as_ref().map(|o| o.0), Some(16));
        assert_eq!(view.byte_length.0, 12);
        assert_eq!(
            view.target,
            Some(Valid(json::buffer::Target::ElementArrayBuffer))
        );
        assert_eq!(&builder.data()[16..20], &0u32.to_le_bytes());
        assert!(builder.accessors()[1].min.is_none());
    }

    #[test]
    fn test_floats_written_little_endian() {
        let mut builder = BufferBuilder::new();
        builder.pack_attribute(&[1.5, -2.0], 2, None).unwrap();
        assert_eq!(&builder.data()[0..4], &1.5f32.to_le_bytes());
        assert_eq!(&builder.data()[4..8], &(-2.0f32).to_le_bytes());
    }

    #[test]
    fn test_element_type_from_stride() {
        assert_eq!(element_type(1), Some(json::accessor::Type::Scalar));
        assert_eq!(element_type(4), Some(json::accessor::Type::Vec4));
        assert_eq!(element_type(5), None);
        assert_eq!(element_width(json::accessor::Type::Vec2), 2);
    }

    #[test]
    fn test_invalid_stride_appends_nothing() {
        let mut builder = BufferBuilder::new();
        assert!(builder.pack_attribute(&[1.0; 5], 5, None).is_none());
        assert!(builder.data().is_empty());
        assert!(builder.views().is_empty());
    }
}
