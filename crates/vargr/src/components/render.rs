//! Render-side data carried by entities.
//!
//! The runtime never interprets these: an external renderer reads the
//! attribute arrays, uploads them, and writes its own ids into
//! [`BackendHandles`].

/// One vertex attribute stream, e.g. positions with 3 components per vertex.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    /// Floats per vertex.
    pub components: u32,
    pub data: Vec<f32>,
}

impl VertexAttribute {
    pub fn new(components: u32, data: Vec<f32>) -> Self {
        Self { components, data }
    }

    /// Number of whole vertices in `data`.
    pub fn vertex_count(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.data.len() / self.components as usize
        }
    }

    /// Raw bytes for buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }
}

/// Ids owned by the rendering backend. Empty until the renderer fills them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackendHandles {
    pub vertex_array: Option<u32>,
    pub vertex_buffers: Vec<u32>,
    pub element_buffer: Option<u32>,
    pub batch: Option<u32>,
}

impl BackendHandles {
    /// `true` until the renderer has uploaded anything.
    pub fn is_empty(&self) -> bool {
        self.vertex_array.is_none()
            && self.vertex_buffers.is_empty()
            && self.element_buffer.is_none()
            && self.batch.is_none()
    }
}

/// Geometry for one drawable entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderData {
    pub attributes: Vec<VertexAttribute>,
    pub indices: Option<Vec<u32>>,
    pub handles: BackendHandles,
}

impl RenderData {
    pub fn new(attributes: Vec<VertexAttribute>) -> Self {
        Self {
            attributes,
            indices: None,
            handles: BackendHandles::default(),
        }
    }

    pub fn with_indices(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Vertices in the first attribute stream.
    pub fn vertex_count(&self) -> usize {
        self.attributes.first().map_or(0, VertexAttribute::vertex_count)
    }

    pub fn index_bytes(&self) -> Option<&[u8]> {
        self.indices.as_deref().map(bytemuck::cast_slice)
    }
}

/// Marks [`RenderData`] that never changes and may be batched once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StaticMesh;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_views() {
        let data = RenderData::new(vec![VertexAttribute::new(
            3,
            vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        )])
        .with_indices(vec![0, 1, 2]);
        assert_eq!(data.vertex_count(), 3);
        assert_eq!(data.attributes[0].as_bytes().len(), 36);
        assert_eq!(data.index_bytes().map(<[u8]>::len), Some(12));
        assert!(data.handles.is_empty());
    }
}
