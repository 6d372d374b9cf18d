//! CPU-side mesh data.
//!
//! [`MeshData`] owns one contiguous byte buffer laid out as
//! `[indices][stream 0][stream 1]...`. Each stream holds `num_vertices`
//! interleaved vertices whose layout comes from the mesh's
//! [`VertexDataDesc`]. Vertex and index counts and the index width are fixed
//! at construction.

use std::sync::Arc;

use crate::math::{AaBox, Bounds, Sphere, Vec3};
use crate::{profile_function, profile_scope};

use super::error::MeshError;
use super::layout::{VertexDataDesc, VertexElement, VertexElementSemantic, VertexElementType};

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DrawOperation {
    /// Each vertex is a separate point.
    PointList,
    /// Every two vertices form a line.
    LineList,
    /// Vertices form a connected strip of lines.
    LineStrip,
    /// Every three vertices form a triangle.
    #[default]
    TriangleList,
    /// Vertices form a connected strip of triangles.
    TriangleStrip,
    /// Triangles share the first vertex.
    TriangleFan,
}

impl DrawOperation {
    /// Number of vertices per primitive for non-strip operations.
    pub fn vertices_per_primitive(&self) -> Option<u32> {
        match self {
            Self::PointList => Some(1),
            Self::LineList => Some(2),
            Self::TriangleList => Some(3),
            Self::LineStrip | Self::TriangleStrip | Self::TriangleFan => None,
        }
    }
}

/// Width of the indices stored in a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IndexType {
    /// 16-bit unsigned indices.
    Index16,
    /// 32-bit unsigned indices.
    #[default]
    Index32,
}

impl IndexType {
    /// Size of one index in bytes.
    pub fn size(&self) -> u32 {
        match self {
            Self::Index16 => 2,
            Self::Index32 => 4,
        }
    }
}

/// A range of indices drawn with one material.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubMesh {
    /// First index of the range.
    pub index_offset: u32,
    /// Number of indices in the range.
    pub index_count: u32,
    /// Primitive assembly mode.
    pub draw_op: DrawOperation,
    /// Name of the material used for this range.
    pub material_name: String,
}

impl SubMesh {
    /// Create a triangle-list sub-mesh.
    pub fn new(index_offset: u32, index_count: u32) -> Self {
        Self {
            index_offset,
            index_count,
            ..Default::default()
        }
    }

    /// Set the draw operation.
    pub fn with_draw_op(mut self, draw_op: DrawOperation) -> Self {
        self.draw_op = draw_op;
        self
    }

    /// Set the material name.
    pub fn with_material_name(mut self, name: impl Into<String>) -> Self {
        self.material_name = name.into();
        self
    }
}

/// Index data and vertex streams of a mesh in a single allocation.
#[derive(Clone)]
pub struct MeshData {
    desc: Arc<VertexDataDesc>,
    num_vertices: u32,
    num_indices: u32,
    index_type: IndexType,
    // Word storage keeps the index region aligned for u16/u32 views.
    words: Vec<u32>,
    size: usize,
}

impl MeshData {
    /// Allocate a zeroed mesh buffer.
    pub fn new(
        num_vertices: u32,
        num_indices: u32,
        desc: Arc<VertexDataDesc>,
        index_type: IndexType,
    ) -> Self {
        let index_size = num_indices as usize * index_type.size() as usize;
        let vertex_size = num_vertices as usize * desc.total_vertex_stride() as usize;
        let size = index_size + vertex_size;

        Self {
            desc,
            num_vertices,
            num_indices,
            index_type,
            words: vec![0; size.div_ceil(4)],
            size,
        }
    }

    /// Vertex layout.
    pub fn vertex_desc(&self) -> &Arc<VertexDataDesc> {
        &self.desc
    }

    pub fn num_vertices(&self) -> u32 {
        self.num_vertices
    }

    pub fn num_indices(&self) -> u32 {
        self.num_indices
    }

    pub fn index_type(&self) -> IndexType {
        self.index_type
    }

    /// Size of the index region in bytes.
    pub fn index_buffer_size(&self) -> usize {
        self.num_indices as usize * self.index_type.size() as usize
    }

    /// Size of one stream's region in bytes.
    pub fn stream_size(&self, stream: u32) -> usize {
        self.desc.vertex_stride(stream) as usize * self.num_vertices as usize
    }

    /// Byte offset of a stream's region from the start of the buffer.
    pub fn stream_offset(&self, stream: u32) -> usize {
        self.index_buffer_size() + (0..stream).map(|s| self.stream_size(s)).sum::<usize>()
    }

    /// Byte offset of the first vertex's copy of an element, or `None` if
    /// the layout lacks it.
    pub fn element_offset(
        &self,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
    ) -> Option<usize> {
        if !self.desc.has_element(semantic, semantic_index, stream) {
            return None;
        }
        let in_stream = self.desc.element_offset_from_stream(semantic, semantic_index, stream);
        Some(self.stream_offset(stream) + in_stream as usize)
    }

    /// Total size of the buffer in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The whole buffer.
    pub fn raw_data(&self) -> &[u8] {
        &bytemuck::cast_slice(&self.words)[..self.size]
    }

    /// The whole buffer, mutably.
    pub fn raw_data_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut(&mut self.words)[..self.size]
    }

    /// Bytes of the index region.
    pub fn index_data(&self) -> &[u8] {
        &self.raw_data()[..self.index_buffer_size()]
    }

    /// Bytes of one stream's region.
    pub fn stream_data(&self, stream: u32) -> &[u8] {
        let offset = self.stream_offset(stream);
        &self.raw_data()[offset..offset + self.stream_size(stream)]
    }

    /// 16-bit indices.
    pub fn indices16(&self) -> Result<&[u16], MeshError> {
        self.check_index_type(IndexType::Index16)?;
        Ok(bytemuck::cast_slice(self.index_data()))
    }

    /// 16-bit indices, mutably.
    pub fn indices16_mut(&mut self) -> Result<&mut [u16], MeshError> {
        self.check_index_type(IndexType::Index16)?;
        let len = self.index_buffer_size();
        Ok(bytemuck::cast_slice_mut(&mut self.raw_data_mut()[..len]))
    }

    /// 32-bit indices.
    pub fn indices32(&self) -> Result<&[u32], MeshError> {
        self.check_index_type(IndexType::Index32)?;
        Ok(bytemuck::cast_slice(self.index_data()))
    }

    /// 32-bit indices, mutably.
    pub fn indices32_mut(&mut self) -> Result<&mut [u32], MeshError> {
        self.check_index_type(IndexType::Index32)?;
        let len = self.index_buffer_size();
        Ok(bytemuck::cast_slice_mut(&mut self.raw_data_mut()[..len]))
    }

    /// Index `i` widened to 32 bits, regardless of the stored width.
    pub fn index(&self, i: u32) -> u32 {
        let data = self.index_data();
        let i = i as usize;
        match self.index_type {
            IndexType::Index16 => u16::from_ne_bytes([data[i * 2], data[i * 2 + 1]]) as u32,
            IndexType::Index32 => bytemuck::pod_read_unaligned::<u32>(&data[i * 4..i * 4 + 4]),
        }
    }

    fn check_index_type(&self, requested: IndexType) -> Result<(), MeshError> {
        if self.index_type != requested {
            return Err(MeshError::WrongIndexType {
                expected: requested,
                actual: self.index_type,
            });
        }
        Ok(())
    }

    /// Write one element for every vertex.
    ///
    /// `data` holds tightly packed values, one per vertex, and must be
    /// exactly `element_size * num_vertices` bytes long. If the layout lacks
    /// the element a warning is logged and nothing is written.
    pub fn set_vertex_data(
        &mut self,
        semantic: VertexElementSemantic,
        data: &[u8],
        semantic_index: u32,
        stream: u32,
    ) -> Result<(), MeshError> {
        let Some((offset, element_size, stride)) =
            self.element_location(semantic, semantic_index, stream)
        else {
            log::warn!(
                "MeshData: vertex element {:?}{} not found in stream {}, data ignored",
                semantic,
                semantic_index,
                stream
            );
            return Ok(());
        };

        let expected = element_size * self.num_vertices as usize;
        if data.len() != expected {
            return Err(MeshError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        let raw = self.raw_data_mut();
        for (i, value) in data.chunks_exact(element_size).enumerate() {
            let dst = offset + i * stride;
            raw[dst..dst + element_size].copy_from_slice(value);
        }
        Ok(())
    }

    /// Read one element of every vertex into `out`, tightly packed.
    ///
    /// Same size rule as [`set_vertex_data`](Self::set_vertex_data). If the
    /// layout lacks the element a warning is logged and `out` is untouched.
    pub fn get_vertex_data(
        &self,
        semantic: VertexElementSemantic,
        out: &mut [u8],
        semantic_index: u32,
        stream: u32,
    ) -> Result<(), MeshError> {
        let Some((offset, element_size, stride)) =
            self.element_location(semantic, semantic_index, stream)
        else {
            log::warn!(
                "MeshData: vertex element {:?}{} not found in stream {}, nothing read",
                semantic,
                semantic_index,
                stream
            );
            return Ok(());
        };

        let expected = element_size * self.num_vertices as usize;
        if out.len() != expected {
            return Err(MeshError::SizeMismatch {
                expected,
                actual: out.len(),
            });
        }

        let raw = self.raw_data();
        for (i, value) in out.chunks_exact_mut(element_size).enumerate() {
            let src = offset + i * stride;
            value.copy_from_slice(&raw[src..src + element_size]);
        }
        Ok(())
    }

    /// Iterate one element's bytes, vertex by vertex.
    pub fn element_data(
        &self,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
    ) -> Option<impl Iterator<Item = &[u8]> + '_> {
        let (offset, element_size, stride) =
            self.element_location(semantic, semantic_index, stream)?;
        let raw = self.raw_data();
        Some((0..self.num_vertices as usize).map(move |i| {
            let start = offset + i * stride;
            &raw[start..start + element_size]
        }))
    }

    /// (buffer offset, element size, stream stride) of an element.
    fn element_location(
        &self,
        semantic: VertexElementSemantic,
        semantic_index: u32,
        stream: u32,
    ) -> Option<(usize, usize, usize)> {
        let offset = self.element_offset(semantic, semantic_index, stream)?;
        let size = self.desc.element_size(semantic, semantic_index, stream) as usize;
        let stride = self.desc.vertex_stride(stream) as usize;
        Some((offset, size, stride))
    }

    /// Bounds of every vertex referenced by the index buffer.
    pub fn calculate_bounds(&self) -> Bounds {
        self.calculate_bounds_range(0, self.num_indices)
    }

    /// Bounds of the vertices referenced by an index range.
    ///
    /// Uses the first float3 or float4 position element. The box covers all
    /// referenced positions, the sphere is centered on their mean (repeated
    /// indices count repeatedly) and reaches the farthest referenced vertex.
    /// Meshes without a usable position element, or an empty range, yield
    /// default bounds.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the index buffer or an index exceeds the
    /// vertex count.
    pub fn calculate_bounds_range(&self, index_offset: u32, index_count: u32) -> Bounds {
        profile_scope!("calculate_bounds");
        assert!(
            index_offset as u64 + index_count as u64 <= self.num_indices as u64,
            "index range {}..{} exceeds index count {}",
            index_offset,
            index_offset as u64 + index_count as u64,
            self.num_indices
        );

        let Some(position) = self.desc.elements().iter().find(|e| {
            e.semantic == VertexElementSemantic::Position
                && matches!(
                    e.element_type,
                    VertexElementType::Float3 | VertexElementType::Float4
                )
        }) else {
            return Bounds::default();
        };
        if index_count == 0 {
            return Bounds::default();
        }

        let Some((offset, _, stride)) =
            self.element_location(position.semantic, position.semantic_index, position.stream)
        else {
            return Bounds::default();
        };
        let raw = self.raw_data();
        let read_position = |vertex: u32| -> Vec3 {
            assert!(
                vertex < self.num_vertices,
                "index {} exceeds vertex count {}",
                vertex,
                self.num_vertices
            );
            let start = offset + vertex as usize * stride;
            let xyz: [f32; 3] = bytemuck::pod_read_unaligned(&raw[start..start + 12]);
            Vec3::from(xyz)
        };

        let indices = index_offset..index_offset + index_count;
        let first = read_position(self.index(index_offset));
        let mut aabb = AaBox::from_point(first);
        let mut accum = Vec3::zeros();
        for i in indices.clone() {
            let pos = read_position(self.index(i));
            aabb.merge_point(&pos);
            accum += pos;
        }
        let center = accum / index_count as f32;

        let mut visited = vec![false; self.num_vertices as usize];
        let mut radius = 0.0f32;
        for i in indices {
            let vertex = self.index(i);
            if std::mem::replace(&mut visited[vertex as usize], true) {
                continue;
            }
            radius = radius.max((read_position(vertex) - center).norm());
        }

        Bounds::new(aabb, Sphere::new(center, radius))
    }

    /// Merge several meshes into one.
    ///
    /// The result's layout is the union of the inputs' layouts. Indices of
    /// each mesh are shifted by the number of vertices in the meshes before
    /// it. Elements a mesh lacks are zero-filled. Sub-meshes are copied
    /// unchanged, so their index offsets still refer to their source mesh.
    /// The result uses 32-bit indices if any input does or if the combined
    /// vertex count does not fit 16 bits.
    pub fn combine(
        meshes: &[&MeshData],
        sub_meshes: &[Vec<SubMesh>],
    ) -> Result<(MeshData, Vec<SubMesh>), MeshError> {
        profile_function!();

        if meshes.len() != sub_meshes.len() {
            return Err(MeshError::InvalidArgument(format!(
                "{} meshes but {} sub-mesh lists",
                meshes.len(),
                sub_meshes.len()
            )));
        }

        let mut desc = VertexDataDesc::new();
        for mesh in meshes {
            for element in mesh.desc.elements() {
                match desc.find(element.semantic, element.semantic_index, element.stream) {
                    Some(existing) if existing.element_type != element.element_type => {
                        return Err(MeshError::ElementTypeConflict {
                            semantic: element.semantic,
                            semantic_index: element.semantic_index,
                            stream: element.stream,
                            existing: existing.element_type,
                            incoming: element.element_type,
                        });
                    }
                    Some(_) => {}
                    None => desc.add_element(
                        element.element_type,
                        element.semantic,
                        element.semantic_index,
                        element.stream,
                        element.instance_step_rate,
                    ),
                }
            }
        }

        let total_vertices: u64 = meshes.iter().map(|m| m.num_vertices as u64).sum();
        let total_indices: u64 = meshes.iter().map(|m| m.num_indices as u64).sum();
        let (Ok(total_vertices), Ok(total_indices)) =
            (u32::try_from(total_vertices), u32::try_from(total_indices))
        else {
            return Err(MeshError::InvalidArgument(
                "combined mesh exceeds 32-bit vertex or index count".to_string(),
            ));
        };
        let wide = meshes.iter().any(|m| m.index_type == IndexType::Index32)
            || total_vertices > u16::MAX as u32 + 1;
        let index_type = if wide {
            IndexType::Index32
        } else {
            IndexType::Index16
        };

        let mut combined = MeshData::new(total_vertices, total_indices, Arc::new(desc), index_type);

        {
            profile_scope!("remap_indices");
            let mut next_index = 0usize;
            let mut vertex_offset = 0u32;
            let index_size = index_type.size() as usize;
            for mesh in meshes {
                for i in 0..mesh.num_indices {
                    let remapped = mesh.index(i) + vertex_offset;
                    let dst = &mut combined.raw_data_mut()[next_index * index_size..];
                    match index_type {
                        IndexType::Index16 => {
                            dst[..2].copy_from_slice(&(remapped as u16).to_ne_bytes())
                        }
                        IndexType::Index32 => dst[..4].copy_from_slice(&remapped.to_ne_bytes()),
                    }
                    next_index += 1;
                }
                vertex_offset += mesh.num_vertices;
            }
        }

        {
            profile_scope!("copy_vertices");
            let elements: Vec<VertexElement> = combined.desc.elements().to_vec();
            for element in &elements {
                let Some((dst_offset, size, dst_stride)) = combined.element_location(
                    element.semantic,
                    element.semantic_index,
                    element.stream,
                ) else {
                    continue;
                };

                let mut first_vertex = 0usize;
                for mesh in meshes {
                    if let Some(values) =
                        mesh.element_data(element.semantic, element.semantic_index, element.stream)
                    {
                        let values: Vec<&[u8]> = values.collect();
                        let raw = combined.raw_data_mut();
                        for (i, value) in values.into_iter().enumerate() {
                            let dst = dst_offset + (first_vertex + i) * dst_stride;
                            raw[dst..dst + size].copy_from_slice(value);
                        }
                    }
                    first_vertex += mesh.num_vertices as usize;
                }
            }
        }

        let sub_meshes = sub_meshes.iter().flatten().cloned().collect();

        log::debug!(
            "MeshData: combined {} meshes into {} vertices, {} indices ({:?})",
            meshes.len(),
            total_vertices,
            total_indices,
            index_type
        );

        Ok((combined, sub_meshes))
    }
}

impl std::fmt::Debug for MeshData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeshData")
            .field("num_vertices", &self.num_vertices)
            .field("num_indices", &self.num_indices)
            .field("index_type", &self.index_type)
            .field("num_elements", &self.desc.num_elements())
            .field("size", &self.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use VertexElementSemantic as Sem;
    use VertexElementType as Ty;

    fn position_only() -> Arc<VertexDataDesc> {
        Arc::new(VertexDataDesc::new().with_element(Ty::Float3, Sem::Position, 0, 0))
    }

    fn positions(points: &[[f32; 3]]) -> Vec<u8> {
        bytemuck::cast_slice(points).to_vec()
    }

    fn triangle(offset: f32) -> MeshData {
        let mut mesh = MeshData::new(3, 3, position_only(), IndexType::Index32);
        mesh.set_vertex_data(
            Sem::Position,
            &positions(&[[offset, 0.0, 0.0], [offset + 1.0, 0.0, 0.0], [offset, 1.0, 0.0]]),
            0,
            0,
        )
        .unwrap();
        mesh.indices32_mut().unwrap().copy_from_slice(&[0, 1, 2]);
        mesh
    }

    #[test]
    fn test_draw_operation_vertices() {
        assert_eq!(DrawOperation::PointList.vertices_per_primitive(), Some(1));
        assert_eq!(DrawOperation::TriangleList.vertices_per_primitive(), Some(3));
        assert_eq!(DrawOperation::TriangleFan.vertices_per_primitive(), None);
    }

    #[test]
    fn test_buffer_partitioning() {
        let desc = Arc::new(
            VertexDataDesc::new()
                .with_element(Ty::Float3, Sem::Position, 0, 0)
                .with_element(Ty::Float2, Sem::TexCoord, 0, 1),
        );
        let mesh = MeshData::new(4, 6, desc, IndexType::Index16);

        assert_eq!(mesh.index_buffer_size(), 12);
        assert_eq!(mesh.stream_offset(0), 12);
        assert_eq!(mesh.stream_size(0), 48);
        assert_eq!(mesh.stream_offset(1), 60);
        assert_eq!(mesh.stream_size(1), 32);
        assert_eq!(mesh.size(), 92);
        assert_eq!(mesh.element_offset(Sem::TexCoord, 0, 1), Some(60));
        assert_eq!(mesh.element_offset(Sem::Normal, 0, 0), None);
    }

    #[test]
    fn test_vertex_data_round_trip() {
        let desc = Arc::new(
            VertexDataDesc::position_normal_uv()
                .with_element(Ty::Color, Sem::Color, 0, 1),
        );
        let mut mesh = MeshData::new(3, 0, desc.clone(), IndexType::Index16);

        let mut inputs = Vec::new();
        for (n, element) in desc.elements().iter().enumerate() {
            let size = element.size() as usize * 3;
            let data: Vec<u8> = (0..size).map(|b| (b * 7 + n * 31) as u8).collect();
            mesh.set_vertex_data(element.semantic, &data, element.semantic_index, element.stream)
                .unwrap();
            inputs.push(data);
        }

        for (element, expected) in desc.elements().iter().zip(inputs) {
            let mut out = vec![0u8; expected.len()];
            mesh.get_vertex_data(element.semantic, &mut out, element.semantic_index, element.stream)
                .unwrap();
            assert_eq!(out, expected, "{:?}", element.semantic);
        }
    }

    #[test]
    fn test_size_mismatch_writes_nothing() {
        let mut mesh = MeshData::new(3, 0, position_only(), IndexType::Index16);
        let err = mesh
            .set_vertex_data(Sem::Position, &[1u8; 35], 0, 0)
            .unwrap_err();
        assert_eq!(
            err,
            MeshError::SizeMismatch {
                expected: 36,
                actual: 35
            }
        );
        assert!(mesh.raw_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_absent_semantic_is_ignored() {
        let mut mesh = MeshData::new(3, 0, position_only(), IndexType::Index16);
        mesh.set_vertex_data(Sem::Normal, &[1u8; 36], 0, 0).unwrap();
        assert!(mesh.raw_data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_wrong_index_type() {
        let mut mesh = MeshData::new(3, 3, position_only(), IndexType::Index16);
        assert!(mesh.indices16().is_ok());
        assert_eq!(
            mesh.indices32().unwrap_err(),
            MeshError::WrongIndexType {
                expected: IndexType::Index32,
                actual: IndexType::Index16
            }
        );
        assert!(mesh.indices32_mut().is_err());
    }

    #[test]
    fn test_quad_bounds() {
        let mut mesh = MeshData::new(4, 4, position_only(), IndexType::Index16);
        mesh.set_vertex_data(
            Sem::Position,
            &positions(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]]),
            0,
            0,
        )
        .unwrap();
        mesh.indices16_mut().unwrap().copy_from_slice(&[0, 1, 2, 3]);

        let bounds = mesh.calculate_bounds();
        assert_eq!(bounds.bounding_box.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.bounding_box.max, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(bounds.sphere.center, Vec3::new(0.5, 0.5, 0.0));
        assert!((bounds.sphere.radius - 0.5f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_range_and_duplicates() {
        let mut mesh = MeshData::new(3, 6, position_only(), IndexType::Index32);
        mesh.set_vertex_data(
            Sem::Position,
            &positions(&[[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [10.0, 0.0, 0.0]]),
            0,
            0,
        )
        .unwrap();
        mesh.indices32_mut()
            .unwrap()
            .copy_from_slice(&[0, 0, 0, 1, 2, 2]);

        // Mean over referenced indices: (0 + 0 + 0 + 2) / 4.
        let bounds = mesh.calculate_bounds_range(0, 4);
        assert_eq!(bounds.bounding_box.max, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(bounds.sphere.center, Vec3::new(0.5, 0.0, 0.0));
        assert!((bounds.sphere.radius - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_without_position() {
        let desc = Arc::new(VertexDataDesc::new().with_element(Ty::Float3, Sem::Normal, 0, 0));
        let mesh = MeshData::new(3, 3, desc, IndexType::Index16);
        assert_eq!(mesh.calculate_bounds(), Bounds::default());

        let desc = Arc::new(VertexDataDesc::new().with_element(Ty::Float2, Sem::Position, 0, 0));
        let mesh = MeshData::new(3, 3, desc, IndexType::Index16);
        assert_eq!(mesh.calculate_bounds(), Bounds::default());
    }

    #[test]
    fn test_combine_two_triangles() {
        let a = triangle(0.0);
        let b = triangle(5.0);
        let (combined, subs) = MeshData::combine(
            &[&a, &b],
            &[vec![SubMesh::new(0, 3)], vec![SubMesh::new(0, 3).with_material_name("b")]],
        )
        .unwrap();

        assert_eq!(combined.num_vertices(), 6);
        assert_eq!(combined.num_indices(), 6);
        assert_eq!(combined.indices32().unwrap(), &[0, 1, 2, 3, 4, 5]);

        let mut out = vec![0u8; 72];
        combined.get_vertex_data(Sem::Position, &mut out, 0, 0).unwrap();
        let points: Vec<[f32; 3]> = bytemuck::pod_collect_to_vec(&out);
        assert_eq!(points[3], [5.0, 0.0, 0.0]);

        // Sub-mesh offsets are not rebased onto the combined index buffer.
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[1].index_offset, 0);
        assert_eq!(subs[1].index_count, 3);
        assert_eq!(subs[1].material_name, "b");
    }

    #[test]
    fn test_combine_zero_fills_missing_elements() {
        let a = triangle(0.0);
        let desc = Arc::new(
            VertexDataDesc::new()
                .with_element(Ty::Float3, Sem::Position, 0, 0)
                .with_element(Ty::Float2, Sem::TexCoord, 0, 0),
        );
        let mut b = MeshData::new(3, 3, desc, IndexType::Index16);
        b.set_vertex_data(Sem::TexCoord, &positions(&[[1.0; 3], [1.0; 3]]), 0, 0)
            .unwrap();
        b.indices16_mut().unwrap().copy_from_slice(&[2, 1, 0]);

        let (combined, _) = MeshData::combine(&[&a, &b], &[vec![], vec![]]).unwrap();
        assert_eq!(combined.index_type(), IndexType::Index32);
        assert_eq!(combined.indices32().unwrap(), &[0, 1, 2, 5, 4, 3]);

        let uvs: Vec<&[u8]> = combined.element_data(Sem::TexCoord, 0, 0).unwrap().collect();
        assert!(uvs[..3].iter().all(|uv| uv.iter().all(|&b| b == 0)));
        assert_eq!(bytemuck::pod_read_unaligned::<[f32; 2]>(uvs[4]), [1.0, 1.0]);
    }

    #[test]
    fn test_combine_type_conflict() {
        let a = triangle(0.0);
        let desc = Arc::new(VertexDataDesc::new().with_element(Ty::Float4, Sem::Position, 0, 0));
        let b = MeshData::new(3, 3, desc, IndexType::Index32);

        let err = MeshData::combine(&[&a, &b], &[vec![], vec![]]).unwrap_err();
        assert!(matches!(
            err,
            MeshError::ElementTypeConflict {
                existing: Ty::Float3,
                incoming: Ty::Float4,
                ..
            }
        ));
    }

    #[test]
    fn test_combine_keeps_16_bit_indices() {
        let desc = position_only();
        let mut a = MeshData::new(2, 2, desc.clone(), IndexType::Index16);
        a.indices16_mut().unwrap().copy_from_slice(&[0, 1]);
        let mut b = MeshData::new(2, 2, desc, IndexType::Index16);
        b.indices16_mut().unwrap().copy_from_slice(&[1, 0]);

        let (combined, _) = MeshData::combine(&[&a, &b], &[vec![], vec![]]).unwrap();
        assert_eq!(combined.index_type(), IndexType::Index16);
        assert_eq!(combined.indices16().unwrap(), &[0, 1, 3, 2]);
    }
}
