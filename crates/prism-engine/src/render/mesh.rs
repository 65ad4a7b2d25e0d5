use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::coords::{Color, Rect};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh has no indices")]
    Empty,

    #[error("stream `{stream}` has {len} entries, expected {expected}")]
    StreamLength {
        stream: &'static str,
        len: usize,
        expected: usize,
    },

    #[error("index {index} out of range for {vertices} vertices")]
    IndexOutOfRange { index: u16, vertices: usize },

    #[error("index count {0} is not a multiple of 3")]
    NotTriangles(usize),

    #[error("mesh exceeds {} vertices", u16::MAX as usize + 1)]
    TooManyVertices,
}

/// CPU-side indexed triangle list with separate attribute streams.
///
/// Positions are logical pixels, colors are straight-alpha RGBA and UVs
/// address the bound texture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 4]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u16>,
}

impl Mesh {
    /// Half-extent of the bootstrap triangle, in logical pixels.
    pub const TRIANGLE_SCALE: f32 = 160.0;
    /// Offset applied to both axes of the bootstrap triangle.
    pub const TRIANGLE_OFFSET: f32 = 320.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// The bootstrap triangle with red, green and blue corners.
    ///
    /// The unit triangle is y-up; it is flipped into y-down pixel space so
    /// the apex points up on screen.
    pub fn triangle() -> Self {
        let unit = [[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
        let positions = unit
            .iter()
            .map(|p: &[f32; 3]| {
                [
                    p[0] * Self::TRIANGLE_SCALE + Self::TRIANGLE_OFFSET,
                    Self::TRIANGLE_OFFSET - p[1] * Self::TRIANGLE_SCALE,
                    p[2],
                ]
            })
            .collect();

        Self {
            positions,
            colors: vec![
                Color::RED.to_array(),
                Color::GREEN.to_array(),
                Color::BLUE.to_array(),
            ],
            uvs: vec![[0.5, 0.0], [0.0, 1.0], [1.0, 1.0]],
            indices: vec![0, 1, 2],
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.colors.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Appends a solid quad as two triangles. Empty rects are skipped.
    pub fn push_quad(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let Ok(base) = u16::try_from(self.positions.len()) else {
            log::warn!("Mesh::push_quad: vertex limit reached; quad dropped");
            return;
        };
        if base > u16::MAX - 3 {
            log::warn!("Mesh::push_quad: vertex limit reached; quad dropped");
            return;
        }

        let uv = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        for (corner, uv) in rect.corners().into_iter().zip(uv) {
            self.positions.push([corner.x, corner.y, 0.0]);
            self.colors.push(color.to_array());
            self.uvs.push(uv);
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Checks stream lengths and index bounds.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.is_empty() {
            return Err(MeshError::Empty);
        }
        let n = self.positions.len();
        if n > u16::MAX as usize + 1 {
            return Err(MeshError::TooManyVertices);
        }
        if self.colors.len() != n {
            return Err(MeshError::StreamLength {
                stream: "color",
                len: self.colors.len(),
                expected: n,
            });
        }
        if !self.uvs.is_empty() && self.uvs.len() != n {
            return Err(MeshError::StreamLength {
                stream: "uv",
                len: self.uvs.len(),
                expected: n,
            });
        }
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::NotTriangles(self.indices.len()));
        }
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= n) {
            return Err(MeshError::IndexOutOfRange { index, vertices: n });
        }
        Ok(())
    }

    /// UV stream, zero-filled when the mesh carries none.
    fn uvs_or_zero(&self) -> std::borrow::Cow<'_, [[f32; 2]]> {
        if self.uvs.is_empty() {
            std::borrow::Cow::Owned(vec![[0.0; 2]; self.positions.len()])
        } else {
            std::borrow::Cow::Borrowed(&self.uvs)
        }
    }

    /// Index bytes padded to the 4-byte copy alignment.
    fn padded_indices(&self) -> Vec<u16> {
        let mut out = self.indices.clone();
        if out.len() % 2 != 0 {
            out.push(0);
        }
        out
    }
}

pub(crate) const POSITION_ATTRS: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![0 => Float32x3];
pub(crate) const COLOR_ATTRS: [wgpu::VertexAttribute; 1] =
    wgpu::vertex_attr_array![1 => Float32x4];
pub(crate) const UV_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x2];

/// One vertex buffer per attribute stream, in slot order.
pub(crate) fn vertex_layouts() -> [wgpu::VertexBufferLayout<'static>; 3] {
    [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &POSITION_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 4]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &COLOR_ATTRS,
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &UV_ATTRS,
        },
    ]
}

/// Immutable GPU copy of a [`Mesh`]. Created once, never updated.
#[derive(Debug)]
pub struct GpuMesh {
    positions: wgpu::Buffer,
    colors: wgpu::Buffer,
    uvs: wgpu::Buffer,
    indices: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &wgpu::Device, label: &str, mesh: &Mesh) -> Result<Self, MeshError> {
        mesh.validate()?;

        let init = |name: &str, contents: &[u8], usage| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {name}")),
                contents,
                usage,
            })
        };

        let gpu = Self {
            positions: init(
                "positions",
                bytemuck::cast_slice(&mesh.positions),
                wgpu::BufferUsages::VERTEX,
            ),
            colors: init(
                "colors",
                bytemuck::cast_slice(&mesh.colors),
                wgpu::BufferUsages::VERTEX,
            ),
            uvs: init(
                "uvs",
                bytemuck::cast_slice(&*mesh.uvs_or_zero()),
                wgpu::BufferUsages::VERTEX,
            ),
            indices: init(
                "indices",
                bytemuck::cast_slice(&mesh.padded_indices()),
                wgpu::BufferUsages::INDEX,
            ),
            index_count: mesh.index_count() as u32,
        };

        log::debug!(
            "uploaded mesh `{label}`: {} vertices, {} indices",
            mesh.vertex_count(),
            gpu.index_count
        );
        Ok(gpu)
    }

    #[inline]
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Binds the attribute streams to slots 0..3 and the index buffer.
    pub(crate) fn bind<'p>(&self, rpass: &mut wgpu::RenderPass<'p>) {
        rpass.set_vertex_buffer(0, self.positions.slice(..));
        rpass.set_vertex_buffer(1, self.colors.slice(..));
        rpass.set_vertex_buffer(2, self.uvs.slice(..));
        rpass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint16);
    }
}

/// GPU mesh rewritten every frame (slider overlay and the like).
///
/// Buffers grow to the next power of two and are reused while they fit.
#[derive(Debug)]
pub struct DynamicMesh {
    label: String,
    buffers: Option<GpuMesh>,
    vertex_capacity: usize,
    index_capacity: usize,
}

impl DynamicMesh {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            buffers: None,
            vertex_capacity: 0,
            index_capacity: 0,
        }
    }

    /// Replaces the GPU contents with `mesh`. An empty mesh leaves nothing to draw.
    pub fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &Mesh,
    ) -> Result<(), MeshError> {
        if mesh.indices.is_empty() {
            if let Some(buffers) = self.buffers.as_mut() {
                buffers.index_count = 0;
            }
            return Ok(());
        }
        mesh.validate()?;
        self.ensure_capacity(device, mesh.vertex_count(), mesh.index_count());

        let Some(buffers) = self.buffers.as_mut() else { return Ok(()) };
        queue.write_buffer(&buffers.positions, 0, bytemuck::cast_slice(&mesh.positions));
        queue.write_buffer(&buffers.colors, 0, bytemuck::cast_slice(&mesh.colors));
        queue.write_buffer(&buffers.uvs, 0, bytemuck::cast_slice(&*mesh.uvs_or_zero()));
        queue.write_buffer(&buffers.indices, 0, bytemuck::cast_slice(&mesh.padded_indices()));
        buffers.index_count = mesh.index_count() as u32;
        Ok(())
    }

    /// The current contents, or `None` before the first non-empty write.
    pub fn gpu(&self) -> Option<&GpuMesh> {
        self.buffers.as_ref().filter(|b| b.index_count > 0)
    }

    fn ensure_capacity(&mut self, device: &wgpu::Device, vertices: usize, indices: usize) {
        if self.buffers.is_some() && vertices <= self.vertex_capacity && indices <= self.index_capacity {
            return;
        }

        let vcap = vertices.next_power_of_two().max(64);
        let icap = grown_index_capacity(indices);

        let create = |name: &str, size: u64, usage: wgpu::BufferUsages| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&format!("{} {name}", self.label)),
                size,
                usage: usage | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };

        let vertex = wgpu::BufferUsages::VERTEX;
        self.buffers = Some(GpuMesh {
            positions: create("positions", (vcap * 12) as u64, vertex),
            colors: create("colors", (vcap * 16) as u64, vertex),
            uvs: create("uvs", (vcap * 8) as u64, vertex),
            indices: create("indices", (icap * 2) as u64, wgpu::BufferUsages::INDEX),
            index_count: 0,
        });
        self.vertex_capacity = vcap;
        self.index_capacity = icap;
    }
}

/// Index capacity after growth: power of two, even so the byte size stays
/// 4-aligned.
fn grown_index_capacity(required: usize) -> usize {
    required.next_power_of_two().max(96)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_triangle_geometry() {
        let m = Mesh::triangle();
        assert_eq!(
            m.positions,
            vec![[320.0, 160.0, 0.0], [160.0, 320.0, 0.0], [480.0, 320.0, 0.0]]
        );
        assert_eq!(m.colors[0], [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(m.colors[1], [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(m.colors[2], [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(m.indices, vec![0, 1, 2]);
        assert_eq!(m.validate(), Ok(()));
    }

    #[test]
    fn bootstrap_triangle_points_up_on_screen() {
        let m = Mesh::triangle();
        let apex = m.positions[0][1];
        assert!(m.positions[1..].iter().all(|p| apex < p[1]));
    }

    #[test]
    fn quads_append_four_vertices_six_indices() {
        let mut m = Mesh::new();
        m.push_quad(Rect::new(0.0, 0.0, 10.0, 10.0), Color::WHITE);
        m.push_quad(Rect::new(20.0, 0.0, 10.0, 10.0), Color::BLACK);
        assert_eq!(m.vertex_count(), 8);
        assert_eq!(&m.indices[6..], &[4, 5, 6, 4, 6, 7]);
        assert_eq!(m.validate(), Ok(()));
    }

    #[test]
    fn empty_quad_is_skipped() {
        let mut m = Mesh::new();
        m.push_quad(Rect::new(0.0, 0.0, 0.0, 10.0), Color::WHITE);
        assert_eq!(m.vertex_count(), 0);
        assert_eq!(m.validate(), Err(MeshError::Empty));
    }

    #[test]
    fn validate_catches_bad_streams() {
        let mut m = Mesh::triangle();
        m.colors.pop();
        assert!(matches!(m.validate(), Err(MeshError::StreamLength { stream: "color", .. })));

        let mut m = Mesh::triangle();
        m.indices = vec![0, 1, 3];
        assert_eq!(
            m.validate(),
            Err(MeshError::IndexOutOfRange { index: 3, vertices: 3 })
        );

        let mut m = Mesh::triangle();
        m.indices.push(0);
        assert_eq!(m.validate(), Err(MeshError::NotTriangles(4)));
    }

    #[test]
    fn missing_uvs_are_zero_filled() {
        let mut m = Mesh::triangle();
        m.uvs.clear();
        assert_eq!(m.validate(), Ok(()));
        assert_eq!(m.uvs_or_zero().as_ref(), &[[0.0, 0.0]; 3]);
    }

    #[test]
    fn odd_index_counts_are_padded() {
        let m = Mesh::triangle();
        assert_eq!(m.padded_indices(), vec![0, 1, 2, 0]);
        assert_eq!(grown_index_capacity(6) % 2, 0);
        assert_eq!(grown_index_capacity(300), 512);
    }
}
