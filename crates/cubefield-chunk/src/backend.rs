//! Seam between chunk meshes and whatever owns GPU buffers.

use cubefield_geom::Vec3;
use hashbrown::HashMap;

use crate::mesh::Vertex;

/// Opaque id of an uploaded vertex/index buffer pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshHandle(pub u32);

/// Synchronous "submit vertices, draw" service.
pub trait MeshBackend {
    /// Uploads a mesh, reusing `previous`'s buffers when given.
    fn upload_mesh(
        &mut self,
        previous: Option<MeshHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> MeshHandle;

    /// Draws the first `index_count` indices with the mesh translated to `origin`.
    fn draw_indexed(&mut self, handle: MeshHandle, index_count: usize, origin: Vec3);

    fn release(&mut self, handle: MeshHandle);
}

/// What a headless backend remembers about one upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedMesh {
    pub vertex_count: usize,
    pub index_count: usize,
    pub vertex_bytes: usize,
    /// How many times these buffers were (re)filled.
    pub uploads: u32,
}

/// In-process backend that records uploads and counts draws.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    meshes: HashMap<MeshHandle, UploadedMesh>,
    next_id: u32,
    pub draw_calls: usize,
    pub indices_drawn: usize,
    pub bytes_uploaded: usize,
    pub releases: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&UploadedMesh> {
        self.meshes.get(&handle)
    }

    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Zeroes the per-frame draw counters.
    pub fn begin_frame(&mut self) {
        self.draw_calls = 0;
        self.indices_drawn = 0;
    }
}

impl MeshBackend for HeadlessBackend {
    fn upload_mesh(
        &mut self,
        previous: Option<MeshHandle>,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> MeshHandle {
        let vertex_bytes = bytemuck::cast_slice::<Vertex, u8>(vertices).len();
        let index_bytes = bytemuck::cast_slice::<u32, u8>(indices).len();
        self.bytes_uploaded += vertex_bytes + index_bytes;

        let handle = match previous {
            Some(h) if self.meshes.contains_key(&h) => h,
            _ => {
                let h = MeshHandle(self.next_id);
                self.next_id += 1;
                h
            }
        };
        let entry = self.meshes.entry(handle).or_insert(UploadedMesh {
            vertex_count: 0,
            index_count: 0,
            vertex_bytes: 0,
            uploads: 0,
        });
        entry.vertex_count = vertices.len();
        entry.index_count = indices.len();
        entry.vertex_bytes = vertex_bytes;
        entry.uploads += 1;
        handle
    }

    fn draw_indexed(&mut self, handle: MeshHandle, index_count: usize, _origin: Vec3) {
        let Some(mesh) = self.meshes.get(&handle) else {
            log::warn!("draw of unknown mesh {:?}", handle);
            return;
        };
        if index_count > mesh.index_count {
            log::warn!(
                "draw of {} indices exceeds upload of {} for {:?}",
                index_count,
                mesh.index_count,
                handle
            );
        }
        self.draw_calls += 1;
        self.indices_drawn += index_count.min(mesh.index_count);
    }

    fn release(&mut self, handle: MeshHandle) {
        if self.meshes.remove(&handle).is_some() {
            self.releases += 1;
        }
    }
}
