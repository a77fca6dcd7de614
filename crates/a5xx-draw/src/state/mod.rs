//! Pipeline state consumed by the draw and clear paths.
//!
//! The surrounding state tracker owns the binding calls; this module only
//! describes what is bound and what changed.

pub mod dirty;
pub mod reconcile;
pub mod topology;
pub mod variant_key;

pub use dirty::DirtyFlags;
pub use reconcile::{stale_stages, VariantReconciler};
pub use topology::PrimitiveTopology;
pub use variant_key::{SamplerKeyFlags, VariantKey};

use a5xx_pm4::GpuAddress;

use crate::format::PixelFormat;
use crate::MAX_SO_BUFFERS;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SpriteCoordMode {
    #[default]
    UpperLeft,
    LowerLeft,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RasterizerState {
    pub light_twoside: bool,
    pub clamp_vertex_color: bool,
    pub clamp_fragment_color: bool,
    pub flatshade: bool,
    /// One bit per generic varying replaced by the point sprite coordinate.
    pub sprite_coord_enable: u32,
    pub sprite_coord_mode: SpriteCoordMode,
    pub clip_plane_enable: u8,
}

/// Inclusive pixel bounds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScissorRect {
    pub minx: u16,
    pub miny: u16,
    pub maxx: u16,
    pub maxy: u16,
}

impl ScissorRect {
    /// Bound that any `widen` replaces entirely.
    pub const EMPTY: Self = Self {
        minx: u16::MAX,
        miny: u16::MAX,
        maxx: 0,
        maxy: 0,
    };

    pub fn new(minx: u16, miny: u16, maxx: u16, maxy: u16) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Grows `self` to also cover `other`.
    pub fn widen(&mut self, other: &ScissorRect) {
        self.minx = self.minx.min(other.minx);
        self.miny = self.miny.min(other.miny);
        self.maxx = self.maxx.max(other.maxx);
        self.maxy = self.maxy.max(other.maxy);
    }
}

impl Default for ScissorRect {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Formats of the bound render targets. Unbound color slots are `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FramebufferState {
    pub cbufs: Vec<Option<PixelFormat>>,
    pub zsbuf: Option<PixelFormat>,
}

impl FramebufferState {
    /// Whether every bound color buffer tolerates half-precision fragment
    /// output. Vacuously true with no color buffers.
    pub fn half_precision_capable(&self) -> bool {
        self.cbufs
            .iter()
            .flatten()
            .all(|format| format.allows_half_precision())
    }
}

/// One vertex element, indexed by the vertex program input it feeds.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexElement {
    pub buffer_index: usize,
    pub src_offset: u32,
    /// Hardware `a5xx_vtx_fmt` code, already looked up by the caller.
    pub fetch_format: u8,
    /// Source format is a pure integer format.
    pub integer: bool,
    pub instance_divisor: u32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexBuffer {
    /// Base address of the backing buffer object.
    pub address: GpuAddress,
    /// Size of the backing buffer object in bytes.
    pub bo_size: u32,
    pub buffer_offset: u32,
    pub stride: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct VertexState {
    pub elements: Vec<VertexElement>,
    pub buffers: Vec<VertexBuffer>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct IndexBufferBinding {
    pub address: GpuAddress,
    pub size_bytes: u32,
    /// Bytes per index: 1, 2 or 4.
    pub index_size: u32,
    /// Byte offset of the first index within the buffer.
    pub offset: u32,
}

impl IndexBufferBinding {
    /// Byte offset of index `start`, wrapping like the 32-bit address math
    /// of the command processor.
    pub fn offset_of(&self, start: u32) -> u32 {
        self.offset.wrapping_add(start.wrapping_mul(self.index_size))
    }

    /// Number of indices the whole buffer can hold.
    pub fn max_indices(&self) -> u32 {
        self.size_bytes / self.index_size
    }
}

/// Which stream-output buffer slots have a target bound.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StreamoutTargets {
    mask: u8,
}

impl StreamoutTargets {
    pub fn none() -> Self {
        Self::default()
    }

    /// Panics for slots past `MAX_SO_BUFFERS`.
    pub fn bind(&mut self, slot: usize) {
        assert!(slot < MAX_SO_BUFFERS, "stream-output slot {slot} out of range");
        self.mask |= 1 << slot;
    }

    pub fn unbind(&mut self, slot: usize) {
        if slot < MAX_SO_BUFFERS {
            self.mask &= !(1 << slot);
        }
    }

    pub fn mask(&self) -> u32 {
        u32::from(self.mask)
    }
}

/// Everything bound on a context that the draw and clear paths read.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PipelineState {
    pub rasterizer: RasterizerState,
    pub samplers: SamplerKeyFlags,
    pub framebuffer: FramebufferState,
    pub vertex: VertexState,
    pub index_buffer: Option<IndexBufferBinding>,
    pub streamout: StreamoutTargets,
    pub scissor: ScissorRect,
    /// Set while the context draws on behalf of an internal blit.
    pub in_blit: bool,
    /// Number of active samples-passed (occlusion) queries.
    pub samples_passed_queries: u32,
}

impl PipelineState {
    /// Shader variant key for the current state, for the non-binning pass.
    pub fn variant_key(&self) -> VariantKey {
        let rast = &self.rasterizer;
        VariantKey {
            color_two_side: rast.light_twoside,
            vclamp_color: rast.clamp_vertex_color,
            fclamp_color: rast.clamp_fragment_color,
            rasterflat: rast.flatshade,
            half_precision: self.in_blit && self.framebuffer.half_precision_capable(),
            ucp_enables: rast.clip_plane_enable,
            binning_pass: false,
            ..VariantKey::default()
        }
        .with_samplers(self.samplers)
    }

    pub fn samples_passed_active(&self) -> bool {
        self.samples_passed_queries > 0
    }
}
