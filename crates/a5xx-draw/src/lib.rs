//! Draw and clear command-stream encoding for Adreno a5xx.
//!
//! A [`DrawContext`] turns draw and clear calls into PM4 packets. Before each
//! draw it derives the shader [`VariantKey`] from the bound state and compares
//! it with the key of the previous draw, re-dirtying shader stages whose
//! compiled variant the change invalidated. Shader lookup and global state
//! emission are delegated through [`ShaderResolver`] and [`StateEmitter`].

pub mod clear_color;
pub mod config;
pub mod context;
pub mod draw;
mod emit;
pub mod error;
pub mod format;
pub mod shader;
pub mod state;

pub use clear_color::{pack_color, pack_depth_stencil, ClearBuffers, ClearColor};
pub use config::EncoderConfig;
pub use context::{Batch, DrawContext};
pub use draw::{DrawInfo, DrawStateBuilder, EncodableDraw};
pub use error::DrawError;
pub use format::{ColorSwap, PixelFormat};
pub use shader::{ShaderInput, ShaderResolver, ShaderStage, ShaderVariant, StateEmit, StateEmitter};
pub use state::{
    DirtyFlags, FramebufferState, IndexBufferBinding, PipelineState, PrimitiveTopology,
    RasterizerState, SamplerKeyFlags, ScissorRect, StreamoutTargets, VariantKey,
    VariantReconciler, VertexBuffer, VertexElement, VertexState,
};

/// Number of stream-output buffer slots.
pub const MAX_SO_BUFFERS: usize = 4;

/// Number of color attachments a clear can address.
pub const MAX_RENDER_TARGETS: usize = 8;
