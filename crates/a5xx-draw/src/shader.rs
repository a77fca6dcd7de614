//! Seams to the shader cache and the global state emitter.

use std::fmt;
use std::sync::Arc;

use a5xx_pm4::CmdWriter;

use crate::state::{DirtyFlags, PipelineState, VariantKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// One input register of a compiled vertex program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShaderInput {
    pub regid: u32,
    /// Components actually read by the program; zero means unused.
    pub compmask: u32,
    /// Filled by the hardware (vertex id, instance id, ...) rather than fetched.
    pub sysval: bool,
}

impl ShaderInput {
    /// Whether the input needs a vertex fetch slot.
    pub fn is_fetched(&self) -> bool {
        !self.sysval && self.compmask != 0
    }
}

/// A compiled shader variant, as handed out by the shader cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderVariant {
    pub id: u64,
    pub inputs: Vec<ShaderInput>,
    /// The program writes transform feedback outputs.
    pub stream_output: bool,
}

/// Looks up (or compiles) the variants matching a key.
pub trait ShaderResolver {
    fn resolve_vertex(&mut self, key: &VariantKey) -> Option<Arc<ShaderVariant>>;
    fn resolve_fragment(&mut self, key: &VariantKey) -> Option<Arc<ShaderVariant>>;
}

/// What the global state emitter gets to see for one pass of one draw.
#[derive(Debug, Clone, Copy)]
pub struct StateEmit<'a> {
    pub dirty: DirtyFlags,
    pub key: &'a VariantKey,
    pub vp: &'a ShaderVariant,
    pub fp: &'a ShaderVariant,
    pub state: &'a PipelineState,
    pub streamout_mask: u32,
}

/// Emits program, render target, blend and depth/stencil state for the
/// subset named by `emit.dirty`.
pub trait StateEmitter {
    fn emit_state(&mut self, ring: &mut CmdWriter, emit: &StateEmit<'_>);
}
