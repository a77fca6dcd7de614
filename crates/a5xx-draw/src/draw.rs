//! Draw requests and the builder that turns one into something the packet
//! encoder will accept.

use std::sync::Arc;

use a5xx_pm4::pm4::{DiPrimType, VisCullMode};
use tracing::debug;

use crate::error::DrawError;
use crate::shader::{ShaderResolver, ShaderStage, ShaderVariant};
use crate::state::{DirtyFlags, PipelineState, PrimitiveTopology, VariantKey, VariantReconciler};

/// A single draw call as issued by the API layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawInfo {
    pub topology: PrimitiveTopology,
    pub indexed: bool,
    /// Added to every fetched index; only meaningful for indexed draws.
    pub index_bias: i32,
    /// First vertex, or first index for indexed draws.
    pub start: u32,
    pub count: u32,
    pub start_instance: u32,
    pub instance_count: u32,
    pub primitive_restart: bool,
    pub restart_index: u32,
}

impl DrawInfo {
    /// A single-instance non-indexed draw.
    pub fn arrays(topology: PrimitiveTopology, start: u32, count: u32) -> Self {
        Self {
            topology,
            indexed: false,
            index_bias: 0,
            start,
            count,
            start_instance: 0,
            instance_count: 1,
            primitive_restart: false,
            restart_index: 0,
        }
    }

    /// A single-instance indexed draw from the bound index buffer.
    pub fn elements(topology: PrimitiveTopology, start: u32, count: u32, index_bias: i32) -> Self {
        Self {
            indexed: true,
            index_bias,
            ..Self::arrays(topology, start, count)
        }
    }

    pub fn instanced(mut self, start_instance: u32, instance_count: u32) -> Self {
        self.start_instance = start_instance;
        self.instance_count = instance_count;
        self
    }

    pub fn with_restart(mut self, restart_index: u32) -> Self {
        self.primitive_restart = true;
        self.restart_index = restart_index;
        self
    }
}

/// Variants for the visibility-ignoring binning pass.
#[cfg(feature = "binning_pass")]
#[derive(Debug, Clone)]
pub(crate) struct BinningVariants {
    pub(crate) key: VariantKey,
    pub(crate) vp: Arc<ShaderVariant>,
    pub(crate) fp: Arc<ShaderVariant>,
}

/// A draw whose key, shaders and dirty snapshot are all frozen.
///
/// Only [`DrawStateBuilder::build`] creates one; the packet encoder consumes
/// it in a single fixed sequence.
#[derive(Debug)]
pub struct EncodableDraw<'a> {
    pub(crate) info: &'a DrawInfo,
    pub(crate) prim: DiPrimType,
    pub(crate) key: VariantKey,
    pub(crate) dirty: DirtyFlags,
    pub(crate) vp: Arc<ShaderVariant>,
    pub(crate) fp: Arc<ShaderVariant>,
    pub(crate) streamout_mask: u32,
    #[cfg(feature = "binning_pass")]
    pub(crate) binning: BinningVariants,
}

impl<'a> EncodableDraw<'a> {
    pub fn info(&self) -> &'a DrawInfo {
        self.info
    }

    pub fn key(&self) -> &VariantKey {
        &self.key
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn vertex_shader(&self) -> &ShaderVariant {
        &self.vp
    }

    pub fn fragment_shader(&self) -> &ShaderVariant {
        &self.fp
    }

    pub fn streamout_mask(&self) -> u32 {
        self.streamout_mask
    }

    /// Visibility mode of the primary pass.
    pub fn visibility(&self) -> VisCullMode {
        if self.key.binning_pass {
            VisCullMode::IgnoreVisibility
        } else {
            VisCullMode::UseVisibility
        }
    }
}

/// Derives the variant key for a draw, reconciles it against the previous
/// one and resolves the shaders.
pub struct DrawStateBuilder<'s, R: ?Sized> {
    state: &'s PipelineState,
    resolver: &'s mut R,
}

impl<'s, R: ShaderResolver + ?Sized> DrawStateBuilder<'s, R> {
    pub fn new(state: &'s PipelineState, resolver: &'s mut R) -> Self {
        Self { state, resolver }
    }

    /// Freezes `info` into an [`EncodableDraw`].
    ///
    /// `dirty` is widened with the shader stages the key change made stale
    /// and the reconciler's cache is updated, even if resolution fails. On
    /// failure nothing should be emitted.
    ///
    /// Panics if the topology has no hardware primitive, or for an indexed
    /// draw with no index buffer bound.
    pub fn build<'a>(
        self,
        info: &'a DrawInfo,
        reconciler: &mut VariantReconciler,
        dirty: &mut DirtyFlags,
    ) -> Result<EncodableDraw<'a>, DrawError> {
        let prim = info
            .topology
            .hw_prim()
            .unwrap_or_else(|| panic!("topology {} has no hardware primitive", info.topology));
        assert!(
            !info.indexed || self.state.index_buffer.is_some(),
            "indexed draw without an index buffer"
        );

        let mut key = self.state.variant_key();
        reconciler.reconcile(&key, dirty);
        let snapshot = *dirty;

        // Primary variants resolve before the binning ones.
        let vp = resolve(self.resolver, &key, ShaderStage::Vertex)?;
        let fp = resolve(self.resolver, &key, ShaderStage::Fragment)?;

        #[cfg(feature = "binning_pass")]
        let binning = {
            let mut binning_key = key;
            binning_key.binning_pass = true;
            BinningVariants {
                vp: resolve(self.resolver, &binning_key, ShaderStage::Vertex)?,
                fp: resolve(self.resolver, &binning_key, ShaderStage::Fragment)?,
                key: binning_key,
            }
        };

        key.binning_pass = false;
        let streamout_mask = if vp.stream_output {
            self.state.streamout.mask()
        } else {
            0
        };

        Ok(EncodableDraw {
            info,
            prim,
            key,
            dirty: snapshot,
            vp,
            fp,
            streamout_mask,
            #[cfg(feature = "binning_pass")]
            binning,
        })
    }
}

fn resolve<R: ShaderResolver + ?Sized>(
    resolver: &mut R,
    key: &VariantKey,
    stage: ShaderStage,
) -> Result<Arc<ShaderVariant>, DrawError> {
    let variant = match stage {
        ShaderStage::Vertex => resolver.resolve_vertex(key),
        ShaderStage::Fragment => resolver.resolve_fragment(key),
    };
    variant.ok_or_else(|| {
        debug!(%stage, ?key, "shader variant resolution failed");
        DrawError::ShaderResolution { stage }
    })
}
