//! Shader-stage invalidation driven by variant key changes.
//!
//! The state tracker only marks shader stages dirty when the bound program
//! changes. State that is "unrelated" from its point of view (clamp modes,
//! flat shading, clip planes, sampler swizzle workarounds, ...) can still
//! select a different compiled variant, so every draw compares the new key
//! with the one used last and re-dirties the affected stages.

use tracing::debug;

use super::dirty::DirtyFlags;
use super::variant_key::{SamplerKeyFlags, VariantKey};

/// Shader stages whose compiled variant is stale when moving from `last` to
/// `key`.
pub fn stale_stages(last: &VariantKey, key: &VariantKey) -> DirtyFlags {
    let mut stages = DirtyFlags::empty();
    if last == key {
        return stages;
    }

    // Sampler flags only matter when one side actually uses them.
    if last.has_per_samp() || key.has_per_samp() {
        let changed = last.samplers() ^ key.samplers();
        if changed.intersects(SamplerKeyFlags::VERTEX) {
            stages |= DirtyFlags::SHADER_VP;
        }
        if changed.intersects(SamplerKeyFlags::FRAGMENT) {
            stages |= DirtyFlags::SHADER_FP;
        }
    }

    if last.vclamp_color != key.vclamp_color {
        stages |= DirtyFlags::SHADER_VP;
    }
    if last.fclamp_color != key.fclamp_color {
        stages |= DirtyFlags::SHADER_FP;
    }
    if last.color_two_side != key.color_two_side {
        stages |= DirtyFlags::SHADER_FP;
    }
    if last.half_precision != key.half_precision {
        stages |= DirtyFlags::SHADER_FP;
    }
    if last.rasterflat != key.rasterflat {
        stages |= DirtyFlags::SHADER_FP;
    }
    if last.ucp_enables != key.ucp_enables {
        stages |= DirtyFlags::SHADER_VP | DirtyFlags::SHADER_FP;
    }

    stages
}

/// Owner of the "last emitted" variant key of one rendering context.
#[derive(Debug, Default, Clone)]
pub struct VariantReconciler {
    last_key: VariantKey,
}

impl VariantReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_key(&self) -> &VariantKey {
        &self.last_key
    }

    /// Widens `dirty` with the stages made stale by `key`, then caches `key`.
    ///
    /// Returns the stage bits this call contributed (which may already have
    /// been present in `dirty`).
    pub fn reconcile(&mut self, key: &VariantKey, dirty: &mut DirtyFlags) -> DirtyFlags {
        let stages = stale_stages(&self.last_key, key);
        if !stages.is_empty() {
            debug!(
                ?stages,
                last = ?self.last_key,
                new = ?key,
                "shader variant key change dirtied stages"
            );
        }
        *dirty |= stages;
        self.last_key = *key;
        stages
    }
}
