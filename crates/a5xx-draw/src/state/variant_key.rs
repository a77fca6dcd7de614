use bitflags::bitflags;

bitflags! {
    /// Per-sampler texture state that is baked into shader variants.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct SamplerKeyFlags: u16 {
        const VSATURATE_S = 1 << 0;
        const VSATURATE_T = 1 << 1;
        const VSATURATE_R = 1 << 2;
        const VASTC_SRGB = 1 << 3;
        const FSATURATE_S = 1 << 4;
        const FSATURATE_T = 1 << 5;
        const FSATURATE_R = 1 << 6;
        const FASTC_SRGB = 1 << 7;

        const VERTEX = Self::VSATURATE_S.bits()
            | Self::VSATURATE_T.bits()
            | Self::VSATURATE_R.bits()
            | Self::VASTC_SRGB.bits();
        const FRAGMENT = Self::FSATURATE_S.bits()
            | Self::FSATURATE_T.bits()
            | Self::FSATURATE_R.bits()
            | Self::FASTC_SRGB.bits();
    }
}

/// Everything about the current pipeline state that selects a compiled shader
/// variant.
///
/// `has_per_samp` is derived from the sampler flags; the public API keeps the
/// two in sync, so two keys compare equal only when every field, derived one
/// included, matches.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VariantKey {
    pub color_two_side: bool,
    pub vclamp_color: bool,
    pub fclamp_color: bool,
    pub rasterflat: bool,
    pub half_precision: bool,
    /// User clip plane enable mask.
    pub ucp_enables: u8,
    pub binning_pass: bool,
    pub(super) samplers: SamplerKeyFlags,
    pub(super) has_per_samp: bool,
}

impl VariantKey {
    pub fn samplers(&self) -> SamplerKeyFlags {
        self.samplers
    }

    pub fn has_per_samp(&self) -> bool {
        self.has_per_samp
    }

    pub fn set_samplers(&mut self, samplers: SamplerKeyFlags) {
        self.samplers = samplers;
        self.has_per_samp = !samplers.is_empty();
    }

    pub fn with_samplers(mut self, samplers: SamplerKeyFlags) -> Self {
        self.set_samplers(samplers);
        self
    }

    /// Builds a key whose `has_per_samp` does not match its sampler flags.
    /// Only the reconciler tests need one.
    #[cfg(test)]
    pub(crate) fn with_raw_per_samp(
        mut self,
        samplers: SamplerKeyFlags,
        has_per_samp: bool,
    ) -> Self {
        self.samplers = samplers;
        self.has_per_samp = has_per_samp;
        self
    }
}
