use bitflags::bitflags;

bitflags! {
    /// Pipeline state that changed since it was last emitted to the hardware.
    ///
    /// Set by the surrounding state tracker; the variant reconciler may add the
    /// shader-stage bits but never clears anything.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u32 {
        const BLEND = 1 << 0;
        const RASTERIZER = 1 << 1;
        const ZSA = 1 << 2;
        const BLEND_COLOR = 1 << 3;
        const STENCIL_REF = 1 << 4;
        const SAMPLE_MASK = 1 << 5;
        const FRAMEBUFFER = 1 << 6;
        const STIPPLE = 1 << 7;
        const VIEWPORT = 1 << 8;
        /// Vertex element layout.
        const VTXSTATE = 1 << 9;
        /// Vertex buffer bindings.
        const VTXBUF = 1 << 10;
        const INDEXBUF = 1 << 11;
        const SCISSOR = 1 << 12;
        const STREAMOUT = 1 << 13;
        const UCP = 1 << 14;
        const CONST = 1 << 16;
        const TEX = 1 << 17;

        const SHADER_VP = 1 << 30;
        const SHADER_FP = 1 << 31;
        const PROG = Self::SHADER_VP.bits() | Self::SHADER_FP.bits();
    }
}

impl DirtyFlags {
    /// Bits that force vertex buffer packets to be re-emitted.
    pub const VERTEX_INPUT: Self = Self::VTXBUF.union(Self::VTXSTATE);

    /// The subset of `self` that names shader stages.
    pub fn stages(self) -> Self {
        self & Self::PROG
    }
}
