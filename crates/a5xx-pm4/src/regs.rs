//! a5xx register offsets and bitfield helpers used by the draw/clear paths.
//!
//! Offsets are in dwords, as written into type-4 packet headers.

// --- CP ---

pub const CP_SCRATCH_REG0: u32 = 0x0b78;

pub const fn cp_scratch_reg(index: u32) -> u32 {
    CP_SCRATCH_REG0 + index
}

/// Scratch register that carries the draw/blit debug marker counter.
pub const MARKER_SCRATCH_INDEX: u32 = 7;

// --- PC ---

pub const PC_RESTART_INDEX: u32 = 0xe38c;

/// Restart index value meaning "primitive restart disabled".
pub const PC_RESTART_INDEX_DISABLED: u32 = 0xffff_ffff;

// --- VFD ---

pub const VFD_CONTROL_0: u32 = 0xe400;
pub const VFD_INDEX_OFFSET: u32 = 0xe408;

/// First of four registers: BASE_LO, BASE_HI, SIZE, STRIDE.
pub const fn vfd_fetch(index: u32) -> u32 {
    0xe40a + 4 * index
}

/// First of two registers: INSTR, STEP_RATE.
pub const fn vfd_decode(index: u32) -> u32 {
    0xe48a + 2 * index
}

pub const fn vfd_dest_cntl(index: u32) -> u32 {
    0xe4ca + index
}

pub const fn vfd_control_0_vtxcnt(count: u32) -> u32 {
    count & 0x3f
}

pub const VFD_DECODE_INSTR_INSTANCED: u32 = 0x0002_0000;
pub const VFD_DECODE_INSTR_UNK30: u32 = 0x4000_0000;
pub const VFD_DECODE_INSTR_FLOAT: u32 = 0x8000_0000;

pub const fn vfd_decode_instr_idx(index: u32) -> u32 {
    index & 0x1f
}

pub const fn vfd_decode_instr_format(format: u32) -> u32 {
    (format << 20) & 0x0ff0_0000
}

pub const fn vfd_dest_cntl_writemask(mask: u32) -> u32 {
    mask & 0xf
}

pub const fn vfd_dest_cntl_regid(regid: u32) -> u32 {
    (regid << 4) & 0xff0
}

/// Maximum number of vertex fetch slots.
pub const MAX_VERTEX_FETCH: usize = 32;

// --- RB ---

pub const RB_RENDER_CNTL: u32 = 0xe145;
pub const RB_RENDER_CNTL_DRAW: u32 = 0x0000_0008;
pub const RB_RENDER_CNTL_SAMPLES_PASSED: u32 = 0x0000_0040;

pub const RB_BLIT_CNTL: u32 = 0xe210;
pub const RB_CLEAR_COLOR_DW0: u32 = 0xe217;
pub const RB_CLEAR_CNTL: u32 = 0xe21c;

pub const RB_CLEAR_CNTL_FAST_CLEAR: u32 = 0x0000_0002;

pub const fn rb_clear_cntl_mask(mask: u32) -> u32 {
    (mask << 4) & 0xf0
}

/// `a5xx_blit_buf`: which attachment a blit/clear targets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlitBuf {
    Mrt(u32),
    DepthStencil,
}

impl BlitBuf {
    pub const fn raw(self) -> u32 {
        match self {
            BlitBuf::Mrt(index) => index,
            BlitBuf::DepthStencil => 8,
        }
    }
}

pub const fn rb_blit_cntl_buf(buf: BlitBuf) -> u32 {
    buf.raw() & 0xf
}
