//! PM4 packet headers, opcodes and event ids understood by the a5xx CP.
//!
//! Only two packet types are produced by the draw/clear encoder:
//!
//! - type-4: a direct register write. The header carries the first register
//!   offset and the number of payload words; the CP writes the payload to
//!   consecutive registers.
//! - type-7: an opcode packet (`CP_EVENT_WRITE`, `CP_DRAW_INDX_OFFSET`, ...).
//!
//! Both headers protect their variable fields with an odd-parity bit.

pub type CmdWord = u32;

pub const CP_TYPE4_PKT: CmdWord = 0x4 << 28;
pub const CP_TYPE7_PKT: CmdWord = 0x7 << 28;

/// Largest payload a type-4 header can describe.
pub const PKT4_MAX_COUNT: u32 = 0x7f;
/// Largest payload a type-7 header can describe.
pub const PKT7_MAX_COUNT: u32 = 0x3fff;
/// Register offsets are 18 bits wide.
pub const PKT4_MAX_REG: u32 = 0x3ffff;

/// Returns the bit that makes `val` (together with the bit itself) have an odd
/// number of set bits.
pub const fn odd_parity_bit(val: u32) -> u32 {
    let mut v = val;
    v ^= v >> 16;
    v ^= v >> 8;
    v ^= v >> 4;
    v &= 0xf;
    // 0x6996 is the even-parity lookup for a nibble; inverted for odd parity.
    ((!0x6996u32) >> v) & 1
}

pub const fn pkt4_header(reg: u32, count: u32) -> CmdWord {
    CP_TYPE4_PKT
        | count
        | (odd_parity_bit(count) << 7)
        | ((reg & PKT4_MAX_REG) << 8)
        | (odd_parity_bit(reg) << 27)
}

pub const fn pkt7_header(opcode: Pm4Opcode, count: u32) -> CmdWord {
    let op = opcode as u32;
    CP_TYPE7_PKT
        | count
        | (odd_parity_bit(count) << 15)
        | ((op & 0x7f) << 16)
        | (odd_parity_bit(op) << 23)
}

#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Pm4Opcode {
    DrawIndxOffset = 0x38,
    EventWrite = 0x46,
}

impl Pm4Opcode {
    pub fn from_word(word: CmdWord) -> Option<Self> {
        Some(match word {
            x if x == Self::DrawIndxOffset as CmdWord => Self::DrawIndxOffset,
            x if x == Self::EventWrite as CmdWord => Self::EventWrite,
            _ => return None,
        })
    }
}

/// Payload of `CP_EVENT_WRITE`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VgtEvent {
    FlushSo0 = 17,
    FlushSo1 = 18,
    FlushSo2 = 19,
    FlushSo3 = 20,
    Blit = 30,
}

impl VgtEvent {
    /// Stream-output flush event for buffer `index`.
    ///
    /// Panics if `index` is not a valid stream-output slot.
    pub fn flush_so(index: usize) -> Self {
        match index {
            0 => Self::FlushSo0,
            1 => Self::FlushSo1,
            2 => Self::FlushSo2,
            3 => Self::FlushSo3,
            _ => panic!("stream-output buffer index {index} out of range"),
        }
    }

    pub fn from_word(word: CmdWord) -> Option<Self> {
        Some(match word {
            17 => Self::FlushSo0,
            18 => Self::FlushSo1,
            19 => Self::FlushSo2,
            20 => Self::FlushSo3,
            30 => Self::Blit,
            _ => return None,
        })
    }
}

/// `pc_di_primtype`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DiPrimType {
    PointList = 1,
    LineList = 2,
    LineStrip = 3,
    TriList = 4,
    TriFan = 5,
    TriStrip = 6,
    LineLoop = 7,
    LineAdj = 10,
    LineStripAdj = 11,
    TriAdj = 12,
    TriStripAdj = 13,
}

/// `pc_di_src_sel`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DiSrcSel {
    Dma = 0,
    AutoIndex = 2,
}

/// `pc_di_vis_cull_mode`.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum VisCullMode {
    IgnoreVisibility = 0,
    UseVisibility = 1,
}

/// `a4xx_index_size`, shared by a5xx.
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum IndexSize {
    Bits8 = 0,
    Bits16 = 1,
    Bits32 = 2,
}

impl IndexSize {
    /// Panics for anything other than 1, 2 or 4 bytes.
    pub fn from_bytes(index_size: u32) -> Self {
        match index_size {
            1 => Self::Bits8,
            2 => Self::Bits16,
            4 => Self::Bits32,
            _ => panic!("unsupported index size {index_size}"),
        }
    }
}

/// First payload word of `CP_DRAW_INDX_OFFSET`.
pub const fn draw_initiator(
    prim: DiPrimType,
    src_sel: DiSrcSel,
    index_size: IndexSize,
    vis: VisCullMode,
) -> CmdWord {
    ((prim as u32) & 0x3f)
        | (((src_sel as u32) << 6) & 0xc0)
        | (((vis as u32) << 8) & 0x300)
        | (((index_size as u32) << 10) & 0xc00)
}

/// Splits a GPU address into the `(lo, hi)` words of a relocation.
pub const fn split_address(addr: u64) -> [CmdWord; 2] {
    [(addr & 0xffff_ffff) as u32, (addr >> 32) as u32]
}
