//! PM4 command stream layer for Adreno a5xx: packet headers, CP opcodes and
//! events, the register table used by the draw/clear encoder, and an
//! append-only stream writer.

pub mod cmd_writer;
pub mod pm4;
pub mod regs;

pub use cmd_writer::{CmdWriter, Packet, PacketParseError, PacketStream};
pub use pm4::CmdWord;

/// GPU virtual address of a buffer object (already offset where relevant).
pub type GpuAddress = u64;
