//! Append-only PM4 command stream builder and a matching packet walker.
//!
//! The writer only ever appends whole packets; nothing already written is
//! read back or patched. `PacketStream` exists for tests and tooling that need
//! to inspect what was emitted.

use thiserror::Error;

use crate::pm4::{
    pkt4_header, pkt7_header, CmdWord, Pm4Opcode, CP_TYPE4_PKT, CP_TYPE7_PKT, PKT4_MAX_COUNT,
    PKT4_MAX_REG, PKT7_MAX_COUNT,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CmdWriter {
    words: Vec<CmdWord>,
}

impl CmdWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands the recorded words over for submission.
    pub fn finish(self) -> Vec<CmdWord> {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Length of the stream in dwords.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Little-endian byte view, as handed to the ring-buffer collaborator.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    pub fn packets(&self) -> PacketStream<'_> {
        PacketStream::new(&self.words)
    }

    /// Direct write of `payload` to consecutive registers starting at `reg`.
    pub fn pkt4(&mut self, reg: u32, payload: &[CmdWord]) {
        let count = payload.len() as u32;
        assert!(
            (1..=PKT4_MAX_COUNT).contains(&count),
            "type-4 packet to {reg:#x} with {count} words"
        );
        assert!(reg <= PKT4_MAX_REG, "register offset {reg:#x} out of range");
        self.words.push(pkt4_header(reg, count));
        self.words.extend_from_slice(payload);
    }

    pub fn pkt7(&mut self, opcode: Pm4Opcode, payload: &[CmdWord]) {
        let count = payload.len() as u32;
        assert!(
            count <= PKT7_MAX_COUNT,
            "type-7 packet {opcode:?} with {count} words"
        );
        self.words.push(pkt7_header(opcode, count));
        self.words.extend_from_slice(payload);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Packet<'a> {
    Type4 { reg: u32, payload: &'a [CmdWord] },
    Type7 { opcode: Pm4Opcode, payload: &'a [CmdWord] },
}

impl<'a> Packet<'a> {
    pub fn payload(&self) -> &'a [CmdWord] {
        match self {
            Packet::Type4 { payload, .. } | Packet::Type7 { payload, .. } => payload,
        }
    }

    /// Register offset of a type-4 packet.
    pub fn reg(&self) -> Option<u32> {
        match self {
            Packet::Type4 { reg, .. } => Some(*reg),
            Packet::Type7 { .. } => None,
        }
    }

    pub fn opcode(&self) -> Option<Pm4Opcode> {
        match self {
            Packet::Type4 { .. } => None,
            Packet::Type7 { opcode, .. } => Some(*opcode),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketParseError {
    #[error("unknown packet type {header:#010x} at word {at_word}")]
    UnknownPacketType { header: CmdWord, at_word: usize },
    #[error("parity mismatch in header {header:#010x} at word {at_word}")]
    BadParity { header: CmdWord, at_word: usize },
    #[error("unknown type-7 opcode {opcode:#x} at word {at_word}")]
    UnknownOpcode { opcode: u32, at_word: usize },
    #[error("truncated payload at word {at_word}: expected {expected_words} words, only {remaining_words} remaining")]
    TruncatedPayload {
        expected_words: usize,
        remaining_words: usize,
        at_word: usize,
    },
}

enum PacketKind {
    Type4(u32),
    Type7(Pm4Opcode),
}

pub struct PacketStream<'a> {
    words: &'a [CmdWord],
    cursor: usize,
}

impl<'a> PacketStream<'a> {
    pub fn new(words: &'a [CmdWord]) -> Self {
        Self { words, cursor: 0 }
    }
}

impl<'a> Iterator for PacketStream<'a> {
    type Item = Result<Packet<'a>, PacketParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.words.len() {
            return None;
        }
        let at_word = self.cursor;
        let header = self.words[at_word];

        let (count, packet_kind) = match header & 0xf000_0000 {
            CP_TYPE4_PKT => {
                let count = header & PKT4_MAX_COUNT;
                let reg = (header >> 8) & PKT4_MAX_REG;
                if pkt4_header(reg, count) != header {
                    return Some(Err(PacketParseError::BadParity { header, at_word }));
                }
                (count as usize, PacketKind::Type4(reg))
            }
            CP_TYPE7_PKT => {
                let count = header & PKT7_MAX_COUNT;
                let raw_opcode = (header >> 16) & 0x7f;
                let Some(opcode) = Pm4Opcode::from_word(raw_opcode) else {
                    return Some(Err(PacketParseError::UnknownOpcode {
                        opcode: raw_opcode,
                        at_word,
                    }));
                };
                if pkt7_header(opcode, count) != header {
                    return Some(Err(PacketParseError::BadParity { header, at_word }));
                }
                (count as usize, PacketKind::Type7(opcode))
            }
            _ => {
                return Some(Err(PacketParseError::UnknownPacketType { header, at_word }));
            }
        };

        let payload_start = at_word + 1;
        let payload_end = payload_start + count;
        if payload_end > self.words.len() {
            return Some(Err(PacketParseError::TruncatedPayload {
                expected_words: count,
                remaining_words: self.words.len() - payload_start,
                at_word,
            }));
        }

        self.cursor = payload_end;
        let payload = &self.words[payload_start..payload_end];
        Some(Ok(match packet_kind {
            PacketKind::Type4(reg) => Packet::Type4 { reg, payload },
            PacketKind::Type7(opcode) => Packet::Type7 { opcode, payload },
        }))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::regs;

    #[test]
    fn walks_mixed_packets() {
        let mut w = CmdWriter::new();
        w.pkt4(regs::VFD_INDEX_OFFSET, &[5, 2]);
        w.pkt7(Pm4Opcode::EventWrite, &[17]);

        let packets: Vec<_> = w.packets().collect::<Result<_, _>>().unwrap();
        assert_eq!(
            packets,
            vec![
                Packet::Type4 {
                    reg: regs::VFD_INDEX_OFFSET,
                    payload: &[5, 2],
                },
                Packet::Type7 {
                    opcode: Pm4Opcode::EventWrite,
                    payload: &[17],
                },
            ]
        );
    }

    #[test]
    fn flipped_parity_is_rejected() {
        let mut words = vec![pkt4_header(regs::PC_RESTART_INDEX, 1), 0];
        words[0] ^= 1 << 27;
        let err = PacketStream::new(&words).next().unwrap().unwrap_err();
        assert_eq!(
            err,
            PacketParseError::BadParity {
                header: words[0],
                at_word: 0
            }
        );
    }

    #[test]
    fn truncated_payload_is_reported() {
        let words = [pkt4_header(regs::RB_CLEAR_COLOR_DW0, 4), 1, 2];
        let err = PacketStream::new(&words).next().unwrap().unwrap_err();
        assert_eq!(
            err,
            PacketParseError::TruncatedPayload {
                expected_words: 4,
                remaining_words: 2,
                at_word: 0
            }
        );
    }

    #[test]
    #[should_panic(expected = "type-4 packet")]
    fn empty_type4_packet_is_a_bug() {
        CmdWriter::new().pkt4(regs::RB_CLEAR_CNTL, &[]);
    }

    #[test]
    fn byte_view_is_little_endian() {
        let mut w = CmdWriter::new();
        w.pkt4(regs::RB_CLEAR_CNTL, &[0x1122_3344]);
        assert_eq!(&w.as_bytes()[4..8], &[0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn finish_returns_headers_and_payloads() {
        let mut w = CmdWriter::new();
        w.pkt4(regs::RB_CLEAR_CNTL, &[0]);
        w.pkt7(Pm4Opcode::EventWrite, &[30, 0, 0, 0]);
        assert_eq!(w.len(), 7);
        assert_eq!(
            w.finish(),
            vec![
                pkt4_header(regs::RB_CLEAR_CNTL, 1),
                0,
                pkt7_header(Pm4Opcode::EventWrite, 4),
                30,
                0,
                0,
                0,
            ]
        );
    }
}
