//! Packet sequences for draws, clears and the events around them.
//!
//! Everything here appends to a [`CmdWriter`] and cannot fail; requests are
//! validated before they reach the encoder.

use a5xx_pm4::pm4::{
    draw_initiator, split_address, DiPrimType, DiSrcSel, IndexSize, Pm4Opcode, VgtEvent,
    VisCullMode,
};
use a5xx_pm4::regs::{self, BlitBuf};
use a5xx_pm4::{CmdWriter, GpuAddress};

use crate::clear_color::{pack_color, pack_depth_stencil, ClearBuffers, ClearColor};
use crate::config::EncoderConfig;
use crate::draw::{DrawInfo, EncodableDraw};
use crate::shader::{ShaderVariant, StateEmit, StateEmitter};
use crate::state::{
    DirtyFlags, FramebufferState, IndexBufferBinding, PipelineState, VariantKey, VertexState,
};
use crate::{MAX_RENDER_TARGETS, MAX_SO_BUFFERS};

/// One pass (primary or binning) of a frozen draw.
struct DrawPass<'a> {
    key: &'a VariantKey,
    dirty: DirtyFlags,
    vp: &'a ShaderVariant,
    fp: &'a ShaderVariant,
    vis: VisCullMode,
}

/// Stateful part of the encoder: configuration, the blit scratch buffer and
/// the debug marker counter.
#[derive(Debug, Clone)]
pub struct PacketEncoder {
    config: EncoderConfig,
    blit_mem: GpuAddress,
    marker_count: u32,
}

impl PacketEncoder {
    pub fn new(config: EncoderConfig, blit_mem: GpuAddress) -> Self {
        Self {
            config,
            blit_mem,
            marker_count: 0,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Value of the last debug marker written.
    pub fn marker_count(&self) -> u32 {
        self.marker_count
    }

    fn emit_marker(&mut self, ring: &mut CmdWriter) {
        if !self.config.debug_markers {
            return;
        }
        self.marker_count = self.marker_count.wrapping_add(1);
        ring.pkt4(
            regs::cp_scratch_reg(regs::MARKER_SCRATCH_INDEX),
            &[self.marker_count],
        );
    }

    pub(crate) fn emit_render_cntl(
        &self,
        ring: &mut CmdWriter,
        clearing: bool,
        samples_passed: bool,
    ) {
        let mut cntl = 0;
        if samples_passed {
            cntl |= regs::RB_RENDER_CNTL_SAMPLES_PASSED;
        }
        if !clearing {
            cntl |= regs::RB_RENDER_CNTL_DRAW;
        }
        ring.pkt4(regs::RB_RENDER_CNTL, &[cntl]);
    }

    /// Triggers a resolve through the context's blit scratch buffer.
    pub(crate) fn emit_blit(&mut self, ring: &mut CmdWriter) {
        self.emit_marker(ring);
        let [lo, hi] = split_address(self.blit_mem);
        ring.pkt7(Pm4Opcode::EventWrite, &[VgtEvent::Blit as u32, lo, hi, 0]);
        self.emit_marker(ring);
    }

    /// Fetch, decode and destination setup for every vertex program input
    /// that is actually read, followed by the fetch count.
    ///
    /// Panics if a fetched input has no vertex element or its element names
    /// an unbound buffer.
    pub(crate) fn emit_vertex_bufs(
        &self,
        ring: &mut CmdWriter,
        vp: &ShaderVariant,
        vertex: &VertexState,
    ) {
        let mut slot = 0u32;
        for (i, input) in vp.inputs.iter().enumerate() {
            if !input.is_fetched() {
                continue;
            }
            assert!(
                (slot as usize) < regs::MAX_VERTEX_FETCH,
                "more than {} fetched vertex inputs",
                regs::MAX_VERTEX_FETCH
            );
            let elem = vertex
                .elements
                .get(i)
                .unwrap_or_else(|| panic!("vertex input {i} has no vertex element"));
            let vb = vertex
                .buffers
                .get(elem.buffer_index)
                .unwrap_or_else(|| panic!("vertex buffer {} is not bound", elem.buffer_index));

            let offset = vb.buffer_offset.wrapping_add(elem.src_offset);
            let size = vb.bo_size.saturating_sub(offset);
            let [lo, hi] = split_address(vb.address + u64::from(offset));
            ring.pkt4(regs::vfd_fetch(slot), &[lo, hi, size, vb.stride]);

            let mut instr = regs::vfd_decode_instr_idx(slot)
                | regs::vfd_decode_instr_format(u32::from(elem.fetch_format))
                | regs::VFD_DECODE_INSTR_UNK30;
            if elem.instance_divisor != 0 {
                instr |= regs::VFD_DECODE_INSTR_INSTANCED;
            }
            if !elem.integer {
                instr |= regs::VFD_DECODE_INSTR_FLOAT;
            }
            ring.pkt4(regs::vfd_decode(slot), &[instr, elem.instance_divisor.max(1)]);

            let dest = regs::vfd_dest_cntl_writemask(input.compmask)
                | regs::vfd_dest_cntl_regid(input.regid);
            ring.pkt4(regs::vfd_dest_cntl(slot), &[dest]);
            slot += 1;
        }
        ring.pkt4(regs::VFD_CONTROL_0, &[regs::vfd_control_0_vtxcnt(slot)]);
    }

    fn emit_draw_packet(
        &mut self,
        ring: &mut CmdWriter,
        prim: DiPrimType,
        vis: VisCullMode,
        info: &DrawInfo,
        index_buffer: Option<&IndexBufferBinding>,
    ) {
        self.emit_marker(ring);
        match index_buffer.filter(|_| info.indexed) {
            Some(ib) => {
                let initiator = draw_initiator(
                    prim,
                    DiSrcSel::Dma,
                    IndexSize::from_bytes(ib.index_size),
                    vis,
                );
                let [lo, hi] = split_address(ib.address + u64::from(ib.offset_of(info.start)));
                ring.pkt7(
                    Pm4Opcode::DrawIndxOffset,
                    &[
                        initiator,
                        info.instance_count,
                        info.count,
                        0,
                        lo,
                        hi,
                        ib.max_indices(),
                    ],
                );
            }
            None => {
                let initiator = draw_initiator(prim, DiSrcSel::AutoIndex, IndexSize::Bits32, vis);
                ring.pkt7(
                    Pm4Opcode::DrawIndxOffset,
                    &[initiator, info.instance_count, info.count],
                );
            }
        }
        self.emit_marker(ring);
    }

    /// `cntl_ring` receives the render-control write when it is not `ring`.
    fn emit_pass<E: StateEmitter + ?Sized>(
        &mut self,
        ring: &mut CmdWriter,
        cntl_ring: Option<&mut CmdWriter>,
        draw: &EncodableDraw<'_>,
        pass: DrawPass<'_>,
        state: &PipelineState,
        emitter: &mut E,
    ) {
        let info = draw.info;

        emitter.emit_state(
            ring,
            &StateEmit {
                dirty: pass.dirty,
                key: pass.key,
                vp: pass.vp,
                fp: pass.fp,
                state,
                streamout_mask: draw.streamout_mask,
            },
        );

        if pass.dirty.intersects(DirtyFlags::VERTEX_INPUT) {
            self.emit_vertex_bufs(ring, pass.vp, &state.vertex);
        }

        let index_offset = if info.indexed {
            info.index_bias as u32
        } else {
            info.start
        };
        ring.pkt4(regs::VFD_INDEX_OFFSET, &[index_offset, info.start_instance]);

        let restart = if info.primitive_restart {
            info.restart_index
        } else {
            regs::PC_RESTART_INDEX_DISABLED
        };
        ring.pkt4(regs::PC_RESTART_INDEX, &[restart]);

        let samples_passed = state.samples_passed_active();
        match cntl_ring {
            Some(cntl_ring) => self.emit_render_cntl(cntl_ring, false, samples_passed),
            None => self.emit_render_cntl(ring, false, samples_passed),
        }
        self.emit_draw_packet(
            ring,
            draw.prim,
            pass.vis,
            info,
            state.index_buffer.as_ref(),
        );
    }

    /// Emits the primary pass of `draw` into `ring`.
    pub(crate) fn emit_draw<E: StateEmitter + ?Sized>(
        &mut self,
        ring: &mut CmdWriter,
        draw: &EncodableDraw<'_>,
        state: &PipelineState,
        emitter: &mut E,
    ) {
        let pass = DrawPass {
            key: &draw.key,
            dirty: draw.dirty,
            vp: &draw.vp,
            fp: &draw.fp,
            vis: draw.visibility(),
        };
        self.emit_pass(ring, None, draw, pass, state, emitter);
    }

    /// Emits the binning pass of `draw` into `binning`. Blend state never
    /// affects visibility, so it is left out of the dirty set. Render control
    /// lives in the draw stream only.
    #[cfg(feature = "binning_pass")]
    pub(crate) fn emit_binning_draw<E: StateEmitter + ?Sized>(
        &mut self,
        binning: &mut CmdWriter,
        draw_ring: &mut CmdWriter,
        draw: &EncodableDraw<'_>,
        state: &PipelineState,
        emitter: &mut E,
    ) {
        let pass = DrawPass {
            key: &draw.binning.key,
            dirty: draw.dirty - DirtyFlags::BLEND,
            vp: &draw.binning.vp,
            fp: &draw.binning.fp,
            vis: VisCullMode::IgnoreVisibility,
        };
        self.emit_pass(binning, Some(draw_ring), draw, pass, state, emitter);
    }

    /// One `FLUSH_SO_n` event per set bit of `mask`, lowest slot first.
    pub(crate) fn emit_streamout_flush(&self, ring: &mut CmdWriter, mask: u32) {
        for slot in 0..MAX_SO_BUFFERS {
            if mask & (1 << slot) != 0 {
                ring.pkt7(Pm4Opcode::EventWrite, &[VgtEvent::flush_so(slot) as u32]);
            }
        }
    }

    /// Fast-clear sequence for the requested attachments of `fb`. Always
    /// ends by disabling fast clear.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn emit_clear(
        &mut self,
        ring: &mut CmdWriter,
        fb: &FramebufferState,
        buffers: ClearBuffers,
        color: &ClearColor,
        depth: f64,
        stencil: u32,
        samples_passed: bool,
    ) {
        self.emit_render_cntl(ring, true, samples_passed);

        if buffers.intersects(ClearBuffers::COLOR) {
            for (i, cbuf) in fb.cbufs.iter().enumerate().take(MAX_RENDER_TARGETS) {
                let Some(format) = cbuf else {
                    continue;
                };
                if !buffers.contains(ClearBuffers::color(i)) {
                    continue;
                }
                let packed = pack_color(*format, color);
                self.emit_fast_clear(ring, BlitBuf::Mrt(i as u32), 0xf, &packed);
            }
        }

        let zs_mask = buffers.depth_stencil_mask();
        if let Some(format) = fb.zsbuf.filter(|_| zs_mask != 0) {
            let packed = pack_depth_stencil(format, depth, stencil);
            self.emit_fast_clear(ring, BlitBuf::DepthStencil, zs_mask, &[packed]);
        }

        ring.pkt4(regs::RB_CLEAR_CNTL, &[0]);
    }

    fn emit_fast_clear(&mut self, ring: &mut CmdWriter, buf: BlitBuf, mask: u32, value: &[u32]) {
        ring.pkt4(regs::RB_BLIT_CNTL, &[regs::rb_blit_cntl_buf(buf)]);
        ring.pkt4(
            regs::RB_CLEAR_CNTL,
            &[regs::RB_CLEAR_CNTL_FAST_CLEAR | regs::rb_clear_cntl_mask(mask)],
        );
        ring.pkt4(regs::RB_CLEAR_COLOR_DW0, value);
        self.emit_blit(ring);
    }
}
