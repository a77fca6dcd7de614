use a5xx_pm4::{CmdWriter, GpuAddress};
use tracing::{debug, trace};

use crate::clear_color::{ClearBuffers, ClearColor};
use crate::config::EncoderConfig;
use crate::draw::{DrawInfo, DrawStateBuilder};
use crate::emit::PacketEncoder;
use crate::error::DrawError;
use crate::shader::{ShaderResolver, StateEmitter};
use crate::state::{DirtyFlags, PipelineState, ScissorRect, VariantKey, VariantReconciler};

/// Command streams of the batch currently being recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    pub draw: CmdWriter,
    #[cfg(feature = "binning_pass")]
    pub binning: CmdWriter,
    /// Union of every scissor a clear in this batch touched.
    pub max_scissor: ScissorRect,
}

impl Default for Batch {
    fn default() -> Self {
        Self {
            draw: CmdWriter::new(),
            #[cfg(feature = "binning_pass")]
            binning: CmdWriter::new(),
            max_scissor: ScissorRect::EMPTY,
        }
    }
}

/// One rendering context: bound state, dirty tracking, the last variant key
/// and the batch being recorded.
pub struct DrawContext<R, E> {
    state: PipelineState,
    dirty: DirtyFlags,
    reconciler: VariantReconciler,
    resolver: R,
    emitter: E,
    encoder: PacketEncoder,
    batch: Batch,
}

impl<R: ShaderResolver, E: StateEmitter> DrawContext<R, E> {
    /// `blit_mem` is the scratch buffer resolve events write through.
    pub fn new(config: EncoderConfig, resolver: R, emitter: E, blit_mem: GpuAddress) -> Self {
        Self {
            state: PipelineState::default(),
            // Nothing has been emitted yet.
            dirty: DirtyFlags::all(),
            reconciler: VariantReconciler::new(),
            resolver,
            emitter,
            encoder: PacketEncoder::new(config, blit_mem),
            batch: Batch::default(),
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        self.encoder.config()
    }

    /// Value of the last debug marker written, zero if none were.
    pub fn marker_count(&self) -> u32 {
        self.encoder.marker_count()
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Mutable access to the bound state. Callers mark what they changed
    /// with [`DrawContext::mark_dirty`].
    pub fn state_mut(&mut self) -> &mut PipelineState {
        &mut self.state
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    pub fn mark_dirty(&mut self, flags: DirtyFlags) {
        self.dirty |= flags;
    }

    pub fn last_key(&self) -> &VariantKey {
        self.reconciler.last_key()
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn emitter(&self) -> &E {
        &self.emitter
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// Hands the recorded batch to the caller and starts a new one.
    pub fn take_batch(&mut self) -> Batch {
        std::mem::take(&mut self.batch)
    }

    /// Encodes one draw into the current batch.
    ///
    /// On error nothing is written to the batch and the dirty set keeps the
    /// stages the variant key change added.
    pub fn try_draw_vbo(&mut self, info: &DrawInfo) -> Result<(), DrawError> {
        let draw = DrawStateBuilder::new(&self.state, &mut self.resolver).build(
            info,
            &mut self.reconciler,
            &mut self.dirty,
        )?;

        let start = self.batch.draw.len();
        self.encoder
            .emit_draw(&mut self.batch.draw, &draw, &self.state, &mut self.emitter);

        #[cfg(feature = "binning_pass")]
        self.encoder.emit_binning_draw(
            &mut self.batch.binning,
            &mut self.batch.draw,
            &draw,
            &self.state,
            &mut self.emitter,
        );

        self.encoder
            .emit_streamout_flush(&mut self.batch.draw, draw.streamout_mask());

        trace!(
            topology = %info.topology,
            count = info.count,
            indexed = info.indexed,
            dirty = ?draw.dirty(),
            streamout_mask = draw.streamout_mask(),
            words = self.batch.draw.len() - start,
            "encoded draw"
        );
        self.dirty = DirtyFlags::empty();
        Ok(())
    }

    /// [`DrawContext::try_draw_vbo`] for callers that only need to know
    /// whether the draw was recorded.
    pub fn draw_vbo(&mut self, info: &DrawInfo) -> bool {
        match self.try_draw_vbo(info) {
            Ok(()) => true,
            Err(err) => {
                debug!(%err, topology = %info.topology, "draw skipped");
                false
            }
        }
    }

    /// Fast-clears the requested attachments of the bound framebuffer.
    pub fn clear(&mut self, buffers: ClearBuffers, color: &ClearColor, depth: f64, stencil: u32) {
        self.batch.max_scissor.widen(&self.state.scissor);

        let start = self.batch.draw.len();
        self.encoder.emit_clear(
            &mut self.batch.draw,
            &self.state.framebuffer,
            buffers,
            color,
            depth,
            stencil,
            self.state.samples_passed_active(),
        );
        trace!(
            ?buffers,
            words = self.batch.draw.len() - start,
            "encoded clear"
        );
    }
}

impl<R, E> std::fmt::Debug for DrawContext<R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawContext")
            .field("state", &self.state)
            .field("dirty", &self.dirty)
            .field("reconciler", &self.reconciler)
            .field("encoder", &self.encoder)
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}
