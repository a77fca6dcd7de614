use std::sync::Arc;

use a5xx_draw::{
    DirtyFlags, DrawContext, DrawInfo, EncoderConfig, FramebufferState, PixelFormat,
    PrimitiveTopology, SamplerKeyFlags, ShaderResolver, ShaderVariant, StateEmit, StateEmitter,
    VariantKey,
};
use a5xx_pm4::CmdWriter;

/// Counts lookups per key, the way a variant cache would see them.
#[derive(Default)]
struct CountingShaders {
    lookups: Vec<VariantKey>,
}

impl ShaderResolver for CountingShaders {
    fn resolve_vertex(&mut self, key: &VariantKey) -> Option<Arc<ShaderVariant>> {
        self.lookups.push(*key);
        Some(Arc::new(ShaderVariant::default()))
    }

    fn resolve_fragment(&mut self, _key: &VariantKey) -> Option<Arc<ShaderVariant>> {
        Some(Arc::new(ShaderVariant::default()))
    }
}

#[derive(Default)]
struct StageLog {
    stages: Vec<DirtyFlags>,
}

impl StateEmitter for StageLog {
    fn emit_state(&mut self, _ring: &mut CmdWriter, emit: &StateEmit<'_>) {
        if !emit.key.binning_pass {
            self.stages.push(emit.dirty.stages());
        }
    }
}

fn draw(ctx: &mut DrawContext<CountingShaders, StageLog>) {
    ctx.try_draw_vbo(&DrawInfo::arrays(PrimitiveTopology::Triangles, 0, 3))
        .unwrap();
}

#[test]
fn state_changes_map_to_stage_invalidation() {
    let mut ctx = DrawContext::new(
        EncoderConfig::default(),
        CountingShaders::default(),
        StageLog::default(),
        0,
    );
    ctx.state_mut().framebuffer = FramebufferState {
        cbufs: vec![Some(PixelFormat::R8G8B8A8Unorm)],
        zsbuf: None,
    };

    // Initial draw: everything is dirty.
    draw(&mut ctx);

    // No change.
    draw(&mut ctx);

    ctx.state_mut().rasterizer.clamp_vertex_color = true;
    draw(&mut ctx);

    ctx.state_mut().samplers = SamplerKeyFlags::FSATURATE_R;
    draw(&mut ctx);

    // Dropping the last sampler flag still counts: the previous key had
    // per-sampler state.
    ctx.state_mut().samplers = SamplerKeyFlags::empty();
    draw(&mut ctx);

    ctx.state_mut().in_blit = true;
    draw(&mut ctx);

    ctx.state_mut().rasterizer.clip_plane_enable = 0x3;
    draw(&mut ctx);

    assert_eq!(
        ctx.emitter().stages,
        vec![
            DirtyFlags::PROG,
            DirtyFlags::empty(),
            DirtyFlags::SHADER_VP,
            DirtyFlags::SHADER_FP,
            DirtyFlags::SHADER_FP,
            DirtyFlags::SHADER_FP,
            DirtyFlags::PROG,
        ]
    );

    let last = ctx.last_key();
    assert!(last.vclamp_color && last.half_precision);
    assert_eq!(last.ucp_enables, 0x3);
    assert!(!last.has_per_samp());
}

#[test]
fn every_primary_lookup_uses_a_non_binning_key() {
    let mut ctx = DrawContext::new(
        EncoderConfig::default(),
        CountingShaders::default(),
        StageLog::default(),
        0,
    );
    draw(&mut ctx);
    ctx.state_mut().rasterizer.flatshade = true;
    draw(&mut ctx);

    let primary: Vec<_> = ctx
        .resolver()
        .lookups
        .iter()
        .filter(|key| !key.binning_pass)
        .collect();
    assert_eq!(primary.len(), 2);
    assert!(primary[1].rasterflat);
}

#[cfg(feature = "binning_pass")]
#[test]
fn binning_pass_lands_in_its_own_stream() {
    use a5xx_pm4::pm4::{draw_initiator, DiPrimType, DiSrcSel, IndexSize, Pm4Opcode, VisCullMode};
    use a5xx_pm4::{regs, Packet};

    let mut ctx = DrawContext::new(
        EncoderConfig::default(),
        CountingShaders::default(),
        StageLog::default(),
        0,
    );
    draw(&mut ctx);

    let binning: Vec<Packet<'_>> = ctx
        .batch()
        .binning
        .packets()
        .collect::<Result<_, _>>()
        .unwrap();
    let draw_packet = binning
        .iter()
        .find(|p| p.opcode() == Some(Pm4Opcode::DrawIndxOffset))
        .unwrap();
    assert_eq!(
        draw_packet.payload()[0],
        draw_initiator(
            DiPrimType::TriList,
            DiSrcSel::AutoIndex,
            IndexSize::Bits32,
            VisCullMode::IgnoreVisibility
        )
    );
    assert!(ctx.resolver().lookups.iter().any(|key| key.binning_pass));

    // Render control is written to the draw stream for both passes.
    assert!(binning.iter().all(|p| p.reg() != Some(regs::RB_RENDER_CNTL)));
    let cntl: Vec<u32> = ctx
        .batch()
        .draw
        .packets()
        .map(|p| p.unwrap())
        .filter(|p| p.reg() == Some(regs::RB_RENDER_CNTL))
        .map(|p| p.payload()[0])
        .collect();
    assert_eq!(cntl, vec![regs::RB_RENDER_CNTL_DRAW; 2]);
}
