use std::sync::Arc;

use a5xx_draw::{
    ClearBuffers, ClearColor, ColorSwap, DrawContext, EncoderConfig, FramebufferState,
    PixelFormat, ScissorRect, ShaderResolver, ShaderVariant, StateEmit, StateEmitter, VariantKey,
};
use a5xx_pm4::pm4::Pm4Opcode;
use a5xx_pm4::{regs, CmdWriter, Packet};
use pretty_assertions::assert_eq;

struct NoShaders;

impl ShaderResolver for NoShaders {
    fn resolve_vertex(&mut self, _key: &VariantKey) -> Option<Arc<ShaderVariant>> {
        None
    }

    fn resolve_fragment(&mut self, _key: &VariantKey) -> Option<Arc<ShaderVariant>> {
        None
    }
}

struct NoState;

impl StateEmitter for NoState {
    fn emit_state(&mut self, _ring: &mut CmdWriter, _emit: &StateEmit<'_>) {
        unreachable!("clears never emit pipeline state");
    }
}

const BLIT_MEM: u64 = 0x0000_0003_0000_1000;

fn context(
    cbufs: Vec<Option<PixelFormat>>,
    zsbuf: Option<PixelFormat>,
) -> DrawContext<NoShaders, NoState> {
    let mut ctx = DrawContext::new(EncoderConfig::default(), NoShaders, NoState, BLIT_MEM);
    ctx.state_mut().framebuffer = FramebufferState { cbufs, zsbuf };
    ctx
}

fn blit() -> Packet<'static> {
    Packet::Type7 {
        opcode: Pm4Opcode::EventWrite,
        payload: &[30, 0x1000, 0x3, 0],
    }
}

fn packets(ring: &CmdWriter) -> Vec<Packet<'_>> {
    ring.packets().collect::<Result<_, _>>().unwrap()
}

#[test]
fn color_clear_swizzles_before_packing() {
    let color = ClearColor::from_u32([1, 2, 3, 4]);
    assert_eq!(ColorSwap::Zyxw.apply(color.as_u32()), [2, 3, 4, 1]);
    assert_eq!(PixelFormat::A8R8G8B8Unorm.color_swap(), ColorSwap::Zyxw);

    // Red only: ZYXW moves it to lane 3, which the A8R8G8B8 layout stores in
    // the low byte.
    let mut ctx = context(vec![Some(PixelFormat::A8R8G8B8Unorm)], None);
    ctx.clear(
        ClearBuffers::COLOR0,
        &ClearColor::from_f32([1.0, 0.0, 0.0, 0.0]),
        0.0,
        0,
    );
    let packets = packets(&ctx.batch().draw);
    let dw = packets
        .iter()
        .find(|p| p.reg() == Some(regs::RB_CLEAR_COLOR_DW0))
        .unwrap();
    assert_eq!(dw.payload(), &[0xff, 0, 0, 0]);
}

#[test]
fn single_color_buffer_sequence() {
    let mut ctx = context(vec![Some(PixelFormat::R8G8B8A8Uint)], None);
    ctx.clear(
        ClearBuffers::COLOR0,
        &ClearColor::from_u32([1, 2, 3, 4]),
        1.0,
        0,
    );

    assert_eq!(
        packets(&ctx.batch().draw),
        vec![
            Packet::Type4 {
                reg: regs::RB_RENDER_CNTL,
                payload: &[0],
            },
            Packet::Type4 {
                reg: regs::RB_BLIT_CNTL,
                payload: &[0],
            },
            Packet::Type4 {
                reg: regs::RB_CLEAR_CNTL,
                payload: &[0xf2],
            },
            Packet::Type4 {
                reg: regs::RB_CLEAR_COLOR_DW0,
                payload: &[0x0403_0201, 0, 0, 0],
            },
            blit(),
            Packet::Type4 {
                reg: regs::RB_CLEAR_CNTL,
                payload: &[0],
            },
        ]
    );
}

#[test]
fn color_buffers_in_ascending_order_skipping_unbound_and_unrequested() {
    let mut ctx = context(
        vec![
            Some(PixelFormat::R8G8B8A8Unorm),
            None,
            Some(PixelFormat::B8G8R8A8Unorm),
            Some(PixelFormat::R32Float),
        ],
        None,
    );
    ctx.clear(
        ClearBuffers::COLOR0 | ClearBuffers::COLOR1 | ClearBuffers::COLOR3,
        &ClearColor::from_f32([0.0, 0.0, 1.0, 1.0]),
        1.0,
        0,
    );

    let targets: Vec<u32> = packets(&ctx.batch().draw)
        .iter()
        .filter(|p| p.reg() == Some(regs::RB_BLIT_CNTL))
        .map(|p| p.payload()[0])
        .collect();
    assert_eq!(targets, vec![0, 3]);
}

#[test]
fn depth_only_mask() {
    let mut ctx = context(Vec::new(), Some(PixelFormat::Z24UnormS8Uint));
    ctx.clear(ClearBuffers::DEPTH, &ClearColor::default(), 1.0, 0x55);

    assert_eq!(
        packets(&ctx.batch().draw),
        vec![
            Packet::Type4 {
                reg: regs::RB_RENDER_CNTL,
                payload: &[0],
            },
            Packet::Type4 {
                reg: regs::RB_BLIT_CNTL,
                payload: &[8],
            },
            Packet::Type4 {
                reg: regs::RB_CLEAR_CNTL,
                payload: &[0x12],
            },
            Packet::Type4 {
                reg: regs::RB_CLEAR_COLOR_DW0,
                payload: &[0x55ff_ffff],
            },
            blit(),
            Packet::Type4 {
                reg: regs::RB_CLEAR_CNTL,
                payload: &[0],
            },
        ]
    );
}

#[test]
fn depth_and_stencil_mask() {
    let mut ctx = context(Vec::new(), Some(PixelFormat::Z24UnormS8Uint));
    ctx.clear(ClearBuffers::DEPTHSTENCIL, &ClearColor::default(), 0.0, 0x80);

    let packets = packets(&ctx.batch().draw);
    let cntl: Vec<u32> = packets
        .iter()
        .filter(|p| p.reg() == Some(regs::RB_CLEAR_CNTL))
        .map(|p| p.payload()[0])
        .collect();
    assert_eq!(cntl, vec![0x32, 0]);
}

#[test]
fn depth_request_without_zsbuf_is_ignored() {
    let mut ctx = context(vec![Some(PixelFormat::R8G8B8A8Unorm)], None);
    ctx.clear(ClearBuffers::DEPTHSTENCIL, &ClearColor::default(), 1.0, 0);
    assert_eq!(packets(&ctx.batch().draw).len(), 2);
}

#[test]
fn every_clear_ends_with_fast_clear_disabled() {
    let requests = [
        ClearBuffers::empty(),
        ClearBuffers::COLOR0,
        ClearBuffers::COLOR,
        ClearBuffers::STENCIL,
        ClearBuffers::COLOR | ClearBuffers::DEPTHSTENCIL,
    ];
    for buffers in requests {
        let mut ctx = context(
            vec![Some(PixelFormat::R16G16B16A16Float), Some(PixelFormat::R8G8B8A8Sint)],
            Some(PixelFormat::Z16Unorm),
        );
        ctx.clear(buffers, &ClearColor::from_f32([0.5; 4]), 0.5, 1);
        let packets = packets(&ctx.batch().draw);
        assert_eq!(
            packets.last(),
            Some(&Packet::Type4 {
                reg: regs::RB_CLEAR_CNTL,
                payload: &[0],
            }),
            "{buffers:?}"
        );
    }
}

#[test]
fn clear_widens_batch_scissor() {
    let mut ctx = context(vec![Some(PixelFormat::R8G8B8A8Unorm)], None);
    assert_eq!(ctx.batch().max_scissor, ScissorRect::EMPTY);

    ctx.state_mut().scissor = ScissorRect::new(10, 10, 20, 20);
    ctx.clear(ClearBuffers::COLOR0, &ClearColor::default(), 1.0, 0);
    ctx.state_mut().scissor = ScissorRect::new(0, 15, 15, 40);
    ctx.clear(ClearBuffers::COLOR0, &ClearColor::default(), 1.0, 0);

    assert_eq!(ctx.batch().max_scissor, ScissorRect::new(0, 10, 20, 40));
}

#[test]
fn clear_leaves_variant_cache_alone() {
    let mut ctx = context(vec![Some(PixelFormat::R8G8B8A8Unorm)], None);
    ctx.state_mut().rasterizer.flatshade = true;
    ctx.clear(ClearBuffers::COLOR0, &ClearColor::default(), 1.0, 0);
    assert_eq!(ctx.last_key(), &VariantKey::default());
}

#[test]
fn blit_markers_count_up_across_clears() {
    let mut ctx = DrawContext::new(
        EncoderConfig::default().with_debug_markers(true),
        NoShaders,
        NoState,
        BLIT_MEM,
    );
    ctx.state_mut().framebuffer = FramebufferState {
        cbufs: vec![Some(PixelFormat::R8G8B8A8Unorm)],
        zsbuf: Some(PixelFormat::Z16Unorm),
    };
    ctx.clear(
        ClearBuffers::COLOR0 | ClearBuffers::DEPTH,
        &ClearColor::default(),
        1.0,
        0,
    );

    let marker = regs::cp_scratch_reg(regs::MARKER_SCRATCH_INDEX);
    let values: Vec<u32> = packets(&ctx.batch().draw)
        .iter()
        .filter(|p| p.reg() == Some(marker))
        .map(|p| p.payload()[0])
        .collect();
    assert_eq!(values, vec![1, 2, 3, 4]);
}
