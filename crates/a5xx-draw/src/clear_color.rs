//! Conversion of API clear values into the words written to
//! `RB_CLEAR_COLOR_DWn`.

use bitflags::bitflags;
use half::f16;

use crate::format::{ChannelKind, PixelFormat};

bitflags! {
    /// Buffers selected by a clear call.
    #[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
    pub struct ClearBuffers: u32 {
        const DEPTH = 1 << 0;
        const STENCIL = 1 << 1;
        const COLOR0 = 1 << 2;
        const COLOR1 = 1 << 3;
        const COLOR2 = 1 << 4;
        const COLOR3 = 1 << 5;
        const COLOR4 = 1 << 6;
        const COLOR5 = 1 << 7;
        const COLOR6 = 1 << 8;
        const COLOR7 = 1 << 9;

        const DEPTHSTENCIL = Self::DEPTH.bits() | Self::STENCIL.bits();
        const COLOR = Self::COLOR0.bits()
            | Self::COLOR1.bits()
            | Self::COLOR2.bits()
            | Self::COLOR3.bits()
            | Self::COLOR4.bits()
            | Self::COLOR5.bits()
            | Self::COLOR6.bits()
            | Self::COLOR7.bits();
    }
}

impl ClearBuffers {
    /// Flag for color attachment `index`.
    ///
    /// Panics for indices past the last render target.
    pub fn color(index: usize) -> Self {
        assert!(index < crate::MAX_RENDER_TARGETS, "color attachment {index} out of range");
        Self::from_bits_truncate(Self::COLOR0.bits() << index)
    }

    /// Depth/stencil clear mask for `RB_CLEAR_CNTL`: bit 0 depth, bit 1
    /// stencil.
    pub fn depth_stencil_mask(self) -> u32 {
        let mut mask = 0;
        if self.contains(Self::DEPTH) {
            mask |= 0x1;
        }
        if self.contains(Self::STENCIL) {
            mask |= 0x2;
        }
        mask
    }
}

/// A clear color: four 32-bit lanes whose interpretation (float, unsigned or
/// signed integer) depends on the destination format.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ClearColor {
    lanes: [u32; 4],
}

impl ClearColor {
    pub fn from_f32(rgba: [f32; 4]) -> Self {
        Self {
            lanes: bytemuck::cast(rgba),
        }
    }

    pub fn from_u32(rgba: [u32; 4]) -> Self {
        Self { lanes: rgba }
    }

    pub fn from_i32(rgba: [i32; 4]) -> Self {
        Self {
            lanes: bytemuck::cast(rgba),
        }
    }

    pub fn as_f32(&self) -> [f32; 4] {
        bytemuck::cast(self.lanes)
    }

    pub fn as_u32(&self) -> [u32; 4] {
        self.lanes
    }

    pub fn as_i32(&self) -> [i32; 4] {
        bytemuck::cast(self.lanes)
    }
}

fn float_to_unorm(value: f32, bits: u32) -> u32 {
    let max = ((1u64 << bits) - 1) as f32;
    // NaN clamps to NaN and then saturates to 0 in the cast.
    (value.clamp(0.0, 1.0) * max + 0.5) as u32
}

fn channel_mask(bits: u32) -> u128 {
    (1u128 << bits) - 1
}

fn lanes_from_bits(acc: u128) -> [u32; 4] {
    [
        acc as u32,
        (acc >> 32) as u32,
        (acc >> 64) as u32,
        (acc >> 96) as u32,
    ]
}

fn pack_with(format: PixelFormat, mut encode: impl FnMut(usize, u32, ChannelKind) -> u32) -> [u32; 4] {
    let mut acc = 0u128;
    let mut shift = 0;
    for channel in format.channels() {
        let raw = encode(channel.component, channel.bits, channel.kind) as u128;
        acc |= (raw & channel_mask(channel.bits)) << shift;
        shift += channel.bits;
    }
    lanes_from_bits(acc)
}

/// Packs already-swizzled unsigned integer lanes; values saturate at the
/// channel width.
pub fn pack_uint(format: PixelFormat, lanes: [u32; 4]) -> [u32; 4] {
    pack_with(format, |component, bits, _| {
        let max = channel_mask(bits) as u32;
        lanes[component].min(max)
    })
}

/// Packs already-swizzled signed integer lanes; values saturate at the
/// channel range.
pub fn pack_sint(format: PixelFormat, lanes: [i32; 4]) -> [u32; 4] {
    pack_with(format, |component, bits, _| {
        let max = channel_mask(bits - 1) as i64;
        let min = -max - 1;
        (lanes[component] as i64).clamp(min, max) as i32 as u32
    })
}

/// Packs already-swizzled float lanes into unorm/float channels.
pub fn pack_float(format: PixelFormat, lanes: [f32; 4]) -> [u32; 4] {
    pack_with(format, |component, bits, kind| {
        let value = lanes[component];
        match (kind, bits) {
            (ChannelKind::Float, 16) => u32::from(f16::from_f32(value).to_bits()),
            (ChannelKind::Float, _) => value.to_bits(),
            (ChannelKind::Unorm, _) => float_to_unorm(value, bits),
            (ChannelKind::Uint | ChannelKind::Sint, _) => {
                unreachable!("integer channel in a float-path format {format:?}")
            }
        }
    })
}

/// Swizzles `color` into `format`'s component order and packs it into the
/// four `RB_CLEAR_COLOR_DWn` words. Lanes past the packed size are zero.
///
/// Panics if `format` is not a color format.
pub fn pack_color(format: PixelFormat, color: &ClearColor) -> [u32; 4] {
    let swap = format.color_swap();
    let swapped = ClearColor::from_u32(swap.apply(color.as_u32()));
    if format.is_pure_uint() {
        pack_uint(format, swapped.as_u32())
    } else if format.is_pure_sint() {
        pack_sint(format, swapped.as_i32())
    } else {
        pack_float(format, swapped.as_f32())
    }
}

fn depth_to_unorm(depth: f64, max: u32) -> u32 {
    if depth == 1.0 {
        return max;
    }
    (depth * f64::from(max)).round() as u32
}

fn pack_z(format: PixelFormat, depth: f64) -> u32 {
    match format {
        PixelFormat::Z16Unorm => depth_to_unorm(depth, 0xffff),
        PixelFormat::Z32Unorm => depth_to_unorm(depth, 0xffff_ffff),
        PixelFormat::Z32Float | PixelFormat::Z32FloatS8X24Uint => (depth as f32).to_bits(),
        PixelFormat::Z24UnormS8Uint | PixelFormat::Z24X8Unorm => depth_to_unorm(depth, 0xff_ffff),
        PixelFormat::S8UintZ24Unorm | PixelFormat::X8Z24Unorm => {
            depth_to_unorm(depth, 0xff_ffff) << 8
        }
        _ => panic!("{format:?} is not a depth/stencil format"),
    }
}

/// Packs a depth/stencil clear value into the single `RB_CLEAR_COLOR_DW0`
/// word.
///
/// Panics if `format` is not a depth/stencil format.
pub fn pack_depth_stencil(format: PixelFormat, depth: f64, stencil: u32) -> u32 {
    let z = pack_z(format, depth);
    let s = stencil & 0xff;
    match format {
        PixelFormat::Z24UnormS8Uint => z | (s << 24),
        PixelFormat::S8UintZ24Unorm => z | s,
        _ => z,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn rgba8_unorm_packs_into_first_lane() {
        let color = ClearColor::from_f32([1.0, 0.0, 0.5, 1.0]);
        assert_eq!(
            pack_color(PixelFormat::R8G8B8A8Unorm, &color),
            [0xff80_00ff, 0, 0, 0]
        );
    }

    #[test]
    fn unorm_clamps_out_of_range_and_nan() {
        let color = ClearColor::from_f32([2.0, -1.0, f32::NAN, 0.0]);
        assert_eq!(pack_color(PixelFormat::R8G8B8A8Unorm, &color), [0xff, 0, 0, 0]);
    }

    #[test]
    fn bgra8_swaps_then_packs() {
        // The swap exchanges R and B, and the BGRA layout exchanges them
        // back, so red lands in the low byte.
        let color = ClearColor::from_f32([1.0, 0.0, 0.0, 0.0]);
        assert_eq!(pack_color(PixelFormat::B8G8R8A8Unorm, &color), [0xff, 0, 0, 0]);
    }

    #[test]
    fn b5g6r5_uses_sixteen_bits() {
        let color = ClearColor::from_f32([0.0, 1.0, 0.0, 1.0]);
        assert_eq!(pack_color(PixelFormat::B5G6R5Unorm, &color), [0x07e0, 0, 0, 0]);
    }

    #[test]
    fn uint_path_saturates_per_channel() {
        let color = ClearColor::from_u32([1, 300, 3, 4]);
        assert_eq!(
            pack_color(PixelFormat::R8G8B8A8Uint, &color),
            [0x0403_ff01, 0, 0, 0]
        );
    }

    #[test]
    fn sint_path_saturates_and_masks() {
        let color = ClearColor::from_i32([-1, 200, -200, 5]);
        assert_eq!(
            pack_color(PixelFormat::R8G8B8A8Sint, &color),
            [0x0580_7fff, 0, 0, 0]
        );
    }

    #[test]
    fn wide_uint_fills_all_lanes() {
        let color = ClearColor::from_u32([1, 2, 3, 4]);
        assert_eq!(pack_color(PixelFormat::R32G32B32A32Uint, &color), [1, 2, 3, 4]);
        assert_eq!(
            pack_color(PixelFormat::R16G16B16A16Uint, &color),
            [0x0002_0001, 0x0004_0003, 0, 0]
        );
    }

    #[test]
    fn half_float_lanes() {
        let color = ClearColor::from_f32([1.0, -2.0, 0.5, 0.0]);
        assert_eq!(
            pack_color(PixelFormat::R16G16B16A16Float, &color),
            [0xc000_3c00, 0x0000_3800, 0, 0]
        );
    }

    #[test]
    fn float32_lanes_are_bit_copies() {
        let rgba = [0.25f32, 1.5, -3.0, 1.0];
        let color = ClearColor::from_f32(rgba);
        assert_eq!(
            pack_color(PixelFormat::R32G32B32A32Float, &color),
            rgba.map(f32::to_bits)
        );
    }

    #[test]
    fn abgr8_reverses_lanes_before_packing() {
        let color = ClearColor::from_f32([1.0, 0.0, 0.0, 0.0]);
        // XYZW moves red to lane 3, which the ABGR layout stores lowest.
        assert_eq!(pack_color(PixelFormat::A8B8G8R8Unorm, &color), [0x0000_00ff, 0, 0, 0]);
    }

    #[test]
    fn depth_stencil_layouts() {
        assert_eq!(pack_depth_stencil(PixelFormat::Z16Unorm, 1.0, 0), 0xffff);
        assert_eq!(pack_depth_stencil(PixelFormat::Z16Unorm, 0.5, 0), 0x8000);
        assert_eq!(
            pack_depth_stencil(PixelFormat::Z24UnormS8Uint, 1.0, 0x12),
            0x12ff_ffff
        );
        assert_eq!(
            pack_depth_stencil(PixelFormat::S8UintZ24Unorm, 1.0, 0x12),
            0xffff_ff12
        );
        assert_eq!(pack_depth_stencil(PixelFormat::X8Z24Unorm, 0.0, 0xff), 0);
        assert_eq!(pack_depth_stencil(PixelFormat::Z24X8Unorm, 1.0, 0xff), 0x00ff_ffff);
        assert_eq!(
            pack_depth_stencil(PixelFormat::Z32Float, 0.5, 7),
            0.5f32.to_bits()
        );
        assert_eq!(pack_depth_stencil(PixelFormat::Z32Unorm, 1.0, 0), 0xffff_ffff);
    }

    #[test]
    fn depth_stencil_mask_bits() {
        assert_eq!(ClearBuffers::DEPTH.depth_stencil_mask(), 1);
        assert_eq!(ClearBuffers::STENCIL.depth_stencil_mask(), 2);
        assert_eq!(ClearBuffers::DEPTHSTENCIL.depth_stencil_mask(), 3);
        assert_eq!(ClearBuffers::COLOR0.depth_stencil_mask(), 0);
    }

    #[test]
    fn color_flag_per_attachment() {
        assert_eq!(ClearBuffers::color(0), ClearBuffers::COLOR0);
        assert_eq!(ClearBuffers::color(7), ClearBuffers::COLOR7);
    }

    #[test]
    #[should_panic(expected = "not a color format")]
    fn packing_color_into_depth_format_is_a_bug() {
        let _ = pack_color(PixelFormat::Z16Unorm, &ClearColor::default());
    }
}
