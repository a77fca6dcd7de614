//! Surface formats the clear path can target, with their channel layout and
//! the component order the render backend stores them in.

/// Component order of a color surface, named after the a5xx `a3xx_color_swap`
/// values. The hardware defines exactly these four.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ColorSwap {
    /// Identity.
    Wzyx,
    /// Red and blue exchanged.
    Wxyz,
    /// Rotated by one lane, alpha last in memory.
    Zyxw,
    /// Fully reversed.
    Xyzw,
}

impl ColorSwap {
    /// Reorders logical RGBA lanes into the order the clear registers expect.
    pub fn apply<T: Copy>(self, c: [T; 4]) -> [T; 4] {
        match self {
            ColorSwap::Wzyx => c,
            ColorSwap::Wxyz => [c[2], c[1], c[0], c[3]],
            ColorSwap::Zyxw => [c[1], c[2], c[3], c[0]],
            ColorSwap::Xyzw => [c[3], c[2], c[1], c[0]],
        }
    }

    /// Inverse of [`ColorSwap::apply`].
    pub fn invert<T: Copy>(self, s: [T; 4]) -> [T; 4] {
        match self {
            ColorSwap::Wzyx => s,
            ColorSwap::Wxyz => [s[2], s[1], s[0], s[3]],
            ColorSwap::Zyxw => [s[3], s[0], s[1], s[2]],
            ColorSwap::Xyzw => [s[3], s[2], s[1], s[0]],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Unorm,
    Uint,
    Sint,
    Float,
}

/// One channel of a packed pixel. Channels are listed least-significant first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Channel {
    /// Logical component: 0 = R, 1 = G, 2 = B, 3 = A.
    pub component: usize,
    pub bits: u32,
    pub kind: ChannelKind,
}

const fn ch(component: usize, bits: u32, kind: ChannelKind) -> Channel {
    Channel {
        component,
        bits,
        kind,
    }
}

use ChannelKind::{Float, Sint, Uint, Unorm};

const RGBA8_UNORM: &[Channel] = &[ch(0, 8, Unorm), ch(1, 8, Unorm), ch(2, 8, Unorm), ch(3, 8, Unorm)];
const BGRA8_UNORM: &[Channel] = &[ch(2, 8, Unorm), ch(1, 8, Unorm), ch(0, 8, Unorm), ch(3, 8, Unorm)];
const ABGR8_UNORM: &[Channel] = &[ch(3, 8, Unorm), ch(2, 8, Unorm), ch(1, 8, Unorm), ch(0, 8, Unorm)];
const ARGB8_UNORM: &[Channel] = &[ch(3, 8, Unorm), ch(0, 8, Unorm), ch(1, 8, Unorm), ch(2, 8, Unorm)];
const B5G6R5_UNORM: &[Channel] = &[ch(2, 5, Unorm), ch(1, 6, Unorm), ch(0, 5, Unorm)];
const RGB10A2_UNORM: &[Channel] = &[ch(0, 10, Unorm), ch(1, 10, Unorm), ch(2, 10, Unorm), ch(3, 2, Unorm)];
const R8_UNORM: &[Channel] = &[ch(0, 8, Unorm)];
const RG8_UNORM: &[Channel] = &[ch(0, 8, Unorm), ch(1, 8, Unorm)];
const RGBA8_UINT: &[Channel] = &[ch(0, 8, Uint), ch(1, 8, Uint), ch(2, 8, Uint), ch(3, 8, Uint)];
const RGBA8_SINT: &[Channel] = &[ch(0, 8, Sint), ch(1, 8, Sint), ch(2, 8, Sint), ch(3, 8, Sint)];
const RGBA16_UINT: &[Channel] = &[ch(0, 16, Uint), ch(1, 16, Uint), ch(2, 16, Uint), ch(3, 16, Uint)];
const RGBA16_SINT: &[Channel] = &[ch(0, 16, Sint), ch(1, 16, Sint), ch(2, 16, Sint), ch(3, 16, Sint)];
const RGBA16_FLOAT: &[Channel] = &[ch(0, 16, Float), ch(1, 16, Float), ch(2, 16, Float), ch(3, 16, Float)];
const RGBA32_UINT: &[Channel] = &[ch(0, 32, Uint), ch(1, 32, Uint), ch(2, 32, Uint), ch(3, 32, Uint)];
const RGBA32_SINT: &[Channel] = &[ch(0, 32, Sint), ch(1, 32, Sint), ch(2, 32, Sint), ch(3, 32, Sint)];
const RGBA32_FLOAT: &[Channel] = &[ch(0, 32, Float), ch(1, 32, Float), ch(2, 32, Float), ch(3, 32, Float)];
const R32_FLOAT: &[Channel] = &[ch(0, 32, Float)];
const R32_UINT: &[Channel] = &[ch(0, 32, Uint)];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    R8G8B8A8Unorm,
    B8G8R8A8Unorm,
    A8B8G8R8Unorm,
    A8R8G8B8Unorm,
    B5G6R5Unorm,
    R10G10B10A2Unorm,
    R8Unorm,
    R8G8Unorm,
    R8G8B8A8Uint,
    R8G8B8A8Sint,
    R16G16B16A16Uint,
    R16G16B16A16Sint,
    R16G16B16A16Float,
    R32G32B32A32Uint,
    R32G32B32A32Sint,
    R32G32B32A32Float,
    R32Float,
    R32Uint,

    Z16Unorm,
    Z24UnormS8Uint,
    Z24X8Unorm,
    S8UintZ24Unorm,
    X8Z24Unorm,
    Z32Unorm,
    Z32Float,
    Z32FloatS8X24Uint,
}

impl PixelFormat {
    pub fn is_depth_stencil(self) -> bool {
        matches!(
            self,
            PixelFormat::Z16Unorm
                | PixelFormat::Z24UnormS8Uint
                | PixelFormat::Z24X8Unorm
                | PixelFormat::S8UintZ24Unorm
                | PixelFormat::X8Z24Unorm
                | PixelFormat::Z32Unorm
                | PixelFormat::Z32Float
                | PixelFormat::Z32FloatS8X24Uint
        )
    }

    /// Color channels, least-significant first. Empty for depth/stencil
    /// formats.
    pub fn channels(self) -> &'static [Channel] {
        match self {
            PixelFormat::R8G8B8A8Unorm => RGBA8_UNORM,
            PixelFormat::B8G8R8A8Unorm => BGRA8_UNORM,
            PixelFormat::A8B8G8R8Unorm => ABGR8_UNORM,
            PixelFormat::A8R8G8B8Unorm => ARGB8_UNORM,
            PixelFormat::B5G6R5Unorm => B5G6R5_UNORM,
            PixelFormat::R10G10B10A2Unorm => RGB10A2_UNORM,
            PixelFormat::R8Unorm => R8_UNORM,
            PixelFormat::R8G8Unorm => RG8_UNORM,
            PixelFormat::R8G8B8A8Uint => RGBA8_UINT,
            PixelFormat::R8G8B8A8Sint => RGBA8_SINT,
            PixelFormat::R16G16B16A16Uint => RGBA16_UINT,
            PixelFormat::R16G16B16A16Sint => RGBA16_SINT,
            PixelFormat::R16G16B16A16Float => RGBA16_FLOAT,
            PixelFormat::R32G32B32A32Uint => RGBA32_UINT,
            PixelFormat::R32G32B32A32Sint => RGBA32_SINT,
            PixelFormat::R32G32B32A32Float => RGBA32_FLOAT,
            PixelFormat::R32Float => R32_FLOAT,
            PixelFormat::R32Uint => R32_UINT,
            PixelFormat::Z16Unorm
            | PixelFormat::Z24UnormS8Uint
            | PixelFormat::Z24X8Unorm
            | PixelFormat::S8UintZ24Unorm
            | PixelFormat::X8Z24Unorm
            | PixelFormat::Z32Unorm
            | PixelFormat::Z32Float
            | PixelFormat::Z32FloatS8X24Uint => &[],
        }
    }

    fn all_channels(self, kind: ChannelKind) -> bool {
        let channels = self.channels();
        !channels.is_empty() && channels.iter().all(|c| c.kind == kind)
    }

    pub fn is_pure_uint(self) -> bool {
        self.all_channels(Uint)
    }

    pub fn is_pure_sint(self) -> bool {
        self.all_channels(Sint)
    }

    pub fn is_pure_integer(self) -> bool {
        self.is_pure_uint() || self.is_pure_sint()
    }

    pub fn is_float(self) -> bool {
        self.all_channels(Float)
    }

    /// Width of the red channel, or 0 for formats without one.
    pub fn red_bits(self) -> u32 {
        self.channels()
            .iter()
            .find(|c| c.component == 0)
            .map_or(0, |c| c.bits)
    }

    /// Whether shaders writing this surface may run at half precision:
    /// integer colors do not survive the f32->f16 constant conversion and
    /// 32-bit float surfaces would lose precision.
    pub fn allows_half_precision(self) -> bool {
        if self.is_pure_integer() {
            return false;
        }
        !(self.is_float() && self.red_bits() == 32)
    }

    /// Component order of a color format.
    ///
    /// Panics for depth/stencil formats; callers only ask for color targets.
    pub fn color_swap(self) -> ColorSwap {
        match self {
            PixelFormat::R8G8B8A8Unorm
            | PixelFormat::R10G10B10A2Unorm
            | PixelFormat::R8Unorm
            | PixelFormat::R8G8Unorm
            | PixelFormat::R8G8B8A8Uint
            | PixelFormat::R8G8B8A8Sint
            | PixelFormat::R16G16B16A16Uint
            | PixelFormat::R16G16B16A16Sint
            | PixelFormat::R16G16B16A16Float
            | PixelFormat::R32G32B32A32Uint
            | PixelFormat::R32G32B32A32Sint
            | PixelFormat::R32G32B32A32Float
            | PixelFormat::R32Float
            | PixelFormat::R32Uint => ColorSwap::Wzyx,
            PixelFormat::B8G8R8A8Unorm | PixelFormat::B5G6R5Unorm => ColorSwap::Wxyz,
            PixelFormat::A8R8G8B8Unorm => ColorSwap::Zyxw,
            PixelFormat::A8B8G8R8Unorm => ColorSwap::Xyzw,
            PixelFormat::Z16Unorm
            | PixelFormat::Z24UnormS8Uint
            | PixelFormat::Z24X8Unorm
            | PixelFormat::S8UintZ24Unorm
            | PixelFormat::X8Z24Unorm
            | PixelFormat::Z32Unorm
            | PixelFormat::Z32Float
            | PixelFormat::Z32FloatS8X24Uint => {
                panic!("{self:?} is not a color format")
            }
        }
    }
}
