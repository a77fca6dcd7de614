/// Encoder behavior knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Bracket every draw and blit packet with an incrementing
    /// `CP_SCRATCH_REG7` write, so a hang dump can be matched to the packet
    /// that was executing.
    pub debug_markers: bool,
}

impl EncoderConfig {
    pub fn with_debug_markers(mut self, enabled: bool) -> Self {
        self.debug_markers = enabled;
        self
    }
}
