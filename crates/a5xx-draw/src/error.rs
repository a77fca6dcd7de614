use thiserror::Error;

use crate::shader::ShaderStage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DrawError {
    /// No compiled variant exists for the current key. Nothing was emitted.
    #[error("no {stage} shader variant for the current state")]
    ShaderResolution { stage: ShaderStage },
}
