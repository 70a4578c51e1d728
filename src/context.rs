//! Shared collaborators handed to every pipeline task

use crate::codec::EncodeOptions;
use crate::transport::Transport;
use std::sync::Arc;

/// Everything a fetch or save task needs besides its own record
///
/// Cheap to clone; each spawned task gets its own copy.
#[derive(Clone)]
pub struct PipelineContext {
    /// Network retrieval
    pub transport: Arc<dyn Transport>,
    /// Encoder tuning applied on save
    pub encode_options: EncodeOptions,
}

impl PipelineContext {
    /// Bundle a transport with encoder options
    pub fn new(transport: Arc<dyn Transport>, encode_options: EncodeOptions) -> Self {
        Self {
            transport,
            encode_options,
        }
    }
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("transport", &self.transport.name())
            .field("encode_options", &self.encode_options)
            .finish()
    }
}
