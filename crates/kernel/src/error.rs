use framehost_render::RenderError;
use std::fmt;

/// Which step of the render loop a graphics error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Bind,
    Viewport,
    Draw,
    Present,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind => f.write_str("bind surface"),
            Self::Viewport => f.write_str("configure viewport"),
            Self::Draw => f.write_str("draw frame"),
            Self::Present => f.write_str("present frame"),
        }
    }
}

/// Errors that terminate one of the two loops.
#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("render loop failed to {stage}: {source}")]
    Render {
        stage: RenderStage,
        #[source]
        source: RenderError,
    },
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),
    #[error("render loop is gone; cannot forward {0}")]
    RenderLoopGone(&'static str),
    #[error("event dispatcher is gone; cannot deliver {0}")]
    DispatcherGone(&'static str),
    #[error("failed to spawn {thread} thread: {source}")]
    ThreadSpawn {
        thread: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("{thread} thread panicked")]
    Panicked { thread: &'static str },
}

impl LoopError {
    pub(crate) fn render(stage: RenderStage) -> impl FnOnce(RenderError) -> Self {
        move |source| Self::Render { stage, source }
    }

    /// The loop stopped because a graphics call failed.
    pub fn is_render_failure(&self) -> bool {
        matches!(self, Self::Render { .. })
    }
}
