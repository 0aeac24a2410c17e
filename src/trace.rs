//! Stage-level instrumentation.
//!
//! `stage_span!` yields an already-entered span guard for one pipeline stage
//! and `stage_event!` records a structured event at `info` or `debug` level.
//! Every event also carries a `stage` field equal to its name so subscribers
//! can filter on it. Without the `tracing` feature both macros only borrow
//! their field values and emit nothing.

#[cfg(feature = "tracing")]
macro_rules! stage_span {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info_span!($name $(, $key = $value)*).entered()
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! stage_span {
    ($name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::trace::StageGuard
    };
}

#[cfg(feature = "tracing")]
macro_rules! stage_event {
    (info, $name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::info!(name: $name, stage = $name $(, $key = $value)*)
    };
    (debug, $name:expr $(, $key:ident = $value:expr)* $(,)?) => {
        tracing::debug!(name: $name, stage = $name $(, $key = $value)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! stage_event {
    ($level:ident, $name:expr $(, $key:ident = $value:expr)* $(,)?) => {{
        $(let _ = &$value;)*
    }};
}

pub(crate) use stage_event;
pub(crate) use stage_span;

/// Guard returned by `stage_span!` when tracing is compiled out.
#[cfg(not(feature = "tracing"))]
pub(crate) struct StageGuard;
