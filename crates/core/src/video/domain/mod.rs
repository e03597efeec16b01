pub mod cancel_signal;
pub mod display_sink;
pub mod frame_source;
pub mod source_kind;
