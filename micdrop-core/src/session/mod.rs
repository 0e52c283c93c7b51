pub mod recorder;
pub mod stop_signal;
