pub mod mseed;
pub mod source;
pub mod stream_id;
pub mod time_axis;
pub mod trace_look;
pub mod window;
