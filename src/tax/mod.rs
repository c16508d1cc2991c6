//! Tax calculation

pub mod gst;
