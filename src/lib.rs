pub mod arguments;
pub mod astro;
pub mod constants;
pub mod constituents;
pub mod math;
pub mod minor;
pub mod perth_errors;
pub mod predict;
pub mod spatial;
pub mod time;
