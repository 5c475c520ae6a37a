pub mod caption;
pub mod overlay_schedule;
pub mod timestamp;
pub mod timing_optimizer;
