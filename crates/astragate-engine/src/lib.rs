#![forbid(unsafe_code)]

pub mod audit;
pub mod dispatch;
pub mod gate;
pub mod store;
pub mod voice;
