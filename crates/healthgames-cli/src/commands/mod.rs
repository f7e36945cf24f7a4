pub mod config;
pub mod context;
pub mod games;
pub mod play;
pub mod session;
pub mod stats;
pub mod suggest;
pub mod user;
