pub mod refresh;
pub mod services;
pub mod session;
