pub mod capture;
pub mod notify;
pub mod overlay;
pub mod pipeline;
pub mod session;
pub mod shared;
