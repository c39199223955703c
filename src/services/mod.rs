pub mod osint;
pub mod session;
pub mod user;
