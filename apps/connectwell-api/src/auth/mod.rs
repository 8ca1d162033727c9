pub mod identity;
pub mod middleware;
pub mod sessions;
