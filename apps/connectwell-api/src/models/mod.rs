pub mod community;
pub mod post;
pub mod profile;
