pub mod display;
pub mod id;

