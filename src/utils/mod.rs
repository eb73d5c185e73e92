pub mod duration;
pub mod spinner;
