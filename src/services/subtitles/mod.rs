// Subtitle parsing module

pub mod parser;

pub use parser::parse_srt;
