pub mod bbox;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod ids;
pub mod track;
