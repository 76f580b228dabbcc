pub mod config;
pub mod error;
pub mod mapper;
pub mod model;
pub mod parse;
pub mod resolve;
pub mod validate;
pub mod wasm;
