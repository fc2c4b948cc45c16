pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod trace;
pub mod util;

pub use error::{Error, Result};
