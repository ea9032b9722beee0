#![forbid(unsafe_code)]

pub mod config;

pub use config::{
    ConfigError, PinConfigDocument, PinRecord, load_from_path, load_from_str, save_to_path,
    to_json_string,
};
