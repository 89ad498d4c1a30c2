pub mod assemble;
pub mod config_cmd;
