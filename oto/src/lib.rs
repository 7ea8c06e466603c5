pub mod banner;
pub mod commands;
pub mod handlers;

pub use handlers::{
    EndpointArgs, TargetSource, load_targets_from_file, parse_target_line, resolve_targets,
};

pub use oto_core::{RunOptions, RunOutput, execute_run};
