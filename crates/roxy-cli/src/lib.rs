use clap::ValueEnum;

pub mod commands;
mod context;

pub use context::{AppContext, PathOverrides};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Pretty => "pretty",
            OutputFormat::Json => "json",
        }
    }

    pub fn is_json(&self) -> bool {
        *self == OutputFormat::Json
    }
}
