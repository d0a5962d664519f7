//! Command-line interface for hdr_display_launch

use crate::config::{parse_assignment, ArgumentOverrides, OverridesError};
use crate::runtime::{SetupConfig, StderrPolicy};
use argh::FromArgs;
use std::path::PathBuf;

/// Show an HDR robot model in RViz
#[derive(FromArgs, Debug)]
pub struct LaunchArgs {
    /// override launch arguments (format: key:=value)
    #[argh(option, short = 'a', from_str_fn(parse_key_value))]
    pub arg: Vec<(String, String)>,

    /// yaml file with launch argument overrides, applied before --arg
    #[argh(option)]
    pub args_file: Option<String>,

    /// share directory of a package (format: package:=dir)
    #[argh(option, from_str_fn(parse_key_value))]
    pub package_share: Vec<(String, String)>,

    /// location of an executable (format: name:=path)
    #[argh(option, from_str_fn(parse_key_value))]
    pub executable: Vec<(String, String)>,

    /// list the declared launch arguments and exit
    #[argh(switch)]
    pub show_args: bool,

    /// output format for the plan (text, json, yaml)
    #[argh(option, default = "OutputFormat::Text", from_str_fn(parse_format))]
    pub format: OutputFormat,

    /// run xacro and embed the rendered robot description in the plan
    #[argh(switch)]
    pub render: bool,

    /// only warn when xacro writes to stderr
    #[argh(switch)]
    pub allow_stderr: bool,

    /// log level (error, warn, info, debug, trace)
    #[argh(option, short = 'l', default = "String::from(\"info\")")]
    pub log_level: String,
}

/// Launch plan output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    parse_assignment(s).map_err(|e| e.to_string())
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s.to_lowercase().as_str() {
        "text" => Ok(OutputFormat::Text),
        "json" => Ok(OutputFormat::Json),
        "yaml" => Ok(OutputFormat::Yaml),
        _ => Err(format!(
            "Invalid format '{}'. Expected one of: text, json, yaml",
            s
        )),
    }
}

impl LaunchArgs {
    /// Overrides from `--args-file`, then `--arg`
    pub fn overrides(&self) -> Result<ArgumentOverrides, OverridesError> {
        let mut overrides = match &self.args_file {
            Some(path) => ArgumentOverrides::from_file(path)?,
            None => ArgumentOverrides::new(),
        };
        overrides.merge(self.arg.iter().cloned().collect());
        Ok(overrides)
    }

    /// Context configuration from `--package-share` and `--executable`
    pub fn setup_config(&self) -> SetupConfig {
        SetupConfig {
            package_shares: self
                .package_share
                .iter()
                .map(|(k, v)| (k.clone(), PathBuf::from(v)))
                .collect(),
            executables: self
                .executable
                .iter()
                .map(|(k, v)| (k.clone(), PathBuf::from(v)))
                .collect(),
            ..Default::default()
        }
    }

    /// How the renderer treats stderr output
    pub fn stderr_policy(&self) -> StderrPolicy {
        if self.allow_stderr {
            StderrPolicy::Warn
        } else {
            StderrPolicy::Fail
        }
    }
}
