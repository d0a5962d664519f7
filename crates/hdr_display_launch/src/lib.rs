//! HDR Robot Display Launch
//!
//! Builds the launch plan for viewing an HDR robot model in RViz.
//!
//! # Overview
//!
//! A launch runs in one pass:
//! - Declare the launch arguments (`robot_model`, `description_package`,
//!   `description_file`)
//! - Resolve them against defaults and overrides, validating choices
//! - Compose the `xacro` command line that renders the robot description
//! - Assemble the process specifications for `joint_state_publisher_gui`,
//!   `robot_state_publisher` and `rviz2`
//!
//! Starting and supervising those processes is left to an external launcher;
//! the plan is plain data.
//!
//! # Example
//!
//! ```no_run
//! use hdr_display_launch::{ArgumentOverrides, DisplayLaunch, SetupConfig};
//!
//! let overrides = ArgumentOverrides::new().with("robot_model", "hh020");
//! let launch = DisplayLaunch::new(&overrides, SetupConfig::default())?;
//! println!("{}", launch.resolved_plan()?);
//! # Ok::<(), hdr_display_launch::LaunchError>(())
//! ```

pub mod cli;
pub mod config;
pub mod runtime;

pub use cli::{LaunchArgs, OutputFormat};
pub use config::{
    declare_arguments, ArgDefinition, ArgumentError, ArgumentOverrides, ArgumentRegistry,
    LaunchContext, OverridesError, Substitution, SubstitutionError,
};
pub use runtime::{
    assemble, resolve_description, DisplayLaunch, Fragment, LaunchError, LaunchPlan, NodeSpec,
    OutputMode, ParameterValue, RenderError, ResolvedLaunchPlan, ResolvedNode, SetupConfig,
    StderrPolicy, SubstitutionExpression,
};
