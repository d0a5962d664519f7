//! Robot description command composition
//!
//! The robot description is produced by an external `xacro` run. This module
//! only builds the command line for it, as an ordered list of typed fragments
//! that concatenate into:
//!
//! ```text
//! <xacro> <share>/urdf/<file> use_sim:=false use_mock_hardware:=true robot_model:=<model> name:=hdr
//! ```

use crate::config::{LaunchContext, Substitution, SubstitutionError};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Renderer executable, looked up on `PATH`
pub const XACRO_EXECUTABLE: &str = "xacro";
/// Directory holding XACRO sources inside the description package
pub const URDF_DIR: &str = "urdf";
/// Robot name passed to the renderer
pub const ROBOT_NAME: &str = "hdr";

/// Display-only launches never drive hardware, simulated or real
const USE_SIM: &str = "false";
const USE_MOCK_HARDWARE: &str = "true";

/// One piece of the description command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fragment {
    /// Fixed text
    Literal { text: String },
    /// Launch argument value resolved before composition
    Resolved { value: String },
    /// Executable located when the expression was built
    Executable { name: String, path: PathBuf },
    /// Substitution performed when the expression is evaluated
    Deferred { substitution: Substitution },
}

impl Fragment {
    /// Fixed text fragment
    pub fn literal(text: impl Into<String>) -> Self {
        Fragment::Literal { text: text.into() }
    }

    /// Concrete text of this fragment
    pub fn perform(&self, ctx: &LaunchContext) -> Result<String, SubstitutionError> {
        match self {
            Fragment::Literal { text } => Ok(text.clone()),
            Fragment::Resolved { value } => Ok(value.clone()),
            Fragment::Executable { path, .. } => Ok(path.to_string_lossy().into_owned()),
            Fragment::Deferred { substitution } => ctx.perform(substitution),
        }
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Literal { text } => write!(f, "{}", text),
            Fragment::Resolved { value } => write!(f, "{}", value),
            Fragment::Executable { path, .. } => write!(f, "{}", path.display()),
            Fragment::Deferred { substitution } => write!(f, "{}", substitution),
        }
    }
}

/// Ordered fragments forming one command line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubstitutionExpression {
    fragments: Vec<Fragment>,
}

impl SubstitutionExpression {
    /// Wrap fragments in order
    pub fn new(fragments: Vec<Fragment>) -> Self {
        Self { fragments }
    }

    /// Fragments in command line order
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Perform every fragment, keeping their order
    pub fn evaluate(&self, ctx: &LaunchContext) -> Result<Vec<String>, SubstitutionError> {
        self.fragments.iter().map(|f| f.perform(ctx)).collect()
    }

    /// The concatenated command line
    pub fn command_line(&self, ctx: &LaunchContext) -> Result<String, SubstitutionError> {
        Ok(self.evaluate(ctx)?.concat())
    }
}

impl fmt::Display for SubstitutionExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fragment in &self.fragments {
            write!(f, "{}", fragment)?;
        }
        Ok(())
    }
}

/// Build the `xacro` command line that renders the robot description.
///
/// `robot_model` is performed immediately and interpolated as text; the
/// package and file references stay deferred inside the path fragment.
pub fn resolve_description(
    ctx: &LaunchContext,
    robot_model: &Substitution,
    description_package: &Substitution,
    description_file: &Substitution,
) -> Result<SubstitutionExpression, SubstitutionError> {
    let xacro = ctx.find_executable(XACRO_EXECUTABLE)?;
    let robot_model = ctx.perform(robot_model)?;
    log::debug!("Rendering description for robot model '{}'", robot_model);

    let description_path = Substitution::path_join([
        Substitution::find_package_share(description_package.clone()),
        Substitution::text(URDF_DIR),
        description_file.clone(),
    ]);

    Ok(SubstitutionExpression::new(vec![
        Fragment::Executable {
            name: XACRO_EXECUTABLE.to_string(),
            path: xacro,
        },
        Fragment::literal(" "),
        Fragment::Deferred {
            substitution: description_path,
        },
        Fragment::literal(" use_sim:="),
        Fragment::literal(USE_SIM),
        Fragment::literal(" use_mock_hardware:="),
        Fragment::literal(USE_MOCK_HARDWARE),
        Fragment::literal(" robot_model:="),
        Fragment::Resolved { value: robot_model },
        Fragment::literal(" name:="),
        Fragment::literal(ROBOT_NAME),
    ]))
}
