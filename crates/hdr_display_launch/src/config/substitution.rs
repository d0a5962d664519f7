//! Deferred substitutions and the launch context that performs them

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Environment variable listing ament install prefixes
pub const AMENT_PREFIX_PATH: &str = "AMENT_PREFIX_PATH";

/// Location of package markers inside an install prefix
const PACKAGE_INDEX_DIR: &str = "share/ament_index/resource_index/packages";

/// A value that is only known once a launch context is available
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Substitution {
    /// Literal text
    Text(String),
    /// Value of a resolved launch argument
    LaunchConfiguration(String),
    /// Absolute path of an executable found on `PATH`
    FindExecutable(String),
    /// Share directory of an installed package
    FindPackageShare(Box<Substitution>),
    /// Path components joined with the platform separator
    PathJoin(Vec<Substitution>),
}

impl Substitution {
    /// Literal text
    pub fn text(value: impl Into<String>) -> Self {
        Substitution::Text(value.into())
    }

    /// Reference to a launch argument by name
    pub fn configuration(name: impl Into<String>) -> Self {
        Substitution::LaunchConfiguration(name.into())
    }

    /// Executable looked up on `PATH`
    pub fn find_executable(name: impl Into<String>) -> Self {
        Substitution::FindExecutable(name.into())
    }

    /// Share directory of the package named by `package`
    pub fn find_package_share(package: Substitution) -> Self {
        Substitution::FindPackageShare(Box::new(package))
    }

    /// Join the performed parts into one path
    pub fn path_join<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Substitution>,
    {
        Substitution::PathJoin(parts.into_iter().collect())
    }
}

impl From<&str> for Substitution {
    fn from(value: &str) -> Self {
        Substitution::Text(value.to_string())
    }
}

/// Renders substitutions in `$(...)` notation
impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Substitution::Text(s) => write!(f, "{}", s),
            Substitution::LaunchConfiguration(name) => write!(f, "$(var {})", name),
            Substitution::FindExecutable(name) => write!(f, "$(find-exec {})", name),
            Substitution::FindPackageShare(package) => write!(f, "$(find-pkg-share {})", package),
            Substitution::PathJoin(parts) => {
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, "/")?;
                    }
                    write!(f, "{}", part)?;
                }
                Ok(())
            }
        }
    }
}

/// Join path components the way `os.path.join` does: an absolute component
/// discards everything before it, and an empty last component leaves a
/// trailing separator.
pub fn join_path<S: AsRef<str>>(parts: &[S]) -> String {
    let mut joined = String::new();
    for (i, part) in parts.iter().enumerate() {
        let part = part.as_ref();
        if part.starts_with('/') {
            joined = part.to_string();
        } else if i == 0 || joined.is_empty() || joined.ends_with('/') {
            joined.push_str(part);
        } else {
            joined.push('/');
            joined.push_str(part);
        }
    }
    joined
}

/// Runtime execution context used to perform substitutions
#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    /// Resolved launch arguments
    configurations: IndexMap<String, String>,
    /// Environment overrides, consulted before the process environment
    env: HashMap<String, String>,
    /// Explicit package share directories
    package_shares: HashMap<String, PathBuf>,
    /// Explicit executable locations
    executables: HashMap<String, PathBuf>,
}

impl LaunchContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resolved launch argument
    pub fn with_configuration(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.configurations.insert(name.into(), value.into());
        self
    }

    /// Add multiple resolved launch arguments
    pub fn with_configurations(mut self, configurations: IndexMap<String, String>) -> Self {
        self.configurations.extend(configurations);
        self
    }

    /// Add an environment variable
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Add multiple environment variables
    pub fn with_envs(mut self, envs: HashMap<String, String>) -> Self {
        self.env.extend(envs);
        self
    }

    /// Pin the share directory of a package
    pub fn with_package_share(mut self, package: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.package_shares.insert(package.into(), dir.into());
        self
    }

    /// Pin the location of an executable
    pub fn with_executable(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.executables.insert(name.into(), path.into());
        self
    }

    /// Resolved launch arguments in declaration order
    pub fn configurations(&self) -> &IndexMap<String, String> {
        &self.configurations
    }

    /// Value of a resolved launch argument
    pub fn launch_configuration(&self, name: &str) -> Result<&str, SubstitutionError> {
        self.configurations
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| SubstitutionError::UndefinedConfiguration(name.to_string()))
    }

    /// Read an environment variable, local overrides first
    pub fn env_var(&self, name: &str) -> Option<String> {
        self.env
            .get(name)
            .cloned()
            .or_else(|| std::env::var(name).ok())
    }

    /// Perform a substitution into a concrete string
    pub fn perform(&self, substitution: &Substitution) -> Result<String, SubstitutionError> {
        match substitution {
            Substitution::Text(s) => Ok(s.clone()),
            Substitution::LaunchConfiguration(name) => {
                self.launch_configuration(name).map(str::to_string)
            }
            Substitution::FindExecutable(name) => self
                .find_executable(name)
                .map(|p| p.to_string_lossy().into_owned()),
            Substitution::FindPackageShare(package) => {
                let package = self.perform(package)?;
                self.find_package_share(&package)
                    .map(|p| p.to_string_lossy().into_owned())
            }
            Substitution::PathJoin(parts) => {
                let parts = parts
                    .iter()
                    .map(|p| self.perform(p))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(join_path(&parts))
            }
        }
    }

    /// Locate an executable by name, searching `PATH` like `which`
    pub fn find_executable(&self, name: &str) -> Result<PathBuf, SubstitutionError> {
        if let Some(path) = self.executables.get(name) {
            return Ok(path.clone());
        }

        if name.contains('/') {
            let candidate = PathBuf::from(name);
            if is_executable(&candidate) {
                return Ok(candidate);
            }
            return Err(SubstitutionError::ExecutableNotFound(name.to_string()));
        }

        let search_path = self.env_var("PATH").unwrap_or_default();
        for dir in std::env::split_paths(&search_path) {
            if dir.as_os_str().is_empty() {
                continue;
            }
            let candidate = dir.join(name);
            if is_executable(&candidate) {
                log::debug!("Found executable '{}' at {}", name, candidate.display());
                return Ok(candidate);
            }
        }

        Err(SubstitutionError::ExecutableNotFound(name.to_string()))
    }

    /// Locate the share directory of a package through the ament index
    pub fn find_package_share(&self, package: &str) -> Result<PathBuf, SubstitutionError> {
        if let Some(dir) = self.package_shares.get(package) {
            return Ok(dir.clone());
        }

        let prefixes = self.env_var(AMENT_PREFIX_PATH).unwrap_or_default();
        for prefix in std::env::split_paths(&prefixes) {
            if prefix.as_os_str().is_empty() {
                continue;
            }
            if prefix.join(PACKAGE_INDEX_DIR).join(package).is_file() {
                let share = prefix.join("share").join(package);
                log::debug!("Found package '{}' at {}", package, share.display());
                return Ok(share);
            }
        }

        Err(SubstitutionError::PackageNotFound(package.to_string()))
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Errors that can occur while performing substitutions
#[derive(Debug, thiserror::Error)]
pub enum SubstitutionError {
    #[error("Undefined launch configuration: {0}")]
    UndefinedConfiguration(String),

    #[error("Executable '{0}' not found on PATH")]
    ExecutableNotFound(String),

    #[error("Package '{0}' not found in any ament prefix")]
    PackageNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_configuration_substitution() {
        let ctx = LaunchContext::new().with_configuration("robot_model", "hh020");
        let result = ctx.perform(&Substitution::configuration("robot_model")).unwrap();
        assert_eq!(result, "hh020");
    }

    #[test]
    fn test_undefined_configuration_error() {
        let ctx = LaunchContext::new();
        let result = ctx.perform(&Substitution::configuration("robot_model"));
        assert!(matches!(result, Err(SubstitutionError::UndefinedConfiguration(_))));
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path(&["/share/pkg", "urdf", "hdr.urdf.xacro"]), "/share/pkg/urdf/hdr.urdf.xacro");
        assert_eq!(join_path(&["/share/pkg", "urdf", ""]), "/share/pkg/urdf/");
        assert_eq!(join_path(&["/share/pkg/", "rviz"]), "/share/pkg/rviz");
        assert_eq!(join_path(&["/share/pkg", "/abs/file"]), "/abs/file");
        assert_eq!(join_path::<&str>(&[]), "");
    }

    #[test]
    fn test_package_share_and_path_join() {
        let ctx = LaunchContext::new()
            .with_configuration("description_package", "hdr_description")
            .with_package_share("hdr_description", "/opt/ros/share/hdr_description");
        let path = Substitution::path_join([
            Substitution::find_package_share(Substitution::configuration("description_package")),
            Substitution::text("rviz"),
            Substitution::text("display_robot.rviz"),
        ]);
        assert_eq!(
            ctx.perform(&path).unwrap(),
            "/opt/ros/share/hdr_description/rviz/display_robot.rviz"
        );
    }

    #[test]
    fn test_find_package_share_from_ament_index() {
        let prefix = tempfile::tempdir().unwrap();
        let index = prefix.path().join(PACKAGE_INDEX_DIR);
        fs::create_dir_all(&index).unwrap();
        fs::write(index.join("hdr_description"), "").unwrap();

        let ctx = LaunchContext::new().with_env(
            AMENT_PREFIX_PATH,
            format!("/nonexistent/prefix:{}", prefix.path().display()),
        );
        let share = ctx.find_package_share("hdr_description").unwrap();
        assert_eq!(share, prefix.path().join("share").join("hdr_description"));

        assert!(matches!(
            ctx.find_package_share("other_description"),
            Err(SubstitutionError::PackageNotFound(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_find_executable_on_path() {
        use std::os::unix::fs::PermissionsExt;

        let bin = tempfile::tempdir().unwrap();
        let xacro = bin.path().join("xacro");
        fs::write(&xacro, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&xacro, fs::Permissions::from_mode(0o755)).unwrap();
        let not_exec = bin.path().join("rviz2");
        fs::write(&not_exec, "").unwrap();
        fs::set_permissions(&not_exec, fs::Permissions::from_mode(0o644)).unwrap();

        let ctx = LaunchContext::new().with_env("PATH", bin.path().display().to_string());
        assert_eq!(ctx.find_executable("xacro").unwrap(), xacro);
        assert!(matches!(
            ctx.find_executable("rviz2"),
            Err(SubstitutionError::ExecutableNotFound(_))
        ));
    }

    #[test]
    fn test_pinned_executable_wins() {
        let ctx = LaunchContext::new()
            .with_env("PATH", "")
            .with_executable("xacro", "/opt/ros/humble/bin/xacro");
        let result = ctx.perform(&Substitution::find_executable("xacro")).unwrap();
        assert_eq!(result, "/opt/ros/humble/bin/xacro");
    }

    #[test]
    fn test_display_notation() {
        let path = Substitution::path_join([
            Substitution::find_package_share(Substitution::configuration("description_package")),
            Substitution::text("urdf"),
            Substitution::configuration("description_file"),
        ]);
        assert_eq!(
            path.to_string(),
            "$(find-pkg-share $(var description_package))/urdf/$(var description_file)"
        );
    }
}
