//! Launch argument declarations and resolution

use crate::config::ArgumentOverrides;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Name of the robot model selector
pub const ROBOT_MODEL_ARG: &str = "robot_model";
/// Name of the package holding the URDF/XACRO sources
pub const DESCRIPTION_PACKAGE_ARG: &str = "description_package";
/// Name of the XACRO file inside `<package>/urdf`
pub const DESCRIPTION_FILE_ARG: &str = "description_file";

/// HDR robot models understood by the description package
pub const ROBOT_MODELS: [&str; 6] = [
    "ha006b",
    "hdf7_9",
    "hdf8_8",
    "hdr50_22",
    "hdr220_26",
    "hh020",
];

/// A declared launch argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgDefinition {
    /// Argument name
    pub name: String,
    /// Value used when no override is supplied
    pub default: Option<String>,
    /// Allowed values, if the argument is constrained
    pub choices: Option<Vec<String>>,
    /// Human-readable description
    pub description: String,
}

impl ArgDefinition {
    /// Create an argument with no default and no choices
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            choices: None,
            description: description.into(),
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Restrict the argument to an enumerated set of values
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    /// Check a candidate value against the choice set
    pub fn validate(&self, value: &str) -> Result<(), ArgumentError> {
        match &self.choices {
            Some(choices) if !choices.iter().any(|c| c == value) => {
                Err(ArgumentError::InvalidChoice {
                    name: self.name.clone(),
                    value: value.to_string(),
                    choices: choices.clone(),
                })
            }
            _ => Ok(()),
        }
    }
}

/// Ordered set of declared launch arguments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArgumentRegistry {
    args: IndexMap<String, ArgDefinition>,
}

impl ArgumentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an argument.
    ///
    /// Names must be unique, and a default must belong to the choice set
    /// when one is declared.
    pub fn declare(&mut self, definition: ArgDefinition) -> Result<(), ArgumentError> {
        if self.args.contains_key(&definition.name) {
            return Err(ArgumentError::DuplicateDeclaration(definition.name));
        }

        if let Some(default) = &definition.default {
            definition
                .validate(default)
                .map_err(|_| ArgumentError::InvalidDefault {
                    name: definition.name.clone(),
                    value: default.clone(),
                })?;
        }

        log::debug!("Declared launch argument '{}'", definition.name);
        self.args.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Look up a declaration by name
    pub fn get(&self, name: &str) -> Option<&ArgDefinition> {
        self.args.get(name)
    }

    /// Declarations in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &ArgDefinition> {
        self.args.values()
    }

    /// Number of declared arguments
    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Resolve every declared argument to a concrete value.
    ///
    /// Overrides win over defaults. Each value is checked against its
    /// choice set exactly once here; the returned map keeps declaration order.
    pub fn resolve(
        &self,
        overrides: &ArgumentOverrides,
    ) -> Result<IndexMap<String, String>, ArgumentError> {
        for (name, _) in overrides.iter() {
            if !self.args.contains_key(name) {
                return Err(ArgumentError::UnknownArgument(name.to_string()));
            }
        }

        let mut resolved = IndexMap::with_capacity(self.args.len());
        for (name, definition) in &self.args {
            let value = overrides
                .get(name)
                .or(definition.default.as_deref())
                .ok_or_else(|| ArgumentError::MissingValue(name.clone()))?;
            definition.validate(value)?;
            log::debug!("Launch argument {}:={}", name, value);
            resolved.insert(name.clone(), value.to_string());
        }

        Ok(resolved)
    }
}

/// Lists the arguments in the `--show-args` layout
impl fmt::Display for ArgumentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Arguments (pass arguments as '<name>:=<value>'):")?;
        for arg in self.args.values() {
            writeln!(f)?;
            writeln!(f, "    '{}':", arg.name)?;
            write!(f, "        {}", arg.description)?;
            if let Some(choices) = &arg.choices {
                let quoted: Vec<String> = choices.iter().map(|c| format!("'{}'", c)).collect();
                write!(f, " Valid choices are: [{}]", quoted.join(", "))?;
            }
            writeln!(f)?;
            match &arg.default {
                Some(default) => writeln!(f, "        (default: '{}')", default)?,
                None => writeln!(f, "        (required)")?,
            }
        }
        Ok(())
    }
}

/// Declare the arguments of the robot display launch
pub fn declare_arguments() -> Result<ArgumentRegistry, ArgumentError> {
    let mut registry = ArgumentRegistry::new();
    registry.declare(
        ArgDefinition::new(ROBOT_MODEL_ARG, "HDR robot model to use.")
            .with_default("ha006b")
            .with_choices(ROBOT_MODELS),
    )?;
    registry.declare(
        ArgDefinition::new(
            DESCRIPTION_PACKAGE_ARG,
            "Package containing robot URDF/XACRO files.",
        )
        .with_default("hdr_description"),
    )?;
    registry.declare(
        ArgDefinition::new(
            DESCRIPTION_FILE_ARG,
            "Defines the robot's URDF/XACRO configuration file.",
        )
        .with_default("hdr.urdf.xacro"),
    )?;
    Ok(registry)
}

/// Errors raised while declaring or resolving launch arguments
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    #[error("Launch argument '{0}' is declared more than once")]
    DuplicateDeclaration(String),

    #[error("Invalid value '{value}' for argument '{name}', expected one of: {}", .choices.join(", "))]
    InvalidChoice {
        name: String,
        value: String,
        choices: Vec<String>,
    },

    #[error("Default value '{value}' of argument '{name}' is not one of its choices")]
    InvalidDefault { name: String, value: String },

    #[error("Required launch argument '{0}' was not provided")]
    MissingValue(String),

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}
