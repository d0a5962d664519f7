//! Robot display launch - declare, resolve and assemble in one pass

use crate::config::{
    declare_arguments, ArgumentError, ArgumentOverrides, ArgumentRegistry, LaunchContext,
    OverridesError, Substitution, SubstitutionError, DESCRIPTION_FILE_ARG,
    DESCRIPTION_PACKAGE_ARG, ROBOT_MODEL_ARG,
};
use crate::runtime::description::{resolve_description, SubstitutionExpression};
use crate::runtime::plan::{assemble, LaunchPlan, ResolvedLaunchPlan, ROBOT_DESCRIPTION_PARAM};
use crate::runtime::render::{render_command, RenderError, StderrPolicy};
use std::collections::HashMap;
use std::path::PathBuf;

/// Environment seen by the launch context
#[derive(Debug, Clone, Default)]
pub struct SetupConfig {
    /// Environment overrides (e.g. `PATH`, `AMENT_PREFIX_PATH`)
    pub env: HashMap<String, String>,
    /// Explicit package share directories
    pub package_shares: HashMap<String, PathBuf>,
    /// Explicit executable locations
    pub executables: HashMap<String, PathBuf>,
}

/// Launch of the HDR robot display
#[derive(Debug)]
pub struct DisplayLaunch {
    registry: ArgumentRegistry,
    context: LaunchContext,
}

impl DisplayLaunch {
    /// Declare the display arguments and resolve them with `overrides`
    pub fn new(overrides: &ArgumentOverrides, config: SetupConfig) -> Result<Self, LaunchError> {
        Self::with_registry(declare_arguments()?, overrides, config)
    }

    /// Resolve a custom registry. It must declare the display arguments.
    pub fn with_registry(
        registry: ArgumentRegistry,
        overrides: &ArgumentOverrides,
        config: SetupConfig,
    ) -> Result<Self, LaunchError> {
        let configurations = registry.resolve(overrides)?;

        let mut context = LaunchContext::new()
            .with_configurations(configurations)
            .with_envs(config.env);
        for (package, dir) in config.package_shares {
            context = context.with_package_share(package, dir);
        }
        for (name, path) in config.executables {
            context = context.with_executable(name, path);
        }

        Ok(Self { registry, context })
    }

    /// Declared arguments
    pub fn registry(&self) -> &ArgumentRegistry {
        &self.registry
    }

    /// Context holding the resolved arguments
    pub fn context(&self) -> &LaunchContext {
        &self.context
    }

    /// Build the robot description command and check that it can be performed
    pub fn description(&self) -> Result<SubstitutionExpression, LaunchError> {
        let description = resolve_description(
            &self.context,
            &Substitution::configuration(ROBOT_MODEL_ARG),
            &Substitution::configuration(DESCRIPTION_PACKAGE_ARG),
            &Substitution::configuration(DESCRIPTION_FILE_ARG),
        )?;

        let command_line = description.command_line(&self.context)?;
        log::debug!("Robot description command: {}", command_line);

        Ok(description)
    }

    /// Assemble the launch plan
    pub fn plan(&self) -> Result<LaunchPlan, LaunchError> {
        let description = self.description()?;
        let plan = assemble(
            description,
            &Substitution::configuration(DESCRIPTION_PACKAGE_ARG),
        );
        log::info!("Assembled launch plan with {} nodes", plan.len());
        Ok(plan)
    }

    /// Assemble the launch plan and perform every substitution in it
    pub fn resolved_plan(&self) -> Result<ResolvedLaunchPlan, LaunchError> {
        Ok(self.plan()?.resolve(&self.context)?)
    }

    /// Like [`resolved_plan`](Self::resolved_plan), but with the
    /// `robot_description` parameter replaced by the renderer's output
    pub async fn rendered_plan(
        &self,
        stderr_policy: StderrPolicy,
    ) -> Result<ResolvedLaunchPlan, LaunchError> {
        let description = self.description()?;
        let command_line = description.command_line(&self.context)?;
        let mut plan = assemble(
            description,
            &Substitution::configuration(DESCRIPTION_PACKAGE_ARG),
        )
        .resolve(&self.context)?;

        let rendered = render_command(&command_line, stderr_policy).await?;
        log::info!("Rendered robot description ({} bytes)", rendered.len());
        plan.replace_parameter(ROBOT_DESCRIPTION_PARAM, &rendered);

        Ok(plan)
    }
}

/// Errors that abort a launch; no partial plan is produced
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Argument error: {0}")]
    Argument(#[from] ArgumentError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] SubstitutionError),

    #[error("Overrides error: {0}")]
    Overrides(#[from] OverridesError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}
