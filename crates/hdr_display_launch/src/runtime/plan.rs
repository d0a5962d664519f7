//! Process specifications and launch plans

use crate::config::{LaunchContext, Substitution, SubstitutionError};
use crate::runtime::description::SubstitutionExpression;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

pub const JOINT_STATE_PUBLISHER_GUI: &str = "joint_state_publisher_gui";
pub const ROBOT_STATE_PUBLISHER: &str = "robot_state_publisher";
pub const RVIZ: &str = "rviz2";

/// Parameter carrying the rendered robot description
pub const ROBOT_DESCRIPTION_PARAM: &str = "robot_description";

/// RViz configuration inside the description package
pub const RVIZ_DIR: &str = "rviz";
pub const RVIZ_CONFIG_FILE: &str = "display_robot.rviz";

/// Where a process' output goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Standard output to the screen
    Screen,
    /// Log file only
    Log,
    /// Both screen and log
    Both,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputMode::Screen => "screen",
            OutputMode::Log => "log",
            OutputMode::Both => "both",
        };
        write!(f, "{}", s)
    }
}

/// Node parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    /// A plain substitution
    Substitution(Substitution),
    /// Output of running a command line
    Command(SubstitutionExpression),
}

/// Specification of one process for the external launcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSpec {
    pub package: String,
    pub executable: String,
    pub name: Option<String>,
    pub output: Option<OutputMode>,
    pub parameters: IndexMap<String, ParameterValue>,
    pub arguments: Vec<Substitution>,
}

impl NodeSpec {
    /// Create a node with no name, output, parameters or arguments
    pub fn new(package: impl Into<String>, executable: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            executable: executable.into(),
            name: None,
            output: None,
            parameters: IndexMap::new(),
            arguments: Vec::new(),
        }
    }

    /// Set the node name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set where the node's output goes
    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = Some(output);
        self
    }

    /// Add a parameter
    pub fn with_parameter(mut self, name: impl Into<String>, value: ParameterValue) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }

    /// Append command line arguments
    pub fn with_arguments<I>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = Substitution>,
    {
        self.arguments.extend(arguments);
        self
    }

    /// Perform every substitution of this node
    pub fn resolve(&self, ctx: &LaunchContext) -> Result<ResolvedNode, SubstitutionError> {
        let mut parameters = IndexMap::with_capacity(self.parameters.len());
        for (name, value) in &self.parameters {
            let resolved = match value {
                ParameterValue::Substitution(s) => ctx.perform(s)?,
                ParameterValue::Command(expr) => expr.command_line(ctx)?,
            };
            parameters.insert(name.clone(), resolved);
        }

        let arguments = self
            .arguments
            .iter()
            .map(|a| ctx.perform(a))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedNode {
            package: self.package.clone(),
            executable: self.executable.clone(),
            name: self.name.clone(),
            output: self.output,
            parameters,
            arguments,
        })
    }
}

/// Ordered process specifications produced for one launch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    /// Nodes in declaration order
    pub nodes: Vec<NodeSpec>,
}

impl LaunchPlan {
    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Perform all substitutions against the context
    pub fn resolve(&self, ctx: &LaunchContext) -> Result<ResolvedLaunchPlan, SubstitutionError> {
        let nodes = self
            .nodes
            .iter()
            .map(|n| n.resolve(ctx))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ResolvedLaunchPlan {
            args: ctx.configurations().clone(),
            nodes,
        })
    }
}

/// Package the robot description into the three display processes:
/// joint state GUI, robot state publisher, and RViz.
pub fn assemble(
    robot_description: SubstitutionExpression,
    description_package: &Substitution,
) -> LaunchPlan {
    let rviz_config = Substitution::path_join([
        Substitution::find_package_share(description_package.clone()),
        Substitution::text(RVIZ_DIR),
        Substitution::text(RVIZ_CONFIG_FILE),
    ]);

    let joint_state_publisher = NodeSpec::new(JOINT_STATE_PUBLISHER_GUI, JOINT_STATE_PUBLISHER_GUI);

    let robot_state_publisher = NodeSpec::new(ROBOT_STATE_PUBLISHER, ROBOT_STATE_PUBLISHER)
        .with_output(OutputMode::Both)
        .with_parameter(
            ROBOT_DESCRIPTION_PARAM,
            ParameterValue::Command(robot_description),
        );

    let rviz = NodeSpec::new(RVIZ, RVIZ)
        .with_name(RVIZ)
        .with_output(OutputMode::Log)
        .with_arguments([Substitution::text("-d"), rviz_config]);

    LaunchPlan {
        nodes: vec![joint_state_publisher, robot_state_publisher, rviz],
    }
}

/// A process specification with every value performed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedNode {
    pub package: String,
    pub executable: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputMode>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

/// Launch plan ready to hand to a process launcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLaunchPlan {
    /// Resolved launch arguments
    pub args: IndexMap<String, String>,
    /// Nodes in launch order
    pub nodes: Vec<ResolvedNode>,
}

impl ResolvedLaunchPlan {
    /// Replace a parameter value on every node that declares it.
    /// Returns the number of nodes updated.
    pub fn replace_parameter(&mut self, name: &str, value: &str) -> usize {
        let mut updated = 0;
        for node in &mut self.nodes {
            if let Some(slot) = node.parameters.get_mut(name) {
                *slot = value.to_string();
                updated += 1;
            }
        }
        updated
    }
}

/// Display the launch plan in a human-readable format
impl fmt::Display for ResolvedLaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Launch Plan")?;
        writeln!(f, "===========")?;
        writeln!(f)?;

        if !self.args.is_empty() {
            writeln!(f, "Arguments:")?;
            for (key, value) in &self.args {
                writeln!(f, "  {}: {}", key, value)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Nodes (in launch order):")?;
        for (i, node) in self.nodes.iter().enumerate() {
            writeln!(f)?;
            writeln!(
                f,
                "  {}. {}/{} {}",
                i + 1,
                node.package,
                node.executable,
                node.name
                    .as_ref()
                    .map(|n| format!("[{}]", n))
                    .unwrap_or_default()
            )?;

            if let Some(output) = node.output {
                writeln!(f, "     Output: {}", output)?;
            }

            if !node.arguments.is_empty() {
                writeln!(f, "     Arguments: {}", node.arguments.join(" "))?;
            }

            if !node.parameters.is_empty() {
                writeln!(f, "     Parameters:")?;
                for (key, value) in &node.parameters {
                    writeln!(f, "       {}: {}", key, value)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::description::Fragment;

    fn description() -> SubstitutionExpression {
        SubstitutionExpression::new(vec![
            Fragment::literal("xacro"),
            Fragment::literal(" robot_model:="),
            Fragment::Resolved {
                value: "ha006b".to_string(),
            },
        ])
    }

    fn package() -> Substitution {
        Substitution::configuration("description_package")
    }

    fn context() -> LaunchContext {
        LaunchContext::new()
            .with_configuration("description_package", "hdr_description")
            .with_package_share("hdr_description", "/opt/hdr/share/hdr_description")
    }

    #[test]
    fn test_assemble_order() {
        let plan = assemble(description(), &package());
        let executables: Vec<&str> = plan.nodes.iter().map(|n| n.executable.as_str()).collect();
        assert_eq!(
            executables,
            vec![JOINT_STATE_PUBLISHER_GUI, ROBOT_STATE_PUBLISHER, RVIZ]
        );
    }

    #[test]
    fn test_joint_state_publisher_is_bare() {
        let plan = assemble(description(), &package());
        let node = &plan.nodes[0];
        assert_eq!(node.package, JOINT_STATE_PUBLISHER_GUI);
        assert!(node.name.is_none());
        assert!(node.output.is_none());
        assert!(node.parameters.is_empty());
        assert!(node.arguments.is_empty());
    }

    #[test]
    fn test_robot_state_publisher_gets_description() {
        let plan = assemble(description(), &package());
        let node = &plan.nodes[1];
        assert_eq!(node.output, Some(OutputMode::Both));
        assert_eq!(
            node.parameters.get(ROBOT_DESCRIPTION_PARAM),
            Some(&ParameterValue::Command(description()))
        );
        assert_eq!(node.parameters.len(), 1);
    }

    #[test]
    fn test_rviz_arguments() {
        let plan = assemble(description(), &package());
        let node = &plan.nodes[2];
        assert_eq!(node.name.as_deref(), Some(RVIZ));
        assert_eq!(node.output, Some(OutputMode::Log));

        let resolved = node.resolve(&context()).unwrap();
        assert_eq!(
            resolved.arguments,
            vec!["-d", "/opt/hdr/share/hdr_description/rviz/display_robot.rviz"]
        );
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let first = serde_json::to_string(&assemble(description(), &package())).unwrap();
        let second = serde_json::to_string(&assemble(description(), &package())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_resolve_plan() {
        let plan = assemble(description(), &package());
        let resolved = plan.resolve(&context()).unwrap();
        assert_eq!(resolved.nodes.len(), 3);
        assert_eq!(
            resolved.nodes[1].parameters[ROBOT_DESCRIPTION_PARAM],
            "xacro robot_model:=ha006b"
        );
        assert_eq!(resolved.args["description_package"], "hdr_description");
    }

    #[test]
    fn test_resolve_plan_unknown_package() {
        let plan = assemble(description(), &package());
        let ctx = LaunchContext::new()
            .with_env("AMENT_PREFIX_PATH", "")
            .with_configuration("description_package", "missing_description");
        assert!(matches!(
            plan.resolve(&ctx),
            Err(SubstitutionError::PackageNotFound(ref p)) if p == "missing_description"
        ));
    }

    #[test]
    fn test_replace_parameter() {
        let mut resolved = assemble(description(), &package()).resolve(&context()).unwrap();
        let updated = resolved.replace_parameter(ROBOT_DESCRIPTION_PARAM, "<robot name=\"hdr\"/>");
        assert_eq!(updated, 1);
        assert_eq!(
            resolved.nodes[1].parameters[ROBOT_DESCRIPTION_PARAM],
            "<robot name=\"hdr\"/>"
        );
        assert_eq!(resolved.replace_parameter("use_sim_time", "true"), 0);
    }

    #[test]
    fn test_display() {
        let resolved = assemble(description(), &package()).resolve(&context()).unwrap();
        let text = resolved.to_string();
        assert!(text.contains("1. joint_state_publisher_gui/joint_state_publisher_gui"));
        assert!(text.contains("3. rviz2/rviz2 [rviz2]"));
        assert!(text.contains("Output: both"));
        assert!(text.contains("robot_description: xacro robot_model:=ha006b"));
    }
}
