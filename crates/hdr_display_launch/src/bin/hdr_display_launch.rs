//! HDR robot display launch CLI
//!
//! Usage:
//!   hdr_display_launch
//!   hdr_display_launch -a robot_model:=hh020
//!   hdr_display_launch --show-args
//!   hdr_display_launch --format json --render

use hdr_display_launch::{
    declare_arguments, DisplayLaunch, LaunchArgs, LaunchError, OutputFormat, ResolvedLaunchPlan,
};

#[tokio::main]
async fn main() {
    let args: LaunchArgs = argh::from_env();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        "trace" => "trace",
        _ => "info",
    };
    let env = env_logger::Env::default().default_filter_or(log_level);
    env_logger::init_from_env(env);

    if args.show_args {
        match declare_arguments() {
            Ok(registry) => print!("{}", registry),
            Err(e) => {
                log::error!("Failed to declare launch arguments: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let plan = match build_plan(&args).await {
        Ok(plan) => plan,
        Err(e) => {
            log::error!("Failed to build launch plan: {}", e);
            std::process::exit(1);
        }
    };

    let output = match args.format {
        OutputFormat::Text => Ok(plan.to_string()),
        OutputFormat::Json => serde_json::to_string_pretty(&plan).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(&plan).map_err(|e| e.to_string()),
    };

    match output {
        Ok(text) => println!("{}", text),
        Err(e) => {
            log::error!("Failed to serialize launch plan: {}", e);
            std::process::exit(1);
        }
    }
}

async fn build_plan(args: &LaunchArgs) -> Result<ResolvedLaunchPlan, LaunchError> {
    let overrides = args.overrides()?;
    let launch = DisplayLaunch::new(&overrides, args.setup_config())?;

    if args.render {
        launch.rendered_plan(args.stderr_policy()).await
    } else {
        launch.resolved_plan()
    }
}
