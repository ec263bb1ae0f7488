use std::path::PathBuf;
use std::process::ExitCode;

use floorplan3d::build::{BuildOptions, CsgMode, SceneBuilder};
use floorplan3d::export::build_glb;
use floorplan3d::validation::validate_scene;

struct Args {
    plan: PathBuf,
    out: PathBuf,
    options: BuildOptions,
}

const USAGE: &str = "usage: floorplan3d --plan <floorplan.json> [--out <scene.glb>] \
                     [--exploded <meters>] [--csg auto|boolean|pieces]";

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "floorplan3d=info".into()),
        )
        .init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    let json = match std::fs::read_to_string(&args.plan) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to read floorplan {}: {e}", args.plan.display());
            return ExitCode::FAILURE;
        }
    };
    let plan = match serde_json::from_str::<shared::Floorplan>(&json) {
        Ok(plan) => {
            tracing::info!(
                "Loaded floorplan from {} ({} floors)",
                args.plan.display(),
                plan.floors.len()
            );
            plan
        }
        Err(e) => {
            tracing::error!("Failed to parse floorplan JSON from {}: {e}", args.plan.display());
            return ExitCode::FAILURE;
        }
    };

    let graph = match SceneBuilder::new(args.options).build(&plan) {
        Ok(graph) => graph,
        Err(e) => {
            tracing::error!("Render failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    for (node, issue) in validate_scene(&graph) {
        tracing::warn!("{node}: {issue}");
    }
    for warning in &graph.warnings {
        println!("warning: {warning}");
    }

    let glb = build_glb(&graph);
    if let Err(e) = std::fs::write(&args.out, &glb) {
        tracing::error!("Failed to write {}: {e}", args.out.display());
        return ExitCode::FAILURE;
    }
    tracing::info!("Wrote {} ({} bytes)", args.out.display(), glb.len());
    ExitCode::SUCCESS
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Args, String> {
    let args: Vec<String> = args.collect();
    let mut plan = None;
    let mut out = None;
    let mut options = BuildOptions::default();

    let mut i = 0;
    while i < args.len() {
        let value = args.get(i + 1);
        match (args[i].as_str(), value) {
            ("--plan", Some(v)) => plan = Some(PathBuf::from(v)),
            ("--out", Some(v)) => out = Some(PathBuf::from(v)),
            ("--exploded", Some(v)) => {
                options.exploded = v
                    .parse()
                    .map_err(|_| format!("--exploded expects meters, got '{v}'"))?
            }
            ("--csg", Some(v)) => {
                options.csg = match v.as_str() {
                    "auto" => CsgMode::Auto,
                    "boolean" => CsgMode::Boolean,
                    "pieces" => CsgMode::Pieces,
                    other => return Err(format!("unknown --csg mode '{other}'")),
                }
            }
            (flag, _) => return Err(format!("unexpected argument '{flag}'")),
        }
        i += 2;
    }

    let plan = plan.ok_or("--plan is required")?;
    let out = out.unwrap_or_else(|| plan.with_extension("glb"));
    Ok(Args { plan, out, options })
}
