//! CLI command implementations.

use fison_adaptivity::{
    AdaptiveOptions, AdaptiveRefinementController, GoalValue, NullDualSolver,
};
use fison_coupling::Configuration;
use fison_io::{DirectoryStore, StoreSummary};
use fison_mesh::BisectionRefiner;
use fison_physics::{validate_problem, ProblemDefinition};
use fison_telemetry::{EventBus, TracingSink};

use crate::demo::{self, ChannelFlapProblem, DemoFactory};

/// Loads a configuration from JSON, or the defaults when no path is given.
fn load_config(path: Option<&str>) -> Result<Configuration, Box<dyn std::error::Error>> {
    let config = match path {
        Some(p) => {
            let body = std::fs::read_to_string(p)?;
            serde_json::from_str(&body)?
        }
        None => Configuration::default(),
    };
    config.validate()?;
    Ok(config)
}

/// Run the channel-flap scenario with adaptive refinement.
pub fn run(
    config_path: Option<&str>,
    max_passes: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;

    println!("Fison — channel-flap coupled solve");
    println!("──────────────────────────────────");
    println!("Tolerance:  {:.3e}", config.tolerance);
    println!("Stepping:   {}", if config.uniform_timestep { "uniform" } else { "adaptive" });
    println!("Output:     {}", config.output_directory);
    println!();

    let mut problem = ChannelFlapProblem::new(16, 4, 0.5)?;
    let mut estimator = demo::demo_estimator(config.tolerance)?;
    let refiner = BisectionRefiner::default();
    let mut store = DirectoryStore::create(&config.output_directory)?;
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::new(tracing::Level::INFO)));

    let controller =
        AdaptiveRefinementController::new(config, AdaptiveOptions { max_passes })?;
    let outcome = controller.solve(
        &mut problem,
        &DemoFactory,
        estimator.as_mut(),
        &mut NullDualSolver,
        &refiner,
        &mut store,
        &mut bus,
    )?;

    println!("Passes:          {}", outcome.passes);
    println!("Converged:       {}", outcome.converged);
    println!("Final error:     {:.3e}", outcome.final_error);
    println!("Final mesh:      {} cells", outcome.final_cells);
    match outcome.goal {
        GoalValue::Fresh(v) => println!("Goal functional: {v:.6e}"),
        GoalValue::Stale(Some(v)) => println!("Goal functional: {v:.6e} (stale)"),
        GoalValue::Stale(None) => println!("Goal functional: not computed"),
    }
    if let Some(integrated) = outcome.integrated_goal {
        println!("Integrated goal: {integrated:.6e}");
    }

    Ok(())
}

/// Validate a configuration and the scenario meshes.
pub fn validate(config_path: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    println!("Configuration: ok (tolerance {:.3e})", config.tolerance);

    let problem = ChannelFlapProblem::new(16, 4, 0.5)?;
    validate_problem(&problem)?;
    println!(
        "Meshes:        ok ({} fluid cells, {} structure cells, {} interface pairs)",
        problem.fluid_mesh().cell_count(),
        problem.structure_mesh().cell_count(),
        problem.interface_pairs().len(),
    );

    Ok(())
}

/// Summarize a stored run directory.
pub fn inspect(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let summary = StoreSummary::read(path)?;

    println!("Fison run summary");
    println!("─────────────────");
    println!("States:              {}", summary.states);
    match summary.last_time {
        Some(t) => println!("Last time:           {t:.6}"),
        None => println!("Last time:           —"),
    }
    println!("Coupling iterations: {}", summary.total_iterations);
    println!("Goal samples:        {}", summary.goal_samples);
    match summary.final_goal {
        Some((value, integrated)) => {
            println!("Final goal:          {value:.6e} (integrated {integrated:.6e})");
        }
        None => println!("Final goal:          not written"),
    }
    println!("Mesh levels:         {:?}", summary.mesh_levels);
    if !summary.dof_totals.is_empty() {
        println!("Dof totals:          {:?}", summary.dof_totals);
    }

    Ok(())
}
