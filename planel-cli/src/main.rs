//! planel - command-line driver for the planar elasticity solver.
//!
//! Reads a mesh, names its contact domains, applies the boundary conditions
//! of a run file, solves and reports displacement extremes, global reaction
//! forces and the weight of the part.
//!
//! ```text
//! planel [--config run.json] [--mesh data/mesh.txt] [--material steel] ...
//! ```
//!
//! Logging goes to stderr through `tracing`; set `RUST_LOG=debug` for the
//! per-pass details of the solver.

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use planel_core::cfmt::exp_width;
use planel_core::{io, post, ElasticityProblem, Geometry};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::{MaterialConfig, RunConfig};

/// Solve a 2D linear elasticity problem on a triangle or quad mesh.
#[derive(Debug, Parser)]
#[command(name = "planel", version, about)]
struct Args {
    /// JSON run file; built-in defaults are used for anything it omits.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Mesh file to solve on.
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Material preset (steel, aluminium, titanium).
    #[arg(long)]
    material: Option<String>,

    /// plane-stress, plane-strain or axisymmetric.
    #[arg(long)]
    case: Option<String>,

    /// Gravitational acceleration [m/s2].
    #[arg(long, allow_hyphen_values = true)]
    gravity: Option<f64>,

    /// Nodal displacement output file.
    #[arg(long)]
    solution: Option<PathBuf>,

    /// Problem summary output file.
    #[arg(long)]
    problem: Option<PathBuf>,

    /// Write the mesh moved by the scaled displacement to this file.
    #[arg(long)]
    deformed_mesh: Option<PathBuf>,

    /// Scale applied to displacements in the deformed mesh.
    #[arg(long)]
    deformation_factor: Option<f64>,
}

impl Args {
    fn apply(self, config: &mut RunConfig) {
        if let Some(mesh) = self.mesh {
            config.mesh = mesh;
        }
        if let Some(material) = self.material {
            config.material = MaterialConfig::Preset(material);
        }
        if let Some(case) = self.case {
            config.case = case;
        }
        if let Some(gravity) = self.gravity {
            config.gravity = gravity;
        }
        if let Some(solution) = self.solution {
            config.output.solution = solution;
        }
        if self.problem.is_some() {
            config.output.problem = self.problem;
        }
        if self.deformed_mesh.is_some() {
            config.output.deformed_mesh = self.deformed_mesh;
        }
        if let Some(factor) = self.deformation_factor {
            config.deformation_factor = factor;
        }
    }
}

/// Quantities reported after a run.
#[derive(Debug, Clone, PartialEq)]
struct RunReport {
    deformation_factor: f64,
    min_displacement: f64,
    max_displacement: f64,
    horizontal_force: f64,
    vertical_force: f64,
    weight: f64,
    max_von_mises: f64,
}

impl RunReport {
    fn print(&self) {
        let lines = [
            ("Deformation Factor", self.deformation_factor, ""),
            ("Minimum displacement", self.min_displacement, "[m] "),
            ("Maximum displacement", self.max_displacement, "[m] "),
            ("Global horizontal force", self.horizontal_force, "[N] "),
            ("Global vertical force", self.vertical_force, "[N] "),
            ("Weight", self.weight, "[N] "),
            ("Maximum von Mises stress", self.max_von_mises, "[Pa] "),
        ];
        for (label, value, unit) in lines {
            println!(" ==== {label:<30}: {} {unit}", exp_width(value, 14, 7));
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn build_problem(config: &RunConfig) -> Result<ElasticityProblem> {
    let mut geometry = io::read_mesh_file(&config.mesh)
        .with_context(|| format!("failed to read mesh {}", config.mesh.display()))?;
    for rename in &config.renames {
        geometry
            .set_domain_name(rename.index, &rename.name)
            .with_context(|| format!("failed to rename domain {}", rename.index))?;
    }

    let material = config.material.build().context("invalid material")?;
    let mut problem = ElasticityProblem::new(geometry, material, config.gravity, config.case()?)?;
    for condition in &config.conditions {
        problem
            .add_boundary_condition(&condition.domain, condition.kind()?, condition.value)
            .with_context(|| format!("failed to apply condition on {:?}", condition.domain))?;
    }
    Ok(problem)
}

fn run(config: &RunConfig) -> Result<RunReport> {
    let mut problem = build_problem(config)?;
    print!("{problem}");
    if let Some(path) = &config.output.problem {
        io::write_problem_file(&problem, path)
            .with_context(|| format!("failed to write problem summary {}", path.display()))?;
    }

    let n_nodes = problem.geometry().nodes().len();
    let solution = problem.solve().context("solve failed")?.to_vec();
    let forces = problem.compute_residual()?.to_vec();
    let area = problem.integrate(|_, _| 1.0)?;
    info!(area, "surface area integrated");

    io::write_solution_file(n_nodes, 2, &solution, &config.output.solution).with_context(|| {
        format!("failed to write solution {}", config.output.solution.display())
    })?;

    if let Some(path) = &config.output.deformed_mesh {
        let geometry = problem.geometry();
        let nodes = geometry.nodes().displaced(&solution, config.deformation_factor)?;
        let deformed = Geometry::new(
            nodes,
            geometry.edges().clone(),
            geometry.elements().clone(),
            geometry.domains().to_vec(),
        )?;
        io::write_mesh_file(&deformed, path)
            .with_context(|| format!("failed to write deformed mesh {}", path.display()))?;
    }

    let norms = post::displacement_norms(&solution);
    let (min_displacement, max_displacement) = post::min_max(&norms).unwrap_or((0.0, 0.0));
    let global = post::global_force(&forces);
    let stresses = post::recover_stresses(&problem)?;

    Ok(RunReport {
        deformation_factor: config.deformation_factor,
        min_displacement,
        max_displacement,
        horizontal_force: global.x,
        vertical_force: global.y,
        weight: area * config.depth * problem.material().density * problem.gravity(),
        max_von_mises: stresses.max_von_mises(),
    })
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    args.apply(&mut config);

    let report = run(&config)?;
    report.print();
    Ok(())
}
