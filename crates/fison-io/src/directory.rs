//! Directory-backed run store.
//!
//! One output directory per run, time series as JSONL (one record per
//! line), snapshots as plain JSON files keyed by refinement level:
//!
//! ```text
//! <output>/
//!   states.jsonl        — (t, SolutionState) per converged step
//!   iterations.jsonl    — (t, coupling iteration count)
//!   goal.jsonl          — (t, functional value, integrated value)
//!   final_goal.json     — final (value, integrated) of the last solve
//!   mesh_level_<k>.json — mesh snapshot entering level k
//!   dof_counts.jsonl    — per-level dof counts and step counts
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use fison_mesh::TriMesh;
use fison_physics::{DofCounts, SolutionState};
use fison_types::{FisonError, FisonResult};

use crate::store::SolutionStore;

#[derive(Debug, Serialize, Deserialize)]
struct StateRecord {
    t: f64,
    state: SolutionState,
}

#[derive(Debug, Serialize, Deserialize)]
struct IterationRecord {
    t: f64,
    iterations: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoalRecord {
    t: f64,
    value: f64,
    integrated: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct FinalGoalRecord {
    value: f64,
    integrated: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct DofRecord {
    level: u32,
    timesteps: u32,
    dofs: DofCounts,
}

/// JSONL store rooted at an output directory.
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens (creating if needed) a store at the given directory.
    pub fn create(root: impl Into<PathBuf>) -> FisonResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn append_line<T: Serialize>(&self, file: &str, record: &T) -> FisonResult<()> {
        let line = serde_json::to_string(record)
            .map_err(|e| FisonError::Serialization(e.to_string()))?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(file))?;
        writeln!(f, "{line}")?;
        Ok(())
    }

    fn write_json<T: Serialize>(&self, file: &str, record: &T) -> FisonResult<()> {
        let body = serde_json::to_string_pretty(record)
            .map_err(|e| FisonError::Serialization(e.to_string()))?;
        let mut f = File::create(self.root.join(file))?;
        f.write_all(body.as_bytes())?;
        Ok(())
    }
}

impl SolutionStore for DirectoryStore {
    fn append_state(&mut self, t: f64, state: &SolutionState) -> FisonResult<()> {
        self.append_line(
            "states.jsonl",
            &StateRecord {
                t,
                state: state.clone(),
            },
        )
    }

    fn append_iteration_count(&mut self, t: f64, iterations: u32) -> FisonResult<()> {
        self.append_line("iterations.jsonl", &IterationRecord { t, iterations })
    }

    fn append_goal(&mut self, t: f64, value: f64, integrated: f64) -> FisonResult<()> {
        self.append_line(
            "goal.jsonl",
            &GoalRecord {
                t,
                value,
                integrated,
            },
        )
    }

    fn write_final_goal(&mut self, value: f64, integrated: f64) -> FisonResult<()> {
        self.write_json("final_goal.json", &FinalGoalRecord { value, integrated })
    }

    fn save_mesh(&mut self, level: u32, mesh: &TriMesh) -> FisonResult<()> {
        self.write_json(&format!("mesh_level_{level}.json"), mesh)
    }

    fn save_dof_counts(
        &mut self,
        level: u32,
        timesteps: u32,
        dofs: &DofCounts,
    ) -> FisonResult<()> {
        self.append_line(
            "dof_counts.jsonl",
            &DofRecord {
                level,
                timesteps,
                dofs: *dofs,
            },
        )
    }
}

/// Read-back summary of a stored run, for inspection tooling.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    /// Number of persisted states.
    pub states: usize,
    /// Time of the last persisted state, if any.
    pub last_time: Option<f64>,
    /// Total coupling iterations across all recorded steps.
    pub total_iterations: u64,
    /// Number of goal-functional samples.
    pub goal_samples: usize,
    /// Final goal `(value, integrated)`, if the run finished a solve.
    pub final_goal: Option<(f64, f64)>,
    /// Refinement levels with a stored mesh snapshot.
    pub mesh_levels: Vec<u32>,
    /// Per-level dof totals, in file order.
    pub dof_totals: Vec<usize>,
}

impl StoreSummary {
    /// Summarizes the contents of a store directory.
    pub fn read(root: impl AsRef<Path>) -> FisonResult<Self> {
        let root = root.as_ref();

        let mut states = 0;
        let mut last_time = None;
        for record in read_jsonl::<StateRecord>(&root.join("states.jsonl"))? {
            states += 1;
            last_time = Some(record.t);
        }

        let mut total_iterations = 0u64;
        for record in read_jsonl::<IterationRecord>(&root.join("iterations.jsonl"))? {
            total_iterations += u64::from(record.iterations);
        }

        let goal_samples = read_jsonl::<GoalRecord>(&root.join("goal.jsonl"))?.len();

        let final_goal = match fs::read_to_string(root.join("final_goal.json")) {
            Ok(body) => {
                let record: FinalGoalRecord = serde_json::from_str(&body)
                    .map_err(|e| FisonError::Serialization(e.to_string()))?;
                Some((record.value, record.integrated))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };

        let mut mesh_levels = Vec::new();
        for entry in fs::read_dir(root)? {
            let name = entry?.file_name();
            let name = name.to_string_lossy();
            if let Some(rest) = name
                .strip_prefix("mesh_level_")
                .and_then(|s| s.strip_suffix(".json"))
            {
                if let Ok(level) = rest.parse::<u32>() {
                    mesh_levels.push(level);
                }
            }
        }
        mesh_levels.sort_unstable();

        let dof_totals = read_jsonl::<DofRecord>(&root.join("dof_counts.jsonl"))?
            .iter()
            .map(|r| r.dofs.total())
            .collect();

        Ok(Self {
            states,
            last_time,
            total_iterations,
            goal_samples,
            final_goal,
            mesh_levels,
            dof_totals,
        })
    }
}

/// Reads a JSONL file into records. A missing file is an empty series.
fn read_jsonl<T: for<'de> Deserialize<'de>>(path: &Path) -> FisonResult<Vec<T>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record =
            serde_json::from_str(&line).map_err(|e| FisonError::Serialization(e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}
