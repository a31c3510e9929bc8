//! Python bindings for the scheduling engine (feature `python`).

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

use crate::config::{LinkValidation, ScheduleConfig};
use crate::engine::compute;
use crate::models::{Dependency, DependencyType, Schedule, ScheduleResult, Task};

/// A task to be scheduled (PyO3 wrapper).
#[pyclass(name = "Task")]
#[derive(Clone, Debug)]
pub struct PyTask {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub duration: u32,
    #[pyo3(get, set)]
    pub anchor_start: Option<i64>,
    #[pyo3(get, set)]
    pub deadline: Option<i64>,
}

#[pymethods]
impl PyTask {
    #[new]
    #[pyo3(signature = (id, duration, name=None, anchor_start=None, deadline=None))]
    fn new(
        id: String,
        duration: u32,
        name: Option<String>,
        anchor_start: Option<i64>,
        deadline: Option<i64>,
    ) -> Self {
        Self {
            id,
            name: name.unwrap_or_default(),
            duration,
            anchor_start,
            deadline,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Task(id={:?}, duration={}, anchor_start={:?}, deadline={:?})",
            self.id, self.duration, self.anchor_start, self.deadline
        )
    }
}

impl From<PyTask> for Task {
    fn from(t: PyTask) -> Self {
        Task {
            id: t.id,
            name: t.name,
            duration: t.duration,
            anchor_start: t.anchor_start,
            deadline: t.deadline,
        }
    }
}

/// A typed precedence link (PyO3 wrapper). `kind` is one of FS, SS, FF, SF.
#[pyclass(name = "Dependency")]
#[derive(Clone, Debug)]
pub struct PyDependency {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub predecessor_id: String,
    #[pyo3(get, set)]
    pub successor_id: String,
    #[pyo3(get, set)]
    pub kind: String,
    #[pyo3(get, set)]
    pub lag: i64,
}

#[pymethods]
impl PyDependency {
    #[new]
    #[pyo3(signature = (id, predecessor_id, successor_id, kind="FS".to_string(), lag=0))]
    fn new(
        id: String,
        predecessor_id: String,
        successor_id: String,
        kind: String,
        lag: i64,
    ) -> Self {
        Self {
            id,
            predecessor_id,
            successor_id,
            kind,
            lag,
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Dependency(id={:?}, {:?} -{}({:+})-> {:?})",
            self.id, self.predecessor_id, self.kind, self.lag, self.successor_id
        )
    }
}

fn parse_kind(kind: &str) -> PyResult<DependencyType> {
    match kind.to_ascii_uppercase().as_str() {
        "FS" => Ok(DependencyType::FinishToStart),
        "SS" => Ok(DependencyType::StartToStart),
        "FF" => Ok(DependencyType::FinishToFinish),
        "SF" => Ok(DependencyType::StartToFinish),
        other => Err(PyValueError::new_err(format!(
            "Unknown dependency type: {}",
            other
        ))),
    }
}

impl TryFrom<PyDependency> for Dependency {
    type Error = PyErr;

    fn try_from(d: PyDependency) -> PyResult<Self> {
        Ok(Dependency {
            kind: parse_kind(&d.kind)?,
            id: d.id,
            predecessor_id: d.predecessor_id,
            successor_id: d.successor_id,
            lag: d.lag,
        })
    }
}

/// Computed dates and float for one task.
#[pyclass(name = "ScheduleResult")]
#[derive(Clone, Debug)]
pub struct PyScheduleResult {
    #[pyo3(get)]
    pub earliest_start: i64,
    #[pyo3(get)]
    pub earliest_finish: i64,
    #[pyo3(get)]
    pub latest_start: i64,
    #[pyo3(get)]
    pub latest_finish: i64,
    #[pyo3(get)]
    pub total_float: i64,
    #[pyo3(get)]
    pub free_float: i64,
    #[pyo3(get)]
    pub is_critical: bool,
}

#[pymethods]
impl PyScheduleResult {
    fn __repr__(&self) -> String {
        format!(
            "ScheduleResult(es={}, ef={}, ls={}, lf={}, total_float={}, critical={})",
            self.earliest_start,
            self.earliest_finish,
            self.latest_start,
            self.latest_finish,
            self.total_float,
            self.is_critical
        )
    }
}

impl From<&ScheduleResult> for PyScheduleResult {
    fn from(r: &ScheduleResult) -> Self {
        Self {
            earliest_start: r.earliest_start,
            earliest_finish: r.earliest_finish,
            latest_start: r.latest_start,
            latest_finish: r.latest_finish,
            total_float: r.total_float,
            free_float: r.free_float,
            is_critical: r.is_critical,
        }
    }
}

/// The full result of one computation.
#[pyclass(name = "Schedule")]
#[derive(Clone, Debug)]
pub struct PySchedule {
    #[pyo3(get)]
    pub results: HashMap<String, PyScheduleResult>,
    #[pyo3(get)]
    pub project_duration: i64,
    #[pyo3(get)]
    pub critical_paths: Vec<Vec<String>>,
    #[pyo3(get)]
    pub topological_order: Vec<String>,
    #[pyo3(get)]
    pub warnings: Vec<String>,
}

#[pymethods]
impl PySchedule {
    fn __repr__(&self) -> String {
        format!(
            "Schedule(tasks={}, project_duration={}, critical_paths={}, warnings={})",
            self.results.len(),
            self.project_duration,
            self.critical_paths.len(),
            self.warnings.len()
        )
    }
}

impl From<Schedule> for PySchedule {
    fn from(s: Schedule) -> Self {
        Self {
            results: s
                .results
                .iter()
                .map(|(id, r)| (id.clone(), PyScheduleResult::from(r)))
                .collect(),
            project_duration: s.project_duration,
            critical_paths: s.critical_paths,
            topological_order: s.topological_order,
            warnings: s.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}

/// Compute earliest/latest dates, float and critical paths.
///
/// # Arguments
/// * `tasks` - Tasks to schedule
/// * `links` - Typed precedence links between them
/// * `strict` - Fail on malformed links instead of dropping them with a warning
/// * `float_epsilon` - Tasks with total float at most this are critical
/// * `max_critical_paths` - Upper bound on enumerated critical paths
/// * `verbosity` - 0=silent, 1=summary, 2=constraints, 3=debug
///
/// # Raises
/// * ValueError on cyclic dependencies, out-of-range offsets, unknown link
///   types or, in strict mode, malformed links
#[pyfunction]
#[pyo3(signature = (tasks, links, strict=false, float_epsilon=0, max_critical_paths=1024, verbosity=0))]
fn compute_schedule(
    tasks: Vec<PyTask>,
    links: Vec<PyDependency>,
    strict: bool,
    float_epsilon: i64,
    max_critical_paths: usize,
    verbosity: u8,
) -> PyResult<PySchedule> {
    let tasks: Vec<Task> = tasks.into_iter().map(Task::from).collect();
    let links = links
        .into_iter()
        .map(Dependency::try_from)
        .collect::<PyResult<Vec<Dependency>>>()?;
    let config = ScheduleConfig {
        link_validation: if strict {
            LinkValidation::Strict
        } else {
            LinkValidation::Lenient
        },
        float_epsilon,
        max_critical_paths,
        verbosity,
    };

    compute(&tasks, &links, &config)
        .map(PySchedule::from)
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// The cpm_engine Python module.
#[pymodule]
fn cpm_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyTask>()?;
    m.add_class::<PyDependency>()?;
    m.add_class::<PyScheduleResult>()?;
    m.add_class::<PySchedule>()?;

    m.add_function(wrap_pyfunction!(compute_schedule, m)?)?;

    Ok(())
}
