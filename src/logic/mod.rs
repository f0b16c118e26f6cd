pub mod applications;
pub mod catalog;
pub mod instances;
pub mod join;
pub mod scoring;

pub use applications::ApplicationsService;
pub use catalog::CatalogService;
pub use instances::InstancesService;
pub use scoring::{GroupMode, ScoringEngineService, ServiceGroup};

/// Records the completed steps of a multi-call workflow.
///
/// None of the workflows here compensate on partial failure; the trace
/// makes the progress point explicit so a failure can be diagnosed (or
/// compensation added later) without changing the calling contract.
#[derive(Debug)]
pub struct StepTrace {
    workflow: &'static str,
    completed: Vec<String>,
}

impl StepTrace {
    pub fn new(workflow: &'static str) -> Self {
        log::info!("{workflow}: starting");
        Self {
            workflow,
            completed: Vec::new(),
        }
    }

    pub fn complete(&mut self, step: impl Into<String>) {
        let step = step.into();
        log::info!("{}: completed {step}", self.workflow);
        self.completed.push(step);
    }

    pub fn completed(&self) -> &[String] {
        &self.completed
    }
}

impl Drop for StepTrace {
    fn drop(&mut self) {
        log::debug!(
            "{}: finished after {} step(s)",
            self.workflow,
            self.completed.len()
        );
    }
}
