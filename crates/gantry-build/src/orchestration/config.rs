//! Orchestrator run options

use serde::{Deserialize, Serialize};

/// Options for one release run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Build only the variant at this catalog index
    pub index: Option<usize>,

    /// Validate and print the plan without touching the filesystem
    pub dry_run: bool,

    /// Check the toolchain is installed before anything runs
    pub check_prerequisites: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            index: None,
            dry_run: false,
            check_prerequisites: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: Option<usize>) -> Self {
        self.index = index;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_check_prerequisites(mut self, check: bool) -> Self {
        self.check_prerequisites = check;
        self
    }
}
