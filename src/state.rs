use crate::config::RequirementTable;
use crate::day::UtcOffset;
use crate::milestones::MilestoneSchedule;
use crate::models::AppData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<AppData>>,
    pub requirements: Arc<RequirementTable>,
    pub schedule: Arc<MilestoneSchedule>,
    pub offset: UtcOffset,
}

impl AppState {
    pub fn new(
        data_path: PathBuf,
        data: AppData,
        requirements: RequirementTable,
        offset: UtcOffset,
    ) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
            requirements: Arc::new(requirements),
            schedule: Arc::new(MilestoneSchedule::default()),
            offset,
        }
    }
}
