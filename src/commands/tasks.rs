use serde::Serialize;

use rollout::tasks::{self, TaskInfo};

use super::CmdResult;

#[derive(Serialize)]
pub struct TasksOutput {
    pub command: String,
    pub tasks: Vec<TaskInfo>,
}

pub fn run() -> CmdResult<TasksOutput> {
    Ok((
        TasksOutput {
            command: "tasks".to_string(),
            tasks: tasks::list(),
        },
        0,
    ))
}
