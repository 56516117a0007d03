//! chat-tasks tasks command implementation

use serde::Serialize;

use crate::collect::{Collector, SpaceFailure};
use crate::enrich::ThreadMode;
use crate::error::{Error, Result};
use crate::export::ExportSummary;
use crate::output::{emit_success, HumanOutput};
use crate::pattern::{filter_records, AssigneePattern};
use crate::reconstruct::TaskRecord;
use crate::window::ReportWindow;

use super::{save_outputs, Context, SaveArgs, WindowArgs};

pub struct TasksOptions {
    pub assignee: Option<String>,
    pub spaces: Vec<String>,
    pub with_threads: bool,
    pub window: WindowArgs,
    pub save: SaveArgs,
}

#[derive(Serialize)]
struct TasksOutput {
    window: ReportWindow,
    total: usize,
    completed: usize,
    tasks: Vec<TaskRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<SpaceFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exports: Vec<ExportSummary>,
}

pub fn run(ctx: &Context, options: TasksOptions) -> Result<()> {
    if options.with_threads && options.save.save_csv.is_some() {
        return Err(Error::InvalidArgument(
            "complete threads cannot be saved as CSV; use --save-json".to_string(),
        ));
    }
    let window = options.window.resolve()?;
    let pattern = AssigneePattern::parse_opt(options.assignee.as_deref())?;
    let spaces = ctx.select_spaces(&options.spaces)?;

    let thread_mode = if options.with_threads {
        ThreadMode::Full
    } else {
        ctx.config.report.thread_mode
    };
    let collection = Collector::new(&ctx.source, &ctx.classifier)
        .thread_mode(thread_mode)
        .assignee_filter(pattern.as_ref())
        .collect_spaces(&spaces, &window);
    let tasks = filter_records(
        collection.records,
        &ctx.config.filter.people,
        &ctx.config.filter.spaces,
    );
    let completed = tasks.iter().filter(|task| task.is_completed()).count();

    let mut human = HumanOutput::new(format!("Tasks ({})", window.label()));
    human.push_summary("Total", tasks.len().to_string());
    human.push_summary("Completed", completed.to_string());
    for task in &tasks {
        let mut line = format!("{} [{}] {}", task.id, task.status, task.assignee);
        if let Some(first) = task.first_thread_message.as_deref().filter(|t| !t.is_empty()) {
            let first: String = first.split_whitespace().collect::<Vec<_>>().join(" ");
            let first: String = first.chars().take(60).collect();
            line.push_str(&format!(": {first}"));
        }
        human.push_detail(line);
    }
    for failure in &collection.failures {
        human.push_warning(format!("skipped {}: {}", failure.space, failure.error));
    }
    let exports = save_outputs(&options.save, &tasks, &mut human)?;

    let output = TasksOutput {
        window,
        total: tasks.len(),
        completed,
        tasks,
        failures: collection.failures,
        exports,
    };
    emit_success(ctx.output, "tasks", &output, Some(&human))
}
