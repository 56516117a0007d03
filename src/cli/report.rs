//! chat-tasks report command implementation
//!
//! Collects tasks across spaces and prints either the completion table or
//! the per-assignee drill-down.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collect::{Collector, SpaceFailure};
use crate::drilldown::{self, DrillDownEntry};
use crate::enrich::ThreadMode;
use crate::error::Result;
use crate::export::ExportSummary;
use crate::output::{emit_success, HumanOutput};
use crate::pattern::{filter_records, AssigneePattern};
use crate::report::{analyze, render_table, AssigneeReportRow};
use crate::window::ReportWindow;

use super::{save_outputs, Context, SaveArgs, WindowArgs};

pub struct ReportOptions {
    pub assignee: Option<String>,
    pub spaces: Vec<String>,
    pub drill_down: bool,
    pub window: WindowArgs,
    pub save: SaveArgs,
}

#[derive(Serialize)]
#[serde(untagged)]
enum ReportBody {
    Table {
        rows: Vec<AssigneeReportRow>,
    },
    DrillDown {
        week_start: DateTime<Utc>,
        entries: Vec<DrillDownEntry>,
    },
}

#[derive(Serialize)]
struct ReportOutput {
    window: ReportWindow,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee: Option<String>,
    spaces: usize,
    tasks: usize,
    #[serde(flatten)]
    body: ReportBody,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<SpaceFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exports: Vec<ExportSummary>,
}

pub fn run(ctx: &Context, options: ReportOptions) -> Result<()> {
    let window = options.window.resolve()?;
    let pattern = AssigneePattern::parse_opt(options.assignee.as_deref())?;
    let spaces = ctx.select_spaces(&options.spaces)?;

    // The drill-down lists each task by its first thread message.
    let thread_mode = if options.drill_down {
        ThreadMode::Context
    } else {
        ThreadMode::None
    };
    let collection = Collector::new(&ctx.source, &ctx.classifier)
        .thread_mode(thread_mode)
        .assignee_filter(pattern.as_ref())
        .collect_spaces(&spaces, &window);
    let records = filter_records(
        collection.records,
        &ctx.config.filter.people,
        &ctx.config.filter.spaces,
    );
    tracing::info!(tasks = records.len(), "collected tasks");

    let mut human = HumanOutput::new(format!("Task report ({})", window.label()));
    human.push_summary("Spaces", spaces.len().to_string());
    human.push_summary("Tasks", records.len().to_string());
    if let Some(pattern) = pattern.as_ref() {
        human.push_summary("Assignee", pattern.as_str().to_string());
    }
    for failure in &collection.failures {
        human.push_warning(format!("skipped {}: {}", failure.space, failure.error));
    }

    let (body, exports) = if options.drill_down {
        let report = drilldown::drill_down(&records, &window, pattern.as_ref());
        human.set_body(drilldown::render(&report));
        let exports = save_outputs(&options.save, &report.entries, &mut human)?;
        (
            ReportBody::DrillDown {
                week_start: report.week_start,
                entries: report.entries,
            },
            exports,
        )
    } else {
        let rows = analyze(&records);
        human.set_body(render_table(&rows));
        let exports = save_outputs(&options.save, &rows, &mut human)?;
        (ReportBody::Table { rows }, exports)
    };

    let output = ReportOutput {
        window,
        assignee: pattern.map(|p| p.as_str().to_string()),
        spaces: spaces.len(),
        tasks: records.len(),
        body,
        failures: collection.failures,
        exports,
    };
    emit_success(ctx.output, "report", &output, Some(&human))
}
