//! chat-tasks people command implementation

use serde::Serialize;

use crate::error::Result;
use crate::export::ExportSummary;
use crate::output::{emit_success, HumanOutput};
use crate::people::collect_people;
use crate::window::ReportWindow;

use super::{save_outputs, Context, SaveArgs, WindowArgs};

pub struct PeopleOptions {
    pub window: WindowArgs,
    pub save: SaveArgs,
}

#[derive(Serialize)]
struct PeopleOutput {
    window: ReportWindow,
    total: usize,
    people: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exports: Vec<ExportSummary>,
}

#[derive(Serialize)]
struct PersonRow<'a> {
    name: &'a str,
}

pub fn run(ctx: &Context, options: PeopleOptions) -> Result<()> {
    let window = options.window.resolve()?;
    let spaces = ctx.select_spaces(&[])?;
    let people = collect_people(&ctx.source, &spaces, &window, &ctx.classifier);

    let mut human = HumanOutput::new(format!("People ({})", window.label()));
    human.push_summary("Spaces", spaces.len().to_string());
    human.push_summary("Total", people.len().to_string());
    for person in &people {
        human.push_detail(person.clone());
    }

    let rows: Vec<PersonRow<'_>> = people
        .iter()
        .map(|name| PersonRow {
            name: name.as_str(),
        })
        .collect();
    let exports = save_outputs(&options.save, &rows, &mut human)?;

    let output = PeopleOutput {
        window,
        total: people.len(),
        people,
        exports,
    };
    emit_success(ctx.output, "people", &output, Some(&human))
}
