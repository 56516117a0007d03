//! chat-tasks events command implementation
//!
//! Writes the classified task events of one space as JSON lines.

use serde::Serialize;

use crate::error::Result;
use crate::events::EventDestination;
use crate::message::space_name;
use crate::output::{emit_success, HumanOutput};
use crate::source::MessageSource;

use super::{Context, WindowArgs};

pub struct EventsOptions {
    pub space: String,
    pub out: Option<String>,
    pub window: WindowArgs,
}

#[derive(Serialize)]
struct EventsOutput {
    space: String,
    destination: String,
    events: usize,
}

pub fn run(ctx: &Context, options: EventsOptions) -> Result<()> {
    let window = options.window.resolve()?;
    let space = space_name(&options.space);
    let destination =
        EventDestination::parse(options.out.as_deref()).unwrap_or(EventDestination::Stdout);

    let messages = ctx.source.list_messages(&space, &window)?;
    let events = ctx.classifier.classify_all(&messages);
    let mut sink = destination.open()?;
    let written = sink.emit_all(&events, &space)?;
    tracing::info!(space = %space, events = written, "emitted events");

    // The stream owns stdout; only a file destination gets a summary.
    let EventDestination::File(path) = destination else {
        return Ok(());
    };
    let mut human = HumanOutput::new("Events written");
    human.push_summary("Space", space.clone());
    human.push_summary("Events", written.to_string());
    human.push_summary("File", path.display().to_string());
    let output = EventsOutput {
        space,
        destination: path.display().to_string(),
        events: written,
    };
    emit_success(ctx.output, "events", &output, Some(&human))
}
