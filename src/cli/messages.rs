//! chat-tasks messages command implementation

use serde::Serialize;

use crate::error::Result;
use crate::export::ExportSummary;
use crate::message::{space_name, RawMessage};
use crate::output::{emit_success, HumanOutput};
use crate::source::MessageSource;
use crate::window::ReportWindow;

use super::{save_outputs, Context, SaveArgs, WindowArgs};

pub struct MessagesOptions {
    pub space: String,
    pub window: WindowArgs,
    pub save: SaveArgs,
}

#[derive(Serialize)]
struct MessagesOutput {
    space: String,
    window: ReportWindow,
    total: usize,
    task_messages: usize,
    messages: Vec<RawMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    exports: Vec<ExportSummary>,
}

pub fn run(ctx: &Context, options: MessagesOptions) -> Result<()> {
    let window = options.window.resolve()?;
    let space = space_name(&options.space);
    let messages = ctx.source.list_messages(&space, &window)?;
    let task_messages = messages
        .iter()
        .filter(|message| ctx.classifier.is_task_message(message))
        .count();

    let mut human = HumanOutput::new(format!("Messages in {space} ({})", window.label()));
    human.push_summary("Total", messages.len().to_string());
    human.push_summary("Task-bot messages", task_messages.to_string());
    for message in &messages {
        human.push_detail(format!(
            "{} {}: {}",
            message.create_time.format("%Y-%m-%d %H:%M"),
            message.sender,
            message.text.split_whitespace().collect::<Vec<_>>().join(" ")
        ));
    }
    let exports = save_outputs(&options.save, &messages, &mut human)?;

    let output = MessagesOutput {
        space,
        window,
        total: messages.len(),
        task_messages,
        messages,
        exports,
    };
    emit_success(ctx.output, "messages", &output, Some(&human))
}
