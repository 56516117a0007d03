//! chat-tasks thread command implementation

use crate::enrich::thread_info;
use crate::error::Result;
use crate::message::{space_name, thread_name};
use crate::output::{emit_success, HumanOutput};

use super::Context;

pub struct ThreadOptions {
    pub space: String,
    pub thread: String,
}

pub fn run(ctx: &Context, options: ThreadOptions) -> Result<()> {
    let space = space_name(&options.space);
    let thread = thread_name(&space, &options.thread);
    let info = thread_info(&ctx.source, &space, &thread)?;

    let mut human = HumanOutput::new(format!("Thread {thread}"));
    human.push_summary("Messages", info.message_count.to_string());
    if !info.thread_starter.is_empty() {
        human.push_summary("Started by", info.thread_starter.clone());
    }
    if let Some(last) = info.last_message_time {
        human.push_summary("Last message", last.to_rfc3339());
    }
    for entry in &info.messages {
        human.push_detail(format!(
            "{} {}: {}",
            entry.date.format("%Y-%m-%d %H:%M"),
            entry.sender,
            entry.message.split_whitespace().collect::<Vec<_>>().join(" ")
        ));
    }
    emit_success(ctx.output, "thread", &info, Some(&human))
}
