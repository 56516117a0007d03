//! chat-tasks spaces command implementation

use serde::Serialize;

use crate::error::Result;
use crate::message::{Space, SpaceType};
use crate::output::{emit_success, HumanOutput};
use crate::source::MessageSource;

use super::Context;

pub struct SpacesOptions {
    pub include_direct_messages: bool,
}

#[derive(Serialize)]
struct SpacesOutput {
    total: usize,
    spaces: Vec<Space>,
}

pub fn run(ctx: &Context, options: SpacesOptions) -> Result<()> {
    let spaces: Vec<Space> = ctx
        .source
        .list_spaces()?
        .into_iter()
        .filter(|space| options.include_direct_messages || space.space_type == SpaceType::Space)
        .collect();

    let mut human = HumanOutput::new("Spaces");
    human.push_summary("Total", spaces.len().to_string());
    for space in &spaces {
        let mut line = format!("{} {}", space.id(), space.label());
        if space.space_type == SpaceType::DirectMessage {
            line.push_str(" [direct message]");
        }
        human.push_detail(line);
    }
    if !options.include_direct_messages {
        human.push_next_step("chat-tasks spaces --all to include direct messages");
    }

    let output = SpacesOutput {
        total: spaces.len(),
        spaces,
    };
    emit_success(ctx.output, "spaces", &output, Some(&human))
}
