//! `hostcompat model` command

use anyhow::Result;

use crate::cli::{ModelArgs, ModelCommands};
use crate::commands::GlobalContext;
use hostcompat::ops;

pub fn execute(args: ModelArgs, ctx: &GlobalContext) -> Result<()> {
    let session = ctx.session()?;
    let handle = session.handle();

    match args.command {
        ModelCommands::Get { item } => match ops::model_get(handle, &item)? {
            Some(index) => println!("{}", index),
            None => println!("(not set)"),
        },

        ModelCommands::Set { item, index } => {
            ops::model_set(handle, &item, index)?;
            println!("Model index of {} = {}", item, index);
            session.save()?;
        }

        ModelCommands::Clear { item } => {
            if ops::model_clear(handle, &item)? {
                println!("Cleared model index of {}", item);
                session.save()?;
            } else {
                println!("{} has no model index", item);
            }
        }
    }

    Ok(())
}
