//! `hostcompat data` command

use anyhow::Result;

use crate::cli::{DataArgs, DataCommands};
use crate::commands::GlobalContext;
use hostcompat::ops;

pub fn execute(args: DataArgs, ctx: &GlobalContext) -> Result<()> {
    let session = ctx.session()?;
    let handle = session.handle();

    match args.command {
        DataCommands::Get { holder, key } => match ops::data_get(handle, &holder, &key)? {
            Some(value) => println!("{}", value),
            None => println!("(not set)"),
        },

        DataCommands::Set { holder, key, value } => {
            let previous = ops::data_set(handle, &holder, &key, &value)?;
            match previous {
                Some(old) => println!("Set {} on {} = {} (was {})", key, holder, value, old),
                None => println!("Set {} on {} = {}", key, holder, value),
            }
            session.save()?;
        }

        DataCommands::Remove { holder, key } => {
            if ops::data_remove(handle, &holder, &key)? {
                println!("Removed {} from {}", key, holder);
                session.save()?;
            } else {
                println!("{} is not set on {}", key, holder);
            }
        }

        DataCommands::List { holder } => {
            let entries = ops::data_list(handle, &holder)?;
            if entries.is_empty() {
                println!("No data on {}", holder);
            }
            for (key, value) in entries {
                println!("{} = {}", key, value);
            }
        }
    }

    Ok(())
}
