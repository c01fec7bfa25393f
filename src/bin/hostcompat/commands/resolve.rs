//! `hostcompat resolve` command

use std::sync::Arc;

use anyhow::Result;

use crate::commands::GlobalContext;
use hostcompat::dispatch::Dispatcher;

pub fn execute(ctx: &GlobalContext) -> Result<()> {
    let host = Arc::new(ctx.config.build_host()?);
    let mut dispatcher = Dispatcher::new(ctx.config.registry()?);

    let result = dispatcher.resolve(host);
    println!("State:        {}", dispatcher.state());
    let handle = result?;

    let identity = handle.identity();
    let caps = handle.capabilities();
    let required: Vec<_> = caps.required_features.iter().map(|f| f.as_str()).collect();

    println!("Shim:         {} {}", identity.name, identity.shim_version);
    println!("Targets:      {}", identity.targets);
    println!("Model data:   {}", caps.model_data);
    println!("Text shadow:  {}", if caps.text_shadow { "yes" } else { "no" });
    println!("Requires:     {}", required.join(", "));

    Ok(())
}
