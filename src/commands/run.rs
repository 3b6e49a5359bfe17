//! Implementation of the `shellican run` command.

use crate::{
    commands::ColorChoice,
    diagnostics::Diagnostics,
    error::Result,
    executor::execute,
    paths::{display_path, root_dir},
    resolve::resolve,
};

/// Execute the run command.
pub async fn run(
    color: ColorChoice,
    verbose: bool,
    collection: String,
    runnable: String,
    args: Vec<String>,
) -> Result<()> {
    let root = root_dir()?;
    let mut diagnostics = Diagnostics::new(verbose, color.enabled());

    let context = resolve(&root, &collection, &[runnable.clone()])?;
    diagnostics.note(format!(
        ">> Running {collection}/{runnable} in {}",
        display_path(&context.runnable_path)
    ));

    execute(&context, &args, &mut diagnostics)?;
    diagnostics.print_warning_summary();
    Ok(())
}
