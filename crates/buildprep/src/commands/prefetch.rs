use buildprep_prefetch::{PackageInput, RpmInputPreparer};
use std::path::Path;

pub fn handle(input: &str, entitlement_dir: Option<&Path>) -> anyhow::Result<()> {
    let span = tracing::info_span!("prefetch_input");

    let prepared = RpmInputPreparer::new()
        .with_span(span)
        .prepare(PackageInput::parse(input), entitlement_dir)?;

    println!("{}", prepared.to_json_string()?);
    Ok(())
}
