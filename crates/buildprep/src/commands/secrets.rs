use buildprep_build::{SecretDirResolver, parse_secret_dirs};

pub fn handle(args: &[String]) -> anyhow::Result<()> {
    let span = tracing::info_span!("secrets", count = args.len());

    let secret_dirs = parse_secret_dirs(args)?;
    let mappings = SecretDirResolver::with_span(span).resolve(&secret_dirs)?;

    for mapping in &mappings {
        println!("{}", mapping.to_build_arg());
    }
    Ok(())
}
