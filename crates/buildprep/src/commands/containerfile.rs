use buildprep_build::{DockerfileLocator, DockerfileSearch};
use colored::Colorize;
use std::path::PathBuf;

pub fn handle(
    source: PathBuf,
    context: PathBuf,
    containerfile: Option<PathBuf>,
) -> anyhow::Result<()> {
    let span = tracing::info_span!("containerfile", source = %source.display());

    let mut search = DockerfileSearch::new(source).with_context(context);
    if let Some(containerfile) = containerfile {
        search = search.with_dockerfile(containerfile);
    }

    match DockerfileLocator::with_span(span.clone()).locate(&search)? {
        Some(path) => {
            eprintln!("{}", "✓ Containerfile が見つかりました".green());
            println!("{}", path.display());
        }
        None => {
            tracing::info!(parent: &span, "Containerfile or Dockerfile not found");
            eprintln!(
                "{} (source: {}, context: {})",
                "Containerfile または Dockerfile が見つかりません".yellow(),
                search.source_dir.display(),
                search.context_dir.display()
            );
        }
    }
    Ok(())
}
