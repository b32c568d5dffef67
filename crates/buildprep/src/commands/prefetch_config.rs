use anyhow::Context;
use buildprep_prefetch::drop_go_proxy;
use colored::Colorize;
use std::path::Path;

pub fn handle(config_file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let _guard = tracing::info_span!("prefetch_config", file = %config_file.display()).entered();

    let content = std::fs::read_to_string(config_file)
        .with_context(|| format!("設定ファイルを読み込めません: {}", config_file.display()))?;
    let filtered = drop_go_proxy(&content);

    match output {
        Some(output) => {
            std::fs::write(output, &filtered)
                .with_context(|| format!("設定ファイルを書き込めません: {}", output.display()))?;
            tracing::debug!("Wrote filtered config to {}", output.display());
            eprintln!(
                "{} {}",
                "✓ Go プロキシ設定を除去しました:".green(),
                output.display()
            );
        }
        None => print!("{}", filtered),
    }
    Ok(())
}
