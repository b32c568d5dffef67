use buildprep_build::RegistryAuthSelector;
use colored::Colorize;
use std::path::PathBuf;

pub fn handle(image: &str, authfile: Option<PathBuf>, auth_json: bool) -> anyhow::Result<()> {
    let span = tracing::info_span!("auth", image = %image);

    let selector = match authfile {
        Some(path) => RegistryAuthSelector::with_auth_file(path),
        None => RegistryAuthSelector::new()?,
    }
    .with_span(span);

    let auth = selector.select(image)?;
    let (username, _password) = auth.credentials()?;

    eprintln!(
        "{} {}",
        "認証ファイル:".bold(),
        selector.auth_file().display()
    );

    if auth_json {
        // レジストリ単位のスコープしか扱えないツール向けの認証ファイル
        println!("{}", auth.to_auth_file_json());
    } else {
        println!("registry: {}", auth.registry);
        println!("username: {}", username);
    }
    Ok(())
}
