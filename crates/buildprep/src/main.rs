mod commands;

use buildprep_config::env;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "buildprep")]
#[command(about = "コンテナイメージビルドの入力を解決・検証する", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// ソース内の Containerfile / Dockerfile を探す
    Containerfile {
        /// アプリケーションソースのディレクトリ
        #[arg(short, long, env = env::SOURCE)]
        source: PathBuf,
        /// ソース内のビルドコンテキスト
        #[arg(short, long, env = env::CONTEXT, default_value = buildprep_config::DEFAULT_CONTEXT)]
        context: PathBuf,
        /// ビルドファイル名（省略時は Containerfile、次に Dockerfile）
        #[arg(short = 'f', long, env = env::CONTAINERFILE)]
        containerfile: Option<PathBuf>,
    },
    /// シークレットディレクトリをビルダーの --secret 引数に変換
    Secrets {
        /// DIR または src=DIR[,name=ALIAS][,optional=true|false]
        /// 環境変数では 1 行に 1 つずつ指定する
        #[arg(long = "secret-dirs", env = env::SECRET_DIRS, num_args = 1.., value_delimiter = '\n')]
        secret_dirs: Vec<String>,
    },
    /// イメージに対するレジストリ認証を選択
    Auth {
        /// イメージ参照（例: quay.io/org/app:tag）
        image: String,
        /// 認証ファイル（省略時は $DOCKER_CONFIG/config.json または ~/.docker/config.json）
        #[arg(long, env = env::AUTHFILE)]
        authfile: Option<PathBuf>,
        /// 選択した認証をレジストリ単位の認証ファイル (JSON) として出力
        #[arg(long)]
        registry_auth_json: bool,
    },
    /// プリフェッチツールに渡す入力を生成
    #[command(name = "prefetch-input")]
    PrefetchInput {
        /// パッケージマネージャー入力（JSON または種別名）
        #[arg(env = env::PREFETCH_INPUT)]
        input: String,
        /// エンタイトルメント証明書のディレクトリ（RPM の SSL 設定に使用。値の省略時は /etc/pki/entitlement）
        #[arg(
            long,
            env = env::RHSM_ENTITLEMENT_DIR,
            num_args = 0..=1,
            default_missing_value = buildprep_config::DEFAULT_ENTITLEMENT_DIR
        )]
        rhsm_entitlement_dir: Option<PathBuf>,
    },
    /// プリフェッチツール設定から Go プロキシ指定を除去
    #[command(name = "prefetch-config")]
    PrefetchConfig {
        /// プリフェッチツールの設定ファイル (YAML)
        config_file: PathBuf,
        /// 出力先（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// イメージ参照を検証
    #[command(name = "image-ref")]
    ImageRef {
        /// イメージ参照
        reference: String,
        /// ビルドしたイメージのダイジェスト（Containerfile アーティファクトのタグを計算）
        #[arg(long, env = env::IMAGE_DIGEST)]
        digest: Option<String>,
        /// アーティファクトタグのサフィックス
        #[arg(long, env = env::TAG_SUFFIX, default_value = buildprep_config::CONTAINERFILE_TAG_SUFFIX)]
        tag_suffix: String,
        /// 追加するタグ
        #[arg(long, env = env::TAGS, num_args = 1.., value_delimiter = ' ')]
        tags: Vec<String>,
        /// タグ一覧を持つイメージラベル名
        #[arg(long, env = env::TAGS_FROM_IMAGE_LABEL, requires = "tags_label_value")]
        tags_from_image_label: Option<String>,
        /// イメージラベルの値（空白またはカンマ区切りのタグ）
        #[arg(long, env = env::TAGS_LABEL_VALUE, requires = "tags_from_image_label")]
        tags_label_value: Option<String>,
    },
    /// バージョン情報を表示
    Version,
}

fn main() {
    // 標準出力は結果に使うので、ログは stderr に出力
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run(Cli::parse()) {
        let message = match e.downcast_ref::<buildprep_build::BuildError>() {
            Some(build_error) => build_error.user_message(),
            None => format!("{:#}", e),
        };
        eprintln!("{} {}", "Error:".red().bold(), message);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Containerfile {
            source,
            context,
            containerfile,
        } => commands::containerfile::handle(source, context, containerfile),
        Commands::Secrets { secret_dirs } => commands::secrets::handle(&secret_dirs),
        Commands::Auth {
            image,
            authfile,
            registry_auth_json,
        } => commands::auth::handle(&image, authfile, registry_auth_json),
        Commands::PrefetchInput {
            input,
            rhsm_entitlement_dir,
        } => commands::prefetch::handle(&input, rhsm_entitlement_dir.as_deref()),
        Commands::PrefetchConfig {
            config_file,
            output,
        } => commands::prefetch_config::handle(&config_file, output.as_deref()),
        Commands::ImageRef {
            reference,
            digest,
            tag_suffix,
            tags,
            tags_from_image_label,
            tags_label_value,
        } => {
            let tags_label = tags_from_image_label
                .as_deref()
                .zip(tags_label_value.as_deref())
                .map(|(name, value)| commands::image_ref::TagsLabel { name, value });
            commands::image_ref::handle(
                &reference,
                digest.as_deref(),
                &tag_suffix,
                &tags,
                tags_label,
            )
        }
        Commands::Version => {
            println!("buildprep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
