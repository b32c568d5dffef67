use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "ホームディレクトリが見つかりません。\n\
        DOCKER_CONFIG 環境変数で認証ファイルのディレクトリを直接指定できます"
    )]
    HomeDirNotFound,
}

pub type Result<T> = std::result::Result<T, ConfigError>;
