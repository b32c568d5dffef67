use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Missing source directory")]
    MissingSourceDirectory,

    #[error("Error on evaluating symlink for {path}: {source}")]
    SymlinkResolution {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Dockerfile {dockerfile} is not present under source '{boundary}' (resolved to {path})")]
    EscapeDetected {
        dockerfile: PathBuf,
        path: PathBuf,
        boundary: PathBuf,
    },

    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    #[error("invalid argument: optional={0} (expected true|false)")]
    InvalidOptionalValue(String),

    #[error("failed to read secret directory {path}: {source}")]
    SecretDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stat {path}: {source}")]
    SecretStat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate secret ID '{0}': ensure unique basename/filename combinations")]
    DuplicateSecretId(String),

    #[error("Invalid image reference '{0}'")]
    InvalidImageReference(String),

    #[error("Invalid tag: {tag}")]
    InvalidTag { tag: String },

    #[error("Invalid image label name '{0}'")]
    InvalidLabelName(String),

    #[error("Failed to read auth file {path}: {source}")]
    AuthFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse auth file {path}: {source}")]
    AuthFileParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Registry authentication is not configured for {repository}.")]
    AuthNotConfigured { repository: String },

    #[error("invalid credential format: {0}")]
    CredentialFormat(String),

    #[error(transparent)]
    Config(#[from] buildprep_config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::EscapeDetected {
                dockerfile,
                boundary,
                ..
            } => {
                format!(
                    "Containerfile がソースディレクトリの外を指しています: {}\n\
                     \n\
                     解決方法:\n\
                     1. シンボリックリンクがソース外を参照していないか確認してください\n\
                     2. パスに '..' を含めず、ソース ({}) 内のファイルを指定してください",
                    dockerfile.display(),
                    boundary.display()
                )
            }
            BuildError::DuplicateSecretId(id) => {
                format!(
                    "シークレットIDが重複しています: {}\n\
                     \n\
                     --secret-dirs の name= でディレクトリごとに別名を付けてください:\n\
                        src=path/to/dir,name=alias",
                    id
                )
            }
            BuildError::AuthNotConfigured { repository } => {
                format!(
                    "レジストリ認証が設定されていません: {}\n\
                     \n\
                     認証ファイル (~/.docker/config.json または $DOCKER_CONFIG/config.json) の\n\
                     auths にレジストリまたはリポジトリのエントリを追加してください。",
                    repository
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
pub type Result<T> = BuildResult<T>;
