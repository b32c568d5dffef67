pub mod error;

pub use error::*;

use std::path::PathBuf;

/// CLI フラグに対応する環境変数名
pub mod env {
    pub const SOURCE: &str = "BUILDPREP_SOURCE";
    pub const CONTEXT: &str = "BUILDPREP_CONTEXT";
    pub const CONTAINERFILE: &str = "BUILDPREP_CONTAINERFILE";
    pub const SECRET_DIRS: &str = "BUILDPREP_SECRET_DIRS";
    pub const AUTHFILE: &str = "BUILDPREP_AUTHFILE";
    pub const PREFETCH_INPUT: &str = "BUILDPREP_PREFETCH_INPUT";
    pub const RHSM_ENTITLEMENT_DIR: &str = "BUILDPREP_RHSM_ENTITLEMENT_DIR";
    pub const IMAGE_DIGEST: &str = "BUILDPREP_IMAGE_DIGEST";
    pub const TAG_SUFFIX: &str = "BUILDPREP_TAG_SUFFIX";
    pub const TAGS: &str = "BUILDPREP_TAGS";
    pub const TAGS_FROM_IMAGE_LABEL: &str = "BUILDPREP_TAGS_FROM_IMAGE_LABEL";
    pub const TAGS_LABEL_VALUE: &str = "BUILDPREP_TAGS_LABEL_VALUE";

    /// Docker 互換ツールが参照する設定ディレクトリ
    pub const DOCKER_CONFIG: &str = "DOCKER_CONFIG";
}

/// ビルドコンテキストのデフォルト（ソースディレクトリ直下）
pub const DEFAULT_CONTEXT: &str = ".";

/// subscription-manager 登録後にエンタイトルメント証明書が置かれる場所
pub const DEFAULT_ENTITLEMENT_DIR: &str = "/etc/pki/entitlement";

/// RHSM の CA バンドル
pub const RHSM_CA_BUNDLE: &str = "/etc/rhsm/ca/redhat-uep.pem";

/// Containerfile アーティファクトのタグサフィックス
pub const CONTAINERFILE_TAG_SUFFIX: &str = ".containerfile";

/// Containerfile アーティファクトの artifact type
pub const CONTAINERFILE_ARTIFACT_TYPE: &str = "application/vnd.konflux.containerfile";

/// レジストリ認証ファイルのデフォルトパスを取得
///
/// 以下の優先順位で決定:
/// 1. 環境変数 DOCKER_CONFIG 配下の config.json
/// 2. ~/.docker/config.json
pub fn default_auth_file() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(env::DOCKER_CONFIG)
        && !dir.is_empty()
    {
        return Ok(PathBuf::from(dir).join("config.json"));
    }

    let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
    Ok(home.join(".docker").join("config.json"))
}
