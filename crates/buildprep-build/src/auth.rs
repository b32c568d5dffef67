//! レジストリ認証処理
//!
//! Docker 互換の認証ファイル (config.json) から、イメージのリポジトリに最も
//! 具体的に一致する認証トークンを選択します。
//!
//! 認証ファイルにはレジストリ単位のスコープ (`quay.io`) とリポジトリ単位の
//! スコープ (`quay.io/org/app`) が混在しうる。リポジトリ単位のトークンに対応しない
//! ツールのために、ここで最長一致のトークンを選んでレジストリ単位に変換する。

use crate::error::{BuildError, Result};
use crate::image_ref;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::Span;

/// Docker Hub の正規レジストリ名
pub const REGISTRY_DOCKER_IO: &str = "docker.io";

/// Docker Hub へのログイン時に一部のツールが書き込むスコープ
pub const REGISTRY_INDEX_DOCKER_IO: &str = "https://index.docker.io/v1/";

/// 認証ファイルの構造
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AuthFile {
    /// 認証情報 (スコープ -> AuthEntry)
    #[serde(default)]
    pub auths: HashMap<String, AuthEntry>,
}

/// 認証エントリ
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthEntry {
    /// Base64エンコードされた "username:password"
    #[serde(default)]
    pub auth: String,
}

impl AuthFile {
    /// 認証ファイルを読み込み
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::AuthFileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| BuildError::AuthFileParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// リポジトリに対応するトークンを最長一致で検索
    ///
    /// `reg.io/foo/bar/baz` の場合、`reg.io/foo/bar/baz` → `reg.io/foo/bar` →
    /// `reg.io/foo` → `reg.io` の順に探す。docker.io で見つからなければ
    /// `https://index.docker.io/v1/` も試す。
    pub fn find(&self, repository: &str) -> Option<&str> {
        let mut scope = repository;
        loop {
            if let Some(entry) = self.auths.get(scope) {
                return Some(entry.auth.as_str());
            }
            match scope.rfind('/') {
                Some(index) => scope = &scope[..index],
                None => break,
            }
        }

        if registry_of(repository) == REGISTRY_DOCKER_IO {
            return self
                .auths
                .get(REGISTRY_INDEX_DOCKER_IO)
                .map(|entry| entry.auth.as_str());
        }

        None
    }
}

/// 選択された認証情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryAuth {
    /// リポジトリの最初の要素（レジストリ）
    pub registry: String,
    /// Base64エンコードされた "username:password"
    pub token: String,
}

impl RegistryAuth {
    /// ユーザー名とパスワードを取り出す
    pub fn credentials(&self) -> Result<(String, String)> {
        extract_credentials(&self.token)
    }

    /// このレジストリだけを含む認証ファイルの内容
    ///
    /// リポジトリ単位のスコープを扱えないツールに渡すためのもの。
    pub fn to_auth_file_json(&self) -> String {
        serde_json::json!({
            "auths": {
                self.registry.as_str(): { "auth": self.token.as_str() }
            }
        })
        .to_string()
    }
}

/// 認証ファイルからレジストリ認証を選択する
#[derive(Debug)]
pub struct RegistryAuthSelector {
    auth_file: PathBuf,
    span: Span,
}

impl RegistryAuthSelector {
    /// 新しい RegistryAuthSelector を作成
    ///
    /// デフォルトで $DOCKER_CONFIG/config.json または ~/.docker/config.json を使用
    pub fn new() -> Result<Self> {
        Ok(Self::with_auth_file(buildprep_config::default_auth_file()?))
    }

    /// 指定したパスの認証ファイルを使用
    pub fn with_auth_file(auth_file: PathBuf) -> Self {
        Self {
            auth_file,
            span: Span::none(),
        }
    }

    /// ログの親スパンを指定
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn auth_file(&self) -> &Path {
        &self.auth_file
    }

    /// イメージ参照に対する認証情報を選択
    ///
    /// # Arguments
    /// * `image_ref` - イメージ参照（例: "quay.io/org/app:v1.0@sha256:..."）
    ///
    /// # Returns
    /// * `Ok(auth)` - 最も具体的なスコープのトークン
    /// * `Err(e)` - 認証ファイルが読めない、または一致するスコープがない
    pub fn select(&self, image_ref: &str) -> Result<RegistryAuth> {
        let repository = image_ref::image_name(image_ref);
        if repository.is_empty() {
            return Err(BuildError::InvalidImageReference(image_ref.to_string()));
        }

        tracing::debug!(
            parent: &self.span,
            "Selecting registry authentication for {} from {}",
            repository,
            self.auth_file.display()
        );

        let auth_file = AuthFile::load(&self.auth_file)?;

        // auth が空のエントリは未設定として扱う
        let Some(token) = auth_file.find(&repository).filter(|t| !t.is_empty()) else {
            return Err(BuildError::AuthNotConfigured { repository });
        };

        Ok(RegistryAuth {
            registry: registry_of(&repository).to_string(),
            token: token.to_string(),
        })
    }
}

/// リポジトリパスの最初の要素を返す
fn registry_of(repository: &str) -> &str {
    repository.split('/').next().unwrap_or(repository)
}

/// Base64エンコードされた "username:password" を分解
///
/// ユーザー名・パスワードは空文字列でもよい。
pub fn extract_credentials(token: &str) -> Result<(String, String)> {
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(token)
        .map_err(|e| BuildError::CredentialFormat(format!("failed to decode token: {}", e)))?;

    let decoded = String::from_utf8(decoded)
        .map_err(|e| BuildError::CredentialFormat(format!("invalid UTF-8 in token: {}", e)))?;

    match decoded.split_once(':') {
        Some((username, password)) => Ok((username.to_string(), password.to_string())),
        None => Err(BuildError::CredentialFormat(
            "expected 'username:password'".to_string(),
        )),
    }
}
