//! Containerfile / Dockerfile の探索
//!
//! ソースディレクトリ配下からビルドファイルを探し、シンボリックリンクや `..` による
//! ソース外への脱出を検出します。

use crate::containment;
use crate::error::{BuildError, Result};
use std::path::{Path, PathBuf};
use tracing::Span;

/// 明示指定がない場合の探索順（Containerfile が優先）
pub const DEFAULT_BUILD_FILES: [&str; 2] = ["./Containerfile", "./Dockerfile"];

/// 探索条件
#[derive(Debug, Clone)]
pub struct DockerfileSearch {
    /// アプリケーションソースのディレクトリ（包含チェックの境界）
    pub source_dir: PathBuf,
    /// ソース内のビルドコンテキスト。デフォルトは "."
    pub context_dir: PathBuf,
    /// 明示的に指定されたビルドファイル
    pub dockerfile: Option<PathBuf>,
}

impl DockerfileSearch {
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            context_dir: PathBuf::from(buildprep_config::DEFAULT_CONTEXT),
            dockerfile: None,
        }
    }

    pub fn with_context(mut self, context_dir: impl Into<PathBuf>) -> Self {
        self.context_dir = context_dir.into();
        self
    }

    pub fn with_dockerfile(mut self, dockerfile: impl Into<PathBuf>) -> Self {
        self.dockerfile = Some(dockerfile.into());
        self
    }
}

/// ビルドファイルの探索を行う
#[derive(Debug)]
pub struct DockerfileLocator {
    span: Span,
}

impl Default for DockerfileLocator {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerfileLocator {
    pub fn new() -> Self {
        Self {
            span: Span::none(),
        }
    }

    /// ログの親スパンを指定して作成
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// ビルドファイルのパスを解決
    ///
    /// 検索順序（それぞれ context 配下 → ソース直下）:
    /// 1. 明示的な指定
    /// 2. 指定がなければ ./Containerfile、次に ./Dockerfile
    ///
    /// # Returns
    /// * `Ok(Some(path))` - ソース配下で見つかった正規パス
    /// * `Ok(None)` - どこにも存在しない
    /// * `Err(e)` - ソース外への脱出、またはシンボリックリンク解決の失敗
    pub fn locate(&self, search: &DockerfileSearch) -> Result<Option<PathBuf>> {
        if search.source_dir.as_os_str().is_empty() {
            return Err(BuildError::MissingSourceDirectory);
        }

        // ソース自体はシンボリックリンクでもよい。解決後のパスが境界になる
        let boundary = std::fs::canonicalize(&search.source_dir).map_err(|e| {
            BuildError::SymlinkResolution {
                path: search.source_dir.clone(),
                source: e,
            }
        })?;

        let context_dir = if search.context_dir.as_os_str().is_empty() {
            Path::new(buildprep_config::DEFAULT_CONTEXT)
        } else {
            search.context_dir.as_path()
        };

        if let Some(dockerfile) = &search.dockerfile {
            return self.search(&boundary, context_dir, dockerfile);
        }

        for name in DEFAULT_BUILD_FILES {
            if let Some(path) = self.search(&boundary, context_dir, Path::new(name))? {
                return Ok(Some(path));
            }
        }

        tracing::debug!(
            parent: &self.span,
            "Neither Containerfile nor Dockerfile found under {}",
            boundary.display()
        );
        Ok(None)
    }

    /// context 配下、ソース直下の順に 1 つのファイル名を探す
    fn search(
        &self,
        boundary: &Path,
        context_dir: &Path,
        dockerfile: &Path,
    ) -> Result<Option<PathBuf>> {
        let context = containment::join_lexically(boundary, context_dir);
        let candidates = [
            containment::join_lexically(&context, dockerfile),
            containment::join_lexically(boundary, dockerfile),
        ];

        for candidate in &candidates {
            let Some(resolved) = containment::resolve(candidate)? else {
                continue;
            };

            if !containment::is_contained(&resolved, boundary) {
                return Err(BuildError::EscapeDetected {
                    dockerfile: dockerfile.to_path_buf(),
                    path: resolved,
                    boundary: boundary.to_path_buf(),
                });
            }

            tracing::debug!(
                parent: &self.span,
                "Found {} at: {}",
                dockerfile.display(),
                resolved.display()
            );
            return Ok(Some(resolved));
        }

        Ok(None)
    }
}

/// 既定のロケーターで探索するショートカット
pub fn search_dockerfile(search: &DockerfileSearch) -> Result<Option<PathBuf>> {
    DockerfileLocator::new().locate(search)
}
