//! ビルドシークレットの解決
//!
//! `--secret-dirs` で指定されたディレクトリ内のファイルを、ビルド時に
//! `RUN --mount=type=secret,id=...` で参照できるシークレットへ変換します。

use crate::error::{BuildError, Result};
use std::collections::HashSet;
use std::fs::DirEntry;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use tracing::Span;

/// シークレットディレクトリの指定
///
/// 書式: `DIR_PATH` または `src=DIR_PATH[,name=ALIAS][,optional=true|false]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretDir {
    pub src: PathBuf,
    /// シークレットIDの接頭辞。未指定ならディレクトリ名
    pub name: Option<String>,
    /// true ならディレクトリが存在しなくてもエラーにしない
    pub optional: bool,
}

impl SecretDir {
    fn id_prefix(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => name.clone(),
            _ => self
                .src
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.src.to_string_lossy().into_owned()),
        }
    }
}

impl FromStr for SecretDir {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        let mut secret_dir = SecretDir::default();

        for kv in s.split(',') {
            let (key, value) = match kv.split_once('=') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => ("src", kv.trim()),
            };

            match key {
                "src" => secret_dir.src = PathBuf::from(value),
                "name" => secret_dir.name = Some(value.to_string()),
                "optional" => {
                    secret_dir.optional = match value {
                        "true" => true,
                        "false" => false,
                        _ => return Err(BuildError::InvalidOptionalValue(value.to_string())),
                    }
                }
                _ => return Err(BuildError::InvalidAttribute(key.to_string())),
            }
        }

        Ok(secret_dir)
    }
}

/// 複数の `--secret-dirs` 引数をパース
pub fn parse_secret_dirs<S: AsRef<str>>(args: &[S]) -> Result<Vec<SecretDir>> {
    args.iter().map(|arg| arg.as_ref().parse()).collect()
}

/// 解決済みのシークレット（ファイルの絶対パスと ID）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretMapping {
    pub src: PathBuf,
    pub id: String,
}

impl SecretMapping {
    /// ビルダーに渡す `--secret=src=...,id=...` 引数
    pub fn to_build_arg(&self) -> String {
        format!("--secret=src={},id={}", self.src.display(), self.id)
    }
}

/// シークレットディレクトリを解決する
#[derive(Debug)]
pub struct SecretDirResolver {
    span: Span,
}

impl Default for SecretDirResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretDirResolver {
    pub fn new() -> Self {
        Self {
            span: Span::none(),
        }
    }

    /// ログの親スパンを指定して作成
    pub fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// 指定順にディレクトリを走査し、シークレットの一覧を返す
    ///
    /// ディレクトリ内のエントリはファイル名順。通常ファイルと、通常ファイルを指す
    /// シンボリックリンクのみを対象とし、ディレクトリ（およびディレクトリへのリンク）は
    /// 読み飛ばす。Kubernetes の secret volume では `token -> ..data/token` は有効な
    /// シークレットだが `..data` はディレクトリなので除外される。
    ///
    /// ID が重複した場合は全体をエラーにする（片方を黙って落とさない）。
    pub fn resolve(&self, secret_dirs: &[SecretDir]) -> Result<Vec<SecretMapping>> {
        let mut mappings = Vec::new();
        let mut used_ids = HashSet::new();

        for secret_dir in secret_dirs {
            let id_prefix = secret_dir.id_prefix();

            let entries = match read_dir_sorted(&secret_dir.src) {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound && secret_dir.optional => {
                    tracing::debug!(
                        parent: &self.span,
                        "secret directory {} doesn't exist but is marked optional, skipping",
                        secret_dir.src.display()
                    );
                    continue;
                }
                Err(e) => {
                    return Err(BuildError::SecretDirUnreadable {
                        path: secret_dir.src.clone(),
                        source: e,
                    });
                }
            };

            let abs_dir = std::path::absolute(&secret_dir.src)?;

            for entry in entries {
                if !is_regular_file(&entry)? {
                    continue;
                }

                let filename = entry.file_name().to_string_lossy().into_owned();
                let id = secret_id(&id_prefix, &filename);

                if !used_ids.insert(id.clone()) {
                    return Err(BuildError::DuplicateSecretId(id));
                }

                tracing::info!(
                    parent: &self.span,
                    "Adding secret {} to the build, available with 'RUN --mount=type=secret,id={}'",
                    id,
                    id
                );

                mappings.push(SecretMapping {
                    src: abs_dir.join(&filename),
                    id,
                });
            }
        }

        Ok(mappings)
    }
}

/// `<prefix>/<filename>` 形式の ID。区切りの重複や `.` は畳み込む
fn secret_id(prefix: &str, filename: &str) -> String {
    Path::new(prefix)
        .join(filename)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

fn read_dir_sorted(dir: &Path) -> std::io::Result<Vec<DirEntry>> {
    let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());
    Ok(entries)
}

/// 通常ファイル、または通常ファイルを指すシンボリックリンクか
fn is_regular_file(entry: &DirEntry) -> Result<bool> {
    let file_type = entry.file_type()?;
    if file_type.is_file() {
        return Ok(true);
    }
    if file_type.is_symlink() {
        let path = entry.path();
        let metadata = std::fs::metadata(&path)
            .map_err(|e| BuildError::SecretStat { path, source: e })?;
        return Ok(metadata.is_file());
    }
    Ok(false)
}
