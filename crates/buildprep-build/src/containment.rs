//! パスの包含チェック
//!
//! シンボリックリンクを解決したうえで、あるパスが境界ディレクトリの内側に
//! あるかを判定します。ファイルシステムの状態は呼び出し時点のものを使うため、
//! 並行して書き換えられた場合の TOCTOU は防げません。

use crate::error::{BuildError, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// シンボリックリンクをすべて解決した正規パスを返す
///
/// パスが存在しない場合は `Ok(None)`。それ以外の I/O エラーは
/// `SymlinkResolution` として返す。
pub fn resolve(path: &Path) -> Result<Option<PathBuf>> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(Some(resolved)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(BuildError::SymlinkResolution {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// `candidate` が `boundary` 自身、またはその配下にあるか
///
/// 比較はコンポーネント単位で行うので `/src-other` は `/src` の配下にならない。
/// どちらも正規化済みのパスを渡すこと。
pub fn is_contained(candidate: &Path, boundary: &Path) -> bool {
    candidate.starts_with(boundary)
}

/// `rel` を `base` の下に字句的に結合する
///
/// `rel` が絶対パスでも `base` 配下として扱い、`.` と `..` はファイルシステムに
/// 触れる前に畳み込む。`..` はルートより上には遡らない。
pub fn join_lexically(base: &Path, rel: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
            Component::ParentDir => {
                joined.pop();
            }
            Component::Normal(part) => joined.push(part),
        }
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_contained() {
        let boundary = Path::new("/work/source");
        assert!(is_contained(Path::new("/work/source"), boundary));
        assert!(is_contained(Path::new("/work/source/a/Dockerfile"), boundary));
        assert!(!is_contained(Path::new("/work/source-other/Dockerfile"), boundary));
        assert!(!is_contained(Path::new("/work/Dockerfile"), boundary));
    }

    #[test]
    fn test_join_lexically() {
        let base = Path::new("/work/source");
        assert_eq!(
            join_lexically(base, Path::new("./ctx/Dockerfile")),
            PathBuf::from("/work/source/ctx/Dockerfile")
        );
        assert_eq!(
            join_lexically(base, Path::new("../Dockerfile")),
            PathBuf::from("/work/Dockerfile")
        );
        // 絶対パスも base 配下に結合される
        assert_eq!(
            join_lexically(base, Path::new("/etc/passwd")),
            PathBuf::from("/work/source/etc/passwd")
        );
        assert_eq!(
            join_lexically(Path::new("/"), Path::new("../../x")),
            PathBuf::from("/x")
        );
    }

    #[test]
    fn test_resolve_missing_is_none() {
        let temp_dir = tempdir().unwrap();
        let result = resolve(&temp_dir.path().join("missing")).unwrap();
        assert_eq!(result, None);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlinks() {
        let temp_dir = tempdir().unwrap();
        let real = temp_dir.path().join("real");
        fs::create_dir(&real).unwrap();
        fs::write(real.join("Dockerfile"), "FROM alpine").unwrap();

        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let resolved = resolve(&link.join("Dockerfile")).unwrap().unwrap();
        assert_eq!(
            resolved,
            fs::canonicalize(real.join("Dockerfile")).unwrap()
        );
    }
}
