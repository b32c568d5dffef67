//! イメージ参照の処理
//!
//! `registry[:port]/namespace/name[:tag][@sha256:digest]` 形式の参照から
//! タグ・ダイジェストを取り除き、各部分を検証します。

use crate::error::{BuildError, Result};
use regex::Regex;
use std::sync::LazyLock;

static DIGEST_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@sha256:[a-fA-F0-9]{64}$").unwrap());
static TAG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,127}$").unwrap());
static NAME_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9](?:[a-z0-9_.-]*[a-z0-9])?$").unwrap());
static REGISTRY_AND_PORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-z0-9](?:[a-z0-9_.-]*[a-z0-9])?)(?::(\d+))?$").unwrap()
});
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,127}$").unwrap());
static DIGEST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sha256:[a-f0-9]{64}$").unwrap());
static ARTIFACT_TAG_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._-]{1,57}$").unwrap());
static LABEL_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z](?:[a-z0-9/._-]*[a-z])$").unwrap());
static LABEL_DOUBLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/._-]{2}").unwrap());
static TAG_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s,]+").unwrap());

const MAX_NAME_LEN: usize = 128;
const MAX_LABEL_NAME_LEN: usize = 256;

/// 区切り文字の連続として許されない組み合わせ
const FORBIDDEN_SEQUENCES: [&str; 10] = [
    "___", "//", "..", "--", "_.", "._", "-.", ".-", "-_", "_-",
];

/// イメージ参照からタグとダイジェストを取り除いたリポジトリ部分を返す
///
/// # Examples
/// - `quay.io/org/app:v1.0` -> `quay.io/org/app`
/// - `quay.io/org/app:v1.0@sha256:...` -> `quay.io/org/app`
/// - `localhost:5000/app` -> `localhost:5000/app`
pub fn image_name(reference: &str) -> String {
    let without_digest = DIGEST_SUFFIX.replace(reference, "");
    TAG_SUFFIX.replace(&without_digest, "").into_owned()
}

/// タグ・ダイジェストを含まないイメージ名の検証
///
/// 小文字英数字と区切り文字 (`-` `.` `_` `/`) のみ。区切り文字で始まったり終わったりせず、
/// 区切り文字の連続も不可。最初の要素だけはポート番号を持てる。
pub fn is_image_name_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return false;
    }
    if FORBIDDEN_SEQUENCES.iter().any(|seq| name.contains(seq)) {
        return false;
    }

    let parts: Vec<&str> = name.split('/').collect();
    if parts.len() == 1 {
        return NAME_PART.is_match(parts[0]);
    }

    let Some(caps) = REGISTRY_AND_PORT.captures(parts[0]) else {
        return false;
    };
    if let Some(port) = caps.get(2)
        && port.as_str().parse::<u16>().is_err()
    {
        return false;
    }

    parts[1..].iter().all(|part| NAME_PART.is_match(part))
}

/// タグの検証（128文字以下、先頭はピリオド・ハイフン不可）
pub fn is_image_tag_valid(tag: &str) -> bool {
    TAG.is_match(tag)
}

/// `sha256:<64桁の16進小文字>` 形式のダイジェストか
pub fn is_image_digest_valid(digest: &str) -> bool {
    DIGEST.is_match(digest)
}

/// Containerfile アーティファクトのタグサフィックスの検証
pub fn is_tag_suffix_valid(suffix: &str) -> bool {
    ARTIFACT_TAG_SUFFIX.is_match(suffix)
}

/// イメージラベル名の検証
///
/// 小文字英数字と `/` `.` `_` `-` のみで、英小文字で始まり英小文字で終わる。
/// 区切り文字の連続は不可。256文字以下。
pub fn is_label_name_valid(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_LABEL_NAME_LEN {
        return false;
    }
    if LABEL_DOUBLE_SEPARATOR.is_match(name) {
        return false;
    }
    LABEL_NAME.is_match(name)
}

/// ラベル値に書かれたタグ一覧を分割する
///
/// 空白またはカンマ区切り。前後の空白は無視し、空の値ならタグなし。
pub fn parse_tags(label_value: &str) -> Vec<String> {
    let trimmed = label_value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    TAG_SEPARATOR.split(trimmed).map(str::to_string).collect()
}

/// すべてのタグを検証し、最初の不正なタグをエラーにする
pub fn validate_tags<S: AsRef<str>>(tags: &[S]) -> Result<()> {
    match tags.iter().find(|tag| !is_image_tag_valid(tag.as_ref())) {
        Some(tag) => Err(BuildError::InvalidTag {
            tag: tag.as_ref().to_string(),
        }),
        None => Ok(()),
    }
}

/// ラベル名を検証したうえでラベル値からタグを取り出す
pub fn tags_from_label(label_name: &str, label_value: &str) -> Result<Vec<String>> {
    if !is_label_name_valid(label_name) {
        return Err(BuildError::InvalidLabelName(label_name.to_string()));
    }
    let tags = parse_tags(label_value);
    validate_tags(&tags)?;
    Ok(tags)
}

/// ビルドしたイメージのダイジェストから Containerfile アーティファクトのタグを生成
///
/// `sha256:abcd` + `.containerfile` -> `sha256-abcd.containerfile`
pub fn containerfile_artifact_tag(digest: &str, suffix: &str) -> String {
    format!("{}{}", digest.replacen(':', "-", 1), suffix)
}
