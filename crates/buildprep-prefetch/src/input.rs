//! パッケージマネージャー入力の変換
//!
//! プリフェッチツールに渡す入力は決まったスキーマを持たない JSON で、
//! 次のいずれかの形をとる:
//! - `{"type": "rpm"}`
//! - `{"packages": [{"type": "rpm"}, {"type": "gomod"}]}`
//! - 上記を並べたトップレベルの配列

use crate::error::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// パッケージ一覧を持つフィールド
const PACKAGES_KEY: &str = "packages";
/// パッケージ種別を持つフィールド
const TYPE_KEY: &str = "type";

/// 入力 JSON のノード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PackageInput {
    Array(Vec<PackageInput>),
    /// キーの順序は入力のまま保持する
    Object(IndexMap<String, PackageInput>),
    Scalar(Value),
}

pub type PackageObject = IndexMap<String, PackageInput>;

impl PackageInput {
    /// ユーザー入力をパース
    ///
    /// JSON として解釈できない場合は単なるパッケージ種別とみなし、
    /// `{"type": <input>}` に包む。失敗はしない。
    pub fn parse(input: &str) -> Self {
        serde_json::from_str(input).unwrap_or_else(|_| {
            let mut object = PackageObject::new();
            object.insert(
                TYPE_KEY.to_string(),
                PackageInput::Scalar(Value::String(input.to_string())),
            );
            PackageInput::Object(object)
        })
    }

    pub fn string(s: impl Into<String>) -> Self {
        PackageInput::Scalar(Value::String(s.into()))
    }

    /// 指定した種別のパッケージを含むか
    pub fn contains_type(&self, target: &str) -> bool {
        match self {
            PackageInput::Array(items) => items.iter().any(|item| item.contains_type(target)),
            PackageInput::Object(object) => {
                if let Some(PackageInput::Array(packages)) = object.get(PACKAGES_KEY)
                    && packages.iter().any(|item| item.contains_type(target))
                {
                    return true;
                }
                has_type(object, target)
            }
            PackageInput::Scalar(_) => false,
        }
    }

    /// 指定した種別のパッケージオブジェクトすべてに `mutation` を適用
    ///
    /// - 配列: 要素ごとに再帰
    /// - `packages` 配列を持つオブジェクト: その配列の要素にのみ再帰
    /// - `type` が一致するオブジェクト: `mutation` を適用
    /// - それ以外: そのまま
    pub fn transform<F>(self, target: &str, mutation: &F) -> Self
    where
        F: Fn(&mut PackageObject),
    {
        match self {
            PackageInput::Array(items) => PackageInput::Array(
                items
                    .into_iter()
                    .map(|item| item.transform(target, mutation))
                    .collect(),
            ),
            PackageInput::Object(mut object) => {
                if let Some(PackageInput::Array(packages)) = object.get_mut(PACKAGES_KEY) {
                    let items = std::mem::take(packages);
                    *packages = items
                        .into_iter()
                        .map(|item| item.transform(target, mutation))
                        .collect();
                } else if has_type(&object, target) {
                    mutation(&mut object);
                }
                PackageInput::Object(object)
            }
            scalar => scalar,
        }
    }

    /// SBOM にパッケージのサマリーを含めるフラグを立てる
    pub fn inject_summary_in_sbom(self, target: &str) -> Self {
        self.transform(target, &|object: &mut PackageObject| {
            object.insert(
                "include_summary_in_sbom".to_string(),
                PackageInput::Scalar(Value::Bool(true)),
            );
        })
    }

    /// `options.ssl` に SSL 設定をマージする
    ///
    /// 既存の `options.ssl` がオブジェクトならキー単位で上書きし、指定されていないキーは残す。
    /// それ以外は `options` 全体を `{"ssl": ...}` に置き換える。
    pub fn inject_ssl_options(self, target: &str, ssl: &PackageObject) -> Self {
        self.transform(target, &|object: &mut PackageObject| {
            if let Some(PackageInput::Object(options)) = object.get_mut("options")
                && let Some(PackageInput::Object(existing)) = options.get_mut("ssl")
            {
                for (key, value) in ssl {
                    existing.insert(key.clone(), value.clone());
                }
                return;
            }

            let mut options = PackageObject::new();
            options.insert("ssl".to_string(), PackageInput::Object(ssl.clone()));
            object.insert("options".to_string(), PackageInput::Object(options));
        })
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn has_type(object: &PackageObject, target: &str) -> bool {
    matches!(
        object.get(TYPE_KEY),
        Some(PackageInput::Scalar(Value::String(t))) if t == target
    )
}
