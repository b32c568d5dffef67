//! RPM パッケージ向けの入力調整
//!
//! RPM のプリフェッチには SBOM のサマリーフラグと、エンタイトルメント証明書を使った
//! SSL 設定が必要になる。subscription-manager への登録自体は外部コマンドの役割で、
//! ここでは登録後に置かれた証明書を探して入力へ反映するだけ。

use crate::error::{PrefetchError, Result};
use crate::input::{PackageInput, PackageObject};
use std::path::{Path, PathBuf};
use tracing::Span;

/// RPM のパッケージ種別
pub const RPM: &str = "rpm";

/// エンタイトルメント証明書（クライアント鍵と証明書）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementCerts {
    pub client_key: PathBuf,
    pub client_cert: PathBuf,
}

impl EntitlementCerts {
    /// ディレクトリ内の `*.pem` から鍵と証明書を探す
    ///
    /// `-key.pem` で終わるファイルが鍵、それ以外が証明書。どちらかが欠けていれば `None`。
    /// 読めないエントリは無視する。
    pub fn find(dir: &Path) -> Result<Option<Self>> {
        let pattern = dir.join("*.pem");
        let mut client_key = None;
        let mut client_cert = None;

        for path in glob::glob(&pattern.to_string_lossy())?.flatten() {
            let is_key = path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with("-key.pem"));
            if is_key {
                client_key = Some(path);
            } else {
                client_cert = Some(path);
            }
        }

        match (client_key, client_cert) {
            (Some(client_key), Some(client_cert)) => Ok(Some(Self {
                client_key,
                client_cert,
            })),
            _ => Ok(None),
        }
    }

    /// RPM の `options.ssl` に入れる設定
    pub fn ssl_options(&self, ca_bundle: &Path) -> PackageObject {
        [
            ("client_key", self.client_key.as_path()),
            ("client_cert", self.client_cert.as_path()),
            ("ca_bundle", ca_bundle),
        ]
        .into_iter()
        .map(|(key, path)| {
            (
                key.to_string(),
                PackageInput::string(path.to_string_lossy()),
            )
        })
        .collect()
    }
}

/// RPM 入力の調整を行う
#[derive(Debug)]
pub struct RpmInputPreparer {
    ca_bundle: PathBuf,
    span: Span,
}

impl Default for RpmInputPreparer {
    fn default() -> Self {
        Self::new()
    }
}

impl RpmInputPreparer {
    pub fn new() -> Self {
        Self {
            ca_bundle: PathBuf::from(buildprep_config::RHSM_CA_BUNDLE),
            span: Span::none(),
        }
    }

    pub fn with_ca_bundle(mut self, ca_bundle: impl Into<PathBuf>) -> Self {
        self.ca_bundle = ca_bundle.into();
        self
    }

    /// ログの親スパンを指定
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// RPM パッケージを含む入力を調整する
    ///
    /// RPM を含まない入力はそのまま返す。`entitlement_dir` が指定された場合は
    /// 証明書が見つからなければエラー。
    pub fn prepare(
        &self,
        input: PackageInput,
        entitlement_dir: Option<&Path>,
    ) -> Result<PackageInput> {
        if !input.contains_type(RPM) {
            tracing::debug!(parent: &self.span, "No RPM packages in prefetch input");
            return Ok(input);
        }

        let input = input.inject_summary_in_sbom(RPM);

        let Some(dir) = entitlement_dir else {
            return Ok(input);
        };

        let certs = EntitlementCerts::find(dir)?
            .ok_or_else(|| PrefetchError::EntitlementCertsNotFound(dir.to_path_buf()))?;

        tracing::debug!(
            parent: &self.span,
            "Using entitlement certificates {} and {}",
            certs.client_key.display(),
            certs.client_cert.display()
        );

        Ok(input.inject_ssl_options(RPM, &certs.ssl_options(&self.ca_bundle)))
    }
}
