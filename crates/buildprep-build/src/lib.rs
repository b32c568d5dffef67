//! buildprep ビルド入力の解決
//!
//! イメージビルダーやアーティファクトプッシャーを呼び出す前に、
//! Containerfile の探索、ビルドシークレットの解決、レジストリ認証の選択を行います。

pub mod auth;
pub mod containment;
pub mod dockerfile;
pub mod error;
pub mod image_ref;
pub mod secrets;

pub use auth::{AuthFile, RegistryAuth, RegistryAuthSelector, extract_credentials};
pub use dockerfile::{DockerfileLocator, DockerfileSearch, search_dockerfile};
pub use error::{BuildError, BuildResult};
pub use secrets::{SecretDir, SecretDirResolver, SecretMapping, parse_secret_dirs};
