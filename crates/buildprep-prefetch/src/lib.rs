//! 依存関係プリフェッチの入力調整
//!
//! ユーザーが指定したパッケージマネージャー入力を解釈し、プリフェッチツールに
//! 渡す前に必要なフィールドを補います。

pub mod error;
pub mod goproxy;
pub mod input;
pub mod rpm;

pub use error::{PrefetchError, Result};
pub use goproxy::drop_go_proxy;
pub use input::{PackageInput, PackageObject};
pub use rpm::{EntitlementCerts, RPM, RpmInputPreparer};
