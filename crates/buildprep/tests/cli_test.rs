#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! へ移行

use assert_cmd::Command;
use base64::Engine;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn buildprep() -> Command {
    let mut cmd = Command::cargo_bin("buildprep").unwrap();
    for var in [
        "BUILDPREP_SOURCE",
        "BUILDPREP_CONTEXT",
        "BUILDPREP_CONTAINERFILE",
        "BUILDPREP_SECRET_DIRS",
        "BUILDPREP_AUTHFILE",
        "BUILDPREP_PREFETCH_INPUT",
        "BUILDPREP_RHSM_ENTITLEMENT_DIR",
        "BUILDPREP_IMAGE_DIGEST",
        "BUILDPREP_TAG_SUFFIX",
        "BUILDPREP_TAGS",
        "BUILDPREP_TAGS_FROM_IMAGE_LABEL",
        "BUILDPREP_TAGS_LABEL_VALUE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// CLIヘルプが正しく表示されることを確認
#[test]
fn test_cli_help() {
    buildprep()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("containerfile"))
        .stdout(predicate::str::contains("secrets"))
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("prefetch-input"))
        .stdout(predicate::str::contains("image-ref"));
}

/// バージョン表示が正しく動作することを確認
#[test]
fn test_cli_version() {
    buildprep()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("buildprep"));
}

/// Containerfile が見つかった場合はパスを出力
#[test]
fn test_containerfile_found() {
    let source = tempdir().unwrap();
    fs::write(source.path().join("Containerfile"), "FROM scratch\n").unwrap();

    buildprep()
        .arg("containerfile")
        .arg("--source")
        .arg(source.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Containerfile"));
}

/// ソース外を指す Containerfile はエラー
#[test]
fn test_containerfile_escape_fails() {
    let root = tempdir().unwrap();
    let source = root.path().join("source");
    fs::create_dir(&source).unwrap();
    fs::write(root.path().join("Containerfile"), "FROM scratch\n").unwrap();

    buildprep()
        .arg("containerfile")
        .arg("--source")
        .arg(&source)
        .arg("--containerfile")
        .arg("../Containerfile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

/// Containerfile が無いことはエラーではない
#[test]
fn test_containerfile_not_found() {
    let source = tempdir().unwrap();

    buildprep()
        .arg("containerfile")
        .arg("--source")
        .arg(source.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("見つかりません"));
}

/// シークレットディレクトリが --secret 引数に変換されることを確認
#[test]
fn test_secrets_build_args() {
    let root = tempdir().unwrap();
    let dir = root.path().join("creds");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("token"), "secret").unwrap();

    buildprep()
        .arg("secrets")
        .arg("--secret-dirs")
        .arg(format!("src={},name=app", dir.display()))
        .assert()
        .success()
        .stdout(predicate::str::contains("id=app/token"))
        .stdout(predicate::str::starts_with("--secret=src="));
}

/// 環境変数では改行区切りで指定し、パス中の空白は分割しない
#[test]
fn test_secrets_from_env_with_space_in_path() {
    let root = tempdir().unwrap();
    let first = root.path().join("my creds");
    let second = root.path().join("other");
    for dir in [&first, &second] {
        fs::create_dir(dir).unwrap();
        fs::write(dir.join("token"), "secret").unwrap();
    }

    buildprep()
        .arg("secrets")
        .env(
            "BUILDPREP_SECRET_DIRS",
            format!("{}\n{}", first.display(), second.display()),
        )
        .assert()
        .success()
        .stdout(predicate::str::contains("id=my creds/token"))
        .stdout(predicate::str::contains("id=other/token"));
}

/// 重複したシークレットIDはエラー
#[test]
fn test_secrets_duplicate_id_fails() {
    let root = tempdir().unwrap();
    for name in ["a", "b"] {
        let dir = root.path().join(name).join("creds");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("token"), "secret").unwrap();
    }

    buildprep()
        .arg("secrets")
        .arg("--secret-dirs")
        .arg(root.path().join("a/creds"))
        .arg(root.path().join("b/creds"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("creds/token"));
}

/// 認証はレジストリとユーザー名のみ出力し、パスワードは出力しない
#[test]
fn test_auth_prints_username_only() {
    let root = tempdir().unwrap();
    let authfile = root.path().join("auth.json");
    let token = base64::engine::general_purpose::STANDARD.encode("robot:hunter2");
    let content = serde_json::json!({
        "auths": {
            "quay.io": {"auth": "ZmFsbGJhY2s6eA=="},
            "quay.io/org": {"auth": token}
        }
    });
    fs::write(&authfile, content.to_string()).unwrap();

    buildprep()
        .arg("auth")
        .arg("quay.io/org/app:v1")
        .arg("--authfile")
        .arg(&authfile)
        .assert()
        .success()
        .stdout(predicate::str::contains("registry: quay.io"))
        .stdout(predicate::str::contains("username: robot"))
        .stdout(predicate::str::contains("hunter2").not());
}

/// レジストリ単位の認証ファイルとして出力
#[test]
fn test_auth_registry_auth_json() {
    let root = tempdir().unwrap();
    let authfile = root.path().join("auth.json");
    let token = base64::engine::general_purpose::STANDARD.encode("robot:hunter2");
    let content = serde_json::json!({
        "auths": {
            "quay.io": {"auth": "ZmFsbGJhY2s6eA=="},
            "quay.io/org/app": {"auth": &token}
        }
    });
    fs::write(&authfile, content.to_string()).unwrap();

    let output = buildprep()
        .arg("auth")
        .arg("quay.io/org/app:v1")
        .arg("--authfile")
        .arg(&authfile)
        .arg("--registry-auth-json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"auths": {"quay.io": {"auth": token}}})
    );
}

/// 一致する認証がない場合はエラー
#[test]
fn test_auth_not_configured() {
    let root = tempdir().unwrap();
    let authfile = root.path().join("auth.json");
    fs::write(&authfile, r#"{"auths": {}}"#).unwrap();

    buildprep()
        .arg("auth")
        .arg("quay.io/org/app")
        .arg("--authfile")
        .arg(&authfile)
        .assert()
        .failure()
        .stderr(predicate::str::contains("quay.io/org/app"));
}

/// RPM 入力に SBOM サマリーフラグが付与されることを確認
#[test]
fn test_prefetch_input_rpm() {
    buildprep()
        .arg("prefetch-input")
        .arg("rpm")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"type":"rpm","include_summary_in_sbom":true}"#,
        ));
}

/// RPM 以外の入力はそのまま出力
#[test]
fn test_prefetch_input_passthrough() {
    buildprep()
        .arg("prefetch-input")
        .arg(r#"{"type":"gomod","path":"."}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"type":"gomod","path":"."}"#));
}

/// プリフェッチ設定から Go プロキシ指定を除去して出力
#[test]
fn test_prefetch_config_drops_go_proxy() {
    let root = tempdir().unwrap();
    let config = root.path().join("config.yaml");
    fs::write(
        &config,
        "gomod:\n  proxy_url: https://proxy.example.com\n  x: 1\ngoproxy_url: https://old\n",
    )
    .unwrap();

    buildprep()
        .arg("prefetch-config")
        .arg(&config)
        .assert()
        .success()
        .stdout("gomod:\n  x: 1\n");
}

/// 出力先を指定した場合はファイルに書き込む
#[test]
fn test_prefetch_config_writes_output_file() {
    let root = tempdir().unwrap();
    let config = root.path().join("config.yaml");
    let output = root.path().join("filtered.yaml");
    fs::write(&config, "goproxy_url: https://old\npip: {}\n").unwrap();

    buildprep()
        .arg("prefetch-config")
        .arg(&config)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(&output).unwrap(), "pip: {}\n");
}

/// イメージ参照の検証とアーティファクトタグの生成
#[test]
fn test_image_ref_artifact_tag() {
    let digest = format!("sha256:{}", "a".repeat(64));

    buildprep()
        .arg("image-ref")
        .arg("quay.io/org/app:v1")
        .arg("--digest")
        .arg(&digest)
        .assert()
        .success()
        .stdout(predicate::str::contains("quay.io/org/app\n"))
        .stdout(predicate::str::contains(format!(
            "quay.io/org/app:sha256-{}.containerfile",
            "a".repeat(64)
        )))
        .stdout(predicate::str::contains(
            "application/vnd.konflux.containerfile",
        ));
}

/// 不正なイメージ名はエラー
#[test]
fn test_image_ref_invalid() {
    buildprep()
        .arg("image-ref")
        .arg("Quay.io/Org/App")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

/// 指定したタグとラベル値のタグを出力
#[test]
fn test_image_ref_tags_from_label() {
    buildprep()
        .arg("image-ref")
        .arg("quay.io/org/app")
        .arg("--tags")
        .arg("v1")
        .arg("--tags-from-image-label")
        .arg("konflux.additional-tags")
        .arg("--tags-label-value")
        .arg("v2, latest")
        .assert()
        .success()
        .stdout(predicate::str::contains("quay.io/org/app:v1\n"))
        .stdout(predicate::str::contains("quay.io/org/app:v2\n"))
        .stdout(predicate::str::contains("quay.io/org/app:latest\n"));
}

/// 不正なラベル名はエラー
#[test]
fn test_image_ref_invalid_label_name() {
    buildprep()
        .arg("image-ref")
        .arg("quay.io/org/app")
        .arg("--tags-from-image-label")
        .arg("Bad--Label")
        .arg("--tags-label-value")
        .arg("v1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Bad--Label"));
}

/// 不正なタグはエラー
#[test]
fn test_image_ref_invalid_tag() {
    buildprep()
        .arg("image-ref")
        .arg("quay.io/org/app")
        .arg("--tags")
        .arg(".hidden")
        .assert()
        .failure()
        .stderr(predicate::str::contains(".hidden"));
}
