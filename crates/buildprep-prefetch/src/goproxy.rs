//! プリフェッチツール設定からの Go プロキシ指定の除去
//!
//! プリフェッチツールの YAML 設定に Go モジュールのプロキシが書かれていると
//! 取得元が固定されてしまうため、設定を渡す前に取り除く。

/// `goproxy_url:`（トップレベル）と、`gomod:` ブロック内の `proxy_url:` を除いた設定を返す
///
/// YAML としてはパースせず行単位で処理する（コメントや書式を保つため）。
/// `gomod:` ブロックはインデントされた行が続く間とみなす。
pub fn drop_go_proxy(content: &str) -> String {
    let mut kept = Vec::new();
    let mut in_gomod_block = false;

    for line in content.split('\n') {
        let trimmed = line.trim();

        if trimmed.starts_with("goproxy_url:") {
            continue;
        }

        if trimmed.starts_with("gomod:") {
            in_gomod_block = true;
            kept.push(line);
            continue;
        }

        if in_gomod_block {
            if !line.starts_with(' ') && !line.starts_with('\t') {
                in_gomod_block = false;
            } else if trimmed.starts_with("proxy_url:") {
                continue;
            }
        }

        kept.push(line);
    }

    kept.join("\n")
}
