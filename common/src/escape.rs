//! HTMLエスケープ
//!
//! 自由入力欄はすべて `SafeText` に変換してからレイアウトに載せる。
//! 対象は `& < > " '` の5文字。

use std::fmt;

/// エスケープ済みテキスト（`escape` 経由でのみ生成）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafeText(String);

impl SafeText {
    pub fn escape(raw: &str) -> Self {
        Self(escape_html(raw))
    }

    /// 空欄は "-" で表示
    pub fn or_dash(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Self::escape("-")
        } else {
            Self::escape(raw)
        }
    }

    pub fn as_markup(&self) -> &str {
        &self.0
    }

    /// 描画用の元テキスト
    pub fn plain(&self) -> String {
        unescape_html(&self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SafeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const ENTITIES: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&#39;", '\''),
];

/// `escape_html` の逆変換（5エンティティのみ）
pub fn unescape_html(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut rest = escaped;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| rest.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push(*ch);
                rest = &rest[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
