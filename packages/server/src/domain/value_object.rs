//! マッチングドメインの値オブジェクト
//!
//! 生成時に検証・サニタイズを行うため、コアの他の部分でクライアント入力を
//! 再チェックする必要はない。

use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::PeerIdError;

/// トランスポートが割り当てるピア ID
///
/// 英数字の単語を 1 文字の `-` / `_` / 空白で連結した形式。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    /// ピア ID を検証して作成
    pub fn new(value: String) -> Result<Self, PeerIdError> {
        if value.is_empty() {
            return Err(PeerIdError::Empty);
        }
        if !is_well_formed(&value) {
            return Err(PeerIdError::InvalidCharacters(value));
        }
        Ok(Self(value))
    }

    /// ランダムなピア ID を生成（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn is_well_formed(value: &str) -> bool {
    let mut previous_was_separator = true;
    for c in value.chars() {
        match c {
            c if c.is_ascii_alphanumeric() => previous_was_separator = false,
            '-' | '_' | ' ' if !previous_was_separator => previous_was_separator = true,
            _ => return false,
        }
    }
    !previous_was_separator
}

impl TryFrom<String> for PeerId {
    type Error = PeerIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Borrow<str> for PeerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 大文字 2 文字の ISO 3166 国コード
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CountryCode(String);

impl CountryCode {
    /// クライアント入力を国コードにサニタイズ
    ///
    /// 大文字化し、`A-Z` 以外の文字を除去して 2 文字に切り詰める。
    /// 2 文字に満たない場合は `None`（すべての国）になる。
    pub fn sanitize(raw: &str) -> Option<Self> {
        let code: String = raw
            .to_uppercase()
            .chars()
            .filter(|c| c.is_ascii_uppercase())
            .take(2)
            .collect();
        (code.len() == 2).then_some(Self(code))
    }

    /// JSON 値をサニタイズ（文字列以外は `None`）
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_str().and_then(Self::sanitize)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// チャットの目的（マッチングのフィルタとして使う）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    #[default]
    Discussion,
    Dating,
    Language,
    Broadcast,
}

impl Purpose {
    pub const ALL: [Purpose; 4] = [
        Purpose::Discussion,
        Purpose::Dating,
        Purpose::Language,
        Purpose::Broadcast,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Discussion => "discussion",
            Purpose::Dating => "dating",
            Purpose::Language => "language",
            Purpose::Broadcast => "broadcast",
        }
    }

    /// 許可リスト外の値は [`Purpose::Discussion`] にフォールバック
    pub fn sanitize(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }

    /// 文字列以外（`null` を含む）は [`Purpose::Discussion`] にフォールバック
    pub fn from_json(value: &Value) -> Self {
        value.as_str().map(Self::sanitize).unwrap_or_default()
    }
}

impl FromStr for Purpose {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|purpose| purpose.as_str() == s)
            .ok_or(())
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unix タイムスタンプ（ミリ秒、UTC）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
