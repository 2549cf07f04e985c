//! クライアント IP からの国の解決

use serde::Serialize;

/// 解決できなかった場合の国名
pub const UNKNOWN_COUNTRY_NAME: &str = "Unknown";

/// 国の解決結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoLocation {
    /// ISO 3166 alpha-2 コード（不明な場合は空）
    pub country_code: String,
    pub country_name: String,
}

impl GeoLocation {
    pub fn new(country_code: impl Into<String>, country_name: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            country_name: country_name.into(),
        }
    }

    pub fn unknown() -> Self {
        Self::new("", UNKNOWN_COUNTRY_NAME)
    }
}

/// GeoLocator trait
///
/// IP アドレスを国に解決する。実装は失敗せず、問題があれば
/// [`GeoLocation::unknown`] を返す。
#[cfg_attr(test, mockall::automock)]
pub trait GeoLocator: Send + Sync {
    fn lookup(&self, ip_address: &str) -> GeoLocation;
}
