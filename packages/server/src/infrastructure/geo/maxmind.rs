//! オフラインの MaxMind 国データベース（`.mmdb`）を使った GeoLocator 実装

use std::{net::IpAddr, path::Path};

use maxminddb::{Reader, geoip2};

use crate::domain::{GeoLocation, GeoLocator, geo::UNKNOWN_COUNTRY_NAME};

/// GeoLite2 / GeoIP2 Country データベースから国を検索する
///
/// データベースは起動時に一度だけメモリに読み込みます。
/// 読み込めなかった場合、すべての検索は [`GeoLocation::unknown`] を返します。
pub struct MaxMindGeoLocator {
    reader: Option<Reader<Vec<u8>>>,
}

impl MaxMindGeoLocator {
    /// `path` のデータベースを読み込む（失敗時は常に不明を返す）
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Reader::open_readfile(path) {
            Ok(reader) => {
                tracing::info!(
                    "Loaded GeoIP database {} ({})",
                    path.display(),
                    reader.metadata.database_type
                );
                Self {
                    reader: Some(reader),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "GeoIP database {} unavailable, countries will be reported as unknown: {}",
                    path.display(),
                    e
                );
                Self::unavailable()
            }
        }
    }

    /// データベースなしの GeoLocator
    pub fn unavailable() -> Self {
        Self { reader: None }
    }

    pub fn is_available(&self) -> bool {
        self.reader.is_some()
    }
}

impl GeoLocator for MaxMindGeoLocator {
    fn lookup(&self, ip_address: &str) -> GeoLocation {
        let Some(reader) = &self.reader else {
            return GeoLocation::unknown();
        };
        let address = match ip_address.trim().parse::<IpAddr>() {
            Ok(address) => address.to_canonical(),
            Err(_) => {
                tracing::debug!("Cannot geo-locate unparsable address '{}'", ip_address);
                return GeoLocation::unknown();
            }
        };

        match reader.lookup::<geoip2::Country>(address) {
            Ok(record) => record
                .country
                .and_then(|country| {
                    let code = country.iso_code?;
                    let name = country
                        .names
                        .as_ref()
                        .and_then(|names| names.get("en").copied())
                        .unwrap_or(UNKNOWN_COUNTRY_NAME);
                    Some(GeoLocation::new(code, name))
                })
                .unwrap_or_else(GeoLocation::unknown),
            Err(e) => {
                tracing::debug!("No GeoIP record for {}: {}", address, e);
                GeoLocation::unknown()
            }
        }
    }
}
