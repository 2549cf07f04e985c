//! 接続中のピアのレジストリ

use std::collections::HashMap;

use super::{
    entity::Peer,
    value_object::{CountryCode, PeerId, Purpose, Timestamp},
};

/// 参照可能なピアの属性
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerField {
    CountryCode,
    CountryCodeDetected,
    CountryNameDetected,
    Purpose,
}

/// 変更可能なピアの属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerUpdate {
    CountryCode(Option<CountryCode>),
    Purpose(Purpose),
}

/// 接続中の [`Peer`] とその属性を保持する
///
/// ピアが存在するかどうかはこのレジストリだけで判断する。
#[derive(Debug, Default)]
pub struct ClientRegistry {
    peers: HashMap<PeerId, Peer>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// ピアを登録（同じ ID のエントリは上書き）
    pub fn add(
        &mut self,
        peer_id: PeerId,
        country_code: &str,
        country_name: &str,
        connected_at: Timestamp,
    ) {
        let peer = Peer::new(
            peer_id.clone(),
            country_code.to_string(),
            country_name.to_string(),
            connected_at,
        );
        if self.peers.insert(peer_id, peer).is_some() {
            tracing::debug!("Overwrote existing registry entry");
        }
    }

    /// ピアを削除（存在しない ID は無視）
    pub fn remove(&mut self, peer_id: &str) -> Option<Peer> {
        self.peers.remove(peer_id)
    }

    pub fn has(&self, peer_id: &str) -> bool {
        self.peers.contains_key(peer_id)
    }

    pub fn peer(&self, peer_id: &str) -> Option<&Peer> {
        self.peers.get(peer_id)
    }

    /// ピアの属性を取得
    ///
    /// ID が空・未登録、または値が空の場合は `default` を返す。
    pub fn get(&self, peer_id: &str, field: PeerField, default: &str) -> String {
        let value = self.peer(peer_id).map(|peer| match field {
            PeerField::CountryCode => peer
                .country_code
                .as_ref()
                .map(CountryCode::as_str)
                .unwrap_or_default(),
            PeerField::CountryCodeDetected => peer.country_code_detected.as_str(),
            PeerField::CountryNameDetected => peer.country_name_detected.as_str(),
            PeerField::Purpose => peer.purpose.as_str(),
        });
        match value {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => default.to_string(),
        }
    }

    /// ピアの属性を更新（存在しないピアの場合は何もしない）
    pub fn set(&mut self, peer_id: &str, update: PeerUpdate) {
        let Some(peer) = self.peers.get_mut(peer_id) else {
            return;
        };
        match update {
            PeerUpdate::CountryCode(country_code) => peer.country_code = country_code,
            PeerUpdate::Purpose(purpose) => peer.purpose = purpose,
        }
    }

    pub fn count(&self) -> usize {
        self.peers.len()
    }

    pub fn peers(&self) -> impl Iterator<Item = &Peer> {
        self.peers.values()
    }
}
