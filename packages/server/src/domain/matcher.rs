//! 待機スロットによるマッチング
//!
//! `(国, 目的)` のキーごとに、待機中のピアを最大 1 人だけ保持するスロットを持つ。
//! FIFO ではない：スロットが埋まっている間に同じキーで要求したピアは待機者とマッチし、
//! スロットが空のときだけ要求者が待機者になる。

use std::collections::HashMap;

use serde::Serialize;

use super::{
    entity::Peer,
    registry::ClientRegistry,
    value_object::{PeerId, Purpose},
};

/// すべての国を受け入れるピアの待機キーの国部分
pub const ANY_COUNTRY: &str = "all";

/// 待機スロットのキー
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct WaitingKey {
    pub country: String,
    pub purpose: Purpose,
}

impl WaitingKey {
    pub fn new(country: impl Into<String>, purpose: Purpose) -> Self {
        Self {
            country: country.into(),
            purpose,
        }
    }

    /// ピアの現在の国フィルタと目的から求めたキー
    pub fn for_peer(peer: &Peer) -> Self {
        let country = peer
            .country_code
            .as_ref()
            .map_or(ANY_COUNTRY, |code| code.as_str());
        Self::new(country, peer.purpose)
    }
}

/// 待機スロット 1 つ分のスナップショット
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitingSlot {
    pub key: WaitingKey,
    pub peer_id: Option<PeerId>,
}

#[derive(Debug, Default)]
pub struct WaitingQueueMatcher {
    slots: HashMap<WaitingKey, Option<PeerId>>,
}

impl WaitingQueueMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// `peer_id` の相手を探す。見つからなければスロットで待機させる
    ///
    /// 同じキーで別の登録済みピアが待機していれば、その ID を返してスロットを空にする。
    /// それ以外は要求者が待機者になり `None` を返す。未登録の要求者の場合は何もしない。
    pub fn next_peer_id(&mut self, registry: &ClientRegistry, peer_id: &str) -> Option<PeerId> {
        let Some(peer) = registry.peer(peer_id) else {
            tracing::debug!("Match requested for unknown peer '{}'", peer_id);
            return None;
        };

        let slot = self.slots.entry(WaitingKey::for_peer(peer)).or_default();
        match slot.take() {
            Some(waiting) if waiting == peer.id => {
                // すでにここで待機中
                *slot = Some(waiting);
                None
            }
            Some(waiting) if registry.has(waiting.as_str()) => Some(waiting),
            Some(stale) => {
                tracing::warn!(
                    "Dropped stale waiting peer '{}' (no longer registered)",
                    stale
                );
                *slot = Some(peer.id.clone());
                None
            }
            None => {
                *slot = Some(peer.id.clone());
                None
            }
        }
    }

    /// `peer_id` が現在のキーで占有しているスロットを解放する
    ///
    /// ピアが未登録、またはそのスロットにいない場合は何もしない。
    pub fn clear_waiting_data(&mut self, registry: &ClientRegistry, peer_id: &str) {
        let Some(peer) = registry.peer(peer_id) else {
            return;
        };
        if let Some(slot) = self.slots.get_mut(&WaitingKey::for_peer(peer))
            && slot.as_ref() == Some(&peer.id)
        {
            *slot = None;
        }
    }

    /// `key` で待機中のピア
    pub fn waiting_peer(&self, key: &WaitingKey) -> Option<&PeerId> {
        self.slots.get(key).and_then(Option::as_ref)
    }

    /// これまでに作られた全スロットのスナップショット（キー順）
    pub fn waiting_slots(&self) -> Vec<WaitingSlot> {
        let mut slots: Vec<WaitingSlot> = self
            .slots
            .iter()
            .map(|(key, peer_id)| WaitingSlot {
                key: key.clone(),
                peer_id: peer_id.clone(),
            })
            .collect();
        slots.sort_by(|a, b| a.key.cmp(&b.key));
        slots
    }
}
