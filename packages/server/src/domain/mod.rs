//! Domain 層：ピア・待機スロットと、コアが依存するインターフェース

pub mod entity;
pub mod error;
pub mod geo;
pub mod matcher;
pub mod message_pusher;
pub mod outbound;
pub mod registry;
pub mod repository;
pub mod signaling;
pub mod value_object;

pub use entity::Peer;
pub use error::{MessagePushError, PeerIdError, RepositoryError};
pub use geo::{GeoLocation, GeoLocator};
pub use matcher::{WaitingKey, WaitingQueueMatcher, WaitingSlot};
pub use message_pusher::{MessagePusher, PusherChannel};
pub use outbound::OutboundMessage;
pub use registry::{ClientRegistry, PeerField, PeerUpdate};
pub use repository::{MatchedPeer, MatchmakingRepository, MatchmakingSnapshot};
pub use signaling::{InboundEnvelope, MessageKind, SignalingMessage};
pub use value_object::{CountryCode, PeerId, Purpose, Timestamp};
