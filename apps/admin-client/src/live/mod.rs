//! Live order updates pushed over a WebSocket.

pub mod channel;
pub mod connector;
pub mod events;
pub mod reconnect;

pub use channel::{ChannelState, LiveChannel};
pub use connector::{Connector, Transport, WsConnector};
pub use events::{Frame, LiveEvent};
pub use reconnect::ReconnectPolicy;
