pub mod request;
pub mod response;

pub use request::{Channel, ChannelSubscription, SubscribeOptions, SubscribeRequest};
pub use response::{MessageKind, StreamMessage};
