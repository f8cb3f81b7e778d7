pub mod catalogue;
pub mod certificate;
pub mod image;
pub mod order_flow;
pub mod slug;
pub mod stats;
