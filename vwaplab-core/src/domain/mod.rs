//! Domain types for VWAPLab

pub mod bar;
pub mod order;
pub mod position;
pub mod reason;
pub mod trade;

pub use bar::{Bar, RawBar};
pub use order::{OrderStatus, PendingOrder};
pub use position::Position;
pub use reason::{ReasonCode, Side};
pub use trade::Trade;

/// Symbol type alias
pub type Symbol = String;
