use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar of the traded instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub pair: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Opaque handle identifying a submitted order.
pub type OrderId = String;

/// A market order handed to the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub pair: String,
    pub side: OrderSide,
    pub size: f64,
}

impl Order {
    pub fn market(pair: impl Into<String>, side: OrderSide, size: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            pair: pair.into(),
            side,
            size,
        }
    }
}

/// Execution of an order by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub pair: String,
    pub side: OrderSide,
    pub fill_price: f64,
    pub size: f64,
    pub timestamp: DateTime<Utc>,
}

/// Broker-side lifecycle of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Submitted,
    Accepted,
    Partial,
    Completed,
    Canceled,
    /// Not enough cash to honour the order.
    Margin,
    Rejected,
    Expired,
}

impl OrderStatus {
    /// True while the broker may still act on the order.
    pub fn is_alive(self) -> bool {
        matches!(
            self,
            OrderStatus::Submitted | OrderStatus::Accepted | OrderStatus::Partial
        )
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Submitted => "submitted",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Partial => "partial",
            OrderStatus::Completed => "completed",
            OrderStatus::Canceled => "canceled",
            OrderStatus::Margin => "margin",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Expired => "expired",
        };
        write!(f, "{s}")
    }
}

/// Status change reported by the broker for a previously submitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub order_id: OrderId,
    pub side: OrderSide,
    pub status: OrderStatus,
    /// Bar on which the broker reported the change.
    pub timestamp: DateTime<Utc>,
    /// Present only when `status == Completed`.
    pub fill: Option<Fill>,
}

impl OrderNotification {
    pub fn new(order: &Order, status: OrderStatus, timestamp: DateTime<Utc>) -> Self {
        Self {
            order_id: order.id.clone(),
            side: order.side,
            status,
            timestamp,
            fill: None,
        }
    }

    pub fn completed(order: &Order, fill: Fill) -> Self {
        Self {
            order_id: order.id.clone(),
            side: order.side,
            status: OrderStatus::Completed,
            timestamp: fill.timestamp,
            fill: Some(fill),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.status.is_alive()
    }
}
