pub mod atr;
pub mod cci;
pub mod crossover;
pub mod macd;
pub mod sma;

pub use atr::Atr;
pub use cci::Cci;
pub use crossover::CrossOver;
pub use macd::{Ema, Macd, MacdValue};
pub use sma::Sma;
