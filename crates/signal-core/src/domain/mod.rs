//! 분석 엔진의 도메인 모델.

mod forecast;
mod market_data;
mod options;
mod random;
mod signal;
mod statistics;

pub use forecast::*;
pub use market_data::*;
pub use options::*;
pub use random::*;
pub use signal::*;
pub use statistics::*;
