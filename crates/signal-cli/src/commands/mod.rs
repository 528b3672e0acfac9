//! CLI 명령어 구현 모듈.

pub mod forecast;
pub mod greeks;
pub mod options;
pub mod technical;

pub use forecast::{run_forecast, ForecastCommand, ForecastOutput};
pub use greeks::{run_greeks, GreeksCommand, GreeksOutput};
pub use options::{run_options, OptionsOutput};
pub use technical::{run_technical, TechnicalOutput};
