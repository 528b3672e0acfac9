//! 수익률 예측 모듈.
//!
//! - [`monte_carlo`]: 기하 브라운 운동 경로 시뮬레이션
//! - [`regression`]: 최소제곱 추세 외삽
//! - [`arima`]: ARIMA(2,1,2) 예측과 변동성 대체 구간
//! - [`ensemble`]: 세 모델의 가중 결합, 신뢰도, 리스크 수준
//! - [`runner`]: 여러 기간의 비동기 병렬 실행

pub mod arima;
pub mod ensemble;
pub mod monte_carlo;
pub mod regression;
pub mod runner;

pub use arima::{ArimaForecaster, ArimaModel, ArimaOutcome};
pub use ensemble::{confidence_score, EnsembleForecastEngine, EnsembleReport, ModelBreakdown};
pub use monte_carlo::{MonteCarloOutcome, MonteCarloSimulator};
pub use regression::{fit_linear, LinearFit, TrendRegressor};
pub use runner::{ForecastRunner, HorizonForecast};
