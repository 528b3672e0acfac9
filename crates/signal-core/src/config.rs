//! 설정 관리.
//!
//! 이 모듈은 분석 엔진 설정을 정의하고 관리합니다.
//! 기본값 → 설정 파일(TOML 등) → `SIGNAL__` 환경 변수 순으로 덮어씁니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{SignalError, SignalResult};

/// 엔진 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EngineConfig {
    /// 앙상블 예측 설정
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// 옵션 분석 설정
    #[serde(default)]
    pub options: OptionsConfig,
    /// 기술적 지표 설정
    #[serde(default)]
    pub technical: TechnicalConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 앙상블 예측 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// 몬테카를로 시뮬레이션 경로 수
    pub simulations: usize,
    /// 앙상블 예측에 필요한 최소 종가 개수
    pub min_points: usize,
    /// 추세 회귀에 사용할 최근 관측치 수
    pub regression_lookback: usize,
    /// ARIMA 적합에 사용할 최근 관측치 수
    pub arima_lookback: usize,
    /// ARIMA 적합에 필요한 최소 관측치 수
    pub arima_min_points: usize,
    /// 모델별 가중치
    pub weights: EnsembleWeights,
    /// 기본 예측 기간 (거래일)
    pub default_horizons: Vec<usize>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            simulations: 10_000,
            min_points: 50,
            regression_lookback: 100,
            arima_lookback: 100,
            arima_min_points: 30,
            weights: EnsembleWeights::default(),
            default_horizons: vec![5, 22, 126],
        }
    }
}

/// 앙상블 모델 가중치 (합계 = 1.0).
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(default)]
pub struct EnsembleWeights {
    /// 몬테카를로 (기본: 0.50)
    pub monte_carlo: f64,
    /// 선형 회귀 (기본: 0.25)
    pub regression: f64,
    /// ARIMA (기본: 0.25)
    pub arima: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            monte_carlo: 0.50,
            regression: 0.25,
            arima: 0.25,
        }
    }
}

impl EnsembleWeights {
    /// 가중치 합계.
    pub fn total(&self) -> f64 {
        self.monte_carlo + self.regression + self.arima
    }
}

/// 옵션 분석 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OptionsConfig {
    /// 무위험 이자율 (연율, 기본: 0.065)
    pub risk_free_rate: f64,
    /// 지지/저항으로 표시할 상위 OI 행사가 수
    pub top_strikes: usize,
    /// OTM 판정 밴드 (현물 대비 비율, 기본: 0.03)
    pub otm_band: f64,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.065,
            top_strikes: 5,
            otm_band: 0.03,
        }
    }
}

/// 기술적 지표 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TechnicalConfig {
    /// 지지/저항 탐색 기간 (봉 개수)
    pub support_resistance_lookback: usize,
    /// 응답에 포함할 원시 시계열 길이
    pub series_tail: usize,
}

impl Default for TechnicalConfig {
    fn default() -> Self {
        Self {
            support_resistance_lookback: 60,
            series_tail: 30,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl EngineConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> SignalResult<Self> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .add_source(config::Config::try_from(&EngineConfig::default())?)
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("SIGNAL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: EngineConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> SignalResult<Self> {
        Self::load("config/default.toml")
    }

    /// 설정값의 일관성을 검증합니다.
    pub fn validate(&self) -> SignalResult<()> {
        if self.forecast.simulations == 0 {
            return Err(SignalError::Config(
                "forecast.simulations는 0보다 커야 합니다".to_string(),
            ));
        }

        let total = self.forecast.weights.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(SignalError::Config(format!(
                "앙상블 가중치 합계는 1.0이어야 합니다 (현재 {:.4})",
                total
            )));
        }

        if !self.options.risk_free_rate.is_finite() {
            return Err(SignalError::Config(
                "options.risk_free_rate가 유한한 값이 아닙니다".to_string(),
            ));
        }

        if self.forecast.default_horizons.iter().any(|h| *h == 0) {
            return Err(SignalError::Config(
                "예측 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.forecast.simulations, 10_000);
        assert_eq!(config.forecast.default_horizons, vec![5, 22, 126]);
        assert!((config.options.risk_free_rate - 0.065).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut config = EngineConfig::default();
        config.forecast.weights.arima = 0.5;
        assert!(matches!(config.validate(), Err(SignalError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = EngineConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.forecast.min_points, 50);
        assert_eq!(config.options.top_strikes, 5);
    }
}
