//! 단일 옵션 그릭스 명령.

use anyhow::{ensure, Result};
use serde::Serialize;
use signal_analytics::{OptionQuote, OptionsPricingEngine};
use signal_core::OptionType;

/// 그릭스 계산 입력.
#[derive(Debug, Clone, Copy)]
pub struct GreeksCommand {
    pub spot: f64,
    pub strike: f64,
    /// 내재변동성 (퍼센트, 20 = 20%)
    pub iv_pct: f64,
    /// 만기까지 일수
    pub days: u32,
    pub option_type: OptionType,
    /// 무위험 이자율 (연율, 소수)
    pub rate: f64,
}

/// 그릭스 계산 결과.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksOutput {
    pub spot: f64,
    pub strike: f64,
    pub option_type: OptionType,
    pub days_to_expiry: u32,
    pub implied_volatility: f64,
    pub risk_free_rate: f64,
    #[serde(flatten)]
    pub quote: OptionQuote,
}

/// 가격과 그릭스를 계산합니다 (와이어 자릿수로 반올림).
pub fn run_greeks(command: GreeksCommand) -> Result<GreeksOutput> {
    ensure!(
        command.spot.is_finite() && command.spot > 0.0,
        "spot must be a positive number"
    );
    ensure!(
        command.strike.is_finite() && command.strike > 0.0,
        "strike must be a positive number"
    );
    ensure!(command.iv_pct.is_finite(), "iv must be a finite number");

    let quote = OptionsPricingEngine::new(command.rate).quote(
        command.spot,
        command.strike,
        f64::from(command.days) / 365.0,
        command.iv_pct / 100.0,
        command.option_type,
    );

    Ok(GreeksOutput {
        spot: command.spot,
        strike: command.strike,
        option_type: command.option_type,
        days_to_expiry: command.days,
        implied_volatility: command.iv_pct,
        risk_free_rate: command.rate,
        quote: quote.rounded(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atm_call_greeks() {
        let output = run_greeks(GreeksCommand {
            spot: 100.0,
            strike: 100.0,
            iv_pct: 20.0,
            days: 30,
            option_type: OptionType::CE,
            rate: 0.065,
        })
        .unwrap();

        assert_eq!(output.quote.price, 2.56);
        assert!(output.quote.greeks.delta > 0.5);

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["optionType"], "CE");
        assert!(json["delta"].is_number());
    }

    #[test]
    fn test_zero_days_is_intrinsic() {
        let output = run_greeks(GreeksCommand {
            spot: 95.0,
            strike: 100.0,
            iv_pct: 20.0,
            days: 0,
            option_type: OptionType::PE,
            rate: 0.065,
        })
        .unwrap();

        assert_eq!(output.quote.price, 5.0);
        assert_eq!(output.quote.greeks.delta, 0.0);
    }

    #[test]
    fn test_rejects_bad_spot() {
        let result = run_greeks(GreeksCommand {
            spot: -1.0,
            strike: 100.0,
            iv_pct: 20.0,
            days: 10,
            option_type: OptionType::CE,
            rate: 0.065,
        });
        assert!(result.is_err());
    }
}
