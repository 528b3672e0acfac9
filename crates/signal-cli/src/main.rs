//! 시그널 분석 엔진 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 5/22/126 거래일 앙상블 예측
//! signal forecast -s NIFTY -d data --horizons 5,22,126 --seed 42
//!
//! # 기술적 지표와 종합 시그널
//! signal technical -s NIFTY -d data
//!
//! # 옵션 체인 분석 (가장 가까운 만기)
//! signal options -s NIFTY -d data --as-of 2024-04-15
//!
//! # 단일 옵션 그릭스
//! signal greeks --spot 22150 --strike 22200 --iv 14.5 --days 10 --option-type CE
//! ```
//!
//! 결과 JSON은 stdout으로, 로그는 stderr로 출력됩니다.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use signal_cli::commands::{
    run_forecast, run_greeks, run_options, run_technical, ForecastCommand, GreeksCommand,
};
use signal_core::{init_logging, EngineConfig, ForecastHorizon, LogConfig, OptionType};
use signal_data::JsonFileProvider;
use tracing::debug;

#[derive(Parser)]
#[command(name = "signal")]
#[command(about = "Market signal analytics - 예측, 기술적 지표, 옵션 포지셔닝", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값 + SIGNAL__ 환경 변수)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: String,

    /// 한 줄 JSON으로 출력
    #[arg(long, global = true, default_value = "false")]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 앙상블 가격 예측 (몬테카를로 + 추세 회귀 + ARIMA)
    Forecast {
        /// 종목 심볼 (예: NIFTY)
        #[arg(short, long)]
        symbol: String,

        /// 데이터 디렉터리 (<SYMBOL>.bars.json)
        #[arg(short, long)]
        data_dir: String,

        /// 예측 기간 (거래일, 쉼표로 구분)
        #[arg(long, value_delimiter = ',', value_parser = parse_horizon)]
        horizons: Vec<ForecastHorizon>,

        /// 난수 시드 (재현 가능한 몬테카를로)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// 기술적 지표와 종합 시그널
    Technical {
        /// 종목 심볼
        #[arg(short, long)]
        symbol: String,

        /// 데이터 디렉터리
        #[arg(short, long)]
        data_dir: String,
    },

    /// 옵션 체인 분석
    Options {
        /// 종목 심볼
        #[arg(short, long)]
        symbol: String,

        /// 데이터 디렉터리 (<SYMBOL>.chain.json)
        #[arg(short, long)]
        data_dir: String,

        /// 만기일 (YYYY-MM-DD, 기본: 가장 가까운 만기)
        #[arg(short, long, value_parser = parse_date)]
        expiry: Option<NaiveDate>,

        /// 기준일 (YYYY-MM-DD, 기본: 오늘)
        #[arg(long, value_parser = parse_date)]
        as_of: Option<NaiveDate>,
    },

    /// 단일 옵션 Black–Scholes 가격과 그릭스
    Greeks {
        /// 현물 가격
        #[arg(long)]
        spot: f64,

        /// 행사가
        #[arg(long)]
        strike: f64,

        /// 내재변동성 (퍼센트, 예: 14.5)
        #[arg(long)]
        iv: f64,

        /// 만기까지 일수
        #[arg(long)]
        days: u32,

        /// 옵션 유형 (CE, PE)
        #[arg(long)]
        option_type: OptionType,

        /// 무위험 이자율 (기본: 설정값)
        #[arg(long)]
        rate: Option<f64>,
    },
}

fn parse_horizon(s: &str) -> Result<ForecastHorizon, String> {
    let steps: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid horizon: {}. Expected a positive integer", s))?;
    ForecastHorizon::new(steps).map_err(|e| e.to_string())
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format: {}. Expected YYYY-MM-DD", s))
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{}", text);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env는 있으면 로드
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = EngineConfig::load(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    init_logging(LogConfig::from_engine(&config.logging))
        .map_err(|e| anyhow!("failed to initialize logging: {}", e))?;
    debug!(config = %cli.config, "Configuration loaded");

    match cli.command {
        Commands::Forecast {
            symbol,
            data_dir,
            horizons,
            seed,
        } => {
            let provider = JsonFileProvider::new(data_dir);
            let output = run_forecast(
                &provider,
                &config.forecast,
                ForecastCommand {
                    symbol,
                    horizons,
                    seed,
                },
            )
            .await?;
            print_json(&output, cli.compact)?;
        }

        Commands::Technical { symbol, data_dir } => {
            let provider = JsonFileProvider::new(data_dir);
            let output = run_technical(&provider, &config.technical, &symbol).await?;
            print_json(&output, cli.compact)?;
        }

        Commands::Options {
            symbol,
            data_dir,
            expiry,
            as_of,
        } => {
            let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
            let provider = JsonFileProvider::new(data_dir).with_as_of(as_of);
            let output = run_options(&provider, &config.options, &symbol, expiry, as_of).await?;
            print_json(&output, cli.compact)?;
        }

        Commands::Greeks {
            spot,
            strike,
            iv,
            days,
            option_type,
            rate,
        } => {
            let output = run_greeks(GreeksCommand {
                spot,
                strike,
                iv_pct: iv,
                days,
                option_type,
                rate: rate.unwrap_or(config.options.risk_free_rate),
            })?;
            print_json(&output, cli.compact)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_forecast_horizons() {
        let cli = Cli::try_parse_from([
            "signal", "forecast", "-s", "NIFTY", "-d", "data", "--horizons", "5,22,126",
        ])
        .unwrap();
        match cli.command {
            Commands::Forecast { horizons, .. } => {
                let steps: Vec<usize> = horizons.iter().map(|h| h.steps()).collect();
                assert_eq!(steps, vec![5, 22, 126]);
            }
            _ => panic!("expected forecast command"),
        }

        assert!(Cli::try_parse_from([
            "signal", "forecast", "-s", "NIFTY", "-d", "data", "--horizons", "0",
        ])
        .is_err());
    }

    #[test]
    fn test_parse_greeks_option_type() {
        let cli = Cli::try_parse_from([
            "signal", "greeks", "--spot", "100", "--strike", "100", "--iv", "20", "--days", "30",
            "--option-type", "put",
        ])
        .unwrap();
        assert_eq!(cli.config, "config/default.toml");
        match cli.command {
            Commands::Greeks { option_type, rate, .. } => {
                assert_eq!(option_type, OptionType::PE);
                assert!(rate.is_none());
            }
            _ => panic!("expected greeks command"),
        }
    }

    #[test]
    fn test_parse_options_dates() {
        let cli = Cli::try_parse_from([
            "signal", "--compact", "options", "-s", "NIFTY", "-d", "data", "--as-of", "2024-04-15",
        ])
        .unwrap();
        assert!(cli.compact);
        match cli.command {
            Commands::Options { expiry, as_of, .. } => {
                assert!(expiry.is_none());
                assert_eq!(as_of, NaiveDate::from_ymd_opt(2024, 4, 15));
            }
            _ => panic!("expected options command"),
        }
    }
}
