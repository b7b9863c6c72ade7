//! 現在天気の取得（Open-Meteo互換API）

use crate::error::{ReportError, Result};
use daily_report_common::{Entry, WeatherReading};
use serde::Deserialize;

/// 取得できなかったときの天気欄
pub const WEATHER_UNAVAILABLE: &str = "Weather unavailable";

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,precipitation,weather_code,wind_speed_10m";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentBlock,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    precipitation: f64,
    weather_code: i64,
    wind_speed_10m: f64,
}

impl From<CurrentBlock> for WeatherReading {
    fn from(c: CurrentBlock) -> Self {
        Self {
            temperature: c.temperature_2m,
            humidity: c.relative_humidity_2m,
            apparent_temperature: c.apparent_temperature,
            precipitation: c.precipitation,
            weather_code: c.weather_code,
            wind_speed: c.wind_speed_10m,
        }
    }
}

pub struct WeatherClient {
    client: reqwest::Client,
    endpoint: String,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub async fn current(&self, latitude: f64, longitude: f64) -> Result<WeatherReading> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ReportError::LookupFailure(format!(
                "座標が範囲外です ({}, {})",
                latitude, longitude
            )));
        }

        let response: ForecastResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ReportError::LookupFailure(e.to_string()))?
            .json()
            .await
            .map_err(|e| ReportError::LookupFailure(e.to_string()))?;

        Ok(response.current.into())
    }
}

/// 取得結果を天気欄に反映
///
/// 失敗時は入力済みの文字を残し、空欄なら「取得不可」を入れる。
pub fn fill_weather(entry: &mut Entry, result: Result<WeatherReading>) {
    match result {
        Ok(reading) => entry.weather = reading.summary(),
        Err(e) => {
            log::warn!("天気を取得できませんでした: {}", e);
            if entry.weather.trim().is_empty() {
                entry.weather = WEATHER_UNAVAILABLE.to_string();
            }
        }
    }
}
