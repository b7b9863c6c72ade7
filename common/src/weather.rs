//! 天気コード変換
//!
//! WMO天気コード → 表示文字列、および現在天気の要約文

use serde::{Deserialize, Serialize};

/// 未知コードの表示
pub const UNKNOWN_WEATHER: &str = "Weather";

pub fn describe_weather_code(code: i64) -> &'static str {
    match code {
        0 => "Clear",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => UNKNOWN_WEATHER,
    }
}

/// 現在の天気
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReading {
    /// 気温（℃）
    pub temperature: f64,
    /// 湿度（%）
    pub humidity: f64,
    /// 体感温度（℃）
    pub apparent_temperature: f64,
    /// 降水量（mm）
    pub precipitation: f64,
    pub weather_code: i64,
    /// 風速（km/h）
    pub wind_speed: f64,
}

impl WeatherReading {
    /// 日報の天気欄に入れる要約
    pub fn summary(&self) -> String {
        format!(
            "{}, {:.0}°C (feels like {:.0}°C), humidity {:.0}%, wind {:.0} km/h, precip {:.1} mm",
            describe_weather_code(self.weather_code),
            self.temperature,
            self.apparent_temperature,
            self.humidity,
            self.wind_speed,
            self.precipitation,
        )
    }
}
