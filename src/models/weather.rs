use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Weather {
    pub date: NaiveDate,
    pub temperature: i32,
    pub condition: String,
    pub icon: String,
    pub humidity: u8,
    pub wind_speed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCondition {
    pub condition: &'static str,
    pub icon: &'static str,
}

/// WMO weather interpretation codes (0-99) as used by Open-Meteo.
pub fn describe_weather_code(code: u8, is_day: bool) -> WeatherCondition {
    let (condition, day_icon, night_icon) = match code {
        0 => ("Clear Sky", "clear-day", "clear-night"),
        1 => ("Mainly Clear", "clear-day", "clear-night"),
        2 => ("Partly Cloudy", "partly-cloudy-day", "partly-cloudy-night"),
        3 => ("Overcast", "cloudy", "cloudy"),
        45 => ("Fog", "fog", "fog"),
        48 => ("Depositing Rime Fog", "fog", "fog"),
        51 => ("Light Drizzle", "rain", "rain"),
        53 => ("Moderate Drizzle", "rain", "rain"),
        55 => ("Dense Drizzle", "rain", "rain"),
        56 => ("Light Freezing Drizzle", "rain", "rain"),
        57 => ("Dense Freezing Drizzle", "rain", "rain"),
        61 => ("Slight Rain", "rain", "rain"),
        63 => ("Moderate Rain", "rain", "rain"),
        65 => ("Heavy Rain", "rain", "rain"),
        66 => ("Light Freezing Rain", "rain", "rain"),
        67 => ("Heavy Freezing Rain", "rain", "rain"),
        71 => ("Slight Snow Fall", "snow", "snow"),
        73 => ("Moderate Snow Fall", "snow", "snow"),
        75 => ("Heavy Snow Fall", "snow", "snow"),
        77 => ("Snow Grains", "snow", "snow"),
        80 => ("Slight Rain Showers", "rain", "rain"),
        81 => ("Moderate Rain Showers", "rain", "rain"),
        82 => ("Violent Rain Showers", "rain", "rain"),
        85 => ("Slight Snow Showers", "snow", "snow"),
        86 => ("Heavy Snow Showers", "snow", "snow"),
        95 => ("Thunderstorm", "thunderstorm", "thunderstorm"),
        96 => ("Thunderstorm with Slight Hail", "thunderstorm", "thunderstorm"),
        99 => ("Thunderstorm with Heavy Hail", "thunderstorm", "thunderstorm"),
        _ => ("Unknown", "clear-day", "clear-night"),
    };

    WeatherCondition {
        condition,
        icon: if is_day { day_icon } else { night_icon },
    }
}
