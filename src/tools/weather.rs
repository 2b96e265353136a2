// src/tools/weather.rs

use crate::config::Settings;
use crate::tools::{Params, Tool, ToolError, ToolOutput, WeatherReport, decode_params, http_client};
use serde::Deserialize;

pub const DEFAULT_CITY: &str = "Bangalore";

/// Current conditions from the OpenWeatherMap API.
pub struct WeatherTool {
    client: reqwest::blocking::Client,
    api_url: String,
    api_key: Option<String>,
}

impl WeatherTool {
    pub fn new(settings: &Settings) -> Result<Self, ToolError> {
        Ok(Self {
            client: http_client(settings.tool_timeout)?,
            api_url: settings.weather_api_url.trim_end_matches('/').to_string(),
            api_key: settings.weather_api_key.clone(),
        })
    }

    /// Any failure is returned as [`ToolOutput::Error`].
    pub fn get_weather(&self, city: &str) -> ToolOutput {
        match self.fetch(city) {
            Ok(response) => match project(city, response) {
                Some(report) => ToolOutput::Weather(report),
                None => ToolOutput::failure("Weather API error: response has no weather conditions"),
            },
            Err(err) => ToolOutput::failure(format!("Weather API error: {err}")),
        }
    }

    fn fetch(&self, city: &str) -> Result<CurrentWeather, reqwest::Error> {
        let url = format!("{}/weather", self.api_url);
        let api_key = self.api_key.as_deref().unwrap_or_default();

        self.client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()?
            .error_for_status()?
            .json()
    }
}

#[derive(Deserialize)]
struct WeatherParams {
    #[serde(default = "default_city")]
    city: String,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "weather"
    }

    fn description(&self) -> &str {
        "Get weather information for cities (queries like: \"Bangalore\", \"Delhi\", \"Mumbai\")"
    }

    fn execute(&self, params: &Params) -> Result<ToolOutput, ToolError> {
        let params: WeatherParams = decode_params(self.name(), params)?;
        Ok(self.get_weather(&params.city))
    }
}

#[derive(Deserialize)]
struct CurrentWeather {
    main: MainReadings,
    weather: Vec<Condition>,
    wind: Wind,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: i64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
}

fn project(city: &str, response: CurrentWeather) -> Option<WeatherReport> {
    let condition = response.weather.into_iter().next()?;
    Some(WeatherReport {
        city: city.to_string(),
        temperature: response.main.temp,
        feels_like: response.main.feels_like,
        condition: condition.description,
        humidity: response.main.humidity,
        wind_speed: response.wind.speed,
    })
}
