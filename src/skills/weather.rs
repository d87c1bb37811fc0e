//! Mock weather skill
//!
//! Picks a city out of the goal and reports randomized conditions for it.
//! Nothing here talks to a real weather service.

use async_trait::async_trait;
use rand::Rng;

use super::traits::{ActionResult, Skill};

const NAME: &str = "weather";

const CONDITIONS: &[&str] = &[
    "Sunny",
    "Cloudy",
    "Partly Cloudy",
    "Rainy",
    "Stormy",
    "Snowy",
    "Foggy",
];

const CITY_TIMEZONES: &[(&str, &str)] = &[
    ("seattle", "PST"),
    ("new york", "EST"),
    ("london", "GMT"),
    ("paris", "CET"),
    ("tokyo", "JST"),
    ("sydney", "AEST"),
];

const CITY_MARKERS: &[&str] = &["in ", "for ", "at "];

pub struct WeatherSkill;

/// City named in `goal`, if any.
///
/// The text after the first of `in `, `for ` or `at ` wins (up to the next
/// punctuation mark); otherwise a known city mentioned anywhere is used.
pub fn extract_city(goal: &str) -> Option<String> {
    // ASCII lowering keeps byte offsets aligned with `goal`
    let lower = goal.to_ascii_lowercase();

    for marker in CITY_MARKERS {
        if let Some(idx) = lower.find(marker) {
            let rest = goal[idx + marker.len()..].trim();
            let city = rest
                .split([',', '?', '.', '!'])
                .next()
                .unwrap_or_default()
                .trim();
            return (!city.is_empty()).then(|| city.to_string());
        }
    }

    CITY_TIMEZONES
        .iter()
        .find(|(city, _)| lower.contains(city))
        .map(|(city, _)| capitalize(city))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn timezone(city: &str) -> &'static str {
    let lower = city.to_lowercase();
    CITY_TIMEZONES
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, tz)| *tz)
        .unwrap_or("Local")
}

fn fahrenheit_to_celsius(fahrenheit: i32) -> i32 {
    ((fahrenheit - 32) as f64 * 5.0 / 9.0).round() as i32
}

fn mock_report(city: &str) -> String {
    let mut rng = rand::rng();
    let condition = CONDITIONS[rng.random_range(0..CONDITIONS.len())];
    let temperature: i32 = rng.random_range(32..92);
    let humidity: u32 = rng.random_range(30..90);
    let wind: u32 = rng.random_range(5..30);

    format!(
        "Weather for {city}:\n\
         Condition: {condition}\n\
         Temperature: {temperature}°F ({celsius}°C)\n\
         Humidity: {humidity}%\n\
         Wind Speed: {wind} mph\n\
         Timezone: {tz}\n\
         Note: This is mock data for demonstration",
        celsius = fahrenheit_to_celsius(temperature),
        tz = timezone(city),
    )
}

#[async_trait]
impl Skill for WeatherSkill {
    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Mock weather report for a city. Example: 'weather in Seattle'"
    }

    fn can_handle(&self, goal: &str) -> bool {
        let g = goal.to_lowercase();
        g.contains("weather") || g.contains("temperature") || g.contains("forecast")
    }

    async fn execute(&self, goal: &str) -> ActionResult {
        match extract_city(goal) {
            Some(city) => ActionResult::success(NAME, mock_report(&city)),
            None => ActionResult::failure(
                NAME,
                "Please specify a city. Example: 'weather in Seattle'",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_city() {
        assert_eq!(extract_city("weather in Seattle").as_deref(), Some("Seattle"));
        assert_eq!(
            extract_city("what's the forecast for New York?").as_deref(),
            Some("New York")
        );
        assert_eq!(extract_city("tokyo weather").as_deref(), Some("Tokyo"));
        assert_eq!(extract_city("weather please"), None);
    }

    #[test]
    fn test_timezone_lookup() {
        assert_eq!(timezone("London"), "GMT");
        assert_eq!(timezone("Springfield"), "Local");
    }

    #[test]
    fn test_fahrenheit_to_celsius() {
        assert_eq!(fahrenheit_to_celsius(32), 0);
        assert_eq!(fahrenheit_to_celsius(212), 100);
        assert_eq!(fahrenheit_to_celsius(70), 21);
    }

    #[tokio::test]
    async fn test_report() {
        let result = WeatherSkill.execute("weather in Paris").await;
        assert!(result.success);
        assert!(result.output.starts_with("Weather for Paris:"));
        assert!(result.output.contains("Timezone: CET"));
    }

    #[tokio::test]
    async fn test_missing_city() {
        let result = WeatherSkill.execute("weather").await;
        assert!(!result.success);
        assert!(result.output.starts_with("Please specify a city"));
    }
}
