use std::future::ready;

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use weather_agent_core::tool::{
    Error as ToolError, Tool, ToolDescriptor, ToolResult,
};

/// The name the model calls the weather tool by.
pub const TOOL_NAME: &str = "get_weather";

const DESCRIPTION: &str = r#"
Retrieves the current weather report for a specified city.
Returns an object with a `status` of "success" or "error". On success it
includes a `report` with the weather details, on error an `error_message`."#;

// Keyed by normalized city name.
const REPORTS: [(&str, &str); 3] = [
    (
        "newyork",
        "The weather in New York is rainy with a temperature of 9°C",
    ),
    ("london", "It's cloudy in London with a temperature of 15°C"),
    (
        "tokyo",
        "Tokyo is experiencing light rain and a temperature of 18°C.",
    ),
];

/// Whether a lookup found the city.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeatherStatus {
    /// The city is known and a report is available.
    Success,
    /// The city is unknown.
    Error,
}

/// The result of a weather lookup, as returned to the model.
///
/// A miss is a regular value, so the model can relay it to the user.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WeatherRecord {
    /// The city is known.
    Success {
        /// Human-readable weather details.
        report: String,
    },
    /// The city is unknown.
    Error {
        /// Explanation meant for the user.
        error_message: String,
    },
}

impl WeatherRecord {
    /// Returns the status of this record.
    #[inline]
    pub fn status(&self) -> WeatherStatus {
        match self {
            WeatherRecord::Success { .. } => WeatherStatus::Success,
            WeatherRecord::Error { .. } => WeatherStatus::Error,
        }
    }
}

/// Lowercases `city` and strips U+0020 spaces. Other whitespace is kept.
pub fn normalize_city(city: &str) -> String {
    city.to_lowercase().replace(' ', "")
}

/// Looks up the weather report for a city.
pub fn lookup(city: &str) -> WeatherRecord {
    debug!("looking up weather for city: {city}");
    let key = normalize_city(city);
    match REPORTS.iter().find(|(name, _)| *name == key) {
        Some((_, report)) => WeatherRecord::Success {
            report: (*report).to_owned(),
        },
        None => WeatherRecord::Error {
            error_message: format!(
                "Sorry, I don't have weather information for {city}"
            ),
        },
    }
}

/// Arguments of the weather tool.
#[derive(Deserialize, JsonSchema)]
pub struct GetWeatherParameters {
    /// The city to look up.
    #[schemars(
        description = "The name of the city (e.g., \"New York\", \"London\", \"Tokyo\")."
    )]
    pub city: String,
}

/// A tool for looking up the mock weather report of a city.
pub struct GetWeatherTool {
    descriptor: ToolDescriptor,
}

impl GetWeatherTool {
    /// Creates a new weather tool.
    #[inline]
    pub fn new() -> Self {
        GetWeatherTool {
            descriptor: ToolDescriptor {
                name: TOOL_NAME.to_owned(),
                description: DESCRIPTION.trim().to_owned(),
                parameters: schema_for!(GetWeatherParameters).to_value(),
                response: Some(schema_for!(WeatherRecord).to_value()),
            },
        }
    }
}

impl Default for GetWeatherTool {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for GetWeatherTool {
    type Input = GetWeatherParameters;

    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    fn execute(
        &self,
        input: GetWeatherParameters,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        println!("---Tool: get_weather called for city{}---", input.city);
        let result = serde_json::to_value(lookup(&input.city)).map_err(|err| {
            ToolError::execution_error().with_reason(err.to_string())
        });
        ready(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_known_cities() {
        for city in ["London", "LONDON", "lon don", "  London  "] {
            assert_eq!(
                lookup(city),
                WeatherRecord::Success {
                    report: "It's cloudy in London with a temperature of 15°C"
                        .to_owned()
                }
            );
        }
        for city in ["  NEW YORK", "new york", "NewYork"] {
            assert_eq!(lookup(city).status(), WeatherStatus::Success);
        }
        assert_eq!(
            lookup("Tokyo"),
            WeatherRecord::Success {
                report: "Tokyo is experiencing light rain and a temperature \
                         of 18°C."
                    .to_owned()
            }
        );
    }

    #[test]
    fn test_unknown_cities() {
        assert_eq!(
            lookup("Paris"),
            WeatherRecord::Error {
                error_message:
                    "Sorry, I don't have weather information for Paris"
                        .to_owned()
            }
        );

        // Only U+0020 is stripped, so other whitespace still misses.
        for city in ["New\tYork", "london\n", "New_York", "Lond0n"] {
            let WeatherRecord::Error { error_message } = lookup(city) else {
                panic!("{city:?} should not match");
            };
            assert!(error_message.ends_with(city));
        }
    }

    #[test]
    fn test_normalize_city() {
        assert_eq!(normalize_city("  New York "), "newyork");
        assert_eq!(normalize_city("New\u{a0}York"), "new\u{a0}york");
    }

    #[test]
    fn test_serialized_shape() {
        assert_eq!(
            serde_json::to_value(lookup("Tokyo")).unwrap(),
            json!({
                "status": "success",
                "report": "Tokyo is experiencing light rain and a temperature of 18°C."
            })
        );
        assert_eq!(
            serde_json::to_value(lookup("Paris")).unwrap(),
            json!({
                "status": "error",
                "error_message": "Sorry, I don't have weather information for Paris"
            })
        );
    }

    #[test]
    fn test_descriptor() {
        let tool = GetWeatherTool::new();
        let descriptor = tool.descriptor();
        assert_eq!(descriptor.name, "get_weather");
        assert!(descriptor.description.starts_with("Retrieves"));
        assert_eq!(descriptor.parameters["required"], json!(["city"]));
        assert_eq!(
            descriptor.parameters["properties"]["city"]["type"],
            json!("string")
        );
        assert!(descriptor.response.is_some());
    }

    #[tokio::test]
    async fn test_execute() {
        let tool = GetWeatherTool::new();
        let value = tool
            .execute(GetWeatherParameters {
                city: "new york".to_owned(),
            })
            .await
            .unwrap();
        assert_eq!(value["status"], json!("success"));
        assert_eq!(
            value["report"],
            json!("The weather in New York is rainy with a temperature of 9°C")
        );
    }
}
