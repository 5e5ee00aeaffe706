//! Tools the weather agent can call.

mod weather;

pub use weather::{
    GetWeatherParameters, GetWeatherTool, TOOL_NAME as GET_WEATHER,
    WeatherRecord, WeatherStatus, lookup, normalize_city,
};
