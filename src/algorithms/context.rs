use crate::models::*;
use chrono::{Datelike, NaiveDateTime, Timelike};

/// Snapshot of the conditions a recommendation is made for. Pure and deterministic.
pub fn build_context(weather: &Weather, time: NaiveDateTime, season: Season, region: &str) -> ContextVector {
    let hour = time.hour();
    ContextVector {
        temperature: weather.temperature,
        humidity: weather.humidity,
        wind_speed: weather.wind_speed,
        weather_condition: weather.condition,
        rain_amount: weather.rain_amount,
        hour,
        day_of_week: time.weekday().num_days_from_sunday(),
        time_of_day: TimeOfDay::from_hour(hour),
        season,
        region: region.to_string(),
        timestamp: time,
    }
}

/// Builds the context for a request, deriving the season from the month when the caller omits it.
pub fn context_for_request(request: &RecommendationContext) -> ContextVector {
    let season = request
        .season
        .unwrap_or_else(|| Season::from_month(request.time.month()));
    build_context(&request.weather, request.time, season, &request.region)
}
