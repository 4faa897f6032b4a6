use crate::models::*;
use anyhow::{anyhow, Result};

pub const MAX_REASON_LENGTH: usize = 500;
pub const MAX_SELECTED_ITEMS: usize = 20;

pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(anyhow!("User ID cannot be empty"));
    }

    if user_id.len() > 128 {
        return Err(anyhow!("User ID too long (max 128 characters)"));
    }

    Ok(())
}

pub fn validate_feedback_input(input: &FeedbackInput) -> Result<()> {
    if !(1..=5).contains(&input.rating) {
        return Err(anyhow!("Rating must be between 1 and 5, got {}", input.rating));
    }

    if input.selected_items.len() > MAX_SELECTED_ITEMS {
        return Err(anyhow!(
            "Too many selected items: {} (max {})",
            input.selected_items.len(),
            MAX_SELECTED_ITEMS
        ));
    }

    for item in &input.selected_items {
        if item.trim().is_empty() {
            return Err(anyhow!("Selected item cannot be empty"));
        }
    }

    Ok(())
}

pub fn validate_weather(weather: &Weather) -> Result<()> {
    let fields = [
        ("temperature", weather.temperature),
        ("humidity", weather.humidity),
        ("wind speed", weather.wind_speed),
        ("rain amount", weather.rain_amount),
    ];

    for (name, value) in fields {
        if !value.is_finite() {
            return Err(anyhow!("Weather {} contains invalid values (NaN or Infinity)", name));
        }
    }

    if !(-60.0..=60.0).contains(&weather.temperature) {
        return Err(anyhow!("Temperature out of range: {}", weather.temperature));
    }

    if weather.humidity < 0.0 || weather.humidity > 100.0 {
        return Err(anyhow!("Humidity must be between 0 and 100"));
    }

    Ok(())
}

pub fn sanitize_string(input: &str, max_length: usize) -> String {
    input
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || "-_.,!?".contains(*c))
        .take(max_length)
        .collect()
}

/// Checks a caller-supplied request before it reaches the engine.
pub fn validate_recommendation_request(user_id: &str, request: &RecommendationContext) -> Result<()> {
    validate_user_id(user_id)?;
    validate_weather(&request.weather)?;

    if request.region.trim().is_empty() {
        return Err(anyhow!("Region cannot be empty"));
    }

    Ok(())
}
