use log::info;

/// Formats a duration in seconds as `m:ss`.
pub fn format_time(time_in_seconds: f64) -> String {
    let total = if time_in_seconds.is_finite() {
        time_in_seconds.max(0.0)
    } else {
        0.0
    };

    let minutes = (total / 60.0).floor() as u64;
    let seconds = (total % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}

pub fn parse_speed(input: &str) -> f64 {
    let trimmed = input.trim().trim_end_matches(['x', 'X']);

    match trimmed.parse::<f64>() {
        Ok(speed) if speed.is_finite() && speed > 0.0 => speed,
        _ => {
            info!("Invalid playback speed '{}', defaulting to 1.0x..!", input);
            1.0
        }
    }
}
