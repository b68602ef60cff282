/// Renders a round delta for people: `+4`, `—` for no change, `-8`.
pub fn format_delta(delta: i32) -> String {
    match delta {
        d if d > 0 => format!("+{d}"),
        0 => "—".to_string(),
        d => d.to_string(),
    }
}
