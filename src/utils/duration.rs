/// Formats a millisecond count as `m:ss`.
///
/// Whole seconds only (the fractional part is dropped); minutes are not
/// wrapped into hours, so an hour-long track reads `60:00`.
pub fn format_mmss(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
