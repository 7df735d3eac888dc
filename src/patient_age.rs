/// Format a DICOM PatientAge (e.g. `"065Y"`) for display by dropping leading zeros.
///
/// The unit suffix is kept as-is; values which are all zeros keep a single `0`.
pub(crate) fn display_age(age: &str) -> String {
    let trimmed = age.trim_start_matches('0');
    if trimmed.is_empty() || trimmed.starts_with(|c: char| !c.is_ascii_digit()) {
        if age.starts_with('0') {
            return format!("0{trimmed}");
        }
    }
    trimmed.to_string()
}
