/// Expand `${VAR_NAME}` references through `lookup`. Unknown variables are
/// left as written.
pub fn expand_with<F>(value: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex");
    re.replace_all(value, |caps: &regex::Captures| {
        lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
    })
    .into_owned()
}

/// Parse a boolean-ish environment value.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
