//! Formatted output helpers for CLI commands.

use serde::Serialize;

/// Renders a value as pretty-printed JSON for terminal output.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
pub fn to_json_pretty<T: Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn json_output_is_pretty_printed() {
        let mut map = BTreeMap::new();
        map.insert("id", "abc");
        let json = to_json_pretty(&map).unwrap();
        assert!(json.contains('\n'));
        assert!(json.contains("\"id\": \"abc\""));
    }

}
