use std::collections::BTreeMap;

/// Flat `key=value` settings, as stored in the bot's `.env` file.
pub type SettingsMap = BTreeMap<String, String>;

/// Parse a multiline `key=value` blob.
///
/// The key runs up to the first `=`; everything after it (including further
/// `=` characters) is the value. Lines without a non-empty key are skipped.
pub fn parse(text: &str) -> SettingsMap {
    let mut map = SettingsMap::new();
    for line in text.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.is_empty() {
            continue;
        }
        map.insert(key.to_string(), value.to_string());
    }
    map
}

/// Render a mapping back into `key=value` lines joined by `\n`.
///
/// Values are written verbatim: `parse` only splits on the first `=`.
pub fn stringify(map: &SettingsMap) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
