/// Phrase lookup for user-visible strings rendered into rows and panels.
/// One flat English table for now; the call signature is the contract the
/// rest of the client depends on. Unknown keys yield an empty string.
pub fn t(key: &str) -> &'static str {
    match key {
        "empty-list" => "Empty list",
        "loading" => "Loading…",
        "entries" => "entries",
        "not-playing" => "Not playing",
        "disconnected" => "Connection to daemon lost",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_phrase() {
        assert_eq!(t("empty-list"), "Empty list");
    }

    #[test]
    fn unknown_key_is_empty() {
        assert_eq!(t("no-such-key"), "");
    }
}
