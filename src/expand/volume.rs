use regex::Regex;
use std::sync::LazyLock;

// `5`, `5G`, `5 GB`, `5gb`; sizes are whole gigabytes.
static VOLUME_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d+)\s*(?:[gG][bB]?)?\s*$").expect("volume size pattern is valid")
});

/// Parses a volume size into gigabytes. Zero is not a valid size.
pub fn parse_size_gb(value: &str) -> Option<u32> {
    let caps = VOLUME_SIZE.captures(value)?;
    caps.get(1)?.as_str().parse().ok().filter(|gb| *gb > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted_size_formats() {
        assert_eq!(parse_size_gb("5"), Some(5));
        assert_eq!(parse_size_gb("5G"), Some(5));
        assert_eq!(parse_size_gb("5 GB"), Some(5));
        assert_eq!(parse_size_gb(" 12gb "), Some(12));
    }

    #[test]
    fn test_rejected_size_formats() {
        assert_eq!(parse_size_gb("0 GB"), None);
        assert_eq!(parse_size_gb("five GB"), None);
        assert_eq!(parse_size_gb("5 MB"), None);
        assert_eq!(parse_size_gb("-1"), None);
        assert_eq!(parse_size_gb("99999999999"), None);
        assert_eq!(parse_size_gb(""), None);
    }
}
