use std::fmt;

pub const DEFAULT_IMAGE_MIME: &str = "image/png";

const BASE64_MARKER: &str = ";base64,";

/// An inline `data:<mime>;base64,<payload>` image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub data: String,
}

impl DataUrl {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Decode a string that is wholly a base64 data URL.
    ///
    /// The mime part runs up to the last `;base64,` marker. Both parts must be
    /// non-empty and neither may span a line break.
    pub fn parse(input: &str) -> Option<Self> {
        let rest = input.strip_prefix("data:")?;
        let marker = rest.rfind(BASE64_MARKER)?;
        let mime_type = &rest[..marker];
        let data = &rest[marker + BASE64_MARKER.len()..];

        let well_formed = |part: &str| !part.is_empty() && !part.contains(['\n', '\r']);
        if !well_formed(mime_type) || !well_formed(data) {
            return None;
        }

        Some(Self::new(mime_type, data))
    }

    /// Upper bound on the decoded payload size, without decoding it.
    pub fn decoded_len_estimate(&self) -> usize {
        base64::decoded_len_estimate(self.data.len())
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{}{}{}", self.mime_type, BASE64_MARKER, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_png() {
        assert_eq!(
            DataUrl::parse("data:image/png;base64,XYZ"),
            Some(DataUrl::new("image/png", "XYZ"))
        );
    }

    #[test]
    fn test_parse_rejects_plain_text() {
        assert_eq!(DataUrl::parse("not-a-data-url"), None);
        assert_eq!(DataUrl::parse(""), None);
    }

    #[test]
    fn test_parse_requires_whole_string() {
        assert_eq!(DataUrl::parse(" data:image/png;base64,XYZ"), None);
        assert_eq!(DataUrl::parse("data:image/png;base64,XY\nZ"), None);
        assert_eq!(DataUrl::parse("data:;base64,XYZ"), None);
        assert_eq!(DataUrl::parse("data:image/png;base64,"), None);
    }

    #[test]
    fn test_parse_uses_last_marker() {
        let parsed = DataUrl::parse("data:a;base64,b;base64,c").unwrap();
        assert_eq!(parsed.mime_type, "a;base64,b");
        assert_eq!(parsed.data, "c");
    }

    #[test]
    fn test_display_renders_data_url() {
        assert_eq!(
            DataUrl::new("image/jpeg", "AAAA").to_string(),
            "data:image/jpeg;base64,AAAA"
        );
    }

    #[test]
    fn test_decoded_len_estimate() {
        assert_eq!(DataUrl::new("image/png", "iVBORw==").decoded_len_estimate(), 6);
        assert_eq!(DataUrl::new("image/png", "AAAAAAAA").decoded_len_estimate(), 6);
        assert_eq!(DataUrl::new("image/png", "AAAAA").decoded_len_estimate(), 6);
    }
}
