use std::fmt;
use std::str::FromStr;

use crate::errors::MimetypeError;

/// A parsed `type/subtype[;name=value]*` string.
///
/// The type, subtype and parameter names are stored lowercased; parameter
/// values keep their case. Two mimetypes describe the same format when their
/// essences match, regardless of parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mimetype {
    essence: String,
    slash: usize,
    parameters: Vec<(String, String)>,
}

impl Mimetype {
    pub fn parse(input: &str) -> Result<Self, MimetypeError> {
        let (mut mimetype, rest) = split_essence(input)?;
        mimetype.parameters = parse_parameters(rest)?;

        Ok(mimetype)
    }

    /// Parses only the `type/subtype` part. Whatever follows the first `;`
    /// is ignored, well-formed or not.
    pub fn parse_essence(input: &str) -> Result<Self, MimetypeError> {
        split_essence(input).map(|(mimetype, _)| mimetype)
    }

    /// The base `type/subtype`, without any parameters.
    pub fn essence(&self) -> &str {
        &self.essence
    }

    pub fn top_level(&self) -> &str {
        &self.essence[..self.slash]
    }

    pub fn subtype(&self) -> &str {
        &self.essence[self.slash + 1..]
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    /// First value of the named parameter. Names compare case-insensitively.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn without_parameters(&self) -> Self {
        Self {
            essence: self.essence.clone(),
            slash: self.slash,
            parameters: Vec::new(),
        }
    }

    pub fn matches(&self, other: &Mimetype) -> bool {
        self.essence == other.essence
    }
}

impl FromStr for Mimetype {
    type Err = MimetypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Mimetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.essence)?;

        for (name, value) in &self.parameters {
            if is_token(value) {
                write!(f, ";{name}={value}")?;
            } else {
                write!(f, ";{name}=\"")?;
                for c in value.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")?;
            }
        }

        Ok(())
    }
}

// Returns the parameterless mimetype and the remainder starting at the first ';'.
fn split_essence(input: &str) -> Result<(Mimetype, &str), MimetypeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(MimetypeError::Empty);
    }

    let (essence, rest) = match input.find(';') {
        Some(i) => (input[..i].trim_end(), &input[i..]),
        None => (input, ""),
    };

    let (top_level, subtype) = essence
        .split_once('/')
        .ok_or(MimetypeError::MissingSubtype)?;
    if subtype.is_empty() {
        return Err(MimetypeError::MissingSubtype);
    }

    let top_level = token(top_level)?;
    let subtype = token(subtype)?;

    let mimetype = Mimetype {
        slash: top_level.len(),
        essence: format!("{top_level}/{subtype}"),
        parameters: Vec::new(),
    };

    Ok((mimetype, rest))
}

fn is_token_char(c: char) -> bool {
    c.is_ascii_graphic() && !"()<>@,;:\\\"/[]?=".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

fn token(s: &str) -> Result<String, MimetypeError> {
    if is_token(s) {
        Ok(s.to_ascii_lowercase())
    } else {
        Err(MimetypeError::InvalidToken {
            token: s.to_string(),
        })
    }
}

// `rest` is either empty or starts at the first ';'.
fn parse_parameters(mut rest: &str) -> Result<Vec<(String, String)>, MimetypeError> {
    let mut parameters = Vec::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return Ok(parameters);
        }

        rest = rest
            .strip_prefix(';')
            .ok_or_else(|| MimetypeError::InvalidParameter {
                parameter: rest.to_string(),
            })?
            .trim_start();

        // tolerate empty segments and a trailing ';'
        if rest.is_empty() || rest.starts_with(';') {
            continue;
        }

        let name_end = rest.find(|c: char| c == '=' || c == ';').unwrap_or(rest.len());
        if !rest[name_end..].starts_with('=') {
            return Err(MimetypeError::InvalidParameter {
                parameter: rest[..name_end].trim_end().to_string(),
            });
        }

        let name = token(rest[..name_end].trim_end())?;
        rest = rest[name_end + 1..].trim_start();

        let value = if let Some(quoted) = rest.strip_prefix('"') {
            let (value, remaining) = parse_quoted(quoted)?;
            rest = remaining;
            value
        } else {
            let end = rest.find(';').unwrap_or(rest.len());
            let raw = rest[..end].trim_end();
            if !is_token(raw) {
                return Err(MimetypeError::InvalidParameter { parameter: name });
            }
            rest = &rest[end..];
            raw.to_string()
        };

        parameters.push((name, value));
    }
}

fn parse_quoted(input: &str) -> Result<(String, &str), MimetypeError> {
    let mut value = String::new();
    let mut chars = input.char_indices();

    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &input[i + 1..])),
            '\\' => match chars.next() {
                Some((_, escaped)) => value.push(escaped),
                None => break,
            },
            c => value.push(c),
        }
    }

    Err(MimetypeError::UnterminatedQuote)
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_essence_and_parameters() {
        let mimetype = Mimetype::parse("Video/MP4; codecs=\"avc1.42E01E, mp4a.40.2\"; Profile=Main")
            .unwrap();

        assert_eq!(mimetype.essence(), "video/mp4");
        assert_eq!(mimetype.top_level(), "video");
        assert_eq!(mimetype.subtype(), "mp4");
        assert_eq!(mimetype.parameter("CODECS"), Some("avc1.42E01E, mp4a.40.2"));
        assert_eq!(mimetype.parameter("profile"), Some("Main"));
        assert_eq!(mimetype.parameters().len(), 2);
    }

    #[test]
    fn strips_parameters() {
        let mimetype: Mimetype = "video/webm;codecs=vp9".parse().unwrap();

        assert_eq!(mimetype.without_parameters().to_string(), "video/webm");
        assert!(mimetype.matches(&Mimetype::parse("VIDEO/WEBM").unwrap()));
        assert!(!mimetype.matches(&Mimetype::parse("video/mp4").unwrap()));
    }

    #[test]
    fn tolerates_stray_separators() {
        let mimetype = Mimetype::parse(" video/mp4 ;; codecs = avc1 ; ").unwrap();

        assert_eq!(mimetype.essence(), "video/mp4");
        assert_eq!(mimetype.parameter("codecs"), Some("avc1"));
    }

    #[test]
    fn handles_escapes_in_quoted_values() {
        let mimetype = Mimetype::parse(r#"video/x-test;label="a \"b\" \\c""#).unwrap();

        assert_eq!(mimetype.parameter("label"), Some(r#"a "b" \c"#));
        assert_eq!(
            mimetype.to_string(),
            r#"video/x-test;label="a \"b\" \\c""#
        );
    }

    #[test]
    fn essence_parsing_ignores_broken_parameters() {
        for input in [
            "video/mp4;codecs=avc1.42E01E,mp4a.40.2",
            "Video/MP4;codecs",
            "video/mp4;codecs=",
            "video/mp4; codecs=\"avc1",
        ] {
            assert!(Mimetype::parse(input).is_err(), "{input}");

            let essence = Mimetype::parse_essence(input).unwrap();
            assert_eq!(essence.essence(), "video/mp4");
            assert!(essence.parameters().is_empty());
        }

        assert_eq!(Mimetype::parse_essence(";codecs=x"), Err(MimetypeError::MissingSubtype));
        assert!(matches!(
            Mimetype::parse_essence("vid eo/mp4;codecs"),
            Err(MimetypeError::InvalidToken { .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Mimetype::parse(""), Err(MimetypeError::Empty));
        assert_eq!(Mimetype::parse("   "), Err(MimetypeError::Empty));
        assert_eq!(Mimetype::parse("video"), Err(MimetypeError::MissingSubtype));
        assert_eq!(Mimetype::parse("video/"), Err(MimetypeError::MissingSubtype));
        assert!(matches!(
            Mimetype::parse("vid eo/mp4"),
            Err(MimetypeError::InvalidToken { .. })
        ));
        assert!(matches!(
            Mimetype::parse("video/mp4/x"),
            Err(MimetypeError::InvalidToken { .. })
        ));
        assert!(matches!(
            Mimetype::parse("video/mp4;codecs"),
            Err(MimetypeError::InvalidParameter { .. })
        ));
        assert!(matches!(
            Mimetype::parse("video/mp4;codecs="),
            Err(MimetypeError::InvalidParameter { .. })
        ));
        assert_eq!(
            Mimetype::parse("video/mp4;codecs=\"avc1"),
            Err(MimetypeError::UnterminatedQuote)
        );
        assert!(matches!(
            Mimetype::parse("video/mp4;codecs=\"avc1\"junk"),
            Err(MimetypeError::InvalidParameter { .. })
        ));
    }

    fn token_strategy() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9][a-zA-Z0-9.+-]{0,11}"
    }

    proptest! {
        #[test]
        fn display_parses_back(
            top in token_strategy(),
            sub in token_strategy(),
            params in prop::collection::vec((token_strategy(), "[ -~]{0,12}"), 0..4),
        ) {
            let mut input = format!("{top}/{sub}");
            let mut expected = Vec::new();
            for (name, value) in &params {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                input.push_str(&format!(";{name}=\"{escaped}\""));
                expected.push((name.to_ascii_lowercase(), value.clone()));
            }

            let parsed = Mimetype::parse(&input).unwrap();
            prop_assert_eq!(parsed.parameters(), expected.as_slice());

            let reparsed = Mimetype::parse(&parsed.to_string()).unwrap();
            prop_assert_eq!(reparsed, parsed);
        }

        #[test]
        fn essence_never_carries_parameters(input in "\\PC{0,40}") {
            if let Ok(mimetype) = Mimetype::parse(&input) {
                prop_assert!(!mimetype.essence().contains(';'));
                prop_assert_eq!(mimetype.essence(), mimetype.essence().to_ascii_lowercase());
            }
        }
    }
}
