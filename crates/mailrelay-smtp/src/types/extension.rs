//! SMTP extension types.

/// SMTP extensions discovered from EHLO response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Extension {
    /// STARTTLS - TLS upgrade
    StartTls,
    /// AUTH - Authentication
    Auth(Vec<AuthMechanism>),
    /// Any other extension, kept verbatim
    Unknown(String),
}

impl Extension {
    /// Parses an extension line from EHLO response.
    ///
    /// Some servers still advertise mechanisms as `AUTH=PLAIN LOGIN`, which is
    /// treated the same as `AUTH PLAIN LOGIN`.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let mut parts = line.split_whitespace();
        let Some(first) = parts.next() else {
            return Self::Unknown(line.to_string());
        };

        let (keyword, inline_arg) = match first.split_once('=') {
            Some((keyword, arg)) => (keyword, Some(arg)),
            None => (first, None),
        };

        match keyword.to_uppercase().as_str() {
            "STARTTLS" => Self::StartTls,
            "AUTH" => Self::Auth(
                inline_arg
                    .into_iter()
                    .chain(parts)
                    .filter_map(AuthMechanism::parse)
                    .collect(),
            ),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// SASL authentication mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthMechanism {
    /// PLAIN - plaintext authentication
    Plain,
    /// LOGIN - legacy plaintext
    Login,
    /// CRAM-MD5 - challenge-response
    CramMd5,
    /// `XOAUTH2` - `OAuth2` (Google/Microsoft)
    XOAuth2,
}

impl AuthMechanism {
    /// Parses an authentication mechanism name.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "PLAIN" => Some(Self::Plain),
            "LOGIN" => Some(Self::Login),
            "CRAM-MD5" => Some(Self::CramMd5),
            "XOAUTH2" => Some(Self::XOAuth2),
            _ => None,
        }
    }

    /// Returns the mechanism name as a string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "PLAIN",
            Self::Login => "LOGIN",
            Self::CramMd5 => "CRAM-MD5",
            Self::XOAuth2 => "XOAUTH2",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parse_starttls_any_case() {
        assert_eq!(Extension::parse("STARTTLS"), Extension::StartTls);
        assert_eq!(Extension::parse("starttls"), Extension::StartTls);
    }

    #[test]
    fn parse_auth_mechanisms() {
        let Extension::Auth(mechs) = Extension::parse("AUTH PLAIN LOGIN GSSAPI") else {
            panic!("Expected Auth variant");
        };
        assert_eq!(mechs, vec![AuthMechanism::Plain, AuthMechanism::Login]);
    }

    #[test]
    fn parse_legacy_auth_equals_form() {
        let Extension::Auth(mechs) = Extension::parse("AUTH=PLAIN XOAUTH2") else {
            panic!("Expected Auth variant");
        };
        assert_eq!(mechs, vec![AuthMechanism::Plain, AuthMechanism::XOAuth2]);
    }

    #[test]
    fn parse_auth_without_mechanisms() {
        assert_eq!(Extension::parse("AUTH"), Extension::Auth(Vec::new()));
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert_eq!(
            Extension::parse("SIZE 35882577"),
            Extension::Unknown("SIZE 35882577".to_string())
        );
        assert_eq!(
            Extension::parse("X-CUSTOM thing"),
            Extension::Unknown("X-CUSTOM thing".to_string())
        );
        assert!(matches!(Extension::parse(""), Extension::Unknown(_)));
    }

    #[test]
    fn mechanism_names() {
        assert_eq!(AuthMechanism::parse("cram-md5"), Some(AuthMechanism::CramMd5));
        assert_eq!(AuthMechanism::parse("GSSAPI"), None);
        assert_eq!(AuthMechanism::Plain.as_str(), "PLAIN");
    }
}
