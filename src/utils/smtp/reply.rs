//! Parsing of SMTP server reply lines.

/// One complete reply line as received from a server.
///
/// Multiline replies mark continuation with a dash after the code
/// (`250-PIPELINING`); only the final line (`250 OK`) drives the probe
/// state machine. Lines that do not start with three digits parse with
/// `code` 0 so they fall through the "any other code" arms upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub line: String,
    continued: bool,
}

impl SmtpReply {
    pub fn parse(line: &str) -> Self {
        let code = line
            .get(..3)
            .filter(|prefix| prefix.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|prefix| prefix.parse().ok())
            .unwrap_or(0);
        let continued = code != 0 && line.as_bytes().get(3) == Some(&b'-');
        Self {
            code,
            line: line.to_string(),
            continued,
        }
    }

    /// False for continuation lines of a multiline reply.
    pub fn is_final(&self) -> bool {
        !self.continued
    }
}
