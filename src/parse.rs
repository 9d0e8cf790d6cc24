//! Wire parsing for the member protocol.

use nom::IResult;
use nom::{
    bytes::complete::{is_not, take_till},
    character::complete::{alpha1, char, crlf, space0, space1},
    combinator::opt,
    multi::many0,
    sequence::preceded,
};
use smallvec::SmallVec;

#[derive(Debug, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

/// Parse one command line: an alphabetic name plus space-separated
/// arguments. The name is uppercased so dispatch is case-insensitive.
pub fn parse_command(input: &str) -> IResult<&str, Command> {
    let (input, name) = alpha1(input)?;
    let (input, args) = many0(preceded(space1, is_not(" \r\n")))(input)?;
    let (input, _) = opt(crlf)(input)?;
    Ok((
        input,
        Command {
            name: name.to_ascii_uppercase(),
            args: args.into_iter().map(str::to_string).collect(),
        },
    ))
}

/// A post payload as sent by the operator: `Title:`/`Image:` headers, a
/// blank line, then the body.
#[derive(Debug, PartialEq, Eq)]
pub struct Payload {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Payload {
    /// First value of the named header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Every value of the named header, in order of appearance.
    #[must_use]
    pub fn values(&self, name: &str) -> SmallVec<[String; 4]> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .collect()
    }
}

fn header_line(input: &str) -> IResult<&str, (String, String)> {
    let (input, name) = is_not(":\r\n")(input)?;
    let (input, _) = char(':')(input)?;
    let (input, _) = space0(input)?;
    let (input, value) = take_till(|c| c == '\r' || c == '\n')(input)?;
    let (input, _) = crlf(input)?;
    Ok((input, (name.to_string(), value.to_string())))
}

/// Parse an operator post payload. Everything after the blank separator
/// line is body, kept verbatim.
pub fn parse_payload(input: &str) -> IResult<&str, Payload> {
    let (input, headers) = many0(header_line)(input)?;
    let (body, _) = crlf(input)?;
    Ok((
        "",
        Payload {
            headers,
            body: body.to_string(),
        },
    ))
}
