//! String formats.
//!
//! Built-in formats are matched with anchored regular expressions compiled
//! once per process, plus a few structural checks the regex engine cannot
//! express without lookaround (calendar validity, address parsing).

use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// A named string format.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    Guid,
    NanoId,
    Cuid,
    Cuid2,
    Ulid,
    Xid,
    Ksuid,
    DateTime,
    Date,
    Time,
    Duration,
    Ipv4,
    Ipv6,
    CidrV4,
    CidrV6,
    Base64,
    Base64Url,
    E164,
    Jwt,
    Emoji,
    Lowercase,
    Uppercase,
    /// A caller-supplied regular expression.
    Regex,
    Includes(String),
    StartsWith(String),
    EndsWith(String),
    TemplateLiteral,
}

impl StringFormat {
    /// The format name reported in `invalid_format` issues and the bag.
    pub fn name(&self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Guid => "guid",
            StringFormat::NanoId => "nanoid",
            StringFormat::Cuid => "cuid",
            StringFormat::Cuid2 => "cuid2",
            StringFormat::Ulid => "ulid",
            StringFormat::Xid => "xid",
            StringFormat::Ksuid => "ksuid",
            StringFormat::DateTime => "datetime",
            StringFormat::Date => "date",
            StringFormat::Time => "time",
            StringFormat::Duration => "duration",
            StringFormat::Ipv4 => "ipv4",
            StringFormat::Ipv6 => "ipv6",
            StringFormat::CidrV4 => "cidrv4",
            StringFormat::CidrV6 => "cidrv6",
            StringFormat::Base64 => "base64",
            StringFormat::Base64Url => "base64url",
            StringFormat::E164 => "e164",
            StringFormat::Jwt => "jwt",
            StringFormat::Emoji => "emoji",
            StringFormat::Lowercase => "lowercase",
            StringFormat::Uppercase => "uppercase",
            StringFormat::Regex => "regex",
            StringFormat::Includes(_) => "includes",
            StringFormat::StartsWith(_) => "starts_with",
            StringFormat::EndsWith(_) => "ends_with",
            StringFormat::TemplateLiteral => "template_literal",
        }
    }

    /// Tests `input` against this format.
    ///
    /// `pattern` overrides the built-in expression; it is required for
    /// [`StringFormat::Regex`] and [`StringFormat::TemplateLiteral`].
    pub fn matches(&self, input: &str, pattern: Option<&Regex>) -> bool {
        match self {
            StringFormat::Includes(needle) => return input.contains(needle.as_str()),
            StringFormat::StartsWith(prefix) => return input.starts_with(prefix.as_str()),
            StringFormat::EndsWith(suffix) => return input.ends_with(suffix.as_str()),
            _ => {}
        }

        let shape_ok = match pattern.or_else(|| builtin(self)) {
            Some(regex) => regex.is_match(input),
            None => true,
        };
        shape_ok && self.structurally_valid(input)
    }

    fn structurally_valid(&self, input: &str) -> bool {
        match self {
            StringFormat::Email => !input.starts_with('.') && !input.contains(".."),
            StringFormat::Date => valid_calendar_date(input),
            StringFormat::DateTime => input.get(..10).is_some_and(valid_calendar_date),
            StringFormat::Duration => valid_duration(input),
            StringFormat::Ipv4 => input.parse::<Ipv4Addr>().is_ok(),
            StringFormat::Ipv6 => input.parse::<Ipv6Addr>().is_ok(),
            StringFormat::CidrV4 => valid_cidr(input, 32, |addr| addr.parse::<Ipv4Addr>().is_ok()),
            StringFormat::CidrV6 => {
                valid_cidr(input, 128, |addr| addr.parse::<Ipv6Addr>().is_ok())
            }
            _ => true,
        }
    }
}

fn valid_calendar_date(input: &str) -> bool {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").is_ok()
}

fn valid_duration(input: &str) -> bool {
    if input == "P" || input.ends_with('T') {
        return false;
    }
    !input.contains('W') || !input.contains(['Y', 'D', 'T'])
}

fn valid_cidr(input: &str, max_prefix: u8, addr_ok: impl Fn(&str) -> bool) -> bool {
    match input.split_once('/') {
        Some((addr, prefix)) => {
            addr_ok(addr)
                && !prefix.starts_with('+')
                && prefix.parse::<u8>().is_ok_and(|p| p <= max_prefix)
        }
        None => false,
    }
}

macro_rules! static_regex {
    ($pattern:expr) => {{
        static CELL: OnceLock<Regex> = OnceLock::new();
        CELL.get_or_init(|| Regex::new($pattern).expect("built-in pattern compiles"))
    }};
}

fn builtin(format: &StringFormat) -> Option<&'static Regex> {
    let regex = match format {
        StringFormat::Email => static_regex!(
            r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$"
        ),
        StringFormat::Url => static_regex!(r"^[A-Za-z][A-Za-z0-9+.\-]*://[^\s/?#]+[^\s]*$"),
        StringFormat::Uuid => static_regex!(
            r"^([0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[1-8][0-9a-fA-F]{3}-[89abAB][0-9a-fA-F]{3}-[0-9a-fA-F]{12}|00000000-0000-0000-0000-000000000000|[fF]{8}-[fF]{4}-[fF]{4}-[fF]{4}-[fF]{12})$"
        ),
        StringFormat::Guid => static_regex!(
            r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$"
        ),
        StringFormat::NanoId => static_regex!(r"^[a-zA-Z0-9_-]{21}$"),
        StringFormat::Cuid => static_regex!(r"^[cC][^\s-]{8,}$"),
        StringFormat::Cuid2 => static_regex!(r"^[0-9a-z]+$"),
        StringFormat::Ulid => static_regex!(r"^[0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{26}$"),
        StringFormat::Xid => static_regex!(r"^[0-9a-vA-V]{20}$"),
        StringFormat::Ksuid => static_regex!(r"^[A-Za-z0-9]{27}$"),
        StringFormat::DateTime => static_regex!(&datetime_pattern(DateTimeOptions::default())),
        StringFormat::Date => static_regex!(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$"),
        StringFormat::Time => static_regex!(r"^([01]\d|2[0-3]):[0-5]\d(:[0-5]\d(\.\d+)?)?$"),
        StringFormat::Duration => static_regex!(
            r"^P(\d+W|(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+([.,]\d+)?S)?)?)$"
        ),
        StringFormat::Ipv4 => static_regex!(r"^(\d{1,3}\.){3}\d{1,3}$"),
        StringFormat::Base64 => static_regex!(
            r"^(?:[0-9a-zA-Z+/]{4})*(?:[0-9a-zA-Z+/]{2}==|[0-9a-zA-Z+/]{3}=)?$"
        ),
        StringFormat::Base64Url => static_regex!(r"^[A-Za-z0-9_-]*$"),
        StringFormat::E164 => static_regex!(r"^\+[0-9]{6,14}[0-9]$"),
        StringFormat::Jwt => static_regex!(r"^[A-Za-z0-9_-]+\.[A-Za-z0-9_-]+\.[A-Za-z0-9_-]*$"),
        StringFormat::Emoji => {
            static_regex!(r"^(\p{Extended_Pictographic}|\p{Emoji_Component})+$")
        }
        StringFormat::Lowercase => static_regex!(r"^[^A-Z]*$"),
        StringFormat::Uppercase => static_regex!(r"^[^a-z]*$"),
        _ => return None,
    };
    Some(regex)
}

/// Options for ISO datetime strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateTimeOptions {
    /// Accept `+HH:MM` offsets in addition to `Z`.
    pub offset: bool,
    /// Accept datetimes without any zone designator.
    pub local: bool,
    /// Exact number of fractional second digits; `None` accepts any.
    pub precision: Option<u8>,
}

/// Builds the anchored datetime expression for `options`.
pub fn datetime_pattern(options: DateTimeOptions) -> String {
    let seconds = match options.precision {
        Some(0) => r":[0-5]\d".to_string(),
        Some(digits) => format!(r":[0-5]\d\.\d{{{}}}", digits),
        None => r"(:[0-5]\d(\.\d+)?)?".to_string(),
    };
    let mut zones = vec!["Z".to_string()];
    if options.offset {
        zones.push(r"[+-]([01]\d|2[0-3]):?[0-5]\d".to_string());
    }
    let zone = if options.local {
        format!("({})?", zones.join("|"))
    } else {
        format!("({})", zones.join("|"))
    };
    format!(
        r"^\d{{4}}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])T([01]\d|2[0-3]):[0-5]\d{}{}$",
        seconds, zone
    )
}
