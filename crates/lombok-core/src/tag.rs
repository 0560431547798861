//! Tag interpretation.
//!
//! Forward direction: a field's struct tag (`prop`, `get`, `set`, `recv` keys)
//! becomes getter/setter names. Reverse direction: the accessors a field
//! already has become the shortest tag that would reproduce them.

use crate::model::Property;
use crate::naming::{is_valid_ident, pascal_case};

/// Tag keys understood by the interpreter
pub const KEY_RECV: &str = "recv";
pub const KEY_PROP: &str = "prop";
pub const KEY_GET: &str = "get";
pub const KEY_SET: &str = "set";

/// Marks a getter that returns the field's address
const REF_MARKER: char = '&';
/// Requests the `Get`-prefixed getter name
const GET_PREFIX_MARKER: &str = "@";

/// Accessor directives resolved from one field's tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDirectives {
    /// Receiver name override for the whole type
    pub recv: Option<String>,
    pub getter: Option<String>,
    pub setter: Option<String>,
    pub ref_getter: bool,
}

impl TagDirectives {
    /// Resolve the directives of field `field` from its tag literal (backtick
    /// or double-quoted, quotes included).
    ///
    /// Keys apply in the order `prop`, `get`, `set`; a later key replaces what
    /// `prop` decided for its side only. Names that are not valid identifiers
    /// resolve to `None`.
    pub fn parse(field: &str, tag_literal: &str) -> Self {
        let mut directives = TagDirectives::default();
        let Some(tag) = tag_content(tag_literal) else {
            return directives;
        };
        let pairs = parse_struct_tag(&tag);
        let lookup = |key: &str| {
            pairs
                .iter()
                .find(|(name, _)| name == key)
                .map(|(_, value)| value.as_str())
        };
        let pascal = pascal_case(field);

        if let Some(recv) = lookup(KEY_RECV) {
            if is_valid_ident(recv) {
                directives.recv = Some(recv.to_string());
            }
        }

        if let Some(value) = lookup(KEY_PROP) {
            let (is_ref, rest) = split_ref(value);
            directives.getter = getter_name(&pascal, rest);
            directives.ref_getter = is_ref;
            directives.setter = match rest {
                "" | GET_PREFIX_MARKER => Some(format!("Set{pascal}")),
                name => Some(format!("Set{name}")),
            };
        }

        if let Some(value) = lookup(KEY_GET) {
            let (is_ref, rest) = split_ref(value);
            directives.getter = getter_name(&pascal, rest);
            directives.ref_getter = is_ref;
        }

        if let Some(value) = lookup(KEY_SET) {
            directives.setter = match value {
                "" | GET_PREFIX_MARKER => Some(format!("Set{pascal}")),
                name => Some(name.to_string()),
            };
        }

        directives.getter = directives.getter.filter(|name| is_valid_ident(name));
        directives.setter = directives.setter.filter(|name| is_valid_ident(name));
        directives.ref_getter &= directives.getter.is_some();
        directives
    }
}

fn split_ref(value: &str) -> (bool, &str) {
    match value.strip_prefix(REF_MARKER) {
        Some(rest) => (true, rest),
        None => (false, value),
    }
}

fn getter_name(pascal: &str, value: &str) -> Option<String> {
    match value {
        "" => Some(pascal.to_string()),
        GET_PREFIX_MARKER => Some(format!("Get{pascal}")),
        name => Some(name.to_string()),
    }
}

/// Content of a tag literal: raw strings are taken as-is, interpreted strings
/// are unescaped.
pub fn tag_content(literal: &str) -> Option<String> {
    if let Some(raw) = literal
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return Some(raw.to_string());
    }
    if literal.len() >= 2 && literal.starts_with('"') && literal.ends_with('"') {
        return unquote(literal);
    }
    None
}

/// Split a struct tag into `key:"value"` pairs.
///
/// Follows Go's conventional tag format. Parsing stops at the first malformed
/// pair; pairs before it are kept.
pub fn parse_struct_tag(tag: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut rest = tag;

    loop {
        rest = rest.trim_start_matches(' ');
        if rest.is_empty() {
            break;
        }

        let bytes = rest.as_bytes();
        let key_len = bytes
            .iter()
            .position(|&b| b <= b' ' || b == b':' || b == b'"' || b == 0x7f)
            .unwrap_or(bytes.len());
        if key_len == 0
            || key_len + 1 >= bytes.len()
            || bytes[key_len] != b':'
            || bytes[key_len + 1] != b'"'
        {
            break;
        }
        let key = &rest[..key_len];
        rest = &rest[key_len + 1..];

        // closing quote, honouring backslash escapes
        let bytes = rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }
        let quoted = &rest[..=i];
        rest = &rest[i + 1..];

        match unquote(quoted) {
            Some(value) => pairs.push((key.to_string(), value)),
            None => break,
        }
    }

    pairs
}

// Go interpreted string literal unescaping
fn unquote(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => {
                let escaped = match chars.next()? {
                    'a' => '\u{07}',
                    'b' => '\u{08}',
                    'f' => '\u{0c}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\u{0b}',
                    '\\' => '\\',
                    '"' => '"',
                    'x' => hex_escape(&mut chars, 2)?,
                    'u' => hex_escape(&mut chars, 4)?,
                    'U' => hex_escape(&mut chars, 8)?,
                    d @ '0'..='7' => {
                        let mut value = d.to_digit(8)?;
                        for _ in 0..2 {
                            value = value * 8 + chars.next()?.to_digit(8)?;
                        }
                        char::from_u32(value).filter(|_| value <= 0xff)?
                    }
                    _ => return None,
                };
                result.push(escaped);
            }
            c => result.push(c),
        }
    }

    Some(result)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Observed {
    None,
    /// Matches the default name
    Default,
    /// Matches `Get` + default name
    GetPrefixed,
    /// Some other name; the lexicographically smallest one
    Custom(String),
}

fn smallest<'a>(names: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    names.min()
}

/// Suggest the shortest tag reproducing the accessors a field already has.
///
/// Returns the tag literal in backticks, or `None` when the field has no
/// getter- or setter-shaped method at all.
pub fn suggest_tag(prop: &Property) -> Option<String> {
    let pascal = pascal_case(&prop.name);

    let getter = if prop.has_existing_getter(&pascal) {
        Observed::Default
    } else if prop.has_existing_getter(&format!("Get{pascal}")) {
        Observed::GetPrefixed
    } else {
        match smallest(prop.existing_getters()) {
            Some(name) => Observed::Custom(name.to_string()),
            None => Observed::None,
        }
    };

    let setter = if prop.has_existing_setter(&format!("Set{pascal}")) {
        Observed::Default
    } else {
        match smallest(prop.existing_setters()) {
            Some(name) => Observed::Custom(name.to_string()),
            None => Observed::None,
        }
    };

    let tag = match (&getter, &setter) {
        (Observed::None, Observed::None) => return None,
        (Observed::Default, Observed::Default) => r#"prop:"""#.to_string(),
        (Observed::GetPrefixed, Observed::Default) => r#"prop:"@""#.to_string(),
        _ => {
            let getter_tag = match &getter {
                Observed::None => None,
                Observed::Default => Some(r#"get:"""#.to_string()),
                Observed::GetPrefixed => Some(r#"get:"@""#.to_string()),
                Observed::Custom(name) => Some(format!(r#"get:"{name}""#)),
            };
            let setter_tag = match &setter {
                Observed::None => None,
                Observed::Default => Some(r#"set:"""#.to_string()),
                Observed::GetPrefixed => None,
                Observed::Custom(name) => Some(format!(r#"set:"{name}""#)),
            };
            getter_tag
                .into_iter()
                .chain(setter_tag)
                .collect::<Vec<_>>()
                .join(" ")
        }
    };

    Some(format!("`{tag}`"))
}
