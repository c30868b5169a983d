use std::str::FromStr;

use crate::{dom::node::Element, error::AutofillError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
}

/// One compound selector: `tag#id.class[attr="v"]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != el.tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id() != id {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|test| match test {
            AttrTest::Present(name) => el.has_attr(name),
            AttrTest::Equals(name, value) => el.attr(name) == Some(value.as_str()),
        })
    }
}

/// A comma-separated list of compound selectors. No combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Selector, AutofillError> {
        let alternatives = input
            .split(',')
            .map(|part| parse_compound(part.trim()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| AutofillError::InvalidSelector {
                selector: input.to_string(),
                reason,
            })?;

        Ok(Selector { alternatives })
    }

    /// Selector matching an exact attribute value.
    pub fn attribute(name: &str, value: &str) -> Selector {
        Selector {
            alternatives: vec![Compound {
                attrs: vec![AttrTest::Equals(name.to_string(), value.to_string())],
                ..Compound::default()
            }],
        }
    }

    /// Selector matching an exact id.
    pub fn id(id: &str) -> Selector {
        Selector {
            alternatives: vec![Compound {
                id: Some(id.to_string()),
                ..Compound::default()
            }],
        }
    }

    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

impl FromStr for Selector {
    type Err = AutofillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(part: &str) -> Result<Compound, String> {
    if part.is_empty() {
        return Err("empty selector".into());
    }

    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars[0] == '*' {
        pos = 1;
    } else if is_ident_char(chars[0]) {
        compound.tag = Some(take_ident(&chars, &mut pos).to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err("empty id".into());
                }
                compound.id = Some(id);
            }
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err("empty class".into());
                }
                compound.classes.push(class);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos)?);
            }
            c => return Err(format!("unexpected '{}'", c)),
        }
    }

    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Result<AttrTest, String> {
    let name = take_ident(chars, pos).to_ascii_lowercase();
    if name.is_empty() {
        return Err("empty attribute name".into());
    }

    match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            Ok(AttrTest::Present(name))
        }
        Some('=') => {
            *pos += 1;
            let value = match chars.get(*pos) {
                Some(&quote @ ('"' | '\'')) => {
                    *pos += 1;
                    let start = *pos;
                    while *pos < chars.len() && chars[*pos] != quote {
                        *pos += 1;
                    }
                    if *pos >= chars.len() {
                        return Err("unterminated attribute value".into());
                    }
                    let value: String = chars[start..*pos].iter().collect();
                    *pos += 1;
                    value
                }
                _ => take_ident(chars, pos),
            };
            if chars.get(*pos) != Some(&']') {
                return Err("expected ']'".into());
            }
            *pos += 1;
            Ok(AttrTest::Equals(name, value))
        }
        _ => Err("malformed attribute selector".into()),
    }
}
