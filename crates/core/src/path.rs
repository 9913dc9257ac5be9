//! Dotted field paths used to address fields of a resource.
//!
//! A path is a sequence of named segments with optional list indices,
//! e.g. `spec.template.spec.containers[0].image`. Segments containing
//! dots can be quoted: `metadata.annotations."app.oam.dev/name"`.

use crate::error::PathError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Segment {
    Field(String),
    Index(usize),
}

impl Segment {
    pub fn as_field(&self) -> Option<&str> {
        match self {
            Segment::Field(name) => Some(name),
            Segment::Index(_) => None,
        }
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }
}

/// A parsed dotted field path. Serializes as its display form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let chars: Vec<char> = path.chars().collect();
        let mut segments = Vec::new();
        let mut pos = 0usize;

        loop {
            // Segment name: quoted or bare.
            if chars.get(pos) == Some(&'"') {
                let start = pos + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != '"' {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(PathError::UnterminatedQuote {
                        path: path.to_owned(),
                    });
                }
                let name: String = chars[start..end].iter().collect();
                if name.is_empty() {
                    return Err(PathError::EmptySegment {
                        path: path.to_owned(),
                    });
                }
                segments.push(Segment::Field(name));
                pos = end + 1;
            } else {
                let start = pos;
                while pos < chars.len() && chars[pos] != '.' && chars[pos] != '[' {
                    if chars[pos] == ']' || chars[pos] == '"' {
                        return Err(PathError::UnexpectedChar {
                            path: path.to_owned(),
                            ch: chars[pos],
                            offset: pos,
                        });
                    }
                    pos += 1;
                }
                if pos == start {
                    return Err(PathError::EmptySegment {
                        path: path.to_owned(),
                    });
                }
                segments.push(Segment::Field(chars[start..pos].iter().collect()));
            }

            // Any number of list indices.
            while chars.get(pos) == Some(&'[') {
                let start = pos + 1;
                let mut end = start;
                while end < chars.len() && chars[end] != ']' {
                    end += 1;
                }
                if end >= chars.len() {
                    return Err(PathError::UnterminatedIndex {
                        path: path.to_owned(),
                    });
                }
                let text: String = chars[start..end].iter().collect();
                let index = text.parse::<usize>().map_err(|_| PathError::InvalidIndex {
                    path: path.to_owned(),
                    index: text.clone(),
                })?;
                segments.push(Segment::Index(index));
                pos = end + 1;
            }

            match chars.get(pos) {
                None => break,
                Some('.') => {
                    pos += 1;
                    if pos >= chars.len() {
                        return Err(PathError::EmptySegment {
                            path: path.to_owned(),
                        });
                    }
                }
                Some(&ch) => {
                    return Err(PathError::UnexpectedChar {
                        path: path.to_owned(),
                        ch,
                        offset: pos,
                    })
                }
            }
        }

        Ok(FieldPath(segments))
    }

    /// Parse a path the caller wrote by hand; a malformed path is a bug in
    /// the definition and aborts.
    pub(crate) fn expect_valid(path: &str) -> Self {
        FieldPath::parse(path).unwrap_or_else(|e| panic!("invalid field path: {e}"))
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldPath::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.0.iter().enumerate() {
            match seg {
                Segment::Field(name) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    if name.contains(['.', '[', ']', '"']) {
                        write!(f, "\"{}\"", name)?;
                    } else {
                        f.write_str(name)?;
                    }
                }
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}
