//! Typed extraction of child text and attributes.

use svd_xml::Node;

use crate::element::ElementKind;
use crate::error::SvdError;
use crate::literal::{self, BitPattern, LiteralError};
use crate::vocab::UnknownToken;

/// Failure of a single text decoder, before element context is attached.
#[derive(Debug)]
pub(crate) enum DecodeError {
    Literal(LiteralError),
    Token(UnknownToken),
}

impl From<LiteralError> for DecodeError {
    fn from(err: LiteralError) -> Self {
        DecodeError::Literal(err)
    }
}

impl From<UnknownToken> for DecodeError {
    fn from(err: UnknownToken) -> Self {
        DecodeError::Token(err)
    }
}

/// Conversion of raw element text into a typed value.
pub(crate) trait Decode: Sized {
    fn decode(text: &str) -> Result<Self, DecodeError>;
}

impl Decode for String {
    fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(text.trim().to_string())
    }
}

impl Decode for bool {
    fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(literal::parse_bool(text)?)
    }
}

impl Decode for u64 {
    fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(literal::parse_u64(text)?)
    }
}

impl Decode for u32 {
    fn decode(text: &str) -> Result<Self, DecodeError> {
        let value = literal::parse_u64(text)?;
        u32::try_from(value)
            .map_err(|_| LiteralError::new(text, "32-bit unsigned integer").into())
    }
}

impl Decode for BitPattern {
    fn decode(text: &str) -> Result<Self, DecodeError> {
        Ok(literal::parse_pattern(text)?)
    }
}

/// Reads the children and attributes of one node on behalf of an element kind.
pub(crate) struct Reader<'a> {
    node: &'a Node,
    kind: ElementKind,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(node: &'a Node, kind: ElementKind) -> Self {
        Reader { node, kind }
    }

    pub(crate) fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Decode the first `tag` child, failing if it is absent.
    pub(crate) fn required<T: Decode>(&self, tag: &'static str) -> Result<T, SvdError> {
        let child = self
            .node
            .child(tag)
            .ok_or(SvdError::MissingRequiredElement {
                element: self.kind,
                tag,
            })?;
        self.decode(tag, child.text())
    }

    /// Decode the first `tag` child if present.
    pub(crate) fn optional<T: Decode>(&self, tag: &'static str) -> Result<Option<T>, SvdError> {
        self.node
            .child(tag)
            .map(|child| self.decode(tag, child.text()))
            .transpose()
    }

    pub(crate) fn optional_or<T: Decode>(&self, tag: &'static str, default: T) -> Result<T, SvdError> {
        Ok(self.optional(tag)?.unwrap_or(default))
    }

    pub(crate) fn required_attr<T: Decode>(&self, name: &'static str) -> Result<T, SvdError> {
        let value = self
            .node
            .attribute(name)
            .ok_or(SvdError::MissingRequiredElement {
                element: self.kind,
                tag: name,
            })?;
        self.decode(name, value)
    }

    pub(crate) fn optional_attr<T: Decode>(&self, name: &'static str) -> Result<Option<T>, SvdError> {
        self.node
            .attribute(name)
            .map(|value| self.decode(name, value))
            .transpose()
    }

    pub(crate) fn optional_attr_or<T: Decode>(
        &self,
        name: &'static str,
        default: T,
    ) -> Result<T, SvdError> {
        Ok(self.optional_attr(name)?.unwrap_or(default))
    }

    fn decode<T: Decode>(&self, tag: &'static str, text: &str) -> Result<T, SvdError> {
        T::decode(text).map_err(|err| match err {
            DecodeError::Literal(err) => SvdError::InvalidLiteral {
                element: self.kind,
                tag,
                text: err.text,
                expected: err.expected,
            },
            DecodeError::Token(err) => SvdError::UnknownEnumValue {
                element: self.kind,
                tag,
                vocabulary: err.vocabulary,
                text: err.text,
            },
        })
    }
}

/// Turns an absent optional attribute into [`SvdError::AttributeNotSet`].
pub(crate) trait OptionExt<T> {
    fn or_not_set(self, element: ElementKind, attribute: &'static str) -> Result<T, SvdError>;
}

impl<T> OptionExt<T> for Option<T> {
    fn or_not_set(self, element: ElementKind, attribute: &'static str) -> Result<T, SvdError> {
        self.ok_or(SvdError::AttributeNotSet { element, attribute })
    }
}

/// Names whose presence flag is set, in the given order.
pub(crate) fn present(flags: &[(&'static str, bool)]) -> Vec<&'static str> {
    flags
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| *name)
        .collect()
}
