use thiserror::Error;

use crate::element::ElementKind;

/// Error type produced while building or querying the device model.
///
/// Every construction-time variant aborts the whole parse. Only
/// [`SvdError::AttributeNotSet`] and [`SvdError::NotApplicable`] are returned
/// after construction, by accessors of optional attributes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SvdError {
    /// The node has the wrong tag, carries none of its mandatory content, or
    /// violates a structural invariant of its kind.
    #[error("malformed <{element}>: {reason}")]
    MalformedElement {
        element: ElementKind,
        reason: String,
    },
    /// A specific mandatory child element or attribute is absent.
    #[error("<{element}> is missing required '{tag}'")]
    MissingRequiredElement {
        element: ElementKind,
        tag: &'static str,
    },
    /// Text does not match any accepted numeric or boolean notation.
    #[error("<{element}> has invalid {expected} in '{tag}': '{text}'")]
    InvalidLiteral {
        element: ElementKind,
        tag: &'static str,
        text: String,
        expected: &'static str,
    },
    /// Text is not part of the closed vocabulary of the attribute.
    #[error("<{element}> has unknown {vocabulary} value '{text}' in '{tag}'")]
    UnknownEnumValue {
        element: ElementKind,
        tag: &'static str,
        vocabulary: &'static str,
        text: String,
    },
    /// `derivedFrom` names no sibling resolved earlier in the same collection.
    #[error("<{element}> '{name}' derives from unknown element '{reference}'")]
    UnresolvedDerivation {
        element: ElementKind,
        name: String,
        reference: String,
    },
    /// Following `derivedFrom` leads back to the deriving element.
    #[error("<{element}> '{name}' derives from '{reference}', which forms a cycle")]
    DerivationCycle {
        element: ElementKind,
        name: String,
        reference: String,
    },
    /// The optional attribute was absent from the document and has no default.
    #[error("{element} attribute '{attribute}' is not set")]
    AttributeNotSet {
        element: ElementKind,
        attribute: &'static str,
    },
    /// The attribute does not exist for this variant of the element.
    #[error("{element} attribute '{attribute}' is not applicable: {reason}")]
    NotApplicable {
        element: ElementKind,
        attribute: &'static str,
        reason: &'static str,
    },
}

impl SvdError {
    pub(crate) fn malformed(element: ElementKind, reason: impl Into<String>) -> Self {
        SvdError::MalformedElement {
            element,
            reason: reason.into(),
        }
    }
}
