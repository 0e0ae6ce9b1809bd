use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Vector widths a directive may request.
pub const VECTOR_WIDTHS: [u32; 3] = [2, 4, 8];

/// How the transformation pass should treat one loop.
///
/// On the wire this is `{"disable": true}` or `{"width": N}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "DirectiveRepr", try_from = "DirectiveRepr")]
pub enum Directive {
    Disable,
    Width(u32),
}

/// Directives for one evaluation keyed by loop id.
///
/// A `BTreeMap` so the directive file is written in a stable order.
pub type DirectiveMap = BTreeMap<String, Directive>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidDirective {
    #[error("unsupported vector width {0}")]
    Width(u32),
    #[error("directive must be either {{\"disable\": true}} or {{\"width\": N}}")]
    Shape,
}

#[derive(Serialize, Deserialize)]
struct DirectiveRepr {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
}

impl From<Directive> for DirectiveRepr {
    fn from(directive: Directive) -> Self {
        match directive {
            Directive::Disable => DirectiveRepr { disable: Some(true), width: None },
            Directive::Width(w) => DirectiveRepr { disable: None, width: Some(w) },
        }
    }
}

impl TryFrom<DirectiveRepr> for Directive {
    type Error = InvalidDirective;

    fn try_from(repr: DirectiveRepr) -> Result<Self, Self::Error> {
        match (repr.disable, repr.width) {
            (Some(true), None) => Ok(Directive::Disable),
            (None | Some(false), Some(w)) if VECTOR_WIDTHS.contains(&w) => Ok(Directive::Width(w)),
            (None | Some(false), Some(w)) => Err(InvalidDirective::Width(w)),
            _ => Err(InvalidDirective::Shape),
        }
    }
}
