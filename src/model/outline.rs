//! Structural outline recovered from Go source.
//!
//! Serialises as nested `if:` / `then:` / `else:` / `else if:` entries with
//! one root item per function declaration.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionOutline {
    pub function: String,
    pub body: Vec<Conditional>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conditional {
    #[serde(rename = "if")]
    pub condition: String,
    pub then: Vec<Conditional>,
    #[serde(flatten)]
    pub otherwise: Option<Alternative>,
}

/// `else { … }` and `else if …` stay distinct, a chain is never flattened.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Alternative {
    #[serde(rename = "else")]
    Else(Vec<Conditional>),
    #[serde(rename = "else if")]
    ElseIf(Box<Conditional>),
}
