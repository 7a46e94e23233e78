//! Validation modules

pub mod expression;

pub use expression::{compile, ExpressionKind, ValidationMap, Validator, ValidatorKind};
