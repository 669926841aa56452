//! The closed set of schemes this crate ships, looked up by code or name.

use crate::{
    dl21, gl19, ps16,
    error::GroupSigError,
    scheme::{GroupSignatureScheme, SchemeCode, SchemeDescription},
};

static SCHEMES: [&dyn GroupSignatureScheme; 4] =
    [&gl19::Gl19, &ps16::Ps16, &dl21::DL21, &dl21::DL21_SEQ];

/// All supported schemes in ascending order of code
pub fn schemes() -> impl Iterator<Item = &'static dyn GroupSignatureScheme> {
    SCHEMES.iter().copied()
}

pub fn is_supported(code: SchemeCode) -> bool {
    schemes().any(|s| s.description().code == code)
}

pub fn resolve(code: SchemeCode) -> Result<&'static dyn GroupSignatureScheme, GroupSigError> {
    schemes()
        .find(|s| s.description().code == code)
        .ok_or(GroupSigError::UnknownScheme(code.0))
}

pub fn description(code: SchemeCode) -> Result<&'static SchemeDescription, GroupSigError> {
    Ok(resolve(code)?.description())
}

/// Case-insensitive lookup by scheme name, e.g. `"PS16"` or `"dl21seq"`
pub fn code_from_name(name: &str) -> Result<SchemeCode, GroupSigError> {
    schemes()
        .map(|s| s.description())
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
        .map(|d| d.code)
        .ok_or_else(|| GroupSigError::UnknownSchemeName(name.to_string()))
}
