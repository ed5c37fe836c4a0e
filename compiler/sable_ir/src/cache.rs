//! Binary IR cache for cross-module reuse.
//!
//! A module compiled elsewhere is shipped as bytes and decoded here. Every
//! decoded function is marked [`FunctionOrigin::Deserialized`]: it was
//! already diagnosed when its own module was compiled, so mandatory
//! diagnostic passes skip it.

use std::fmt;

use crate::{FunctionOrigin, Module};

/// Failure to encode or decode a cached module.
#[derive(Debug)]
pub enum CacheError {
    Encode(bincode::Error),
    Decode(bincode::Error),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Encode(e) => write!(f, "failed to encode IR cache: {e}"),
            CacheError::Decode(e) => write!(f, "failed to decode IR cache: {e}"),
        }
    }
}

impl std::error::Error for CacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CacheError::Encode(e) | CacheError::Decode(e) => Some(e.as_ref()),
        }
    }
}

/// Serialize a module's IR.
pub fn encode_module(module: &Module) -> Result<Vec<u8>, CacheError> {
    bincode::serialize(module).map_err(CacheError::Encode)
}

/// Deserialize a module's IR, marking every function as deserialized.
pub fn decode_module(bytes: &[u8]) -> Result<Module, CacheError> {
    let mut module: Module = bincode::deserialize(bytes).map_err(CacheError::Decode)?;
    for func in &mut module.functions {
        func.origin = FunctionOrigin::Deserialized;
    }
    Ok(module)
}
