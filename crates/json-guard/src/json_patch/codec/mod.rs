//! JSON Patch codecs.

pub mod json;
