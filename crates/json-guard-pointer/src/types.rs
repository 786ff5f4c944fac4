//! Type definitions for paths.

/// One unescaped step of a path: an object key or an array index.
pub type PathStep = String;

/// A parsed path. The empty path addresses the document root.
pub type Path = Vec<PathStep>;
