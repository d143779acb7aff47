//! Safe embedding of arbitrary text into Groovy string literals.
//!
//! Dockerfile content reaches the pipeline script from outside and may
//! contain anything Groovy treats as syntax: quotes, `$` interpolation
//! sigils, backslashes. Two strategies carry it across the boundary. The
//! base64 envelope survives arbitrary content and is used for scripts that
//! actually run; the escaped heredoc keeps the content readable and is used
//! for previews.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// How the build-file text is carried inside the rendered script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedStrategy {
    /// Base64 payload in a single-quoted literal, decoded by the script at
    /// execution time. Immune to any content.
    Base64,
    /// Backslash-escaped text in a triple-double-quoted literal. Readable in
    /// preview output; decoding under Groovy's escape rules reproduces the
    /// input byte for byte.
    Heredoc,
}

/// Encode `text` so it can sit inside a Groovy literal without interfering
/// with the surrounding script.
///
/// The consumption site must match the strategy: a base64 payload needs a
/// `decodeBase64()` call, a heredoc payload needs a `"""…"""` wrapper.
pub fn encode_for_embedding(text: &str, strategy: EmbedStrategy) -> String {
    match strategy {
        EmbedStrategy::Base64 => STANDARD.encode(text.as_bytes()),
        EmbedStrategy::Heredoc => escape_groovy(text),
    }
}

/// Escape for a triple-double-quoted Groovy string.
///
/// Order matters: backslash first, so the backslashes introduced for `$`
/// and `"` are not themselves re-escaped. With every `"` escaped, no `"""`
/// delimiter can survive in the payload, so the literal cannot be closed
/// early by hostile content.
fn escape_groovy(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('$', "\\$")
        .replace('"', "\\\"")
}
