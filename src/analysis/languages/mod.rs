//! Language-specific structure extractors.

mod go;
mod java;
mod javascript;
mod python;
mod typescript;

pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use javascript::JavaScriptExtractor;
pub use python::PythonExtractor;
pub(crate) use python::unwrap_decorated;
pub use typescript::TypeScriptExtractor;

use super::StructureExtractor;
use crate::grammar::Language;
use once_cell::sync::Lazy;

/// Static storage for Go extractor.
static GO_EXTRACTOR: Lazy<GoExtractor> = Lazy::new(GoExtractor::new);

/// Static storage for Java extractor.
static JAVA_EXTRACTOR: Lazy<JavaExtractor> = Lazy::new(JavaExtractor::new);

/// Static storage for JavaScript extractor.
static JAVASCRIPT_EXTRACTOR: Lazy<JavaScriptExtractor> = Lazy::new(JavaScriptExtractor::new);

/// Static storage for Python extractor.
static PYTHON_EXTRACTOR: Lazy<PythonExtractor> = Lazy::new(PythonExtractor::new);

/// Static storage for TypeScript extractor.
static TYPESCRIPT_EXTRACTOR: Lazy<TypeScriptExtractor> = Lazy::new(TypeScriptExtractor::new);

/// Get the extractor for a language.
pub fn extractor_for(language: Language) -> &'static dyn StructureExtractor {
    match language {
        Language::Go => &*GO_EXTRACTOR,
        Language::Java => &*JAVA_EXTRACTOR,
        Language::JavaScript => &*JAVASCRIPT_EXTRACTOR,
        Language::Python => &*PYTHON_EXTRACTOR,
        Language::TypeScript => &*TYPESCRIPT_EXTRACTOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_an_extractor() {
        for language in Language::ALL {
            assert_eq!(extractor_for(language).language(), language);
        }
    }
}
