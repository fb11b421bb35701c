//! Static types as far as the emitter cares about them.

use smol_str::SmolStr;
use source_map::SourceLocation;

/// The resolved static type of a declaration or expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StaticType {
    /// `*` or no annotation.
    #[default]
    Any,
    Int,
    Uint,
    Number,
    String,
    Boolean,
    Object,
    Array,
    Void,
    Function,
    /// Any other class or interface, by the name written in source.
    Class(SmolStr),
}

impl StaticType {
    /// Maps an annotation's type name to a static type.
    pub fn from_name(name: &str) -> Self {
        match name {
            "*" => StaticType::Any,
            "int" => StaticType::Int,
            "uint" => StaticType::Uint,
            "Number" => StaticType::Number,
            "String" => StaticType::String,
            "Boolean" => StaticType::Boolean,
            "Object" => StaticType::Object,
            "Array" => StaticType::Array,
            "void" => StaticType::Void,
            "Function" => StaticType::Function,
            other => StaticType::Class(SmolStr::new(other)),
        }
    }

    /// Type expression used in generated doc annotations.
    pub fn doc_name(&self) -> &str {
        match self {
            StaticType::Any => "*",
            StaticType::Int | StaticType::Uint | StaticType::Number => "number",
            StaticType::String => "string",
            StaticType::Boolean => "boolean",
            StaticType::Object => "Object",
            StaticType::Array => "Array",
            StaticType::Void => "void",
            StaticType::Function => "Function",
            StaticType::Class(name) => name,
        }
    }

    /// `int` or `uint`, whose values are coerced at compile time.
    #[inline]
    pub fn is_integral(&self) -> bool {
        matches!(self, StaticType::Int | StaticType::Uint)
    }
}

/// A `:Type` clause as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAnnotation {
    /// Type name as written, e.g. `int` or `flash.events.Event`.
    pub name: SmolStr,
    pub ty: StaticType,
    /// From the colon through the end of the type name.
    pub loc: SourceLocation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_names() {
        assert_eq!(StaticType::from_name("int").doc_name(), "number");
        assert_eq!(StaticType::from_name("uint").doc_name(), "number");
        assert_eq!(StaticType::from_name("String").doc_name(), "string");
        assert_eq!(StaticType::from_name("*").doc_name(), "*");
        assert_eq!(StaticType::from_name("a.b.Widget").doc_name(), "a.b.Widget");
    }

    #[test]
    fn test_integral() {
        assert!(StaticType::Int.is_integral());
        assert!(StaticType::Uint.is_integral());
        assert!(!StaticType::Number.is_integral());
    }
}
