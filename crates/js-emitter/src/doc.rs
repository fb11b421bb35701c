//! JSDoc blocks and inline type annotations for the generated code.

use crate::writer::Emitter;
use as_parser::{Function, Modifiers, StaticType, Visibility};

/// Tags of one `/** ... */` block, in output order.
#[derive(Debug, Default)]
pub(crate) struct JsDoc {
    tags: Vec<String>,
}

impl JsDoc {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tags.push(tag.into());
        self
    }

    /// A block opened with the visibility tag of a class member.
    pub(crate) fn member(modifiers: &Modifiers) -> Self {
        let mut doc = Self::new();
        doc.tag(visibility_tag(modifiers.visibility));
        doc
    }

    /// `@param` and `@return` tags of a function signature.
    pub(crate) fn signature(&mut self, function: &Function) -> &mut Self {
        for param in &function.params {
            let ty = param.ty.as_ref().map_or("*", |t| t.ty.doc_name());
            let ty = if param.rest {
                format!("...{}", ty)
            } else if param.default.is_some() {
                format!("{}=", ty)
            } else {
                ty.to_string()
            };
            self.tag(format!("@param {{{}}} {}", ty, param.name.name));
        }
        if let Some(ret) = &function.return_type {
            if ret.ty != StaticType::Void {
                self.tag(format!("@return {{{}}}", ret.ty.doc_name()));
            }
        }
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

pub(crate) fn visibility_tag(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "@export",
        Visibility::Protected => "@protected",
        Visibility::Private => "@private",
        Visibility::Internal => "@package",
    }
}

/// `/** @type {T} */ ` or `/** @const {T} */ ` in front of a variable name.
pub(crate) fn inline_type(ty: &StaticType, constant: bool) -> String {
    let tag = if constant { "@const" } else { "@type" };
    format!("/** {} {{{}}} */ ", tag, ty.doc_name())
}

impl Emitter<'_> {
    /// Writes a doc block followed by a line break at the current indentation.
    pub(crate) fn write_doc(&mut self, doc: &JsDoc) {
        if doc.is_empty() {
            return;
        }
        self.write("/**");
        for tag in &doc.tags {
            self.newline();
            self.write(" * ");
            self.write(tag);
        }
        self.newline();
        self.write(" */");
        self.newline();
    }

    /// `// path:line` ahead of a declaration, when debug comments are on.
    pub(crate) fn write_debug_comment(&mut self, line: i32) {
        if !self.options.emit_debug_comments {
            return;
        }
        let comment = format!("// {}:{}", self.unit.path, line + 1);
        self.write(&comment);
        self.newline();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_type() {
        assert_eq!(inline_type(&StaticType::Int, false), "/** @type {number} */ ");
        assert_eq!(inline_type(&StaticType::String, true), "/** @const {string} */ ");
        assert_eq!(inline_type(&StaticType::Any, false), "/** @type {*} */ ");
    }

    #[test]
    fn test_visibility_tags() {
        assert_eq!(visibility_tag(Visibility::Public), "@export");
        assert_eq!(visibility_tag(Visibility::Internal), "@package");
    }
}
