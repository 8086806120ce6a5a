//! Identifier rules for C# declarations.

/// Reserved C# keywords. Contextual keywords (`var`, `value`, `get`, ...) are
/// legal identifiers and are not listed.
const KEYWORDS: &[&str] = &[
    "abstract",
    "as",
    "base",
    "bool",
    "break",
    "byte",
    "case",
    "catch",
    "char",
    "checked",
    "class",
    "const",
    "continue",
    "decimal",
    "default",
    "delegate",
    "do",
    "double",
    "else",
    "enum",
    "event",
    "explicit",
    "extern",
    "false",
    "finally",
    "fixed",
    "float",
    "for",
    "foreach",
    "goto",
    "if",
    "implicit",
    "in",
    "int",
    "interface",
    "internal",
    "is",
    "lock",
    "long",
    "namespace",
    "new",
    "null",
    "object",
    "operator",
    "out",
    "override",
    "params",
    "private",
    "protected",
    "public",
    "readonly",
    "ref",
    "return",
    "sbyte",
    "sealed",
    "short",
    "sizeof",
    "stackalloc",
    "static",
    "string",
    "struct",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "uint",
    "ulong",
    "unchecked",
    "unsafe",
    "ushort",
    "using",
    "virtual",
    "void",
    "volatile",
    "while",
];

const OPERATOR_TOKENS: &[&str] = &[
    "+", "-", "!", "~", "++", "--", "true", "false", "*", "/", "%", "&", "|", "^", "<<", ">>",
    ">>>", "==", "!=", "<", ">", "<=", ">=",
];

/// Check if `name` is a reserved C# keyword.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains(&name)
}

/// Check if `name` is a legal C# identifier.
///
/// A leading `@` marks a verbatim identifier, which may spell a keyword.
pub fn is_valid_identifier(name: &str) -> bool {
    let (verbatim, body) = match name.strip_prefix('@') {
        Some(rest) => (true, rest),
        None => (false, name),
    };
    let mut chars = body.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_alphanumeric() || c == '_') {
        return false;
    }
    verbatim || !is_keyword(body)
}

/// Check if `path` is a dotted namespace made of legal identifiers.
pub fn is_valid_namespace(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(is_valid_identifier)
}

/// Check if `token` names an overloadable operator.
pub fn is_operator_token(token: &str) -> bool {
    OPERATOR_TOKENS.contains(&token)
}
