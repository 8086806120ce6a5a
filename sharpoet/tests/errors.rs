//! Construction, structural and reference errors as callers see them.

use miette::Diagnostic;
use sharpoet::{
    CSharpFile, ClassName, CodeBlock, Error, FieldSpec, MethodSpec, Modifier, PropertySpec,
    TypeName, TypeSpec, args,
};

fn code(err: &Error) -> String {
    err.code().map(|code| code.to_string()).unwrap_or_default()
}

#[test]
fn test_enum_without_constants() {
    let err = TypeSpec::enum_builder("Color").build().unwrap_err();
    assert!(matches!(err, Error::Construction { .. }));
    assert_eq!(err.to_string(), "enum Color: an enum requires at least one constant");
    assert_eq!(code(&err), "sharpoet::construction");
}

#[test]
fn test_abstract_property_in_concrete_class() {
    let area = PropertySpec::builder(TypeName::DOUBLE, "Area")
        .add_modifiers([Modifier::Public, Modifier::Abstract])
        .auto_getter()
        .build()
        .unwrap();
    let err = TypeSpec::class_builder("Shape")
        .add_property(area)
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "class Shape: non-abstract type declares abstract member Area"
    );
}

#[test]
fn test_unterminated_control_flow() {
    let err = MethodSpec::method_builder("Loop")
        .begin_control_flow("while (true)", args![])
        .add_statement("Tick()", args![])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Structural { .. }));
    assert_eq!(code(&err), "sharpoet::structural");
}

#[test]
fn test_malformed_placeholders() {
    let missing = CodeBlock::of("$T $T", args![TypeName::INT]).unwrap_err();
    assert!(matches!(missing, Error::Structural { .. }));

    let unknown = CodeBlock::of("$Q", args![]).unwrap_err();
    assert!(unknown.to_string().contains("'$Q'"));

    let mixed = CodeBlock::of("$1L $L", args!["a", "b"]).unwrap_err();
    assert!(matches!(mixed, Error::Structural { .. }));
}

#[test]
fn test_invalid_reference_fails_rendering() {
    let broken = ClassName::new("App", "1Widget");
    let spec = TypeSpec::class_builder("Holder")
        .add_field(FieldSpec::builder(broken, "widget").build().unwrap())
        .build()
        .unwrap();
    let file = CSharpFile::builder("App", spec).build().unwrap();

    let err = file.render().unwrap_err();
    assert!(matches!(err, Error::InvalidReference { .. }));
    assert_eq!(code(&err), "sharpoet::invalid_reference");
    assert!(err.to_string().contains("App.1Widget"));
    assert!(file.imported_types().is_err());
}

#[test]
fn test_write_to_leaves_sink_untouched_on_failure() {
    let spec = TypeSpec::class_builder("Holder")
        .add_field(
            FieldSpec::builder(ClassName::new("", "Bad Name"), "value")
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let file = CSharpFile::builder("App", spec).build().unwrap();

    let mut out = String::from("existing");
    assert!(file.write_to(&mut out).is_err());
    assert_eq!(out, "existing");
}

#[test]
fn test_interface_field_must_be_static() {
    let err = TypeSpec::interface_builder("IConfig")
        .add_field(
            FieldSpec::builder(TypeName::INT, "Limit")
                .add_modifiers([Modifier::Public])
                .build()
                .unwrap(),
        )
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "interface IConfig: field Limit: requires modifiers static"
    );
}

#[test]
fn test_first_error_wins() {
    let err = TypeSpec::struct_builder("Pair")
        .superclass(ClassName::new("", "Base"))
        .add_enum_constant("First")
        .build()
        .unwrap_err();
    assert!(err.to_string().starts_with("struct Pair: only classes can extend"));
}

#[test]
fn test_statement_smuggled_through_nested_block() {
    let inner = CodeBlock::of("$[x()$]", args![]).unwrap();
    let err = MethodSpec::method_builder("Run")
        .add_statement("call($L)", args![inner])
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::Structural { .. }));
    assert!(err.to_string().contains("opened inside another statement"));
}

#[test]
fn test_stray_unindent_fails_at_build() {
    let err = CodeBlock::of("$<$[x()$]", args![]).unwrap_err();
    assert!(matches!(err, Error::Structural { .. }));

    let err = MethodSpec::method_builder("Run")
        .add_statement("$<x()", args![])
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "malformed code block: '$<' unindents past the level the block started at"
    );
}
