//! Declaration/definition split tests.

mod common;

use common::split_str;
use cppx_split::{SplitErrorKind, SplitOptions, convert_str, include_guard_name, scan, split};
use pretty_assertions::assert_eq;

const WIDGET: &str = r#"// Widget declarations
#include <string>

namespace app {
class Widget : public Base {
public:
    Widget() : size_(0), name_("w") {}
    ~Widget() {}
    int size() const { return size_; }
private:
    int size_;
    std::string name_;
};
}
"#;

// -----------------------------------------------------------
// Whole-file output.
// -----------------------------------------------------------

#[test]
fn inline_method_in_namespaced_class() {
    let out = split_str(
        "namespace N { class C { int f() { return 1; } }; }\n",
        "c",
    );
    assert_eq!(
        out.declarations,
        "#ifndef N_C_H\n\
         #define N_C_H\n\
         namespace N { class C { int f(); }; }\n\
         #endif // N_C_H\n"
    );
    assert_eq!(
        out.definitions,
        "#include \"c.h\"\n\nint N::C::f() { return 1; }\n"
    );
}

#[test]
fn constructor_with_initializer_list() {
    let out = split_str("namespace A { class B { B() : x(1) {} }; }", "x");
    assert_eq!(
        out.declarations,
        "#ifndef A_X_H\n\
         #define A_X_H\n\
         namespace A { class B { B(); }; }\n\
         #endif // A_X_H\n"
    );
    assert_eq!(out.definitions, "#include \"x.h\"\n\nA::B::B() : x(1) {}\n");
}

#[test]
fn widget_declarations() {
    let out = split_str(WIDGET, "widget");
    let expected = "// Widget declarations
#ifndef APP_WIDGET_H
#define APP_WIDGET_H

#include <string>

namespace app {
class Widget : public Base {
public:
    Widget();
    ~Widget();
    int size() const;
private:
    int size_;
    std::string name_;
};
}
#endif // APP_WIDGET_H
";
    assert_eq!(out.declarations, expected);
}

#[test]
fn widget_definitions() {
    let out = split_str(WIDGET, "widget");
    let expected = r#"// Widget declarations
#include "widget.h"

app::Widget::Widget() : size_(0), name_("w") {}

app::Widget::~Widget() {}

int app::Widget::size() const { return size_; }
"#;
    assert_eq!(out.definitions, expected);
}

// -----------------------------------------------------------
// Qualification.
// -----------------------------------------------------------

#[test]
fn nested_namespaces_qualify_free_functions() {
    let out = split_str("namespace a { namespace b { void f() {} } }", "x");
    assert!(out.definitions.contains("void a::b::f() {}"));
    assert!(out.declarations.contains("void f();"));
}

#[test]
fn nested_classes_qualify_methods() {
    let out = split_str(
        "class Outer { class Inner { int g() { return 2; } }; };",
        "x",
    );
    assert!(out.definitions.contains("int Outer::Inner::g() { return 2; }"));
}

#[test]
fn forward_declaration_opens_no_scope() {
    let out = split_str("class Fwd;\nint h() { return 3; }\n", "x");
    assert!(out.declarations.contains("class Fwd;"));
    assert!(out.definitions.contains("int h() { return 3; }"));
    assert!(!out.definitions.contains("Fwd::"));
}

#[test]
fn method_after_constructor_keeps_class_scope() {
    let out = split_str(
        "namespace A { class B { B() : x(1) {} int f() { return x; } }; }",
        "x",
    );
    assert!(out.definitions.contains("A::B::B() : x(1) {}"));
    assert!(out.definitions.contains("int A::B::f() { return x; }"));
}

#[test]
fn enums_and_prototypes_stay_in_declarations() {
    let out = split_str(
        "enum class Color { Red, Green };\nstruct P { int x() { return 0; } int y(); };\n",
        "x",
    );
    assert!(out.declarations.contains("enum class Color { Red, Green };"));
    assert!(out.declarations.contains("struct P { int x(); int y(); };"));
    assert!(out.definitions.contains("int P::x() { return 0; }"));
    assert!(!out.definitions.contains("y()"));
}

#[test]
fn operator_overload_is_qualified() {
    let out = split_str(
        "namespace N { class C { bool operator==(const C& o) const { return true; } }; }",
        "c",
    );
    assert!(out.declarations.contains("bool operator==(const C& o) const;"));
    assert!(
        out.definitions
            .contains("bool N::C::operator==(const C& o) const { return true; }")
    );
}

#[test]
fn constructor_with_conditional_default_argument() {
    let out = split_str("class B { B(int x = c ? 1 : 2) {} };", "b");
    assert!(out.declarations.contains("class B { B(int x = c ? 1 : 2); };"));
    assert!(out.definitions.contains("B::B(int x = c ? 1 : 2) {}"));
}

// -----------------------------------------------------------
// Include guard and options.
// -----------------------------------------------------------

#[test]
fn guard_from_leading_namespaces() {
    let out = split_str("namespace A { namespace B { class C; } }", "x");
    assert_eq!(out.include_guard, "A_B_X_H");
}

#[test]
fn guard_without_namespaces() {
    let out = split_str("int x;\n", "my-file");
    assert_eq!(out.include_guard, "MY_FILE_H");
    assert_eq!(
        include_guard_name(&["a".to_string()], "b"),
        "A_B_H".to_string()
    );
}

#[test]
fn using_namespace_is_left_out_of_the_guard() {
    let out = split_str("using namespace std;\nnamespace a { class C; }", "x");
    assert_eq!(out.include_guard, "A_X_H");
}

#[test]
fn byte_order_mark_stays_first() {
    let out = split_str("\u{feff}// banner\nint f() { return 0; }\n", "x");
    assert_eq!(
        out.declarations,
        "\u{feff}// banner\n\
         #ifndef X_H\n\
         #define X_H\n\
         \n\
         int f();\n\
         #endif // X_H\n"
    );
    assert_eq!(
        out.definitions,
        "\u{feff}// banner\n#include \"x.h\"\n\nint f() { return 0; }\n"
    );
}

#[test]
fn options_disable_include_and_guard() {
    let options = SplitOptions::new("w")
        .include_header(false)
        .include_guard(false);
    let out = convert_str("void f() {}\n", &options).expect("should convert");
    assert_eq!(out.declarations, "void f();\n");
    assert_eq!(out.definitions, "void f() {}\n");
}

#[test]
fn custom_header_extension() {
    let options = SplitOptions::new("w").header_extension("hpp");
    let out = convert_str("int x;\n", &options).expect("should convert");
    assert_eq!(out.definitions, "#include \"w.hpp\"\n");
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn scan_errors_surface_through_convert() {
    let err = convert_str("int a;\n}\n", &SplitOptions::new("x")).unwrap_err();
    assert!(matches!(err, cppx_split::Error::Scan(_)));
    assert_eq!(
        err.to_string(),
        "extra '}' without a matching '{' at line 2 near `}`"
    );
}

#[test]
fn brace_closed_outside_its_parentheses() {
    let source = "({)}";
    let tokens = scan(source).expect("should scan");
    let err = split(source, &tokens, &SplitOptions::new("x")).unwrap_err();
    assert_eq!(err.kind, SplitErrorKind::UnbalancedBrace);
    assert_eq!(err.position.column, 4);
}
