//! Scanner classification, losslessness and error tests.

mod common;

use common::{assert_lossless, kind_of, tokens_of};
use cppx_split::{BOM, ScanErrorKind, TokenKind, scan, scan_bytes};

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
// Losslessness.
// -----------------------------------------------------------

#[test]
fn widget_is_lossless() {
    let tokens = scan(WIDGET).expect("should scan");
    assert_lossless(WIDGET, &tokens);
}

#[test]
fn type_continuation_never_survives() {
    let tokens = scan(WIDGET).expect("should scan");
    assert!(tokens.iter().all(|t| t.kind != TokenKind::TypeContinuation));
}

#[test]
fn unclassified_bytes_become_passthrough() {
    let source = "int x = 1 + 2;";
    let tokens = scan(source).expect("should scan");
    assert_lossless(source, &tokens);
    assert!(tokens.iter().any(|t| t.kind == TokenKind::Passthrough));
}

#[test]
fn non_ascii_text_is_preserved() {
    let source = "auto s = \"héllo\"; // ünïcode\nchar32_t c = 'é';\n";
    let tokens = scan(source).expect("should scan");
    assert_lossless(source, &tokens);
}

// -----------------------------------------------------------
// Classification.
// -----------------------------------------------------------

#[test]
fn widget_classification() {
    let tokens = tokens_of(WIDGET);
    assert_eq!(tokens[0].0, TokenKind::Comment);
    assert_eq!(kind_of(&tokens, "#include <string>\n"), TokenKind::Directive);
    assert_eq!(kind_of(&tokens, "public:"), TokenKind::AccessModifier);
    assert_eq!(kind_of(&tokens, "private:"), TokenKind::AccessModifier);
    assert_eq!(
        kind_of(&tokens, ": size_(0), name_(\"w\")"),
        TokenKind::InitializerList
    );
    assert_eq!(kind_of(&tokens, "size"), TokenKind::FunctionName);
    assert_eq!(kind_of(&tokens, "std::string"), TokenKind::Identifier);
}

#[test]
fn constructor_and_destructor_names() {
    let tokens = tokens_of(WIDGET);
    let names: Vec<_> = tokens
        .iter()
        .filter(|(k, _)| *k == TokenKind::ConstructorDestructor)
        .map(|(_, t)| t.as_str())
        .collect();
    assert_eq!(names, vec!["Widget", "Widget"]);
}

#[test]
fn constructor_initializer_list() {
    let source = "namespace A { class B { B() : x(1) {} }; }";
    let tokens = tokens_of(source);
    // The class name itself comes first and stays an identifier.
    assert_eq!(kind_of(&tokens, "B"), TokenKind::Identifier);
    let ctor: Vec<_> = tokens
        .iter()
        .filter(|(k, _)| *k == TokenKind::ConstructorDestructor)
        .collect();
    assert_eq!(ctor.len(), 1);
    assert_eq!(ctor[0].1, "B");
    assert_eq!(kind_of(&tokens, ": x(1)"), TokenKind::InitializerList);
}

#[test]
fn class_frame_survives_constructor_body() {
    // The method after the constructor still sits in the class, so its
    // name is compared against `B` and classified as a plain function.
    let source = "class B { B() : x(1) {} int f() { return x; } B(int) {} };";
    let tokens = tokens_of(source);
    assert_eq!(kind_of(&tokens, "f"), TokenKind::FunctionName);
    let ctors = tokens
        .iter()
        .filter(|(k, _)| *k == TokenKind::ConstructorDestructor)
        .count();
    assert_eq!(ctors, 2);
}

#[test]
fn calls_inside_bodies_are_not_declarations() {
    let tokens = tokens_of("void f() { g(1); }");
    assert_eq!(kind_of(&tokens, "f"), TokenKind::FunctionName);
    assert_eq!(kind_of(&tokens, "g"), TokenKind::Identifier);
}

#[test]
fn enum_class_is_an_enumeration() {
    let source = "enum class Color { Red, Green };";
    let tokens = tokens_of(source);
    assert_eq!(kind_of(&tokens, "enum"), TokenKind::EnumKeyword);
    assert_eq!(kind_of(&tokens, "class"), TokenKind::ClassKeyword);
}

#[test]
fn block_comment_absorbs_trailing_whitespace() {
    let tokens = tokens_of("/* one */\n\nint x;");
    assert_eq!(tokens[0], (TokenKind::Comment, "/* one */\n\n".to_string()));
}

#[test]
fn adjacent_comments_merge() {
    let tokens = tokens_of("/* a */ /* b */int x;");
    assert_eq!(tokens[0], (TokenKind::Comment, "/* a */ /* b */".to_string()));
}

#[test]
fn operator_overload_names_a_function() {
    let tokens = tokens_of("class C { bool operator==(const C& o) const { return true; } };");
    assert_eq!(kind_of(&tokens, "operator"), TokenKind::FunctionName);
}

#[test]
fn conditional_default_argument_is_not_an_initializer_list() {
    let source = "class B { B(int x = c ? 1 : 2) {} };";
    let tokens = scan(source).expect("should scan");
    assert_lossless(source, &tokens);
    assert!(tokens.iter().all(|t| t.kind != TokenKind::InitializerList));
    assert_eq!(
        tokens
            .iter()
            .filter(|t| t.kind == TokenKind::ConstructorDestructor)
            .count(),
        1
    );
}

#[test]
fn byte_order_mark_is_its_own_token() {
    let source = "\u{feff}// banner\nint x;";
    let tokens = scan(source).expect("should scan");
    assert_lossless(source, &tokens);
    assert_eq!(tokens[0].kind, TokenKind::Passthrough);
    assert_eq!(tokens[0].text(source).as_bytes(), BOM);
    assert_eq!(tokens[1].kind, TokenKind::Comment);
}

#[test]
fn latin1_bytes_scan() {
    let source = b"// caf\xe9\nchar c = '\xe9';\nint f() { return 1; }";
    let tokens = scan_bytes(source).expect("should scan");
    assert_eq!(tokens[0].bytes(source), b"// caf\xe9");
    let rebuilt: Vec<u8> = tokens.iter().flat_map(|t| t.bytes(source).to_vec()).collect();
    assert_eq!(rebuilt, source);
}

// -----------------------------------------------------------
// Escapes.
// -----------------------------------------------------------

#[test]
fn universal_character_names() {
    let source = r#"auto a = "\u00e9"; auto b = "\U0001F600";"#;
    let tokens = tokens_of(source);
    assert_eq!(kind_of(&tokens, r#""\u00e9""#), TokenKind::StringLiteral);
    assert_eq!(kind_of(&tokens, r#""\U0001F600""#), TokenKind::StringLiteral);
}

#[test]
fn question_mark_and_octal_escapes() {
    let tokens = tokens_of(r#"auto q = "\?"; auto o = "\101"; char z = '\0';"#);
    assert_eq!(kind_of(&tokens, r#""\?""#), TokenKind::StringLiteral);
    assert_eq!(kind_of(&tokens, r#""\101""#), TokenKind::StringLiteral);
}

#[test]
fn hex_escape_needs_digits() {
    let err = scan(r#"auto s = "\xZ";"#).unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::MalformedEscape);
}

#[test]
fn short_universal_character_name_is_rejected() {
    let err = scan(r#"auto s = "\u12";"#).unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::MalformedEscape);
}

// -----------------------------------------------------------
// Raw strings.
// -----------------------------------------------------------

#[test]
fn raw_string_with_custom_delimiter() {
    let source = r#"auto s = R"DELIM(a)not-end)DELIM";"#;
    let tokens = tokens_of(source);
    let strings: Vec<_> = tokens
        .iter()
        .filter(|(k, _)| *k == TokenKind::StringLiteral)
        .collect();
    assert_eq!(strings.len(), 1);
    assert_eq!(strings[0].1, r#""DELIM(a)not-end)DELIM""#);
    assert_eq!(kind_of(&tokens, ";"), TokenKind::StatementTerminator);
}

#[test]
fn raw_string_spans_lines() {
    let source = "auto s = R\"(line one\n\"quoted\" line two)\";\nint x;";
    let tokens = tokens_of(source);
    assert_eq!(
        kind_of(&tokens, "\"(line one\n\"quoted\" line two)\""),
        TokenKind::StringLiteral
    );
}

#[test]
fn raw_string_without_closing_delimiter() {
    let err = scan("auto s = R\"x(abc)y\";").unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::InvalidRawString);
}

// -----------------------------------------------------------
// Errors.
// -----------------------------------------------------------

#[test]
fn extra_closing_brace() {
    let err = scan("int a;\nvoid f() {}\n}\n").unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::UnbalancedBrace);
    assert_eq!(err.line, 3);
    assert_eq!(err.snippet, "}");
}

#[test]
fn extra_closing_parenthesis() {
    let err = scan("int a;\nint b;\nint c = f(1));\n").unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::UnbalancedParenthesis);
    assert_eq!(err.line, 3);
}

#[test]
fn unterminated_string_reports_start_line() {
    let err = scan("int a;\nauto s = \"abc\nint b;\n").unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::UnterminatedLiteral);
    assert_eq!(err.line, 2);
    assert_eq!(err.snippet, "\"abc");
}

#[test]
fn unterminated_block_comment() {
    let err = scan("int a;\n/* never\nclosed").unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::UnterminatedComment);
    assert_eq!(err.line, 2);
}

#[test]
fn char_literal_with_two_characters() {
    let err = scan("char c = 'ab';").unwrap_err();
    assert_eq!(err.kind, ScanErrorKind::MissingCharDelimiter);
}

#[test]
fn error_display() {
    let err = scan("x = '';").unwrap_err();
    assert_eq!(
        err.to_string(),
        "empty character literal at line 1 near `';`"
    );
}
