//! Demonstrate error handling for malformed extended sources.

use cppx_split::{Error, SplitOptions, convert_str};

fn report(label: &str, source: &str) {
    println!("{label}:");
    match convert_str(source, &SplitOptions::new("demo")) {
        Ok(_) => println!("  converted OK (unexpected)"),
        Err(Error::Scan(e)) => {
            println!("  Scan error: {e}");
            println!("  Kind: {:?}", e.kind);
            println!("  Line: {}", e.line);
        }
        Err(Error::Split(e)) => {
            println!("  Split error: {e}");
            println!(
                "  Location: line {}, column {}",
                e.position.line, e.position.column
            );
        }
        Err(e @ Error::Io { .. }) => println!("  I/O error: {e}"),
    }
    println!();
}

fn main() {
    report(
        "Unterminated string",
        "class A {\n  const char* s = \"unclosed;\n};\n",
    );
    report("Extra closing brace", "void f() {\n}\n}\n");
    report("Empty character literal", "char c = '';\n");
    report("Raw string without its delimiter", "auto s = R\"x(body)\";\n");
    report("Brace closed outside its parentheses", "({)}\n");
}
