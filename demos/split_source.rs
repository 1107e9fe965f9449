//! Split an extended source held in memory and print both halves.

use cppx_split::{SplitOptions, TokenKind, convert_str, scan};

const SOURCE: &str = r#"// Counter with inline methods
#include <cstddef>

namespace demo {
class Counter {
public:
    Counter() : count_(0) {}
    void add(std::size_t n) { count_ += n; }
    std::size_t count() const { return count_; }
private:
    std::size_t count_;
};
}
"#;

fn main() {
    let tokens = match scan(SOURCE) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("error: {e}");
            return;
        }
    };

    let functions = tokens
        .iter()
        .filter(|t| {
            matches!(
                t.kind,
                TokenKind::FunctionName | TokenKind::ConstructorDestructor
            )
        })
        .count();
    println!("{} tokens, {functions} function name(s)", tokens.len());
    println!();

    let options = SplitOptions::new("counter");
    match convert_str(SOURCE, &options) {
        Ok(out) => {
            println!("--- {} ---", options.header_file_name());
            print!("{}", out.declarations);
            println!("--- counter.cpp ---");
            print!("{}", out.definitions);
        }
        Err(e) => eprintln!("error: {e}"),
    }
}
