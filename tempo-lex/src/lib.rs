#![forbid(unsafe_code)]

mod lexer;
mod token;

pub use lexer::{LexError, Lexer};
pub use token::{Token, TokenKind};

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        Lexer::new(src)
            .lex()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_function_header_with_annotation() {
        let got = kinds("def loop2(n, m) -> \"n * m\":\n    pass\n");
        assert_eq!(
            got,
            vec![
                TokenKind::KwDef,
                TokenKind::Ident("loop2".to_string()),
                TokenKind::LParen,
                TokenKind::Ident("n".to_string()),
                TokenKind::Comma,
                TokenKind::Ident("m".to_string()),
                TokenKind::RParen,
                TokenKind::Arrow,
                TokenKind::String("n * m".to_string()),
                TokenKind::Colon,
                TokenKind::Newline,
                TokenKind::Indent,
                TokenKind::KwPass,
                TokenKind::Newline,
                TokenKind::Dedent,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn lex_nested_blocks_close_every_indent() {
        let src = "def f(n):\n    if n <= 0:\n        pass\n    else:\n        f(n-1)\n";
        let got = kinds(src);
        let indents = got.iter().filter(|k| **k == TokenKind::Indent).count();
        let dedents = got.iter().filter(|k| **k == TokenKind::Dedent).count();
        assert_eq!(indents, 3);
        assert_eq!(dedents, 3);
        assert!(got.contains(&TokenKind::Le));
        assert!(got.contains(&TokenKind::Minus));
    }

    #[test]
    fn lex_int_literals_with_bases_and_underscores() {
        let ints: Vec<u64> = kinds("f(1_000, 0b1010, 0o17, 0xFF)\n")
            .into_iter()
            .filter_map(|k| match k {
                TokenKind::Int(n) => Some(n),
                _ => None,
            })
            .collect();
        assert_eq!(ints, vec![1000, 0b1010, 0o17, 0xFF]);
    }

    #[test]
    fn lex_rejects_bad_int_underscore_placement() {
        let err = Lexer::new("f(1__0)\n").lex().unwrap_err();
        assert!(err.message.contains("invalid integer literal"));
    }

    #[test]
    fn lex_skips_comments_but_not_hashes_in_strings() {
        let got = kinds("# header\ndef f(n) -> 'n # not a comment':  # trailing\n    pass\n");
        assert!(got.contains(&TokenKind::String("n # not a comment".to_string())));
        assert_eq!(got.first(), Some(&TokenKind::KwDef));
    }

    #[test]
    fn lex_rejects_tabs_and_inconsistent_dedent() {
        let err = Lexer::new("def f():\n\tpass\n").lex().unwrap_err();
        assert!(err.message.contains("tabs"));

        let err = Lexer::new("def f():\n        pass\n    pass\n").lex().unwrap_err();
        assert!(err.message.contains("inconsistent indentation"));
    }

    #[test]
    fn lex_rejects_unknown_characters() {
        let err = Lexer::new("f(a / b)\n").lex().unwrap_err();
        assert!(err.message.contains("unexpected token"));
    }
}
