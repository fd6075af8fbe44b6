use luadata_core::{tokenize, LexError, Lexer, Punct, TokenKind};

/// Helper: token kinds only, without offsets.
fn kinds(src: &str) -> Vec<TokenKind> {
    tokenize(src)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn num(text: &str, is_float: bool) -> TokenKind {
    TokenKind::Number {
        text: text.to_string(),
        is_float,
    }
}

fn ident(name: &str) -> TokenKind {
    TokenKind::Identifier(name.to_string())
}

fn string(s: &str) -> TokenKind {
    TokenKind::Str(s.to_string())
}

// ============================================================================
// Basic tokens
// ============================================================================

#[test]
fn empty_source_is_just_eof() {
    assert_eq!(kinds(""), vec![TokenKind::Eof]);
    assert_eq!(kinds("   \n\t "), vec![TokenKind::Eof]);
}

#[test]
fn punctuation() {
    assert_eq!(
        kinds("{ } ( ) [ ] , ; = - . :"),
        vec![
            TokenKind::Punct(Punct::LBrace),
            TokenKind::Punct(Punct::RBrace),
            TokenKind::Punct(Punct::LParen),
            TokenKind::Punct(Punct::RParen),
            TokenKind::Punct(Punct::LBracket),
            TokenKind::Punct(Punct::RBracket),
            TokenKind::Punct(Punct::Comma),
            TokenKind::Punct(Punct::Semicolon),
            TokenKind::Punct(Punct::Equals),
            TokenKind::Punct(Punct::Minus),
            TokenKind::Punct(Punct::Dot),
            TokenKind::Punct(Punct::Colon),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn keywords_are_not_identifiers() {
    assert_eq!(
        kinds("true false nil truthy nil_value"),
        vec![
            TokenKind::True,
            TokenKind::False,
            TokenKind::Nil,
            ident("truthy"),
            ident("nil_value"),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn entry_call_tokens() {
    assert_eq!(
        kinds("data:extend({})"),
        vec![
            ident("data"),
            TokenKind::Punct(Punct::Colon),
            ident("extend"),
            TokenKind::Punct(Punct::LParen),
            TokenKind::Punct(Punct::LBrace),
            TokenKind::Punct(Punct::RBrace),
            TokenKind::Punct(Punct::RParen),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn offsets_are_byte_positions() {
    let tokens = tokenize("a = \"é\", b").unwrap();
    let offsets: Vec<usize> = tokens.iter().map(|t| t.offset).collect();
    // `é` is two bytes, so the comma sits at 4 + 1 + 2 + 1 = 8.
    assert_eq!(offsets, vec![0, 2, 4, 8, 10, 11]);
}

// ============================================================================
// Numbers
// ============================================================================

#[test]
fn integer_and_float_literals() {
    assert_eq!(
        kinds("200 2.0 0.5 5. .25 1e3 2.5E-4 7e+2"),
        vec![
            num("200", false),
            num("2.0", true),
            num("0.5", true),
            num("5.", true),
            num(".25", true),
            num("1e3", true),
            num("2.5E-4", true),
            num("7e+2", true),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn minus_is_a_separate_token() {
    assert_eq!(
        kinds("-5"),
        vec![TokenKind::Punct(Punct::Minus), num("5", false), TokenKind::Eof]
    );
}

#[test]
fn two_decimal_points_is_invalid_number() {
    let err = tokenize("x = 1.2.3").unwrap_err();
    assert_eq!(
        err,
        LexError::InvalidNumber {
            offset: 4,
            text: "1.2.3".to_string()
        }
    );
}

#[test]
fn exponent_without_digits_is_invalid_number() {
    assert!(matches!(
        tokenize("1e").unwrap_err(),
        LexError::InvalidNumber { offset: 0, .. }
    ));
    assert!(matches!(
        tokenize("1e+").unwrap_err(),
        LexError::InvalidNumber { offset: 0, .. }
    ));
}

#[test]
fn identifier_glued_to_number_is_invalid() {
    assert_eq!(
        tokenize("12ab").unwrap_err(),
        LexError::InvalidNumber {
            offset: 0,
            text: "12ab".to_string()
        }
    );
}

#[test]
fn infinite_float_is_invalid() {
    assert!(matches!(
        tokenize("1e999").unwrap_err(),
        LexError::InvalidNumber { .. }
    ));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn both_quote_styles() {
    assert_eq!(
        kinds(r#""double" 'single' "it's" 'say "hi"'"#),
        vec![
            string("double"),
            string("single"),
            string("it's"),
            string("say \"hi\""),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn escape_sequences_are_decoded() {
    assert_eq!(
        kinds(r#""a\nb\tc\"d\\e\'f\rg""#),
        vec![string("a\nb\tc\"d\\e'f\rg"), TokenKind::Eof]
    );
}

#[test]
fn escaped_line_break_is_a_newline() {
    assert_eq!(
        kinds("\"one\\\ntwo\""),
        vec![string("one\ntwo"), TokenKind::Eof]
    );
}

#[test]
fn decimal_escapes_name_a_byte() {
    assert_eq!(
        kinds(r#""\012" "\0" "\65\066" "\0012""#),
        vec![
            string("\u{c}"),
            string("\0"),
            string("AB"),
            // At most three digits belong to the escape.
            string("\u{1}2"),
            TokenKind::Eof,
        ]
    );
}

#[test]
fn decimal_escapes_can_spell_utf8() {
    assert_eq!(
        kinds(r#""caf\195\169""#),
        vec![string("café"), TokenKind::Eof]
    );
}

#[test]
fn decimal_escape_above_255_is_invalid() {
    assert_eq!(
        tokenize(r#"x = "\256""#).unwrap_err(),
        LexError::InvalidEscape {
            offset: 5,
            escape: '2'
        }
    );
}

#[test]
fn decimal_escape_yielding_invalid_utf8_is_invalid() {
    assert_eq!(
        tokenize(r#"x = "ab\233""#).unwrap_err(),
        LexError::InvalidEscape {
            offset: 7,
            escape: '2'
        }
    );
}

#[test]
fn unknown_escape_names_the_backslash_offset() {
    assert_eq!(
        tokenize(r#"x = "ab\q""#).unwrap_err(),
        LexError::InvalidEscape {
            offset: 7,
            escape: 'q'
        }
    );
}

#[test]
fn unterminated_string_at_end_of_input() {
    assert_eq!(
        tokenize("\"abc").unwrap_err(),
        LexError::UnterminatedString { offset: 0 }
    );
}

#[test]
fn unterminated_string_at_line_break() {
    assert_eq!(
        tokenize("{ 'abc\n}").unwrap_err(),
        LexError::UnterminatedString { offset: 2 }
    );
}

#[test]
fn unicode_inside_strings_is_kept() {
    assert_eq!(
        kinds("\"café ☕\""),
        vec![string("café ☕"), TokenKind::Eof]
    );
}

// ============================================================================
// Comments
// ============================================================================

#[test]
fn line_comment_runs_to_end_of_line() {
    assert_eq!(
        kinds("1 -- one\n2 -- two"),
        vec![num("1", false), num("2", false), TokenKind::Eof]
    );
}

#[test]
fn block_comment_is_skipped() {
    assert_eq!(
        kinds("1 --[[ a\nmultiline } comment ]] 2"),
        vec![num("1", false), num("2", false), TokenKind::Eof]
    );
}

#[test]
fn empty_block_comment() {
    assert_eq!(
        kinds("1--[[]]2"),
        vec![num("1", false), num("2", false), TokenKind::Eof]
    );
}

#[test]
fn leveled_block_comment_ignores_shorter_closers() {
    assert_eq!(
        kinds("--[==[ contains ]] and ]=] ]==] 3"),
        vec![num("3", false), TokenKind::Eof]
    );
}

#[test]
fn unterminated_block_comment() {
    assert_eq!(
        tokenize("1 --[[ never closed").unwrap_err(),
        LexError::UnterminatedComment { offset: 2 }
    );
}

#[test]
fn dashes_inside_strings_are_not_comments() {
    assert_eq!(
        kinds("'a--b'"),
        vec![string("a--b"), TokenKind::Eof]
    );
}

// ============================================================================
// Errors and iteration
// ============================================================================

#[test]
fn unexpected_character() {
    assert_eq!(
        tokenize("{ a = 1 + 2 }").unwrap_err(),
        LexError::UnexpectedCharacter {
            offset: 8,
            ch: '+'
        }
    );
}

#[test]
fn non_ascii_identifier_is_unexpected() {
    assert!(matches!(
        tokenize("ключ = 1").unwrap_err(),
        LexError::UnexpectedCharacter { offset: 0, .. }
    ));
}

#[test]
fn byte_order_mark_is_skipped() {
    let tokens = tokenize("\u{feff}{}").unwrap();
    assert_eq!(tokens[0].kind, TokenKind::Punct(Punct::LBrace));
    assert_eq!(tokens[0].offset, 3);
}

#[test]
fn lexer_stops_after_eof() {
    let mut lexer = Lexer::new("x");
    assert!(matches!(lexer.next(), Some(Ok(_))));
    assert!(matches!(
        lexer.next(),
        Some(Ok(t)) if t.kind == TokenKind::Eof
    ));
    assert!(lexer.next().is_none());
}

#[test]
fn lexer_stops_after_error() {
    let mut lexer = Lexer::new("@ x");
    assert!(matches!(lexer.next(), Some(Err(_))));
    assert!(lexer.next().is_none());
}

#[test]
fn lexer_is_restartable_by_clone() {
    let mut lexer = Lexer::new("a b c");
    lexer.next();
    let checkpoint = lexer.clone();
    let first: Vec<_> = lexer.map(|t| t.unwrap().kind).collect();
    let second: Vec<_> = checkpoint.map(|t| t.unwrap().kind).collect();
    assert_eq!(first, second);
    assert_eq!(first, vec![ident("b"), ident("c"), TokenKind::Eof]);
}
