//! Token definitions for the script language, via a generated lexer.

use logos::Logos;

use crate::error::SyntaxError;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"--[^\n]*")]
pub enum Token {
    #[token("function")]
    Function,
    #[token("end")]
    End,
    #[token("return")]
    Return,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("true")]
    True,
    #[token("false")]
    False,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,

    #[token("=")]
    Assign,
    #[token("==")]
    Eq,
    #[token("~=")]
    Ne,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("..")]
    Concat,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape(lex.slice()))]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| unescape(lex.slice()))]
    Str(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),
}

impl Token {
    /// How the token reads in a diagnostic.
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("'{}'", n),
            Token::Str(s) => format!("'{}'", s),
            Token::Ident(name) => format!("'{}'", name),
            Token::Function => "'function'".to_string(),
            Token::End => "'end'".to_string(),
            Token::Return => "'return'".to_string(),
            Token::Local => "'local'".to_string(),
            Token::Nil => "'nil'".to_string(),
            Token::True => "'true'".to_string(),
            Token::False => "'false'".to_string(),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
            Token::Semi => "';'".to_string(),
            Token::Assign => "'='".to_string(),
            Token::Eq => "'=='".to_string(),
            Token::Ne => "'~='".to_string(),
            Token::Lt => "'<'".to_string(),
            Token::Le => "'<='".to_string(),
            Token::Gt => "'>'".to_string(),
            Token::Ge => "'>='".to_string(),
            Token::Plus => "'+'".to_string(),
            Token::Minus => "'-'".to_string(),
            Token::Star => "'*'".to_string(),
            Token::Slash => "'/'".to_string(),
            Token::Percent => "'%'".to_string(),
            Token::Concat => "'..'".to_string(),
        }
    }
}

/// Strip quotes and process escape sequences. `None` rejects the token.
fn unescape(slice: &str) -> Option<String> {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next()? {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            '\\' => out.push('\\'),
            '"' => out.push('"'),
            '\'' => out.push('\''),
            _ => return None,
        }
    }
    Some(out)
}

/// Tokenize a chunk, pairing each token with its 1-based source line.
pub fn lex(chunk: &str, source: &str) -> Result<Vec<(Token, usize)>, SyntaxError> {
    let mut out = Vec::new();
    let mut lexer = Token::lexer(source);
    while let Some(item) = lexer.next() {
        let line = line_of(source, lexer.span().start);
        match item {
            Ok(token) => out.push((token, line)),
            Err(()) => {
                return Err(SyntaxError {
                    chunk: chunk.to_string(),
                    line,
                    message: format!("unexpected symbol near '{}'", lexer.slice()),
                })
            }
        }
    }
    Ok(out)
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].bytes().filter(|&b| b == b'\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexes_keywords_and_operators() {
        let tokens = lex("test", "function end return .. == ~=").unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Function,
                Token::End,
                Token::Return,
                Token::Concat,
                Token::Eq,
                Token::Ne,
            ]
        );
    }

    #[test]
    fn lexes_literals() {
        let tokens = lex("test", r#"100 1.5 "hi" 'there' name"#).unwrap();
        let kinds: Vec<_> = tokens.into_iter().map(|(t, _)| t).collect();
        assert_eq!(
            kinds,
            vec![
                Token::Number(100.0),
                Token::Number(1.5),
                Token::Str("hi".to_string()),
                Token::Str("there".to_string()),
                Token::Ident("name".to_string()),
            ]
        );
    }

    #[test]
    fn string_escapes() {
        let tokens = lex("test", r#""a\nb\"c""#).unwrap();
        assert_eq!(tokens[0].0, Token::Str("a\nb\"c".to_string()));
    }

    #[test]
    fn comments_are_skipped() {
        let tokens = lex("test", "-- comment\nreturn -- trailing\n").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].0, Token::Return);
        assert_eq!(tokens[0].1, 2);
    }

    #[test]
    fn rejects_bad_symbols() {
        let err = lex("test", "return @").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains('@'));
    }

    #[test]
    fn tracks_lines() {
        let tokens = lex("test", "return\nreturn\nreturn").unwrap();
        let lines: Vec<_> = tokens.into_iter().map(|(_, l)| l).collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }
}
