use std::fmt;
use std::fmt::{Display, Formatter};

use tracing::debug;

use crate::common::error::{convert_error, ErrorInfo, ErrorKind, LoxError, LoxResult};

pub fn tokenize(source: &str) -> LoxResult<Vec<Token>> {
    convert_error(Lexer::new(source).get_lexems())
}

// Only failure possible during lexing is an unterminated string, an unterminated multi-line
// comment, or a stray character. Lexing stops at the first one.
type LexResult<A> = Result<A, LexError>;

#[derive(Debug, PartialEq, Clone)]
pub enum TokenType {
    // Single-character tokens.
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    Comma,
    Dot,
    Minus,
    Plus,
    Semicolon,
    Slash,
    Star,
    // One or two character tokens.
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    // Keywords.
    And,
    Class,
    Else,
    False,
    Fun,
    For,
    If,
    Nil,
    Or,
    Print,
    Return,
    Super,
    This,
    True,
    Var,
    While,

    StringLiteral(String),
    NumberLiteral(f64),
    Identifier(String),

    Eof,
}

impl TokenType {
    pub fn string_literal<S: Into<String>>(str: S) -> Self { TokenType::StringLiteral(str.into()) }
    pub fn number_literal(f: f64) -> Self { TokenType::NumberLiteral(f) }
    pub fn identifier<S: Into<String>>(str: S) -> Self { TokenType::Identifier(str.into()) }

    /// Reserved words that may open a new statement or declaration.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenType::Class | TokenType::Fun | TokenType::Var | TokenType::For | TokenType::If
                | TokenType::While | TokenType::Print | TokenType::Return
        )
    }
}

impl Display for TokenType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("{:?}", self))
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Token {
    pub line: usize,
    pub r#type: TokenType,
    pub lexeme: String,
}

impl Token {
    pub fn new<S: Into<String>>(line: usize, r#type: TokenType, lexeme: S) -> Self {
        Token { line, r#type, lexeme: lexeme.into() }
    }
    pub fn eof(line: usize) -> Self { Token::new(line, TokenType::Eof, "") }
    pub fn get_type(&self) -> &TokenType { &self.r#type }

    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo { line: self.line }
    }
}

#[derive(Debug)]
pub struct LexError {
    line: usize,
    message: String,
}

impl LoxError for LexError {
    fn get_info(&self) -> ErrorInfo {
        ErrorInfo { line: self.line }
    }

    fn get_message(&self) -> String {
        self.message.to_owned()
    }

    fn get_kind(&self) -> ErrorKind { ErrorKind::Lexical }
}

impl Display for LexError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.line, self.message)
    }
}

struct Lexer {
    source: Vec<char>,
    current: usize,
    start: usize,
    line: usize,
    lexems: Vec<Token>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            current: 0,
            start: 0,
            line: 1,
            lexems: Vec::new(),
        }
    }

    pub fn get_lexems(mut self) -> LexResult<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.lexems.push(Token::eof(self.line));
        debug!(tokens = self.lexems.len(), "tokenized source");
        Ok(self.lexems)
    }

    fn is_at_end(&self) -> bool { self.current >= self.source.len() }

    fn add_token_type(&mut self, tt: TokenType) {
        let lexeme = self.current_lexeme();
        self.lexems.push(Token::new(self.line, tt, lexeme));
    }

    fn matches(&mut self, expected: char) -> bool {
        let result = self.source.get(self.current) == Some(&expected);
        if result {
            self.current += 1;
        }
        result
    }

    fn add_one_or_two(&mut self, second: char, two: TokenType, one: TokenType) {
        let tt = if self.matches(second) { two } else { one };
        self.add_token_type(tt)
    }

    fn scan_token(&mut self) -> LexResult<()> {
        let c = self.advance();
        match c {
            ',' => self.add_token_type(TokenType::Comma),
            '(' => self.add_token_type(TokenType::OpenParen),
            ')' => self.add_token_type(TokenType::CloseParen),
            '{' => self.add_token_type(TokenType::OpenBrace),
            '}' => self.add_token_type(TokenType::CloseBrace),
            '.' => self.add_token_type(TokenType::Dot),
            '-' => self.add_token_type(TokenType::Minus),
            '+' => self.add_token_type(TokenType::Plus),
            ';' => self.add_token_type(TokenType::Semicolon),
            '*' => self.add_token_type(TokenType::Star),

            '!' => self.add_one_or_two('=', TokenType::BangEqual, TokenType::Bang),
            '=' => self.add_one_or_two('=', TokenType::EqualEqual, TokenType::Equal),
            '<' => self.add_one_or_two('=', TokenType::LessEqual, TokenType::Less),
            '>' => self.add_one_or_two('=', TokenType::GreaterEqual, TokenType::Greater),

            '/' =>
                if self.matches('/') {
                    self.skip_line_comment();
                } else if self.matches('*') {
                    self.skip_multiline_comment()?;
                } else {
                    self.add_token_type(TokenType::Slash)
                },

            ' ' | '\r' | '\t' => (),
            '\n' => self.line += 1,
            '"' => {
                let literal = self.read_string_literal()?;
                self.add_token_type(literal)
            }
            c =>
                if c.is_ascii_digit() {
                    let num = self.read_number_literal()?;
                    self.add_token_type(num)
                } else if c.is_alphabetic() || c == '_' {
                    let ident = self.read_identifier();
                    self.add_token_type(ident)
                } else {
                    return self.error(format!("Unexpected character '{}'.", c));
                }
        }
        Ok(())
    }

    fn error<A>(&self, message: String) -> LexResult<A> {
        Err(LexError { line: self.line, message })
    }

    fn advance(&mut self) -> char {
        let result = self.source[self.current];
        self.current += 1;
        result
    }

    fn peek_n(&self, n: usize) -> Option<char> {
        self.source.get(self.current + n).copied()
    }

    fn peek_test<F: CharTest>(&self, f: F) -> bool {
        self.peek_n_test(0, f)
    }

    fn peek_n_test<F: CharTest>(&self, n: usize, f: F) -> bool {
        self.peek_n(n).map(|e| f.char_test(e)).unwrap_or(false)
    }

    fn skip_line_comment(&mut self) {
        while self.peek_test(negated_char_test('\n')) {
            self.advance();
        }
    }

    fn skip_multiline_comment(&mut self) -> LexResult<()> {
        while !self.is_at_end() && !(self.peek_test('*') && self.peek_n_test(1, '/')) {
            if self.advance() == '\n' {
                self.line += 1;
            }
        }
        if self.is_at_end() {
            self.error("Unterminated multiline comment.".to_owned())
        } else {
            self.current += 2; // Skip past closing comment
            Ok(())
        }
    }

    fn read_number_literal(&mut self) -> LexResult<TokenType> {
        while self.peek_test(|e: char| e.is_ascii_digit()) {
            self.advance();
        }
        if self.peek_test('.') && self.peek_n_test(1, |e: char| e.is_ascii_digit()) {
            self.advance(); // Consume the '.'
            while self.peek_test(|e: char| e.is_ascii_digit()) {
                self.advance();
            }
        }
        let lexeme = self.current_lexeme();
        match lexeme.parse::<f64>() {
            Ok(n) => Ok(TokenType::number_literal(n)),
            Err(_) => self.error(format!("Invalid number '{}'.", lexeme)),
        }
    }

    fn read_string_literal(&mut self) -> LexResult<TokenType> {
        while self.peek_test(negated_char_test('"')) {
            if self.peek_test('\n') {
                self.line += 1
            }
            self.advance();
        }
        if self.is_at_end() {
            self.error("Unterminated string.".to_owned())
        } else {
            self.advance(); // Move past closing "
            let literal: String = self.source[self.start + 1..self.current - 1].iter().collect();
            Ok(TokenType::string_literal(literal))
        }
    }

    fn read_identifier(&mut self) -> TokenType {
        while self.peek_test(|e: char| e.is_alphanumeric() || e == '_') {
            self.advance();
        }
        let word = self.current_lexeme();
        Lexer::get_keyword(&word).unwrap_or_else(|| TokenType::identifier(word))
    }

    fn current_lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn get_keyword(word: &str) -> Option<TokenType> {
        match word {
            "and" => Some(TokenType::And),
            "class" => Some(TokenType::Class),
            "else" => Some(TokenType::Else),
            "false" => Some(TokenType::False),
            "for" => Some(TokenType::For),
            "fun" => Some(TokenType::Fun),
            "if" => Some(TokenType::If),
            "nil" => Some(TokenType::Nil),
            "or" => Some(TokenType::Or),
            "print" => Some(TokenType::Print),
            "return" => Some(TokenType::Return),
            "super" => Some(TokenType::Super),
            "this" => Some(TokenType::This),
            "true" => Some(TokenType::True),
            "var" => Some(TokenType::Var),
            "while" => Some(TokenType::While),
            _ => None,
        }
    }
}

trait CharTest {
    fn char_test(&self, c: char) -> bool;
}

fn negated_char_test(c: char) -> impl CharTest {
    move |c2: char| c2 != c
}

impl CharTest for char {
    fn char_test(&self, c: char) -> bool { self == &c }
}

impl<F> CharTest for F where F: Fn(char) -> bool {
    fn char_test(&self, c: char) -> bool { self(c) }
}

#[cfg(test)]
mod tests {
    use crate::common::tests::unsafe_tokenize;

    use super::*;

    fn types(program: Vec<&str>) -> Vec<TokenType> {
        unsafe_tokenize(program).into_iter().map(|t| t.r#type).collect()
    }

    #[test]
    fn test_identifier() {
        assert_eq!(
            unsafe_tokenize(vec!["x_y"]),
            vec!(Token::new(1, TokenType::identifier("x_y"), "x_y"), Token::eof(1)),
        )
    }

    #[test]
    fn test_basic_example() {
        assert_eq!(
            unsafe_tokenize(vec!["var x = \"language\";"]),
            vec!(
                Token::new(1, TokenType::Var, "var"),
                Token::new(1, TokenType::identifier("x"), "x"),
                Token::new(1, TokenType::Equal, "="),
                Token::new(1, TokenType::string_literal("language"), "\"language\""),
                Token::new(1, TokenType::Semicolon, ";"),
                Token::eof(1),
            ),
        )
    }

    #[test]
    fn test_basic_expression() {
        assert_eq!(
            types(vec!["x + 42 >= \"foo\""]),
            vec!(
                TokenType::identifier("x"),
                TokenType::Plus,
                TokenType::NumberLiteral(42.0),
                TokenType::GreaterEqual,
                TokenType::string_literal("foo"),
                TokenType::Eof,
            ),
        )
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            unsafe_tokenize(vec!["42 / 54.13; // Right?\n var xyz /**/ = /*//*/ foobar;"]),
            vec!(
                Token::new(1, TokenType::NumberLiteral(42.0), "42"),
                Token::new(1, TokenType::Slash, "/"),
                Token::new(1, TokenType::NumberLiteral(54.13), "54.13"),
                Token::new(1, TokenType::Semicolon, ";"),
                Token::new(2, TokenType::Var, "var"),
                Token::new(2, TokenType::identifier("xyz"), "xyz"),
                Token::new(2, TokenType::Equal, "="),
                Token::new(2, TokenType::identifier("foobar"), "foobar"),
                Token::new(2, TokenType::Semicolon, ";"),
                Token::eof(2),
            ),
        )
    }

    #[test]
    fn multiline_comment_counts_lines() {
        let tokens = unsafe_tokenize(vec!["/* a", "b */ x"]);
        assert_eq!(tokens[0], Token::new(2, TokenType::identifier("x"), "x"));
    }

    #[test]
    fn trailing_dot_is_not_part_of_number() {
        assert_eq!(
            types(vec!["12."]),
            vec![TokenType::NumberLiteral(12.0), TokenType::Dot, TokenType::Eof],
        )
    }

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(
            types(vec!["print Print"]),
            vec![TokenType::Print, TokenType::identifier("Print"), TokenType::Eof],
        )
    }

    #[test]
    fn empty_source_is_just_eof() {
        assert_eq!(unsafe_tokenize(vec![""]), vec![Token::eof(1)]);
    }

    #[test]
    fn unterminated_string() {
        let errors = tokenize("var a = \"oops;\n").unwrap_err();
        assert_eq!(errors.first().get_message(), "Unterminated string.");
        assert_eq!(errors.first().get_kind(), ErrorKind::Lexical);
    }

    #[test]
    fn unexpected_character() {
        let errors = tokenize("a ? b").unwrap_err();
        assert_eq!(errors.first().get_message(), "Unexpected character '?'.");
    }
}
