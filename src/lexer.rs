use std::collections::HashMap;

use crate::token::{self, Token, TokenType};

pub struct Lexer {
    chars: Vec<char>,
    keywords: HashMap<String, TokenType>,
    i: usize,
    emitted_eof: bool,
}

fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            keywords: token::get_identifier_lookup(),
            i: 0,
            emitted_eof: false,
        }
    }

    /// Tokens of `input` in order, without the trailing EOF.
    pub fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input)
            .take_while(|t| t.token_type != TokenType::EOF)
            .collect()
    }

    fn curr(&self) -> Option<char> {
        self.chars.get(self.i).copied()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.i + 1).copied()
    }

    fn consume_whitespace(&mut self) {
        while matches!(self.curr(), Some(' ' | '\t' | '\n' | '\r')) {
            self.i += 1;
        }
    }

    fn lookup_identifier(&self, s: &str) -> TokenType {
        self.keywords.get(s).copied().unwrap_or(TokenType::IDENT)
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.i;
        while self.curr().is_some_and(&pred) {
            self.i += 1;
        }
        self.chars[start..self.i].iter().collect()
    }

    fn read_identifier(&mut self) -> String {
        debug_assert!(self.curr().is_some_and(is_letter));
        self.read_while(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn read_number(&mut self) -> String {
        debug_assert!(self.curr().is_some_and(|c| c.is_ascii_digit()));
        self.read_while(|c| c.is_ascii_digit())
    }

    // an unterminated string runs to the end of input
    fn read_string(&mut self) -> String {
        debug_assert_eq!(self.curr(), Some('"'));
        self.i += 1;
        let value = self.read_while(|c| c != '"');
        if self.curr().is_some() {
            self.i += 1; // closing quote
        }
        value
    }

    /// Returns the next token. Once the input is exhausted every call yields EOF.
    pub fn next_token(&mut self) -> Token {
        self.consume_whitespace();
        let Some(curr) = self.curr() else {
            return Token::eof();
        };
        use TokenType::*;
        let token = match curr {
            // operators
            '=' => {
                if self.peek() == Some('=') {
                    self.i += 1;
                    Token::new(EQ, "==")
                } else {
                    Token::new(ASSIGN, curr)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.i += 1;
                    Token::new(NOT_EQ, "!=")
                } else {
                    Token::new(BANG, curr)
                }
            }
            '+' => Token::new(PLUS, curr),
            '-' => Token::new(MINUS, curr),
            '*' => Token::new(ASTERISK, curr),
            '/' => Token::new(SLASH, curr),
            '<' => Token::new(LT, curr),
            '>' => Token::new(GT, curr),
            // delimiters
            ',' => Token::new(COMMA, curr),
            ';' => Token::new(SEMICOLON, curr),
            ':' => Token::new(COLON, curr),
            '(' => Token::new(LPAREN, curr),
            ')' => Token::new(RPAREN, curr),
            '{' => Token::new(LBRACE, curr),
            '}' => Token::new(RBRACE, curr),
            '[' => Token::new(LBRACKET, curr),
            ']' => Token::new(RBRACKET, curr),
            // multi char tokens leave the cursor past themselves
            '"' => return Token::new(STRING, self.read_string()),
            c if is_letter(c) => {
                let literal = self.read_identifier();
                let token_type = self.lookup_identifier(&literal);
                return Token::new(token_type, literal);
            }
            c if c.is_ascii_digit() => return Token::new(INT, self.read_number()),
            c => Token::new(ILLEGAL, c),
        };
        self.i += 1;
        token
    }
}

/// Yields every token up to and including the first EOF.
impl Iterator for Lexer {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.token_type == TokenType::EOF {
            self.emitted_eof = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod lexer_tests {
    use super::*;
    #[test]
    fn test_empty_input() {
        let input = "";
        let lexer = Lexer::new(input);
        let tokens = lexer.into_iter().collect::<Vec<_>>();
        assert_eq!(tokens[0].token_type, TokenType::EOF);
        assert!(tokens.len() == 1);
    }

    #[test]
    fn test_input_whitespace_only() {
        let input = "  \t\r\n      ";
        let lexer = Lexer::new(input);
        let tokens = lexer.into_iter().collect::<Vec<_>>();
        assert_eq!(tokens[0].token_type, TokenType::EOF);
        assert!(tokens.len() == 1);
    }

    #[test]
    fn test_next_token_past_eof() {
        let mut lexer = Lexer::new("x");
        assert_eq!(TokenType::IDENT, lexer.next_token().token_type);
        for _ in 0..5 {
            let token = lexer.next_token();
            assert_eq!(TokenType::EOF, token.token_type);
            assert_eq!("", token.literal);
        }
    }

    #[test]
    fn test_let_statement() {
        let input = "let five = 5;";
        let lexer = Lexer::new(input);
        let got = lexer.into_iter().map(|t| t.token_type).collect::<Vec<_>>();
        use TokenType::*;
        assert_eq!(vec![LET, IDENT, ASSIGN, INT, SEMICOLON, EOF], got);
    }

    #[test]
    fn test_single_char_tokens() {
        use TokenType::*;
        let input = "=+(){},;";
        let input_with_whitespace = " =\t+\n()\r {}\r\n,;";
        // output should be in the following order
        let expected = vec![
            (ASSIGN, "="),
            (PLUS, "+"),
            (LPAREN, "("),
            (RPAREN, ")"),
            (LBRACE, "{"),
            (RBRACE, "}"),
            (COMMA, ","),
            (SEMICOLON, ";"),
            (EOF, ""),
        ];
        for input in [input, input_with_whitespace] {
            let lexer = Lexer::new(input);
            let mut tokens_received = 0;
            for (got, expect) in lexer.zip(&expected) {
                assert_eq!(got.token_type, expect.0);
                assert_eq!(got.literal, expect.1);
                tokens_received += 1;
            }
            assert_eq!(tokens_received, expected.len());
        }
    }

    #[test]
    fn test_multi_char_tokens() {
        use TokenType::*;
        let input = r#"
            let five = 5;
            let ten = 10;
            let add = fn(x, y) {
                x + y;
            };
            let result = add(five, ten);
            !-/*5;
            5 < 10 > 5;
            if (5 < 10) {
                return true;
            } else {
                return false;
            }


            10 == 10;
            10 != 9;
            "foobar"
            "foo bar"
            [1, 2];
            {"foo": "bar"}
        "#;
        let expected = vec![
            (LET, "let"),
            (IDENT, "five"),
            (ASSIGN, "="),
            (INT, "5"),
            (SEMICOLON, ";"),
            (LET, "let"),
            (IDENT, "ten"),
            (ASSIGN, "="),
            (INT, "10"),
            (SEMICOLON, ";"),
            (LET, "let"),
            (IDENT, "add"),
            (ASSIGN, "="),
            (FUNCTION, "fn"),
            (LPAREN, "("),
            (IDENT, "x"),
            (COMMA, ","),
            (IDENT, "y"),
            (RPAREN, ")"),
            (LBRACE, "{"),
            (IDENT, "x"),
            (PLUS, "+"),
            (IDENT, "y"),
            (SEMICOLON, ";"),
            (RBRACE, "}"),
            (SEMICOLON, ";"),
            (LET, "let"),
            (IDENT, "result"),
            (ASSIGN, "="),
            (IDENT, "add"),
            (LPAREN, "("),
            (IDENT, "five"),
            (COMMA, ","),
            (IDENT, "ten"),
            (RPAREN, ")"),
            (SEMICOLON, ";"),
            (BANG, "!"),
            (MINUS, "-"),
            (SLASH, "/"),
            (ASTERISK, "*"),
            (INT, "5"),
            (SEMICOLON, ";"),
            (INT, "5"),
            (LT, "<"),
            (INT, "10"),
            (GT, ">"),
            (INT, "5"),
            (SEMICOLON, ";"),
            (IF, "if"),
            (LPAREN, "("),
            (INT, "5"),
            (LT, "<"),
            (INT, "10"),
            (RPAREN, ")"),
            (LBRACE, "{"),
            (RETURN, "return"),
            (TRUE, "true"),
            (SEMICOLON, ";"),
            (RBRACE, "}"),
            (ELSE, "else"),
            (LBRACE, "{"),
            (RETURN, "return"),
            (FALSE, "false"),
            (SEMICOLON, ";"),
            (RBRACE, "}"),
            (INT, "10"),
            (EQ, "=="),
            (INT, "10"),
            (SEMICOLON, ";"),
            (INT, "10"),
            (NOT_EQ, "!="),
            (INT, "9"),
            (SEMICOLON, ";"),
            (STRING, "foobar"),
            (STRING, "foo bar"),
            (LBRACKET, "["),
            (INT, "1"),
            (COMMA, ","),
            (INT, "2"),
            (RBRACKET, "]"),
            (SEMICOLON, ";"),
            (LBRACE, "{"),
            (STRING, "foo"),
            (COLON, ":"),
            (STRING, "bar"),
            (RBRACE, "}"),
            (EOF, ""),
        ];
        let lexer = Lexer::new(input);
        let mut tokens_received = 0;
        for (i, (got, expect)) in lexer.zip(&expected).enumerate() {
            assert_eq!(got.token_type, expect.0, "At pos: {}", i);
            assert_eq!(got.literal, expect.1, "At pos: {}", i);
            tokens_received += 1;
        }
        assert_eq!(tokens_received, expected.len());
    }

    #[test]
    fn test_identifiers() {
        use TokenType::*;
        let test_cases = [
            ("foo_bar", vec![(IDENT, "foo_bar")]),
            ("_x1", vec![(IDENT, "_x1")]),
            ("x2y", vec![(IDENT, "x2y")]),
            ("letx", vec![(IDENT, "letx")]),
            ("9lives", vec![(INT, "9"), (IDENT, "lives")]),
        ];
        for (input, expected) in test_cases {
            let got = Lexer::tokenize(input)
                .into_iter()
                .map(|t| (t.token_type, t.literal))
                .collect::<Vec<_>>();
            let expected = expected
                .into_iter()
                .map(|(t, l)| (t, l.to_string()))
                .collect::<Vec<_>>();
            assert_eq!(expected, got, "input: {}", input);
        }
    }

    #[test]
    fn test_illegal_characters() {
        use TokenType::*;
        let tokens = Lexer::tokenize("a @ 5 # é");
        let got = tokens
            .iter()
            .map(|t| (t.token_type, t.literal.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (IDENT, "a"),
                (ILLEGAL, "@"),
                (INT, "5"),
                (ILLEGAL, "#"),
                (ILLEGAL, "é")
            ],
            got
        );
    }

    #[test]
    fn test_unterminated_string() {
        let tokens = Lexer::new(r#"let s = "abc"#).collect::<Vec<_>>();
        let last_two = &tokens[tokens.len() - 2..];
        assert_eq!(TokenType::STRING, last_two[0].token_type);
        assert_eq!("abc", last_two[0].literal);
        assert_eq!(TokenType::EOF, last_two[1].token_type);
    }

    #[test]
    fn test_fix_missing_eof() {
        let fuzz_inputs = [
            vec![34], // a lone, unclosed string quote
        ];
        for fuzz_input in fuzz_inputs {
            let input = std::str::from_utf8(&fuzz_input).expect("valid utf8");
            let tokens = Lexer::new(input).collect::<Vec<_>>();
            assert_eq!(2, tokens.len());
            assert_eq!(TokenType::STRING, tokens[0].token_type);
            assert_eq!(TokenType::EOF, tokens[1].token_type);
        }
    }
}
