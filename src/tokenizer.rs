use crate::error::{DbError, DbResult};

/// Represents the smallest meaningful units (atoms) of the command language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // --- Command keywords ---
    Define,
    Load,
    Headed,
    From,
    Save,
    Print,
    Check,
    References,
    Exit,

    // --- Operator keywords ---
    Rows,
    Columns,
    Product,
    Join,
    NaturalJoin,
    Outer,
    OrderBy,

    // --- Column types ---
    Int,
    Str,

    // --- Identifiers & Literals ---
    /// A table name, column name, bare word or file path (e.g. `emp`,
    /// `data/emp.csv`).
    Ident(String),
    /// An integer literal exactly as written, optionally negative (e.g.
    /// `42`, `-3`, `007`). Its meaning depends on where it is used.
    Number(String),
    /// A string literal, defined between single quotes (e.g. `'Alice'`).
    String(String),

    // --- Symbols ---
    /// Left parenthesis `(`
    LeftParen,
    /// Right parenthesis `)`
    RightParen,
    /// Comma `,`
    Comma,
    /// Assignment or equality `=`
    Equal,
    /// Equality `==`
    EqualEqual,
    /// Lower than `<`
    Lower,
    /// Lower than or equal `<=`
    LowerEqual,
    /// Greater than `>`
    Greater,
    /// Greater than or equal `>=`
    GreaterEqual,

    // --- Special ---
    /// Represents the end of the command line.
    Eof,
}

/// A lexical scanner that converts one command line into a sequence of
/// [Token]s.
pub struct Tokenizer {
    /// The input string stored as a vector of characters for easy iteration.
    input: Vec<char>,
    /// The current position in the character vector.
    position: usize,
}

impl Tokenizer {
    /// Creates a new Tokenizer for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Processes the entire input and returns a vector of tokens.
    ///
    /// # Errors
    /// Returns [DbError::Syntax] if an invalid character is encountered or if
    /// a literal is malformed.
    ///
    /// # Example
    /// ```
    /// # use reldb::tokenizer::{Tokenizer, Token};
    /// let mut t = Tokenizer::new("print emp");
    /// let tokens = t.tokenize().unwrap();
    /// assert_eq!(tokens[0], Token::Print);
    /// assert_eq!(tokens[1], Token::Ident("emp".into()));
    /// ```
    pub fn tokenize(&mut self) -> DbResult<Vec<Token>> {
        let mut tokens = Vec::new();

        while !self.is_at_end() {
            self.skip_whitespace();

            if self.is_at_end() {
                break;
            }

            let token = self.next_token()?;
            tokens.push(token);
        }

        tokens.push(Token::Eof);
        Ok(tokens)
    }

    /// Identifies the next token based on the character at the current position.
    fn next_token(&mut self) -> DbResult<Token> {
        let ch = self.current_char();

        match ch {
            '(' => {
                self.advance();
                Ok(Token::LeftParen)
            }
            ')' => {
                self.advance();
                Ok(Token::RightParen)
            }
            ',' => {
                self.advance();
                Ok(Token::Comma)
            }
            '=' => Ok(self.read_operator(Token::Equal, Token::EqualEqual)),
            '<' => Ok(self.read_operator(Token::Lower, Token::LowerEqual)),
            '>' => Ok(self.read_operator(Token::Greater, Token::GreaterEqual)),
            '-' if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => Ok(self.read_number()),
            c if c.is_ascii_digit() => Ok(self.read_number()),
            c if is_word_char(c) => Ok(self.read_word()),
            '\'' => self.read_string(),
            _ => Err(DbError::Syntax(format!("character {ch:?} is not supported"))),
        }
    }

    // --- Navigation Helpers ---

    /// Returns the character at the current position.
    fn current_char(&self) -> char {
        self.input[self.position]
    }

    fn peek_char(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    /// Moves the cursor forward by one character.
    fn advance(&mut self) {
        self.position += 1;
    }

    /// Checks if the cursor has reached the end of the input.
    fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Consumes any whitespace characters (spaces, tabs, newlines).
    fn skip_whitespace(&mut self) {
        while !self.is_at_end() && self.current_char().is_whitespace() {
            self.advance();
        }
    }

    // --- Extraction Logic ---

    /// Reads a one-character operator, or its two-character form when the
    /// next character is `=`.
    fn read_operator(&mut self, single: Token, with_equal: Token) -> Token {
        self.advance();
        if !self.is_at_end() && self.current_char() == '=' {
            self.advance();
            return with_equal;
        }
        single
    }

    /// Reads a word and determines if it's a reserved keyword or a
    /// user-defined identifier.
    ///
    /// Keywords are matched case-insensitively. Words may contain `.`, `/`
    /// and `-` so that file paths read as a single identifier.
    fn read_word(&mut self) -> Token {
        let mut word = String::new();

        while !self.is_at_end()
            && (is_word_char(self.current_char()) || self.current_char() == '-')
        {
            word.push(self.current_char());
            self.advance();
        }

        match word.to_lowercase().as_str() {
            "define" => Token::Define,
            "load" => Token::Load,
            "headed" => Token::Headed,
            "from" => Token::From,
            "save" => Token::Save,
            "print" => Token::Print,
            "check" => Token::Check,
            "references" => Token::References,
            "exit" => Token::Exit,
            "rows" => Token::Rows,
            "columns" => Token::Columns,
            "product" => Token::Product,
            "join" => Token::Join,
            "naturaljoin" => Token::NaturalJoin,
            "outer" => Token::Outer,
            "orderby" => Token::OrderBy,
            "int" => Token::Int,
            "string" => Token::Str,
            _ => Token::Ident(word),
        }
    }

    /// Reads an integer literal with an optional leading minus sign.
    ///
    /// Digits followed by letters (`2nd`, `1.csv`) read as one identifier.
    fn read_number(&mut self) -> Token {
        let start = self.position;
        let mut number = String::new();

        if self.current_char() == '-' {
            number.push('-');
            self.advance();
        }
        while !self.is_at_end() && self.current_char().is_ascii_digit() {
            number.push(self.current_char());
            self.advance();
        }

        if !self.is_at_end() && is_word_char(self.current_char()) {
            self.position = start;
            return self.read_word();
        }

        Token::Number(number)
    }

    /// Reads a string literal enclosed in single quotes.
    fn read_string(&mut self) -> DbResult<Token> {
        self.advance(); // Skip the opening quote

        let mut string = String::new();
        while !self.is_at_end() && self.current_char() != '\'' {
            string.push(self.current_char());
            self.advance();
        }

        if self.is_at_end() {
            return Err(DbError::Syntax("unterminated string".into()));
        }

        // Skip the closing quote
        self.advance();

        Ok(Token::String(string))
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '.' | '/')
}
