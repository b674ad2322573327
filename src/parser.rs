use crate::ast::*;
use crate::error::{DbError, DbResult};
use crate::tokenizer::{Token, Tokenizer};
use crate::{ColumnRef, Comparator, DataType};

/// Recursive-descent parser over the tokens of one command line.
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            position: 0,
        }
    }

    /// Tokenizes and parses `line` in one go.
    ///
    /// # Example
    /// ```
    /// # use reldb::parser::Parser;
    /// # use reldb::ast::Command;
    /// assert_eq!(Parser::parse_line("exit").unwrap(), Command::Exit);
    /// ```
    pub fn parse_line(line: &str) -> DbResult<Command> {
        let tokens = Tokenizer::new(line).tokenize()?;
        Parser::new(tokens).parse()
    }

    pub fn parse(&mut self) -> DbResult<Command> {
        let command = match self.current_token() {
            Token::Define => self.parse_define(),
            Token::Load => self.parse_load(),
            Token::Save => self.parse_save(),
            Token::Print => {
                self.advance();
                Ok(Command::Print(self.consume_ident()?))
            }
            Token::Check => self.parse_check(),
            Token::Exit => {
                self.advance();
                Ok(Command::Exit)
            }
            Token::Ident(_) => self.parse_assign(),
            _ => Err(syntax(format!(
                "unexpected token {:?}",
                self.current_token()
            ))),
        }?;

        // Check we are at the end of the command
        if !self.is_at_end() {
            return Err(syntax(format!(
                "unexpected token after command: {:?}",
                self.current_token()
            )));
        }

        Ok(command)
    }

    //helpers
    fn current_token(&self) -> &Token {
        &self.tokens[self.position]
    }

    fn advance(&mut self) {
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.current_token(), Token::Eof)
    }

    fn consume(&mut self, expected: Token) -> DbResult<()> {
        if *self.current_token() == expected {
            self.advance();
            Ok(())
        } else {
            Err(syntax(format!(
                "expected {:?}, found {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    /// Consumes `token` if it is next; reports whether it did.
    fn eat(&mut self, token: Token) -> bool {
        if *self.current_token() == token {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_ident(&mut self) -> DbResult<String> {
        match self.current_token() {
            Token::Ident(string) => {
                let string = string.clone();
                self.advance();
                Ok(string)
            }
            _ => Err(syntax(format!(
                "expected identifier, found {:?}",
                self.current_token()
            ))),
        }
    }

    /// A file name: a bare path word or a quoted string.
    fn consume_file(&mut self) -> DbResult<String> {
        match self.current_token() {
            Token::String(string) => {
                let string = string.clone();
                self.advance();
                Ok(string)
            }
            _ => self.consume_ident(),
        }
    }

    fn consume_data_type(&mut self) -> DbResult<DataType> {
        let data_type = match self.current_token() {
            Token::Int => DataType::Int,
            Token::Str => DataType::Text,
            Token::Ident(word) => word.parse()?,
            token => return Err(syntax(format!("{token:?} is not a column type"))),
        };
        self.advance();
        Ok(data_type)
    }

    /// A column reference: a zero-based index or a header name.
    fn consume_column(&mut self) -> DbResult<ColumnRef> {
        match self.current_token() {
            Token::Number(n) => {
                let index = n.parse::<usize>().map_err(|_| DbError::column(n))?;
                self.advance();
                Ok(ColumnRef::Index(index))
            }
            _ => Ok(ColumnRef::Name(self.consume_ident()?)),
        }
    }

    fn consume_comparator(&mut self) -> DbResult<Comparator> {
        let comparator = match self.current_token() {
            Token::Lower => Comparator::Lt,
            Token::LowerEqual => Comparator::Le,
            Token::Equal | Token::EqualEqual => Comparator::Eq,
            Token::GreaterEqual => Comparator::Ge,
            Token::Greater => Comparator::Gt,
            token => return Err(DbError::UnknownComparator(format!("{token:?}"))),
        };
        self.advance();
        Ok(comparator)
    }

    /// A selection literal: an integer, a bare word or a quoted string,
    /// kept as written. Its type comes from the column it is compared with.
    fn consume_literal(&mut self) -> DbResult<String> {
        let literal = match self.current_token() {
            Token::Number(word) | Token::Ident(word) | Token::String(word) => word.clone(),
            token => return Err(syntax(format!("expected a literal, found {token:?}"))),
        };
        self.advance();
        Ok(literal)
    }

    // --- Commands ---

    fn parse_define(&mut self) -> DbResult<Command> {
        self.consume(Token::Define)?;
        let name = self.consume_ident()?;
        self.consume(Token::LeftParen)?;
        let mut types = vec![];
        while !self.eat(Token::RightParen) {
            types.push(self.consume_data_type()?);
            // separating commas are optional
            self.eat(Token::Comma);
        }
        Ok(Command::Define(Define { name, types }))
    }

    fn parse_load(&mut self) -> DbResult<Command> {
        self.consume(Token::Load)?;
        let headed = self.eat(Token::Headed);
        let table = self.consume_ident()?;
        self.consume(Token::From)?;
        let file = self.consume_file()?;
        Ok(Command::Load(Load {
            headed,
            table,
            file,
        }))
    }

    fn parse_save(&mut self) -> DbResult<Command> {
        self.consume(Token::Save)?;
        let table = self.consume_ident()?;
        let file = self.consume_file()?;
        Ok(Command::Save(Save { table, file }))
    }

    fn parse_check(&mut self) -> DbResult<Command> {
        self.consume(Token::Check)?;
        let (child, child_column) = self.parse_qualified_column()?;
        self.consume(Token::References)?;
        let (parent, parent_column) = self.parse_qualified_column()?;
        Ok(Command::Check(Check {
            child,
            child_column,
            parent,
            parent_column,
        }))
    }

    /// `NAME(col)`
    fn parse_qualified_column(&mut self) -> DbResult<(String, ColumnRef)> {
        let table = self.consume_ident()?;
        self.consume(Token::LeftParen)?;
        let column = self.consume_column()?;
        self.consume(Token::RightParen)?;
        Ok((table, column))
    }

    fn parse_assign(&mut self) -> DbResult<Command> {
        let target = self.consume_ident()?;
        self.consume(Token::Equal)?;
        let expr = self.parse_expr()?;
        Ok(Command::Assign(Assign { target, expr }))
    }

    // --- Operators ---

    fn parse_expr(&mut self) -> DbResult<Expr> {
        let outer = self.eat(Token::Outer);
        let operator = self.current_token().clone();
        self.advance();

        if outer && !matches!(operator, Token::Join | Token::NaturalJoin) {
            return Err(syntax(format!("{operator:?} has no outer form")));
        }

        self.consume(Token::LeftParen)?;
        let expr = match operator {
            Token::Rows => {
                let table = self.consume_ident()?;
                self.consume(Token::Comma)?;
                let column = self.consume_column()?;
                self.consume(Token::Comma)?;
                let comparator = self.consume_comparator()?;
                self.consume(Token::Comma)?;
                let literal = self.consume_literal()?;
                Expr::Rows {
                    table,
                    column,
                    comparator,
                    literal,
                }
            }
            Token::Columns => {
                let table = self.consume_ident()?;
                let mut columns = vec![];
                while self.eat(Token::Comma) {
                    columns.push(self.consume_column()?);
                }
                Expr::Columns { table, columns }
            }
            Token::Product => {
                let (left, right) = self.parse_table_pair()?;
                Expr::Product { left, right }
            }
            Token::Join => {
                let (left, right) = self.parse_table_pair()?;
                let mut pairs = vec![];
                while self.eat(Token::Comma) {
                    let left_column = self.consume_column()?;
                    self.consume(Token::Comma)?;
                    pairs.push((left_column, self.consume_column()?));
                }
                Expr::Join {
                    outer,
                    left,
                    right,
                    pairs,
                }
            }
            Token::NaturalJoin => {
                let (left, right) = self.parse_table_pair()?;
                Expr::NaturalJoin { outer, left, right }
            }
            Token::OrderBy => {
                let table = self.consume_ident()?;
                self.consume(Token::Comma)?;
                let column = self.consume_column()?;
                Expr::OrderBy { table, column }
            }
            token => return Err(syntax(format!("{token:?} is not an operator"))),
        };
        self.consume(Token::RightParen)?;

        Ok(expr)
    }

    fn parse_table_pair(&mut self) -> DbResult<(String, String)> {
        let left = self.consume_ident()?;
        self.consume(Token::Comma)?;
        let right = self.consume_ident()?;
        Ok((left, right))
    }
}

fn syntax(message: String) -> DbError {
    DbError::Syntax(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        Parser::parse_line(line).unwrap()
    }

    fn assign(line: &str) -> Expr {
        match parse(line) {
            Command::Assign(assign) => assign.expr,
            other => panic!("Expected Assign, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_define() {
        let command = parse("define emp (int, string int)");
        match command {
            Command::Define(define) => {
                assert_eq!(define.name, "emp");
                assert_eq!(
                    define.types,
                    vec![DataType::Int, DataType::Text, DataType::Int]
                );
            }
            _ => panic!("Expected Define"),
        }
        assert!(Parser::parse_line("define emp (int, float)").is_err());
    }

    #[test]
    fn test_parse_load_and_save() {
        assert_eq!(
            parse("load headed emp from data/emp.csv"),
            Command::Load(Load {
                headed: true,
                table: "emp".into(),
                file: "data/emp.csv".into(),
            })
        );
        assert_eq!(
            parse("load emp from 'my file.csv'"),
            Command::Load(Load {
                headed: false,
                table: "emp".into(),
                file: "my file.csv".into(),
            })
        );
        assert_eq!(
            parse("save emp out.csv"),
            Command::Save(Save {
                table: "emp".into(),
                file: "out.csv".into(),
            })
        );
    }

    #[test]
    fn test_parse_print_check_exit() {
        assert_eq!(parse("print emp"), Command::Print("emp".into()));
        assert_eq!(parse("EXIT"), Command::Exit);
        assert_eq!(
            parse("check emp(dept) references dept(0)"),
            Command::Check(Check {
                child: "emp".into(),
                child_column: ColumnRef::Name("dept".into()),
                parent: "dept".into(),
                parent_column: ColumnRef::Index(0),
            })
        );
    }

    #[test]
    fn test_parse_rows() {
        assert_eq!(
            assign("young = rows(emp, age, <=, -3)"),
            Expr::Rows {
                table: "emp".into(),
                column: ColumnRef::Name("age".into()),
                comparator: Comparator::Le,
                literal: "-3".into(),
            }
        );
        assert_eq!(
            assign("x = rows(emp, 1, ==, 'Bob Dylan')"),
            Expr::Rows {
                table: "emp".into(),
                column: ColumnRef::Index(1),
                comparator: Comparator::Eq,
                literal: "Bob Dylan".into(),
            }
        );
        assert!(matches!(
            Parser::parse_line("x = rows(emp, 1, (, a)"),
            Err(DbError::UnknownComparator(_))
        ));
    }

    #[test]
    fn test_rows_literal_is_kept_as_written() {
        assert_eq!(
            assign("x = rows(emp, code, ==, 007)"),
            Expr::Rows {
                table: "emp".into(),
                column: ColumnRef::Name("code".into()),
                comparator: Comparator::Eq,
                literal: "007".into(),
            }
        );
        match assign("x = rows(emp, 0, >, 99999999999999999999)") {
            Expr::Rows { literal, .. } => assert_eq!(literal, "99999999999999999999"),
            other => panic!("Expected Rows, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_columns_and_order_by() {
        assert_eq!(
            assign("x = columns(emp, name, 0)"),
            Expr::Columns {
                table: "emp".into(),
                columns: vec![ColumnRef::Name("name".into()), ColumnRef::Index(0)],
            }
        );
        assert_eq!(
            assign("x = columns(emp)"),
            Expr::Columns {
                table: "emp".into(),
                columns: vec![],
            }
        );
        assert_eq!(
            assign("x = orderby(emp, 2)"),
            Expr::OrderBy {
                table: "emp".into(),
                column: ColumnRef::Index(2),
            }
        );
    }

    #[test]
    fn test_parse_joins() {
        assert_eq!(
            assign("x = product(a, b)"),
            Expr::Product {
                left: "a".into(),
                right: "b".into(),
            }
        );
        assert_eq!(
            assign("x = outer join(a, b, 0, 1, id, id)"),
            Expr::Join {
                outer: true,
                left: "a".into(),
                right: "b".into(),
                pairs: vec![
                    (ColumnRef::Index(0), ColumnRef::Index(1)),
                    (ColumnRef::Name("id".into()), ColumnRef::Name("id".into())),
                ],
            }
        );
        assert_eq!(
            assign("x = naturaljoin(a, b)"),
            Expr::NaturalJoin {
                outer: false,
                left: "a".into(),
                right: "b".into(),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        // odd number of join columns
        assert!(Parser::parse_line("x = join(a, b, 0)").is_err());
        assert!(Parser::parse_line("x = outer product(a, b)").is_err());
        assert!(Parser::parse_line("x = print(a)").is_err());
        assert!(Parser::parse_line("print a b").is_err());
        assert!(Parser::parse_line("x = columns(a, -1)").is_err());
        assert!(Parser::parse_line("x = columns(a, 99999999999999999999)").is_err());
        assert!(matches!(
            Parser::parse_line("= rows"),
            Err(DbError::Syntax(_))
        ));
    }
}
