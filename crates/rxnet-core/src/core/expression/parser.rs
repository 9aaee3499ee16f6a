use super::ExpressionError;
use super::lexer::{Token, TokenKind};
use super::namespace::Namespace;
use phf::{Map, phf_map};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Builtin {
    Exp,
    Ln,
    Log10,
    Sqrt,
    Abs,
    Sin,
    Cos,
    Tan,
    Floor,
    Ceil,
    Pow,
    Min,
    Max,
}

pub(crate) static BUILTINS: Map<&'static str, Builtin> = phf_map! {
    "exp" => Builtin::Exp,
    "log" => Builtin::Ln,
    "ln" => Builtin::Ln,
    "log10" => Builtin::Log10,
    "sqrt" => Builtin::Sqrt,
    "abs" => Builtin::Abs,
    "sin" => Builtin::Sin,
    "cos" => Builtin::Cos,
    "tan" => Builtin::Tan,
    "floor" => Builtin::Floor,
    "ceil" => Builtin::Ceil,
    "pow" => Builtin::Pow,
    "min" => Builtin::Min,
    "max" => Builtin::Max,
};

impl Builtin {
    fn arity(self) -> usize {
        match self {
            Builtin::Pow | Builtin::Min | Builtin::Max => 2,
            _ => 1,
        }
    }

    fn apply(self, args: &[f64]) -> f64 {
        match self {
            Builtin::Exp => args[0].exp(),
            Builtin::Ln => args[0].ln(),
            Builtin::Log10 => args[0].log10(),
            Builtin::Sqrt => args[0].sqrt(),
            Builtin::Abs => args[0].abs(),
            Builtin::Sin => args[0].sin(),
            Builtin::Cos => args[0].cos(),
            Builtin::Tan => args[0].tan(),
            Builtin::Floor => args[0].floor(),
            Builtin::Ceil => args[0].ceil(),
            Builtin::Pow => args[0].powf(args[1]),
            Builtin::Min => args[0].min(args[1]),
            Builtin::Max => args[0].max(args[1]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Number(f64),
    Variable(String),
    Negate(Box<Node>),
    Binary(BinaryOp, Box<Node>, Box<Node>),
    Call(Builtin, Vec<Node>),
}

impl Node {
    pub(crate) fn evaluate(&self, namespace: &Namespace) -> Result<f64, ExpressionError> {
        match self {
            Node::Number(value) => Ok(*value),
            Node::Variable(name) => namespace
                .get(name)
                .ok_or_else(|| ExpressionError::UnknownName(name.clone())),
            Node::Negate(inner) => Ok(-inner.evaluate(namespace)?),
            Node::Binary(op, lhs, rhs) => {
                let a = lhs.evaluate(namespace)?;
                let b = rhs.evaluate(namespace)?;
                Ok(match op {
                    BinaryOp::Add => a + b,
                    BinaryOp::Sub => a - b,
                    BinaryOp::Mul => a * b,
                    BinaryOp::Div => a / b,
                    BinaryOp::Pow => a.powf(b),
                })
            }
            Node::Call(builtin, args) => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(namespace))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(builtin.apply(&values))
            }
        }
    }

    pub(crate) fn collect_variables<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Number(_) => {}
            Node::Variable(name) => {
                if !out.contains(&name.as_str()) {
                    out.push(name);
                }
            }
            Node::Negate(inner) => inner.collect_variables(out),
            Node::Binary(_, lhs, rhs) => {
                lhs.collect_variables(out);
                rhs.collect_variables(out);
            }
            Node::Call(_, args) => args.iter().for_each(|arg| arg.collect_variables(out)),
        }
    }
}

/// Recursive-descent parser over a token stream.
///
/// Grammar (lowest to highest precedence):
///
/// ```text
/// sum     := product (('+' | '-') product)*
/// product := unary (('*' | '/') unary)*
/// unary   := ('+' | '-') unary | power
/// power   := primary ('^' unary)?
/// primary := NUMBER | IDENT | IDENT '(' sum (',' sum)* ')' | '(' sum ')'
/// ```
///
/// Unary minus binds looser than `^`, so `-2^2` is `-4`.
pub(crate) struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    source_len: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Token>, source_len: usize) -> Self {
        Self {
            tokens,
            cursor: 0,
            source_len,
        }
    }

    pub(crate) fn parse(mut self) -> Result<Node, ExpressionError> {
        if self.tokens.is_empty() {
            return Err(ExpressionError::Empty);
        }
        let node = self.sum()?;
        if let Some(token) = self.tokens.get(self.cursor) {
            return Err(ExpressionError::UnexpectedToken {
                found: describe(&token.kind),
                position: token.position,
            });
        }
        Ok(node)
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.cursor).map(|t| &t.kind)
    }

    fn next(&mut self) -> Result<Token, ExpressionError> {
        let token = self
            .tokens
            .get(self.cursor)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd {
                position: self.source_len,
            })?;
        self.cursor += 1;
        Ok(token)
    }

    fn expect(&mut self, expected: TokenKind) -> Result<(), ExpressionError> {
        let token = self.next()?;
        if token.kind == expected {
            Ok(())
        } else {
            Err(ExpressionError::UnexpectedToken {
                found: describe(&token.kind),
                position: token.position,
            })
        }
    }

    fn sum(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.product()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Sub,
                _ => return Ok(node),
            };
            self.cursor += 1;
            let rhs = self.product()?;
            node = Node::Binary(op, Box::new(node), Box::new(rhs));
        }
    }

    fn product(&mut self) -> Result<Node, ExpressionError> {
        let mut node = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => BinaryOp::Mul,
                Some(TokenKind::Slash) => BinaryOp::Div,
                _ => return Ok(node),
            };
            self.cursor += 1;
            let rhs = self.unary()?;
            node = Node::Binary(op, Box::new(node), Box::new(rhs));
        }
    }

    fn unary(&mut self) -> Result<Node, ExpressionError> {
        match self.peek() {
            Some(TokenKind::Minus) => {
                self.cursor += 1;
                Ok(Node::Negate(Box::new(self.unary()?)))
            }
            Some(TokenKind::Plus) => {
                self.cursor += 1;
                self.unary()
            }
            _ => self.power(),
        }
    }

    fn power(&mut self) -> Result<Node, ExpressionError> {
        let base = self.primary()?;
        if let Some(TokenKind::Caret) = self.peek() {
            self.cursor += 1;
            let exponent = self.unary()?;
            return Ok(Node::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Node, ExpressionError> {
        let token = self.next()?;
        match token.kind {
            TokenKind::Number(value) => Ok(Node::Number(value)),
            TokenKind::Ident(name) => {
                if let Some(TokenKind::LParen) = self.peek() {
                    self.cursor += 1;
                    self.call(name)
                } else {
                    Ok(Node::Variable(name))
                }
            }
            TokenKind::LParen => {
                let inner = self.sum()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            other => Err(ExpressionError::UnexpectedToken {
                found: describe(&other),
                position: token.position,
            }),
        }
    }

    fn call(&mut self, name: String) -> Result<Node, ExpressionError> {
        let builtin = *BUILTINS
            .get(name.as_str())
            .ok_or_else(|| ExpressionError::UnknownFunction(name.clone()))?;

        let mut args = Vec::new();
        if let Some(TokenKind::RParen) = self.peek() {
            self.cursor += 1;
        } else {
            loop {
                args.push(self.sum()?);
                let token = self.next()?;
                match token.kind {
                    TokenKind::Comma => continue,
                    TokenKind::RParen => break,
                    other => {
                        return Err(ExpressionError::UnexpectedToken {
                            found: describe(&other),
                            position: token.position,
                        });
                    }
                }
            }
        }

        if args.len() != builtin.arity() {
            return Err(ExpressionError::Arity {
                function: name,
                expected: builtin.arity(),
                found: args.len(),
            });
        }
        Ok(Node::Call(builtin, args))
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Number(value) => value.to_string(),
        TokenKind::Ident(name) => name.clone(),
        TokenKind::Plus => "+".into(),
        TokenKind::Minus => "-".into(),
        TokenKind::Star => "*".into(),
        TokenKind::Slash => "/".into(),
        TokenKind::Caret => "^".into(),
        TokenKind::LParen => "(".into(),
        TokenKind::RParen => ")".into(),
        TokenKind::Comma => ",".into(),
    }
}
