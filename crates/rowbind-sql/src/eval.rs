mod lexer;
use lexer::{tokenize, Token};

use rowbind_core::{Error, Result, Value};

/// Name-resolution environment an expression evaluates against. The render
/// context implements this: explicit bindings first, then the parameter
/// object's properties.
pub trait Scope {
    fn resolve(&self, name: &str) -> Value;
}

impl Scope for Value {
    fn resolve(&self, name: &str) -> Value {
        self.path(name)
    }
}

/// Test/collection expression evaluation over the binding scope.
///
/// The template nodes own only the control-flow contract; what an expression
/// means is decided here, behind this seam.
pub trait ExpressionEvaluator {
    fn eval_bool(&self, expr: &str, scope: &dyn Scope) -> Result<bool>;

    fn eval_value(&self, expr: &str, scope: &dyn Scope) -> Result<Value>;

    /// Evaluates to `(index-or-key, item)` pairs. Lists index by position,
    /// objects iterate entries with the key as index.
    fn eval_iterable(&self, expr: &str, scope: &dyn Scope) -> Result<Vec<(Value, Value)>>;
}

/// Default evaluator: dot-path navigation, literals, comparisons, and
/// `and`/`or`/`not` with short-circuit.
///
/// Truthiness: booleans are themselves, numbers are non-zero, everything else
/// is non-null.
#[derive(Default)]
pub struct SimpleEvaluator;

impl ExpressionEvaluator for SimpleEvaluator {
    fn eval_bool(&self, expr: &str, scope: &dyn Scope) -> Result<bool> {
        Ok(truthy(&self.eval_value(expr, scope)?))
    }

    fn eval_value(&self, expr: &str, scope: &dyn Scope) -> Result<Value> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser {
            tokens: &tokens,
            position: 0,
            source: expr,
        };
        let parsed = parser.expr()?;
        parser.expect_end()?;
        eval(&parsed, scope)
    }

    fn eval_iterable(&self, expr: &str, scope: &dyn Scope) -> Result<Vec<(Value, Value)>> {
        match self.eval_value(expr, scope)? {
            Value::List(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (Value::I64(i as i64), item))
                .collect()),
            Value::Object(obj) => Ok(obj
                .field_names()
                .into_iter()
                .map(|name| {
                    let value = obj.peek(&name);
                    (Value::String(name), value)
                })
                .collect()),
            Value::Null => Err(Error::template(format!(
                "collection expression `{expr}` evaluated to null"
            ))),
            other => Err(Error::template(format!(
                "collection expression `{expr}` evaluated to non-iterable {}",
                other.ty_name()
            ))),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(v) => *v,
        Value::I64(v) => *v != 0,
        Value::F64(v) => *v != 0.0,
        Value::Null => false,
        _ => true,
    }
}

#[derive(Debug)]
enum Expr {
    Literal(Value),
    Path(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy)]
enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

struct Parser<'a> {
    tokens: &'a [Token],
    position: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn expr(&mut self) -> Result<Expr> {
        self.or()
    }

    fn or(&mut self) -> Result<Expr> {
        let mut lhs = self.and()?;
        while self.eat(&Token::Or) {
            let rhs = self.and()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and(&mut self) -> Result<Expr> {
        let mut lhs = self.not()?;
        while self.eat(&Token::And) {
            let rhs = self.not()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not(&mut self) -> Result<Expr> {
        if self.eat(&Token::Not) {
            return Ok(Expr::Not(Box::new(self.not()?)));
        }
        self.cmp()
    }

    fn cmp(&mut self) -> Result<Expr> {
        let lhs = self.primary()?;
        let op = match self.peek() {
            Some(Token::Eq) => CmpOp::Eq,
            Some(Token::Ne) => CmpOp::Ne,
            Some(Token::Lt) => CmpOp::Lt,
            Some(Token::Le) => CmpOp::Le,
            Some(Token::Gt) => CmpOp::Gt,
            Some(Token::Ge) => CmpOp::Ge,
            _ => return Ok(lhs),
        };
        self.position += 1;
        let rhs = self.primary()?;
        Ok(Expr::Cmp(op, Box::new(lhs), Box::new(rhs)))
    }

    fn primary(&mut self) -> Result<Expr> {
        let token = self
            .peek()
            .ok_or_else(|| self.error("unexpected end of expression"))?
            .clone();
        self.position += 1;
        Ok(match token {
            Token::LParen => {
                let inner = self.expr()?;
                if !self.eat(&Token::RParen) {
                    return Err(self.error("missing closing parenthesis"));
                }
                inner
            }
            Token::Null => Expr::Literal(Value::Null),
            Token::True => Expr::Literal(Value::Bool(true)),
            Token::False => Expr::Literal(Value::Bool(false)),
            Token::Int(v) => Expr::Literal(Value::I64(v)),
            Token::Float(v) => Expr::Literal(Value::F64(v)),
            Token::Str(v) => Expr::Literal(Value::String(v)),
            Token::Path(path) => Expr::Path(path),
            other => return Err(self.error(&format!("unexpected token {other:?}"))),
        })
    }

    fn expect_end(&self) -> Result<()> {
        if self.position == self.tokens.len() {
            Ok(())
        } else {
            Err(self.error("trailing tokens"))
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> Error {
        Error::template(format!("{message} in expression `{}`", self.source))
    }
}

fn eval(expr: &Expr, scope: &dyn Scope) -> Result<Value> {
    Ok(match expr {
        Expr::Literal(value) => value.clone(),
        Expr::Path(path) => {
            let (head, rest) = match path.split_once('.') {
                Some((head, rest)) => (head, Some(rest)),
                None => (path.as_str(), None),
            };
            let base = scope.resolve(head);
            match rest {
                Some(rest) => base.path(rest),
                None => base,
            }
        }
        Expr::Not(inner) => Value::Bool(!truthy(&eval(inner, scope)?)),
        Expr::And(lhs, rhs) => {
            if !truthy(&eval(lhs, scope)?) {
                Value::Bool(false)
            } else {
                Value::Bool(truthy(&eval(rhs, scope)?))
            }
        }
        Expr::Or(lhs, rhs) => {
            if truthy(&eval(lhs, scope)?) {
                Value::Bool(true)
            } else {
                Value::Bool(truthy(&eval(rhs, scope)?))
            }
        }
        Expr::Cmp(op, lhs, rhs) => {
            let lhs = eval(lhs, scope)?;
            let rhs = eval(rhs, scope)?;
            Value::Bool(compare(*op, &lhs, &rhs)?)
        }
    })
}

fn compare(op: CmpOp, lhs: &Value, rhs: &Value) -> Result<bool> {
    match op {
        CmpOp::Eq => Ok(lhs == rhs),
        CmpOp::Ne => Ok(lhs != rhs),
        _ => {
            let ordering = match (lhs, rhs) {
                (Value::I64(a), Value::I64(b)) => a.partial_cmp(b),
                (Value::String(a), Value::String(b)) => a.partial_cmp(b),
                (a, b) => match (number(a), number(b)) {
                    (Some(a), Some(b)) => a.partial_cmp(&b),
                    _ => None,
                },
            };
            let Some(ordering) = ordering else {
                return Err(Error::template(format!(
                    "cannot order {} against {}",
                    lhs.ty_name(),
                    rhs.ty_name()
                )));
            };
            Ok(match op {
                CmpOp::Lt => ordering.is_lt(),
                CmpOp::Le => ordering.is_le(),
                CmpOp::Gt => ordering.is_gt(),
                CmpOp::Ge => ordering.is_ge(),
                CmpOp::Eq | CmpOp::Ne => unreachable!(),
            })
        }
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::I64(v) => Some(*v as f64),
        Value::F64(v) => Some(*v),
        _ => None,
    }
}
