//! Expression evaluation and calls.
//! 表达式求值与调用。

use std::cmp::Ordering;
use std::mem;

use cascade_common::Span;
use cascade_diagnostic::ErrorCode;
use cascade_syntax::{
    ArgList, BinaryOp, CallExpr, Expr, ExprKind, Interpolation, ListSeparator, Quote as SyntaxQuote, UnaryOp,
    VariableRef,
};
use cascade_value::{Color, List, Map, MathName, Quote, Reduction, Separator, Str, Value, ValueResult, ops};

use crate::args::{assign, missing};
use crate::evaluator::{Evaluator, Flow, MAX_CALL_DEPTH};
use crate::suggest::nearest;
use crate::{Args, CallArgs, Callable, EvalError, EvalResult, Member, MemberTag, Scope, UserCallable};

fn lift(result: ValueResult<Value>, span: Span) -> EvalResult<Value> {
    result.map_err(|error| EvalError::from_value(error, span))
}

impl Evaluator<'_> {
    /// Evaluate an expression outside any math function.
    pub fn eval(&mut self, expr: &Expr, scope: &Scope) -> EvalResult<Value> {
        self.eval_in(expr, scope, Reduction::Defer)
    }

    pub(crate) fn eval_in(&mut self, expr: &Expr, scope: &Scope, mode: Reduction) -> EvalResult<Value> {
        self.eval_kind(expr, scope, mode).map_err(|e| e.at(expr.span))
    }

    fn eval_kind(&mut self, expr: &Expr, scope: &Scope, mode: Reduction) -> EvalResult<Value> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Number { value, unit } => Ok(Value::number(*value, unit.as_deref())),
            ExprKind::String { text, quote } => self.eval_string(text, *quote, scope),
            ExprKind::Color(hex) => Ok(Color::from_hex(hex)
                .map(Value::Color)
                .unwrap_or_else(|| Value::unquoted(format!("#{hex}")))),
            ExprKind::Variable(var) => self.eval_variable(var, scope, span),
            ExprKind::Parent => Ok(scope
                .current_rule()
                .map_or(Value::Null, |rule| rule.parent_value())),
            ExprKind::ClassRef { namespace, name } => self.eval_class_ref(namespace.as_deref(), name, scope, span),
            ExprKind::Unary { op, operand } => {
                let value = self.eval_in(operand, scope, mode)?;
                match op {
                    UnaryOp::Neg => lift(ops::neg(&value, mode), span),
                    UnaryOp::Plus => Ok(ops::plus(&value)),
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }
            ExprKind::Binary { op, lhs, rhs } => self.eval_binary(*op, lhs, rhs, scope, mode, span),
            ExprKind::Call(call) => self.eval_call(call, scope, span),
            ExprKind::List {
                items,
                separator,
                bracketed,
            } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_in(item, scope, mode)?);
                }
                Ok(Value::List(List {
                    items: values,
                    separator: match separator {
                        ListSeparator::Space => Separator::Space,
                        ListSeparator::Comma => Separator::Comma,
                        ListSeparator::Slash => Separator::Slash,
                    },
                    bracketed: *bracketed,
                }))
            }
            ExprKind::Map(pairs) => {
                let mut evaluated = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    evaluated.push((self.eval(key, scope)?, self.eval(value, scope)?));
                }
                Ok(Value::Map(Map::from_pairs(evaluated)))
            }
            ExprKind::Range { start, end, inclusive } => {
                let start = self.eval(start, scope)?;
                let end = self.eval(end, scope)?;
                lift(Value::range(&start, &end, *inclusive), span)
            }
            ExprKind::Paren(inner) => self.eval_in(inner, scope, mode),
        }
    }

    fn eval_string(&mut self, text: &Interpolation, quote: Option<SyntaxQuote>, scope: &Scope) -> EvalResult<Value> {
        let content = self.interpolate(text, scope)?;
        let quote = match quote {
            Some(SyntaxQuote::Double) => Quote::Double,
            Some(SyntaxQuote::Single) => Quote::Single,
            None => {
                if text.is_plain() {
                    if let Some(color) = Color::named(&content) {
                        return Ok(Value::Color(color));
                    }
                }
                return Ok(Value::unquoted(content));
            }
        };
        Ok(Value::String(Str {
            text: content,
            quote: Some(quote),
        }))
    }

    fn eval_variable(&mut self, var: &VariableRef, scope: &Scope, span: Span) -> EvalResult<Value> {
        let Some(namespace) = &var.namespace else {
            return scope.variable(&var.name).ok_or_else(|| {
                let names = scope.get_all(MemberTag::Variable);
                EvalError::Undefined {
                    kind: MemberTag::Variable,
                    name: format!("${}", var.name),
                    suggestion: nearest(&var.name, names.iter().map(String::as_str)).map(|s| format!("${s}")),
                    span,
                }
            });
        };
        let module = self.namespace(namespace, span)?;
        module
            .get(MemberTag::Variable, &var.name)
            .and_then(Member::as_variable)
            .cloned()
            .ok_or_else(|| {
                let names = module.names(MemberTag::Variable);
                EvalError::Undefined {
                    kind: MemberTag::Variable,
                    name: format!("{namespace}.${}", var.name),
                    suggestion: nearest(&var.name, names.iter().map(String::as_str))
                        .map(|s| format!("{namespace}.${s}")),
                    span,
                }
            })
    }

    fn eval_class_ref(&mut self, namespace: Option<&str>, name: &str, scope: &Scope, span: Span) -> EvalResult<Value> {
        let Some(namespace) = namespace else {
            return self.local_class(name, scope, span).map(|class| class.to_value());
        };
        let module = self.namespace(namespace, span)?;
        match module.get(MemberTag::Class, name).and_then(Member::as_class) {
            Some(class) => Ok(class.to_value()),
            None => {
                let names = module.names(MemberTag::Class);
                Err(EvalError::Undefined {
                    kind: MemberTag::Class,
                    name: format!("{namespace}.{name}"),
                    suggestion: nearest(name, names.iter().map(String::as_str)).map(|s| format!("{namespace}.{s}")),
                    span,
                })
            }
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        scope: &Scope,
        mode: Reduction,
        span: Span,
    ) -> EvalResult<Value> {
        let left = self.eval_in(lhs, scope, mode)?;
        if let BinaryOp::And | BinaryOp::Or = op {
            // `and` / `or` yield an operand, evaluating the right one only
            // when needed.
            let decided = left.is_truthy() == (op == BinaryOp::Or);
            return if decided { Ok(left) } else { self.eval_in(rhs, scope, mode) };
        }
        let right = self.eval_in(rhs, scope, mode)?;
        let result = match op {
            BinaryOp::Add => ops::add(&left, &right, mode),
            BinaryOp::Sub => ops::sub(&left, &right, mode),
            BinaryOp::Mul => ops::mul(&left, &right, mode),
            BinaryOp::Div => ops::div(&left, &right, mode),
            BinaryOp::Mod => ops::rem(&left, &right),
            BinaryOp::Pow => ops::pow(&left, &right),
            BinaryOp::Eq => Ok(Value::Bool(left == right)),
            BinaryOp::Ne => Ok(Value::Bool(left != right)),
            comparison => ops::compare(&left, &right).map(|ordering| {
                Value::Bool(matches!(
                    (comparison, ordering),
                    (BinaryOp::Lt, Ordering::Less)
                        | (BinaryOp::Le, Ordering::Less | Ordering::Equal)
                        | (BinaryOp::Gt, Ordering::Greater)
                        | (BinaryOp::Ge, Ordering::Greater | Ordering::Equal)
                ))
            }),
        };
        lift(result, span)
    }

    // ========== Calls ==========

    fn eval_call(&mut self, call: &CallExpr, scope: &Scope, span: Span) -> EvalResult<Value> {
        if let Some(namespace) = &call.namespace {
            let callable = self.lookup_callable(MemberTag::Function, Some(namespace), &call.name, scope, span)?;
            let args = self.eval_args(&call.args, scope)?;
            return self.call_function(&callable, args, scope, span);
        }
        if call.name == "if" {
            return self.eval_if_function(&call.args, scope);
        }
        if let Some(math) = MathName::from_name(&call.name) {
            return self.eval_math(math, &call.args, scope, span);
        }
        let callable = scope
            .get(MemberTag::Function, &call.name)
            .as_ref()
            .and_then(Member::as_callable)
            .or_else(|| {
                self.globals
                    .get(MemberTag::Function, &call.name)
                    .and_then(Member::as_callable)
            })
            .cloned();
        match callable {
            Some(callable) => {
                let args = self.eval_args(&call.args, scope)?;
                self.call_function(&callable, args, scope, span)
            }
            None => self.plain_function(call, scope),
        }
    }

    /// A function or mixin, through a namespace or the scope chain.
    pub(crate) fn lookup_callable(
        &self,
        tag: MemberTag,
        namespace: Option<&str>,
        name: &str,
        scope: &Scope,
        span: Span,
    ) -> EvalResult<Callable> {
        let (found, candidates, prefix) = match namespace {
            Some(namespace) => {
                let module = self.namespace(namespace, span)?;
                let found = module.get(tag, name).and_then(Member::as_callable).cloned();
                (found, module.names(tag), format!("{namespace}."))
            }
            None => {
                let found = scope.get(tag, name).as_ref().and_then(Member::as_callable).cloned();
                (found, scope.get_all(tag), String::new())
            }
        };
        found.ok_or_else(|| EvalError::Undefined {
            kind: tag,
            name: format!("{prefix}{name}"),
            suggestion: nearest(name, candidates.iter().map(String::as_str)).map(|s| format!("{prefix}{s}")),
            span,
        })
    }

    /// Evaluate call-site arguments in the caller's scope.
    pub(crate) fn eval_args(&mut self, args: &ArgList, scope: &Scope) -> EvalResult<CallArgs> {
        let mut out = CallArgs::default();
        for expr in &args.positional {
            out.positional.push(self.eval(expr, scope)?);
        }
        for (name, expr) in &args.keywords {
            out.keywords.push((name.clone(), self.eval(expr, scope)?));
        }
        if let Some(rest) = &args.rest {
            let value = self.eval(rest, scope)?;
            out.spread(value).map_err(|e| e.at(rest.span))?;
        }
        Ok(out)
    }

    /// Call a function with already evaluated arguments.
    pub fn call_function(&mut self, callable: &Callable, args: CallArgs, caller: &Scope, span: Span) -> EvalResult<Value> {
        let user = match callable {
            Callable::Native(native) => {
                let mut bound = Args::bind(native, args, caller.clone(), span)?;
                return (native.func)(&mut bound);
            }
            Callable::User(user) => user,
        };
        self.enter(span)?;
        let body_scope = user.closure.child(true);
        let saved = mem::replace(&mut self.in_function, true);
        let mut discarded = Vec::new();
        let result = self
            .bind_params(user, args, &body_scope)
            .and_then(|()| self.exec_block(&user.body, &body_scope, &mut discarded));
        self.in_function = saved;
        self.call_depth -= 1;
        match result? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Err(EvalError::structural(
                ErrorCode::MissingReturn,
                format!("function `{}` finished without @return", user.name),
                span,
            )),
        }
    }

    pub(crate) fn enter(&mut self, span: Span) -> EvalResult<()> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(EvalError::structural(
                ErrorCode::RecursionLimit,
                format!("calls nested more than {MAX_CALL_DEPTH} levels deep"),
                span,
            ));
        }
        self.call_depth += 1;
        Ok(())
    }

    /// Bind positionals, then keywords, then defaults evaluated in the
    /// callee's scope so they can see earlier parameters.
    pub(crate) fn bind_params(&mut self, user: &UserCallable, args: CallArgs, scope: &Scope) -> EvalResult<()> {
        let names: Vec<&str> = user.params.params.iter().map(|p| p.name.as_str()).collect();
        let assigned = assign(&user.name, &names, user.params.rest.is_some(), args)?;
        for (param, slot) in user.params.params.iter().zip(assigned.slots) {
            let value = match (slot, &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval(default, scope)?,
                (None, None) => return Err(missing(&user.name, &param.name)),
            };
            scope.set_local(Member::variable(&param.name, value));
        }
        if let Some(rest) = &user.params.rest {
            scope.set_local(Member::variable(rest, Value::ArgList(assigned.rest)));
        }
        Ok(())
    }

    /// `if($condition, $if-true, $if-false)`: only the chosen branch runs.
    fn eval_if_function(&mut self, args: &ArgList, scope: &Scope) -> EvalResult<Value> {
        const PARAMS: [&str; 3] = ["condition", "if-true", "if-false"];
        let mut slots: [Option<&Expr>; 3] = [None; 3];
        if args.positional.len() > PARAMS.len() || args.rest.is_some() {
            return Err(EvalError::argument(
                ErrorCode::UnexpectedArgument,
                "`if` takes exactly three arguments",
            ));
        }
        for (slot, expr) in slots.iter_mut().zip(&args.positional) {
            *slot = Some(expr);
        }
        for (name, expr) in &args.keywords {
            match PARAMS.iter().position(|p| *p == name.as_str()) {
                Some(i) if slots[i].is_some() => {
                    return Err(EvalError::argument(
                        ErrorCode::DuplicateArgument,
                        format!("argument `${name}` of `if` was passed both by position and by name"),
                    ));
                }
                Some(i) => slots[i] = Some(expr),
                None => {
                    return Err(EvalError::argument(
                        ErrorCode::UnexpectedArgument,
                        format!("`if` has no parameter named `${name}`"),
                    ));
                }
            }
        }
        let [Some(condition), Some(if_true), Some(if_false)] = slots else {
            let absent = slots.iter().position(Option::is_none).unwrap_or(0);
            return Err(missing("if", PARAMS[absent]));
        };
        let branch = if self.eval(condition, scope)?.is_truthy() {
            if_true
        } else {
            if_false
        };
        self.eval(branch, scope)
    }

    /// `calc()`, `min()`, `max()` and `clamp()`: arguments are evaluated as
    /// calculations and reduced as far as their units allow.
    fn eval_math(&mut self, math: MathName, args: &ArgList, scope: &Scope, span: Span) -> EvalResult<Value> {
        if !args.keywords.is_empty() {
            return Err(EvalError::argument(
                ErrorCode::UnexpectedArgument,
                format!("`{}()` takes no keyword arguments", math.as_str()),
            ));
        }
        let mut values = Vec::with_capacity(args.positional.len());
        for arg in &args.positional {
            values.push(self.eval_in(arg, scope, Reduction::Calc)?);
        }
        if let Some(rest) = &args.rest {
            values.extend(self.eval(rest, scope)?.as_items());
        }
        let arity = |expected: usize, given: usize| {
            EvalError::argument(
                if given > expected {
                    ErrorCode::UnexpectedArgument
                } else {
                    ErrorCode::MissingArgument
                },
                format!("`{}()` takes {expected} argument(s), got {given}", math.as_str()),
            )
        };
        match math {
            MathName::Calc => match <[Value; 1]>::try_from(values) {
                Ok([value]) => Ok(ops::calc(value)),
                Err(values) => Err(arity(1, values.len())),
            },
            MathName::Min | MathName::Max => lift(ops::min_max(math, &values, Reduction::Defer), span),
            MathName::Clamp => match values.as_slice() {
                [lo, value, hi] => lift(ops::clamp(lo, value, hi, Reduction::Defer), span),
                _ => Err(arity(3, values.len())),
            },
        }
    }

    /// An unknown function stays a CSS function call.
    fn plain_function(&mut self, call: &CallExpr, scope: &Scope) -> EvalResult<Value> {
        if let Some((name, _)) = call.args.keywords.first() {
            return Err(EvalError::argument(
                ErrorCode::UnexpectedArgument,
                format!("plain CSS function `{}()` does not take keyword argument `${name}`", call.name),
            ));
        }
        let args = self.eval_args(&call.args, scope)?;
        let rendered: Vec<String> = args.positional.iter().map(Value::to_css).collect();
        Ok(Value::unquoted(format!("{}({})", call.name, rendered.join(", "))))
    }
}
