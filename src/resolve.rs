use std::collections::{HashMap, LinkedList};

use nonempty::NonEmpty;
use option_ext::OptionExt;
use tracing::{debug, trace};

use crate::annotated_ast::{AnnotatedExpression, AnnotatedProgram, AnnotatedStatement, ExprId};
use crate::ast::ScopeJumps;
use crate::common::error::{convert_errors, ErrorInfo, ErrorKind, LoxError, LoxResult};

/// Scope distance of every locally bound variable read or assignment. Nodes missing from the
/// table are globals.
pub type Locals = HashMap<ExprId, ScopeJumps>;

pub fn resolve(program: &AnnotatedProgram) -> LoxResult<Locals> {
    convert_errors(resolve_go(program))
}

fn resolve_go(program: &AnnotatedProgram) -> Result<Locals, NonEmpty<ResolverError>> {
    let mut resolver = Resolver::new();
    for s in &program.statements {
        resolver.resolve_stmt(s);
    }
    debug!(locals = resolver.locals.len(), errors = resolver.errors.len(), "resolved program");
    match NonEmpty::from_vec(resolver.errors) {
        Some(errors) => Err(errors),
        None => Ok(resolver.locals),
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub enum ResolverError {
    SelfReference(String, ErrorInfo),
}

impl LoxError for ResolverError {
    fn get_info(&self) -> ErrorInfo {
        match self {
            ResolverError::SelfReference(_, i) => *i,
        }
    }
    fn get_message(&self) -> String {
        match self {
            ResolverError::SelfReference(name, _) =>
                format!("at '{}': Can't read local variable in its own initializer.", name),
        }
    }
    fn get_kind(&self) -> ErrorKind { ErrorKind::Resolution }
}

struct Resolver {
    // Innermost scope first. The global scope is never pushed.
    scopes: LinkedList<HashMap<String, bool>>,
    locals: Locals,
    errors: Vec<ResolverError>,
}

impl Resolver {
    pub fn new() -> Self {
        Resolver { scopes: LinkedList::new(), locals: HashMap::new(), errors: Vec::new() }
    }

    pub fn resolve_stmt(&mut self, stmt: &AnnotatedStatement) {
        match stmt {
            AnnotatedStatement::Block(stmts, _) => {
                self.enter_scope();
                for s in stmts {
                    self.resolve_stmt(s);
                }
                self.exit_scope();
            }
            AnnotatedStatement::IfElse { cond, if_stmt, else_stmt, .. } => {
                self.resolve_expr(cond);
                self.resolve_stmt(if_stmt);
                if let Some(e) = else_stmt {
                    self.resolve_stmt(e);
                }
            }
            AnnotatedStatement::Variable(name, expr, _) => {
                self.declare(name);
                if let Some(e) = expr {
                    self.resolve_expr(e);
                }
                self.define(name);
            }
            AnnotatedStatement::Print(expr, _) => self.resolve_expr(expr),
            AnnotatedStatement::Expression(expr) => self.resolve_expr(expr),
        }
    }

    fn resolve_expr(&mut self, expr: &AnnotatedExpression) {
        match expr {
            AnnotatedExpression::Literal(..) => (),
            AnnotatedExpression::Variable(name, id, i) => {
                if self.is_declared_but_undefined(name) {
                    self.errors.push(ResolverError::SelfReference(name.to_owned(), *i));
                }
                self.resolve_local(*id, name);
            }
            AnnotatedExpression::Assign(name, id, value, _) => {
                self.resolve_expr(value);
                self.resolve_local(*id, name);
            }
            AnnotatedExpression::Grouping(e, _) => self.resolve_expr(e),
            AnnotatedExpression::Unary(_, e, _) => self.resolve_expr(e),
            AnnotatedExpression::Binary(_, e1, e2, _) |
            AnnotatedExpression::Logical(_, e1, e2, _) => {
                self.resolve_expr(e1);
                self.resolve_expr(e2);
            }
            AnnotatedExpression::Call(callee, args, _) => {
                self.resolve_expr(callee);
                for arg in args {
                    self.resolve_expr(arg);
                }
            }
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push_front(HashMap::new());
        trace!(depth = self.scopes.len(), "entered scope");
    }

    fn exit_scope(&mut self) {
        self.scopes.pop_front();
        trace!(depth = self.scopes.len(), "exited scope");
    }

    fn declare(&mut self, name: &str) {
        if let Some(scope) = self.scopes.front_mut() {
            scope.insert(name.to_owned(), false);
        }
    }

    fn define(&mut self, name: &str) {
        if let Some(scope) = self.scopes.front_mut() {
            scope.insert(name.to_owned(), true);
        }
    }

    fn is_declared_but_undefined(&self, name: &str) -> bool {
        let defined = self.scopes.front().and_then(|s| s.get(name)).copied();
        OptionExt::contains(&defined, &false)
    }

    fn resolve_local(&mut self, id: ExprId, name: &str) {
        if let Some(jumps) = self.scopes.iter().position(|s| s.contains_key(name)) {
            trace!(name, jumps, "resolved local");
            self.locals.insert(id, jumps);
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions_sorted::assert_eq_sorted;

    use crate::annotated_ast::AnnotatedExpression::{Assign, Variable};
    use crate::common::tests::{unsafe_parse, unsafe_resolve, SliceExt};

    use super::*;

    // Distances of every variable node in source order, `None` for globals.
    fn distances(program: Vec<&str>) -> Vec<(String, Option<ScopeJumps>)> {
        fn walk_stmt(s: &AnnotatedStatement, out: &mut Vec<(String, ExprId)>) {
            match s {
                AnnotatedStatement::Block(ss, _) => ss.iter().for_each(|s| walk_stmt(s, out)),
                AnnotatedStatement::IfElse { cond, if_stmt, else_stmt, .. } => {
                    walk_expr(cond, out);
                    walk_stmt(if_stmt, out);
                    if let Some(e) = else_stmt {
                        walk_stmt(e, out);
                    }
                }
                AnnotatedStatement::Variable(_, e, _) => e.iter().for_each(|e| walk_expr(e, out)),
                AnnotatedStatement::Expression(e) | AnnotatedStatement::Print(e, _) =>
                    walk_expr(e, out),
            }
        }
        fn walk_expr(e: &AnnotatedExpression, out: &mut Vec<(String, ExprId)>) {
            match e {
                Variable(name, id, _) => out.push((name.to_owned(), *id)),
                Assign(name, id, value, _) => {
                    walk_expr(value, out);
                    out.push((name.to_owned(), *id));
                }
                AnnotatedExpression::Literal(..) => (),
                AnnotatedExpression::Grouping(e, _) | AnnotatedExpression::Unary(_, e, _) =>
                    walk_expr(e, out),
                AnnotatedExpression::Binary(_, e1, e2, _) |
                AnnotatedExpression::Logical(_, e1, e2, _) => {
                    walk_expr(e1, out);
                    walk_expr(e2, out);
                }
                AnnotatedExpression::Call(callee, args, _) => {
                    walk_expr(callee, out);
                    args.iter().for_each(|a| walk_expr(a, out));
                }
            }
        }
        let (ast, locals) = unsafe_resolve(program);
        let mut ids = Vec::new();
        ast.statements.iter().for_each(|s| walk_stmt(s, &mut ids));
        ids.into_iter().map(|(name, id)| (name, locals.get(&id).copied())).collect()
    }

    fn local(name: &str, jumps: ScopeJumps) -> (String, Option<ScopeJumps>) {
        (name.to_owned(), Some(jumps))
    }

    fn global(name: &str) -> (String, Option<ScopeJumps>) {
        (name.to_owned(), None)
    }

    #[test]
    fn shadowing_in_a_block() {
        assert_eq!(
            distances(vec![
                r#"var a = "outer";"#,
                "{",
                r#"var a = "inner";"#,
                "print a;",
                "}",
                "print a;",
            ]),
            vec![local("a", 0), global("a")],
        );
    }

    #[test]
    fn nested_blocks_count_hops() {
        assert_eq!(
            distances(vec![
                "{",
                "  var a = 1;",
                "  {",
                "    var b = 2;",
                "    {",
                "      a = b + a;",
                "    }",
                "  }",
                "}",
            ]),
            vec![local("b", 1), local("a", 2), local("a", 2)],
        );
    }

    #[test]
    fn initializer_reads_enclosing_binding() {
        assert_eq!(
            distances(vec![
                "var x = 1;",
                "{",
                "  var y = x + 1;",
                "  { var x = y; print x; }",
                "}",
            ]),
            vec![global("x"), local("y", 1), local("x", 0)],
        );
    }

    #[test]
    fn undeclared_and_global_names_are_left_out() {
        let (_, locals) = unsafe_resolve(vec!["var a = 1;", "print a + b;", "if (a) c = 3;"]);
        assert!(locals.is_empty());
    }

    #[test]
    fn calls_resolve_callee_and_arguments() {
        assert_eq!(
            distances(vec!["{ var f; var x; f(x, g)(x); }"]),
            vec![local("f", 0), local("x", 0), global("g"), local("x", 0)],
        );
    }

    #[test]
    fn if_branches_are_resolved() {
        assert_eq!(
            distances(vec!["{ var a; if (a) { print a; } else a = 1; }"]),
            vec![local("a", 0), local("a", 1), local("a", 0)],
        );
    }

    #[test]
    fn locals_table_is_keyed_by_node() {
        let (ast, locals) = unsafe_resolve(vec!["{ var a = 1; print a; { print a; } }"]);
        let ids: Vec<ExprId> = match ast.statements.unwrap_single() {
            AnnotatedStatement::Block(stmts, _) => match (&stmts[1], &stmts[2]) {
                (
                    AnnotatedStatement::Print(Variable(_, first, _), _),
                    AnnotatedStatement::Block(inner, _),
                ) => match inner.unwrap_single() {
                    AnnotatedStatement::Print(Variable(_, second, _), _) => vec![*first, *second],
                    s => panic!("Unexpected statement {:?}", s),
                },
                s => panic!("Unexpected statements {:?}", s),
            },
            s => panic!("Unexpected statement {:?}", s),
        };
        let expected: Locals = vec![(ids[0], 0), (ids[1], 1)].into_iter().collect();
        assert_eq_sorted!(locals, expected);
    }

    #[test]
    fn redeclaration_in_same_scope_is_allowed() {
        assert_eq!(
            distances(vec!["{ var a = 1; var a = 2; print a; }"]),
            vec![local("a", 0)],
        );
    }

    fn errors(program: Vec<&str>) -> Vec<ResolverError> {
        let ast = unsafe_parse(program);
        resolve_go(&ast).unwrap_err().into_iter().collect()
    }

    #[test]
    fn self_reference_in_local_initializer() {
        assert_eq!(
            errors(vec!["var a = 1;", "{", "  var a = a;", "}"]),
            vec![ResolverError::SelfReference("a".into(), ErrorInfo { line: 3 })],
        );
    }

    #[test]
    fn self_reference_message() {
        let ast = unsafe_parse(vec!["{ var a = a; }"]);
        let errors = resolve(&ast).unwrap_err();
        let error = errors.unwrap_single();
        assert_eq!(error.get_message(), "at 'a': Can't read local variable in its own initializer.");
        assert_eq!(error.get_kind(), ErrorKind::Resolution);
    }

    #[test]
    fn global_self_reference_is_not_a_static_error() {
        let (_, locals) = unsafe_resolve(vec!["var a = a;"]);
        assert!(locals.is_empty());
    }

    #[test]
    fn resolution_continues_after_an_error() {
        assert_eq!(
            errors(vec![
                "{ var a = a; }",
                "{ var b = 1 + b; }",
            ]),
            vec![
                ResolverError::SelfReference("a".into(), ErrorInfo { line: 1 }),
                ResolverError::SelfReference("b".into(), ErrorInfo { line: 2 }),
            ],
        );
    }
}
