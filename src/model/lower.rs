//! Lowering from `syn` expression trees to the model IR.
//!
//! The pipeline only dispatches on calls, method calls, struct literals,
//! paths, macros, and int/string literals. Every other expression form is
//! flattened to [`Expr::Other`] carrying its lowered children, which keeps
//! descendant walks complete: an invocation buried under `await`, `?`, a
//! `match` arm, or a nested block is still reachable.

use super::types::Expr;

/// Lower a whole function body.
pub fn lower_block(block: &syn::Block) -> Vec<Expr> {
    let mut out = Vec::with_capacity(block.stmts.len());
    for stmt in &block.stmts {
        match stmt {
            syn::Stmt::Local(local) => {
                if let Some(init) = &local.init {
                    let first = lower_expr(&init.expr);
                    if let Some((_, diverge)) = &init.diverge {
                        out.push(Expr::Other(vec![first, lower_expr(diverge)]));
                    } else {
                        out.push(first);
                    }
                }
            }
            syn::Stmt::Expr(expr, _) => out.push(lower_expr(expr)),
            syn::Stmt::Macro(stmt_macro) => out.push(lower_macro(&stmt_macro.mac)),
            // Nested items are separate declarations, not part of this body.
            syn::Stmt::Item(_) => {}
        }
    }
    out
}

/// Lower a single expression.
pub fn lower_expr(expr: &syn::Expr) -> Expr {
    match expr {
        syn::Expr::MethodCall(mc) => Expr::MethodCall {
            receiver: Box::new(lower_expr(&mc.receiver)),
            method: mc.method.to_string(),
            args: mc.args.iter().map(lower_expr).collect(),
        },
        syn::Expr::Call(call) => {
            let args: Vec<Expr> = call.args.iter().map(lower_expr).collect();
            if let syn::Expr::Path(p) = call.func.as_ref() {
                Expr::Call {
                    path: path_segments(&p.path),
                    args,
                }
            } else {
                let mut children = vec![lower_expr(&call.func)];
                children.extend(args);
                Expr::Other(children)
            }
        }
        syn::Expr::Struct(st) => {
            let mut fields: Vec<(String, Expr)> = st
                .fields
                .iter()
                .map(|f| (member_name(&f.member), lower_expr(&f.expr)))
                .collect();
            if let Some(rest) = &st.rest {
                fields.push(("..".to_string(), lower_expr(rest)));
            }
            Expr::StructLit {
                path: path_segments(&st.path),
                fields,
            }
        }
        syn::Expr::Macro(m) => lower_macro(&m.mac),
        syn::Expr::Path(p) => Expr::Path(path_segments(&p.path)),
        syn::Expr::Lit(lit) => match &lit.lit {
            syn::Lit::Int(i) => i
                .base10_parse::<u64>()
                .map(Expr::Int)
                .unwrap_or(Expr::Other(Vec::new())),
            syn::Lit::Str(s) => Expr::Str(s.value()),
            _ => Expr::Other(Vec::new()),
        },
        syn::Expr::Await(e) => Expr::Other(vec![lower_expr(&e.base)]),
        syn::Expr::Try(e) => Expr::Other(vec![lower_expr(&e.expr)]),
        syn::Expr::Paren(e) => lower_expr(&e.expr),
        syn::Expr::Group(e) => lower_expr(&e.expr),
        syn::Expr::Reference(e) => Expr::Other(vec![lower_expr(&e.expr)]),
        syn::Expr::Unary(e) => Expr::Other(vec![lower_expr(&e.expr)]),
        syn::Expr::Cast(e) => Expr::Other(vec![lower_expr(&e.expr)]),
        syn::Expr::Field(e) => Expr::Other(vec![lower_expr(&e.base)]),
        syn::Expr::Index(e) => Expr::Other(vec![lower_expr(&e.expr), lower_expr(&e.index)]),
        syn::Expr::Binary(e) => Expr::Other(vec![lower_expr(&e.left), lower_expr(&e.right)]),
        syn::Expr::Assign(e) => Expr::Other(vec![lower_expr(&e.left), lower_expr(&e.right)]),
        syn::Expr::Let(e) => Expr::Other(vec![lower_expr(&e.expr)]),
        syn::Expr::Return(e) => Expr::Other(e.expr.iter().map(|e| lower_expr(e)).collect()),
        syn::Expr::Break(e) => Expr::Other(e.expr.iter().map(|e| lower_expr(e)).collect()),
        syn::Expr::Closure(e) => Expr::Other(vec![lower_expr(&e.body)]),
        syn::Expr::Block(e) => Expr::Other(lower_block(&e.block)),
        syn::Expr::Async(e) => Expr::Other(lower_block(&e.block)),
        syn::Expr::Unsafe(e) => Expr::Other(lower_block(&e.block)),
        syn::Expr::TryBlock(e) => Expr::Other(lower_block(&e.block)),
        syn::Expr::Const(e) => Expr::Other(lower_block(&e.block)),
        syn::Expr::Loop(e) => Expr::Other(lower_block(&e.body)),
        syn::Expr::While(e) => {
            let mut children = vec![lower_expr(&e.cond)];
            children.extend(lower_block(&e.body));
            Expr::Other(children)
        }
        syn::Expr::ForLoop(e) => {
            let mut children = vec![lower_expr(&e.expr)];
            children.extend(lower_block(&e.body));
            Expr::Other(children)
        }
        syn::Expr::If(e) => {
            let mut children = vec![lower_expr(&e.cond)];
            children.push(Expr::Other(lower_block(&e.then_branch)));
            if let Some((_, else_branch)) = &e.else_branch {
                children.push(lower_expr(else_branch));
            }
            Expr::Other(children)
        }
        syn::Expr::Match(e) => {
            let mut children = vec![lower_expr(&e.expr)];
            for arm in &e.arms {
                if let Some((_, guard)) = &arm.guard {
                    children.push(lower_expr(guard));
                }
                children.push(lower_expr(&arm.body));
            }
            Expr::Other(children)
        }
        syn::Expr::Tuple(e) => Expr::Other(e.elems.iter().map(lower_expr).collect()),
        syn::Expr::Array(e) => Expr::Other(e.elems.iter().map(lower_expr).collect()),
        syn::Expr::Range(e) => {
            let mut children = Vec::new();
            if let Some(start) = &e.start {
                children.push(lower_expr(start));
            }
            if let Some(end) = &e.end {
                children.push(lower_expr(end));
            }
            Expr::Other(children)
        }
        syn::Expr::Repeat(e) => Expr::Other(vec![lower_expr(&e.expr), lower_expr(&e.len)]),
        _ => Expr::Other(Vec::new()),
    }
}

fn lower_macro(mac: &syn::Macro) -> Expr {
    let name = mac
        .path
        .segments
        .last()
        .map(|s| s.ident.to_string())
        .unwrap_or_default();
    Expr::MacroCall { name }
}

fn path_segments(path: &syn::Path) -> Vec<String> {
    path.segments.iter().map(|s| s.ident.to_string()).collect()
}

fn member_name(member: &syn::Member) -> String {
    match member {
        syn::Member::Named(ident) => ident.to_string(),
        syn::Member::Unnamed(index) => index.index.to_string(),
    }
}
