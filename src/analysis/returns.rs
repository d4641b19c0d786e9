//! Returns detector: effects carried by a function's signature.
//!
//! Reads the declared return type. Each non-unit value type yields a
//! `ReturnValue` effect (one per tuple element), and the error arm of
//! a `Result` yields an `ErrorReturn`. When an error result exists,
//! the body is additionally scanned for deferred blocks that assign to
//! a returned binding, which yields `DeferredReturnMutation`.

use proc_macro2::Span;
use std::collections::HashSet;
use std::path::Path;
use syn::spanned::Spanned;
use syn::visit::Visit;

use super::{is_error_type, DetectedEffect};
use crate::program::{format_location, render_type, FnHandle};
use crate::taxonomy::EffectKind;

pub fn detect(function: FnHandle<'_>) -> (Vec<DetectedEffect>, Vec<String>) {
    let mut effects = Vec::new();
    let mut warnings = Vec::new();

    let syn::ReturnType::Type(_, ty) = &function.sig().output else {
        // No result list: nothing to report, and no deferred scan.
        return (effects, warnings);
    };

    let file = &function.file.path;
    let mut has_error_result = false;

    match unwrap_result(ty) {
        Some((ok, err)) => {
            has_error_result = true;
            if let Some(ok) = ok {
                push_return_values(ok, file, &mut effects);
            }
            effects.push(error_effect(err, file, ty.span()));
        }
        None => {
            if is_unit(ty) {
                // `-> ()` carries nothing observable.
            } else if is_error_type(ty) {
                has_error_result = true;
                effects.push(error_effect(Some(ty), file, ty.span()));
            } else {
                push_return_values(ty, file, &mut effects);
            }
        }
    }

    if has_error_result {
        scan_deferred(function, &mut effects, &mut warnings);
    }

    (effects, warnings)
}

/// Split `Result<T, E>` into its arms. `Result<T>` aliases (like
/// `io::Result`) report an implied error arm.
fn unwrap_result(ty: &syn::Type) -> Option<(Option<&syn::Type>, Option<&syn::Type>)> {
    let syn::Type::Path(p) = ty else { return None };
    let seg = p.path.segments.last()?;
    if seg.ident != "Result" {
        return None;
    }
    let syn::PathArguments::AngleBracketed(args) = &seg.arguments else {
        return Some((None, None));
    };
    let mut types = args.args.iter().filter_map(|arg| match arg {
        syn::GenericArgument::Type(t) => Some(t),
        _ => None,
    });
    let ok = types.next();
    let err = types.next();
    Some((ok, err))
}

fn is_unit(ty: &syn::Type) -> bool {
    matches!(ty, syn::Type::Tuple(t) if t.elems.is_empty())
}

fn push_return_values(ty: &syn::Type, file: &Path, effects: &mut Vec<DetectedEffect>) {
    match ty {
        syn::Type::Tuple(tuple) => {
            for elem in &tuple.elems {
                push_single_value(elem, file, effects);
            }
        }
        _ => push_single_value(ty, file, effects),
    }
}

fn push_single_value(ty: &syn::Type, file: &Path, effects: &mut Vec<DetectedEffect>) {
    if is_unit(ty) {
        return;
    }
    let rendered = render_type(ty);
    effects.push(DetectedEffect {
        kind: EffectKind::ReturnValue,
        location: format_location(file, ty.span()),
        description: format!("returns {rendered}"),
        target: rendered,
    });
}

fn error_effect(err: Option<&syn::Type>, file: &Path, fallback: Span) -> DetectedEffect {
    let (location, description) = match err {
        Some(err) => (
            format_location(file, err.span()),
            format!("returns {} on failure", render_type(err)),
        ),
        None => (
            format_location(file, fallback),
            "returns an implied error on failure".to_string(),
        ),
    };
    DetectedEffect {
        kind: EffectKind::ErrorReturn,
        location,
        description,
        target: "error".to_string(),
    }
}

/// Find deferred blocks that assign to a binding the function
/// returns. Direct assignments become `DeferredReturnMutation`;
/// assignments buried in a closure nested inside the deferred block
/// are ambiguous and surface as warnings only.
fn scan_deferred(function: FnHandle<'_>, effects: &mut Vec<DetectedEffect>, warnings: &mut Vec<String>) {
    let returned = returned_bindings(function.block());
    if returned.is_empty() {
        return;
    }

    let mut finder = DeferFinder {
        returned: &returned,
        hits: Vec::new(),
        ambiguous: Vec::new(),
        unparseable: Vec::new(),
    };
    finder.visit_block(function.block());

    let mut seen = HashSet::new();
    for (name, span) in finder.hits {
        if !seen.insert(name.clone()) {
            continue;
        }
        effects.push(DetectedEffect {
            kind: EffectKind::DeferredReturnMutation,
            location: format_location(&function.file.path, span),
            description: format!("deferred block mutates named result '{name}'"),
            target: name,
        });
    }
    for (name, span) in finder.ambiguous {
        warnings.push(format!(
            "assignment to result binding '{}' inside a nested closure in a deferred block at {} is ambiguous",
            name,
            format_location(&function.file.path, span),
        ));
    }
    for span in finder.unparseable {
        warnings.push(format!(
            "unparseable deferred block at {}",
            format_location(&function.file.path, span),
        ));
    }
}

/// Bindings that flow into the function's return value: bare idents in
/// `return` statements or tail position, possibly wrapped in a
/// single-argument constructor like `Ok(out)`.
fn returned_bindings(block: &syn::Block) -> HashSet<String> {
    struct Collector {
        names: HashSet<String>,
    }

    impl<'ast> Visit<'ast> for Collector {
        fn visit_expr_return(&mut self, node: &'ast syn::ExprReturn) {
            if let Some(expr) = &node.expr {
                if let Some(name) = binding_of(expr) {
                    self.names.insert(name);
                }
            }
            syn::visit::visit_expr_return(self, node);
        }
    }

    let mut collector = Collector {
        names: HashSet::new(),
    };
    collector.visit_block(block);

    if let Some(syn::Stmt::Expr(expr, None)) = block.stmts.last() {
        if let Some(name) = binding_of(expr) {
            collector.names.insert(name);
        }
    }

    collector.names
}

fn binding_of(expr: &syn::Expr) -> Option<String> {
    match expr {
        syn::Expr::Path(p) => p.path.get_ident().map(|i| i.to_string()),
        syn::Expr::Call(call) if call.args.len() == 1 => {
            if matches!(&*call.func, syn::Expr::Path(_)) {
                binding_of(&call.args[0])
            } else {
                None
            }
        }
        _ => None,
    }
}

struct DeferFinder<'a> {
    returned: &'a HashSet<String>,
    hits: Vec<(String, Span)>,
    ambiguous: Vec<(String, Span)>,
    unparseable: Vec<Span>,
}

impl DeferFinder<'_> {
    fn scan_macro(&mut self, mac: &syn::Macro) {
        let tokens = mac.tokens.clone();
        let wrapped = quote::quote! { { #tokens } };
        match syn::parse2::<syn::Block>(wrapped) {
            Ok(block) => self.scan_deferred_block(&block),
            Err(_) => self.unparseable.push(mac.path.span()),
        }
    }

    fn scan_deferred_block(&mut self, block: &syn::Block) {
        let mut scan = DeferBody {
            returned: self.returned,
            closure_depth: 0,
            hits: Vec::new(),
            ambiguous: Vec::new(),
        };
        scan.visit_block(block);
        self.hits.extend(scan.hits);
        self.ambiguous.extend(scan.ambiguous);
    }

    fn scan_deferred_closure(&mut self, closure: &syn::ExprClosure) {
        let mut scan = DeferBody {
            returned: self.returned,
            closure_depth: 0,
            hits: Vec::new(),
            ambiguous: Vec::new(),
        };
        scan.visit_expr(&closure.body);
        self.hits.extend(scan.hits);
        self.ambiguous.extend(scan.ambiguous);
    }
}

impl<'ast> Visit<'ast> for DeferFinder<'_> {
    fn visit_macro(&mut self, mac: &'ast syn::Macro) {
        if mac
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "defer")
        {
            self.scan_macro(mac);
        }
        syn::visit::visit_macro(self, mac);
    }

    fn visit_expr_call(&mut self, call: &'ast syn::ExprCall) {
        let is_defer_call = match &*call.func {
            syn::Expr::Path(p) => p
                .path
                .segments
                .last()
                .is_some_and(|seg| seg.ident == "defer" || seg.ident == "guard"),
            _ => false,
        };
        if is_defer_call {
            for arg in &call.args {
                if let syn::Expr::Closure(closure) = arg {
                    self.scan_deferred_closure(closure);
                }
            }
        }
        syn::visit::visit_expr_call(self, call);
    }
}

/// Walks the inside of one deferred block. Assignments at the top
/// level are definite; assignments inside a nested closure are only
/// potentially deferred.
struct DeferBody<'a> {
    returned: &'a HashSet<String>,
    closure_depth: usize,
    hits: Vec<(String, Span)>,
    ambiguous: Vec<(String, Span)>,
}

impl<'ast> Visit<'ast> for DeferBody<'_> {
    fn visit_expr_closure(&mut self, closure: &'ast syn::ExprClosure) {
        self.closure_depth += 1;
        syn::visit::visit_expr_closure(self, closure);
        self.closure_depth -= 1;
    }

    fn visit_expr_assign(&mut self, assign: &'ast syn::ExprAssign) {
        if let syn::Expr::Path(p) = &*assign.left {
            if let Some(ident) = p.path.get_ident() {
                let name = ident.to_string();
                if self.returned.contains(&name) {
                    if self.closure_depth == 0 {
                        self.hits.push((name, assign.span()));
                    } else {
                        self.ambiguous.push((name, assign.span()));
                    }
                }
            }
        }
        syn::visit::visit_expr_assign(self, assign);
    }
}
