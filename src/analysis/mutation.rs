//! Mutation detector: stores through the receiver or through mutable
//! arguments.
//!
//! Records assignments (plain, compound, and index/field stores) whose
//! left-hand side roots to `self` on a `&mut self` method, or to a
//! parameter taken by mutable reference or raw mutable pointer. A
//! value receiver never yields `ReceiverMutation`, even when the body
//! mutates its own copy; reads and borrows are not mutations.

use proc_macro2::Span;
use std::collections::{BTreeSet, HashSet};
use syn::spanned::Spanned;
use syn::visit::Visit;

use super::DetectedEffect;
use crate::program::{format_location, FnHandle, ReceiverKind};
use crate::taxonomy::EffectKind;

pub fn detect(function: FnHandle<'_>) -> (Vec<DetectedEffect>, Vec<String>) {
    let receiver_mutable = function.receiver_kind() == Some(ReceiverKind::MutRef);
    let mutable_params = mutable_param_names(function.sig());

    if !receiver_mutable && mutable_params.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut visitor = StoreVisitor {
        receiver_mutable,
        mutable_params: &mutable_params,
        stores: Vec::new(),
    };
    visitor.visit_block(function.block());

    // Same target mutated twice collapses to one effect at the first
    // occurrence; visitation order is source order.
    let mut seen: HashSet<(EffectKind, String)> = HashSet::new();
    let mut effects = Vec::new();
    for store in visitor.stores {
        let (kind, target, description) = match store.kind {
            StoreKind::Receiver => {
                let target = store.field.unwrap_or_else(|| "self".to_string());
                let description = format!("mutates receiver field '{target}'");
                (EffectKind::ReceiverMutation, target, description)
            }
            StoreKind::Argument => {
                let target = store.root;
                let description =
                    format!("mutates argument '{target}' through a mutable reference");
                (EffectKind::PointerArgMutation, target, description)
            }
        };
        if !seen.insert((kind, target.clone())) {
            continue;
        }
        effects.push(DetectedEffect {
            kind,
            location: format_location(&function.file.path, store.span),
            description,
            target,
        });
    }

    (effects, Vec::new())
}

/// Parameters whose type lets the callee mutate the caller's data:
/// `&mut T` in any shape, or `*mut T`.
fn mutable_param_names(sig: &syn::Signature) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for input in &sig.inputs {
        let syn::FnArg::Typed(pat_type) = input else {
            continue;
        };
        if !is_mutable_ref_type(&pat_type.ty) {
            continue;
        }
        if let syn::Pat::Ident(ident) = &*pat_type.pat {
            names.insert(ident.ident.to_string());
        }
    }
    names
}

fn is_mutable_ref_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Reference(r) => r.mutability.is_some(),
        syn::Type::Ptr(p) => p.mutability.is_some(),
        syn::Type::Group(g) => is_mutable_ref_type(&g.elem),
        syn::Type::Paren(p) => is_mutable_ref_type(&p.elem),
        _ => false,
    }
}

enum StoreKind {
    Receiver,
    Argument,
}

struct Store {
    kind: StoreKind,
    root: String,
    /// Field selected directly on the root, when the store went
    /// through one (`self.a.b = x` keeps `a`).
    field: Option<String>,
    span: Span,
}

struct StoreVisitor<'a> {
    receiver_mutable: bool,
    mutable_params: &'a BTreeSet<String>,
    stores: Vec<Store>,
}

impl StoreVisitor<'_> {
    fn record(&mut self, lhs: &syn::Expr, span: Span) {
        let Some((root, field)) = root_and_field(lhs) else {
            return;
        };
        if root == "self" {
            if self.receiver_mutable {
                self.stores.push(Store {
                    kind: StoreKind::Receiver,
                    root,
                    field,
                    span,
                });
            }
        } else if self.mutable_params.contains(&root) {
            self.stores.push(Store {
                kind: StoreKind::Argument,
                root,
                field: None,
                span,
            });
        }
    }
}

impl<'ast> Visit<'ast> for StoreVisitor<'_> {
    fn visit_expr(&mut self, expr: &'ast syn::Expr) {
        match expr {
            syn::Expr::Assign(assign) => self.record(&assign.left, assign.span()),
            syn::Expr::Binary(binary) if is_assign_op(&binary.op) => {
                self.record(&binary.left, binary.span())
            }
            _ => {}
        }
        syn::visit::visit_expr(self, expr);
    }
}

fn is_assign_op(op: &syn::BinOp) -> bool {
    matches!(
        op,
        syn::BinOp::AddAssign(_)
            | syn::BinOp::SubAssign(_)
            | syn::BinOp::MulAssign(_)
            | syn::BinOp::DivAssign(_)
            | syn::BinOp::RemAssign(_)
            | syn::BinOp::BitXorAssign(_)
            | syn::BinOp::BitAndAssign(_)
            | syn::BinOp::BitOrAssign(_)
            | syn::BinOp::ShlAssign(_)
            | syn::BinOp::ShrAssign(_)
    )
}

/// Resolve the place an assignment stores into: the root identifier
/// and the field selected closest to the root (deepest root,
/// shallowest name: `r.a.b` roots at `r` and targets `a`). Index
/// stores and stores through a dereference keep their root.
fn root_and_field(expr: &syn::Expr) -> Option<(String, Option<String>)> {
    match expr {
        syn::Expr::Path(p) => p.path.get_ident().map(|i| (i.to_string(), None)),
        syn::Expr::Field(field) => {
            let (root, inner) = root_and_field(&field.base)?;
            let name = match &field.member {
                syn::Member::Named(ident) => ident.to_string(),
                syn::Member::Unnamed(index) => index.index.to_string(),
            };
            Some((root, inner.or(Some(name))))
        }
        syn::Expr::Index(index) => root_and_field(&index.expr),
        syn::Expr::Unary(unary) if matches!(unary.op, syn::UnOp::Deref(_)) => {
            root_and_field(&unary.expr)
        }
        syn::Expr::Paren(p) => root_and_field(&p.expr),
        syn::Expr::Group(g) => root_and_field(&g.expr),
        // Stores into a method-call result (or any other rvalue) do
        // not root to the receiver or an argument.
        _ => None,
    }
}
