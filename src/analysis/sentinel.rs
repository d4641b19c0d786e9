//! Sentinel detector: package-level error values.
//!
//! A sentinel is a module-level `const` or `static` identifier of
//! error type: callers compare against it at use sites, so its mere
//! existence is an observable contract of the package. A value whose
//! declared type is not error-like still qualifies when its
//! initializer plainly constructs an error (a wrapping factory such as
//! `anyhow!` counts). These effects attach to the synthetic
//! `<package>` target, not to any function.

use super::{is_error_type, DetectedEffect};
use crate::program::{render_type, Package, ValueHandle};
use crate::taxonomy::EffectKind;

pub fn detect(package: &Package) -> Vec<DetectedEffect> {
    package
        .package_values()
        .into_iter()
        .filter(is_sentinel)
        .map(|value| DetectedEffect {
            kind: EffectKind::SentinelError,
            location: value.location(),
            description: describe(&value),
            target: value.name(),
        })
        .collect()
}

fn is_sentinel(value: &ValueHandle<'_>) -> bool {
    is_error_type(value.ty) || value.init.is_some_and(is_error_constructor)
}

/// Whether an initializer expression plainly constructs an error
/// value: an error-constructing macro, `SomeError::new(..)`, a struct
/// literal of an error type, or an error enum variant.
fn is_error_constructor(expr: &syn::Expr) -> bool {
    match expr {
        syn::Expr::Macro(m) => m
            .mac
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident == "anyhow" || seg.ident == "format_err"),
        syn::Expr::Call(call) => match &*call.func {
            syn::Expr::Path(p) => {
                let segments: Vec<String> =
                    p.path.segments.iter().map(|s| s.ident.to_string()).collect();
                match segments.as_slice() {
                    [.., ty, method] if method == "new" || method == "msg" => {
                        ty.ends_with("Error")
                    }
                    _ => false,
                }
            }
            _ => false,
        },
        syn::Expr::Struct(s) => s
            .path
            .segments
            .last()
            .is_some_and(|seg| seg.ident.to_string().ends_with("Error")),
        syn::Expr::Path(p) if p.path.segments.len() >= 2 => {
            let ty = &p.path.segments[p.path.segments.len() - 2];
            ty.ident.to_string().ends_with("Error")
        }
        _ => false,
    }
}

fn describe(value: &ValueHandle<'_>) -> String {
    let wrapped = value
        .init
        .is_some_and(|init| matches!(init, syn::Expr::Macro(_) | syn::Expr::MethodCall(_)));
    if wrapped {
        format!(
            "package-level sentinel error '{}' constructed by a wrapping factory",
            value.name()
        )
    } else {
        format!(
            "package-level sentinel error '{}' of type {}",
            value.name(),
            render_type(value.ty)
        )
    }
}
