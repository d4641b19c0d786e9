//! Side effect detection: the analyzer driver and the detector
//! family.
//!
//! Each detector is a pure function of the borrowed program and one
//! function; the driver fans out to them, sorts the combined effects
//! by (kind, location) for reproducible iteration, and assigns the
//! stable IDs.

pub mod mutation;
pub mod returns;
pub mod sentinel;

use crate::errors::{GazeError, Result};
use crate::program::{FnHandle, Package, Program};
use crate::taxonomy::{
    generate_id, AnalysisResult, EffectKind, FunctionTarget, Metadata, SideEffect,
    PACKAGE_FUNCTION,
};

/// Driver options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Include functions that are not part of the public API.
    pub include_unexported: bool,

    /// Restrict analysis to a single function by exact name. Also
    /// suppresses the package-wide sentinel pass.
    pub function_filter: Option<String>,
}

/// An effect as emitted by a detector, before IDs are assigned.
#[derive(Debug, Clone)]
pub struct DetectedEffect {
    pub kind: EffectKind,
    pub location: String,
    pub description: String,
    pub target: String,
}

/// Analyze every selected function of the package, then append the
/// synthetic package-level result carrying sentinel errors (unless a
/// function filter suppresses the sentinel pass).
pub fn analyze(
    program: &Program,
    package_name: &str,
    options: &Options,
) -> Result<Vec<AnalysisResult>> {
    let package = program
        .package(package_name)
        .ok_or_else(|| GazeError::load(package_name, "package not found in program"))?;

    let mut functions = package.functions();
    if !options.include_unexported {
        functions.retain(|f| f.is_public());
    }
    if let Some(filter) = &options.function_filter {
        functions.retain(|f| &f.name() == filter);
        if functions.is_empty() {
            return Err(GazeError::FilterMiss {
                function: filter.clone(),
                package: package_name.to_string(),
            });
        }
    }

    let mut results: Vec<AnalysisResult> = functions.into_iter().map(analyze_function).collect();

    if options.function_filter.is_none() {
        if let Some(result) = sentinel_result(package) {
            results.push(result);
        }
    }

    Ok(results)
}

/// Analyze a single function: run the per-function detectors, order
/// the effects, and assign stable IDs. No sentinel pass.
pub fn analyze_function(function: FnHandle<'_>) -> AnalysisResult {
    let mut metadata = Metadata::current();

    let (mut effects, warnings) = detect_effects(function);
    for warning in warnings {
        metadata.push_warning(warning);
    }

    effects.sort_by(|a, b| (a.kind, &a.location).cmp(&(b.kind, &b.location)));

    let package = &function.package.name;
    let name = function.name();
    let side_effects = effects
        .into_iter()
        .map(|e| finish_effect(package, &name, e))
        .collect();

    AnalysisResult {
        target: FunctionTarget {
            package: package.clone(),
            function: name,
            receiver: function.receiver_type(),
            signature: function.signature(),
            location: function.location(),
        },
        side_effects,
        metadata,
    }
}

fn detect_effects(function: FnHandle<'_>) -> (Vec<DetectedEffect>, Vec<String>) {
    let mut effects = Vec::new();
    let mut warnings = Vec::new();

    let (found, warns) = returns::detect(function);
    effects.extend(found);
    warnings.extend(warns);

    let (found, warns) = mutation::detect(function);
    effects.extend(found);
    warnings.extend(warns);

    (effects, warnings)
}

/// The synthetic `<package>` result holding sentinel errors, or None
/// when the package declares none.
fn sentinel_result(package: &Package) -> Option<AnalysisResult> {
    let mut effects = sentinel::detect(package);
    if effects.is_empty() {
        return None;
    }

    effects.sort_by(|a, b| (a.kind, &a.location).cmp(&(b.kind, &b.location)));
    let side_effects = effects
        .into_iter()
        .map(|e| finish_effect(&package.name, PACKAGE_FUNCTION, e))
        .collect();

    Some(AnalysisResult {
        target: FunctionTarget {
            package: package.name.clone(),
            function: PACKAGE_FUNCTION.to_string(),
            receiver: None,
            signature: String::new(),
            location: package.root.display().to_string(),
        },
        side_effects,
        metadata: Metadata::current(),
    })
}

fn finish_effect(package: &str, function: &str, effect: DetectedEffect) -> SideEffect {
    SideEffect {
        id: generate_id(package, function, effect.kind, &effect.location),
        kind: effect.kind,
        tier: effect.kind.tier(),
        location: effect.location,
        description: effect.description,
        target: effect.target,
        classification: None,
    }
}

/// Structural error-likeness, shared by the returns and sentinel
/// detectors: the type names an error (`Error`, `ParseError`,
/// `Box<dyn Error>`, ...), seen through references and one level of
/// lazy/smart-pointer wrapping.
pub(crate) fn is_error_type(ty: &syn::Type) -> bool {
    match ty {
        syn::Type::Reference(r) => is_error_type(&r.elem),
        syn::Type::Group(g) => is_error_type(&g.elem),
        syn::Type::Paren(p) => is_error_type(&p.elem),
        syn::Type::TraitObject(obj) => obj.bounds.iter().any(|bound| match bound {
            syn::TypeParamBound::Trait(t) => t
                .path
                .segments
                .last()
                .is_some_and(|seg| is_error_ident(&seg.ident)),
            _ => false,
        }),
        syn::Type::Path(p) => {
            let Some(seg) = p.path.segments.last() else {
                return false;
            };
            if is_error_ident(&seg.ident) {
                return true;
            }
            let name = seg.ident.to_string();
            if matches!(
                name.as_str(),
                "Lazy" | "LazyLock" | "OnceLock" | "Box" | "Arc" | "Rc"
            ) {
                if let syn::PathArguments::AngleBracketed(args) = &seg.arguments {
                    return args.args.iter().any(|arg| match arg {
                        syn::GenericArgument::Type(inner) => is_error_type(inner),
                        _ => false,
                    });
                }
            }
            false
        }
        _ => false,
    }
}

fn is_error_ident(ident: &syn::Ident) -> bool {
    let name = ident.to_string();
    name == "Error" || name.ends_with("Error")
}
