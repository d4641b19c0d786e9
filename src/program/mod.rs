//! Read-only view over a parsed program.
//!
//! The program model is the boundary between the loader and the
//! analysis core: packages of parsed `syn` ASTs plus the indexes the
//! classifiers need (trait method sets, per-type method sets, and the
//! cross-package uses index for caller counting). Nothing in here is
//! mutated after construction; handles are cheap `Copy` views that
//! borrow from the program for the duration of an analysis.

pub mod loader;

use proc_macro2::Span;
use quote::ToTokens;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use syn::visit::Visit;

use crate::errors::{GazeError, Result};

/// One parsed source file.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub ast: syn::File,
}

/// A package: a directory of Rust source files analyzed as one unit.
#[derive(Debug)]
pub struct Package {
    /// Package path (directory path relative to the program root).
    pub name: String,
    /// Directory the package was loaded from.
    pub root: PathBuf,
    pub files: Vec<SourceFile>,
}

impl Package {
    /// Parse a package from a single in-memory source, for callers that
    /// construct programs without touching the filesystem.
    pub fn from_source(name: &str, source: &str) -> Result<Self> {
        let path = PathBuf::from(format!("{name}/lib.rs"));
        let ast = syn::parse_file(source).map_err(|e| {
            let pos = e.span().start();
            GazeError::package(
                name,
                format!("{}:{}:{}: {}", path.display(), pos.line, pos.column + 1, e),
            )
        })?;
        Ok(Self {
            name: name.to_string(),
            root: PathBuf::from(name),
            files: vec![SourceFile { path, ast }],
        })
    }

    /// All functions and methods in declaration order (files in path
    /// order, items in source order).
    pub fn functions(&self) -> Vec<FnHandle<'_>> {
        let mut out = Vec::new();
        for file in &self.files {
            for item in flatten_items(&file.ast.items) {
                match item {
                    syn::Item::Fn(f) => out.push(FnHandle {
                        package: self,
                        file,
                        node: FnNode::Free(f),
                    }),
                    syn::Item::Impl(imp) => {
                        for impl_item in &imp.items {
                            if let syn::ImplItem::Fn(method) = impl_item {
                                out.push(FnHandle {
                                    package: self,
                                    file,
                                    node: FnNode::Method { owner: imp, method },
                                });
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }

    /// Look up a function or method by bare name.
    pub fn find_function(&self, name: &str) -> Option<FnHandle<'_>> {
        self.functions().into_iter().find(|f| f.name() == name)
    }

    /// Look up a method by the bare name of its receiver type and its
    /// method name.
    pub fn find_method(&self, type_name: &str, method: &str) -> Option<FnHandle<'_>> {
        self.functions()
            .into_iter()
            .find(|f| f.name() == method && f.receiver_base().as_deref() == Some(type_name))
    }

    /// Package-level `const` and `static` declarations, in declaration
    /// order, as (name, type, initializer, span) views.
    pub fn package_values(&self) -> Vec<ValueHandle<'_>> {
        let mut out = Vec::new();
        for file in &self.files {
            for item in flatten_items(&file.ast.items) {
                match item {
                    syn::Item::Const(c) => out.push(ValueHandle {
                        file,
                        ident: &c.ident,
                        ty: &c.ty,
                        init: Some(&c.expr),
                    }),
                    syn::Item::Static(s) => out.push(ValueHandle {
                        file,
                        ident: &s.ident,
                        ty: &s.ty,
                        init: Some(&s.expr),
                    }),
                    _ => {}
                }
            }
        }
        out
    }
}

/// Collect items depth-first, descending into inline modules.
fn flatten_items<'a>(items: &'a [syn::Item]) -> Vec<&'a syn::Item> {
    let mut out = Vec::new();
    fn walk<'a>(items: &'a [syn::Item], out: &mut Vec<&'a syn::Item>) {
        for item in items {
            out.push(item);
            if let syn::Item::Mod(m) = item {
                if let Some((_, nested)) = &m.content {
                    walk(nested, out);
                }
            }
        }
    }
    walk(items, &mut out);
    out
}

/// A package-level value declaration (const or static).
#[derive(Clone, Copy)]
pub struct ValueHandle<'p> {
    pub file: &'p SourceFile,
    pub ident: &'p syn::Ident,
    pub ty: &'p syn::Type,
    pub init: Option<&'p syn::Expr>,
}

impl<'p> ValueHandle<'p> {
    pub fn name(&self) -> String {
        self.ident.to_string()
    }

    pub fn location(&self) -> String {
        format_location(&self.file.path, self.ident.span())
    }
}

/// How a method takes its receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverKind {
    /// `self` or `mut self`: the method operates on its own copy.
    Value,
    /// `&self`.
    Ref,
    /// `&mut self`.
    MutRef,
}

#[derive(Clone, Copy)]
enum FnNode<'p> {
    Free(&'p syn::ItemFn),
    Method {
        owner: &'p syn::ItemImpl,
        method: &'p syn::ImplItemFn,
    },
}

/// Cheap, copyable view of one function for the duration of an
/// analysis.
#[derive(Clone, Copy)]
pub struct FnHandle<'p> {
    pub package: &'p Package,
    pub file: &'p SourceFile,
    node: FnNode<'p>,
}

impl<'p> FnHandle<'p> {
    pub fn name(&self) -> String {
        self.sig().ident.to_string()
    }

    pub fn sig(&self) -> &'p syn::Signature {
        match self.node {
            FnNode::Free(f) => &f.sig,
            FnNode::Method { method, .. } => &method.sig,
        }
    }

    pub fn block(&self) -> &'p syn::Block {
        match self.node {
            FnNode::Free(f) => &f.block,
            FnNode::Method { method, .. } => &method.block,
        }
    }

    fn attrs(&self) -> &'p [syn::Attribute] {
        match self.node {
            FnNode::Free(f) => &f.attrs,
            FnNode::Method { method, .. } => &method.attrs,
        }
    }

    /// Whether the function is part of the package's public API.
    /// Methods provided through a trait impl are reachable via the
    /// trait and count as public.
    pub fn is_public(&self) -> bool {
        match self.node {
            FnNode::Free(f) => matches!(f.vis, syn::Visibility::Public(_)),
            FnNode::Method { owner, method } => {
                owner.trait_.is_some() || matches!(method.vis, syn::Visibility::Public(_))
            }
        }
    }

    /// Whether the function lives in test code (a `*_test.rs` file or
    /// anything under a `tests` directory).
    pub fn in_test_file(&self) -> bool {
        let path = &self.file.path;
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with("_test.rs"))
            || path.components().any(|c| c.as_os_str() == "tests")
    }

    pub fn receiver(&self) -> Option<&'p syn::Receiver> {
        match self.sig().inputs.first() {
            Some(syn::FnArg::Receiver(r)) => Some(r),
            _ => None,
        }
    }

    pub fn receiver_kind(&self) -> Option<ReceiverKind> {
        self.receiver().map(|r| match (&r.reference, &r.mutability) {
            (None, _) => ReceiverKind::Value,
            (Some(_), None) => ReceiverKind::Ref,
            (Some(_), Some(_)) => ReceiverKind::MutRef,
        })
    }

    /// The receiver type as written at the use site, e.g. `&mut Store`.
    pub fn receiver_type(&self) -> Option<String> {
        let kind = self.receiver_kind()?;
        let base = self.self_type_string()?;
        Some(match kind {
            ReceiverKind::Value => base,
            ReceiverKind::Ref => format!("&{base}"),
            ReceiverKind::MutRef => format!("&mut {base}"),
        })
    }

    /// Bare name of the impl's self type (no generics, no reference).
    pub fn receiver_base(&self) -> Option<String> {
        self.receiver()?;
        match self.node {
            FnNode::Free(_) => None,
            FnNode::Method { owner, .. } => type_base_name(&owner.self_ty),
        }
    }

    fn self_type_string(&self) -> Option<String> {
        match self.node {
            FnNode::Free(_) => None,
            FnNode::Method { owner, .. } => Some(render_type(&owner.self_ty)),
        }
    }

    /// Name of the trait this method implements, if the surrounding
    /// impl is a trait impl.
    pub fn trait_name(&self) -> Option<String> {
        match self.node {
            FnNode::Free(_) => None,
            FnNode::Method { owner, .. } => owner
                .trait_
                .as_ref()
                .and_then(|(_, path, _)| path.segments.last())
                .map(|seg| seg.ident.to_string()),
        }
    }

    /// Full signature rendered from the syntax tree.
    pub fn signature(&self) -> String {
        normalize_tokens(&self.sig().to_token_stream().to_string())
    }

    pub fn location(&self) -> String {
        format_location(&self.file.path, self.sig().ident.span())
    }

    pub fn line(&self) -> usize {
        self.sig().ident.span().start().line
    }

    /// The function's doc comment, one line per `///` line, empty when
    /// undocumented.
    pub fn doc_comment(&self) -> String {
        let mut lines = Vec::new();
        for attr in self.attrs() {
            if !attr.path().is_ident("doc") {
                continue;
            }
            if let syn::Meta::NameValue(nv) = &attr.meta {
                if let syn::Expr::Lit(syn::ExprLit {
                    lit: syn::Lit::Str(s),
                    ..
                }) = &nv.value
                {
                    lines.push(s.value().trim().to_string());
                }
            }
        }
        lines.join("\n")
    }
}

/// A trait declaration with its method set, memoized at program
/// construction for satisfaction checks.
#[derive(Debug, Clone)]
pub struct TraitInfo {
    pub package: String,
    pub file: PathBuf,
    pub name: String,
    pub methods: Vec<String>,
}

/// The type-checked program under analysis. Owned by the loader and
/// borrowed, read-only, by every detector and signal analyzer.
#[derive(Debug)]
pub struct Program {
    packages: Vec<Package>,
    traits: Vec<TraitInfo>,
    /// Bare type name -> names of its methods (inherent + trait impls).
    type_methods: HashMap<String, BTreeSet<String>>,
    /// (trait name, type name) pairs with an explicit `impl T for S`.
    trait_impls: HashSet<(String, String)>,
    /// (defining package, identifier) -> packages referencing it.
    uses: HashMap<(String, String), BTreeSet<String>>,
}

impl Program {
    pub fn new(mut packages: Vec<Package>) -> Self {
        packages.sort_by(|a, b| a.name.cmp(&b.name));
        for pkg in &mut packages {
            pkg.files.sort_by(|a, b| a.path.cmp(&b.path));
        }

        let mut traits = Vec::new();
        let mut type_methods: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut trait_impls = HashSet::new();
        for pkg in &packages {
            for file in &pkg.files {
                for item in flatten_items(&file.ast.items) {
                    match item {
                        syn::Item::Trait(tr) => {
                            let methods = tr
                                .items
                                .iter()
                                .filter_map(|it| match it {
                                    syn::TraitItem::Fn(f) => Some(f.sig.ident.to_string()),
                                    _ => None,
                                })
                                .collect();
                            traits.push(TraitInfo {
                                package: pkg.name.clone(),
                                file: file.path.clone(),
                                name: tr.ident.to_string(),
                                methods,
                            });
                        }
                        syn::Item::Impl(imp) => {
                            let Some(type_name) = type_base_name(&imp.self_ty) else {
                                continue;
                            };
                            let entry = type_methods.entry(type_name.clone()).or_default();
                            for impl_item in &imp.items {
                                if let syn::ImplItem::Fn(m) = impl_item {
                                    entry.insert(m.sig.ident.to_string());
                                }
                            }
                            if let Some((_, path, _)) = &imp.trait_ {
                                if let Some(seg) = path.segments.last() {
                                    trait_impls.insert((seg.ident.to_string(), type_name));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        let uses = build_uses_index(&packages);

        Self {
            packages,
            traits,
            type_methods,
            trait_impls,
            uses,
        }
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }

    pub fn traits(&self) -> &[TraitInfo] {
        &self.traits
    }

    /// Whether `type_name` has an explicit impl of the trait.
    pub fn has_trait_impl(&self, trait_name: &str, type_name: &str) -> bool {
        self.trait_impls
            .contains(&(trait_name.to_string(), type_name.to_string()))
    }

    /// Structural satisfaction: every method the trait declares exists
    /// on the type.
    pub fn satisfies_trait(&self, type_name: &str, tr: &TraitInfo) -> bool {
        if tr.methods.is_empty() {
            return false;
        }
        let Some(methods) = self.type_methods.get(type_name) else {
            return false;
        };
        tr.methods.iter().all(|m| methods.contains(m))
    }

    /// Number of distinct packages, other than the defining one, that
    /// reference the given identifier of the given package. Keyed by
    /// (package, identifier) so same-named functions in different
    /// packages never collide.
    pub fn caller_packages(&self, package: &str, name: &str) -> usize {
        self.uses
            .get(&(package.to_string(), name.to_string()))
            .map(|pkgs| pkgs.iter().filter(|p| p.as_str() != package).count())
            .unwrap_or(0)
    }
}

/// Collects `first_segment -> last_segment` path references from one
/// file: `use` trees plus qualified paths in expression position.
struct PathCollector {
    refs: Vec<(String, String)>,
}

impl PathCollector {
    fn record_path(&mut self, segments: Vec<String>) {
        let mut segs = segments;
        while matches!(
            segs.first().map(String::as_str),
            Some("crate") | Some("super") | Some("self")
        ) {
            segs.remove(0);
        }
        if segs.len() >= 2 {
            let first = segs[0].clone();
            let last = segs[segs.len() - 1].clone();
            self.refs.push((first, last));
        }
    }

    fn record_use_tree(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(p) => {
                prefix.push(p.ident.to_string());
                self.record_use_tree(&p.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(n) => {
                let mut segs = prefix.clone();
                segs.push(n.ident.to_string());
                self.record_path(segs);
            }
            syn::UseTree::Rename(r) => {
                let mut segs = prefix.clone();
                segs.push(r.ident.to_string());
                self.record_path(segs);
            }
            syn::UseTree::Group(g) => {
                for item in &g.items {
                    self.record_use_tree(item, prefix);
                }
            }
            syn::UseTree::Glob(_) => {}
        }
    }
}

impl<'ast> Visit<'ast> for PathCollector {
    fn visit_path(&mut self, path: &'ast syn::Path) {
        if path.segments.len() >= 2 {
            self.record_path(path.segments.iter().map(|s| s.ident.to_string()).collect());
        }
        syn::visit::visit_path(self, path);
    }

    fn visit_item_use(&mut self, item: &'ast syn::ItemUse) {
        let mut prefix = Vec::new();
        self.record_use_tree(&item.tree, &mut prefix);
    }
}

fn build_uses_index(packages: &[Package]) -> HashMap<(String, String), BTreeSet<String>> {
    // Packages are addressed by the final component of their path,
    // normalized the way module names are.
    let mut by_component: HashMap<String, Vec<&str>> = HashMap::new();
    for pkg in packages {
        let component = pkg
            .name
            .rsplit('/')
            .next()
            .unwrap_or(&pkg.name)
            .replace('-', "_");
        by_component.entry(component).or_default().push(&pkg.name);
    }

    let mut uses: HashMap<(String, String), BTreeSet<String>> = HashMap::new();
    for pkg in packages {
        let mut collector = PathCollector { refs: Vec::new() };
        for file in &pkg.files {
            collector.visit_file(&file.ast);
        }
        for (first, last) in collector.refs {
            if let Some(defining) = by_component.get(&first) {
                for def_pkg in defining {
                    uses.entry((def_pkg.to_string(), last.clone()))
                        .or_default()
                        .insert(pkg.name.clone());
                }
            }
        }
    }
    uses
}

/// Bare name of a type: the final path segment without generics, seen
/// through references.
pub fn type_base_name(ty: &syn::Type) -> Option<String> {
    match ty {
        syn::Type::Path(p) => p.path.segments.last().map(|s| s.ident.to_string()),
        syn::Type::Reference(r) => type_base_name(&r.elem),
        syn::Type::Group(g) => type_base_name(&g.elem),
        syn::Type::Paren(p) => type_base_name(&p.elem),
        _ => None,
    }
}

/// Render a type the way it was written, with token-stream spacing
/// collapsed back to source form.
pub fn render_type(ty: &syn::Type) -> String {
    normalize_tokens(&ty.to_token_stream().to_string())
}

/// Collapse the spacing `TokenStream::to_string` inserts around
/// punctuation so rendered types read like source text.
pub fn normalize_tokens(tokens: &str) -> String {
    tokens
        .replace(" :: ", "::")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
        .replace("( ", "(")
        .replace(" )", ")")
        .replace("[ ", "[")
        .replace(" ]", "]")
        .replace("& ", "&")
        .replace(" ;", ";")
}

/// Format a span as `file:line:col` (1-based column, matching
/// compiler diagnostics).
pub fn format_location(path: &Path, span: Span) -> String {
    let start = span.start();
    format!("{}:{}:{}", path.display(), start.line, start.column + 1)
}
