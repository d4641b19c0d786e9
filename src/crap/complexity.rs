//! Cyclomatic complexity over a function body.

use syn::visit::Visit;

/// McCabe cyclomatic complexity: one plus the number of independent
/// branch points (if, match arms, loops, short-circuit operators, and
/// `?` early returns).
pub fn cyclomatic(block: &syn::Block) -> u32 {
    let mut visitor = CyclomaticVisitor { complexity: 1 };
    visitor.visit_block(block);
    visitor.complexity
}

struct CyclomaticVisitor {
    complexity: u32,
}

impl<'ast> Visit<'ast> for CyclomaticVisitor {
    fn visit_expr(&mut self, expr: &'ast syn::Expr) {
        match expr {
            syn::Expr::If(_) => self.complexity += 1,
            syn::Expr::Match(expr_match) => {
                self.complexity += expr_match.arms.len() as u32;
            }
            syn::Expr::While(_) | syn::Expr::ForLoop(_) | syn::Expr::Loop(_) => {
                self.complexity += 1;
            }
            syn::Expr::Binary(binary) if is_logical_operator(&binary.op) => {
                self.complexity += 1;
            }
            syn::Expr::Try(_) => self.complexity += 1,
            _ => {}
        }
        syn::visit::visit_expr(self, expr);
    }
}

fn is_logical_operator(op: &syn::BinOp) -> bool {
    matches!(op, syn::BinOp::And(_) | syn::BinOp::Or(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_of(source: &str) -> syn::Block {
        let item: syn::ItemFn = syn::parse_str(source).unwrap();
        *item.block
    }

    #[test]
    fn straight_line_code_scores_one() {
        let block = body_of("fn f() { let x = 1; let y = x + 1; }");
        assert_eq!(cyclomatic(&block), 1);
    }

    #[test]
    fn branches_and_loops_add_up() {
        let block = body_of(
            r#"
fn f(x: i32) -> i32 {
    if x > 0 {
        for i in 0..x {
            if i % 2 == 0 && i > 2 {
                return i;
            }
        }
    }
    x
}
"#,
        );
        // 1 base + if + for + if + && = 5.
        assert_eq!(cyclomatic(&block), 5);
    }

    #[test]
    fn match_counts_each_arm() {
        let block = body_of(
            r#"
fn f(x: u8) -> &'static str {
    match x {
        0 => "zero",
        1 => "one",
        _ => "many",
    }
}
"#,
        );
        assert_eq!(cyclomatic(&block), 4);
    }
}
