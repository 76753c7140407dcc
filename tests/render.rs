use shanty_typeck::*;

fn failing_analysis() -> (TypeAnalysis, Span) {
    let mut registry = TypeRegistry::new();
    let mut b = AstBuilder::new();
    let main_ty = registry.function(vec![], TypeId::INT);
    let main = b.func("main", main_ty);
    let value = b.string("nope");
    let ret = b.ret(Some(value));
    let span = ret.span;
    let ret_ty = b.int_ty();
    let decl = b.fn_decl(&main, vec![], ret_ty, vec![ret]);
    let program = b.program(vec![decl]);
    (type_check(&program, b.symbols(), &mut registry).unwrap(), span)
}

#[test]
fn test_render_without_source() {
    let (analysis, span) = failing_analysis();
    let output = analysis.to_diagnostics().render(None, RenderConfig::no_colors());

    assert!(output.contains("error[E0302]: Bad return value"));
    assert!(output.contains(&format!("--> <unit>@{}: expected `int`, found `string`", span)));
    assert!(output.ends_with("error: aborting due to 1 previous error\n"));
}

#[test]
fn test_render_with_source_excerpt() {
    let source = "int main() {\n    return \"nope\";\n}\n";
    let diagnostic = Diagnostic::error("Bad return value")
        .with_code("E0302")
        .with_filename("main.shanty")
        .with_label(Span::new(17, 31), "expected `int`, found `string`");
    let output = DiagnosticRenderer::plain().render(&diagnostic, Some(source));

    assert!(output.contains("--> main.shanty:2:5"));
    assert!(output.contains("2 |     return \"nope\";"));
    assert!(output.contains("^^^^^^^^^^^^^^ expected `int`, found `string`"));
}

#[test]
fn test_passing_run_renders_nothing() {
    let mut registry = TypeRegistry::new();
    let mut b = AstBuilder::new();
    let program = b.program(vec![]);
    let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
    assert_eq!(analysis.to_diagnostics().render(None, RenderConfig::no_colors()), "");
}
