use pretty_assertions::assert_eq;
use shanty_typeck::*;

/// `record Point { int x; bool y; }` declared as a symbol and a global.
struct Fixture {
    b: AstBuilder,
    registry: TypeRegistry,
    point: Ident,
    point_ty: TypeId,
    globals: Vec<Decl>,
}

impl Fixture {
    fn new() -> Self {
        let mut registry = TypeRegistry::new();
        let mut b = AstBuilder::new();
        let point_ty = registry.record(
            "Point",
            vec![("x".to_string(), TypeId::INT), ("y".to_string(), TypeId::BOOL)],
        );
        let point = b.record("Point", point_ty);
        let x_ty = b.int_ty();
        let y_ty = b.bool_ty();
        let decl = b.record_decl(&point, vec![("x", x_ty), ("y", y_ty)]);
        Self {
            b,
            registry,
            point,
            point_ty,
            globals: vec![decl],
        }
    }

    fn analyze(mut self, body: Vec<Stmt>) -> TypeAnalysis {
        let main_ty = self.registry.function(vec![], TypeId::VOID);
        let main = self.b.func("main", main_ty);
        let ret = self.b.void_ty();
        let decl = self.b.fn_decl(&main, vec![], ret, body);
        self.globals.push(decl);
        let program = self.b.program(self.globals);
        type_check(&program, self.b.symbols(), &mut self.registry).unwrap()
    }
}

fn codes(analysis: &TypeAnalysis) -> Vec<&'static str> {
    analysis.diagnostics().iter().map(|d| d.error.code()).collect()
}

#[test]
fn test_record_declaration() {
    let fx = Fixture::new();
    let decl_id = fx.globals[0].id;
    let DeclKind::Record(record) = &fx.globals[0].kind else {
        unreachable!()
    };
    let field_ids: Vec<NodeId> = record.fields.iter().map(|f| f.id).collect();
    let point_ty = fx.point_ty;

    let analysis = fx.analyze(vec![]);
    assert!(analysis.passed());
    assert_eq!(analysis.type_of(decl_id), Some(point_ty));
    assert_eq!(analysis.type_of(field_ids[0]), Some(TypeId::INT));
    assert_eq!(analysis.type_of(field_ids[1]), Some(TypeId::BOOL));
}

#[test]
fn test_duplicate_and_invalid_fields() {
    let mut registry = TypeRegistry::new();
    let mut b = AstBuilder::new();
    let bad_ty = registry.record(
        "Bad",
        vec![("a".to_string(), TypeId::INT), ("b".to_string(), TypeId::VOID)],
    );
    let bad = b.record("Bad", bad_ty);
    let first = b.int_ty();
    let again = b.string_ty();
    let nothing = b.void_ty();
    let decl = b.record_decl(&bad, vec![("a", first), ("a", again), ("b", nothing)]);
    let decl_id = decl.id;
    let DeclKind::Record(record) = &decl.kind else {
        unreachable!()
    };
    let field_ids: Vec<NodeId> = record.fields.iter().map(|f| f.id).collect();
    let program = b.program(vec![decl]);

    let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
    assert_eq!(codes(&analysis), vec!["E0601", "E0602"]);
    assert_eq!(analysis.type_of(decl_id), Some(TypeId::ERROR));
    assert_eq!(analysis.type_of(field_ids[0]), Some(TypeId::INT));
    assert_eq!(analysis.type_of(field_ids[1]), Some(TypeId::ERROR));
    assert_eq!(analysis.type_of(field_ids[2]), Some(TypeId::ERROR));
}

#[test]
fn test_record_fields_cannot_nest_records() {
    let mut fx = Fixture::new();
    let outer_ty = fx.registry.record("Outer", vec![("p".to_string(), fx.point_ty)]);
    let outer = fx.b.record("Outer", outer_ty);
    let inner = fx.b.record_ty(&fx.point);
    let decl = fx.b.record_decl(&outer, vec![("p", inner)]);
    fx.globals.push(decl);

    let analysis = fx.analyze(vec![]);
    assert_eq!(codes(&analysis), vec!["E0602"]);
}

#[test]
fn test_broken_record_is_not_reported_again() {
    let mut registry = TypeRegistry::new();
    let mut b = AstBuilder::new();
    let bad_ty = registry.record("Bad", vec![("b".to_string(), TypeId::VOID)]);
    let bad = b.record("Bad", bad_ty);
    let make_ty = registry.function(vec![], bad_ty);
    let make = b.func("make", make_ty);
    let main_ty = registry.function(vec![], TypeId::VOID);
    let main = b.func("main", main_ty);

    // used before the declaration
    let w = b.var("w", bad_ty);
    let early = b.record_ty(&bad);
    let early_id = early.id;
    let early = b.global_var(early, &w);

    let nothing = b.void_ty();
    let record = b.record_decl(&bad, vec![("b", nothing)]);

    let v = b.var("v", bad_ty);
    let annotation = b.record_ty(&bad);
    let local = b.var_decl(annotation, &v);
    let local = b.var_stmt(local);
    let base = b.id(&v);
    let base_id = base.id;
    let access = b.field(base, "b");
    let access = b.report(access);
    let one = b.int(1);
    let lit = b.record_lit(&bad, vec![("b", one)]);
    let lit_id = lit.id;
    let from_lit = b.field(lit, "b");
    let from_lit = b.report(from_lit);
    let call = b.call(&make, vec![]);
    let call_id = call.id;
    let from_call = b.field(call, "b");
    let from_call = b.report(from_call);
    let whole = b.id(&w);
    let whole = b.report(whole);

    let ret = b.void_ty();
    let func = b.fn_decl(&main, vec![], ret, vec![local, access, from_lit, from_call, whole]);
    let program = b.program(vec![early, record, func]);

    let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
    assert_eq!(codes(&analysis), vec!["E0602"]);
    assert_eq!(analysis.type_of(early_id), Some(TypeId::ERROR));
    assert_eq!(analysis.type_of(base_id), Some(TypeId::ERROR));
    assert_eq!(analysis.type_of(lit_id), Some(TypeId::ERROR));
    assert_eq!(analysis.type_of(call_id), Some(TypeId::ERROR));
}

#[test]
fn test_record_declaration_must_match_bound_type() {
    let mut registry = TypeRegistry::new();
    let mut b = AstBuilder::new();
    let point_ty = registry.record(
        "Point",
        vec![("x".to_string(), TypeId::INT), ("y".to_string(), TypeId::BOOL)],
    );
    let point = b.record("Point", point_ty);

    let x_ty = b.int_ty();
    let missing_y = b.record_decl(&point, vec![("x", x_ty)]);
    let program = b.program(vec![missing_y]);
    let err = type_check(&program, b.symbols(), &mut registry).unwrap_err();
    assert!(matches!(err, CheckError::RecordShapeMismatch { ref name } if name == "Point"));

    let x_ty = b.int_ty();
    let y_ty = b.string_ty();
    let wrong_y = b.record_decl(&point, vec![("x", x_ty), ("y", y_ty)]);
    let program = b.program(vec![wrong_y]);
    let err = type_check(&program, b.symbols(), &mut registry).unwrap_err();
    assert!(matches!(err, CheckError::RecordShapeMismatch { .. }));
}

#[test]
fn test_record_type_must_name_a_record() {
    let mut fx = Fixture::new();
    let a = fx.b.var("a", TypeId::INT);
    let v = fx.b.var("v", TypeId::ERROR);
    let annotation = fx.b.record_ty(&a);
    let annotation_id = annotation.id;
    let annotation_span = annotation.span;
    let local = fx.b.var_decl(annotation, &v);
    let local = fx.b.var_stmt(local);

    let p = fx.b.var("p", fx.point_ty);
    let annotation = fx.b.record_ty(&fx.point);
    let good_id = annotation.id;
    let good = fx.b.var_decl(annotation, &p);
    let good = fx.b.var_stmt(good);
    let point_ty = fx.point_ty;

    let analysis = fx.analyze(vec![local, good]);
    assert_eq!(codes(&analysis), vec!["E0600"]);
    assert_eq!(analysis.diagnostics()[0].span, annotation_span);
    assert_eq!(analysis.type_of(annotation_id), Some(TypeId::ERROR));
    assert_eq!(analysis.type_of(good_id), Some(point_ty));
}

#[test]
fn test_field_access() {
    let mut fx = Fixture::new();
    let p = fx.b.var("p", fx.point_ty);
    let a = fx.b.var("a", TypeId::INT);

    let base = fx.b.id(&p);
    let x = fx.b.field(base, "x");
    let x_id = x.id;
    let good = fx.b.report(x);

    let base = fx.b.id(&p);
    let z = fx.b.field(base, "z");
    let unknown = fx.b.report(z);

    let base = fx.b.id(&a);
    let base_span = base.span;
    let on_int = fx.b.field(base, "x");
    let non_record = fx.b.report(on_int);

    let analysis = fx.analyze(vec![good, unknown, non_record]);
    assert_eq!(codes(&analysis), vec!["E0603", "E0604"]);
    assert_eq!(analysis.diagnostics()[1].span, base_span);
    assert_eq!(analysis.type_of(x_id), Some(TypeId::INT));
}

#[test]
fn test_record_literal() {
    let mut fx = Fixture::new();
    let x = fx.b.int(1);
    let y = fx.b.bool(true);
    let point = fx.point.clone();
    let lit = fx.b.record_lit(&point, vec![("x", x), ("y", y)]);
    let lit_id = lit.id;
    let y = fx.b.field(lit, "y");
    let y_id = y.id;
    let stmt = fx.b.report(y);
    let point_ty = fx.point_ty;

    let analysis = fx.analyze(vec![stmt]);
    assert!(analysis.passed(), "{:?}", analysis.diagnostics());
    assert_eq!(analysis.type_of(lit_id), Some(point_ty));
    assert_eq!(analysis.type_of(y_id), Some(TypeId::BOOL));
}

#[test]
fn test_record_literal_field_errors() {
    let mut fx = Fixture::new();
    let point = fx.point.clone();

    // missing y; the access on the ERROR literal stays silent
    let x = fx.b.int(1);
    let missing = fx.b.record_lit(&point, vec![("x", x)]);
    let missing_id = missing.id;
    let missing = fx.b.field(missing, "x");
    let missing = fx.b.report(missing);

    // x given twice, plus an unknown field
    let x1 = fx.b.int(1);
    let x2 = fx.b.int(2);
    let y = fx.b.bool(false);
    let w = fx.b.int(3);
    let messy = fx.b.record_lit(&point, vec![("x", x1), ("x", x2), ("y", y), ("w", w)]);
    let messy = fx.b.field(messy, "x");
    let messy = fx.b.report(messy);

    // y has the wrong type
    let x = fx.b.int(1);
    let y = fx.b.string("yes");
    let y_span = y.span;
    let mismatch = fx.b.record_lit(&point, vec![("x", x), ("y", y)]);
    let mismatch = fx.b.field(mismatch, "x");
    let mismatch = fx.b.report(mismatch);

    let analysis = fx.analyze(vec![missing, messy, mismatch]);
    assert_eq!(codes(&analysis), vec!["E0606", "E0601", "E0603", "E0605"]);
    assert_eq!(analysis.diagnostics()[3].span, y_span);
    assert_eq!(analysis.type_of(missing_id), Some(TypeId::ERROR));
}

#[test]
fn test_record_literal_of_non_record() {
    let mut fx = Fixture::new();
    let a = fx.b.var("a", TypeId::INT);
    let x = fx.b.int(1);
    let lit = fx.b.record_lit(&a, vec![("x", x)]);
    let x = fx.b.field(lit, "x");
    let stmt = fx.b.report(x);

    let analysis = fx.analyze(vec![stmt]);
    assert_eq!(codes(&analysis), vec!["E0600"]);
}

#[test]
fn test_whole_records_in_io_and_assignment() {
    let mut fx = Fixture::new();
    let p = fx.b.var("p", fx.point_ty);
    let q = fx.b.var("q", fx.point_ty);

    let src = fx.b.id(&p);
    let report = fx.b.report(src);
    let dst = fx.b.id(&p);
    let receive = fx.b.receive(dst);
    let dst = fx.b.id(&p);
    let src = fx.b.id(&q);
    let assign = fx.b.assign_stmt(dst, src);

    let analysis = fx.analyze(vec![report, receive, assign]);
    assert_eq!(codes(&analysis), vec!["E0502", "E0504", "E0104"]);
    assert_eq!(analysis.diagnostics()[0].error.to_string(), "Attempt to output a record");
}

#[test]
fn test_records_compare_by_identity() {
    let mut fx = Fixture::new();
    let p = fx.b.var("p", fx.point_ty);
    let q = fx.b.var("q", fx.point_ty);
    let lhs = fx.b.id(&p);
    let rhs = fx.b.id(&q);
    let eq = fx.b.binary(BinaryOp::Equals, lhs, rhs);
    let eq_id = eq.id;
    let stmt = fx.b.report(eq);

    let analysis = fx.analyze(vec![stmt]);
    assert!(analysis.passed());
    assert_eq!(analysis.type_of(eq_id), Some(TypeId::BOOL));
}

#[test]
fn test_returning_a_record_is_rejected() {
    let mut registry = TypeRegistry::new();
    let mut b = AstBuilder::new();
    let point_ty = registry.record("Point", vec![("x".to_string(), TypeId::INT)]);
    let point = b.record("Point", point_ty);
    let p = b.var("p", point_ty);
    let make_ty = registry.function(vec![], point_ty);
    let make = b.func("make", make_ty);

    let x_ty = b.int_ty();
    let record = b.record_decl(&point, vec![("x", x_ty)]);
    let value = b.id(&p);
    let ret = b.ret(Some(value));
    let ret_ty = b.record_ty(&point);
    let func = b.fn_decl(&make, vec![], ret_ty, vec![ret]);
    let program = b.program(vec![record, func]);

    let analysis = type_check(&program, b.symbols(), &mut registry).unwrap();
    assert_eq!(codes(&analysis), vec!["E0302"]);
}
