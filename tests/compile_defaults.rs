use paraquery::compile::{compile_text, Direction, Mode, OrderBy};
use paraquery::normalize::{Field, Literal, Operator, Predicate, SamePos, Term};
use paraquery::parser::Comparison;
use paraquery::session::Settings;

fn identity(same: bool) -> Predicate {
    Term::compare(Field::Identity, Comparison::Eq, Literal::Bool(same)).into()
}

#[test]
fn relation_by_name_with_default_session() {
    let compilation = compile_text("relation = \"synonym\"", &Settings::default()).expect("compiles");
    let query = compilation.query;
    assert!(compilation.warnings.is_empty());
    assert_eq!(query.mode, Mode::Row);
    assert_eq!(
        query.predicates,
        vec![Term::compare(Field::Relation, Comparison::Eq, Literal::Int(2)).into(), identity(false)]
    );
    assert_eq!(query.limit, Some(10));
    assert_eq!(query.order_by, OrderBy::Field(Field::Cost, Direction::Ascending));
    assert_eq!(query.group_by, None);
}

#[test]
fn counting_pivot_inclusion() {
    let query = compile_text("count pivots include \"wall\"", &Settings::default()).expect("compiles").query;
    assert_eq!(query.mode, Mode::Count);
    assert_eq!(query.limit, None);
    assert_eq!(query.order_by, OrderBy::CountAscending);
    match &query.predicates[0] {
        Predicate::AnyOf(terms) => {
            assert_eq!(terms[0].op, Operator::Like);
            assert_eq!(terms[0].value, Literal::Text("%\"wall:%".to_string()));
            assert_eq!(terms[1], Term::compare(Field::Pivots, Comparison::Eq, Literal::Text("wall".to_string())));
        }
        other => panic!("expected a disjunction, got {other:?}"),
    }
    assert_eq!(query.predicates[1], identity(false));
}

#[test]
fn most_probable_with_same_pos() {
    let mut settings = Settings::default();
    settings.set("same_pos", "on").expect("valid setting");
    let query = compile_text("most probable", &settings).expect("compiles").query;
    assert_eq!(
        query.predicates,
        vec![
            identity(false),
            Term::compare(Field::SamePos, Comparison::Eq, Literal::Int(SamePos::Same.code())).into(),
        ]
    );
    assert_eq!(query.order_by, OrderBy::Field(Field::Cost, Direction::Ascending));

    let query = compile_text("least probable", &settings).expect("compiles").query;
    assert_eq!(query.order_by, OrderBy::Field(Field::Cost, Direction::Descending));
}

#[test]
fn probability_boundary_splits_cleanly() {
    let settings = Settings::default();
    let above = compile_text("prob > 0.5", &settings).expect("compiles").query;
    let below = compile_text("prob < 0.5", &settings).expect("compiles").query;
    let (above, below) = (&above.predicates[0].terms()[0], &below.predicates[0].terms()[0]);
    assert_eq!(above.op, Operator::Compare(Comparison::Lt));
    assert_eq!(below.op, Operator::Compare(Comparison::Gt));
    assert_eq!(above.value, below.value);
    match above.value {
        Literal::Real(cost) => assert!((cost - 0.6931).abs() < 1e-4),
        ref other => panic!("expected a real cost, got {other:?}"),
    }
}

#[test]
fn length_clause_sign_follows_the_longer_side() {
    let settings = Settings::default();
    for n in 1..=3u32 {
        let longer_target = compile_text(&format!("source < target by {n} words"), &settings).expect("compiles");
        assert_eq!(
            longer_target.query.predicates[0],
            Term::compare(Field::LenDiff, Comparison::Eq, Literal::Int(i64::from(n))).into()
        );
        let longer_source = compile_text(&format!("target < source by {n} words"), &settings).expect("compiles");
        assert_eq!(
            longer_source.query.predicates[0],
            Term::compare(Field::LenDiff, Comparison::Eq, Literal::Int(-i64::from(n))).into()
        );
    }
}

#[test]
fn explicit_identity_replaces_the_default() {
    let mut settings = Settings::default();
    let query = compile_text("source = target", &settings).expect("compiles").query;
    assert_eq!(query.predicates, vec![identity(true)]);
    assert!(!query.predicates.iter().any(|p| p.constrains(Field::LenDiff)));

    settings.set("identical", "on").expect("valid setting");
    let again = compile_text("source = target", &settings).expect("compiles").query;
    assert_eq!(again.predicates, query.predicates);
}

#[test]
fn default_exclusion_appears_exactly_once() {
    let settings = Settings::default();
    for text in ["source = \"barrier\"", "prob > 0.1 and distance < 2", "count target is 2 words", "most probable"] {
        let query = compile_text(text, &settings).expect("compiles").query;
        let exclusions = query.predicates.iter().filter(|p| **p == identity(false)).count();
        assert_eq!(exclusions, 1, "{text}");
    }
}

#[test]
fn identical_setting_lifts_the_exclusion() {
    let mut settings = Settings::default();
    settings.set("identical", "on").expect("valid setting");
    let query = compile_text("source = \"barrier\"", &settings).expect("compiles").query;
    assert!(!query.predicates.iter().any(|p| p.constrains_identity()));
}

#[test]
fn unique_target_and_same_pos_are_appended_in_order() {
    let mut settings = Settings::default();
    settings.set("unique_tgt", "on").expect("valid setting");
    settings.set("same_pos", "on").expect("valid setting");
    let query = compile_text("source = \"man\"", &settings).expect("compiles").query;
    let fields: Vec<Field> = query.predicates.iter().map(|p| p.terms()[0].field).collect();
    assert_eq!(fields, vec![Field::Source, Field::Identity, Field::SamePos, Field::TargetDuplicate]);
}

#[test]
fn identity_directives_ignore_session_filters() {
    let mut settings = Settings::default();
    settings.set("same_pos", "on").expect("valid setting");
    let query = compile_text("same", &settings).expect("compiles").query;
    assert_eq!(query.predicates, vec![identity(true)]);
    assert_eq!(query.order_by, OrderBy::Random);
    assert_eq!(query.limit, Some(10));

    let query = compile_text("non-identical", &settings).expect("compiles").query;
    assert_eq!(query.predicates, vec![identity(false)]);
}

#[test]
fn session_order_and_limit() {
    let mut settings = Settings::default();
    settings.set("order", "random").expect("valid setting");
    settings.set("limit", "none").expect("valid setting");
    let query = compile_text("distance = 1", &settings).expect("compiles").query;
    assert_eq!(query.order_by, OrderBy::Random);
    assert_eq!(query.limit, None);

    settings.set("order", "lowprobfirst").expect("valid setting");
    settings.set("limit", "3").expect("valid setting");
    let query = compile_text("distance = 1", &settings).expect("compiles").query;
    assert_eq!(query.order_by, OrderBy::Field(Field::Cost, Direction::Descending));
    assert_eq!(query.limit, Some(3));
}

#[test]
fn count_queries_take_the_session_grouping() {
    let mut settings = Settings::default();
    settings.set("group_by", "relation").expect("valid setting");
    let count = compile_text("count source = \"barrier\"", &settings).expect("compiles").query;
    assert_eq!(count.group_by, Some(Field::Relation));
    let rows = compile_text("source = \"barrier\"", &settings).expect("compiles").query;
    assert_eq!(rows.group_by, None);
}

#[test]
fn unresolved_conditions_become_warnings() {
    let compilation = compile_text("relation = \"cousin\" and distance = 1", &Settings::default()).expect("compiles");
    assert_eq!(compilation.warnings.len(), 1);
    assert_eq!(compilation.warnings[0].condition, "relation = \"cousin\"");
    assert_eq!(
        compilation.query.predicates,
        vec![Term::compare(Field::Distance, Comparison::Eq, Literal::Int(1)).into(), identity(false)]
    );
}

#[test]
fn compiling_twice_is_identical() {
    let settings = Settings::default();
    let text = "source = \"barrier*\" and prob > 0.005 and pivots include \"wall\"";
    let first = compile_text(text, &settings).expect("compiles");
    let second = compile_text(text, &settings).expect("compiles");
    assert_eq!(first, second);
}

#[test]
fn rendered_sql() {
    let query = compile_text("relation = \"synonym\"", &Settings::default()).expect("compiles").query;
    assert_eq!(
        query.to_string(),
        "select source, target, pe2e1, relation, pivotnum, pivots, distance from paraphrase \
         where relation = 2 and identity = 0 order by pe2e1 asc limit 10"
    );
    let (sql, params) = query.to_sql();
    assert_eq!(
        sql,
        "select source, target, pe2e1, relation, pivotnum, pivots, distance from paraphrase \
         where relation = ? and identity = ? order by pe2e1 asc limit 10"
    );
    assert_eq!(params, vec![Literal::Int(2), Literal::Bool(false)]);
}

#[test]
fn rendered_count_sql() {
    let mut settings = Settings::default();
    let query = compile_text("count pivots include \"wall\"", &settings).expect("compiles").query;
    assert_eq!(
        query.to_string(),
        "select null, count(*) as cnt from paraphrase \
         where (pivots like '%\"wall:%' escape '\\' or pivots = 'wall') and identity = 0 order by cnt asc"
    );

    settings.set("group_by", "samepos").expect("valid setting");
    let query = compile_text("count same", &settings).expect("compiles").query;
    assert_eq!(
        query.to_string(),
        "select samepos, count(*) as cnt from paraphrase where identity = 1 group by samepos order by cnt asc"
    );
}
