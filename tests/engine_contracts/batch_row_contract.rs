//! Contract: evaluating a batch gives the same values and warnings as
//! evaluating each of its rows on its own.

use proptest::prelude::*;

use vexpr::types::EvalType;
use vexpr::{BuiltinFunction as F, Chunk, Column, Datum, EvalConfig, Expression};

use super::support::{call, col, context, eval_with, int_col, s, str_col};

type Row = (
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<i64>,
);

fn str_arg(i: usize) -> Expression {
    col(i, EvalType::String)
}

fn int_arg(i: usize) -> Expression {
    col(i, EvalType::Int)
}

/// One call per function family, over columns
/// `(str, str, int, str, int)`.
fn calls() -> Vec<Expression> {
    vec![
        call(F::UpperUtf8, vec![str_arg(0)]),
        call(F::ReverseUtf8, vec![str_arg(0)]),
        call(F::Repeat, vec![str_arg(0), int_arg(2)]),
        call(F::Space, vec![int_arg(4)]),
        call(F::Concat, vec![str_arg(0), str_arg(1), str_arg(3)]),
        call(F::ConcatWs, vec![str_arg(1), str_arg(0), str_arg(3)]),
        call(F::LeftUtf8, vec![str_arg(0), int_arg(2)]),
        call(F::Right, vec![str_arg(0), int_arg(2)]),
        call(F::SubstringUtf8, vec![str_arg(0), int_arg(2), int_arg(4)]),
        call(F::Substring, vec![str_arg(0), int_arg(4)]),
        call(F::SubstringIndex, vec![str_arg(0), str_arg(1), int_arg(2)]),
        call(F::InsertUtf8, vec![str_arg(0), int_arg(2), int_arg(4), str_arg(1)]),
        call(F::LpadUtf8, vec![str_arg(0), int_arg(2), str_arg(1)]),
        call(F::Rpad, vec![str_arg(0), int_arg(4), str_arg(3)]),
        call(F::Trim, vec![str_arg(0), str_arg(1), int_arg(2)]),
        call(F::LTrim, vec![str_arg(3)]),
        call(F::Quote, vec![str_arg(0)]),
        call(F::HexStr, vec![str_arg(0)]),
        call(F::Unhex, vec![str_arg(1)]),
        call(F::OctString, vec![str_arg(3)]),
        call(F::Bin, vec![int_arg(2)]),
        call(F::ToBase64, vec![str_arg(0)]),
        call(F::FromBase64, vec![str_arg(0)]),
        call(F::Replace, vec![str_arg(0), str_arg(1), str_arg(3)]),
        call(F::Elt, vec![int_arg(2), str_arg(0), str_arg(1), str_arg(3)]),
        call(F::MakeSet, vec![int_arg(2), str_arg(0), str_arg(1)]),
        call(F::ExportSet, vec![int_arg(2), str_arg(0), str_arg(1), str_arg(3), int_arg(4)]),
        call(F::Char, vec![int_arg(2), int_arg(4)]),
        call(F::Format, vec![int_arg(2), int_arg(4), str_arg(3)]),
        call(F::Translate, vec![str_arg(0), str_arg(1), str_arg(3)]),
        call(F::TranslateUtf8, vec![str_arg(0), str_arg(1), str_arg(3)]),
        call(F::StringIsNull, vec![str_arg(0)]),
        call(F::CharLengthUtf8, vec![str_arg(0)]),
        call(F::Ord, vec![str_arg(0)]),
        call(F::Locate, vec![str_arg(1), str_arg(0)]),
        call(F::LocateUtf8, vec![str_arg(1), str_arg(0), int_arg(2)]),
        call(F::Instr, vec![str_arg(0), str_arg(1)]),
        call(F::FindInSet, vec![str_arg(1), str_arg(0)]),
        call(F::Strcmp, vec![str_arg(0), str_arg(1)]),
    ]
}

/// Calls whose operands are themselves calls that can overflow a small
/// packet budget.
fn nested_calls() -> Vec<Expression> {
    let repeat = |text: usize, count: usize| call(F::Repeat, vec![str_arg(text), int_arg(count)]);
    vec![
        call(F::Elt, vec![int_arg(2), repeat(0, 4), str_arg(1)]),
        call(
            F::Elt,
            vec![
                int_arg(4),
                call(F::LpadUtf8, vec![str_arg(0), int_arg(2), str_arg(1)]),
                call(F::UpperUtf8, vec![str_arg(3)]),
                repeat(1, 2),
            ],
        ),
        call(F::Concat, vec![repeat(0, 2), str_arg(1)]),
        call(F::ConcatWs, vec![str_arg(1), call(F::Space, vec![int_arg(4)]), repeat(3, 2)]),
        call(F::Length, vec![repeat(0, 4)]),
        call(F::SubstringUtf8, vec![repeat(0, 2), int_arg(4)]),
        call(
            F::Locate,
            vec![str_arg(1), call(F::Concat, vec![str_arg(0), str_arg(3)])],
        ),
    ]
}

/// Warnings as a sorted list of messages.
///
/// A parent and a nested operand may both warn; batch order is operand by
/// operand while row order interleaves them, so only the set is compared.
fn warning_set(warnings: Vec<vexpr::EvalWarning>) -> Vec<String> {
    let mut messages: Vec<String> = warnings.iter().map(ToString::to_string).collect();
    messages.sort();
    messages
}

fn text_column(rows: &[Row], pick: impl Fn(&Row) -> Option<&str>) -> Column {
    let datums: Vec<Datum> = rows
        .iter()
        .map(|r| pick(r).map_or(Datum::Null, Datum::from))
        .collect();
    Column::from_datums(EvalType::String, &datums).unwrap()
}

fn int_column(rows: &[Row], pick: impl Fn(&Row) -> Option<i64>) -> Column {
    let datums: Vec<Datum> = rows
        .iter()
        .map(|r| pick(r).map_or(Datum::Null, Datum::Int))
        .collect();
    Column::from_datums(EvalType::Int, &datums).unwrap()
}

fn build_chunk(rows: &[Row]) -> Chunk {
    Chunk::new(vec![
        text_column(rows, |r| r.0.as_deref()),
        text_column(rows, |r| r.1.as_deref()),
        int_column(rows, |r| r.2),
        text_column(rows, |r| r.3.as_deref()),
        int_column(rows, |r| r.4),
    ])
    .unwrap()
}

fn row_strategy() -> impl Strategy<Value = Row> {
    let text = || proptest::option::weighted(0.85, "[ab ,é日xYZ=]{0,6}");
    let int = || proptest::option::weighted(0.85, -3i64..10);
    (text(), text(), int(), text(), int())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_batch_matches_rows(rows in proptest::collection::vec(row_strategy(), 1..24)) {
        let input = build_chunk(&rows);
        for expr in calls().into_iter().chain(nested_calls()) {
            let batch_ctx = context(EvalConfig::default());
            let row_ctx = context(EvalConfig::default().with_vectorized(false));

            let batch = eval_with(&batch_ctx, &expr, &input).unwrap();
            let by_row = eval_with(&row_ctx, &expr, &input).unwrap();

            prop_assert_eq!(&batch, &by_row, "values differ for {:?}", expr);
            prop_assert_eq!(batch_ctx.warnings(), row_ctx.warnings());
            prop_assert_eq!(batch_ctx.stats().row_fallback_evaluations(), 0);
            prop_assert_eq!(row_ctx.stats().row_fallback_evaluations(), rows.len() as u64);
        }
    }

    #[test]
    fn test_batch_matches_rows_in_strict_mode(rows in proptest::collection::vec(row_strategy(), 1..24)) {
        // A small budget makes some rows overflow; strict mode must fail
        // both paths or neither.
        let input = build_chunk(&rows);
        let config = EvalConfig::default()
            .with_strict_mode(true)
            .with_max_output_bytes(12);
        for expr in calls().into_iter().chain(nested_calls()) {
            let batch = eval_with(&context(config.clone()), &expr, &input);
            let by_row = eval_with(&context(config.clone().with_vectorized(false)), &expr, &input);
            match (batch, by_row) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(_), Err(_)) => {}
                (a, b) => prop_assert!(false, "paths disagree: {:?} vs {:?}", a.is_ok(), b.is_ok()),
            }
        }
    }

    #[test]
    fn test_nested_operands_match_rows(rows in proptest::collection::vec(row_strategy(), 1..24)) {
        // Contract: nested operands raise warnings for exactly the rows a
        // row-at-a-time pass evaluates
        let input = build_chunk(&rows);
        let config = EvalConfig::default().with_max_output_bytes(12);
        for expr in nested_calls() {
            let batch_ctx = context(config.clone());
            let row_ctx = context(config.clone().with_vectorized(false));

            let batch = eval_with(&batch_ctx, &expr, &input).unwrap();
            let by_row = eval_with(&row_ctx, &expr, &input).unwrap();

            prop_assert_eq!(&batch, &by_row, "values differ for {:?}", expr);
            prop_assert_eq!(warning_set(batch_ctx.warnings()), warning_set(row_ctx.warnings()));
        }
    }
}

fn elt_over_repeat_input() -> Chunk {
    Chunk::new(vec![
        int_col(&[Some(1), Some(2)]),
        int_col(&[Some(1), Some(1_000_000_000)]),
    ])
    .unwrap()
}

fn elt_over_repeat() -> Expression {
    call(
        F::Elt,
        vec![
            int_arg(0),
            call(F::Repeat, vec![Expression::string("ab"), int_arg(1)]),
            Expression::string("x"),
        ],
    )
}

#[test]
fn test_elt_evaluates_only_selected_rows() {
    // Contract: the unselected REPEAT on row 2 would overflow, but neither
    // path evaluates it
    let input = elt_over_repeat_input();
    let config = EvalConfig::default().with_max_output_bytes(1024);
    let batch_ctx = context(config.clone());
    let row_ctx = context(config.with_vectorized(false));

    let batch = eval_with(&batch_ctx, &elt_over_repeat(), &input).unwrap();
    let by_row = eval_with(&row_ctx, &elt_over_repeat(), &input).unwrap();

    assert_eq!(batch, vec![s("ab"), s("x")]);
    assert_eq!(batch, by_row);
    assert!(batch_ctx.warnings().is_empty());
    assert!(row_ctx.warnings().is_empty());
}

#[test]
fn test_elt_unselected_overflow_is_not_strict_error() {
    let input = elt_over_repeat_input();
    let config = EvalConfig::default()
        .with_max_output_bytes(1024)
        .with_strict_mode(true);

    let batch = eval_with(&context(config.clone()), &elt_over_repeat(), &input).unwrap();
    let by_row = eval_with(&context(config.with_vectorized(false)), &elt_over_repeat(), &input)
        .unwrap();
    assert_eq!(batch, vec![s("ab"), s("x")]);
    assert_eq!(batch, by_row);
}

#[test]
fn test_elt_interleaved_selection() {
    let input = Chunk::new(vec![
        int_col(&[Some(1), Some(2), Some(2), None, Some(1), Some(3)]),
        str_col(&[Some("a0"), Some("a1"), Some("a2"), Some("a3"), None, Some("a5")]),
        str_col(&[Some("b0"), Some("b1"), None, Some("b3"), Some("b4"), Some("b5")]),
    ])
    .unwrap();
    let expr = call(
        F::Elt,
        vec![int_arg(0), str_arg(1), str_arg(2)],
    );
    let ctx = context(EvalConfig::default());
    assert_eq!(
        eval_with(&ctx, &expr, &input).unwrap(),
        vec![s("a0"), s("b1"), Datum::Null, Datum::Null, Datum::Null, Datum::Null]
    );
}
