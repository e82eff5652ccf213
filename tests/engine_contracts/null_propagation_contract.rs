//! Contract: a NULL operand makes the result NULL, except where a function
//! documents otherwise. Every exception is pinned down explicitly.

use proptest::prelude::*;

use vexpr::{BuiltinFunction as F, Datum, Expression, FieldType};

use super::support::{eval_const, s};

/// Operand slot filled from generated values.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Text(usize),
    Int(usize),
}

use Slot::{Int, Text};

/// Calls with strict null propagation in every position.
fn strict_calls() -> Vec<(F, Vec<Slot>)> {
    vec![
        (F::Lower, vec![Text(0)]),
        (F::UpperUtf8, vec![Text(0)]),
        (F::Repeat, vec![Text(0), Int(0)]),
        (F::Space, vec![Int(0)]),
        (F::Reverse, vec![Text(0)]),
        (F::Concat, vec![Text(0), Text(1), Text(2)]),
        (F::Left, vec![Text(0), Int(0)]),
        (F::RightUtf8, vec![Text(0), Int(0)]),
        (F::Substring, vec![Text(0), Int(0), Int(1)]),
        (F::SubstringIndex, vec![Text(0), Text(1), Int(0)]),
        (F::Insert, vec![Text(0), Int(0), Int(1), Text(1)]),
        (F::Lpad, vec![Text(0), Int(0), Text(1)]),
        (F::RpadUtf8, vec![Text(0), Int(0), Text(1)]),
        (F::RTrim, vec![Text(0)]),
        (F::Trim, vec![Text(0), Text(1), Int(0)]),
        (F::HexStr, vec![Text(0)]),
        (F::HexInt, vec![Int(0)]),
        (F::Unhex, vec![Text(0)]),
        (F::OctInt, vec![Int(0)]),
        (F::ToBase64, vec![Text(0)]),
        (F::FromBase64, vec![Text(0)]),
        (F::Replace, vec![Text(0), Text(1), Text(2)]),
        (F::ExportSet, vec![Int(0), Text(0), Text(1), Text(2), Int(1)]),
        (F::Format, vec![Int(0), Int(1)]),
        (F::Translate, vec![Text(0), Text(1), Text(2)]),
        (F::TranslateUtf8, vec![Text(0), Text(1), Text(2)]),
        (F::Length, vec![Text(0)]),
        (F::BitLength, vec![Text(0)]),
        (F::CharLengthUtf8, vec![Text(0)]),
        (F::Ascii, vec![Text(0)]),
        (F::Ord, vec![Text(0)]),
        (F::Locate, vec![Text(0), Text(1)]),
        (F::LocateUtf8, vec![Text(0), Text(1), Int(0)]),
        (F::Instr, vec![Text(0), Text(1)]),
        (F::InstrUtf8, vec![Text(0), Text(1)]),
        (F::FindInSet, vec![Text(0), Text(1)]),
        (F::Strcmp, vec![Text(0), Text(1)]),
    ]
}

fn operand(slot: Slot, texts: &[String], ints: &[i64], null: bool) -> Expression {
    match (slot, null) {
        (Text(_), true) => Expression::null(FieldType::string()),
        (Int(_), true) => Expression::null(FieldType::int()),
        (Text(i), false) => Expression::string(&texts[i]),
        (Int(i), false) => Expression::int(ints[i]),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    #[test]
    fn test_any_null_operand_gives_null(
        texts in proptest::collection::vec("[ab,é ]{0,5}", 3),
        ints in proptest::collection::vec(-4i64..12, 2),
    ) {
        for (kind, slots) in strict_calls() {
            for null_at in 0..slots.len() {
                let args = slots
                    .iter()
                    .enumerate()
                    .map(|(i, slot)| operand(*slot, &texts, &ints, i == null_at))
                    .collect();
                let result = eval_const(kind, args);
                prop_assert_eq!(result, Datum::Null, "{} with NULL at {}", kind, null_at);
            }
        }
    }
}

// Exceptions

#[test]
fn test_quote_null_is_the_word_null() {
    let result = eval_const(F::Quote, vec![Expression::null(FieldType::string())]);
    assert_eq!(result, s("NULL"));
}

#[test]
fn test_isnull_is_never_null() {
    assert_eq!(
        eval_const(F::StringIsNull, vec![Expression::null(FieldType::string())]),
        Datum::Int(1)
    );
    assert_eq!(eval_const(F::StringIsNull, vec![Expression::string("")]), Datum::Int(0));
}

#[test]
fn test_concat_ws_skips_null_arguments() {
    let result = eval_const(
        F::ConcatWs,
        vec![
            Expression::string(","),
            Expression::string("a"),
            Expression::null(FieldType::string()),
            Expression::string("b"),
        ],
    );
    assert_eq!(result, s("a,b"));

    let result = eval_const(
        F::ConcatWs,
        vec![Expression::null(FieldType::string()), Expression::string("a")],
    );
    assert_eq!(result, Datum::Null);
}

#[test]
fn test_make_set_skips_null_strings() {
    let result = eval_const(
        F::MakeSet,
        vec![
            Expression::int(0b111),
            Expression::string("a"),
            Expression::null(FieldType::string()),
            Expression::string("c"),
        ],
    );
    assert_eq!(result, s("a,c"));
}

#[test]
fn test_elt_only_selected_argument_matters() {
    let args = |n: i64| {
        vec![
            Expression::int(n),
            Expression::null(FieldType::string()),
            Expression::string("second"),
        ]
    };
    assert_eq!(eval_const(F::Elt, args(2)), s("second"));
    assert_eq!(eval_const(F::Elt, args(1)), Datum::Null);
    assert_eq!(eval_const(F::Elt, args(3)), Datum::Null);
}

#[test]
fn test_char_skips_null_arguments() {
    let result = eval_const(
        F::Char,
        vec![
            Expression::int(77),
            Expression::null(FieldType::int()),
            Expression::int(121),
        ],
    );
    assert_eq!(result, s("My"));
}

#[test]
fn test_format_null_locale_falls_back() {
    let result = eval_const(
        F::Format,
        vec![
            Expression::int(1234),
            Expression::int(0),
            Expression::null(FieldType::string()),
        ],
    );
    assert_eq!(result, s("1,234"));
}
