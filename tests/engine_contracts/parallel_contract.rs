//! Contract: parallel evaluation of independent chunks matches sequential
//! evaluation, with warnings reported in chunk order.

use vexpr::types::EvalType;
use vexpr::{
    BuiltinFunction as F, Chunk, EvalConfig, EvalWarning, Expression, ParallelProjection,
    Projection, VexprError,
};

use super::support::{call, col, context, int_col, str_col};

fn input(rows: usize) -> Chunk {
    let words = ["alpha", "béta", "", "gamma delta", "日本"];
    let texts: Vec<Option<&str>> = (0..rows)
        .map(|i| (i % 7 != 3).then(|| words[i % words.len()]))
        .collect();
    let counts: Vec<Option<i64>> = (0..rows).map(|i| Some((i % 5) as i64 - 1)).collect();
    Chunk::new(vec![str_col(&texts), int_col(&counts)]).unwrap()
}

fn exprs() -> Vec<Expression> {
    vec![
        call(F::Repeat, vec![col(0, EvalType::String), col(1, EvalType::Int)]),
        call(F::UpperUtf8, vec![col(0, EvalType::String)]),
        call(F::CharLengthUtf8, vec![col(0, EvalType::String)]),
    ]
}

#[test]
fn test_parallel_matches_sequential() {
    // Contract: splitting into chunks and evaluating on rayon gives the
    // same rows as one sequential pass
    let data = input(1000);
    let config = EvalConfig::default().with_batch_size(64);

    let parallel = ParallelProjection::new(exprs(), config.clone()).unwrap();
    let output = parallel.execute_split(&data).unwrap();
    assert_eq!(output.chunks.len(), 16);
    assert_eq!(output.num_rows(), 1000);

    let ctx = context(config);
    let sequential = Projection::new(exprs()).execute(&ctx, &data).unwrap();

    let mut row = 0;
    for chunk in &output.chunks {
        for i in 0..chunk.num_rows() {
            assert_eq!(chunk.row(i), sequential.row(row), "row {row}");
            row += 1;
        }
    }
}

#[test]
fn test_warnings_ordered_by_chunk() {
    // Contract: every overflow warning is attributed to its chunk, in
    // chunk order
    let config = EvalConfig::default()
        .with_batch_size(10)
        .with_max_output_bytes(12);
    let parallel = ParallelProjection::new(exprs(), config).unwrap();
    let output = parallel.execute_split(&input(200)).unwrap();

    assert!(!output.warnings.is_empty());
    assert!(output.warnings.windows(2).all(|w| w[0].0 <= w[1].0));
    assert!(output
        .warnings
        .iter()
        .all(|(_, w)| matches!(w, EvalWarning::PacketOverflow { function: "repeat", .. })));
}

#[test]
fn test_strict_mode_aborts() {
    // Contract: in strict mode the first overflow fails the whole run
    let config = EvalConfig::default()
        .with_batch_size(10)
        .with_max_output_bytes(12)
        .with_strict_mode(true);
    let parallel = ParallelProjection::new(exprs(), config).unwrap();
    let err = parallel.execute_split(&input(200)).unwrap_err();
    assert!(matches!(err, VexprError::PacketOverflow { .. }));
}

#[test]
fn test_invalid_config_rejected() {
    let config = EvalConfig::default().with_batch_size(0);
    assert!(matches!(
        ParallelProjection::new(exprs(), config),
        Err(VexprError::InvalidConfig(_))
    ));
}

#[test]
fn test_empty_input() {
    let parallel = ParallelProjection::new(exprs(), EvalConfig::default()).unwrap();
    let output = parallel.execute(&[]).unwrap();
    assert!(output.chunks.is_empty());
    assert!(output.warnings.is_empty());
}
