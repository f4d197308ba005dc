#![allow(clippy::unwrap_used, reason = "tests unwrap to fail loudly")]

use super::*;
use crate::{ParseError, Reference};
use phi_value::EvalError;

fn inc() -> Literal {
    Literal::func(|x| Ok(Value::int(x.expect_int()? + 1)))
}

#[test]
fn compile_leaves_caller_environment_untouched() {
    let env = Environment::new();
    let (_, out) = compile(Literal::tuple([Literal::set(["x"]), inc()]), &env).unwrap();
    assert!(env.is_empty());
    assert!(out.contains("x"));
}

#[test]
fn top_level_constant_is_rejected_by_default() {
    let err = compile(Literal::constant(3_i64), &Environment::new()).unwrap_err();
    assert!(matches!(
        err,
        CompileError::Parse(ParseError::UnsupportedShape { .. })
    ));
}

#[test]
fn constants_option_allows_top_level_constant() {
    let (pipeline, _) = Compiler::new()
        .constants(true)
        .compile(Literal::constant(3_i64), &Environment::new())
        .unwrap();
    assert_eq!(pipeline.run(Value::Void), Ok(Value::int(3)));
}

#[test]
fn reassign_option_applies_to_declared_references() {
    let (pipeline, env) = Compiler::new()
        .reassign(Reassign::Reject)
        .compile(Literal::set(["once"]), &Environment::new())
        .unwrap();
    assert_eq!(pipeline.run(1_i64), Ok(Value::int(1)));
    assert_eq!(
        pipeline.run(2_i64),
        Err(EvalError::AlreadyAssigned { name: "once".into() })
    );
    assert_eq!(env.get("once").unwrap().get(), Ok(Value::int(1)));
}

#[test]
fn reassign_override_does_not_stick_to_returned_environment() {
    let (_, env) = Compiler::new()
        .reassign(Reassign::Reject)
        .compile(Literal::set(["once"]), &Environment::new())
        .unwrap();
    assert_eq!(env.reassign(), Reassign::Overwrite);
    assert_eq!(env.get("once").unwrap().reassign(), Reassign::Reject);

    let (pipeline, later) = compile(Literal::set(["again"]), &env).unwrap();
    assert_eq!(later.get("again").unwrap().reassign(), Reassign::Overwrite);
    assert_eq!(pipeline.run(1_i64), Ok(Value::int(1)));
    assert_eq!(pipeline.run(2_i64), Ok(Value::int(2)));
}

#[test]
fn environment_policy_is_kept_without_override() {
    let env = Environment::new().with_reassign(Reassign::Reject);
    let (_, out) = compile(Literal::set(["x"]), &env).unwrap();
    assert_eq!(out.get("x").unwrap().reassign(), Reassign::Reject);
}

#[test]
fn caller_reference_is_visible_after_run() {
    let out = Reference::new("out");
    let (pipeline, _) = compile(
        Literal::tuple([inc(), Literal::set([Literal::Ref(out.clone())])]),
        &Environment::new(),
    )
    .unwrap();
    assert_eq!(pipeline.run(1_i64), Ok(Value::int(2)));
    assert_eq!(out.get(), Ok(Value::int(2)));
}

#[test]
fn run_in_uses_caller_scopes() {
    let (pipeline, _) = compile(crate::current_scope(), &Environment::new()).unwrap();
    let mut scopes = ScopeStack::new();
    let scoped = &mut scopes.enter(Value::string("tenant"));
    assert_eq!(pipeline.run_in(Value::Void, scoped), Ok(Value::string("tenant")));
    assert_eq!(pipeline.run(Value::Void), Err(EvalError::NoActiveScope));
}

#[test]
fn pipeline_exposes_its_function() {
    let (pipeline, _) = compile(inc(), &Environment::new()).unwrap();
    let f = pipeline.clone().into_func();
    assert_eq!(f.call(Value::int(1), &mut ScopeStack::new()), Ok(Value::int(2)));
    assert_eq!(pipeline.func().label(), "fn");
}
