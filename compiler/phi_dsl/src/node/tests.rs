#![allow(clippy::unwrap_used, reason = "tests unwrap to fail loudly")]

use super::*;
use crate::ScopeStack;
use phi_value::{EvalError, EvalResult, Resource};
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn inc() -> Node {
    Node::function(Func::new(|x| Ok(Value::int(x.expect_int()? + 1))).labeled("inc"))
}

fn double() -> Node {
    Node::function(Func::new(|x| Ok(Value::int(x.expect_int()? * 2))).labeled("double"))
}

fn run(node: &Node, env: &Environment, input: Value) -> EvalResult {
    let (compiled, _) = node.compile(env).unwrap();
    normalize(compiled).call(input, &mut ScopeStack::new())
}

#[test]
fn function_compiles_to_itself() {
    let (compiled, env) = inc().compile(&Environment::new()).unwrap();
    assert_eq!(compiled.arity(), 1);
    assert!(env.is_empty());
    assert_eq!(
        normalize(compiled).call(Value::int(1), &mut ScopeStack::new()),
        Ok(Value::int(2))
    );
}

#[test]
fn function_bindings_extend_environment() {
    let seed = Reference::with_value("seed", Value::int(9));
    let node = Node::Function(FunctionNode::new(Func::identity()).bind(seed.clone()));
    let (_, env) = node.compile(&Environment::new()).unwrap();
    assert!(env.get("seed").is_some_and(|r| r.ptr_eq(&seed)));
}

#[test]
fn input_ignores_argument() {
    let node = Node::input(42_i64);
    assert_eq!(
        run(&node, &Environment::new(), Value::string("ignored")),
        Ok(Value::int(42))
    );
}

#[test]
fn read_of_unbound_name_fails_at_compile_time() {
    let err = Node::read("missing").compile(&Environment::new()).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnboundName {
            name: Name::new("missing")
        }
    );
}

#[test]
fn read_of_unassigned_reference_fails_at_run_time() {
    let env: Environment = [Reference::new("y")].into_iter().collect();
    assert_eq!(
        run(&Node::read("y"), &env, Value::Void),
        Err(EvalError::UnassignedReference { name: Name::new("y") })
    );
}

#[test]
fn write_passes_input_through() {
    let (compiled, env) = Node::write("x").compile(&Environment::new()).unwrap();
    let out = normalize(compiled).call(Value::int(3), &mut ScopeStack::new());
    assert_eq!(out, Ok(Value::int(3)));
    assert_eq!(env.get("x").unwrap().get(), Ok(Value::int(3)));
}

#[test]
fn write_reuses_caller_reference() {
    let x = Reference::new("x");
    let env: Environment = [x.clone()].into_iter().collect();
    let (_, out_env) = Node::write("x").compile(&env).unwrap();
    run(&Node::write("x"), &env, Value::int(8)).unwrap();
    assert_eq!(x.get(), Ok(Value::int(8)));
    assert_eq!(out_env.len(), 1);
}

#[test]
fn write_to_explicit_reference() {
    let out = Reference::new("out");
    run(&Node::write_ref(out.clone()), &Environment::new(), Value::bool(true)).unwrap();
    assert_eq!(out.get(), Ok(Value::bool(true)));
}

#[test]
fn tree_threads_environment_between_branches() {
    let tree = Node::Tree(vec![Node::write("a"), Node::read("a")]);
    assert_eq!(
        run(&tree, &Environment::new(), Value::int(4)),
        Ok(Value::list(vec![Value::int(4), Value::int(4)]))
    );
}

#[test]
fn tree_flattens_nested_branches() {
    let tree = Node::Tree(vec![inc(), Node::Tree(vec![double(), Node::identity()])]);
    let (compiled, _) = tree.compile(&Environment::new()).unwrap();
    assert_eq!(compiled.arity(), 3);
    assert_eq!(
        normalize(compiled).call(Value::int(5), &mut ScopeStack::new()),
        Ok(Value::list(vec![Value::int(6), Value::int(10), Value::int(5)]))
    );
}

#[test]
fn sequence_runs_left_then_right() {
    let seq = Node::sequence(inc(), double());
    assert_eq!(run(&seq, &Environment::new(), Value::int(1)), Ok(Value::int(4)));
}

#[test]
fn sequence_joins_left_branches() {
    let sum = Node::function(Func::new(|x| {
        let total: i64 = x.expect_list()?.iter().filter_map(Value::as_int).sum();
        Ok(Value::int(total))
    }));
    let seq = Node::sequence(Node::Tree(vec![inc(), double()]), sum);
    assert_eq!(run(&seq, &Environment::new(), Value::int(3)), Ok(Value::int(10)));
}

#[test]
fn sequence_keeps_right_branches_apart() {
    let seq = Node::sequence(inc(), Node::Tree(vec![double(), Node::identity()]));
    let (compiled, _) = seq.compile(&Environment::new()).unwrap();
    assert_eq!(compiled.arity(), 2);
}

#[test]
fn chain_of_nothing_is_identity() {
    assert_eq!(
        run(&Node::chain(Vec::new()), &Environment::new(), Value::int(5)),
        Ok(Value::int(5))
    );
}

#[test]
fn dict_builds_record() {
    let dict = Node::Dict(vec![(Name::new("q"), double()), (Name::new("p"), inc())]);
    let out = run(&dict, &Environment::new(), Value::int(10)).unwrap();
    let record = out.as_record().unwrap();
    assert_eq!(record.len(), 2);
    assert_eq!(record.get("p"), Some(&Value::int(11)));
    assert_eq!(record.get("q"), Some(&Value::int(20)));
}

#[test]
fn dict_branches_do_not_see_each_other() {
    let dict = Node::Dict(vec![
        (Name::new("w"), Node::write("a")),
        (Name::new("r"), Node::read("a")),
    ]);
    let err = dict.compile(&Environment::new()).unwrap_err();
    assert_eq!(err, CompileError::UnboundName { name: Name::new("a") });
}

#[test]
fn dict_merges_branch_environments() {
    let dict = Node::Dict(vec![
        (Name::new("a"), Node::write("x")),
        (Name::new("b"), Node::write("y")),
    ]);
    let (_, env) = dict.compile(&Environment::new()).unwrap();
    assert!(env.contains("x"));
    assert!(env.contains("y"));
}

#[derive(Debug, Default)]
struct Session {
    released: AtomicUsize,
}

impl Resource for Session {
    fn acquire(&self) -> EvalResult {
        Ok(Value::string("open"))
    }

    fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn with_installs_scope_for_body() {
    let session = Arc::new(Session::default());
    let handle = Value::resource(session.clone());
    let node = Node::With {
        scope: Box::new(Node::Input(handle)),
        body: Box::new(Node::function(crate::current_scope())),
    };
    let mut scopes = ScopeStack::new();
    let (compiled, _) = node.compile(&Environment::new()).unwrap();
    let out = normalize(compiled).call(Value::Void, &mut scopes);
    assert_eq!(out, Ok(Value::string("open")));
    assert_eq!(scopes.depth(), 0);
    assert_eq!(session.released.load(Ordering::SeqCst), 1);
}

#[test]
fn with_releases_when_body_fails() {
    let session = Arc::new(Session::default());
    let node = Node::With {
        scope: Box::new(Node::Input(Value::resource(session.clone()))),
        body: Box::new(Node::function(Func::new(|_| Err(phi_value::custom("body failed"))))),
    };
    let mut scopes = ScopeStack::new();
    let (compiled, _) = node.compile(&Environment::new()).unwrap();
    let out = normalize(compiled).call(Value::Void, &mut scopes);
    assert_eq!(out, Err(EvalError::Custom { message: "body failed".into() }));
    assert_eq!(scopes.depth(), 0);
    assert_eq!(session.released.load(Ordering::SeqCst), 1);
}

#[test]
fn with_scope_sees_input() {
    let node = Node::With {
        scope: Box::new(inc()),
        body: Box::new(Node::function(crate::current_scope())),
    };
    assert_eq!(run(&node, &Environment::new(), Value::int(1)), Ok(Value::int(2)));
}

#[test]
fn display() {
    let node = Node::sequence(
        Node::Tree(vec![inc(), Node::read("a")]),
        Node::Dict(vec![(Name::new("k"), Node::write("b"))]),
    );
    assert_eq!(node.to_string(), "Seq([Fun(inc), Read(a)], {k: Write(b)})");
    let with = Node::With {
        scope: Box::new(Node::input(1_i64)),
        body: Box::new(double()),
    };
    assert_eq!(with.to_string(), "{Input(1): Fun(double)}");
}
