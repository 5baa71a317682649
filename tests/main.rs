use std::cell::RefCell;
use std::rc::Rc;

use cliroute::{Bindings, Compiler, NoRouteFound, Router, Value};
use rstest::rstest;

/// A router whose handlers surface the collected bindings for inspection.
fn recording_router(patterns: &[&str]) -> (Router<usize>, Rc<RefCell<Option<Bindings>>>) {
    let mut router = Router::new();
    let recorded = Rc::new(RefCell::new(None));

    for (index, pattern) in patterns.iter().enumerate() {
        let recorded = Rc::clone(&recorded);
        router
            .add(pattern, move |args: Bindings| {
                *recorded.borrow_mut() = Some(args);
                index
            })
            .unwrap();
    }

    (router, recorded)
}

#[test]
fn word_and_argument() {
    let (mut router, recorded) = recording_router(&["hello <name>"]);

    assert_eq!(router.dispatch(&["hello", "clue"]), Ok(0));

    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args.len(), 1);
    assert_eq!(args["name"], Value::String("clue".to_string()));
}

#[test]
fn optional_argument_present() {
    let (mut router, recorded) = recording_router(&["hello [<name>]"]);

    assert_eq!(router.dispatch(&["hello", "clue"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["name"], Value::String("clue".to_string()));
}

#[test]
fn optional_argument_absent() {
    let (mut router, recorded) = recording_router(&["hello [<name>]"]);

    assert_eq!(router.dispatch(&["hello"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert!(args.is_empty());
}

#[test]
fn ellipsis_arguments() {
    let (mut router, recorded) = recording_router(&["hello <names>..."]);

    assert_eq!(router.dispatch(&["hello", "a", "b"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(
        args["names"],
        Value::List(vec![
            Value::String("a".to_string()),
            Value::String("b".to_string()),
        ])
    );
}

#[test]
fn ellipsis_requires_at_least_one() {
    let (mut router, _) = recording_router(&["hello <names>..."]);

    assert_eq!(router.dispatch(&["hello"]), Err(NoRouteFound));
}

#[test]
fn optional_ellipsis_arguments() {
    let (mut router, recorded) = recording_router(&["hello [<names>...]"]);

    assert_eq!(router.dispatch(&["hello"]), Ok(0));
    assert!(recorded.borrow().clone().unwrap().is_empty());

    assert_eq!(router.dispatch(&["hello", "a", "b"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(
        args["names"],
        Value::List(vec![
            Value::String("a".to_string()),
            Value::String("b".to_string()),
        ])
    );
}

#[rstest]
#[case(&["hello", "--upper"], true)]
#[case(&["--upper", "hello"], true)]
#[case(&["hello"], false)]
fn optional_long_option(#[case] input: &[&str], #[case] expected: bool) {
    let (mut router, recorded) = recording_router(&["hello [--upper]"]);

    assert_eq!(router.dispatch(input), Ok(0));

    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args.contains_key("upper"), expected);
    if expected {
        assert_eq!(args["upper"], Value::None);
    }
}

#[rstest]
#[case(&["hello", "-f"], true)]
#[case(&["-f", "hello"], true)]
#[case(&["hello"], false)]
fn optional_short_option(#[case] input: &[&str], #[case] expected: bool) {
    let (mut router, recorded) = recording_router(&["hello [-f]"]);

    assert_eq!(router.dispatch(input), Ok(0));

    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args.contains_key("f"), expected);
}

#[test]
fn typed_option_value() {
    let (mut router, recorded) = recording_router(&["hello --name=<n:int>"]);

    assert_eq!(router.dispatch(&["hello", "--name=10"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["n"], Value::Integer(10));

    // the value fails the filter; nothing matches
    assert_eq!(router.dispatch(&["hello", "--name=x"]), Err(NoRouteFound));
    assert_eq!(router.dispatch(&["hello"]), Err(NoRouteFound));
}

#[test]
fn dash_value_after_separator() {
    let (mut router, recorded) = recording_router(&["hello <name>"]);

    assert_eq!(router.dispatch(&["hello", "--", "-x"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["name"], Value::String("-x".to_string()));
}

#[test]
fn dash_value_without_separator_does_not_match() {
    let (mut router, _) = recording_router(&["hello <name>"]);

    assert_eq!(router.dispatch(&["hello", "-x"]), Err(NoRouteFound));
}

#[test]
fn registration_order_wins_over_specificity() {
    // the first route matches `hello` but fails the leftover check, so the
    // second is selected: first-successful-match-wins, not longest-match
    let (mut router, recorded) = recording_router(&["hello", "hello <name>"]);

    assert_eq!(router.dispatch(&["hello", "x"]), Ok(1));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["name"], Value::String("x".to_string()));

    assert_eq!(router.dispatch(&["hello"]), Ok(0));
}

#[test]
fn excessive_arguments_do_not_match() {
    let (mut router, _) = recording_router(&["hello"]);

    assert_eq!(router.dispatch(&["hello", "world"]), Err(NoRouteFound));
}

#[test]
fn sentence_prefix_does_not_match() {
    let (mut router, _) = recording_router(&["hello world"]);

    assert_eq!(router.dispatch(&["hello"]), Err(NoRouteFound));
}

#[test]
fn missing_option_does_not_match() {
    let (mut router, _) = recording_router(&["hello --upper"]);

    assert_eq!(router.dispatch(&["hello"]), Err(NoRouteFound));
}

#[test]
fn option_instead_of_argument_does_not_match() {
    let (mut router, _) = recording_router(&["hello --upper"]);

    assert_eq!(router.dispatch(&["hello", "upper"]), Err(NoRouteFound));
}

#[test]
fn alternatives_select_first_match() {
    let (mut router, recorded) = recording_router(&["service (start | stop | <action>)"]);

    assert_eq!(router.dispatch(&["service", "stop"]), Ok(0));
    assert!(recorded.borrow().clone().unwrap().is_empty());

    assert_eq!(router.dispatch(&["service", "reload"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["action"], Value::String("reload".to_string()));
}

#[test]
fn mixed_options_and_words_in_any_order() {
    let (mut router, recorded) =
        recording_router(&["hello [-v] [--upper] <name>"]);

    assert_eq!(router.dispatch(&["-v", "hello", "clue", "--upper"]), Ok(0));

    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["v"], Value::None);
    assert_eq!(args["upper"], Value::None);
    assert_eq!(args["name"], Value::String("clue".to_string()));
}

#[test]
fn repeated_option_collects_list() {
    let (mut router, recorded) = recording_router(&["build [-v...]"]);

    assert_eq!(router.dispatch(&["build", "-v", "-v", "-v"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(
        args["v"],
        Value::List(vec![Value::None, Value::None, Value::None])
    );
}

#[test]
fn typed_ellipsis_collects_typed_list() {
    let (mut router, recorded) = recording_router(&["sum <n:int>..."]);

    assert_eq!(router.dispatch(&["sum", "1", "2", "3"]), Ok(0));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(
        args["n"],
        Value::List(vec![
            Value::Integer(1),
            Value::Integer(2),
            Value::Integer(3),
        ])
    );
}

#[test]
fn custom_filter_through_dispatch() {
    let mut compiler = Compiler::new();
    compiler.register_filter("caps", |value: &mut String| {
        *value = value.to_uppercase();
        true
    });

    let recorded = Rc::new(RefCell::new(None));
    let mut router = Router::with_compiler(compiler);
    {
        let recorded = Rc::clone(&recorded);
        router
            .add("shout <name:caps>", move |args: Bindings| {
                *recorded.borrow_mut() = Some(args);
            })
            .unwrap();
    }

    assert_eq!(router.dispatch(&["shout", "clue"]), Ok(()));
    let args = recorded.borrow().clone().unwrap();
    assert_eq!(args["name"], Value::String("CLUE".to_string()));
}

#[test]
fn handler_result_propagates() {
    let mut router = Router::new();
    router.add("version", |_| "1.0.0").unwrap();

    assert_eq!(router.dispatch(&["version"]), Ok("1.0.0"));
}

#[test]
fn patterns_render_for_usage_text() {
    let (router, _) = recording_router(&["hello <name>", "build [-v...]", ""]);

    let usage: Vec<String> = router.routes().map(|route| route.to_string()).collect();
    assert_eq!(
        usage,
        vec![
            "hello <name>".to_string(),
            "build [-v...]".to_string(),
            String::new(),
        ]
    );
}
