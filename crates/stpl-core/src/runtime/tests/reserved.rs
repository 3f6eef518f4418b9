//! Reserved helper bindings

use super::helpers::{render, render_err, render_noescape, render_with};
use crate::error::{RuntimeErrorKind, StplError};
use crate::host::HostError;
use crate::value::Value;

#[test]
fn test_get_with_default() {
    assert_eq!(render("{{ get('title', 'dflt') }}"), "dflt");
    assert_eq!(render("{{ get('title') }}"), "None");
    assert_eq!(
        render_with("{{ get('title', 'dflt') }}", &[("title", Value::from("Home"))]),
        "Home"
    );
}

#[test]
fn test_defined() {
    assert_eq!(
        render_with(
            "{{ defined('x') }} {{ defined('y') }}",
            &[("x", Value::Null)]
        ),
        "True False"
    );
}

#[test]
fn test_setdefault_binds_missing_name() {
    assert_eq!(render("% setdefault('title', 'Home')\n{{ title }}"), "Home");
    assert_eq!(
        render_with(
            "% setdefault('title', 'Home')\n{{ title }}",
            &[("title", Value::from("Away"))]
        ),
        "Away"
    );
}

#[test]
fn test_include_splices_output() {
    assert_eq!(
        render("before\n% include('child', name='x')\nafter"),
        "before[child name=x]after"
    );
    assert_eq!(render("<{{! include('child') }}>"), "<[child ]>");
}

#[test]
fn test_include_host_failure_is_located_in_parent() {
    let err = render_err("a\n% include('missing')\n");
    match err {
        StplError::Runtime {
            template,
            line,
            kind: RuntimeErrorKind::Host(HostError::NotFound { path }),
        } => {
            assert_eq!(template, "page.tpl");
            assert_eq!(line, 2);
            assert_eq!(path, "missing");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_include_child_error_keeps_child_location() {
    let err = render_err("% include('broken')\n");
    match err {
        StplError::Syntax { template, line, .. } => {
            assert_eq!(template, "broken");
            assert_eq!(line, 4);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_include_rejects_extra_positional() {
    let err = render_err("% include('a', 'b')\n");
    assert!(matches!(
        err,
        StplError::Runtime {
            kind: RuntimeErrorKind::BadArguments { .. },
            ..
        }
    ));
}

#[test]
fn test_http_helpers() {
    assert_eq!(render("{{! http_get('http://x') }}"), "GET http://x");
    assert_eq!(render("{{! local_http_get('/api') }}"), "LOCAL /api");

    let err = render_err("{{ http_get('http://down') }}");
    assert!(matches!(
        err,
        StplError::Runtime {
            kind: RuntimeErrorKind::Host(HostError::Network { .. }),
            ..
        }
    ));
}

#[test]
fn test_escaping_converters() {
    assert_eq!(render("{{ '<b>' }}"), "&lt;b&gt;");
    assert_eq!(render("{{! '<b>' }}"), "<b>");
    assert_eq!(render("{{ html_escape('a & b') }}"), "a &amp;amp; b");
    assert_eq!(render("{{! html_escape('a & b') }}"), "a &amp; b");
}

#[test]
fn test_noescape_swaps_converters() {
    assert_eq!(render_noescape("{{ '<b>' }}"), "<b>");
    assert_eq!(render_noescape("{{! '<b>' }}"), "&lt;b&gt;");
}

#[test]
fn test_helper_name_is_not_a_value() {
    let err = render_err("{{ include }}");
    assert!(matches!(
        err,
        StplError::Runtime {
            kind: RuntimeErrorKind::Type(_),
            ..
        }
    ));
}
