use std::sync::Arc;

use super::helpers::{engine_with, MapHost};
use crate::config::EngineConfig;
use crate::engine::{Engine, TemplateContext};
use crate::error::{RuntimeErrorKind, StplError};
use crate::host::HostError;

#[test]
fn test_include_splices_child_output() {
    let host = MapHost::with_files(&[("child", "<b>{{name}}</b>")]);
    let engine = engine_with(host);
    let result = engine
        .render(
            "before\n% include('child', name='x')\nafter",
            "parent",
            &TemplateContext::new(),
        )
        .unwrap();
    assert_eq!(result, "before<b>x</b>after");
}

#[test]
fn test_include_does_not_see_parent_variables() {
    let host = MapHost::with_files(&[("child", "{{ get('secret', 'hidden') }}")]);
    let engine = engine_with(host);
    let ctx = TemplateContext::new().with("secret", "leaked");
    let result = engine
        .render("% include('child')\n", "parent", &ctx)
        .unwrap();
    assert_eq!(result, "hidden");
}

#[test]
fn test_include_reuses_cached_child() {
    let host = MapHost::with_files(&[("child", "c")]);
    let engine = engine_with(Arc::clone(&host));
    let ctx = TemplateContext::new();
    let src = "% include('child')\n% include('child')\n";

    assert_eq!(engine.render(src, "parent", &ctx).unwrap(), "cc");
    assert_eq!(host.reads(), 1);

    host.set("child", "changed");
    assert_eq!(engine.render(src, "parent", &ctx).unwrap(), "cc");
    engine.invalidate("child");
    assert_eq!(engine.render(src, "parent", &ctx).unwrap(), "changedchanged");
    assert_eq!(host.reads(), 2);
}

#[test]
fn test_include_prefers_precompiled_child() {
    let host = MapHost::with_files(&[]);
    let engine = engine_with(Arc::clone(&host));
    engine.precompile("child", "pre").unwrap();
    let result = engine
        .render("{{! include('child') }}", "parent", &TemplateContext::new())
        .unwrap();
    assert_eq!(result, "pre");
    assert_eq!(host.reads(), 0);
}

#[test]
fn test_nested_includes_keep_order() {
    let host = MapHost::with_files(&[
        ("outer", "(\n% include('inner', n=n + 1)\n)"),
        ("inner", "{{n}}"),
    ]);
    let engine = engine_with(host);
    let result = engine
        .render("a\n% include('outer', n=1)\nz", "root", &TemplateContext::new())
        .unwrap();
    assert_eq!(result, "a(2)z");
}

#[test]
fn test_missing_child_is_host_error() {
    let engine = engine_with(MapHost::with_files(&[]));
    let err = engine
        .render("x\n% include('nope')\n", "parent", &TemplateContext::new())
        .unwrap_err();
    match err {
        StplError::Runtime {
            template,
            line,
            kind: RuntimeErrorKind::Host(HostError::NotFound { path }),
        } => {
            assert_eq!(template, "parent");
            assert_eq!(line, 2);
            assert_eq!(path, "nope");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_child_syntax_error_reports_child() {
    let host = MapHost::with_files(&[("child", "line\n% end\n")]);
    let engine = engine_with(host);
    let err = engine
        .render("% include('child')\n", "parent", &TemplateContext::new())
        .unwrap_err();
    match err {
        StplError::Syntax { template, line, .. } => {
            assert_eq!(template, "child");
            assert_eq!(line, 2);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_include_depth_is_bounded() {
    let host = MapHost::with_files(&[("loop", "% include('loop')\n")]);
    let config = EngineConfig {
        max_include_depth: 3,
        ..EngineConfig::default()
    };
    let engine = Engine::new(config, host).unwrap();
    let err = engine
        .render("% include('loop')\n", "main", &TemplateContext::new())
        .unwrap_err();
    match err {
        StplError::Runtime {
            template,
            kind: RuntimeErrorKind::IncludeDepth(limit),
            ..
        } => {
            assert_eq!(template, "loop");
            assert_eq!(limit, 3);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_include_failure_can_be_caught() {
    let engine = engine_with(MapHost::with_files(&[]));
    let result = engine
        .render(
            "% try:\n% include('nope')\n% except IOError:\nfallback\n% end\n",
            "parent",
            &TemplateContext::new(),
        )
        .unwrap();
    assert_eq!(result, "fallback");
}
